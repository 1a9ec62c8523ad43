use clusterscope_rs::{
    Dataset, DistanceMetric, KMeans, KMeansConfig, KnnClassifier, KnnConfig, Record,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ndarray::Array2;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use std::time::Duration;

fn labeled_dataset(n_samples: usize, n_features: usize, n_classes: usize) -> Dataset {
    let data = Array2::random((n_samples, n_features), Uniform::new(-1.0, 1.0));
    Dataset::from_records(
        data.outer_iter()
            .enumerate()
            .map(|(i, row)| Record::new(row.to_owned(), format!("class-{}", i % n_classes))),
    )
    .unwrap()
}

fn benchmark_kmeans_varying_samples(c: &mut Criterion) {
    let mut group = c.benchmark_group("kmeans_samples");
    group.sample_size(10);
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(2));

    let n_features = 16;
    let k = 8;
    let sample_sizes = [500, 2_000, 5_000];

    for n_samples in sample_sizes.iter() {
        group.throughput(Throughput::Elements(*n_samples as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(n_samples),
            n_samples,
            |b, &n_samples| {
                let data = Array2::random((n_samples, n_features), Uniform::new(-1.0, 1.0));
                let config = KMeansConfig::new(k).with_max_iters(5).with_seed(42);

                b.iter(|| {
                    let mut kmeans = KMeans::with_config(config.clone());
                    kmeans.fit_array(black_box(&data.view())).unwrap();
                    kmeans
                });
            },
        );
    }
    group.finish();
}

fn benchmark_kmeans_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("kmeans_metrics");
    group.sample_size(10);
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(2));

    let data = Array2::random((2_000, 32), Uniform::new(0.1, 1.0));

    for metric in DistanceMetric::ALL {
        for parallel in [false, true] {
            let config = KMeansConfig::new(10)
                .with_max_iters(5)
                .with_seed(42)
                .with_metric(metric)
                .with_parallel(parallel);
            let id = format!("{}/{}", metric, if parallel { "parallel" } else { "serial" });

            group.bench_function(id, |b| {
                b.iter(|| {
                    let mut kmeans = KMeans::with_config(config.clone());
                    kmeans.fit_array(black_box(&data.view())).unwrap();
                    kmeans
                });
            });
        }
    }
    group.finish();
}

fn benchmark_quality(c: &mut Criterion) {
    let mut group = c.benchmark_group("kmeans_quality");
    group.sample_size(10);

    let dataset = labeled_dataset(3_000, 16, 4);
    let mut kmeans = KMeans::with_config(KMeansConfig::new(8).with_seed(42));
    kmeans.fit(&dataset).unwrap();

    group.bench_function("report_3k", |b| {
        b.iter(|| kmeans.quality(black_box(&dataset)).unwrap());
    });
    group.finish();
}

fn benchmark_knn_predict(c: &mut Criterion) {
    let mut group = c.benchmark_group("knn_predict");
    group.sample_size(10);
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(2));

    let pool = labeled_dataset(2_000, 16, 3);
    let predict_sizes = [100, 500];

    for parallel in [false, true] {
        let mut knn = KnnClassifier::new(KnnConfig::new(5).with_parallel(parallel));
        knn.fit(&pool).unwrap();

        for n_predict in predict_sizes.iter() {
            group.throughput(Throughput::Elements(*n_predict as u64));
            let id = format!("{}/{}", if parallel { "parallel" } else { "serial" }, n_predict);
            group.bench_with_input(BenchmarkId::from_parameter(id), n_predict, |b, &n_predict| {
                let queries = Array2::random((n_predict, 16), Uniform::new(-1.0, 1.0));

                b.iter(|| knn.predict_batch(black_box(&queries.view())).unwrap().len());
            });
        }
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_kmeans_varying_samples,
    benchmark_kmeans_metrics,
    benchmark_quality,
    benchmark_knn_predict,
);

criterion_main!(benches);

//! Basic example demonstrating clusterscope-rs usage
//!
//! Run with: cargo run --example basic --release

use clusterscope_rs::{
    Dataset, DistanceMetric, KMeans, KMeansConfig, KnnClassifier, KnnConfig, Record,
};
use ndarray::Array2;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_writer(std::io::stderr)
        .init();

    println!("=== clusterscope-rs example ===\n");

    // Labeled points around 3 centers in 2D
    let n_samples = 300;
    let centers = [[-5.0, -5.0], [0.0, 5.0], [5.0, -5.0]];
    let names = ["left", "top", "right"];

    let noise = Array2::random((n_samples, 2), Uniform::new(-1.0, 1.0));
    let records: Vec<Record> = noise
        .outer_iter()
        .enumerate()
        .map(|(i, n)| {
            let c = i % 3;
            Record::new(vec![centers[c][0] + n[0], centers[c][1] + n[1]], names[c])
        })
        .collect();
    let (train_records, test_records): (Vec<_>, Vec<_>) =
        records.into_iter().enumerate().partition(|(i, _)| i % 5 != 0);

    let train = Dataset::from_records(train_records.into_iter().map(|(_, r)| r))
        .expect("Building training set failed");
    let test = Dataset::from_records(test_records.into_iter().map(|(_, r)| r))
        .expect("Building test set failed");

    println!("Train: {} records, test: {} records\n", train.len(), test.len());

    for metric in DistanceMetric::ALL {
        let config = KMeansConfig::new(3).with_metric(metric).with_seed(42);
        let mut kmeans = KMeans::with_config(config);
        kmeans.fit(&train).expect("Clustering failed");

        let report = kmeans.quality(&train).expect("Scoring failed");
        println!(
            "k-means ({}): {} iterations, WSS={:.4}, BSS={:.4}, weighted entropy={:.4}",
            metric, report.n_iterations, report.wss, report.bss, report.weighted_entropy
        );
        for (i, cluster) in report.clusters.iter().enumerate() {
            println!(
                "  Cluster {}: {} records, entropy {:.4}, majority {}",
                i,
                cluster.size,
                cluster.entropy,
                cluster.majority_label.as_deref().unwrap_or("-")
            );
        }
        println!();
    }

    for k in [1, 3, 5] {
        let mut knn = KnnClassifier::new(KnnConfig::new(k));
        knn.fit(&train).expect("Fitting kNN failed");

        let matrix = knn.evaluate(&test).expect("Evaluation failed");
        println!(
            "kNN (k={}): accuracy {:.4}, macro F1 {:.4}",
            k,
            matrix.accuracy(),
            matrix.macro_f1()
        );
    }

    println!("\n=== Done! ===");
}

//! Cluster an ARFF dataset with each distance metric and report cluster quality,
//! then optionally classify a held-out ARFF test set with kNN.
//!
//! Usage: `clusterscope <train.arff> [--test <test.arff>] [--normalize min-max] [--seed 42]`
//!
//! Set `RUST_LOG=debug` to trace individual K-means iterations.

use clap::Parser;
use clusterscope_rs::arff::load_arff;
use clusterscope_rs::{
    ConfusionMatrix, Dataset, DistanceMetric, KMeans, KMeansConfig, KnnClassifier, KnnConfig,
    Normalization, Normalizer, QualityReport,
};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "clusterscope", version, about)]
struct Args {
    /// Dataset to cluster (and kNN training pool), in ARFF format
    train: PathBuf,

    /// Held-out dataset to classify with kNN
    #[arg(long)]
    test: Option<PathBuf>,

    /// Seed for K-means centroid initialization
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// K-means iteration cap
    #[arg(long, default_value_t = 100)]
    max_iters: usize,

    /// Largest centroid movement still treated as converged
    #[arg(long, default_value_t = 1e-8)]
    tol: f64,

    /// Cluster counts to try, as multiples of the number of classes
    #[arg(long, value_delimiter = ',', default_value = "1,2,3")]
    multipliers: Vec<usize>,

    /// Neighbor counts to try for kNN
    #[arg(long, value_delimiter = ',', default_value = "1,3,5")]
    knn: Vec<usize>,

    /// Distance metrics to try
    #[arg(long, value_delimiter = ',', default_value = "euclidean,cosine")]
    metrics: Vec<DistanceMetric>,

    /// min-max, z-score, or scaled-min-max[:MIN:MAX]; statistics come from the training set
    #[arg(long)]
    normalize: Option<Normalization>,

    /// Spread distance computations across threads
    #[arg(long)]
    parallel: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut train = load_arff(&args.train)?;
    let mut test = args.test.as_ref().map(load_arff).transpose()?;

    if let Some(kind) = args.normalize {
        let normalizer = Normalizer::fit(kind, &train)?;
        normalizer.apply(&mut train)?;
        if let Some(test) = test.as_mut() {
            normalizer.apply(test)?;
        }
        info!(?kind, "Normalized attributes using training statistics");
    }

    println!(
        "Train stats: {} instances, {} attributes, {} classes",
        train.len(),
        train.n_features(),
        train.classes().len()
    );

    run_clustering(&args, &train);

    if let Some(test) = test.as_mut() {
        test.merge_classes(train.classes());
        run_classification(&args, &train, test);
    }

    Ok(())
}

fn run_clustering(args: &Args, train: &Dataset) {
    let class_count = train.classes().len().max(1);

    for &metric in &args.metrics {
        for &multiplier in &args.multipliers {
            let k = multiplier * class_count;
            if k == 0 || k > train.len() {
                warn!(k, records = train.len(), "Skipping k outside 1..=records");
                continue;
            }

            let config = KMeansConfig::new(k)
                .with_metric(metric)
                .with_seed(args.seed)
                .with_max_iters(args.max_iters)
                .with_tol(args.tol)
                .with_parallel(args.parallel);

            let mut kmeans = KMeans::with_config(config);
            if let Err(e) = kmeans.fit(train) {
                error!(%metric, k, "K-means run failed: {}", e);
                continue;
            }

            match kmeans.quality(train) {
                Ok(report) => print_quality(k, &report),
                Err(e) => error!(%metric, k, "K-means run failed: {}", e),
            }
        }
    }
}

fn print_quality(k: usize, report: &QualityReport) {
    println!();
    println!(
        "k-means: metric={} k={} iterations={}{}",
        report.metric,
        k,
        report.n_iterations,
        if report.converged { "" } else { " (did not converge)" }
    );
    println!(
        "{:>8} {:>6} {:>10} {:>14} {:>14}  majority",
        "cluster", "size", "entropy", "wss", "bss"
    );
    for (i, c) in report.clusters.iter().enumerate() {
        println!(
            "{:>8} {:>6} {:>10.4} {:>14.4} {:>14.4}  {}",
            i,
            c.size,
            c.entropy,
            c.wss,
            c.bss,
            c.majority_label.as_deref().unwrap_or("-")
        );
    }
    println!(
        "{:>8} {:>6} {:>10.4} {:>14.4} {:>14.4}  tss={:.4}",
        "total",
        report.clusters.iter().map(|c| c.size).sum::<usize>(),
        report.weighted_entropy,
        report.wss,
        report.bss,
        report.tss
    );
}

fn run_classification(args: &Args, train: &Dataset, test: &Dataset) {
    for &metric in &args.metrics {
        for &k in &args.knn {
            let config = KnnConfig::new(k)
                .with_metric(metric)
                .with_parallel(args.parallel);

            let mut knn = KnnClassifier::new(config);
            let matrix = knn.fit(train).and_then(|knn| knn.evaluate(test));

            match matrix {
                Ok(matrix) => print_classification(metric, k, &matrix),
                Err(e) => error!(%metric, k, "kNN run failed: {}", e),
            }
        }
    }
}

fn print_classification(metric: DistanceMetric, k: usize, matrix: &ConfusionMatrix) {
    println!();
    println!(
        "knn: metric={} k={} accuracy={:.4} macro-f1={:.4}",
        metric,
        k,
        matrix.accuracy(),
        matrix.macro_f1()
    );
    println!(
        "{:>24} {:>10} {:>10} {:>10} {:>8}",
        "class", "precision", "recall", "f1", "support"
    );
    for m in matrix.class_metrics() {
        println!(
            "{:>24} {:>10.4} {:>10.4} {:>10.4} {:>8}",
            m.label, m.precision, m.recall, m.f1, m.support
        );
    }
}

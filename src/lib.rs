//! # clusterscope-rs
//!
//! K-means clustering of labeled tabular records, scored against the known
//! labels, plus a distance-weighted k-nearest-neighbors classifier. Built on
//! ndarray.
//!
//! ## Features
//!
//! - **Lloyd's K-means**: seeded, reproducible centroid initialization without
//!   duplicate picks, explicit empty-cluster handling, tolerance-based
//!   convergence with an iteration cap
//! - **Pluggable distance**: Euclidean and cosine-complement, selected through
//!   configuration
//! - **Quality measures**: per-cluster label entropy, WSS, BSS and TSS
//! - **kNN classification**: inverse-distance voting with documented tie-breaks,
//!   confusion matrices with precision / recall / F1
//! - **Optional parallelism**: rayon-backed assignment and batch prediction that
//!   return exactly what the serial path returns
//!
//! ## Example
//!
//! ```rust
//! use clusterscope_rs::{Dataset, KMeans, KMeansConfig, Record};
//!
//! let dataset = Dataset::from_records(vec![
//!     Record::new(vec![0.0, 0.0], "A"),
//!     Record::new(vec![0.0, 1.0], "A"),
//!     Record::new(vec![10.0, 10.0], "B"),
//!     Record::new(vec![10.0, 11.0], "B"),
//! ])
//! .unwrap();
//!
//! let mut kmeans = KMeans::with_config(KMeansConfig::new(2).with_seed(42));
//! let result = kmeans.fit(&dataset).unwrap();
//! assert_eq!(result.clusters.len(), 2);
//!
//! for cluster in &kmeans.quality(&dataset).unwrap().clusters {
//!     assert_eq!(cluster.entropy, 0.0);
//! }
//! ```
//!
//! ## Classification
//!
//! ```rust
//! use clusterscope_rs::{Dataset, DistanceMetric, KnnClassifier, KnnConfig, Record};
//!
//! let train = Dataset::from_records(vec![
//!     Record::new(vec![1.0, 0.0], "east"),
//!     Record::new(vec![0.9, 0.1], "east"),
//!     Record::new(vec![0.0, 1.0], "north"),
//! ])
//! .unwrap();
//! let test = Dataset::from_records(vec![Record::new(vec![2.0, 0.3], "east")]).unwrap();
//!
//! let mut knn = KnnClassifier::new(KnnConfig::new(2).with_metric(DistanceMetric::Cosine));
//! knn.fit(&train).unwrap();
//!
//! let matrix = knn.evaluate(&test).unwrap();
//! assert_eq!(matrix.accuracy(), 1.0);
//! ```

mod algorithm;
pub mod arff;
mod config;
mod distance;
mod error;
mod evaluation;
mod kmeans;
mod knn;
pub mod normalize;
pub mod quality;
mod record;

pub use algorithm::{assign_nearest, kmeans_from_centroids, kmeans_lloyd, Cluster, ClusteringResult};
pub use config::{KMeansConfig, KnnConfig};
pub use distance::DistanceMetric;
pub use error::{ClusterError, NumericError, Result};
pub use evaluation::{ClassMetrics, ConfusionMatrix};
pub use kmeans::KMeans;
pub use knn::KnnClassifier;
pub use normalize::{Normalization, Normalizer};
pub use quality::{ClusterQuality, QualityReport};
pub use record::{ClassRegistry, Dataset, Record};

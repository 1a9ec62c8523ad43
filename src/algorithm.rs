use crate::config::KMeansConfig;
use crate::distance::{max_centroid_shift, DistanceMetric};
use crate::error::{ClusterError, Result};
use crate::record::Record;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info, warn};

/// One cluster of a finished run: its centroid and the indices of its members
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub centroid: Array1<f64>,
    pub members: Vec<usize>,
}

impl Cluster {
    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Resolve member indices against the records the run was fitted on
    pub fn member_records<'a>(&'a self, records: &'a [Record]) -> impl Iterator<Item = &'a Record> {
        self.members.iter().map(move |&i| &records[i])
    }
}

/// Result of one complete K-means run
#[derive(Debug, Clone)]
pub struct ClusteringResult {
    /// Final centroids, one row per cluster
    pub centroids: Array2<f64>,

    /// Cluster index of every input record
    pub assignments: Vec<usize>,

    /// Clusters in centroid order
    pub clusters: Vec<Cluster>,

    /// Assign/update passes performed, including the final pass that confirmed convergence
    pub n_iterations: usize,

    /// False when the run stopped at `max_iters` before the centroids settled
    pub converged: bool,

    /// Within-cluster sum of squares after each update step
    pub wss_history: Vec<f64>,
}

impl ClusteringResult {
    pub fn k(&self) -> usize {
        self.clusters.len()
    }
}

/// Run Lloyd's K-means with centroids seeded from `rng`.
///
/// Initial centroids are `k` distinct records drawn uniformly without
/// replacement.
pub fn kmeans_lloyd<R: Rng + ?Sized>(
    data: &ArrayView2<f64>,
    config: &KMeansConfig,
    rng: &mut R,
) -> Result<ClusteringResult> {
    validate(data.nrows(), config.k, config)?;

    let centroids = initialize_centroids(data, config.k, rng);
    run_lloyd(data, centroids, config)
}

/// Run Lloyd's K-means from caller-supplied initial centroids.
///
/// `config.k` is ignored; the number of clusters is the number of rows in `initial`.
pub fn kmeans_from_centroids(
    data: &ArrayView2<f64>,
    initial: Array2<f64>,
    config: &KMeansConfig,
) -> Result<ClusteringResult> {
    validate(data.nrows(), initial.nrows(), config)?;

    if initial.ncols() != data.ncols() {
        return Err(ClusterError::DimensionMismatch {
            expected: data.ncols(),
            found: initial.ncols(),
        });
    }

    run_lloyd(data, initial, config)
}

fn validate(n_samples: usize, k: usize, config: &KMeansConfig) -> Result<()> {
    if k == 0 {
        return Err(ClusterError::InvalidK(
            "k must be greater than 0".to_string(),
        ));
    }

    if n_samples < k {
        return Err(ClusterError::InsufficientData(format!(
            "Number of samples ({}) is less than k ({})",
            n_samples, k
        )));
    }

    if config.max_iters == 0 {
        return Err(ClusterError::InvalidConfig(
            "max_iters must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

fn run_lloyd(
    data: &ArrayView2<f64>,
    mut centroids: Array2<f64>,
    config: &KMeansConfig,
) -> Result<ClusteringResult> {
    let n_samples = data.nrows();
    let k = centroids.nrows();

    debug!(
        n_samples,
        n_features = data.ncols(),
        k,
        metric = %config.metric,
        "Training k-means"
    );

    let mut assignments = vec![0usize; n_samples];
    let mut wss_history = Vec::new();
    let mut n_iterations = 0;
    let mut converged = false;

    for iteration in 0..config.max_iters {
        let iter_start = Instant::now();
        n_iterations = iteration + 1;

        assignments = assign_nearest(data, &centroids.view(), config.metric, config.parallel)?;

        let prev_centroids = centroids.clone();
        let empty_clusters = update_centroids(data, &assignments, &mut centroids);
        if !empty_clusters.is_empty() {
            debug!(
                iteration = n_iterations,
                clusters = ?empty_clusters,
                "Empty clusters keep their previous centroid"
            );
        }

        let wss = within_cluster_ss(data, &centroids.view(), &assignments, config.metric)?;
        wss_history.push(wss);

        let shift = max_centroid_shift(&prev_centroids.view(), &centroids.view());

        debug!(
            iteration = n_iterations,
            max_iters = config.max_iters,
            shift,
            wss,
            elapsed_s = iter_start.elapsed().as_secs_f64(),
            "k-means iteration"
        );

        if config.tol >= 0.0 && shift <= config.tol {
            converged = true;
            info!(
                iterations = n_iterations,
                shift,
                tol = config.tol,
                "k-means converged"
            );
            break;
        }
    }

    if !converged {
        warn!(
            iterations = n_iterations,
            "k-means stopped at the iteration cap without converging"
        );
    }

    let clusters = build_clusters(&centroids, &assignments);

    Ok(ClusteringResult {
        centroids,
        assignments,
        clusters,
        n_iterations,
        converged,
        wss_history,
    })
}

/// Initialize centroids as owned copies of k distinct, randomly chosen records
fn initialize_centroids<R: Rng + ?Sized>(
    data: &ArrayView2<f64>,
    k: usize,
    rng: &mut R,
) -> Array2<f64> {
    let n_samples = data.nrows();
    let n_features = data.ncols();

    let indices: Vec<usize> = (0..n_samples).collect();
    let selected: Vec<usize> = indices.choose_multiple(rng, k).cloned().collect();

    let mut centroids = Array2::zeros((k, n_features));
    for (mut centroid, &data_idx) in centroids.outer_iter_mut().zip(&selected) {
        centroid.assign(&data.row(data_idx));
    }

    centroids
}

/// Index of the nearest centroid to `point`; ties go to the lowest index
fn nearest_centroid(
    record: usize,
    point: &ArrayView1<f64>,
    centroids: &ArrayView2<f64>,
    metric: DistanceMetric,
) -> Result<usize> {
    let mut best_label = 0;
    let mut best_dist = f64::INFINITY;

    for (j, centroid) in centroids.outer_iter().enumerate() {
        let dist = metric
            .distance(point, &centroid)
            .map_err(|e| e.at_assignment(record, j))?;

        if dist < best_dist {
            best_dist = dist;
            best_label = j;
        }
    }

    Ok(best_label)
}

/// Assign every row of `data` to its nearest centroid.
///
/// The parallel path collects in row order, so both paths return the same
/// assignments.
pub fn assign_nearest(
    data: &ArrayView2<f64>,
    centroids: &ArrayView2<f64>,
    metric: DistanceMetric,
    parallel: bool,
) -> Result<Vec<usize>> {
    if parallel {
        (0..data.nrows())
            .into_par_iter()
            .map(|i| nearest_centroid(i, &data.row(i), centroids, metric))
            .collect()
    } else {
        data.outer_iter()
            .enumerate()
            .map(|(i, row)| nearest_centroid(i, &row, centroids, metric))
            .collect()
    }
}

/// Move each centroid to the mean of its members.
///
/// A cluster with no members keeps its previous centroid, since the mean of
/// nothing is undefined. Returns the indices of those empty clusters.
fn update_centroids(
    data: &ArrayView2<f64>,
    assignments: &[usize],
    centroids: &mut Array2<f64>,
) -> Vec<usize> {
    let k = centroids.nrows();
    let mut cluster_sums: Array2<f64> = Array2::zeros(centroids.raw_dim());
    let mut cluster_counts = vec![0usize; k];

    for (row, &cluster_idx) in data.outer_iter().zip(assignments) {
        cluster_counts[cluster_idx] += 1;
        cluster_sums.row_mut(cluster_idx).scaled_add(1.0, &row);
    }

    let mut empty_clusters = Vec::new();
    for (cluster_idx, &count) in cluster_counts.iter().enumerate() {
        if count > 0 {
            let mean = &cluster_sums.row(cluster_idx) / count as f64;
            centroids.row_mut(cluster_idx).assign(&mean);
        } else {
            empty_clusters.push(cluster_idx);
        }
    }

    empty_clusters
}

/// Sum over records of the squared distance to their assigned centroid
pub(crate) fn within_cluster_ss(
    data: &ArrayView2<f64>,
    centroids: &ArrayView2<f64>,
    assignments: &[usize],
    metric: DistanceMetric,
) -> Result<f64> {
    let mut wss = 0.0;
    for (i, (row, &cluster_idx)) in data.outer_iter().zip(assignments).enumerate() {
        wss += metric
            .squared_distance(&row, &centroids.row(cluster_idx))
            .map_err(|e| e.at_assignment(i, cluster_idx))?;
    }
    Ok(wss)
}

fn build_clusters(centroids: &Array2<f64>, assignments: &[usize]) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = centroids
        .outer_iter()
        .map(|c| Cluster {
            centroid: c.to_owned(),
            members: Vec::new(),
        })
        .collect();

    for (record_idx, &cluster_idx) in assignments.iter().enumerate() {
        clusters[cluster_idx].members.push(record_idx);
    }

    clusters
}

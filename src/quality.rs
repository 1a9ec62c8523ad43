//! Cluster quality measures: label entropy and the within/between sum-of-squares
//! decomposition.
//!
//! Under [`DistanceMetric::Euclidean`] the decomposition satisfies
//! `WSS + BSS == TSS` up to rounding and WSS never rises between K-means
//! iterations. Neither holds for [`DistanceMetric::Cosine`], whose mean update
//! does not minimise squared cosine distance.

use crate::algorithm::{within_cluster_ss, Cluster, ClusteringResult};
use crate::distance::{midpoint, DistanceMetric};
use crate::error::{ClusterError, Result};
use crate::record::{ClassRegistry, Dataset};
use ndarray::{Array1, ArrayView1, ArrayView2};

/// Shannon entropy (base 2) of a label distribution over the registry's classes.
///
/// Unlabeled entries are ignored. With no labeled entries, including an empty
/// cluster, the entropy is 0.
pub fn entropy<'a, I>(labels: I, classes: &ClassRegistry) -> f64
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut counts = vec![0usize; classes.len()];
    let mut total = 0usize;

    for label in labels.into_iter().flatten() {
        debug_assert!(classes.contains(label), "label '{}' missing from class registry", label);
        if let Some(idx) = classes.index_of(label) {
            counts[idx] += 1;
            total += 1;
        }
    }

    if total == 0 {
        return 0.0;
    }

    let total = total as f64;
    -counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            p * p.log2()
        })
        .sum::<f64>()
}

/// Entropy of one cluster's member labels
pub fn cluster_entropy(cluster: &Cluster, dataset: &Dataset) -> f64 {
    entropy(
        cluster
            .member_records(dataset.records())
            .map(|r| r.label.as_deref()),
        dataset.classes(),
    )
}

/// Most frequent label in a cluster; ties go to the earliest registered class
pub fn majority_label<'d>(cluster: &Cluster, dataset: &'d Dataset) -> Option<&'d str> {
    let classes = dataset.classes();
    let mut counts = vec![0usize; classes.len()];
    for record in cluster.member_records(dataset.records()) {
        if let Some(idx) = record.label.as_deref().and_then(|l| classes.index_of(l)) {
            counts[idx] += 1;
        }
    }

    let mut best: Option<(usize, usize)> = None;
    for (idx, &count) in counts.iter().enumerate() {
        if count > 0 && best.map_or(true, |(_, c)| count > c) {
            best = Some((idx, count));
        }
    }
    best.and_then(|(idx, _)| classes.name(idx))
}

/// Squared distances from the members of cluster `cluster_idx` to its centroid, summed
pub fn cluster_wss(
    result: &ClusteringResult,
    cluster_idx: usize,
    data: &ArrayView2<f64>,
    metric: DistanceMetric,
) -> Result<f64> {
    let cluster = &result.clusters[cluster_idx];
    let centroid = cluster.centroid.view();
    let mut wss = 0.0;
    for &i in &cluster.members {
        wss += metric
            .squared_distance(&data.row(i), &centroid)
            .map_err(|e| e.at_assignment(i, cluster_idx))?;
    }
    Ok(wss)
}

/// Within-cluster sum of squares over the whole clustering
pub fn wss(result: &ClusteringResult, data: &ArrayView2<f64>, metric: DistanceMetric) -> Result<f64> {
    within_cluster_ss(data, &result.centroids.view(), &result.assignments, metric)
}

/// Cluster `cluster_idx`'s contribution to BSS: size × distance(centroid, midpoint)²
pub fn cluster_bss(
    result: &ClusteringResult,
    cluster_idx: usize,
    midpoint: &ArrayView1<f64>,
    metric: DistanceMetric,
) -> Result<f64> {
    let cluster = &result.clusters[cluster_idx];
    if cluster.is_empty() {
        return Ok(0.0);
    }
    let d2 = metric
        .squared_distance(&cluster.centroid.view(), midpoint)
        .map_err(|e| e.at_midpoint(format!("centroid {}", cluster_idx)))?;
    Ok(cluster.size() as f64 * d2)
}

/// Between-cluster sum of squares, measured against the attribute-wise mean of `data`
pub fn bss(result: &ClusteringResult, data: &ArrayView2<f64>, metric: DistanceMetric) -> Result<f64> {
    let mid = global_midpoint(data)?;
    (0..result.k())
        .map(|j| cluster_bss(result, j, &mid.view(), metric))
        .sum()
}

/// Total sum of squares: every record's squared distance to the global midpoint
pub fn total_ss(data: &ArrayView2<f64>, metric: DistanceMetric) -> Result<f64> {
    let mid = global_midpoint(data)?;
    let mut tss = 0.0;
    for (i, row) in data.outer_iter().enumerate() {
        tss += metric
            .squared_distance(&row, &mid.view())
            .map_err(|e| e.at_midpoint(format!("record {}", i)))?;
    }
    Ok(tss)
}

fn global_midpoint(data: &ArrayView2<f64>) -> Result<Array1<f64>> {
    midpoint(data).ok_or_else(|| {
        ClusterError::InsufficientData("cannot take the midpoint of zero records".to_string())
    })
}

/// Quality figures for a single cluster
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterQuality {
    pub size: usize,
    pub entropy: f64,
    pub wss: f64,
    pub bss: f64,
    pub majority_label: Option<String>,
}

/// Per-cluster and overall quality of one clustering run
#[derive(Debug, Clone, PartialEq)]
pub struct QualityReport {
    pub metric: DistanceMetric,
    pub clusters: Vec<ClusterQuality>,
    pub wss: f64,
    pub bss: f64,
    pub tss: f64,
    /// Cluster entropies weighted by cluster size
    pub weighted_entropy: f64,
    pub n_iterations: usize,
    pub converged: bool,
}

impl QualityReport {
    /// Score `result` against the records and labels it was fitted on
    pub fn compute(result: &ClusteringResult, dataset: &Dataset, metric: DistanceMetric) -> Result<Self> {
        if result.assignments.len() != dataset.len() {
            return Err(ClusterError::InvalidConfig(format!(
                "clustering covers {} records but the dataset has {}",
                result.assignments.len(),
                dataset.len()
            )));
        }

        let data = dataset.attributes();
        let data = data.view();
        let mid = global_midpoint(&data)?;

        let mut clusters = Vec::with_capacity(result.k());
        for (j, cluster) in result.clusters.iter().enumerate() {
            clusters.push(ClusterQuality {
                size: cluster.size(),
                entropy: cluster_entropy(cluster, dataset),
                wss: cluster_wss(result, j, &data, metric)?,
                bss: cluster_bss(result, j, &mid.view(), metric)?,
                majority_label: majority_label(cluster, dataset).map(str::to_string),
            });
        }

        let n = dataset.len() as f64;
        let weighted_entropy: f64 = clusters
            .iter()
            .map(|c| c.size as f64 / n * c.entropy)
            .sum();

        Ok(Self {
            metric,
            wss: clusters.iter().map(|c| c.wss).sum(),
            bss: clusters.iter().map(|c| c.bss).sum(),
            tss: total_ss(&data, metric)?,
            weighted_entropy,
            clusters,
            n_iterations: result.n_iterations,
            converged: result.converged,
        })
    }
}

use crate::algorithm::{assign_nearest, kmeans_from_centroids, kmeans_lloyd, ClusteringResult};
use crate::config::KMeansConfig;
use crate::error::{ClusterError, Result};
use crate::quality::QualityReport;
use crate::record::Dataset;
use ndarray::{Array2, ArrayView2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// K-means clustering over a [`Dataset`].
///
/// Centroids are seeded from a ChaCha8 generator keyed by `config.seed`, so
/// two fits with the same configuration on the same data return identical
/// clusterings.
///
/// # Example
///
/// ```
/// use clusterscope_rs::{Dataset, KMeans, KMeansConfig, Record};
///
/// let dataset = Dataset::from_records(vec![
///     Record::new(vec![0.0, 0.0], "A"),
///     Record::new(vec![0.0, 1.0], "A"),
///     Record::new(vec![10.0, 10.0], "B"),
///     Record::new(vec![10.0, 11.0], "B"),
/// ])
/// .unwrap();
///
/// let mut kmeans = KMeans::with_config(KMeansConfig::new(2).with_seed(42));
/// let result = kmeans.fit(&dataset).unwrap();
/// assert!(result.converged);
///
/// let report = kmeans.quality(&dataset).unwrap();
/// assert_eq!(report.weighted_entropy, 0.0);
/// ```
pub struct KMeans {
    /// Model configuration
    config: KMeansConfig,

    /// Number of features (dimensions), set by the first fit
    d: usize,

    /// Result of the last fit (None if not yet fitted)
    result: Option<ClusteringResult>,
}

impl KMeans {
    /// Create a new KMeans instance with default configuration and `k` clusters.
    ///
    /// An invalid `k` is reported by [`KMeans::fit`], before any work starts.
    pub fn new(k: usize) -> Self {
        Self::with_config(KMeansConfig::new(k))
    }

    /// Create a new KMeans instance with custom configuration.
    pub fn with_config(config: KMeansConfig) -> Self {
        Self {
            config,
            d: 0,
            result: None,
        }
    }

    /// Cluster the records of `dataset`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `k` is 0 or larger than the number of records
    /// - the attribute count differs from a previous fit
    /// - a distance is undefined for some record/centroid pair
    pub fn fit(&mut self, dataset: &Dataset) -> Result<&ClusteringResult> {
        let data = dataset.attributes();
        self.fit_array(&data.view())
    }

    /// Cluster the rows of an attribute matrix.
    pub fn fit_array(&mut self, data: &ArrayView2<f64>) -> Result<&ClusteringResult> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.fit_with_rng(data, &mut rng)
    }

    /// Cluster the rows of `data`, drawing initial centroids from `rng`.
    pub fn fit_with_rng<R: Rng + ?Sized>(
        &mut self,
        data: &ArrayView2<f64>,
        rng: &mut R,
    ) -> Result<&ClusteringResult> {
        self.check_dimensions(data.ncols())?;
        let result = kmeans_lloyd(data, &self.config, rng)?;
        Ok(&*self.result.insert(result))
    }

    /// Cluster the rows of `data` starting from explicit centroids.
    ///
    /// The number of clusters is taken from `initial`; `config.k` is updated to match.
    pub fn fit_from_centroids(
        &mut self,
        data: &ArrayView2<f64>,
        initial: Array2<f64>,
    ) -> Result<&ClusteringResult> {
        self.check_dimensions(data.ncols())?;
        let result = kmeans_from_centroids(data, initial, &self.config)?;
        self.config.k = result.k();
        Ok(&*self.result.insert(result))
    }

    /// Assign new records to the nearest fitted centroid.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The model has not been fitted yet
    /// - Data dimensions don't match the training data
    pub fn predict(&self, data: &ArrayView2<f64>) -> Result<Vec<usize>> {
        let result = self.result.as_ref().ok_or(ClusterError::NotFitted)?;

        if data.ncols() != self.d {
            return Err(ClusterError::DimensionMismatch {
                expected: self.d,
                found: data.ncols(),
            });
        }

        assign_nearest(
            data,
            &result.centroids.view(),
            self.config.metric,
            self.config.parallel,
        )
    }

    /// Score the last fit against the labels of the dataset it was fitted on.
    pub fn quality(&self, dataset: &Dataset) -> Result<QualityReport> {
        let result = self.result.as_ref().ok_or(ClusterError::NotFitted)?;
        QualityReport::compute(result, dataset, self.config.metric)
    }

    /// Result of the last fit, if any
    pub fn result(&self) -> Option<&ClusteringResult> {
        self.result.as_ref()
    }

    /// Get the centroids of the fitted model.
    pub fn centroids(&self) -> Option<&Array2<f64>> {
        self.result.as_ref().map(|r| &r.centroids)
    }

    /// Get the number of clusters.
    pub fn k(&self) -> usize {
        self.config.k
    }

    /// Get the number of features (dimensions).
    pub fn d(&self) -> usize {
        self.d
    }

    /// Get the configuration.
    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }

    // Set dimensions on first call, validate on subsequent calls
    fn check_dimensions(&mut self, n_features: usize) -> Result<()> {
        if self.d == 0 {
            self.d = n_features;
        } else if n_features != self.d {
            return Err(ClusterError::DimensionMismatch {
                expected: self.d,
                found: n_features,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use ndarray::array;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;

    fn two_groups() -> Dataset {
        Dataset::from_records(vec![
            Record::new(vec![0.0, 0.0], "A"),
            Record::new(vec![0.0, 1.0], "A"),
            Record::new(vec![10.0, 10.0], "B"),
            Record::new(vec![10.0, 11.0], "B"),
        ])
        .unwrap()
    }

    #[test]
    fn test_kmeans_new() {
        let kmeans = KMeans::new(10);
        assert_eq!(kmeans.k(), 10);
        assert_eq!(kmeans.d(), 0);
        assert!(kmeans.centroids().is_none());
    }

    #[test]
    fn test_kmeans_fit() {
        let data = Array2::random((100, 8), Uniform::new(-1.0, 1.0));
        let mut kmeans = KMeans::new(5);

        kmeans.fit_array(&data.view()).unwrap();

        let centroids = kmeans.centroids().unwrap();
        assert_eq!(centroids.nrows(), 5);
        assert_eq!(centroids.ncols(), 8);
        assert_eq!(kmeans.d(), 8);
    }

    #[test]
    fn test_kmeans_predict_matches_fit_assignments() {
        let dataset = two_groups();
        let mut kmeans = KMeans::with_config(KMeansConfig::new(2).with_seed(5));

        let assignments = kmeans.fit(&dataset).unwrap().assignments.clone();
        let predicted = kmeans.predict(&dataset.attributes().view()).unwrap();

        assert_eq!(assignments, predicted);
    }

    #[test]
    fn test_kmeans_predict_before_fit() {
        let kmeans = KMeans::new(2);
        let data = array![[0.0, 0.0]];

        let result = kmeans.predict(&data.view());
        assert!(matches!(result, Err(ClusterError::NotFitted)));
    }

    #[test]
    fn test_kmeans_dimension_mismatch() {
        let mut kmeans = KMeans::new(2);
        kmeans.fit(&two_groups()).unwrap();

        let test_data = array![[1.0, 2.0, 3.0]];
        let result = kmeans.predict(&test_data.view());
        assert!(matches!(result, Err(ClusterError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_kmeans_k_zero() {
        let mut kmeans = KMeans::new(0);
        let result = kmeans.fit(&two_groups());
        assert!(matches!(result, Err(ClusterError::InvalidK(_))));
    }

    #[test]
    fn test_fit_from_centroids_sets_k() {
        let dataset = two_groups();
        let mut kmeans = KMeans::new(7);

        let initial = array![[0.0, 0.0], [10.0, 10.0]];
        let result = kmeans
            .fit_from_centroids(&dataset.attributes().view(), initial)
            .unwrap();

        assert_eq!(result.k(), 2);
        assert_eq!(kmeans.k(), 2);
    }
}

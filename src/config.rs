use crate::distance::DistanceMetric;

/// Configuration for the K-means algorithm
#[derive(Debug, Clone)]
pub struct KMeansConfig {
    /// Number of clusters
    pub k: usize,

    /// Maximum number of iterations. Hitting the cap is reported through
    /// [`ClusteringResult::converged`](crate::ClusteringResult::converged), not as an error.
    pub max_iters: usize,

    /// Convergence tolerance. The run stops once no centroid moves further than
    /// this (Euclidean) between iterations. Set to a negative value to disable
    /// early stopping.
    pub tol: f64,

    /// Random seed for centroid initialization
    pub seed: u64,

    /// Distance used for assignment and quality measures
    pub metric: DistanceMetric,

    /// Split the assignment step across rayon workers
    pub parallel: bool,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            k: 8,
            max_iters: 100,
            tol: 1e-8,
            seed: 0,
            metric: DistanceMetric::Euclidean,
            parallel: false,
        }
    }
}

impl KMeansConfig {
    /// Create a new configuration with the specified number of clusters
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    /// Set the maximum number of iterations
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Set the convergence tolerance
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the distance metric
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Enable or disable parallel assignment
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Configuration for the k-nearest-neighbors classifier
#[derive(Debug, Clone)]
pub struct KnnConfig {
    /// Number of neighbors consulted. Clamped to the pool size at prediction time.
    pub k: usize,

    /// Distance used to rank neighbors
    pub metric: DistanceMetric,

    /// Predict batches of queries across rayon workers
    pub parallel: bool,
}

impl Default for KnnConfig {
    fn default() -> Self {
        Self {
            k: 3,
            metric: DistanceMetric::Euclidean,
            parallel: false,
        }
    }
}

impl KnnConfig {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

use crate::config::KnnConfig;
use crate::error::{ClusterError, Result};
use crate::evaluation::ConfusionMatrix;
use crate::record::{ClassRegistry, Dataset};
use ndarray::{Array2, ArrayView1, ArrayView2};
use rayon::prelude::*;

/// Distance-weighted k-nearest-neighbors classifier.
///
/// Each of the `k` nearest pool records votes for its label with weight
/// `1 / distance`. Ordering and tie-breaks are fixed:
///
/// - neighbors are sorted by distance with a stable sort, so equidistant pool
///   records keep their pool order;
/// - if any selected neighbor sits at distance 0 (or so close that `1 / d`
///   overflows), only those exact matches vote, one vote each;
/// - among labels with equal weight, the one first encountered in neighbor
///   order wins.
///
/// `k` larger than the pool is clamped to the pool size.
///
/// # Example
///
/// ```
/// use clusterscope_rs::{Dataset, KnnClassifier, KnnConfig, Record};
/// use ndarray::array;
///
/// let pool = Dataset::from_records(vec![
///     Record::new(vec![0.0, 0.0], "A"),
///     Record::new(vec![0.0, 1.0], "A"),
///     Record::new(vec![10.0, 10.0], "B"),
/// ])
/// .unwrap();
///
/// let mut knn = KnnClassifier::new(KnnConfig::new(3));
/// knn.fit(&pool).unwrap();
///
/// let query = array![1.0, 1.0];
/// assert_eq!(knn.predict(&query.view()).unwrap(), "A");
/// ```
pub struct KnnClassifier {
    config: KnnConfig,

    /// Pool attribute vectors, one row per record
    pool: Option<Array2<f64>>,

    /// Class index of every pool record
    labels: Vec<usize>,

    classes: ClassRegistry,
}

impl KnnClassifier {
    pub fn new(config: KnnConfig) -> Self {
        Self {
            config,
            pool: None,
            labels: Vec::new(),
            classes: ClassRegistry::new(),
        }
    }

    /// Store `pool` as the labeled neighbors for later predictions.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `k` is 0
    /// - the pool is empty
    /// - a pool record has no label
    pub fn fit(&mut self, pool: &Dataset) -> Result<&mut Self> {
        if self.config.k == 0 {
            return Err(ClusterError::InvalidK(
                "k must be greater than 0".to_string(),
            ));
        }
        if pool.is_empty() {
            return Err(ClusterError::EmptyPool);
        }

        let classes = pool.classes().clone();
        let labels = pool
            .labels()
            .enumerate()
            .map(|(i, label)| {
                label
                    .and_then(|l| classes.index_of(l))
                    .ok_or(ClusterError::UnlabeledRecord(i))
            })
            .collect::<Result<Vec<_>>>()?;

        self.pool = Some(pool.attributes());
        self.labels = labels;
        self.classes = classes;
        Ok(self)
    }

    /// Predict the label of one query vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the classifier is not fitted, the query length differs
    /// from the pool's, or a distance is undefined.
    pub fn predict(&self, query: &ArrayView1<f64>) -> Result<&str> {
        let votes = self.votes(query)?;

        let mut best: Option<(&str, f64)> = None;
        for (label, weight) in votes {
            if best.map_or(true, |(_, w)| weight > w) {
                best = Some((label, weight));
            }
        }

        // A fitted pool always yields at least one neighbor
        best.map(|(label, _)| label).ok_or(ClusterError::EmptyPool)
    }

    /// Accumulated vote weight per label, in the order labels were first
    /// encountered among the neighbors.
    pub fn votes(&self, query: &ArrayView1<f64>) -> Result<Vec<(&str, f64)>> {
        let neighbors = self.neighbors(query)?;
        let exact_only = neighbors.iter().any(|&(_, d)| is_exact(d));

        let mut tally: Vec<(usize, f64)> = Vec::new();
        for &(i, dist) in &neighbors {
            let weight = match (exact_only, is_exact(dist)) {
                (true, true) => 1.0,
                (true, false) => continue,
                (false, _) => 1.0 / dist,
            };

            let class = self.labels[i];
            match tally.iter_mut().find(|(c, _)| *c == class) {
                Some((_, total)) => *total += weight,
                None => tally.push((class, weight)),
            }
        }

        Ok(tally
            .into_iter()
            .map(|(c, w)| (self.classes.name(c).unwrap_or_default(), w))
            .collect())
    }

    /// The `k` nearest pool records as `(pool index, distance)`, nearest first
    pub fn neighbors(&self, query: &ArrayView1<f64>) -> Result<Vec<(usize, f64)>> {
        let pool = self.pool.as_ref().ok_or(ClusterError::NotFitted)?;

        if query.len() != pool.ncols() {
            return Err(ClusterError::DimensionMismatch {
                expected: pool.ncols(),
                found: query.len(),
            });
        }

        let mut dists = Vec::with_capacity(pool.nrows());
        for (i, row) in pool.outer_iter().enumerate() {
            let d = self
                .config
                .metric
                .distance(query, &row)
                .map_err(|e| e.at_neighbor(i))?;
            dists.push((i, d));
        }

        // Stable: equal distances keep pool order
        dists.sort_by(|a, b| a.1.total_cmp(&b.1));
        dists.truncate(self.config.k.min(pool.nrows()));
        Ok(dists)
    }

    /// Predict a label for every row of `queries`
    pub fn predict_batch(&self, queries: &ArrayView2<f64>) -> Result<Vec<&str>> {
        if self.config.parallel {
            (0..queries.nrows())
                .into_par_iter()
                .map(|i| self.predict(&queries.row(i)))
                .collect()
        } else {
            queries
                .outer_iter()
                .map(|row| self.predict(&row))
                .collect()
        }
    }

    /// Classify every record of a labeled test set and tabulate the outcome.
    ///
    /// The matrix covers the classes of both the pool and the test set.
    pub fn evaluate(&self, test: &Dataset) -> Result<ConfusionMatrix> {
        let mut classes = self.classes.clone();
        for name in test.classes().names() {
            classes.register(name);
        }

        let predictions = self.predict_batch(&test.attributes().view())?;

        let mut matrix = ConfusionMatrix::new(classes);
        for (i, (actual, predicted)) in test.labels().zip(predictions).enumerate() {
            let actual = actual.ok_or(ClusterError::UnlabeledRecord(i))?;
            matrix.add(actual, predicted)?;
        }
        Ok(matrix)
    }

    pub fn config(&self) -> &KnnConfig {
        &self.config
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }
}

#[inline]
fn is_exact(dist: f64) -> bool {
    !(1.0 / dist).is_finite()
}

use crate::error::{ClusterError, NumericError, Result};
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

/// Pairwise distance between two attribute vectors.
///
/// The set of metrics is closed; pick one through [`KMeansConfig`](crate::KMeansConfig)
/// or [`KnnConfig`](crate::KnnConfig) and call [`DistanceMetric::distance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DistanceMetric {
    /// sqrt(sum((a_i - b_i)^2))
    #[default]
    Euclidean,

    /// 1 - (a.b) / (|a| |b|)
    ///
    /// Undefined for zero-magnitude operands, which yield
    /// [`NumericError::ZeroMagnitude`] instead of NaN. Unlike Euclidean, this
    /// metric does not minimise squared error under mean updates, so WSS may
    /// rise between K-means iterations and WSS + BSS need not equal TSS.
    Cosine,
}

impl DistanceMetric {
    /// All metrics, in reporting order
    pub const ALL: [DistanceMetric; 2] = [DistanceMetric::Euclidean, DistanceMetric::Cosine];

    /// Human-readable metric name
    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::Cosine => "cosine",
        }
    }

    /// Distance between `a` and `b`.
    ///
    /// # Errors
    ///
    /// - [`ClusterError::DimensionMismatch`] when the lengths differ
    /// - [`ClusterError::Numeric`] when the result would be NaN or infinite
    pub fn distance(&self, a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> Result<f64> {
        if a.len() != b.len() {
            return Err(ClusterError::DimensionMismatch {
                expected: a.len(),
                found: b.len(),
            });
        }

        let dist = match self {
            DistanceMetric::Euclidean => squared_euclidean(a, b).sqrt(),
            DistanceMetric::Cosine => cosine_complement(a, b)?,
        };

        if !dist.is_finite() {
            return Err(NumericError::NonFiniteDistance(dist).into());
        }
        Ok(dist)
    }

    /// Squared distance, used by the sum-of-squares quality measures
    #[inline]
    pub fn squared_distance(&self, a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> Result<f64> {
        let d = self.distance(a, b)?;
        Ok(d * d)
    }
}

impl std::fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" => Ok(DistanceMetric::Euclidean),
            "cosine" => Ok(DistanceMetric::Cosine),
            other => Err(format!("unknown distance metric '{}'", other)),
        }
    }
}

#[inline]
fn squared_euclidean(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

fn cosine_complement(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> Result<f64> {
    let dot = a.dot(b);
    let a_norm = a.dot(a).sqrt();
    let b_norm = b.dot(b).sqrt();

    if a_norm == 0.0 || b_norm == 0.0 {
        return Err(NumericError::ZeroMagnitude.into());
    }

    let dist = 1.0 - dot / (a_norm * b_norm);
    if dist.is_nan() {
        return Err(NumericError::NonFiniteDistance(dist).into());
    }

    // Rounding can push the similarity a hair above 1
    Ok(dist.max(0.0))
}

/// Attribute-wise mean of every row, the "global midpoint" of a dataset
pub fn midpoint(data: &ArrayView2<f64>) -> Option<Array1<f64>> {
    data.mean_axis(Axis(0))
}

/// Largest Euclidean movement of any single centroid between two iterations
pub fn max_centroid_shift(old_centroids: &ArrayView2<f64>, new_centroids: &ArrayView2<f64>) -> f64 {
    old_centroids
        .outer_iter()
        .zip(new_centroids.outer_iter())
        .map(|(old_c, new_c)| squared_euclidean(&old_c, &new_c).sqrt())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_euclidean_distance() {
        let a = array![0.0, 0.0];
        let b = array![3.0, 4.0];

        let d = DistanceMetric::Euclidean.distance(&a.view(), &b.view()).unwrap();
        assert_relative_eq!(d, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_euclidean_self_distance_is_zero() {
        let a = array![1.5, -2.0, 7.25];
        let d = DistanceMetric::Euclidean.distance(&a.view(), &a.view()).unwrap();
        assert_eq!(d, 0.0);
    }

    #[test]
    fn test_metrics_are_symmetric() {
        let a = array![1.0, 2.0, 3.0];
        let b = array![-4.0, 0.5, 9.0];

        for metric in DistanceMetric::ALL {
            let ab = metric.distance(&a.view(), &b.view()).unwrap();
            let ba = metric.distance(&b.view(), &a.view()).unwrap();
            assert_eq!(ab, ba, "{} should be symmetric", metric);
        }
    }

    #[test]
    fn test_cosine_distance() {
        let a = array![1.0, 0.0];
        let b = array![0.0, 1.0];
        let c = array![2.0, 0.0];
        let d = array![-1.0, 0.0];

        let metric = DistanceMetric::Cosine;
        assert_relative_eq!(metric.distance(&a.view(), &b.view()).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(metric.distance(&a.view(), &c.view()).unwrap(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(metric.distance(&a.view(), &d.view()).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cosine_zero_magnitude() {
        let a = array![0.0, 0.0];
        let b = array![1.0, 1.0];

        let result = DistanceMetric::Cosine.distance(&a.view(), &b.view());
        assert!(matches!(
            result,
            Err(ClusterError::Numeric(NumericError::ZeroMagnitude))
        ));
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = array![1.0, 2.0];
        let b = array![1.0, 2.0, 3.0];

        for metric in DistanceMetric::ALL {
            let result = metric.distance(&a.view(), &b.view());
            assert!(matches!(
                result,
                Err(ClusterError::DimensionMismatch {
                    expected: 2,
                    found: 3
                })
            ));
        }
    }

    #[test]
    fn test_nan_attribute_is_reported() {
        let a = array![f64::NAN, 1.0];
        let b = array![0.0, 1.0];

        let result = DistanceMetric::Euclidean.distance(&a.view(), &b.view());
        assert!(matches!(
            result,
            Err(ClusterError::Numeric(NumericError::NonFiniteDistance(_)))
        ));
    }

    #[test]
    fn test_parse_metric() {
        assert_eq!("Euclidean".parse::<DistanceMetric>(), Ok(DistanceMetric::Euclidean));
        assert_eq!("cosine".parse::<DistanceMetric>(), Ok(DistanceMetric::Cosine));
        assert!("manhattan".parse::<DistanceMetric>().is_err());
    }

    #[test]
    fn test_centroid_shift() {
        let old = array![[0.0, 0.0], [1.0, 1.0]];
        let new = array![[3.0, 4.0], [1.0, 2.0]];

        let shift = max_centroid_shift(&old.view(), &new.view());
        assert_relative_eq!(shift, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_midpoint() {
        let data = array![[0.0, 0.0], [2.0, 4.0]];
        let mid = midpoint(&data.view()).unwrap();
        assert_eq!(mid, array![1.0, 2.0]);
    }
}

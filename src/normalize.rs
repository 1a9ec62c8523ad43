use crate::error::{ClusterError, Result};
use crate::record::Dataset;
use ndarray::{Array1, Axis, Zip};

/// Per-attribute rescaling applied before clustering or classification
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalization {
    /// (x - min) / (max - min), with min and max taken from the training set
    MinMax,

    /// (x - min) / (max - min) for fixed bounds shared by every attribute
    ScaledMinMax { min: f64, max: f64 },

    /// (x - mean) / sample standard deviation, from the training set
    ZScore,
}

impl std::str::FromStr for Normalization {
    type Err = String;

    /// Parses `min-max`, `z-score`, or `scaled-min-max[:MIN:MAX]`
    /// (default bounds 20 and 16000).
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = s.split(':');
        match parts.next().map(str::to_ascii_lowercase).as_deref() {
            Some("min-max") | Some("minmax") => Ok(Normalization::MinMax),
            Some("z-score") | Some("zscore") => Ok(Normalization::ZScore),
            Some("scaled-min-max") | Some("scaled") => {
                let min = parts.next().map(str::parse::<f64>).transpose().map_err(|e| format!("{}", e))?;
                let max = parts.next().map(str::parse::<f64>).transpose().map_err(|e| format!("{}", e))?;
                Ok(Normalization::ScaledMinMax {
                    min: min.unwrap_or(20.0),
                    max: max.unwrap_or(16_000.0),
                })
            }
            _ => Err(format!("unknown normalization '{}'", s)),
        }
    }
}

/// Rescaling parameters learned from a training set.
///
/// Apply the same `Normalizer` to the training and the test set so both share
/// one coordinate system.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalizer {
    kind: Normalization,
    offsets: Array1<f64>,
    scales: Array1<f64>,
}

impl Normalizer {
    /// Learn per-attribute parameters from `train`.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::InsufficientData`] if `train` is empty.
    pub fn fit(kind: Normalization, train: &Dataset) -> Result<Self> {
        if train.is_empty() {
            return Err(ClusterError::InsufficientData(
                "cannot learn normalization from zero records".to_string(),
            ));
        }

        let data = train.attributes();
        let n_features = data.ncols();

        let (offsets, scales) = match kind {
            Normalization::MinMax => {
                let mins = data.fold_axis(Axis(0), f64::INFINITY, |&acc, &x| acc.min(x));
                let maxs = data.fold_axis(Axis(0), f64::NEG_INFINITY, |&acc, &x| acc.max(x));
                let ranges = &maxs - &mins;
                (mins, ranges)
            }
            Normalization::ScaledMinMax { min, max } => (
                Array1::from_elem(n_features, min),
                Array1::from_elem(n_features, max - min),
            ),
            Normalization::ZScore => {
                let means = data
                    .mean_axis(Axis(0))
                    .unwrap_or_else(|| Array1::zeros(n_features));
                let stds = if data.nrows() > 1 {
                    data.std_axis(Axis(0), 1.0)
                } else {
                    Array1::zeros(n_features)
                };
                (means, stds)
            }
        };

        Ok(Self {
            kind,
            offsets,
            scales,
        })
    }

    /// Value given to every entry of an attribute that does not vary
    fn degenerate_value(&self) -> f64 {
        match self.kind {
            Normalization::MinMax | Normalization::ScaledMinMax { .. } => 0.5,
            Normalization::ZScore => 0.0,
        }
    }

    /// Rewrite the attributes of `dataset` in place.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::DimensionMismatch`] if the attribute count differs
    /// from the training set's.
    pub fn apply(&self, dataset: &mut Dataset) -> Result<()> {
        if !dataset.is_empty() && dataset.n_features() != self.offsets.len() {
            return Err(ClusterError::DimensionMismatch {
                expected: self.offsets.len(),
                found: dataset.n_features(),
            });
        }

        let fallback = self.degenerate_value();
        for mut row in dataset.attributes_mut() {
            Zip::from(&mut row)
                .and(&self.offsets)
                .and(&self.scales)
                .for_each(|x, &offset, &scale| {
                    *x = if scale == 0.0 || !scale.is_finite() {
                        fallback
                    } else {
                        (*x - offset) / scale
                    };
                });
        }
        Ok(())
    }

    pub fn kind(&self) -> Normalization {
        self.kind
    }
}

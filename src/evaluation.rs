use crate::error::{ClusterError, Result};
use crate::record::ClassRegistry;
use ndarray::Array2;

/// Precision, recall and F1 for one class
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of records whose actual class is `label`
    pub support: usize,
}

/// Counts of (actual, predicted) class pairs.
///
/// Rows are actual classes, columns predicted classes, both indexed by the
/// registry the matrix was created with.
#[derive(Debug, Clone)]
pub struct ConfusionMatrix {
    classes: ClassRegistry,
    counts: Array2<usize>,
}

impl ConfusionMatrix {
    pub fn new(classes: ClassRegistry) -> Self {
        let n = classes.len();
        Self {
            classes,
            counts: Array2::zeros((n, n)),
        }
    }

    /// Record one prediction.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::InvalidConfig`] if either label is not a registered class.
    pub fn add(&mut self, actual: &str, predicted: &str) -> Result<()> {
        let a = self.class_index(actual)?;
        let p = self.class_index(predicted)?;
        self.counts[[a, p]] += 1;
        Ok(())
    }

    fn class_index(&self, label: &str) -> Result<usize> {
        self.classes.index_of(label).ok_or_else(|| {
            ClusterError::InvalidConfig(format!("label '{}' is not a registered class", label))
        })
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    /// Number of records with actual class `actual` predicted as `predicted`
    pub fn count(&self, actual: &str, predicted: &str) -> usize {
        match (self.classes.index_of(actual), self.classes.index_of(predicted)) {
            (Some(a), Some(p)) => self.counts[[a, p]],
            _ => 0,
        }
    }

    pub fn total(&self) -> usize {
        self.counts.sum()
    }

    /// Fraction of predictions on the diagonal; 0 for an empty matrix
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.counts.diag().sum() as f64 / total as f64
    }

    /// Per-class metrics in registry order. Undefined ratios are reported as 0.
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        (0..self.classes.len())
            .map(|c| {
                let tp = self.counts[[c, c]] as f64;
                let predicted = self.counts.column(c).sum() as f64;
                let support = self.counts.row(c).sum();

                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support as f64);
                let f1 = ratio(2.0 * precision * recall, precision + recall);

                ClassMetrics {
                    label: self.classes.name(c).unwrap_or_default().to_string(),
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    /// Unweighted mean F1 across classes
    pub fn macro_f1(&self) -> f64 {
        let metrics = self.class_metrics();
        if metrics.is_empty() {
            return 0.0;
        }
        metrics.iter().map(|m| m.f1).sum::<f64>() / metrics.len() as f64
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

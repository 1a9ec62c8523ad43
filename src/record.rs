use crate::error::{ClusterError, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayViewMut1};
use std::collections::HashMap;

/// An attribute vector with an optional class label
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub attributes: Array1<f64>,
    pub label: Option<String>,
}

impl Record {
    /// Create a labeled record
    pub fn new(attributes: impl Into<Array1<f64>>, label: impl Into<String>) -> Self {
        Self {
            attributes: attributes.into(),
            label: Some(label.into()),
        }
    }

    /// Create a record with no class label (a pure prediction query)
    pub fn unlabeled(attributes: impl Into<Array1<f64>>) -> Self {
        Self {
            attributes: attributes.into(),
            label: None,
        }
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn view(&self) -> ArrayView1<'_, f64> {
        self.attributes.view()
    }
}

/// The distinct class labels seen in a dataset, in first-seen order.
///
/// Class indices are stable: a label keeps the index it was registered with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassRegistry {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `label` if unseen and return its class index
    pub fn register(&mut self, label: &str) -> usize {
        if let Some(&idx) = self.index.get(label) {
            return idx;
        }
        let idx = self.names.len();
        self.names.push(label.to_string());
        self.index.insert(label.to_string(), idx);
        idx
    }

    /// Class index of `label`, if registered
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    pub fn name(&self, idx: usize) -> Option<&str> {
        self.names.get(idx).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// An ordered set of equal-length records and the registry of their labels
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
    classes: ClassRegistry,
    n_features: usize,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from records, registering every label.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::DimensionMismatch`] if the records differ in length.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Result<Self> {
        let mut dataset = Self::new();
        for record in records {
            dataset.push(record)?;
        }
        Ok(dataset)
    }

    /// Append a record. The first record fixes the attribute count.
    pub fn push(&mut self, record: Record) -> Result<()> {
        if self.records.is_empty() {
            self.n_features = record.len();
        } else if record.len() != self.n_features {
            return Err(ClusterError::DimensionMismatch {
                expected: self.n_features,
                found: record.len(),
            });
        }

        if let Some(label) = &record.label {
            self.classes.register(label);
        }
        self.records.push(record);
        Ok(())
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    /// Register labels that never occur in this dataset (e.g. classes seen only
    /// in a companion training set) so reports cover every class.
    pub fn merge_classes(&mut self, other: &ClassRegistry) {
        for name in other.names() {
            self.classes.register(name);
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of attributes per record
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Attribute vectors stacked into an (n_records, n_features) matrix
    pub fn attributes(&self) -> Array2<f64> {
        let mut data = Array2::zeros((self.records.len(), self.n_features));
        for (mut row, record) in data.outer_iter_mut().zip(&self.records) {
            row.assign(&record.attributes);
        }
        data
    }

    /// Mutable attribute rows, for in-place rewrites such as normalization
    pub fn attributes_mut(&mut self) -> impl Iterator<Item = ArrayViewMut1<'_, f64>> {
        self.records.iter_mut().map(|r| r.attributes.view_mut())
    }

    /// Label of every record, in dataset order
    pub fn labels(&self) -> impl Iterator<Item = Option<&str>> {
        self.records.iter().map(|r| r.label.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_registry_first_seen_order() {
        let mut registry = ClassRegistry::new();
        assert_eq!(registry.register("setosa"), 0);
        assert_eq!(registry.register("versicolor"), 1);
        assert_eq!(registry.register("setosa"), 0);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.name(1), Some("versicolor"));
        assert_eq!(registry.index_of("virginica"), None);
    }

    #[test]
    fn test_dataset_registers_labels() {
        let dataset = Dataset::from_records(vec![
            Record::new(vec![0.0, 1.0], "A"),
            Record::unlabeled(vec![2.0, 3.0]),
            Record::new(vec![4.0, 5.0], "B"),
        ])
        .unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.n_features(), 2);
        assert_eq!(dataset.classes().names(), &["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_dataset_rejects_ragged_records() {
        let result = Dataset::from_records(vec![
            Record::new(vec![0.0, 1.0], "A"),
            Record::new(vec![0.0, 1.0, 2.0], "A"),
        ]);

        assert!(matches!(
            result,
            Err(ClusterError::DimensionMismatch {
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn test_attribute_matrix() {
        let dataset = Dataset::from_records(vec![
            Record::new(vec![1.0, 2.0], "A"),
            Record::new(vec![3.0, 4.0], "B"),
        ])
        .unwrap();

        assert_eq!(dataset.attributes(), array![[1.0, 2.0], [3.0, 4.0]]);
    }

    #[test]
    fn test_attributes_mut_rewrites_in_place() {
        let mut dataset = Dataset::from_records(vec![Record::new(vec![1.0, 2.0], "A")]).unwrap();

        for mut row in dataset.attributes_mut() {
            row.mapv_inplace(|v| v * 10.0);
        }

        assert_eq!(dataset.records()[0].attributes, array![10.0, 20.0]);
    }
}

//! Minimal ARFF reader: numeric attributes followed by one nominal class column.
//!
//! Everything before the `@data` marker is skipped; attribute declarations are
//! not interpreted. Each data line is `v1,v2,...,vn,label`.

use crate::error::{ClusterError, Result};
use crate::record::{Dataset, Record};
use ndarray::Array1;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Read an ARFF file from disk
pub fn load_arff(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let dataset = parse_arff(reader)?;

    debug!(
        path = %path.display(),
        records = dataset.len(),
        attributes = dataset.n_features(),
        classes = dataset.classes().len(),
        "Loaded ARFF dataset"
    );

    Ok(dataset)
}

/// Parse ARFF content from any buffered reader
pub fn parse_arff<R: BufRead>(reader: R) -> Result<Dataset> {
    let mut dataset = Dataset::new();
    let mut in_data = false;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let trimmed = line.trim();

        if !in_data {
            if trimmed.to_ascii_lowercase().starts_with("@data") {
                in_data = true;
            }
            continue;
        }

        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }

        let record = parse_record(trimmed, line_no)?;
        dataset.push(record).map_err(|e| match e {
            ClusterError::DimensionMismatch { expected, found } => ClusterError::Parse {
                line: line_no,
                message: format!("expected {} attributes, found {}", expected, found),
            },
            other => other,
        })?;
    }

    if !in_data {
        return Err(ClusterError::MissingDataSection);
    }

    Ok(dataset)
}

fn parse_record(line: &str, line_no: usize) -> Result<Record> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < 2 {
        return Err(ClusterError::Parse {
            line: line_no,
            message: "expected at least one attribute and a class label".to_string(),
        });
    }

    let (values, label) = fields.split_at(fields.len() - 1);
    let attributes = values
        .iter()
        .enumerate()
        .map(|(col, v)| {
            v.parse::<f64>().map_err(|e| ClusterError::Parse {
                line: line_no,
                message: format!("attribute {}: '{}': {}", col + 1, v, e),
            })
        })
        .collect::<Result<Array1<f64>>>()?;

    let label = label[0].trim_matches(|c| c == '\'' || c == '"');
    if label.is_empty() || label == "?" {
        Ok(Record::unlabeled(attributes))
    } else {
        Ok(Record::new(attributes, label))
    }
}

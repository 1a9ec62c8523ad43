use thiserror::Error;

/// Numeric failures raised by a distance metric
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumericError {
    /// Cosine distance is undefined when either operand has zero magnitude
    #[error("zero-magnitude vector in cosine distance")]
    ZeroMagnitude,

    /// The computed distance was NaN or infinite
    #[error("non-finite distance: {0}")]
    NonFiniteDistance(f64),
}

/// Error types for the clusterscope library
#[derive(Error, Debug)]
pub enum ClusterError {
    /// The number of clusters or neighbors k is invalid (must be > 0)
    #[error("Invalid k value: {0}")]
    InvalidK(String),

    /// Not enough data points for the requested number of clusters
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Any other configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The kNN training pool has no records
    #[error("Training pool is empty")]
    EmptyPool,

    /// A record used for training or evaluation carries no class label
    #[error("Record {0} has no class label")]
    UnlabeledRecord(usize),

    /// Model has not been fitted yet
    #[error("Model has not been fitted. Call fit() first.")]
    NotFitted,

    /// Two attribute vectors of different length met
    #[error("Dimension mismatch: expected {expected} attributes, got {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// A metric failed outside of any record context
    #[error(transparent)]
    Numeric(#[from] NumericError),

    /// A metric failed while assigning a record to a centroid
    #[error("Numeric error between record {record} and centroid {centroid}: {source}")]
    Assignment {
        record: usize,
        centroid: usize,
        #[source]
        source: NumericError,
    },

    /// A metric failed while measuring a query against a pool record
    #[error("Numeric error between query and pool record {record}: {source}")]
    Neighbor {
        record: usize,
        #[source]
        source: NumericError,
    },

    /// A metric failed while measuring against the global data midpoint
    #[error("Numeric error measuring {subject} against the global midpoint: {source}")]
    Midpoint {
        subject: String,
        #[source]
        source: NumericError,
    },

    /// Input could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed input line
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The ARFF input never declared its `@data` section
    #[error("No @data section found")]
    MissingDataSection,
}

impl ClusterError {
    /// Attach a record/centroid pair to a numeric failure raised during assignment.
    ///
    /// Non-numeric errors pass through untouched.
    pub(crate) fn at_assignment(self, record: usize, centroid: usize) -> Self {
        match self {
            ClusterError::Numeric(source) => ClusterError::Assignment {
                record,
                centroid,
                source,
            },
            other => other,
        }
    }

    /// Attach a pool index to a numeric failure raised during a neighbor search.
    pub(crate) fn at_neighbor(self, record: usize) -> Self {
        match self {
            ClusterError::Numeric(source) => ClusterError::Neighbor { record, source },
            other => other,
        }
    }

    /// Attach a description of what was measured against the global midpoint.
    pub(crate) fn at_midpoint(self, subject: String) -> Self {
        match self {
            ClusterError::Numeric(source) => ClusterError::Midpoint { subject, source },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClusterError>;

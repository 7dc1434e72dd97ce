use crate::correlation::CorrelationError;
use std::fmt;
use thiserror::Error;

/// Errors that escape the network construction.
#[derive(Debug, Error)]
pub enum TgeconetError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("data retrieval error: {0}")]
    DataRetrieval(String),
    #[error("lookup error: {0}")]
    Lookup(String),
    #[error("input error: {0}")]
    Input(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, TgeconetError>;

/// For callers that correlate outside the graph builder and want `?`.
impl From<CorrelationError> for TgeconetError {
    fn from(e: CorrelationError) -> Self {
        Self::Input(e.to_string())
    }
}

/// Why a gene pair produced no edge for a timepoint. Never escapes the
/// graph builder.
#[derive(Debug, Clone, PartialEq)]
pub enum PairSkip {
    MissingData { gene: String },
    InsufficientSampleSize { gene: String, len: usize },
    LengthMismatch { left: usize, right: usize },
    NumericalDegeneracy,
}

impl fmt::Display for PairSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingData { gene } => write!(f, "no expression rows for {gene}"),
            Self::InsufficientSampleSize { gene, len } => {
                write!(f, "sample size {len} for {gene} is less than 3")
            }
            Self::LengthMismatch { left, right } => {
                write!(f, "sample vectors differ in length ({left} vs {right})")
            }
            Self::NumericalDegeneracy => write!(f, "correlation undefined (zero variance)"),
        }
    }
}

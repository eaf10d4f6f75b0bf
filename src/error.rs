//! Error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A file could not be opened or created.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Malformed CSV, or a write to a CSV sink failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A CSV field that is not a number.
    #[error("line {line}, field {field}: cannot parse {value:?} as a number")]
    Parse {
        line: u64,
        field: usize,
        value: String,
    },

    /// Network topology or training parameters that do not fit together.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A training row whose trailing label is not a class index.
    #[error("row {row}: label {label} is not a valid class index")]
    InvalidLabel { row: usize, label: f64 },

    /// Weights became NaN or infinite during training.
    #[error("weights became non-finite during epoch {epoch}")]
    NumericInstability { epoch: usize },

    #[error("invalid config file: {0}")]
    Config(#[from] serde_yaml::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

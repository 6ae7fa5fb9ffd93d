//! Pipeline errors
//!
//! Only conditions that end a run are errors. Row-level data problems are
//! repaired in place and reported as events instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Input is missing required column: {0}")]
    MissingColumn(String),

    #[error("No data left after cleaning with threshold {threshold}")]
    EmptyAfterCleaning { threshold: f64 },
}

impl PipelineError {
    /// Whether the run stopped because of the data rather than the environment
    pub fn is_data_quality(&self) -> bool {
        matches!(self, Self::EmptyAfterCleaning { .. })
    }
}

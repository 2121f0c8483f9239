//! Error handling for the calibration pipeline.
//!
//! Row-level discards are not errors: they are counted in
//! [`QualityStats`](crate::cleaning::QualityStats). Only configuration faults abort a batch;
//! per-file I/O failures become [`FileOutcome::Failed`](crate::models::FileOutcome) and the
//! batch moves on.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("KPI computation requested on an empty series: {context}")]
    EmptySeries { context: String },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("File worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("Processing interrupted: {reason}")]
    Interrupted { reason: String },
}

impl PipelineError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn empty_series(context: impl Into<String>) -> Self {
        Self::EmptySeries {
            context: context.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

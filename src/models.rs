//! Batch-level data structures.
//!
//! Per-file outcomes produced by the cleaning workers and the summary the
//! processor reports once every file has been handled.

use crate::cleaning::{CleanedFile, QualityStats};
use crate::kpi::KpiSet;
use std::path::PathBuf;

/// A file that produced a non-empty cleaned series
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedFile {
    pub source_name: String,
    pub output_path: PathBuf,
    pub sensor: String,
    pub cleaned: CleanedFile,
    pub kpis: KpiSet,
}

impl ProcessedFile {
    pub fn output_name(&self) -> String {
        self.output_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Result of running one raw file through cleaning and KPI aggregation
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Processed(Box<ProcessedFile>),
    /// Every row was discarded; excluded from report and accumulator
    Empty {
        source_name: String,
        stats: QualityStats,
    },
    /// Reading or writing the file failed; the batch continues
    Failed { source_name: String, reason: String },
}

impl FileOutcome {
    pub fn source_name(&self) -> &str {
        match self {
            FileOutcome::Processed(file) => &file.source_name,
            FileOutcome::Empty { source_name, .. } => source_name,
            FileOutcome::Failed { source_name, .. } => source_name,
        }
    }
}

/// Batch statistics shown to the operator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub files_discovered: usize,
    pub files_processed: usize,
    /// Files with no valid rows, by name
    pub files_empty: Vec<String>,
    /// Files that could not be processed, with the reason
    pub files_failed: Vec<(String, String)>,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub report_path: Option<PathBuf>,
    pub boxplot_path: Option<PathBuf>,
    pub processing_time_ms: u128,
}

impl BatchSummary {
    /// Share of rows kept across the batch, 0 when no rows were seen
    pub fn valid_pct(&self) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            100.0 * self.valid_rows as f64 / self.total_rows as f64
        }
    }
}

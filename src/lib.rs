//! Sensor Calibration Pipeline Library
//!
//! Turns batches of raw sensor voltage CSV files into calibrated temperature
//! series with per-file quality and alert KPIs.
//!
//! This library provides tools for:
//! - Parsing and validating raw `timestamp,value` rows with reason-coded discards
//! - Two-point linear voltage to temperature calibration
//! - Per-file cleaning with row accounting ([`cleaning::QualityStats`])
//! - KPI aggregation: extrema, mean and threshold alerts
//! - Batch orchestration with a KPI report and chart data per sensor
//!
//! ## Usage
//!
//! ```no_run
//! use thermo_pipeline::{BatchProcessor, PipelineConfig};
//!
//! # async fn example() -> thermo_pipeline::Result<()> {
//! let config = PipelineConfig::rooted_at(std::path::Path::new("."));
//! let result = BatchProcessor::new(config)?.process().await?;
//!
//! println!("Processed {} files", result.summary.files_processed);
//! # Ok(())
//! # }
//! ```

pub mod calibration;
pub mod charts;
pub mod cleaning;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod kpi;
pub mod models;
pub mod parser;
pub mod processor;
pub mod report;
pub mod sensor;

// Re-export commonly used types
pub use calibration::{Calibration, CalibrationPoint, transform};
pub use cleaning::{CleanedFile, CleanedRecord, QualityStats, clean_file, clean_rows};
pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use kpi::{KpiSet, compute_kpis};
pub use parser::{DiscardReason, RawRow, ValidatedSample, parse_row};
pub use processor::BatchProcessor;
pub use report::ReportRow;
pub use sensor::SensorSeriesAccumulator;

//! Configuration management and validation.
//!
//! Provides the batch configuration consumed by the processor: directory
//! layout, calibration anchors, alert threshold and processing knobs.
//! Validation runs once before any file is touched.

use crate::calibration::{Calibration, CalibrationPoint};
use crate::constants::{
    DEFAULT_ALERT_THRESHOLD, DEFAULT_CALIBRATION_HIGH, DEFAULT_CALIBRATION_LOW,
    DEFAULT_FILE_PATTERN, DEFAULT_HISTOGRAM_BINS, DEFAULT_PLOTS_DIR, DEFAULT_PROCESSED_DIR,
    DEFAULT_RAW_DIR, DEFAULT_REPORT_FILE, DEFAULT_REPORTS_DIR, DEFAULT_SENSOR_PREFIX,
    DEFAULT_WORKERS,
};
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Main configuration for a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory scanned for raw sensor files
    pub raw_dir: PathBuf,

    /// Destination of cleaned per-file CSVs
    pub processed_dir: PathBuf,

    /// Destination of chart artifacts
    pub plots_dir: PathBuf,

    /// Destination of the KPI report
    pub reports_dir: PathBuf,

    pub report_file_name: String,

    /// Glob matched against file names in `raw_dir`
    pub file_pattern: String,

    /// Alert threshold in °C (strictly greater fires)
    pub threshold: f64,

    pub calibration_low: CalibrationPoint,
    pub calibration_high: CalibrationPoint,

    /// Raw file prefix that marks a numbered sensor
    pub sensor_prefix: String,

    /// Files cleaned concurrently; results are still merged in discovery order
    pub workers: usize,

    pub histogram_bins: usize,

    pub render_charts: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::rooted_at(Path::new("."))
    }
}

impl PipelineConfig {
    /// Default layout below a project root
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            raw_dir: root.join(DEFAULT_RAW_DIR),
            processed_dir: root.join(DEFAULT_PROCESSED_DIR),
            plots_dir: root.join(DEFAULT_PLOTS_DIR),
            reports_dir: root.join(DEFAULT_REPORTS_DIR),
            report_file_name: DEFAULT_REPORT_FILE.to_string(),
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            threshold: DEFAULT_ALERT_THRESHOLD,
            calibration_low: CalibrationPoint::new(
                DEFAULT_CALIBRATION_LOW.0,
                DEFAULT_CALIBRATION_LOW.1,
            ),
            calibration_high: CalibrationPoint::new(
                DEFAULT_CALIBRATION_HIGH.0,
                DEFAULT_CALIBRATION_HIGH.1,
            ),
            sensor_prefix: DEFAULT_SENSOR_PREFIX.to_string(),
            workers: DEFAULT_WORKERS,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            render_charts: true,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_calibration(mut self, low: CalibrationPoint, high: CalibrationPoint) -> Self {
        self.calibration_low = low;
        self.calibration_high = high;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.file_pattern = pattern.into();
        self
    }

    pub fn without_charts(mut self) -> Self {
        self.render_charts = false;
        self
    }

    pub fn report_path(&self) -> PathBuf {
        self.reports_dir.join(&self.report_file_name)
    }

    /// Build the validated calibration line
    pub fn calibration(&self) -> Result<Calibration> {
        Calibration::new(self.calibration_low, self.calibration_high)
    }

    /// Check every invariant the batch relies on
    pub fn validate(&self) -> Result<Calibration> {
        let calibration = self.calibration()?;

        if !self.threshold.is_finite() {
            return Err(PipelineError::configuration(format!(
                "Alert threshold must be finite, got {}",
                self.threshold
            )));
        }

        if self.workers == 0 {
            return Err(PipelineError::configuration(
                "At least one worker is required",
            ));
        }

        if self.histogram_bins == 0 {
            return Err(PipelineError::configuration(
                "Histogram needs at least one bin",
            ));
        }

        if self.report_file_name.trim().is_empty() {
            return Err(PipelineError::configuration("Report file name is empty"));
        }

        debug!(
            "Configuration valid: threshold={} P1={} P2={} workers={}",
            self.threshold, self.calibration_low, self.calibration_high, self.workers
        );

        Ok(calibration)
    }
}

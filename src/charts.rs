//! Chart output for cleaned series.
//!
//! Rendering is behind the [`ChartSink`] trait. The bundled
//! [`ChartDataExporter`] writes the data each chart plots as CSV next to where
//! the images would go, which keeps the batch free of any graphics stack.

use crate::cleaning::CleanedRecord;
use crate::constants::{BOXPLOT_FILE_STEM, TIMESTAMP_FORMAT};
use crate::error::Result;
use crate::sensor::SensorSeriesAccumulator;
use std::path::PathBuf;
use tracing::debug;

/// Consumer of chart requests issued by the batch processor
pub trait ChartSink: Send + Sync {
    /// Temperature against time with the alert threshold marked
    fn line_chart(
        &self,
        stem: &str,
        records: &[CleanedRecord],
        threshold: f64,
    ) -> Result<PathBuf>;

    /// Distribution of one file's temperatures
    fn histogram(&self, stem: &str, temperatures: &[f64], bins: usize) -> Result<PathBuf>;

    /// One box per sensor across the whole batch
    fn boxplot(&self, sensors: &SensorSeriesAccumulator) -> Result<PathBuf>;
}

/// One histogram bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width bins spanning the data range; the last bin includes its upper edge
pub fn histogram_bins(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let (mut lo, mut hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: lo + width * i as f64,
            upper: if i + 1 == bins {
                hi
            } else {
                lo + width * (i + 1) as f64
            },
            count,
        })
        .collect()
}

/// Five-number summary drawn by a box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSummary {
    pub n: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl BoxSummary {
    /// Quartiles use linear interpolation between closest ranks
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let quantile = |p: f64| {
            let pos = p * (sorted.len() - 1) as f64;
            let below = pos.floor() as usize;
            let above = pos.ceil() as usize;
            sorted[below] + (sorted[above] - sorted[below]) * (pos - below as f64)
        };

        Some(Self {
            n: sorted.len(),
            min: sorted[0],
            q1: quantile(0.25),
            median: quantile(0.5),
            q3: quantile(0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Writes chart data files into the plots directory
#[derive(Debug, Clone)]
pub struct ChartDataExporter {
    plots_dir: PathBuf,
}

impl ChartDataExporter {
    pub fn new(plots_dir: impl Into<PathBuf>) -> Self {
        Self {
            plots_dir: plots_dir.into(),
        }
    }

    pub fn line_chart_path(&self, stem: &str, threshold: f64) -> PathBuf {
        self.plots_dir
            .join(format!("{}_temp_line_{:.1}C.csv", stem, threshold))
    }

    pub fn histogram_path(&self, stem: &str) -> PathBuf {
        self.plots_dir.join(format!("{}__temp_hist.csv", stem))
    }

    pub fn boxplot_path(&self) -> PathBuf {
        self.plots_dir.join(format!("{}.csv", BOXPLOT_FILE_STEM))
    }
}

impl ChartSink for ChartDataExporter {
    fn line_chart(
        &self,
        stem: &str,
        records: &[CleanedRecord],
        threshold: f64,
    ) -> Result<PathBuf> {
        let path = self.line_chart_path(stem, threshold);
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(["timestamp", "temperature_c", "threshold_c"])?;
        for record in records {
            writer.write_record([
                record.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                record.temperature.to_string(),
                threshold.to_string(),
            ])?;
        }
        writer.flush()?;

        debug!("Line chart data: {}", path.display());
        Ok(path)
    }

    fn histogram(&self, stem: &str, temperatures: &[f64], bins: usize) -> Result<PathBuf> {
        let path = self.histogram_path(stem);
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(["lower_c", "upper_c", "count"])?;
        for bin in histogram_bins(temperatures, bins) {
            writer.write_record([
                bin.lower.to_string(),
                bin.upper.to_string(),
                bin.count.to_string(),
            ])?;
        }
        writer.flush()?;

        debug!("Histogram data: {}", path.display());
        Ok(path)
    }

    fn boxplot(&self, sensors: &SensorSeriesAccumulator) -> Result<PathBuf> {
        let path = self.boxplot_path();
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(["sensor", "n", "min", "q1", "median", "q3", "max"])?;
        for (sensor, values) in sensors.iter() {
            if let Some(summary) = BoxSummary::from_values(values) {
                writer.write_record([
                    sensor.to_string(),
                    summary.n.to_string(),
                    summary.min.to_string(),
                    summary.q1.to_string(),
                    summary.median.to_string(),
                    summary.q3.to_string(),
                    summary.max.to_string(),
                ])?;
            }
        }
        writer.flush()?;

        debug!("Boxplot data: {}", path.display());
        Ok(path)
    }
}

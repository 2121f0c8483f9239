//! Batch processing engine.
//!
//! Orchestrates one batch run: file discovery, per-file cleaning and KPI
//! aggregation, report emission and chart requests. Per-file work is
//! independent and may run on several blocking workers; outcomes are merged
//! strictly in discovery order, so the report and the sensor accumulator are
//! the same whatever the worker count.

pub mod discovery;

#[cfg(test)]
pub mod tests;

use self::discovery::FileDiscovery;

use crate::calibration::Calibration;
use crate::charts::{ChartDataExporter, ChartSink};
use crate::cleaning::clean_file;
use crate::config::PipelineConfig;
use crate::constants::PROGRESS_TEMPLATE;
use crate::error::{PipelineError, Result};
use crate::kpi::compute_kpis;
use crate::models::{BatchSummary, FileOutcome, ProcessedFile};
use crate::report::{ReportRow, write_report};
use crate::sensor::{SensorSeriesAccumulator, make_clean_name, safe_stem, sensor_key};

use colored::*;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::task;
use tracing::{debug, error, info, warn};

/// Everything a finished batch produced
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub summary: BatchSummary,
    pub report_rows: Vec<ReportRow>,
    pub sensors: SensorSeriesAccumulator,
}

/// Merge one file outcome into the batch state
///
/// The accumulator is taken and handed back so the cross-file state is
/// explicit; only processed files reach the report and the accumulator.
pub fn record_outcome(mut result: BatchResult, outcome: &FileOutcome) -> BatchResult {
    match outcome {
        FileOutcome::Processed(file) => {
            result.summary.files_processed += 1;
            result.summary.total_rows += file.cleaned.stats.total_rows;
            result.summary.valid_rows += file.cleaned.stats.valid_rows;
            result.report_rows.push(ReportRow::new(
                file.source_name.clone(),
                file.output_name(),
                &file.cleaned.stats,
                &file.kpis,
            ));
            result
                .sensors
                .extend(&file.sensor, file.cleaned.records.iter().map(|r| r.temperature));
        }
        FileOutcome::Empty { source_name, stats } => {
            result.summary.total_rows += stats.total_rows;
            result.summary.files_empty.push(source_name.clone());
        }
        FileOutcome::Failed {
            source_name,
            reason,
        } => {
            result
                .summary
                .files_failed
                .push((source_name.clone(), reason.clone()));
        }
    }
    result
}

/// Clean one raw file and aggregate its KPIs
///
/// Data-quality problems never fail here: an all-discarded file becomes
/// [`FileOutcome::Empty`] and I/O problems become [`FileOutcome::Failed`].
pub fn process_file(
    input_path: &Path,
    config: &PipelineConfig,
    calibration: &Calibration,
) -> FileOutcome {
    let source_name = source_name(input_path);
    let output_path = config.processed_dir.join(make_clean_name(input_path));

    let cleaned = match clean_file(input_path, &output_path, calibration) {
        Ok(cleaned) => cleaned,
        Err(e) => {
            return FileOutcome::Failed {
                source_name,
                reason: e.to_string(),
            };
        }
    };

    if cleaned.is_empty() {
        return FileOutcome::Empty {
            source_name,
            stats: cleaned.stats,
        };
    }

    let kpis = match compute_kpis(&cleaned.records, config.threshold) {
        Ok(kpis) => kpis,
        Err(e) => {
            return FileOutcome::Failed {
                source_name,
                reason: e.to_string(),
            };
        }
    };

    let sensor = sensor_key(&output_path, &config.sensor_prefix);
    FileOutcome::Processed(Box::new(ProcessedFile {
        source_name,
        output_path,
        sensor,
        cleaned,
        kpis,
    }))
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Files whose cleaned name was already claimed by an earlier file
///
/// Distinct raw names can sanitize to the same cleaned name. The first file in
/// discovery order keeps it; each later one maps to the reason it is refused.
pub fn output_collisions(files: &[PathBuf]) -> HashMap<PathBuf, String> {
    let mut claimed: HashMap<String, &Path> = HashMap::new();
    let mut collisions = HashMap::new();

    for path in files {
        let clean_name = make_clean_name(path);
        if let Some(first) = claimed.get(&clean_name).copied() {
            collisions.insert(
                path.clone(),
                format!(
                    "cleaned output {} is already produced by {}",
                    clean_name,
                    source_name(first)
                ),
            );
        } else {
            claimed.insert(clean_name, path.as_path());
        }
    }

    collisions
}

/// Main processor for a batch of raw sensor files
pub struct BatchProcessor {
    config: Arc<PipelineConfig>,
    calibration: Calibration,
    discovery: FileDiscovery,
    charts: Option<Box<dyn ChartSink>>,
    show_progress: bool,
}

impl std::fmt::Debug for BatchProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchProcessor")
            .field("config", &self.config)
            .field("calibration", &self.calibration)
            .field("discovery", &self.discovery)
            .field("charts", &self.charts.is_some())
            .field("show_progress", &self.show_progress)
            .finish()
    }
}

impl BatchProcessor {
    /// Create a processor, validating the configuration once for the whole batch
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let calibration = config.validate()?;
        let discovery = FileDiscovery::new(&config.raw_dir, &config.file_pattern);
        let charts: Option<Box<dyn ChartSink>> = if config.render_charts {
            Some(Box::new(ChartDataExporter::new(&config.plots_dir)))
        } else {
            None
        };

        Ok(Self {
            config: Arc::new(config),
            calibration,
            discovery,
            charts,
            show_progress: false,
        })
    }

    /// Replace the chart sink
    pub fn with_charts(mut self, charts: Box<dyn ChartSink>) -> Self {
        self.charts = Some(charts);
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Main processing entry point
    pub async fn process(&self) -> Result<BatchResult> {
        let start_time = Instant::now();
        info!("Starting batch over {}", self.config.raw_dir.display());

        let files = self.discovery.discover_files()?;
        let mut result = BatchResult::default();
        result.summary.files_discovered = files.len();

        if files.is_empty() {
            println!(
                "{} {}",
                "No raw CSV files in".bright_yellow(),
                self.config.raw_dir.display()
            );
            result.summary.processing_time_ms = start_time.elapsed().as_millis();
            return Ok(result);
        }

        self.prepare_directories().await?;

        let outcomes = self.run_workers(&files).await?;

        for outcome in &outcomes {
            debug!("Merging outcome for {}", outcome.source_name());
            result = record_outcome(result, outcome);
            self.report_outcome(outcome);
        }

        let report_path = self.config.report_path();
        write_report(&report_path, &result.report_rows)?;
        result.summary.report_path = Some(report_path);

        if let Some(charts) = &self.charts {
            if !result.sensors.is_empty() {
                match charts.boxplot(&result.sensors) {
                    Ok(path) => result.summary.boxplot_path = Some(path),
                    Err(e) => warn!("Boxplot could not be written: {}", e),
                }
            }
        }

        result.summary.processing_time_ms = start_time.elapsed().as_millis();
        info!(
            "Batch finished: {} processed ({} sensors), {} empty, {} failed in {}ms",
            result.summary.files_processed,
            result.sensors.sensor_count(),
            result.summary.files_empty.len(),
            result.summary.files_failed.len(),
            result.summary.processing_time_ms
        );

        Ok(result)
    }

    /// Create output directories
    async fn prepare_directories(&self) -> Result<()> {
        let mut dirs = vec![&self.config.processed_dir, &self.config.reports_dir];
        if self.charts.is_some() {
            dirs.push(&self.config.plots_dir);
        }

        for dir in dirs {
            tokio::fs::create_dir_all(dir).await?;
            debug!("Output directory ready: {}", dir.display());
        }
        Ok(())
    }

    /// Run per-file work with at most `workers` files in flight, keeping input order
    async fn run_workers(&self, files: &[PathBuf]) -> Result<Vec<FileOutcome>> {
        let pb = if self.show_progress {
            let pb = ProgressBar::new(files.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(PROGRESS_TEMPLATE)
                    .map_err(|e| PipelineError::configuration(e.to_string()))?
                    .progress_chars("#>-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut collisions = output_collisions(files);
        if !collisions.is_empty() {
            warn!("{} raw files share a cleaned output name", collisions.len());
        }

        let results: Vec<_> = stream::iter(files.iter().cloned())
            .map(|path| {
                let config = Arc::clone(&self.config);
                let calibration = self.calibration;
                let collision = collisions.remove(&path);
                let pb = pb.clone();
                async move {
                    let outcome = match collision {
                        Some(reason) => Ok(FileOutcome::Failed {
                            source_name: source_name(&path),
                            reason,
                        }),
                        None => {
                            task::spawn_blocking(move || {
                                process_file(&path, &config, &calibration)
                            })
                            .await
                        }
                    };
                    pb.inc(1);
                    outcome
                }
            })
            .buffered(self.config.workers)
            .collect()
            .await;

        pb.finish_with_message("All raw files processed");

        results
            .into_iter()
            .map(|joined| joined.map_err(PipelineError::from))
            .collect()
    }

    /// Operator feedback and charts for one outcome
    fn report_outcome(&self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Processed(file) => {
                debug!(
                    "{}: n={} min={:.2} max={:.2} mean={:.2} alerts={}",
                    file.source_name,
                    file.kpis.n,
                    file.kpis.min,
                    file.kpis.max,
                    file.kpis.mean,
                    file.kpis.alerts
                );
                if let Some(charts) = &self.charts {
                    self.render_file_charts(charts.as_ref(), file);
                }
            }
            FileOutcome::Empty { source_name, stats } => {
                warn!(
                    "No valid data after cleaning: {} ({} rows discarded)",
                    source_name,
                    stats.discarded_rows()
                );
                println!(
                    "  {} {}",
                    "No valid data after cleaning:".bright_yellow(),
                    source_name
                );
            }
            FileOutcome::Failed {
                source_name,
                reason,
            } => {
                error!("Failed to process {}: {}", source_name, reason);
                println!(
                    "  {} {} - {}",
                    "Failed:".bright_red(),
                    source_name,
                    reason
                );
            }
        }
    }

    fn render_file_charts(&self, charts: &dyn ChartSink, file: &ProcessedFile) {
        let stem = safe_stem(&file.output_path);

        if let Err(e) = charts.line_chart(&stem, &file.cleaned.records, self.config.threshold) {
            warn!("Line chart for {} could not be written: {}", file.source_name, e);
        }
        if let Err(e) = charts.histogram(
            &stem,
            &file.cleaned.temperatures(),
            self.config.histogram_bins,
        ) {
            warn!("Histogram for {} could not be written: {}", file.source_name, e);
        }
    }
}

/// Print the batch summary to the operator
pub fn print_summary(summary: &BatchSummary) {
    println!("\n{}", "Processing Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        summary.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {} of {}",
        "Files processed:".bright_cyan(),
        summary.files_processed.to_string().bright_white(),
        summary.files_discovered
    );
    println!(
        "  {} {} ({:.2}% valid)",
        "Rows read:".bright_cyan(),
        summary.total_rows.to_string().bright_white().bold(),
        summary.valid_pct()
    );
    if !summary.files_empty.is_empty() {
        println!(
            "  {} {}",
            "Files without valid data:".bright_yellow(),
            summary.files_empty.join(", ")
        );
    }
    if !summary.files_failed.is_empty() {
        println!(
            "  {} {}",
            "Files failed:".bright_red(),
            summary.files_failed.len().to_string().bright_red().bold()
        );
        for (name, reason) in &summary.files_failed {
            println!("    {} - {}", name, reason);
        }
    }
    if let Some(path) = &summary.report_path {
        println!("  {} {}", "KPI report:".bright_cyan(), path.display());
    }
    if let Some(path) = &summary.boxplot_path {
        println!("  {} {}", "Boxplot data:".bright_cyan(), path.display());
    }
}

//! Command-line interface components.

use crate::calibration::CalibrationPoint;
use crate::config::PipelineConfig;
use crate::constants::{DEFAULT_FILE_PATTERN, DEFAULT_WORKERS};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "thermo_pipeline")]
#[command(about = "Clean raw sensor voltage CSV files, calibrate them to temperature and report KPIs")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Project root holding data/raw, data/processed, plots and reports
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Raw input directory (overrides ROOT/data/raw)
    #[arg(long)]
    pub raw: Option<PathBuf>,

    /// Cleaned output directory (overrides ROOT/data/processed)
    #[arg(long)]
    pub processed: Option<PathBuf>,

    /// Chart output directory (overrides ROOT/plots)
    #[arg(long)]
    pub plots: Option<PathBuf>,

    /// Report output directory (overrides ROOT/reports)
    #[arg(long)]
    pub reports: Option<PathBuf>,

    /// Alert threshold in °C; samples strictly above it raise an alert
    #[arg(short, long, default_value_t = 80.0, allow_negative_numbers = true)]
    pub threshold: f64,

    /// Low calibration point as VOLTAGE,TEMPERATURE
    #[arg(long, default_value = "0.4,-30", allow_hyphen_values = true)]
    pub p1: CalibrationPoint,

    /// High calibration point as VOLTAGE,TEMPERATURE
    #[arg(long, default_value = "5.6,120", allow_hyphen_values = true)]
    pub p2: CalibrationPoint,

    /// Glob for raw file names
    #[arg(long, default_value = DEFAULT_FILE_PATTERN)]
    pub pattern: String,

    /// Files processed concurrently (0 = number of CPUs)
    #[arg(short = 'j', long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Skip chart data export
    #[arg(long)]
    pub no_charts: bool,

    /// Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only show errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Build the batch configuration from the parsed flags
    pub fn to_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::rooted_at(&self.root)
            .with_threshold(self.threshold)
            .with_calibration(self.p1, self.p2)
            .with_file_pattern(self.pattern.clone())
            .with_workers(self.effective_workers());

        if let Some(raw) = &self.raw {
            config.raw_dir = raw.clone();
        }
        if let Some(processed) = &self.processed {
            config.processed_dir = processed.clone();
        }
        if let Some(plots) = &self.plots {
            config.plots_dir = plots.clone();
        }
        if let Some(reports) = &self.reports {
            config.reports_dir = reports.clone();
        }
        if self.no_charts {
            config = config.without_charts();
        }

        config
    }

    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get()
        } else {
            self.workers
        }
    }

    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

/// Set up structured logging on stderr
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("thermo_pipeline={}", args.log_level())));

    // try_init: a subscriber may already be installed (tests)
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_defaults_match_config_defaults() {
        let args = Args::parse_from(["thermo_pipeline"]);
        let config = args.to_config();

        assert_eq!(config, PipelineConfig::default());
        assert_eq!(args.log_level(), "warn");
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "thermo_pipeline",
            "--root",
            "/data/site",
            "--reports",
            "/tmp/reports",
            "--threshold",
            "-5.5",
            "--p1",
            "-1,-40",
            "--p2",
            "4,60",
            "-j",
            "3",
            "--no-charts",
            "-vv",
        ]);
        let config = args.to_config();

        assert_eq!(config.raw_dir, Path::new("/data/site/data/raw"));
        assert_eq!(config.reports_dir, Path::new("/tmp/reports"));
        assert_eq!(config.threshold, -5.5);
        assert_eq!(config.calibration_low, CalibrationPoint::new(-1.0, -40.0));
        assert_eq!(config.calibration_high, CalibrationPoint::new(4.0, 60.0));
        assert_eq!(config.workers, 3);
        assert!(!config.render_charts);
        assert_eq!(args.log_level(), "debug");
    }

    #[test]
    fn test_zero_workers_uses_cpus() {
        let args = Args::parse_from(["thermo_pipeline", "--workers", "0"]);
        assert!(args.effective_workers() >= 1);
    }

    #[test]
    fn test_quiet_wins() {
        let args = Args::parse_from(["thermo_pipeline", "-vvv", "--quiet"]);
        assert_eq!(args.log_level(), "error");
        assert!(!args.show_progress());
    }

    #[test]
    fn test_bad_calibration_point_rejected() {
        assert!(Args::try_parse_from(["thermo_pipeline", "--p1", "oops"]).is_err());
    }
}

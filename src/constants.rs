//! Application constants for the calibration pipeline
//!
//! Default values, file naming tokens and CSV schemas used throughout the
//! crate. Anything an operator may want to change is mirrored in
//! [`PipelineConfig`](crate::config::PipelineConfig).

// =============================================================================
// Calibration and Alerts
// =============================================================================

/// Default low calibration anchor (volts, °C)
pub const DEFAULT_CALIBRATION_LOW: (f64, f64) = (0.4, -30.0);

/// Default high calibration anchor (volts, °C)
pub const DEFAULT_CALIBRATION_HIGH: (f64, f64) = (5.6, 120.0);

/// Default alert threshold in °C; alerts fire on strictly greater values
pub const DEFAULT_ALERT_THRESHOLD: f64 = 80.0;

// =============================================================================
// Input and Output Formats
// =============================================================================

/// The only accepted timestamp layout, `YYYY-MM-DDTHH:MM:SS`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Header expected on raw sensor files
pub const RAW_HEADER: [&str; 2] = ["timestamp", "value"];

/// Header written on cleaned sensor files
pub const CLEAN_HEADER: [&str; 2] = ["timestamp", "temperature_c"];

/// Fraction digits for cleaned temperatures
pub const TEMPERATURE_DECIMALS: usize = 2;

/// Report columns, in output order
pub const REPORT_COLUMNS: [&str; 13] = [
    "archivo",
    "salida",
    "filas_totales",
    "filas_validas",
    "descartes_timestamp",
    "descartes_valor",
    "%descartadas",
    "n",
    "min",
    "max",
    "prom",
    "alerts",
    "alerts_pct",
];

// =============================================================================
// Directory Layout and File Naming
// =============================================================================

pub const DEFAULT_RAW_DIR: &str = "data/raw";
pub const DEFAULT_PROCESSED_DIR: &str = "data/processed";
pub const DEFAULT_PLOTS_DIR: &str = "plots";
pub const DEFAULT_REPORTS_DIR: &str = "reports";

/// Glob matched against file names in the raw directory
pub const DEFAULT_FILE_PATTERN: &str = "*.csv";

pub const DEFAULT_REPORT_FILE: &str = "kpis_por_archivo.csv";

/// Suffix appended to the stem of cleaned files
pub const CLEAN_SUFFIX: &str = "_clean";

/// Raw file prefix that identifies a numbered sensor
pub const DEFAULT_SENSOR_PREFIX: &str = "voltaje_sensor_";

/// Prefix of sensor keys derived from numbered sensor files
pub const SENSOR_KEY_PREFIX: &str = "S-";

pub const BOXPLOT_FILE_STEM: &str = "boxplot_todos_sensores_temp";

// =============================================================================
// Charts and Processing
// =============================================================================

pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

/// Files processed at once; 1 keeps the batch strictly sequential
pub const DEFAULT_WORKERS: usize = 1;

/// Progress bar template shared by batch runs
pub const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}";

//! Sensor naming and the cross-file temperature accumulator.

use crate::constants::{CLEAN_SUFFIX, SENSOR_KEY_PREFIX};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

static UNSAFE_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^A-Za-z0-9_-]+").expect("static regex is valid")
});

/// File stem with every run of characters outside `[A-Za-z0-9_-]` replaced by `_`
pub fn safe_stem(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    UNSAFE_CHARS.replace_all(&stem, "_").into_owned()
}

/// Name of the cleaned file produced for a raw input
pub fn make_clean_name(input_path: &Path) -> String {
    format!("{}{}.csv", safe_stem(input_path), CLEAN_SUFFIX)
}

/// Sensor key for a cleaned output file
///
/// `voltaje_sensor_03_clean.csv` becomes `S-03`; a stem without the sensor
/// prefix is used as the key unchanged.
pub fn sensor_key(output_path: &Path, sensor_prefix: &str) -> String {
    let full_stem = path_stem(output_path);
    let stem = full_stem.strip_suffix(CLEAN_SUFFIX).unwrap_or(&full_stem);

    match stem.strip_prefix(sensor_prefix) {
        Some(id) if !sensor_prefix.is_empty() && !id.is_empty() => {
            format!("{}{}", SENSOR_KEY_PREFIX, id)
        }
        _ => stem.to_string(),
    }
}

fn path_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Temperatures per sensor, concatenated across files in processing order
///
/// Append-only for the lifetime of one batch. Sensors iterate in the order
/// they were first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorSeriesAccumulator {
    index: HashMap<String, usize>,
    series: Vec<(String, Vec<f64>)>,
}

impl SensorSeriesAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append temperatures to a sensor's series, creating it on first use
    pub fn extend(&mut self, sensor: &str, temperatures: impl IntoIterator<Item = f64>) {
        let slot = match self.index.get(sensor) {
            Some(&slot) => slot,
            None => {
                self.series.push((sensor.to_string(), Vec::new()));
                self.index.insert(sensor.to_string(), self.series.len() - 1);
                self.series.len() - 1
            }
        };
        self.series[slot].1.extend(temperatures);
    }

    pub fn get(&self, sensor: &str) -> Option<&[f64]> {
        self.index
            .get(sensor)
            .map(|&slot| self.series[slot].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.series
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn sensor_count(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

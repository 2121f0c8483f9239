//! Two-point linear voltage to temperature calibration.
//!
//! A [`Calibration`] is built once per batch from two anchor points and
//! rejects a degenerate line up front, so [`Calibration::apply`] never has to
//! check anything per row.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A (voltage, temperature) anchor on the calibration line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    pub voltage: f64,
    pub temperature: f64,
}

impl CalibrationPoint {
    pub const fn new(voltage: f64, temperature: f64) -> Self {
        Self {
            voltage,
            temperature,
        }
    }
}

impl fmt::Display for CalibrationPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} V, {} °C)", self.voltage, self.temperature)
    }
}

/// Parses `"V,T"`, e.g. `"0.4,-30"`
impl FromStr for CalibrationPoint {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        let (voltage, temperature) = s.split_once(',').ok_or_else(|| {
            PipelineError::configuration(format!(
                "Invalid calibration point '{}' (expected 'VOLTAGE,TEMPERATURE')",
                s
            ))
        })?;

        let parse = |field: &str, what: &str| {
            field.trim().parse::<f64>().map_err(|e| {
                PipelineError::configuration(format!(
                    "Invalid {} in calibration point '{}': {}",
                    what, s, e
                ))
            })
        };

        Ok(Self::new(
            parse(voltage, "voltage")?,
            parse(temperature, "temperature")?,
        ))
    }
}

/// Unclamped affine transform through two anchor points
pub fn transform(raw_voltage: f64, p1: CalibrationPoint, p2: CalibrationPoint) -> f64 {
    p1.temperature
        + (raw_voltage - p1.voltage) * (p2.temperature - p1.temperature)
            / (p2.voltage - p1.voltage)
}

/// Validated calibration line
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Calibration {
    p1: CalibrationPoint,
    p2: CalibrationPoint,
}

impl Calibration {
    /// Build a calibration, failing when both anchors share a voltage
    pub fn new(p1: CalibrationPoint, p2: CalibrationPoint) -> Result<Self> {
        let finite = [p1.voltage, p1.temperature, p2.voltage, p2.temperature]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(PipelineError::configuration(format!(
                "Calibration points must be finite: P1={} P2={}",
                p1, p2
            )));
        }

        if p1.voltage == p2.voltage {
            return Err(PipelineError::configuration(format!(
                "Degenerate calibration: P1 and P2 share voltage {} V",
                p1.voltage
            )));
        }

        Ok(Self { p1, p2 })
    }

    #[inline]
    pub fn apply(&self, raw_voltage: f64) -> f64 {
        transform(raw_voltage, self.p1, self.p2)
    }
}

//! Descriptive statistics and threshold alerts over a cleaned series.

use crate::cleaning::CleanedRecord;
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};

/// Per-file KPIs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpiSet {
    pub n: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Samples strictly above the threshold
    pub alerts: usize,
    pub alerts_pct: f64,
}

/// Compute KPIs over a cleaned series
pub fn compute_kpis(series: &[CleanedRecord], threshold: f64) -> Result<KpiSet> {
    let temperatures: Vec<f64> = series.iter().map(|r| r.temperature).collect();
    compute_temperature_kpis(&temperatures, threshold)
}

/// Compute KPIs over calibrated temperatures
///
/// An empty series has no extrema, so it is rejected with
/// [`PipelineError::EmptySeries`] instead of reporting a fake minimum of zero.
pub fn compute_temperature_kpis(temperatures: &[f64], threshold: f64) -> Result<KpiSet> {
    if temperatures.is_empty() {
        return Err(PipelineError::empty_series(format!(
            "no temperatures to summarise against threshold {}",
            threshold
        )));
    }

    let n = temperatures.len();
    let (min, max) = temperatures
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &t| {
            (lo.min(t), hi.max(t))
        });
    let sum: f64 = temperatures.iter().sum();
    // Clamp so rounding in the sum cannot push the mean outside the extrema
    let mean = (sum / n as f64).clamp(min, max);
    let alerts = temperatures.iter().filter(|&&t| t > threshold).count();

    Ok(KpiSet {
        n,
        min,
        max,
        mean,
        alerts,
        alerts_pct: 100.0 * alerts as f64 / n as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_strict() {
        let kpis = compute_temperature_kpis(&[79.9, 80.0, 80.1, 200.0], 80.0).unwrap();

        assert_eq!(kpis.n, 4);
        assert_eq!(kpis.alerts, 2);
        assert_eq!(kpis.alerts_pct, 50.0);
        assert_eq!(kpis.min, 79.9);
        assert_eq!(kpis.max, 200.0);
        assert!((kpis.mean - 110.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_series_is_an_error() {
        match compute_temperature_kpis(&[], 80.0).unwrap_err() {
            PipelineError::EmptySeries { .. } => {}
            other => panic!("Expected EmptySeries error, got {:?}", other),
        }
    }

    #[test]
    fn test_kpis_from_cleaned_records() {
        let ts = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let series: Vec<CleanedRecord> = [10.0, 90.0, 50.0]
            .into_iter()
            .map(|temperature| CleanedRecord {
                timestamp: ts,
                temperature,
            })
            .collect();

        let kpis = compute_kpis(&series, 80.0).unwrap();
        assert_eq!(kpis.n, 3);
        assert_eq!(kpis.alerts, 1);
        assert_eq!(kpis.min, 10.0);
        assert_eq!(kpis.max, 90.0);
        assert!((kpis.mean - 50.0).abs() < 1e-9);
        assert!(compute_kpis(&[], 80.0).is_err());
    }

    #[test]
    fn test_single_value() {
        let kpis = compute_temperature_kpis(&[-30.0], 80.0).unwrap();
        assert_eq!(kpis.min, -30.0);
        assert_eq!(kpis.max, -30.0);
        assert_eq!(kpis.mean, -30.0);
        assert_eq!(kpis.alerts, 0);
        assert_eq!(kpis.alerts_pct, 0.0);
    }

    #[test]
    fn test_ordering_and_alert_bounds() {
        let series: Vec<f64> = (0..500)
            .map(|i| -30.0 + (i as f64 * 7.31) % 150.0)
            .collect();

        for threshold in [-100.0, 0.0, 45.5, 80.0, 119.9, 500.0] {
            let kpis = compute_temperature_kpis(&series, threshold).unwrap();
            assert!(kpis.min <= kpis.mean && kpis.mean <= kpis.max);
            assert!(kpis.alerts <= kpis.n);
            assert_eq!(kpis.alerts_pct, 100.0 * kpis.alerts as f64 / kpis.n as f64);
        }
    }

    #[test]
    fn test_all_equal_values_mean_inside_extrema() {
        let series = vec![0.1; 10];
        let kpis = compute_temperature_kpis(&series, 80.0).unwrap();
        assert!(kpis.min <= kpis.mean && kpis.mean <= kpis.max);
    }
}

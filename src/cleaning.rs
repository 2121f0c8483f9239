//! Per-file cleaning pipeline.
//!
//! [`clean_rows`] is the pure core: it walks raw rows in input order, keeps
//! the ones that validate, calibrates them and counts every discard by reason.
//! [`clean_file`] wraps it with CSV reading of the raw file and writing of the
//! cleaned series.

use crate::calibration::Calibration;
use crate::constants::{CLEAN_HEADER, RAW_HEADER, TEMPERATURE_DECIMALS, TIMESTAMP_FORMAT};
use crate::error::Result;
use crate::parser::{DiscardReason, RawRow, parse_row};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, warn};

/// A validated sample after calibration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleanedRecord {
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
}

/// Row accounting for one input file
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityStats {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub discarded_timestamp: usize,
    pub discarded_value: usize,
    pub discarded_pct: f64,
}

impl QualityStats {
    fn record_discard(&mut self, reason: DiscardReason) {
        match reason {
            DiscardReason::BadTimestamp => self.discarded_timestamp += 1,
            DiscardReason::BadValue => self.discarded_value += 1,
        }
    }

    fn finish(&mut self) {
        self.discarded_pct = if self.total_rows == 0 {
            0.0
        } else {
            100.0 * (self.total_rows - self.valid_rows) as f64 / self.total_rows as f64
        };
    }

    pub fn discarded_rows(&self) -> usize {
        self.discarded_timestamp + self.discarded_value
    }
}

/// Cleaned series of one file together with its quality accounting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedFile {
    pub records: Vec<CleanedRecord>,
    pub stats: QualityStats,
}

impl CleanedFile {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn temperatures(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.temperature).collect()
    }
}

/// Clean and calibrate rows in input order
///
/// Never fails: rows that do not validate are counted, not raised. A value
/// that calibrates to an infinite temperature is a [`DiscardReason::BadValue`].
/// An input where every row is discarded yields an empty series.
pub fn clean_rows<I>(rows: I, calibration: &Calibration) -> CleanedFile
where
    I: IntoIterator<Item = RawRow>,
{
    let mut cleaned = CleanedFile::default();

    for row in rows {
        cleaned.stats.total_rows += 1;

        let calibrated = parse_row(&row).and_then(|sample| {
            let temperature = calibration.apply(sample.raw_value);
            if temperature.is_finite() {
                Ok(CleanedRecord {
                    timestamp: sample.timestamp,
                    temperature,
                })
            } else {
                Err(DiscardReason::BadValue)
            }
        });

        match calibrated {
            Ok(record) => {
                cleaned.records.push(record);
                cleaned.stats.valid_rows += 1;
            }
            Err(reason) => {
                cleaned.stats.record_discard(reason);
            }
        }
    }

    cleaned.stats.finish();
    cleaned
}

/// Read raw rows from a `timestamp,value` CSV source
///
/// The first line is always consumed as the header. Short rows yield empty
/// fields, extra fields are ignored and invalid UTF-8 is decoded lossily so
/// that every data line reaches the validator.
pub fn read_raw_rows<R: Read>(reader: R) -> Result<Vec<RawRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.byte_headers()?.clone();
    let header_matches = headers.len() >= RAW_HEADER.len()
        && RAW_HEADER
            .iter()
            .zip(headers.iter())
            .all(|(expected, found)| String::from_utf8_lossy(found).trim() == *expected);
    if !header_matches {
        warn!(
            "Unexpected raw header {:?}, expected {:?}",
            headers
                .iter()
                .map(|f| String::from_utf8_lossy(f).into_owned())
                .collect::<Vec<_>>(),
            RAW_HEADER
        );
    }

    let mut rows = Vec::new();
    for record in csv_reader.byte_records() {
        let record = record?;
        let field = |i: usize| {
            record
                .get(i)
                .map(|f| String::from_utf8_lossy(f).into_owned())
                .unwrap_or_default()
        };
        rows.push(RawRow::new(field(0), field(1)));
    }

    Ok(rows)
}

/// Write a cleaned series as `timestamp,temperature_c` CSV
pub fn write_cleaned<W: Write>(writer: W, records: &[CleanedRecord]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CLEAN_HEADER)?;

    for record in records {
        csv_writer.write_record([
            record.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            format!("{:.*}", TEMPERATURE_DECIMALS, record.temperature),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Clean one raw file and persist its cleaned series to `output_path`
///
/// The cleaned file is written even when every row was discarded, so it
/// always reflects the latest run.
pub fn clean_file(
    input_path: &Path,
    output_path: &Path,
    calibration: &Calibration,
) -> Result<CleanedFile> {
    let input = std::fs::File::open(input_path)?;
    let rows = read_raw_rows(std::io::BufReader::new(input))?;
    let cleaned = clean_rows(rows, calibration);

    let output = std::fs::File::create(output_path)?;
    write_cleaned(std::io::BufWriter::new(output), &cleaned.records)?;

    debug!(
        "Cleaned {}: {}/{} valid rows ({} bad timestamp, {} bad value)",
        input_path.display(),
        cleaned.stats.valid_rows,
        cleaned.stats.total_rows,
        cleaned.stats.discarded_timestamp,
        cleaned.stats.discarded_value
    );

    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::CalibrationPoint;
    use tempfile::TempDir;

    fn calibration() -> Calibration {
        Calibration::new(
            CalibrationPoint::new(0.4, -30.0),
            CalibrationPoint::new(5.6, 120.0),
        )
        .unwrap()
    }

    fn to_csv(records: &[CleanedRecord]) -> String {
        let mut buf = Vec::new();
        write_cleaned(&mut buf, records).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_low_anchor_row() {
        let cleaned = clean_rows(
            vec![RawRow::new("2024-01-01T00:00:00", "0.4")],
            &calibration(),
        );
        assert_eq!(
            to_csv(&cleaned.records),
            "timestamp,temperature_c\n2024-01-01T00:00:00,-30.00\n"
        );
    }

    #[test]
    fn test_high_anchor_row() {
        let cleaned = clean_rows(
            vec![RawRow::new("2024-01-01T00:00:00", "5.6")],
            &calibration(),
        );
        assert_eq!(
            to_csv(&cleaned.records),
            "timestamp,temperature_c\n2024-01-01T00:00:00,120.00\n"
        );
    }

    #[test]
    fn test_mixed_discards() {
        let rows = vec![
            RawRow::new("bad-ts", "1.0"),
            RawRow::new("2024-01-01T00:00:01", "oops"),
            RawRow::new("2024-01-01T00:00:02", "3.0"),
        ];
        let cleaned = clean_rows(rows, &calibration());
        let stats = cleaned.stats;

        assert_eq!(stats.total_rows, 3);
        assert_eq!(stats.valid_rows, 1);
        assert_eq!(stats.discarded_timestamp, 1);
        assert_eq!(stats.discarded_value, 1);
        assert!((stats.discarded_pct - 66.666_666_666).abs() < 1e-6);
        assert_eq!(cleaned.records.len(), 1);
        assert!((cleaned.records[0].temperature - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_row_accounting_invariant() {
        let rows = vec![
            RawRow::new("2024-01-01T00:00:00", "1.0"),
            RawRow::new("x", "y"),
            RawRow::new("2024-01-01T00:00:02", ""),
            RawRow::new("", "2.0"),
            RawRow::new("2024-01-01T00:00:04", "NaN"),
            RawRow::new("2024-01-01T00:00:05", "2.5"),
        ];
        let stats = clean_rows(rows, &calibration()).stats;

        assert_eq!(
            stats.total_rows,
            stats.valid_rows + stats.discarded_timestamp + stats.discarded_value
        );
        assert_eq!(stats.valid_rows, 2);
        assert_eq!(stats.discarded_timestamp, 2);
        assert_eq!(stats.discarded_value, 2);
        assert_eq!(stats.discarded_rows(), 4);
    }

    #[test]
    fn test_overflowing_calibration_is_bad_value() {
        let rows = vec![
            RawRow::new("2024-01-01T00:00:00", "1e307"),
            RawRow::new("2024-01-01T00:00:01", "-1e307"),
            RawRow::new("2024-01-01T00:00:02", "1e300"),
        ];
        let cleaned = clean_rows(rows, &calibration());

        assert_eq!(cleaned.stats.total_rows, 3);
        assert_eq!(cleaned.stats.valid_rows, 1);
        assert_eq!(cleaned.stats.discarded_value, 2);
        assert!(cleaned.records.iter().all(|r| r.temperature.is_finite()));
        assert!(!to_csv(&cleaned.records).contains("inf"));

        let kpis = crate::kpi::compute_kpis(&cleaned.records, 80.0).unwrap();
        assert!(kpis.min <= kpis.mean && kpis.mean <= kpis.max);
    }

    #[test]
    fn test_all_rows_discarded_yields_empty_series() {
        let rows = vec![RawRow::new("nope", "1.0"), RawRow::new("nope", "2.0")];
        let cleaned = clean_rows(rows, &calibration());

        assert!(cleaned.is_empty());
        assert_eq!(cleaned.stats.total_rows, 2);
        assert_eq!(cleaned.stats.discarded_pct, 100.0);
    }

    #[test]
    fn test_no_rows() {
        let cleaned = clean_rows(Vec::new(), &calibration());
        assert!(cleaned.is_empty());
        assert_eq!(cleaned.stats, QualityStats::default());
        assert_eq!(cleaned.stats.discarded_pct, 0.0);
    }

    #[test]
    fn test_input_order_preserved() {
        let rows = vec![
            RawRow::new("2024-01-01T00:00:10", "1.0"),
            RawRow::new("2024-01-01T00:00:00", "2.0"),
            RawRow::new("2024-01-01T00:00:10", "3.0"),
        ];
        let cleaned = clean_rows(rows, &calibration());
        let csv = to_csv(&cleaned.records);
        let lines: Vec<&str> = csv.lines().skip(1).collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("2024-01-01T00:00:10"));
        assert!(lines[1].starts_with("2024-01-01T00:00:00"));
        assert!(lines[2].starts_with("2024-01-01T00:00:10"));
    }

    #[test]
    fn test_read_raw_rows_handles_ragged_lines() {
        let input = "timestamp,value\n2024-01-01T00:00:00,1.0\n2024-01-01T00:00:01\n2024-01-01T00:00:02,2.0,extra\n";
        let rows = read_raw_rows(input.as_bytes()).unwrap();

        assert_eq!(
            rows,
            vec![
                RawRow::new("2024-01-01T00:00:00", "1.0"),
                RawRow::new("2024-01-01T00:00:01", ""),
                RawRow::new("2024-01-01T00:00:02", "2.0"),
            ]
        );
    }

    #[test]
    fn test_read_raw_rows_header_only() {
        let rows = read_raw_rows("timestamp,value\n".as_bytes()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_clean_file_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("voltaje_sensor_01.csv");
        let output = temp_dir.path().join("voltaje_sensor_01_clean.csv");
        std::fs::write(
            &input,
            "timestamp,value\n2024-01-01T00:00:00,0.4\nbad,1\n2024-01-01T00:02:00,4.17\n",
        )
        .unwrap();

        let first = clean_file(&input, &output, &calibration()).unwrap();
        let first_bytes = std::fs::read(&output).unwrap();
        let second = clean_file(&input, &output, &calibration()).unwrap();
        let second_bytes = std::fs::read(&output).unwrap();

        assert_eq!(first, second);
        assert_eq!(first_bytes, second_bytes);
        assert_eq!(first.stats.valid_rows, 2);
    }

    #[test]
    fn test_clean_file_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let result = clean_file(
            &temp_dir.path().join("missing.csv"),
            &temp_dir.path().join("out.csv"),
            &calibration(),
        );
        assert!(matches!(result, Err(crate::error::PipelineError::Io(_))));
    }
}

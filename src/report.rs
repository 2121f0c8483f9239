//! KPI report rows and the per-batch report file.

use crate::cleaning::QualityStats;
use crate::constants::REPORT_COLUMNS;
use crate::error::Result;
use crate::kpi::KpiSet;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// One report line per successfully processed file
///
/// Field order is the column order of the report file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    #[serde(rename = "archivo")]
    pub source_file: String,
    #[serde(rename = "salida")]
    pub output_file: String,
    #[serde(rename = "filas_totales")]
    pub total_rows: usize,
    #[serde(rename = "filas_validas")]
    pub valid_rows: usize,
    #[serde(rename = "descartes_timestamp")]
    pub discarded_timestamp: usize,
    #[serde(rename = "descartes_valor")]
    pub discarded_value: usize,
    #[serde(rename = "%descartadas")]
    pub discarded_pct: f64,
    pub n: usize,
    pub min: f64,
    pub max: f64,
    #[serde(rename = "prom")]
    pub mean: f64,
    pub alerts: usize,
    pub alerts_pct: f64,
}

impl ReportRow {
    pub fn new(
        source_file: impl Into<String>,
        output_file: impl Into<String>,
        stats: &QualityStats,
        kpis: &KpiSet,
    ) -> Self {
        Self {
            source_file: source_file.into(),
            output_file: output_file.into(),
            total_rows: stats.total_rows,
            valid_rows: stats.valid_rows,
            discarded_timestamp: stats.discarded_timestamp,
            discarded_value: stats.discarded_value,
            discarded_pct: stats.discarded_pct,
            n: kpis.n,
            min: kpis.min,
            max: kpis.max,
            mean: kpis.mean,
            alerts: kpis.alerts,
            alerts_pct: kpis.alerts_pct,
        }
    }
}

/// Write the report, header first, rows in the order given
pub fn write_report_to<W: Write>(writer: W, rows: &[ReportRow]) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(REPORT_COLUMNS)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn write_report(path: &Path, rows: &[ReportRow]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_report_to(std::io::BufWriter::new(file), rows)?;
    info!("Wrote KPI report with {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Read a report back, mainly for verification and tooling
pub fn read_report(path: &Path) -> Result<Vec<ReportRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader.deserialize().collect::<std::result::Result<Vec<ReportRow>, _>>()?;
    Ok(rows)
}

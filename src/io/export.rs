//! CSV export of per-turbine yield results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::report::YieldReport;

/// Column header for per-turbine CSV export.
const HEADER: &str = "id,name,available,power_without_wake_kw,power_with_wake_kw,\
                       wake_loss_pct,annual_energy_mwh";

/// Exports per-turbine results to a CSV file at the given path.
///
/// Writes a header row followed by one row per turbine in input order.
/// Produces deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(report: &YieldReport, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(report, buf)
}

/// Writes per-turbine results as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(report: &YieldReport, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for t in &report.turbines {
        wtr.write_record(&[
            t.id.clone(),
            t.name.clone(),
            t.available.to_string(),
            format!("{:.3}", t.power_without_wake_kw),
            format!("{:.3}", t.power_with_wake_kw),
            format!("{:.4}", t.wake_loss_pct),
            format!("{:.3}", t.annual_energy_mwh),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

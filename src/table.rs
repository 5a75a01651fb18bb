//! TELEMAC liquid boundary table writer.
//!
//! Writes the three-line header (marker, labels, units) followed by one
//! tab-delimited row per reference timestamp. Files are written to a
//! temporary sibling and renamed into place, so a failed run leaves no
//! partial table behind.

use crate::config::TableFormat;
use crate::constants::{HEADER_MARKER, TIME_LABEL, TIME_UNIT};
use crate::error::{BoundaryError, Result};
use crate::unify::OutputTable;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Render the table to any writer
pub fn render_table<W: Write>(table: &OutputTable, format: &TableFormat, mut out: W) -> Result<()> {
    writeln!(out, "{}", HEADER_MARKER)?;

    let labels: Vec<&str> = std::iter::once(TIME_LABEL)
        .chain(table.columns.iter().map(|c| c.label.as_str()))
        .collect();
    writeln!(out, "{}", labels.join("\t"))?;

    let units: Vec<&str> = std::iter::once(TIME_UNIT)
        .chain(table.columns.iter().map(|c| c.unit_label.as_str()))
        .collect();
    writeln!(out, "{}", units.join("\t"))?;

    let mut line = String::new();
    for (row, &time) in table.time.iter().enumerate() {
        line.clear();
        line.push_str(&format_cell(time, format));
        for column in &table.columns {
            line.push('\t');
            let cell = column.values.get(row).copied().unwrap_or(f64::NAN);
            line.push_str(&format_cell(cell, format));
        }
        writeln!(out, "{}", line)?;
    }

    out.flush()?;
    Ok(())
}

/// Write the table to `path`, replacing it only once fully written
pub fn write_table_file(table: &OutputTable, format: &TableFormat, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    render_table(table, format, BufWriter::new(temp.as_file_mut()))?;
    temp.persist(path)
        .map_err(|e| BoundaryError::Io(e.error))?;

    debug!("Wrote {} rows to {}", table.rows(), path.display());
    Ok(())
}

fn format_cell(value: f64, format: &TableFormat) -> String {
    if value.is_finite() {
        format!("{:.*}", format.precision, value)
    } else {
        format.missing_token.clone()
    }
}

//! Time-axis unification and gap filling.
//!
//! The station with the most samples supplies the shared time axis. Every
//! other station's samples are dropped onto the axis row at or after their
//! elapsed time, and the rows between them are linearly interpolated.

use crate::config::LeadingFill;
use crate::error::{BoundaryError, Result};
use crate::matrix::RawMatrix;
use crate::models::SeriesKind;
use tracing::{debug, info};

/// One fully populated station column of the output table
#[derive(Debug, Clone, PartialEq)]
pub struct OutputColumn {
    pub name: String,
    pub kind: SeriesKind,
    pub label: String,
    pub unit_label: String,
    pub values: Vec<f64>,
}

/// Dense boundary table on the reference axis
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTable {
    pub time: Vec<f64>,
    pub columns: Vec<OutputColumn>,
    /// Index into `columns` of the station that supplied `time`
    pub reference: usize,
}

impl OutputTable {
    pub fn rows(&self) -> usize {
        self.time.len()
    }

    pub fn reference_name(&self) -> &str {
        &self.columns[self.reference].name
    }
}

/// Index of the station whose series fills the last matrix row
///
/// Only the longest series reaches the last row, so this is the first
/// station in configured order with the maximal sample count.
pub fn select_reference(matrix: &RawMatrix) -> Result<usize> {
    let last = matrix
        .rows
        .checked_sub(1)
        .ok_or_else(|| BoundaryError::configuration("Raw matrix has no rows"))?;

    matrix
        .columns
        .iter()
        .position(|column| column.time.get(last).copied().flatten().is_some())
        .ok_or_else(|| BoundaryError::configuration("No station reaches the last matrix row"))
}

/// Row of `axis` a sample at `time` lands on
///
/// The first row whose axis time is at or after `time`, clamped to the
/// last row for samples past the end of the axis.
pub fn projection_row(axis: &[f64], time: f64) -> usize {
    axis.partition_point(|&t| t < time)
        .min(axis.len().saturating_sub(1))
}

/// Drop a station's samples onto the reference axis
///
/// Samples landing on the same row overwrite each other in order.
pub fn project<I>(axis: &[f64], samples: I) -> Vec<Option<f64>>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut projected = vec![None; axis.len()];
    for (time, value) in samples {
        projected[projection_row(axis, time)] = Some(value);
    }
    projected
}

/// Fill every missing cell of a projected column
///
/// Rows between two known values are linearly interpolated, rows after the
/// last known value repeat the row before them, and rows before the first
/// known value follow `leading_fill`.
pub fn interpolate_column(
    station: &str,
    cells: &[Option<f64>],
    leading_fill: LeadingFill,
) -> Result<Vec<f64>> {
    let known: Vec<usize> = cells
        .iter()
        .enumerate()
        .filter_map(|(row, cell)| cell.map(|_| row))
        .collect();

    let (first, last) = match (known.first(), known.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => {
            return Err(BoundaryError::degenerate(
                station,
                "no samples fall on the reference axis",
            ));
        }
    };

    if first > 0 && leading_fill == LeadingFill::Reject {
        return Err(BoundaryError::degenerate(
            station,
            format!("first sample lands on row {}; earlier rows have no data", first),
        ));
    }

    let mut values = vec![0.0; cells.len()];
    for &row in &known {
        values[row] = cells[row].unwrap_or_default();
    }

    for pair in known.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        let (a, b) = (values[prev], values[next]);
        let span = (next - prev) as f64;
        for (k, cell) in values.iter_mut().enumerate().take(next).skip(prev + 1) {
            *cell = a + (b - a) * (k - prev) as f64 / span;
        }
    }

    let first_value = values[first];
    values[..first].fill(first_value);

    let last_value = values[last];
    values[last + 1..].fill(last_value);

    Ok(values)
}

/// Build the dense output table from the raw matrix
pub fn unify(matrix: &RawMatrix, leading_fill: LeadingFill) -> Result<OutputTable> {
    let reference = select_reference(matrix)?;
    let reference_column = &matrix.columns[reference];

    let time: Vec<f64> = reference_column.time.iter().flatten().copied().collect();
    info!(
        "Reference axis from station {} ({} rows, {}s)",
        reference_column.name,
        time.len(),
        time.last().copied().unwrap_or_default()
    );

    let columns = matrix
        .columns
        .iter()
        .enumerate()
        .map(|(index, column)| -> Result<OutputColumn> {
            let values: Vec<f64> = if index == reference {
                column.value.iter().flatten().copied().collect()
            } else {
                let projected = project(&time, column.samples());
                debug!(
                    "Station {}: {} of {} rows known after projection",
                    column.name,
                    projected.iter().filter(|cell| cell.is_some()).count(),
                    time.len()
                );
                interpolate_column(&column.name, &projected, leading_fill)?
            };

            Ok(OutputColumn {
                name: column.name.clone(),
                kind: column.kind,
                label: column.label.clone(),
                unit_label: column.unit_label.clone(),
                values,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(OutputTable {
        time,
        columns,
        reference,
    })
}

//! Per-station series extraction.
//!
//! Reads the tab-delimited data section of a station file with polars,
//! parses timestamps and values, and turns the timestamps into elapsed
//! seconds relative to the station's own first reading.

use crate::config::{SourceFormat, StationConfig};
use crate::constants::SOURCE_SEPARATOR;
use crate::error::{BoundaryError, Result};
use crate::header::scan_source;
use crate::models::{Sample, StationSeries};
use chrono::NaiveDateTime;
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Extract one station's series from its source file
pub fn extract_series(
    station: &StationConfig,
    base_format: &SourceFormat,
    skip_invalid_values: bool,
) -> Result<StationSeries> {
    let format = station.source_format(base_format);
    let boundaries = scan_source(&station.path, &format)?;

    if boundaries.data_rows == 0 {
        return Err(BoundaryError::degenerate(
            &station.name,
            format!(
                "no data rows after {} header lines in {}",
                boundaries.skip_rows,
                station.path.display()
            ),
        ));
    }

    let frame = read_data_section(&station.path, boundaries.skip_rows)?;
    debug!(
        "Read {} rows x {} columns from {}",
        frame.height(),
        frame.width(),
        station.path.display()
    );

    let first_line = boundaries.skip_rows + 1;
    let times = string_column(&frame, station.time_column, &station.path, first_line)?;
    let values = string_column(&frame, station.value_column, &station.path, first_line)?;

    let rows = SourceRows {
        path: &station.path,
        first_line,
        time_column: station.time_column,
        value_column: station.value_column,
        times: &times,
        values: &values,
    };
    let samples = rows.parse(&format.timestamp_format, skip_invalid_values)?;

    if samples.is_empty() {
        return Err(BoundaryError::degenerate(
            &station.name,
            "every row was skipped as invalid",
        ));
    }

    let span = samples.last().map_or(0.0, |s| s.elapsed_seconds);
    info!(
        "Extracted {} samples for station {} spanning {}s",
        samples.len(),
        station.name,
        span
    );

    Ok(StationSeries {
        name: station.name.clone(),
        kind: station.kind,
        unit_system: station.unit_system,
        datum_shift: station.datum_shift,
        samples,
    })
}

/// Read the data section as untyped string columns
fn read_data_section(path: &Path, skip_rows: usize) -> Result<DataFrame> {
    let frame = CsvReadOptions::default()
        .with_has_header(false)
        .with_skip_rows(skip_rows)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|options| {
            options
                .with_separator(SOURCE_SEPARATOR)
                .with_quote_char(None)
                .with_truncate_ragged_lines(true)
        })
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    Ok(frame)
}

fn string_column<'a>(
    frame: &'a DataFrame,
    index: usize,
    path: &Path,
    first_line: usize,
) -> Result<Vec<Option<&'a str>>> {
    let column = frame
        .get_columns()
        .get(index)
        .ok_or_else(|| BoundaryError::MissingColumn {
            path: path.to_path_buf(),
            line: first_line,
            column: index,
        })?;

    Ok(column.as_materialized_series().str()?.into_iter().collect())
}

/// Raw time/value cells of a station's data section
pub(crate) struct SourceRows<'a> {
    pub path: &'a Path,
    /// One-based file line of the first data row
    pub first_line: usize,
    pub time_column: usize,
    pub value_column: usize,
    pub times: &'a [Option<&'a str>],
    pub values: &'a [Option<&'a str>],
}

impl SourceRows<'_> {
    /// Parse rows into samples with cumulative elapsed seconds
    ///
    /// Every row with a valid timestamp advances the clock, including rows
    /// whose value is skipped, so a station's time zero stays its first
    /// timestamp.
    pub fn parse(&self, timestamp_format: &str, skip_invalid_values: bool) -> Result<Vec<Sample>> {
        let mut samples = Vec::with_capacity(self.times.len());
        let mut previous: Option<NaiveDateTime> = None;
        let mut elapsed_seconds = 0.0;

        let cells = self.times.iter().copied().zip(self.values.iter().copied());
        for (i, (time, value)) in cells.enumerate() {
            let line = self.first_line + i;

            let raw_time = match (time, value) {
                (None, None) => continue,
                (None, Some(_)) => return Err(self.missing(line, self.time_column)),
                (Some(raw), _) => raw.trim(),
            };

            let timestamp =
                NaiveDateTime::parse_from_str(raw_time, timestamp_format).map_err(|e| {
                    self.parse_error(
                        line,
                        format!(
                            "timestamp '{}' does not match '{}': {}",
                            raw_time, timestamp_format, e
                        ),
                    )
                })?;

            if let Some(previous) = previous {
                let delta = (timestamp - previous).num_seconds();
                if delta <= 0 {
                    return Err(self.parse_error(
                        line,
                        format!(
                            "timestamp {} is not after {}; repeated local time, check tz_cd \
                             (daylight saving fall-back repeats an hour)",
                            timestamp, previous
                        ),
                    ));
                }
                elapsed_seconds += delta as f64;
            }
            previous = Some(timestamp);

            let parsed = match value.map(|raw| raw.trim()).filter(|raw| !raw.is_empty()) {
                None if skip_invalid_values => {
                    warn!("{}:{}: empty value skipped", self.path.display(), line);
                    continue;
                }
                None => return Err(self.missing(line, self.value_column)),
                Some(raw) => match raw.parse::<f64>() {
                    Ok(v) if v.is_finite() => v,
                    _ if skip_invalid_values => {
                        warn!("{}:{}: value '{}' skipped", self.path.display(), line, raw);
                        continue;
                    }
                    _ => {
                        return Err(
                            self.parse_error(line, format!("value '{}' is not a number", raw))
                        );
                    }
                },
            };

            samples.push(Sample::new(elapsed_seconds, parsed));
        }

        Ok(samples)
    }

    fn missing(&self, line: usize, column: usize) -> BoundaryError {
        BoundaryError::MissingColumn {
            path: self.path.to_path_buf(),
            line,
            column,
        }
    }

    fn parse_error(&self, line: usize, reason: String) -> BoundaryError {
        BoundaryError::Parse {
            path: self.path.to_path_buf(),
            line,
            reason,
        }
    }
}

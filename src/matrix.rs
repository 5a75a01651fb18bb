//! Raw matrix assembly.
//!
//! Lays the converted station series side by side, one [`StationColumn`]
//! per station, padded with `None` up to the longest series.

use crate::config::StationConfig;
use crate::error::{BoundaryError, Result};
use crate::models::{SeriesKind, StationSeries};
use crate::units::UnitConversion;
use tracing::debug;

/// Time and value cells of one station, front-packed
#[derive(Debug, Clone, PartialEq)]
pub struct StationColumn {
    pub name: String,
    pub kind: SeriesKind,
    pub label: String,
    pub unit_label: String,
    pub time: Vec<Option<f64>>,
    pub value: Vec<Option<f64>>,
}

impl StationColumn {
    /// Number of present samples (the length of the populated prefix)
    pub fn sample_count(&self) -> usize {
        self.time.iter().take_while(|t| t.is_some()).count()
    }

    /// Present (time, value) pairs in order
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.time
            .iter()
            .zip(&self.value)
            .map_while(|(time, value)| Some(((*time)?, (*value)?)))
    }
}

/// Padded matrix of all station series before alignment
#[derive(Debug, Clone, PartialEq)]
pub struct RawMatrix {
    pub rows: usize,
    pub columns: Vec<StationColumn>,
}

/// Largest sample count over all series, 0 for no series
pub fn longest_series(series: &[StationSeries]) -> usize {
    series.iter().map(StationSeries::len).max().unwrap_or(0)
}

impl RawMatrix {
    /// Convert and lay out every series in configured order
    ///
    /// `series[i]` must belong to `stations[i]`; the station configuration
    /// supplies the output header label and unit.
    pub fn assemble(series: &[StationSeries], stations: &[StationConfig]) -> Result<Self> {
        if series.len() != stations.len() {
            return Err(BoundaryError::configuration(format!(
                "{} series extracted for {} configured stations",
                series.len(),
                stations.len()
            )));
        }

        let rows = longest_series(series);
        if rows == 0 {
            return Err(BoundaryError::configuration(
                "No samples in any station; nothing to assemble",
            ));
        }

        let columns = series
            .iter()
            .zip(stations)
            .enumerate()
            .map(|(position, (station_series, station))| {
                let conversion =
                    UnitConversion::for_series(station_series.kind, station_series.unit_system);
                let mut time = vec![None; rows];
                let mut value = vec![None; rows];

                for (row, sample) in station_series.samples.iter().enumerate() {
                    time[row] = Some(sample.elapsed_seconds);
                    value[row] =
                        Some(conversion.apply(sample.value, station_series.datum_shift));
                }

                debug!(
                    "Column {} ({}): {} samples, factor {}",
                    position,
                    station_series.name,
                    station_series.len(),
                    conversion.factor
                );

                StationColumn {
                    name: station_series.name.clone(),
                    kind: station_series.kind,
                    label: station.header_label(position),
                    unit_label: station.header_unit(),
                    time,
                    value,
                }
            })
            .collect();

        Ok(Self { rows, columns })
    }
}

//! Unit conversion for station values.
//!
//! Imperial discharge (cfs) and stage (ft) are scaled to m3/s and m. The
//! datum shift is additive and only meaningful for stage series.

use crate::constants::METRES_PER_FOOT;
use crate::models::{SeriesKind, UnitSystem};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConversion {
    pub factor: f64,
    pub applies_datum: bool,
}

impl UnitConversion {
    pub fn for_series(kind: SeriesKind, unit_system: UnitSystem) -> Self {
        let length_ratio = match unit_system {
            UnitSystem::Metric => 1.0,
            UnitSystem::Imperial => METRES_PER_FOOT,
        };

        match kind {
            SeriesKind::Discharge => Self {
                factor: length_ratio.powi(3),
                applies_datum: false,
            },
            SeriesKind::Stage => Self {
                factor: length_ratio,
                applies_datum: true,
            },
        }
    }

    /// Convert a raw value, adding the datum shift when it applies
    pub fn apply(&self, value: f64, datum_shift: Option<f64>) -> f64 {
        let scaled = value * self.factor;
        match datum_shift {
            Some(shift) if self.applies_datum => scaled + shift,
            _ => scaled,
        }
    }

    /// Recover the raw value from a converted one
    pub fn invert(&self, value: f64, datum_shift: Option<f64>) -> f64 {
        let unshifted = match datum_shift {
            Some(shift) if self.applies_datum => value - shift,
            _ => value,
        };
        unshifted / self.factor
    }
}

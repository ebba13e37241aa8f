//! Windrose frequency distributions.

use crate::error::EngineError;
use crate::units::{SpeedUnit, convert};

/// Extension applied to an open-ended top speed bin when computing its center
/// for energy aggregation, in the windrose's own unit.
///
/// The true contribution of the top bin depends on the tail distribution,
/// which a windrose does not record.
pub const OPEN_BIN_EXTENSION: f64 = 2.0;

/// Measurement height assumed for windroses that do not state one (m).
pub const DEFAULT_MEASUREMENT_HEIGHT_M: f64 = 10.0;

/// A wind-speed range `[min, max)`; `max == None` marks the open top bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedBin {
    pub min: f64,
    pub max: Option<f64>,
}

impl SpeedBin {
    pub fn new(min: f64, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Bin center used by energy aggregation: an open bin spans `[min, min + extension)`.
    pub fn aggregation_center(&self, open_extension: f64) -> f64 {
        let max = self.max.unwrap_or(self.min + open_extension);
        (self.min + max) / 2.0
    }

    /// Bin center used when rescaling between windroses: an open bin is represented by `min`.
    pub fn interpolation_center(&self) -> f64 {
        self.max.map_or(self.min, |max| (self.min + max) / 2.0)
    }

    /// The same bin expressed in another unit.
    pub fn converted(&self, from: SpeedUnit, to: SpeedUnit) -> Self {
        Self {
            min: convert(self.min, from, to),
            max: self.max.map(|m| convert(m, from, to)),
        }
    }
}

/// Frequencies of one direction sector, one percentage per speed bin.
#[derive(Debug, Clone, PartialEq)]
pub struct WindroseEntry {
    /// Sector start (degrees, inclusive).
    pub direction_from: f64,
    /// Sector end (degrees, exclusive).
    pub direction_to: f64,
    /// Percent of time per speed bin.
    pub frequencies: Vec<f64>,
}

impl WindroseEntry {
    /// Central direction of the sector in `[0, 360)`.
    ///
    /// A sector whose end is smaller than its start wraps through north.
    pub fn mid_angle(&self) -> f64 {
        let to = if self.direction_to < self.direction_from {
            self.direction_to + 360.0
        } else {
            self.direction_to
        };
        ((self.direction_from + to) / 2.0).rem_euclid(360.0)
    }
}

/// Statistical distribution of wind by direction sector and speed bin.
///
/// All entries share `speed_bins`; the frequencies of all entries plus
/// `calm_frequency` are expected to sum to roughly 100.
#[derive(Debug, Clone, PartialEq)]
pub struct Windrose {
    pub name: Option<String>,
    pub speed_unit: SpeedUnit,
    pub speed_bins: Vec<SpeedBin>,
    pub entries: Vec<WindroseEntry>,
    /// Percent of time with no directional wind.
    pub calm_frequency: f64,
    /// Height the distribution refers to (m).
    pub measurement_height_m: f64,
}

impl Windrose {
    /// Checks the structural invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidWindrose`] when there are no speed bins
    /// or direction entries, or when an entry's frequency count differs from
    /// the number of speed bins.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.speed_bins.is_empty() {
            return Err(invalid("no speed bins"));
        }
        if self.entries.is_empty() {
            return Err(invalid("no direction entries"));
        }
        if let Some((i, entry)) = self
            .entries
            .iter()
            .enumerate()
            .find(|(_, e)| e.frequencies.len() != self.speed_bins.len())
        {
            return Err(invalid(format!(
                "entry {i} has {} frequencies for {} speed bins",
                entry.frequencies.len(),
                self.speed_bins.len()
            )));
        }
        if self.measurement_height_m.is_nan() || self.measurement_height_m <= 0.0 {
            return Err(invalid("measurement height must be > 0"));
        }
        Ok(())
    }

    /// Sum of all directional frequencies (percent), excluding calm.
    pub fn total_frequency(&self) -> f64 {
        self.entries
            .iter()
            .flat_map(|e| e.frequencies.iter())
            .sum()
    }

    /// Speed bins converted to metres per second.
    pub fn speed_bins_ms(&self) -> Vec<SpeedBin> {
        self.speed_bins
            .iter()
            .map(|b| b.converted(self.speed_unit, SpeedUnit::MetersPerSecond))
            .collect()
    }
}

fn invalid(reason: impl Into<String>) -> EngineError {
    EngineError::InvalidWindrose {
        reason: reason.into(),
    }
}

//! Wind-speed units and conversion between them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Knots to metres per second.
const KNOT_TO_MS: f64 = 0.514444;
/// Knots to kilometres per hour.
const KNOT_TO_KPH: f64 = 1.852;
/// Knots to miles per hour.
const KNOT_TO_MPH: f64 = 1.15078;
/// Miles per hour to metres per second.
const MPH_TO_MS: f64 = 0.44704;
/// Metres per second to kilometres per hour.
const MS_TO_KPH: f64 = 3.6;
/// Miles per hour to kilometres per hour.
const MPH_TO_KPH: f64 = 1.60934;

/// Unit a windrose's speed bins are expressed in.
///
/// Deserializes from the labels used in exchanged project files; an
/// unknown label is rejected with [`EngineError::UnrecognizedUnit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum SpeedUnit {
    #[serde(rename = "knt")]
    Knots,
    #[serde(rename = "mph")]
    Mph,
    #[serde(rename = "kph")]
    Kph,
    #[serde(rename = "ms")]
    MetersPerSecond,
}

impl SpeedUnit {
    /// Every supported unit.
    pub const ALL: [SpeedUnit; 4] = [
        SpeedUnit::Knots,
        SpeedUnit::Mph,
        SpeedUnit::Kph,
        SpeedUnit::MetersPerSecond,
    ];

    /// Canonical short label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Knots => "knt",
            Self::Mph => "mph",
            Self::Kph => "kph",
            Self::MetersPerSecond => "ms",
        }
    }
}

impl fmt::Display for SpeedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpeedUnit {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "knt" | "kn" | "kt" | "kts" | "knot" | "knots" => Ok(Self::Knots),
            "mph" => Ok(Self::Mph),
            "kph" | "kmh" | "km/h" => Ok(Self::Kph),
            "ms" | "m/s" | "mps" => Ok(Self::MetersPerSecond),
            _ => Err(EngineError::UnrecognizedUnit(s.to_string())),
        }
    }
}

impl TryFrom<String> for SpeedUnit {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Converts `speed` from one unit to another.
///
/// Each pair uses a fixed factor; the reverse direction divides by the same
/// factor, so converting there and back returns the input.
pub fn convert(speed: f64, from: SpeedUnit, to: SpeedUnit) -> f64 {
    use SpeedUnit::{Knots, Kph, MetersPerSecond as Ms, Mph};

    match (from, to) {
        (Knots, Knots) | (Mph, Mph) | (Kph, Kph) | (Ms, Ms) => speed,

        (Knots, Ms) => speed * KNOT_TO_MS,
        (Knots, Kph) => speed * KNOT_TO_KPH,
        (Knots, Mph) => speed * KNOT_TO_MPH,
        (Ms, Knots) => speed / KNOT_TO_MS,
        (Kph, Knots) => speed / KNOT_TO_KPH,
        (Mph, Knots) => speed / KNOT_TO_MPH,

        (Mph, Ms) => speed * MPH_TO_MS,
        (Ms, Mph) => speed / MPH_TO_MS,
        (Kph, Ms) => speed / MS_TO_KPH,
        (Ms, Kph) => speed * MS_TO_KPH,
        (Mph, Kph) => speed * MPH_TO_KPH,
        (Kph, Mph) => speed / MPH_TO_KPH,
    }
}

/// Converts `speed` to metres per second.
pub fn to_ms(speed: f64, from: SpeedUnit) -> f64 {
    convert(speed, from, SpeedUnit::MetersPerSecond)
}

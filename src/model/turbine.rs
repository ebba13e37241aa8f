//! Turbines and their type definitions.

use super::curve::{Curve, thrust_coefficient};

/// Static description of a turbine model.
///
/// Power and thrust curves are sorted when the type is built and never
/// change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TurbineType {
    /// Model name.
    pub name: String,
    /// Nameplate power (kW).
    pub rated_power_kw: f64,
    /// Rotor diameter (m).
    pub rotor_diameter_m: f64,
    /// Hub height above ground (m).
    pub hub_height_m: f64,
    /// Whether the nacelle yaws into the wind.
    pub yaw_control: bool,
    /// Cut-in wind speed (m/s).
    pub cut_in_ms: f64,
    /// Cut-out wind speed (m/s).
    pub cut_out_ms: f64,
    /// Power output (kW) over hub-height wind speed (m/s).
    pub power_curve: Curve,
    /// Thrust coefficient over wind speed (m/s), if the manufacturer supplies one.
    pub thrust_curve: Option<Curve>,
}

impl TurbineType {
    /// Rotor radius (m).
    pub fn rotor_radius_m(&self) -> f64 {
        self.rotor_diameter_m / 2.0
    }

    /// Returns `true` when `wind_speed` lies in `[cut_in, cut_out]`.
    pub fn operates_at(&self, wind_speed: f64) -> bool {
        wind_speed >= self.cut_in_ms && wind_speed <= self.cut_out_ms
    }

    /// Power output (kW) at a hub-height wind speed, zero outside the operating window.
    pub fn power_at(&self, wind_speed: f64) -> f64 {
        if self.operates_at(wind_speed) {
            self.power_curve.value_at(wind_speed)
        } else {
            0.0
        }
    }

    /// Thrust coefficient at `wind_speed`, in `[0, 1]`.
    pub fn thrust_at(&self, wind_speed: f64) -> f64 {
        thrust_coefficient(wind_speed, self.thrust_curve.as_ref())
    }
}

/// A turbine placed in the layout.
///
/// Only the two power fields are written by the engine; everything else
/// is owned by the editing collaborators.
#[derive(Debug, Clone, PartialEq)]
pub struct Turbine {
    pub id: String,
    pub name: String,
    /// Latitude (degrees).
    pub lat: f64,
    /// Longitude (degrees).
    pub long: f64,
    /// Unavailable turbines produce nothing and cast no wake.
    pub available: bool,
    /// Assigned model; `None` when the placeholder type is selected.
    pub turbine_type: Option<TurbineType>,
    /// Ground area (roughness zone) the turbine stands in, resolved upstream.
    pub ground_area_id: Option<String>,
    /// Mean power without wake interaction (kW).
    pub power_without_wake: Option<f64>,
    /// Mean power including wake losses (kW).
    pub power_with_wake: Option<f64>,
}

impl Turbine {
    /// Creates an available turbine with no results.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        lat: f64,
        long: f64,
        turbine_type: Option<TurbineType>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lat,
            long,
            available: true,
            turbine_type,
            ground_area_id: None,
            power_without_wake: None,
            power_with_wake: None,
        }
    }

    /// The turbine type if the turbine takes part in a calculation.
    pub fn active_type(&self) -> Option<&TurbineType> {
        if self.available {
            self.turbine_type.as_ref()
        } else {
            None
        }
    }
}

//! Vertical wind-profile laws.
//!
//! Both laws scale a speed measured at `reference_height` to `height`.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Power-law shear exponent for neutral conditions over open terrain.
pub const DEFAULT_SHEAR_EXPONENT: f64 = 0.14;

/// Logarithmic law: `v(h) = v(h0) * ln(h / z0) / ln(h0 / z0)`.
///
/// # Errors
///
/// Returns [`EngineError::Domain`] if `z0`, `height` or `reference_height`
/// is not positive, or if `reference_height == z0`.
pub fn logarithmic(
    speed: f64,
    height: f64,
    reference_height: f64,
    z0: f64,
) -> Result<f64, EngineError> {
    if !(z0 > 0.0 && height > 0.0 && reference_height > 0.0) {
        return Err(EngineError::Domain(format!(
            "logarithmic profile needs positive heights and roughness \
             (h={height}, h0={reference_height}, z0={z0})"
        )));
    }
    let denominator = (reference_height / z0).ln();
    if denominator == 0.0 {
        return Err(EngineError::Domain(format!(
            "logarithmic profile undefined for reference height equal to roughness ({z0} m)"
        )));
    }
    Ok(speed * (height / z0).ln() / denominator)
}

/// Power law: `v(h) = v(h0) * (h / h0)^alpha`.
pub fn power_law(speed: f64, height: f64, reference_height: f64, alpha: f64) -> f64 {
    speed * (height / reference_height).powf(alpha)
}

/// Which profile law the engine applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileLaw {
    /// Logarithmic law with the turbine's ground-area roughness.
    #[default]
    Logarithmic,
    /// Power law with a fixed shear exponent.
    PowerLaw { alpha: f64 },
}

impl ProfileLaw {
    /// Scales `speed` from `reference_height` to `height`.
    ///
    /// `z0` is only used by the logarithmic law.
    ///
    /// # Errors
    ///
    /// Propagates the domain errors of [`logarithmic`].
    pub fn extrapolate(
        &self,
        speed: f64,
        height: f64,
        reference_height: f64,
        z0: f64,
    ) -> Result<f64, EngineError> {
        match *self {
            Self::Logarithmic => logarithmic(speed, height, reference_height, z0),
            Self::PowerLaw { alpha } => Ok(power_law(speed, height, reference_height, alpha)),
        }
    }
}

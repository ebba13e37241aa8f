//! TOML-based engine configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::GroundDefaults;
use crate::model::ground::{DEFAULT_ROUGHNESS_M, DEFAULT_WAKE_DECAY};
use crate::model::windrose::OPEN_BIN_EXTENSION;
use crate::physics::ProfileLaw;
use crate::physics::profile::DEFAULT_SHEAR_EXPONENT;

/// Default wake cutoff in upstream rotor radii (ten diameters).
pub const DEFAULT_MAX_WAKE_DISTANCE: f64 = 20.0;

/// Top-level engine configuration parsed from TOML.
///
/// All fields have defaults matching the reference preset. Load from
/// TOML with [`EngineConfig::from_toml_file`] or use
/// [`EngineConfig::reference`] for the built-in default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Vertical wind-profile law.
    #[serde(default)]
    pub profile: ProfileConfig,
    /// Wake model parameters.
    #[serde(default)]
    pub wake: WakeConfig,
    /// Terrain parameters for turbines outside any ground area.
    #[serde(default)]
    pub ground: GroundConfig,
    /// Windrose aggregation and run limits.
    #[serde(default)]
    pub aggregation: AggregationConfig,
}

/// Which profile law to apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LawKind {
    #[default]
    Logarithmic,
    PowerLaw,
}

/// Vertical wind-profile parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileConfig {
    /// `"logarithmic"` or `"power_law"`.
    pub law: LawKind,
    /// Shear exponent for the power law (ignored by the logarithmic law).
    pub shear_exponent: f64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            law: LawKind::Logarithmic,
            shear_exponent: DEFAULT_SHEAR_EXPONENT,
        }
    }
}

impl ProfileConfig {
    /// The configured law as used by the engine.
    pub fn law(&self) -> ProfileLaw {
        match self.law {
            LawKind::Logarithmic => ProfileLaw::Logarithmic,
            LawKind::PowerLaw => ProfileLaw::PowerLaw {
                alpha: self.shear_exponent,
            },
        }
    }
}

/// Wake model parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WakeConfig {
    /// Cutoff distance in upstream rotor radii (must be > 0).
    pub max_wake_distance: f64,
}

impl Default for WakeConfig {
    fn default() -> Self {
        Self {
            max_wake_distance: DEFAULT_MAX_WAKE_DISTANCE,
        }
    }
}

/// Terrain fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroundConfig {
    /// Roughness length z0 (m, must be > 0).
    pub default_z0: f64,
    /// Wake-decay constant k (must be > 0).
    pub default_k: f64,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            default_z0: DEFAULT_ROUGHNESS_M,
            default_k: DEFAULT_WAKE_DECAY,
        }
    }
}

impl GroundConfig {
    pub fn defaults(&self) -> GroundDefaults {
        GroundDefaults {
            z0: self.default_z0,
            k: self.default_k,
        }
    }
}

/// Aggregation and run limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AggregationConfig {
    /// Width assumed for the open top speed bin, in the windrose's unit.
    pub open_bin_extension: f64,
    /// Wall-clock budget per pass (seconds); unlimited when absent.
    pub time_budget_secs: Option<f64>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            open_bin_extension: OPEN_BIN_EXTENSION,
            time_budget_secs: None,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"wake.max_wake_distance"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl EngineConfig {
    /// Returns the reference configuration: logarithmic law, onshore defaults.
    pub fn reference() -> Self {
        Self::default()
    }

    /// Returns the simplified preset: power law with the neutral shear exponent.
    pub fn simplified() -> Self {
        Self {
            profile: ProfileConfig {
                law: LawKind::PowerLaw,
                shear_exponent: DEFAULT_SHEAR_EXPONENT,
            },
            ..Self::default()
        }
    }

    /// Returns the offshore preset: smooth sea surface, slow wake recovery.
    pub fn offshore() -> Self {
        Self {
            wake: WakeConfig {
                max_wake_distance: 40.0,
            },
            ground: GroundConfig {
                default_z0: 0.0002,
                default_k: 0.04,
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["reference", "simplified", "offshore"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "reference" => Ok(Self::reference()),
            "simplified" => Ok(Self::simplified()),
            "offshore" => Ok(Self::offshore()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut positive = |field: &str, value: f64| {
            if !(value.is_finite() && value > 0.0) {
                errors.push(ConfigError {
                    field: field.into(),
                    message: format!("must be a finite number > 0, got {value}"),
                });
            }
        };

        positive("wake.max_wake_distance", self.wake.max_wake_distance);
        positive("ground.default_z0", self.ground.default_z0);
        positive("ground.default_k", self.ground.default_k);
        if let Some(budget) = self.aggregation.time_budget_secs {
            positive("aggregation.time_budget_secs", budget);
        }

        let alpha = self.profile.shear_exponent;
        if !alpha.is_finite() || alpha < 0.0 {
            errors.push(ConfigError {
                field: "profile.shear_exponent".into(),
                message: format!("must be a finite number >= 0, got {alpha}"),
            });
        }

        let ext = self.aggregation.open_bin_extension;
        if !ext.is_finite() || ext < 0.0 {
            errors.push(ConfigError {
                field: "aggregation.open_bin_extension".into(),
                message: format!("must be a finite number >= 0, got {ext}"),
            });
        }

        errors
    }
}

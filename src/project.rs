//! JSON project documents as exchanged by the layout editor.
//!
//! The document mirrors the editor's persisted state: camelCase keys,
//! turbine types either embedded in each turbine or referenced by name,
//! ground areas as GeoJSON polygon features and open speed bins written
//! as `null`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::engine::WindroseSource;
use crate::error::EngineError;
use crate::model::windrose::DEFAULT_MEASUREMENT_HEIGHT_M;
use crate::model::{
    Curve, GroundArea, GroundAreas, GroundDefaults, Mast, SpeedBin, Turbine, TurbineType, Windrose,
    WindroseEntry,
};
use crate::units::SpeedUnit;

/// Name of the placeholder type the editor assigns to new turbines.
pub const PLACEHOLDER_TYPE: &str = "DefaultNull";

/// Errors raised while loading a project document.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("cannot read project \"{path}\": {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid project JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{entity} \"{id}\": {reason}")]
    Invalid {
        entity: &'static str,
        id: String,
        reason: String,
    },

    #[error("project has neither masts nor a site windrose")]
    MissingWind,

    #[error(transparent)]
    Engine(#[from] EngineError),
}

fn yes() -> bool {
    true
}

fn default_speed_unit() -> SpeedUnit {
    SpeedUnit::MetersPerSecond
}

/// Top-level project document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    #[serde(default)]
    pub turbines: Vec<TurbineDoc>,
    #[serde(default)]
    pub masts: Vec<MastDoc>,
    #[serde(default)]
    pub ground_areas: Vec<GroundAreaFeature>,
    #[serde(default)]
    pub turbine_types: Vec<TurbineTypeDoc>,
    /// Site windrose used when there are no masts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windrose: Option<WindroseDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurbineDoc {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub long: f64,
    #[serde(default = "yes")]
    pub available: bool,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub turbine_type: Option<TypeRef>,
    #[serde(rename = "groundAreaID", default, skip_serializing_if = "Option::is_none")]
    pub ground_area_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_without_wake: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_with_wake: Option<f64>,
}

/// A turbine's type: embedded, or the name of an entry in `turbineTypes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeRef {
    Embedded(TurbineTypeDoc),
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurbineTypeDoc {
    pub name: String,
    pub rated_power: f64,
    pub rotor_diameter: f64,
    pub hub_height: f64,
    #[serde(default)]
    pub yaw_control: bool,
    #[serde(default)]
    pub power_curve: Vec<PowerPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thrust_coefficient_curve: Option<Vec<ThrustPoint>>,
    pub cut_in: f64,
    pub cut_out: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerPoint {
    pub wind_speed: f64,
    pub power: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThrustPoint {
    pub wind_speed: f64,
    pub thrust: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindroseDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_speed_unit")]
    pub speed_unit: SpeedUnit,
    #[serde(default)]
    pub calm_frequency: f64,
    /// `[min, max]` pairs; `max == null` is the open top bin.
    pub speed_bins: Vec<(f64, Option<f64>)>,
    pub data: Vec<WindroseEntryDoc>,
    /// Measurement height (m).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindroseEntryDoc {
    pub direction_range: (f64, f64),
    pub frequencies: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MastDoc {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub long: f64,
    pub measure_height: f64,
    #[serde(default = "yes")]
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windrose: Option<WindroseDoc>,
}

/// GeoJSON `Feature<Polygon>` carrying terrain properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundAreaFeature {
    #[serde(rename = "type", default = "feature_tag")]
    pub kind: String,
    pub geometry: PolygonGeometry,
    pub properties: AreaProperties,
}

fn feature_tag() -> String {
    "Feature".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    /// Rings of `[long, lat]` positions; the first ring is the outer boundary.
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaProperties {
    pub name: String,
    pub z0: f64,
    pub k: f64,
    pub id: String,
}

/// Everything the engine needs, resolved from a document.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectInputs {
    pub turbines: Vec<Turbine>,
    pub source: WindroseSource,
    pub ground: GroundAreas,
}

impl WindroseDoc {
    /// Converts to a model windrose; `fallback_height` applies when no elevation is given.
    pub fn to_model(&self, fallback_height: f64) -> Windrose {
        Windrose {
            name: self.name.clone(),
            speed_unit: self.speed_unit,
            speed_bins: self
                .speed_bins
                .iter()
                .map(|&(min, max)| SpeedBin::new(min, max))
                .collect(),
            entries: self
                .data
                .iter()
                .map(|e| WindroseEntry {
                    direction_from: e.direction_range.0,
                    direction_to: e.direction_range.1,
                    frequencies: e.frequencies.clone(),
                })
                .collect(),
            calm_frequency: self.calm_frequency,
            measurement_height_m: self.elevation.unwrap_or(fallback_height),
        }
    }
}

impl TurbineTypeDoc {
    /// Converts to a model type, sorting both curves once.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptyCurve`] when the power curve has no points.
    pub fn to_model(&self) -> Result<TurbineType, EngineError> {
        let power_curve = Curve::new(
            self.power_curve
                .iter()
                .map(|p| (p.wind_speed, p.power))
                .collect(),
        )?;
        let thrust_curve = self
            .thrust_coefficient_curve
            .as_deref()
            .filter(|points| !points.is_empty())
            .map(|points| Curve::new(points.iter().map(|p| (p.wind_speed, p.thrust)).collect()))
            .transpose()?;

        Ok(TurbineType {
            name: self.name.clone(),
            rated_power_kw: self.rated_power,
            rotor_diameter_m: self.rotor_diameter,
            hub_height_m: self.hub_height,
            yaw_control: self.yaw_control,
            cut_in_ms: self.cut_in,
            cut_out_ms: self.cut_out,
            power_curve,
            thrust_curve,
        })
    }
}

impl GroundAreaFeature {
    /// Converts to a model area.
    ///
    /// # Errors
    ///
    /// Rejects non-positive `z0` or `k` and polygons without an outer ring.
    pub fn to_model(&self) -> Result<GroundArea, ProjectError> {
        let props = &self.properties;
        let invalid = |reason: String| ProjectError::Invalid {
            entity: "ground area",
            id: props.id.clone(),
            reason,
        };
        if props.z0.is_nan() || props.z0 <= 0.0 {
            return Err(invalid(format!("z0 must be > 0, got {}", props.z0)));
        }
        if props.k.is_nan() || props.k <= 0.0 {
            return Err(invalid(format!("k must be > 0, got {}", props.k)));
        }
        let ring = self
            .geometry
            .coordinates
            .first()
            .filter(|ring| ring.len() >= 3)
            .ok_or_else(|| invalid("polygon has no outer ring".to_string()))?;

        Ok(GroundArea {
            id: props.id.clone(),
            name: props.name.clone(),
            z0: props.z0,
            k: props.k,
            ring: ring.iter().map(|&[long, lat]| (long, lat)).collect(),
        })
    }
}

impl ProjectDocument {
    /// Parses a project from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::Json`] for malformed JSON or unknown speed units.
    pub fn from_json_str(s: &str) -> Result<Self, ProjectError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Parses a project from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::Io`] if the file cannot be read, otherwise as
    /// [`ProjectDocument::from_json_str`].
    pub fn from_json_file(path: &Path) -> Result<Self, ProjectError> {
        let content = fs::read_to_string(path).map_err(|source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Resolves a turbine's type reference.
    ///
    /// The placeholder type, unknown names and types with an empty power
    /// curve all leave the turbine untyped.
    fn resolve_type(&self, turbine: &TurbineDoc) -> Option<TurbineType> {
        let doc = match turbine.turbine_type.as_ref()? {
            TypeRef::Embedded(doc) => doc,
            TypeRef::Named(name) if name == PLACEHOLDER_TYPE => return None,
            TypeRef::Named(name) => match self.turbine_types.iter().find(|t| &t.name == name) {
                Some(doc) => doc,
                None => {
                    warn!(turbine = %turbine.name, r#type = %name, "unknown turbine type");
                    return None;
                }
            },
        };
        if doc.name == PLACEHOLDER_TYPE {
            return None;
        }
        match doc.to_model() {
            Ok(kind) => Some(kind),
            Err(error) => {
                warn!(turbine = %turbine.name, r#type = %doc.name, %error, "turbine type rejected");
                None
            }
        }
    }

    /// Builds the engine inputs.
    ///
    /// Masts are the wind source whenever the document has any; otherwise
    /// the site windrose is shared by all turbines.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::Invalid`] for malformed ground areas and
    /// [`ProjectError::MissingWind`] when there is no wind source.
    pub fn to_inputs(&self, defaults: GroundDefaults) -> Result<ProjectInputs, ProjectError> {
        let turbines = self
            .turbines
            .iter()
            .map(|doc| Turbine {
                id: doc.id.clone(),
                name: doc.name.clone(),
                lat: doc.lat,
                long: doc.long,
                available: doc.available,
                turbine_type: self.resolve_type(doc),
                ground_area_id: doc.ground_area_id.clone().filter(|id| !id.is_empty()),
                power_without_wake: doc.power_without_wake,
                power_with_wake: doc.power_with_wake,
            })
            .collect();

        let areas = self
            .ground_areas
            .iter()
            .map(GroundAreaFeature::to_model)
            .collect::<Result<Vec<_>, _>>()?;

        let source = if !self.masts.is_empty() {
            WindroseSource::Masts(
                self.masts
                    .iter()
                    .map(|m| Mast {
                        id: m.id.clone(),
                        name: m.name.clone(),
                        lat: m.lat,
                        long: m.long,
                        measurement_height_m: m.measure_height,
                        available: m.available,
                        windrose: m.windrose.as_ref().map(|w| w.to_model(m.measure_height)),
                    })
                    .collect(),
            )
        } else if let Some(windrose) = &self.windrose {
            WindroseSource::Shared(windrose.to_model(DEFAULT_MEASUREMENT_HEIGHT_M))
        } else {
            return Err(ProjectError::MissingWind);
        };

        Ok(ProjectInputs {
            turbines,
            source,
            ground: GroundAreas::new(areas, defaults),
        })
    }

    /// Writes computed power figures back onto the matching turbines.
    pub fn apply_results(&mut self, turbines: &[Turbine]) {
        for doc in &mut self.turbines {
            if let Some(t) = turbines.iter().find(|t| t.id == doc.id) {
                doc.power_without_wake = t.power_without_wake;
                doc.power_with_wake = t.power_with_wake;
            }
        }
    }
}

//! Ground areas: terrain roughness and wake-decay zones.
//!
//! Which area a turbine stands in is decided before the engine runs; the
//! engine only looks areas up by the turbine's `ground_area_id`.

use tracing::{debug, warn};

use super::turbine::Turbine;

/// Roughness length used for turbines outside any ground area (m).
pub const DEFAULT_ROUGHNESS_M: f64 = 0.03;

/// Wake-decay constant used for turbines outside any ground area.
pub const DEFAULT_WAKE_DECAY: f64 = 0.08;

/// A polygonal terrain zone.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundArea {
    pub id: String,
    pub name: String,
    /// Roughness length z0 (m).
    pub z0: f64,
    /// Wake-decay constant k.
    pub k: f64,
    /// Outer ring as `(long, lat)` vertices; closing vertex optional.
    pub ring: Vec<(f64, f64)>,
}

impl GroundArea {
    /// Returns `true` if the point lies inside the outer ring (even-odd rule).
    pub fn contains(&self, lat: f64, long: f64) -> bool {
        let n = self.ring.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = self.ring[i];
            let (xj, yj) = self.ring[j];
            if (yi > lat) != (yj > lat) && long < (xj - xi) * (lat - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

/// Terrain parameters for turbines without an area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundDefaults {
    /// Roughness length z0 (m).
    pub z0: f64,
    /// Wake-decay constant k.
    pub k: f64,
}

impl Default for GroundDefaults {
    fn default() -> Self {
        Self {
            z0: DEFAULT_ROUGHNESS_M,
            k: DEFAULT_WAKE_DECAY,
        }
    }
}

/// All ground areas of a project plus the fallback parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundAreas {
    areas: Vec<GroundArea>,
    defaults: GroundDefaults,
}

impl GroundAreas {
    pub fn new(areas: Vec<GroundArea>, defaults: GroundDefaults) -> Self {
        Self { areas, defaults }
    }

    /// Same areas with different fallback parameters.
    pub fn with_defaults(mut self, defaults: GroundDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn areas(&self) -> &[GroundArea] {
        &self.areas
    }

    pub fn defaults(&self) -> GroundDefaults {
        self.defaults
    }

    /// Looks an area up by id.
    pub fn get(&self, id: &str) -> Option<&GroundArea> {
        self.areas.iter().find(|a| a.id == id)
    }

    fn area_of(&self, turbine: &Turbine) -> Option<&GroundArea> {
        turbine.ground_area_id.as_deref().and_then(|id| self.get(id))
    }

    /// Roughness length for a turbine, falling back to the default.
    pub fn roughness_for(&self, turbine: &Turbine) -> f64 {
        self.area_of(turbine).map_or(self.defaults.z0, |a| a.z0)
    }

    /// Wake-decay constant for a turbine, falling back to the default.
    pub fn wake_decay_for(&self, turbine: &Turbine) -> f64 {
        self.area_of(turbine).map_or(self.defaults.k, |a| a.k)
    }
}

/// Assigns every turbine the first ground area that contains it.
///
/// Turbines outside all areas lose any previous assignment and fall back to
/// the default terrain parameters.
pub fn assign_ground_areas(turbines: &mut [Turbine], areas: &GroundAreas) {
    for turbine in turbines.iter_mut() {
        let hit = areas
            .areas()
            .iter()
            .find(|a| a.contains(turbine.lat, turbine.long));
        match hit {
            Some(area) => {
                debug!(turbine = %turbine.name, area = %area.name, "ground area assigned");
                turbine.ground_area_id = Some(area.id.clone());
            }
            None => {
                warn!(turbine = %turbine.name, "no ground area contains turbine");
                turbine.ground_area_id = None;
            }
        }
    }
}

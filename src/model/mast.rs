use super::windrose::Windrose;

/// A wind-measurement mast with its recorded windrose.
#[derive(Debug, Clone, PartialEq)]
pub struct Mast {
    pub id: String,
    pub name: String,
    /// Latitude (degrees).
    pub lat: f64,
    /// Longitude (degrees).
    pub long: f64,
    /// Sensor height above ground (m).
    pub measurement_height_m: f64,
    pub available: bool,
    pub windrose: Option<Windrose>,
}

impl Mast {
    /// The mast's windrose if the mast can take part in interpolation.
    pub fn usable_windrose(&self) -> Option<&Windrose> {
        if self.available {
            self.windrose.as_ref()
        } else {
            None
        }
    }
}

//! Geodesy helpers: great-circle distance and a local metric frame.

/// Mean Earth radius (m).
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Metres per degree of latitude in the equirectangular approximation.
pub const METERS_PER_DEG_LAT: f64 = 111_320.0;

/// Great-circle distance between two points (m).
pub fn haversine_m(lat1: f64, long1: f64, lat2: f64, long2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_long = (long2 - long1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_long / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Equirectangular projection around a reference point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    origin_lat: f64,
    origin_long: f64,
    meters_per_deg_long: f64,
}

impl LocalFrame {
    pub fn new(origin_lat: f64, origin_long: f64) -> Self {
        Self {
            origin_lat,
            origin_long,
            meters_per_deg_long: METERS_PER_DEG_LAT * origin_lat.to_radians().cos(),
        }
    }

    /// Frame centred on the mean position of `points` (`(lat, long)` pairs).
    ///
    /// Returns `None` for an empty iterator.
    pub fn centred_on(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let (mut lat, mut long, mut n) = (0.0, 0.0, 0usize);
        for (la, lo) in points {
            lat += la;
            long += lo;
            n += 1;
        }
        if n == 0 {
            return None;
        }
        let n = n as f64;
        Some(Self::new(lat / n, long / n))
    }

    /// East/north offset of a point from the origin (m).
    pub fn to_local(&self, lat: f64, long: f64) -> (f64, f64) {
        (
            (long - self.origin_long) * self.meters_per_deg_long,
            (lat - self.origin_lat) * METERS_PER_DEG_LAT,
        )
    }
}

/// Rotates `(x, y)` by `angle_deg`.
///
/// Returns `(x cos a + y sin a, -x sin a + y cos a)`.
pub fn rotate(x: f64, y: f64, angle_deg: f64) -> (f64, f64) {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    (x * cos + y * sin, -x * sin + y * cos)
}

//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use wake_yield::model::curve::Curve;
use wake_yield::model::{Mast, SpeedBin, Turbine, TurbineType, Windrose, WindroseEntry};
use wake_yield::physics::geo::METERS_PER_DEG_LAT;
use wake_yield::units::SpeedUnit;

/// Latitude of the fixture site.
pub const SITE_LAT: f64 = 54.0;
/// Longitude of the fixture site.
pub const SITE_LONG: f64 = 9.0;
/// Hub height of the fixture turbine type (m).
pub const HUB_HEIGHT_M: f64 = 100.0;
/// Rotor diameter of the fixture turbine type (m).
pub const ROTOR_DIAMETER_M: f64 = 100.0;

/// 3 MW turbine with 100 m rotor on a 100 m tower.
pub fn turbine_type() -> TurbineType {
    TurbineType {
        name: "Fixture 3.0-100".into(),
        rated_power_kw: 3000.0,
        rotor_diameter_m: ROTOR_DIAMETER_M,
        hub_height_m: HUB_HEIGHT_M,
        yaw_control: true,
        cut_in_ms: 3.0,
        cut_out_ms: 25.0,
        power_curve: Curve::new(vec![
            (3.0, 0.0),
            (5.0, 150.0),
            (8.0, 900.0),
            (11.0, 2500.0),
            (13.0, 3000.0),
            (25.0, 3000.0),
        ])
        .expect("non-empty curve"),
        thrust_curve: Some(
            Curve::new(vec![(3.0, 0.85), (8.0, 0.8), (12.0, 0.5), (25.0, 0.1)])
                .expect("non-empty curve"),
        ),
    }
}

/// Latitude and longitude of a point offset from the site in metres.
pub fn offset(east_m: f64, north_m: f64) -> (f64, f64) {
    let lat = SITE_LAT + north_m / METERS_PER_DEG_LAT;
    let long = SITE_LONG + east_m / (METERS_PER_DEG_LAT * SITE_LAT.to_radians().cos());
    (lat, long)
}

/// Available fixture turbine at an offset from the site.
pub fn turbine_at(id: &str, east_m: f64, north_m: f64) -> Turbine {
    let (lat, long) = offset(east_m, north_m);
    Turbine::new(id, id.to_uppercase(), lat, long, Some(turbine_type()))
}

/// Windrose whose whole frequency sits in one direction entry and one speed bin.
pub fn single_sector_rose(direction: (f64, f64), bin: (f64, f64), height_m: f64) -> Windrose {
    Windrose {
        name: None,
        speed_unit: SpeedUnit::MetersPerSecond,
        speed_bins: vec![SpeedBin::new(bin.0, Some(bin.1))],
        entries: vec![WindroseEntry {
            direction_from: direction.0,
            direction_to: direction.1,
            frequencies: vec![100.0],
        }],
        calm_frequency: 0.0,
        measurement_height_m: height_m,
    }
}

/// Four-sector windrose with three closed speed bins and a calm share.
pub fn four_sector_rose(height_m: f64) -> Windrose {
    let frequencies = [
        [4.0, 8.0, 6.0],
        [3.0, 7.0, 5.0],
        [6.0, 12.0, 10.0],
        [5.0, 11.0, 9.0],
    ];
    Windrose {
        name: Some("fixture".into()),
        speed_unit: SpeedUnit::MetersPerSecond,
        speed_bins: vec![
            SpeedBin::new(4.0, Some(6.0)),
            SpeedBin::new(6.0, Some(8.0)),
            SpeedBin::new(8.0, Some(10.0)),
        ],
        entries: [(315.0, 45.0), (45.0, 135.0), (135.0, 225.0), (225.0, 315.0)]
            .iter()
            .zip(frequencies)
            .map(|(&(from, to), f)| WindroseEntry {
                direction_from: from,
                direction_to: to,
                frequencies: f.to_vec(),
            })
            .collect(),
        calm_frequency: 14.0,
        measurement_height_m: height_m,
    }
}

/// Available mast with a windrose at an offset from the site.
pub fn mast_at(id: &str, east_m: f64, north_m: f64, windrose: Windrose) -> Mast {
    let (lat, long) = offset(east_m, north_m);
    Mast {
        id: id.into(),
        name: id.to_uppercase(),
        lat,
        long,
        measurement_height_m: windrose.measurement_height_m,
        available: true,
        windrose: Some(windrose),
    }
}

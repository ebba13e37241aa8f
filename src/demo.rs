//! Seeded synthetic wind farm used when no project file is given.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::physics::geo::METERS_PER_DEG_LAT;
use crate::project::{
    AreaProperties, GroundAreaFeature, MastDoc, PolygonGeometry, PowerPoint, ProjectDocument,
    ThrustPoint, TurbineDoc, TurbineTypeDoc, TypeRef, WindroseDoc, WindroseEntryDoc,
};
use crate::units::SpeedUnit;

/// Site centre of the demo farm (North Frisian coast).
const ORIGIN_LAT: f64 = 54.62;
const ORIGIN_LONG: f64 = 8.88;

const ROWS: usize = 3;
const COLUMNS: usize = 4;
const SECTORS: usize = 12;
const TYPE_NAME: &str = "Demo 3.0-112";
const ROTOR_DIAMETER_M: f64 = 112.0;

/// Speed bins (m/s); the last one is open.
const SPEED_BINS: [(f64, Option<f64>); 7] = [
    (0.0, Some(3.0)),
    (3.0, Some(5.0)),
    (5.0, Some(7.0)),
    (7.0, Some(9.0)),
    (9.0, Some(12.0)),
    (12.0, Some(16.0)),
    (16.0, None),
];

fn turbine_type() -> TurbineTypeDoc {
    let power = [
        (3.0, 25.0),
        (4.0, 120.0),
        (5.0, 280.0),
        (6.0, 520.0),
        (7.0, 860.0),
        (8.0, 1300.0),
        (9.0, 1850.0),
        (10.0, 2400.0),
        (11.0, 2850.0),
        (12.0, 3000.0),
        (25.0, 3000.0),
    ];
    let thrust = [
        (3.0, 0.88),
        (6.0, 0.82),
        (9.0, 0.75),
        (12.0, 0.45),
        (16.0, 0.2),
        (25.0, 0.07),
    ];
    TurbineTypeDoc {
        name: TYPE_NAME.to_string(),
        rated_power: 3000.0,
        rotor_diameter: ROTOR_DIAMETER_M,
        hub_height: 119.0,
        yaw_control: true,
        power_curve: power
            .iter()
            .map(|&(wind_speed, power)| PowerPoint { wind_speed, power })
            .collect(),
        thrust_coefficient_curve: Some(
            thrust
                .iter()
                .map(|&(wind_speed, thrust)| ThrustPoint { wind_speed, thrust })
                .collect(),
        ),
        cut_in: 3.0,
        cut_out: 25.0,
    }
}

/// Windrose with a Weibull-shaped speed distribution and one prevailing direction.
fn windrose(rng: &mut StdRng, prevailing_deg: f64, scale_ms: f64, elevation: f64) -> WindroseDoc {
    let shape = 2.0;
    let calm: f64 = rng.random_range(1.0..4.0);
    let width = 360.0 / SECTORS as f64;

    let mut data: Vec<WindroseEntryDoc> = (0..SECTORS)
        .map(|s| {
            let from = (s as f64 * width - width / 2.0).rem_euclid(360.0);
            let to = (from + width).rem_euclid(360.0);
            let centre = s as f64 * width;
            let bias = 1.0 + 0.8 * (centre - prevailing_deg).to_radians().cos();
            let frequencies = SPEED_BINS
                .iter()
                .map(|&(min, max)| {
                    let v = (min + max.unwrap_or(min + 4.0)) / 2.0;
                    let x = v / scale_ms;
                    let weibull = shape / scale_ms * x.powf(shape - 1.0) * (-x.powf(shape)).exp();
                    weibull * bias * rng.random_range(0.85..1.15)
                })
                .collect();
            WindroseEntryDoc {
                direction_range: (from, to),
                frequencies,
            }
        })
        .collect();

    let total: f64 = data.iter().flat_map(|e| e.frequencies.iter()).sum();
    for f in data.iter_mut().flat_map(|e| e.frequencies.iter_mut()) {
        *f *= (100.0 - calm) / total;
    }

    WindroseDoc {
        name: None,
        speed_unit: SpeedUnit::MetersPerSecond,
        calm_frequency: calm,
        speed_bins: SPEED_BINS.to_vec(),
        data,
        elevation: Some(elevation),
    }
}

/// Offsets a point by metres east and north.
fn offset(east_m: f64, north_m: f64) -> (f64, f64) {
    let lat = ORIGIN_LAT + north_m / METERS_PER_DEG_LAT;
    let long = ORIGIN_LONG + east_m / (METERS_PER_DEG_LAT * ORIGIN_LAT.to_radians().cos());
    (lat, long)
}

/// Generates a demo project; identical seeds give identical projects.
///
/// The farm is a jittered grid of turbines spaced five rotor diameters
/// apart, measured by two masts. The northern half lies in a rough
/// forest area; one turbine is switched off for maintenance.
pub fn demo_project(seed: u64) -> ProjectDocument {
    let mut rng = StdRng::seed_from_u64(seed);
    let spacing = 5.0 * ROTOR_DIAMETER_M;
    let jitter = 0.1 * spacing;
    let offline = rng.random_range(0..ROWS * COLUMNS);

    let mut turbines = Vec::with_capacity(ROWS * COLUMNS);
    for row in 0..ROWS {
        for col in 0..COLUMNS {
            let n = row * COLUMNS + col;
            let east = col as f64 * spacing + rng.random_range(-jitter..jitter);
            let north = row as f64 * spacing + rng.random_range(-jitter..jitter);
            let (lat, long) = offset(east, north);
            turbines.push(TurbineDoc {
                id: format!("wt-{:02}", n + 1),
                name: format!("WEA {:02}", n + 1),
                lat,
                long,
                available: n != offline,
                turbine_type: Some(TypeRef::Named(TYPE_NAME.to_string())),
                ground_area_id: None,
                power_without_wake: None,
                power_with_wake: None,
            });
        }
    }

    let prevailing = rng.random_range(200.0..280.0);
    let width = COLUMNS as f64 * spacing;
    let height = ROWS as f64 * spacing;
    let masts = [
        ("mast-sw", "Mast SW", -spacing, -spacing, 80.0),
        ("mast-ne", "Mast NE", width, height, 100.0),
    ]
    .into_iter()
    .map(|(id, name, east, north, measure_height)| {
        let (lat, long) = offset(east, north);
        let scale = rng.random_range(6.5..8.5);
        MastDoc {
            id: id.to_string(),
            name: name.to_string(),
            lat,
            long,
            measure_height,
            available: true,
            windrose: Some(windrose(&mut rng, prevailing, scale, measure_height)),
        }
    })
    .collect();

    let corners = [
        offset(-spacing, height / 2.0),
        offset(width, height / 2.0),
        offset(width, height + spacing),
        offset(-spacing, height + spacing),
        offset(-spacing, height / 2.0),
    ];
    let forest = GroundAreaFeature {
        kind: "Feature".to_string(),
        geometry: PolygonGeometry {
            kind: "Polygon".to_string(),
            coordinates: vec![corners.iter().map(|&(lat, long)| [long, lat]).collect()],
        },
        properties: AreaProperties {
            name: "Forest".to_string(),
            z0: 0.3,
            k: 0.075,
            id: "forest".to_string(),
        },
    };

    ProjectDocument {
        turbines,
        masts,
        ground_areas: vec![forest],
        turbine_types: vec![turbine_type()],
        windrose: None,
    }
}

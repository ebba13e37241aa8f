//! Inverse-distance interpolation of mast windroses to a turbine's hub height.

use crate::error::EngineError;
use crate::model::curve::Curve;
use crate::model::{Mast, Turbine, Windrose, WindroseEntry};
use crate::units::SpeedUnit;

use super::geo::haversine_m;
use super::profile::logarithmic;

/// Available masts that carry a windrose, in input order.
fn usable_masts(masts: &[Mast]) -> Vec<(&Mast, &Windrose)> {
    masts
        .iter()
        .filter_map(|m| m.usable_windrose().map(|w| (m, w)))
        .collect()
}

/// Checks that the usable masts can be combined at all.
///
/// The first usable mast defines the direction layout; every other mast
/// must have the same number of direction entries. Speed bins may differ.
///
/// # Errors
///
/// * [`EngineError::NoMastData`] if no available mast has a windrose
/// * [`EngineError::InvalidWindrose`] if a windrose breaks its own invariants
/// * [`EngineError::IncompatibleMast`] if direction layouts disagree
pub fn validate_masts(masts: &[Mast]) -> Result<(), EngineError> {
    let usable = usable_masts(masts);
    let Some((_, reference)) = usable.first() else {
        return Err(EngineError::NoMastData);
    };
    for (mast, windrose) in &usable {
        windrose.validate()?;
        if windrose.entries.len() != reference.entries.len() {
            return Err(EngineError::IncompatibleMast {
                mast: mast.name.clone(),
                reason: format!(
                    "{} direction entries, reference has {}",
                    windrose.entries.len(),
                    reference.entries.len()
                ),
            });
        }
    }
    Ok(())
}

/// Rejects usable masts standing exactly on an available turbine.
///
/// # Errors
///
/// Returns [`EngineError::MastAtTurbine`] for the first co-located pair.
pub fn check_mast_distances(turbines: &[Turbine], masts: &[Mast]) -> Result<(), EngineError> {
    for turbine in turbines.iter().filter(|t| t.available) {
        for (mast, _) in usable_masts(masts) {
            if haversine_m(turbine.lat, turbine.long, mast.lat, mast.long) <= 0.0 {
                return Err(EngineError::MastAtTurbine {
                    mast: mast.name.clone(),
                    turbine: turbine.name.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Builds a synthetic windrose for `turbine` at `hub_height` from all usable masts.
///
/// Each mast's speed-bin centers are lifted from its sensor height to
/// `hub_height` with the logarithmic law and roughness `z0`, its
/// frequencies are remapped onto the first mast's speed bins, and the masts
/// are blended with inverse-distance weights. The result is renormalised so
/// that directional frequencies and calm sum to 100, is expressed in m/s and
/// carries `hub_height` as its measurement height.
///
/// # Errors
///
/// * [`EngineError::NoMastData`] if no available mast has a windrose
/// * [`EngineError::MastAtTurbine`] if a mast is at zero distance
/// * [`EngineError::IncompatibleMast`] if a mast has a different direction layout
/// * [`EngineError::Domain`] if the logarithmic law is undefined for a mast height
pub fn interpolate_windroses(
    turbine: &Turbine,
    hub_height: f64,
    z0: f64,
    masts: &[Mast],
) -> Result<Windrose, EngineError> {
    let usable = usable_masts(masts);
    let Some((_, reference)) = usable.first() else {
        return Err(EngineError::NoMastData);
    };

    let target_bins = reference.speed_bins_ms();
    let target_centers: Vec<f64> = target_bins.iter().map(|b| b.interpolation_center()).collect();
    let direction_count = reference.entries.len();

    let mut distances = Vec::with_capacity(usable.len());
    for (mast, _) in &usable {
        let d = haversine_m(turbine.lat, turbine.long, mast.lat, mast.long);
        if d <= 0.0 {
            return Err(EngineError::MastAtTurbine {
                mast: mast.name.clone(),
                turbine: turbine.name.clone(),
            });
        }
        distances.push(d);
    }
    let inverse_sum: f64 = distances.iter().map(|d| 1.0 / d).sum();

    let mut sums = vec![vec![0.0; target_centers.len()]; direction_count];
    let mut calm = 0.0;

    for ((mast, windrose), distance) in usable.iter().zip(&distances) {
        if windrose.entries.len() != direction_count {
            return Err(EngineError::IncompatibleMast {
                mast: mast.name.clone(),
                reason: format!(
                    "{} direction entries, reference has {direction_count}",
                    windrose.entries.len()
                ),
            });
        }
        let weight = (1.0 / distance) / inverse_sum;

        let scaled_centers = windrose
            .speed_bins_ms()
            .iter()
            .map(|b| logarithmic(b.interpolation_center(), hub_height, mast.measurement_height_m, z0))
            .collect::<Result<Vec<f64>, _>>()?;

        for (entry, sum) in windrose.entries.iter().zip(sums.iter_mut()) {
            let samples: Vec<(f64, f64)> = scaled_centers
                .iter()
                .copied()
                .zip(entry.frequencies.iter().copied())
                .collect();
            let remap = Curve::new(samples)?;
            for (acc, &center) in sum.iter_mut().zip(&target_centers) {
                *acc += remap.value_at(center) * weight;
            }
        }

        calm += windrose.calm_frequency * weight;
    }

    let total: f64 = sums.iter().flatten().sum();
    if total > 0.0 {
        let factor = (100.0 - calm) / total;
        for f in sums.iter_mut().flatten() {
            *f *= factor;
        }
    }

    let entries = reference
        .entries
        .iter()
        .zip(sums)
        .map(|(e, frequencies)| WindroseEntry {
            direction_from: e.direction_from,
            direction_to: e.direction_to,
            frequencies,
        })
        .collect();

    Ok(Windrose {
        name: Some(format!("interpolated {}", turbine.name)),
        speed_unit: SpeedUnit::MetersPerSecond,
        speed_bins: target_bins,
        entries,
        calm_frequency: calm,
        measurement_height_m: hub_height,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::model::SpeedBin;

    fn rose(unit: SpeedUnit, bins: Vec<SpeedBin>, freqs: [Vec<f64>; 2], calm: f64) -> Windrose {
        let [north, south] = freqs;
        Windrose {
            name: None,
            speed_unit: unit,
            speed_bins: bins,
            entries: vec![
                WindroseEntry {
                    direction_from: 0.0,
                    direction_to: 180.0,
                    frequencies: north,
                },
                WindroseEntry {
                    direction_from: 180.0,
                    direction_to: 360.0,
                    frequencies: south,
                },
            ],
            calm_frequency: calm,
            measurement_height_m: 10.0,
        }
    }

    fn ms_bins() -> Vec<SpeedBin> {
        vec![
            SpeedBin::new(0.0, Some(4.0)),
            SpeedBin::new(4.0, Some(8.0)),
            SpeedBin::new(8.0, None),
        ]
    }

    fn mast(id: &str, lat: f64, long: f64, height: f64, windrose: Windrose) -> Mast {
        Mast {
            id: id.into(),
            name: id.into(),
            lat,
            long,
            measurement_height_m: height,
            available: true,
            windrose: Some(windrose),
        }
    }

    fn turbine() -> Turbine {
        Turbine::new("t1", "T1", 54.0, 9.0, None)
    }

    #[test]
    fn no_usable_masts_is_an_error() {
        let mut m = mast(
            "m",
            54.1,
            9.0,
            80.0,
            rose(SpeedUnit::MetersPerSecond, ms_bins(), [vec![1.0; 3], vec![1.0; 3]], 0.0),
        );
        m.available = false;
        assert_eq!(
            interpolate_windroses(&turbine(), 80.0, 0.03, &[m]),
            Err(EngineError::NoMastData)
        );
        assert_eq!(validate_masts(&[]), Err(EngineError::NoMastData));
    }

    #[test]
    fn single_mast_at_hub_height_is_renormalised_copy() {
        let m = mast(
            "m",
            54.01,
            9.0,
            80.0,
            rose(
                SpeedUnit::MetersPerSecond,
                ms_bins(),
                [vec![10.0, 20.0, 10.0], vec![5.0, 25.0, 20.0]],
                10.0,
            ),
        );
        let out = interpolate_windroses(&turbine(), 80.0, 0.03, &[m]).expect("interpolates");
        assert_eq!(out.speed_unit, SpeedUnit::MetersPerSecond);
        assert_eq!(out.measurement_height_m, 80.0);
        assert_relative_eq!(out.calm_frequency, 10.0, max_relative = 1e-12);
        // 90 % directional already, so frequencies stay put
        assert_relative_eq!(out.entries[1].frequencies[1], 25.0, max_relative = 1e-9);
        assert_relative_eq!(out.total_frequency() + out.calm_frequency, 100.0, max_relative = 1e-9);
    }

    #[test]
    fn output_sums_to_hundred_after_blending() {
        let near = mast(
            "near",
            54.01,
            9.0,
            10.0,
            rose(
                SpeedUnit::Knots,
                vec![
                    SpeedBin::new(0.0, Some(6.0)),
                    SpeedBin::new(6.0, Some(12.0)),
                    SpeedBin::new(12.0, None),
                ],
                [vec![12.0, 18.0, 5.0], vec![20.0, 30.0, 10.0]],
                5.0,
            ),
        );
        let far = mast(
            "far",
            54.2,
            9.0,
            60.0,
            rose(
                SpeedUnit::MetersPerSecond,
                vec![SpeedBin::new(0.0, Some(5.0)), SpeedBin::new(5.0, None)],
                [vec![30.0, 10.0], vec![30.0, 22.0]],
                8.0,
            ),
        );
        let out = interpolate_windroses(&turbine(), 100.0, 0.05, &[near, far]).expect("interpolates");
        assert_eq!(out.speed_bins.len(), 3);
        assert!(out.calm_frequency > 5.0 && out.calm_frequency < 8.0);
        assert_relative_eq!(out.total_frequency() + out.calm_frequency, 100.0, max_relative = 1e-9);
    }

    #[test]
    fn nearer_mast_dominates() {
        let windy = rose(
            SpeedUnit::MetersPerSecond,
            ms_bins(),
            [vec![0.0, 0.0, 50.0], vec![0.0, 0.0, 50.0]],
            0.0,
        );
        let calm = rose(
            SpeedUnit::MetersPerSecond,
            ms_bins(),
            [vec![50.0, 0.0, 0.0], vec![50.0, 0.0, 0.0]],
            0.0,
        );
        let masts = [
            mast("windy", 54.001, 9.0, 80.0, windy),
            mast("calm", 54.1, 9.0, 80.0, calm),
        ];
        let out = interpolate_windroses(&turbine(), 80.0, 0.03, &masts).expect("interpolates");
        assert!(out.entries[0].frequencies[2] > out.entries[0].frequencies[0]);
    }

    #[test]
    fn co_located_mast_is_rejected() {
        let m = mast(
            "on-top",
            54.0,
            9.0,
            80.0,
            rose(SpeedUnit::MetersPerSecond, ms_bins(), [vec![1.0; 3], vec![1.0; 3]], 0.0),
        );
        let err = interpolate_windroses(&turbine(), 80.0, 0.03, std::slice::from_ref(&m));
        assert!(matches!(err, Err(EngineError::MastAtTurbine { .. })));
        assert!(check_mast_distances(&[turbine()], &[m]).is_err());
    }

    #[test]
    fn mismatched_direction_layout_is_rejected() {
        let good = mast(
            "a",
            54.1,
            9.0,
            80.0,
            rose(SpeedUnit::MetersPerSecond, ms_bins(), [vec![1.0; 3], vec![1.0; 3]], 0.0),
        );
        let mut odd_rose =
            rose(SpeedUnit::MetersPerSecond, ms_bins(), [vec![1.0; 3], vec![1.0; 3]], 0.0);
        odd_rose.entries.pop();
        let odd = mast("b", 54.2, 9.0, 80.0, odd_rose);
        assert!(matches!(
            validate_masts(&[good, odd]),
            Err(EngineError::IncompatibleMast { .. })
        ));
    }
}

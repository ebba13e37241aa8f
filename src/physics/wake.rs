//! Jensen-style wake deficit with rotor-overlap weighting.
//!
//! For one wind direction every participating turbine is projected into a
//! frame whose +X axis points downwind. The projection is independent of
//! wind speed, so a [`ProjectedLayout`] is built once per direction and then
//! queried for every turbine and speed bin.

use std::f64::consts::PI;

use tracing::trace;

use crate::model::Turbine;

use super::geo::{LocalFrame, rotate};

/// Upper bound of a combined deficit. Effective wind never drops below 5 %
/// of the undisturbed value.
pub const MAX_TOTAL_DEFICIT: f64 = 0.95;

/// Induction-based deficit amplitude `a = 0.5 * (1 - sqrt(1 - ct))`.
pub fn deficit_amplitude(ct: f64) -> f64 {
    0.5 * (1.0 - (1.0 - ct.clamp(0.0, 1.0)).sqrt())
}

/// Centerline velocity deficit `dx` metres behind a rotor of radius `rotor_radius`.
pub fn centerline_deficit(ct: f64, k: f64, dx: f64, rotor_radius: f64) -> f64 {
    deficit_amplitude(ct) / (1.0 + k * dx / rotor_radius).powi(2)
}

/// Radius of the linearly expanding wake cone.
pub fn wake_radius(rotor_radius: f64, k: f64, dx: f64) -> f64 {
    rotor_radius + k * dx
}

/// Intersection area of two circles whose centres are `d` apart.
pub fn circle_overlap_area(r1: f64, r2: f64, d: f64) -> f64 {
    if r1 <= 0.0 || r2 <= 0.0 || d >= r1 + r2 {
        return 0.0;
    }
    if d <= (r1 - r2).abs() {
        let smaller = r1.min(r2);
        return PI * smaller * smaller;
    }

    let (r1_sq, r2_sq, d_sq) = (r1 * r1, r2 * r2, d * d);
    let alpha = ((d_sq + r1_sq - r2_sq) / (2.0 * d * r1)).clamp(-1.0, 1.0).acos();
    let beta = ((d_sq + r2_sq - r1_sq) / (2.0 * d * r2)).clamp(-1.0, 1.0).acos();
    let kite = (-d + r1 + r2) * (d + r1 - r2) * (d - r1 + r2) * (d + r1 + r2);

    r1_sq * alpha + r2_sq * beta - 0.5 * kite.max(0.0).sqrt()
}

/// Fraction of a rotor's swept area covered by a wake cone, `lateral` metres off its axis.
pub fn overlap_ratio(wake_radius: f64, rotor_radius: f64, lateral: f64) -> f64 {
    if rotor_radius <= 0.0 {
        return 0.0;
    }
    circle_overlap_area(wake_radius, rotor_radius, lateral.abs()) / (PI * rotor_radius * rotor_radius)
}

/// Root-sum-of-squares of individual contributions, clamped to `[0, MAX_TOTAL_DEFICIT]`.
pub fn combine_rss(contributions: impl IntoIterator<Item = f64>) -> f64 {
    contributions
        .into_iter()
        .map(|c| c * c)
        .sum::<f64>()
        .sqrt()
        .clamp(0.0, MAX_TOTAL_DEFICIT)
}

#[derive(Debug, Clone, Copy)]
struct Projected {
    /// Index into the turbine slice the layout was built from.
    index: usize,
    x: f64,
    y: f64,
}

/// Available, typed turbines projected for one wind direction, sorted upwind first.
#[derive(Debug, Clone)]
pub struct ProjectedLayout {
    direction_deg: f64,
    sorted: Vec<Projected>,
    /// `rank[i]` is the position of turbine `i` in `sorted`.
    rank: Vec<Option<usize>>,
}

impl ProjectedLayout {
    /// Projects `turbines` for wind blowing along `direction_deg`.
    ///
    /// Unavailable and untyped turbines are left out: they cast no wake and
    /// receive no deficit.
    pub fn new(turbines: &[Turbine], frame: &LocalFrame, direction_deg: f64) -> Self {
        let mut sorted: Vec<Projected> = turbines
            .iter()
            .enumerate()
            .filter(|(_, t)| t.active_type().is_some())
            .map(|(index, t)| {
                let (east, north) = frame.to_local(t.lat, t.long);
                let (x, y) = rotate(east, north, -direction_deg);
                Projected { index, x, y }
            })
            .collect();
        sorted.sort_by(|a, b| a.x.total_cmp(&b.x));

        let mut rank = vec![None; turbines.len()];
        for (position, p) in sorted.iter().enumerate() {
            rank[p.index] = Some(position);
        }

        trace!(direction_deg, turbines = sorted.len(), "projected layout");
        Self {
            direction_deg,
            sorted,
            rank,
        }
    }

    pub fn direction_deg(&self) -> f64 {
        self.direction_deg
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Downwind and crosswind coordinates of turbine `index`, if it takes part.
    pub fn position(&self, index: usize) -> Option<(f64, f64)> {
        let rank = (*self.rank.get(index)?)?;
        let p = self.sorted[rank];
        Some((p.x, p.y))
    }

    /// Turbine indices in upwind-to-downwind order.
    pub fn upwind_order(&self) -> impl Iterator<Item = usize> + '_ {
        self.sorted.iter().map(|p| p.index)
    }

    /// Combined wake deficit at turbine `target`.
    ///
    /// `turbines` must be the slice the layout was built from. `wind_speed`
    /// (m/s) selects the upstream thrust coefficients, `k` is the wake-decay
    /// constant of the target's ground area and `max_wake_distance` is the
    /// cutoff in upstream rotor radii. Returns 0 for turbines outside the
    /// layout.
    pub fn total_deficit(
        &self,
        turbines: &[Turbine],
        target: usize,
        wind_speed: f64,
        k: f64,
        max_wake_distance: f64,
    ) -> f64 {
        let Some(Some(rank)) = self.rank.get(target).copied() else {
            return 0.0;
        };
        let Some(target_type) = turbines[target].active_type() else {
            return 0.0;
        };
        let here = self.sorted[rank];
        let target_radius = target_type.rotor_radius_m();

        let contributions = self.sorted[..rank].iter().filter_map(|up| {
            let dx = here.x - up.x;
            let upstream = turbines[up.index].active_type()?;
            let r = upstream.rotor_radius_m();
            if dx <= 0.0 || dx > max_wake_distance * r {
                return None;
            }
            let ct = upstream.thrust_at(wind_speed);
            let deficit = centerline_deficit(ct, k, dx, r);
            let overlap = overlap_ratio(wake_radius(r, k, dx), target_radius, here.y - up.y);
            (overlap > 0.0).then_some(deficit * overlap)
        });

        combine_rss(contributions)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::model::{Curve, TurbineType};
    use crate::physics::geo::METERS_PER_DEG_LAT;

    fn kind() -> TurbineType {
        TurbineType {
            name: "T100".into(),
            rated_power_kw: 2000.0,
            rotor_diameter_m: 100.0,
            hub_height_m: 100.0,
            yaw_control: true,
            cut_in_ms: 3.0,
            cut_out_ms: 25.0,
            power_curve: Curve::new(vec![(3.0, 0.0), (12.0, 2000.0)]).expect("non-empty curve"),
            thrust_curve: None,
        }
    }

    /// A column of turbines spaced `spacing` metres south to north.
    fn column(n: usize, spacing: f64) -> Vec<Turbine> {
        (0..n)
            .map(|i| {
                let lat = 54.0 + i as f64 * spacing / METERS_PER_DEG_LAT;
                Turbine::new(format!("t{i}"), format!("T{i}"), lat, 9.0, Some(kind()))
            })
            .collect()
    }

    #[test]
    fn amplitude_bounds() {
        assert_eq!(deficit_amplitude(0.0), 0.0);
        assert_relative_eq!(deficit_amplitude(1.0), 0.5);
        assert_relative_eq!(deficit_amplitude(0.75), 0.25, max_relative = 1e-12);
    }

    #[test]
    fn deficit_non_increasing_with_distance() {
        let mut previous = f64::INFINITY;
        for step in 0..50 {
            let d = centerline_deficit(0.8, 0.08, step as f64 * 50.0, 50.0);
            assert!(d <= previous);
            previous = d;
        }
    }

    #[test]
    fn overlap_edge_cases() {
        assert_relative_eq!(circle_overlap_area(40.0, 40.0, 0.0), PI * 1600.0, max_relative = 1e-12);
        assert_eq!(circle_overlap_area(40.0, 30.0, 70.0), 0.0);
        assert_eq!(circle_overlap_area(40.0, 30.0, 500.0), 0.0);
        // contained
        assert_relative_eq!(circle_overlap_area(100.0, 30.0, 50.0), PI * 900.0, max_relative = 1e-12);
        let partial = circle_overlap_area(40.0, 40.0, 40.0);
        assert!(partial > 0.0 && partial < PI * 1600.0);
        assert_eq!(overlap_ratio(10.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn overlap_shrinks_with_lateral_offset() {
        let centred = overlap_ratio(60.0, 50.0, 0.0);
        let offset = overlap_ratio(60.0, 50.0, 40.0);
        let far = overlap_ratio(60.0, 50.0, 200.0);
        assert_relative_eq!(centred, 1.0);
        assert!(offset < centred && offset > far);
        assert_eq!(far, 0.0);
    }

    #[test]
    fn rss_is_clamped() {
        assert_eq!(combine_rss(std::iter::empty()), 0.0);
        assert_relative_eq!(combine_rss([0.3, 0.4]), 0.5, max_relative = 1e-12);
        assert_eq!(combine_rss([0.9, 0.9, 0.9]), MAX_TOTAL_DEFICIT);
    }

    #[test]
    fn layout_orders_upwind_first() {
        let turbines = column(3, 500.0);
        let frame = LocalFrame::centred_on(turbines.iter().map(|t| (t.lat, t.long)))
            .expect("turbines present");
        // rotating by -90 maps north onto -X
        let layout = ProjectedLayout::new(&turbines, &frame, 90.0);
        assert_eq!(layout.upwind_order().collect::<Vec<_>>(), vec![2, 1, 0]);
        let (x0, y0) = layout.position(0).expect("in layout");
        assert!(x0 > 0.0);
        assert!(y0.abs() < 1e-6);
    }

    #[test]
    fn downstream_turbine_sees_deficit() {
        let turbines = column(2, 500.0);
        let frame = LocalFrame::centred_on(turbines.iter().map(|t| (t.lat, t.long)))
            .expect("turbines present");
        let layout = ProjectedLayout::new(&turbines, &frame, 90.0);

        let upstream = layout.total_deficit(&turbines, 1, 8.0, 0.08, 20.0);
        let downstream = layout.total_deficit(&turbines, 0, 8.0, 0.08, 20.0);
        assert_eq!(upstream, 0.0);
        // full overlap: a = 0.5 (1 - sqrt 0.2), factor (1 + 0.08 * 10)^2
        let expected = 0.5 * (1.0 - 0.2f64.sqrt()) / 1.8f64.powi(2);
        assert_relative_eq!(downstream, expected, max_relative = 1e-6);
    }

    #[test]
    fn wake_cutoff_and_unavailable_upstream() {
        let mut turbines = column(2, 500.0);
        let frame = LocalFrame::centred_on(turbines.iter().map(|t| (t.lat, t.long)))
            .expect("turbines present");
        let layout = ProjectedLayout::new(&turbines, &frame, 90.0);
        // 500 m is 10 radii
        assert_eq!(layout.total_deficit(&turbines, 0, 8.0, 0.08, 5.0), 0.0);

        turbines[1].available = false;
        let layout = ProjectedLayout::new(&turbines, &frame, 90.0);
        assert_eq!(layout.len(), 1);
        assert_eq!(layout.position(1), None);
        assert_eq!(layout.total_deficit(&turbines, 0, 8.0, 0.08, 20.0), 0.0);
        assert_eq!(layout.total_deficit(&turbines, 1, 8.0, 0.08, 20.0), 0.0);
    }

    #[test]
    fn crosswind_neighbour_casts_no_wake() {
        let turbines = column(2, 500.0);
        let frame = LocalFrame::centred_on(turbines.iter().map(|t| (t.lat, t.long)))
            .expect("turbines present");
        // wind along the east axis leaves a south-north pair side by side
        let layout = ProjectedLayout::new(&turbines, &frame, 0.0);
        assert_eq!(layout.total_deficit(&turbines, 0, 8.0, 0.08, 20.0), 0.0);
        assert_eq!(layout.total_deficit(&turbines, 1, 8.0, 0.08, 20.0), 0.0);
    }
}

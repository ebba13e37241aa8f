//! Piecewise-linear curves for power and thrust-coefficient lookups.
//!
//! Samples are sorted by their first coordinate once, when the curve is
//! built, so lookups never re-sort.

use crate::error::EngineError;

/// Thrust coefficient assumed when a turbine type carries no thrust curve.
pub const DEFAULT_THRUST_COEFFICIENT: f64 = 0.8;

/// A non-empty, sorted set of `(x, y)` samples with clamped linear interpolation.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    points: Vec<(f64, f64)>,
}

impl Curve {
    /// Builds a curve from unsorted samples.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptyCurve`] if `points` is empty.
    pub fn new(mut points: Vec<(f64, f64)>) -> Result<Self, EngineError> {
        if points.is_empty() {
            return Err(EngineError::EmptyCurve);
        }
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(Self { points })
    }

    /// Samples in ascending `x` order.
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Interpolated value at `x`, clamped to the end samples outside the range.
    pub fn value_at(&self, x: f64) -> f64 {
        interpolate_sorted(x, &self.points)
    }
}

/// Interpolates `points` at `x`.
///
/// The samples need not be sorted. Below the smallest `x` the first sample's
/// value is returned, above the largest the last one's; a single sample
/// yields a constant.
///
/// # Errors
///
/// Returns [`EngineError::EmptyCurve`] if `points` is empty.
pub fn interpolate(x: f64, points: &[(f64, f64)]) -> Result<f64, EngineError> {
    Curve::new(points.to_vec()).map(|curve| curve.value_at(x))
}

/// Interpolation over samples already sorted by `x`. `points` must be non-empty.
fn interpolate_sorted(x: f64, points: &[(f64, f64)]) -> f64 {
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return 0.0,
    };
    if x <= first.0 {
        return first.1;
    }
    if x >= last.0 {
        return last.1;
    }

    for pair in points.windows(2) {
        let (x1, y1) = pair[0];
        let (x2, y2) = pair[1];
        if x >= x1 && x <= x2 {
            let span = x2 - x1;
            if span == 0.0 {
                return y1;
            }
            return y1 + (x - x1) / span * (y2 - y1);
        }
    }

    last.1
}

/// Thrust coefficient at `wind_speed`, clamped to `[0, 1]`.
///
/// Falls back to [`DEFAULT_THRUST_COEFFICIENT`] when no curve is supplied.
pub fn thrust_coefficient(wind_speed: f64, curve: Option<&Curve>) -> f64 {
    curve.map_or(DEFAULT_THRUST_COEFFICIENT, |c| {
        c.value_at(wind_speed).clamp(0.0, 1.0)
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn power_curve() -> Curve {
        // deliberately unsorted
        Curve::new(vec![(12.0, 1100.0), (4.0, 100.0), (10.0, 900.0), (25.0, 1100.0)])
            .expect("non-empty curve")
    }

    #[test]
    fn empty_curve_is_rejected() {
        assert_eq!(Curve::new(Vec::new()), Err(EngineError::EmptyCurve));
        assert_eq!(interpolate(3.0, &[]), Err(EngineError::EmptyCurve));
    }

    #[test]
    fn sample_points_return_their_value() {
        let curve = power_curve();
        for &(x, y) in curve.points() {
            assert_eq!(curve.value_at(x), y);
        }
    }

    #[test]
    fn midpoint_is_linear() {
        assert_relative_eq!(power_curve().value_at(11.0), 1000.0);
        assert_relative_eq!(power_curve().value_at(7.0), 500.0);
    }

    #[test]
    fn clamps_outside_range() {
        let curve = power_curve();
        assert_eq!(curve.value_at(0.0), 100.0);
        assert_eq!(curve.value_at(40.0), 1100.0);
    }

    #[test]
    fn single_sample_is_constant() {
        for x in [0.0, 10.0, 99.0] {
            assert_eq!(interpolate(x, &[(10.0, 1000.0)]), Ok(1000.0));
        }
    }

    #[test]
    fn monotonic_samples_give_monotonic_values() {
        let curve = power_curve();
        let mut prev = f64::NEG_INFINITY;
        for i in 0..300 {
            let v = curve.value_at(f64::from(i) * 0.1);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn thrust_defaults_and_clamps() {
        assert_eq!(thrust_coefficient(8.0, None), DEFAULT_THRUST_COEFFICIENT);
        let wild = Curve::new(vec![(0.0, -0.5), (10.0, 1.5)]).ok();
        assert_eq!(thrust_coefficient(0.0, wild.as_ref()), 0.0);
        assert_eq!(thrust_coefficient(10.0, wild.as_ref()), 1.0);
        assert_relative_eq!(thrust_coefficient(5.0, wild.as_ref()), 0.5);
    }
}

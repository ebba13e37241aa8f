//! Yield figures derived from a completed engine run.

use std::fmt;

use serde::Serialize;

use crate::engine::FleetResult;

/// Hours in a (non-leap) year.
pub const HOURS_PER_YEAR: f64 = 8760.0;

/// Relative wake loss in percent; 0 when there is no undisturbed output.
pub fn wake_loss_pct(without_wake_kw: f64, with_wake_kw: f64) -> f64 {
    if without_wake_kw > 0.0 {
        (without_wake_kw - with_wake_kw) / without_wake_kw * 100.0
    } else {
        0.0
    }
}

/// Annual energy (MWh) of a mean power (kW).
pub fn annual_energy_mwh(mean_kw: f64) -> f64 {
    mean_kw * HOURS_PER_YEAR / 1000.0
}

/// Per-turbine yield.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurbineYield {
    pub id: String,
    pub name: String,
    pub available: bool,
    /// Mean power without wake (kW).
    pub power_without_wake_kw: f64,
    /// Mean power with wake (kW).
    pub power_with_wake_kw: f64,
    pub wake_loss_pct: f64,
    /// Annual energy including wake losses (MWh).
    pub annual_energy_mwh: f64,
}

/// Fleet-level yield report.
///
/// Computed post-hoc from a [`FleetResult`] so that reported totals always
/// agree with the per-turbine fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YieldReport {
    pub turbines: Vec<TurbineYield>,
    /// Fleet mean power without wake (kW).
    pub total_without_wake_kw: f64,
    /// Fleet mean power with wake (kW).
    pub total_with_wake_kw: f64,
    pub wake_loss_pct: f64,
    pub annual_energy_without_wake_mwh: f64,
    pub annual_energy_with_wake_mwh: f64,
    /// Number of turbines that were evaluated with zero power after a failure.
    pub failed_turbines: usize,
}

impl YieldReport {
    pub fn from_fleet(fleet: &FleetResult) -> Self {
        let turbines = fleet
            .turbines
            .iter()
            .map(|t| {
                let without = t.power_without_wake.unwrap_or(0.0);
                let with = t.power_with_wake.unwrap_or(0.0);
                TurbineYield {
                    id: t.id.clone(),
                    name: t.name.clone(),
                    available: t.available,
                    power_without_wake_kw: without,
                    power_with_wake_kw: with,
                    wake_loss_pct: wake_loss_pct(without, with),
                    annual_energy_mwh: annual_energy_mwh(with),
                }
            })
            .collect();

        let mut failed: Vec<&str> = fleet
            .failures
            .iter()
            .map(|f| f.turbine_id.as_str())
            .collect();
        failed.sort_unstable();
        failed.dedup();

        Self {
            turbines,
            total_without_wake_kw: fleet.total_without_wake_kw,
            total_with_wake_kw: fleet.total_with_wake_kw,
            wake_loss_pct: wake_loss_pct(fleet.total_without_wake_kw, fleet.total_with_wake_kw),
            annual_energy_without_wake_mwh: annual_energy_mwh(fleet.total_without_wake_kw),
            annual_energy_with_wake_mwh: annual_energy_mwh(fleet.total_with_wake_kw),
            failed_turbines: failed.len(),
        }
    }
}

impl fmt::Display for YieldReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Yield Report ---")?;
        writeln!(
            f,
            "{:<16} {:>12} {:>12} {:>8} {:>12}",
            "turbine", "no wake kW", "wake kW", "loss %", "MWh/yr"
        )?;
        for t in &self.turbines {
            let name = if t.available {
                t.name.clone()
            } else {
                format!("{} (off)", t.name)
            };
            writeln!(
                f,
                "{:<16} {:>12.1} {:>12.1} {:>8.2} {:>12.1}",
                name, t.power_without_wake_kw, t.power_with_wake_kw, t.wake_loss_pct, t.annual_energy_mwh
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Fleet without wake:    {:.1} kW", self.total_without_wake_kw)?;
        writeln!(f, "Fleet with wake:       {:.1} kW", self.total_with_wake_kw)?;
        writeln!(f, "Wake loss:             {:.2}%", self.wake_loss_pct)?;
        writeln!(
            f,
            "Annual energy:         {:.1} MWh ({:.1} MWh without wake)",
            self.annual_energy_with_wake_mwh, self.annual_energy_without_wake_mwh
        )?;
        write!(f, "Failed turbines:       {}", self.failed_turbines)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::error::{EngineError, TurbineFailure};
    use crate::model::Turbine;

    fn turbine(id: &str, without: f64, with: f64) -> Turbine {
        let mut t = Turbine::new(id, id.to_uppercase(), 54.0, 9.0, None);
        t.power_without_wake = Some(without);
        t.power_with_wake = Some(with);
        t
    }

    fn fleet() -> FleetResult {
        let mut off = turbine("c", 0.0, 0.0);
        off.available = false;
        FleetResult {
            turbines: vec![turbine("a", 1000.0, 1000.0), turbine("b", 1000.0, 800.0), off],
            total_without_wake_kw: 2000.0,
            total_with_wake_kw: 1800.0,
            failures: Vec::new(),
        }
    }

    #[test]
    fn loss_percentages() {
        let report = YieldReport::from_fleet(&fleet());
        assert_relative_eq!(report.wake_loss_pct, 10.0, max_relative = 1e-12);
        assert_relative_eq!(report.turbines[1].wake_loss_pct, 20.0, max_relative = 1e-12);
        assert_eq!(report.turbines[0].wake_loss_pct, 0.0);
        // no undisturbed output
        assert_eq!(report.turbines[2].wake_loss_pct, 0.0);
    }

    #[test]
    fn annual_energy_conversion() {
        assert_relative_eq!(annual_energy_mwh(1000.0), 8760.0);
        let report = YieldReport::from_fleet(&fleet());
        assert_relative_eq!(report.annual_energy_with_wake_mwh, 1800.0 * 8.76, max_relative = 1e-12);
    }

    #[test]
    fn failures_counted_once_per_turbine() {
        let mut f = fleet();
        let failure = TurbineFailure {
            turbine_id: "b".into(),
            error: EngineError::MissingTurbineType("B".into()),
        };
        f.failures = vec![failure.clone(), failure];
        assert_eq!(YieldReport::from_fleet(&f).failed_turbines, 1);
    }

    #[test]
    fn display_lists_every_turbine() {
        let text = YieldReport::from_fleet(&fleet()).to_string();
        assert!(text.contains("Yield Report"));
        assert!(text.contains("C (off)"));
        assert!(text.contains("Wake loss:             10.00%"));
    }
}

//! Yield engine: aggregates windrose statistics into mean turbine power.
//!
//! Two passes share one immutable input snapshot. The no-wake pass only
//! extrapolates each bin's baseline speed to hub height; the with-wake pass
//! additionally reduces it by the combined deficit of upstream turbines.
//! Both passes parallelise over turbines and can run concurrently through
//! [`YieldEngine::compute_both`].

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, TurbineFailure};
use crate::model::{GroundAreas, Mast, Turbine, Windrose};
use crate::physics::geo::LocalFrame;
use crate::physics::wake::ProjectedLayout;
use crate::physics::windrose_interp::{check_mast_distances, interpolate_windroses, validate_masts};
use crate::units::to_ms;

/// Where each turbine's wind statistics come from.
#[derive(Debug, Clone, PartialEq)]
pub enum WindroseSource {
    /// One windrose for the whole site.
    Shared(Windrose),
    /// Met masts, interpolated to every turbine position and hub height.
    Masts(Vec<Mast>),
}

impl WindroseSource {
    /// The windrose whose direction sectors every effective windrose shares.
    fn reference(&self) -> Result<&Windrose, EngineError> {
        match self {
            Self::Shared(windrose) => Ok(windrose),
            Self::Masts(masts) => masts
                .iter()
                .find_map(Mast::usable_windrose)
                .ok_or(EngineError::NoMastData),
        }
    }

    fn validate(&self, turbines: &[Turbine]) -> Result<(), EngineError> {
        match self {
            Self::Shared(windrose) => windrose.validate(),
            Self::Masts(masts) => {
                validate_masts(masts)?;
                check_mast_distances(turbines, masts)
            }
        }
    }
}

/// Cooperative cancellation shared between a running pass and its owner.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Progress callback receiving `(completed_turbines, total_turbines)`.
pub type ProgressFn = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Cancellation, time budget and progress reporting for a run.
#[derive(Clone, Default)]
pub struct RunControl {
    cancel: CancelFlag,
    budget: Option<Duration>,
    progress: Option<ProgressFn>,
}

impl fmt::Debug for RunControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunControl")
            .field("cancelled", &self.cancel.is_cancelled())
            .field("budget", &self.budget)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = flag;
        self
    }

    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    /// Fails once the run is cancelled or past its budget.
    fn checkpoint(&self, started: Instant) -> Result<(), EngineError> {
        if self.cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        match self.budget {
            Some(budget) if started.elapsed() > budget => Err(EngineError::BudgetExceeded {
                budget_secs: budget.as_secs_f64(),
            }),
            _ => Ok(()),
        }
    }

    fn report(&self, completed: usize, total: usize) {
        if let Some(progress) = &self.progress {
            progress(completed, total);
        }
    }
}

/// Outcome of one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PassResult {
    /// Copy of the input turbines with this pass's power field set (kW).
    pub turbines: Vec<Turbine>,
    /// Sum over available turbines (kW).
    pub total_kw: f64,
    /// Turbines evaluated with zero power because their calculation failed.
    pub failures: Vec<TurbineFailure>,
}

/// Both passes merged into one turbine list.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetResult {
    /// Input turbines with both power fields set.
    pub turbines: Vec<Turbine>,
    pub total_without_wake_kw: f64,
    pub total_with_wake_kw: f64,
    /// Failures of either pass, no-wake pass first.
    pub failures: Vec<TurbineFailure>,
}

/// Per-direction wake geometry for the with-wake pass.
struct WakeField {
    layouts: Vec<ProjectedLayout>,
    max_wake_distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    WithoutWake,
    WithWake,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WithoutWake => f.write_str("without wake"),
            Self::WithWake => f.write_str("with wake"),
        }
    }
}

/// The yield engine.
///
/// Holds the configuration and run control; inputs are passed to every
/// call and never mutated.
#[derive(Debug, Clone, Default)]
pub struct YieldEngine {
    config: EngineConfig,
    control: RunControl,
}

impl YieldEngine {
    /// Creates an engine; the run budget is taken from the configuration.
    pub fn new(config: EngineConfig) -> Self {
        let mut control = RunControl::new();
        if let Some(secs) = config.aggregation.time_budget_secs {
            control = control.with_budget(Duration::from_secs_f64(secs));
        }
        Self { config, control }
    }

    /// Replaces the run control.
    ///
    /// A control without a budget keeps the one taken from the configuration.
    pub fn with_control(mut self, control: RunControl) -> Self {
        let budget = control.budget.or(self.control.budget);
        self.control = RunControl { budget, ..control };
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn control(&self) -> &RunControl {
        &self.control
    }

    /// Mean power of every turbine without wake interaction.
    ///
    /// # Errors
    ///
    /// Fails without partial results on an empty turbine list, an invalid
    /// windrose source, cancellation or an exhausted time budget.
    pub fn compute_without_wake(
        &self,
        turbines: &[Turbine],
        source: &WindroseSource,
        ground: &GroundAreas,
    ) -> Result<PassResult, EngineError> {
        self.run_pass(Pass::WithoutWake, turbines, source, ground, None)
    }

    /// Mean power of every turbine including wake losses.
    ///
    /// `max_wake_distance` is the wake cutoff in upstream rotor radii.
    ///
    /// # Errors
    ///
    /// Same conditions as [`YieldEngine::compute_without_wake`], plus
    /// [`EngineError::InvalidWakeDistance`] unless `max_wake_distance` is
    /// finite and positive.
    pub fn compute_with_wake(
        &self,
        turbines: &[Turbine],
        source: &WindroseSource,
        ground: &GroundAreas,
        max_wake_distance: f64,
    ) -> Result<PassResult, EngineError> {
        if turbines.is_empty() {
            return Err(EngineError::EmptyTurbines);
        }
        if !(max_wake_distance.is_finite() && max_wake_distance > 0.0) {
            return Err(EngineError::InvalidWakeDistance(max_wake_distance));
        }
        let reference = source.reference()?;
        let frame = LocalFrame::centred_on(turbines.iter().map(|t| (t.lat, t.long)))
            .ok_or(EngineError::EmptyTurbines)?;
        let layouts: Vec<ProjectedLayout> = reference
            .entries
            .par_iter()
            .map(|entry| ProjectedLayout::new(turbines, &frame, entry.mid_angle()))
            .collect();
        debug!(directions = layouts.len(), "projected layouts ready");

        let field = WakeField {
            layouts,
            max_wake_distance,
        };
        self.run_pass(Pass::WithWake, turbines, source, ground, Some(&field))
    }

    /// Runs both passes concurrently and merges their results.
    ///
    /// The wake cutoff comes from the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first pass error; no partial results are committed.
    pub fn compute_both(
        &self,
        turbines: &[Turbine],
        source: &WindroseSource,
        ground: &GroundAreas,
    ) -> Result<FleetResult, EngineError> {
        let max_wake_distance = self.config.wake.max_wake_distance;
        let (without, with) = rayon::join(
            || self.compute_without_wake(turbines, source, ground),
            || self.compute_with_wake(turbines, source, ground, max_wake_distance),
        );
        let (without, with) = (without?, with?);

        let merged = without
            .turbines
            .into_iter()
            .zip(with.turbines)
            .map(|(mut t, w)| {
                t.power_with_wake = w.power_with_wake;
                t
            })
            .collect();
        let mut failures = without.failures;
        failures.extend(with.failures);

        Ok(FleetResult {
            turbines: merged,
            total_without_wake_kw: without.total_kw,
            total_with_wake_kw: with.total_kw,
            failures,
        })
    }

    fn run_pass(
        &self,
        pass: Pass,
        turbines: &[Turbine],
        source: &WindroseSource,
        ground: &GroundAreas,
        wake: Option<&WakeField>,
    ) -> Result<PassResult, EngineError> {
        if turbines.is_empty() {
            return Err(EngineError::EmptyTurbines);
        }
        source.validate(turbines)?;

        let started = Instant::now();
        let total = turbines.len();
        let completed = AtomicUsize::new(0);
        info!(%pass, turbines = total, "pass started");

        let outcomes = (0..total)
            .into_par_iter()
            .map(|index| {
                let outcome = self.turbine_power(index, turbines, source, ground, wake, started);
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                self.control.report(done, total);
                outcome
            })
            .collect::<Vec<Result<f64, EngineError>>>();

        let mut result_turbines = turbines.to_vec();
        let mut failures = Vec::new();
        let mut total_kw = 0.0;

        for (turbine, outcome) in result_turbines.iter_mut().zip(outcomes) {
            let power = match outcome {
                Ok(power) => power,
                Err(error) if error.aborts_pass() => {
                    warn!(%pass, turbine = %turbine.name, %error, "pass aborted");
                    return Err(error);
                }
                Err(error) => {
                    warn!(%pass, turbine = %turbine.name, %error, "turbine evaluated with zero power");
                    failures.push(TurbineFailure {
                        turbine_id: turbine.id.clone(),
                        error,
                    });
                    0.0
                }
            };
            debug!(%pass, turbine = %turbine.name, power_kw = power, "turbine done");

            match pass {
                Pass::WithoutWake => turbine.power_without_wake = Some(power),
                Pass::WithWake => turbine.power_with_wake = Some(power),
            }
            if turbine.available {
                total_kw += power;
            }
        }

        info!(
            %pass,
            total_kw,
            failures = failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pass finished"
        );
        Ok(PassResult {
            turbines: result_turbines,
            total_kw,
            failures,
        })
    }

    /// Mean power (kW) of turbine `index` for one pass.
    fn turbine_power(
        &self,
        index: usize,
        turbines: &[Turbine],
        source: &WindroseSource,
        ground: &GroundAreas,
        wake: Option<&WakeField>,
        started: Instant,
    ) -> Result<f64, EngineError> {
        let turbine = &turbines[index];
        if !turbine.available {
            return Ok(0.0);
        }
        let Some(kind) = turbine.turbine_type.as_ref() else {
            return Err(EngineError::MissingTurbineType(turbine.name.clone()));
        };
        self.control.checkpoint(started)?;

        let z0 = ground.roughness_for(turbine);
        let k = ground.wake_decay_for(turbine);
        let law = self.config.profile.law();
        let extension = self.config.aggregation.open_bin_extension;

        let windrose: Cow<'_, Windrose> = match source {
            WindroseSource::Shared(windrose) => Cow::Borrowed(windrose),
            WindroseSource::Masts(masts) => {
                Cow::Owned(interpolate_windroses(turbine, kind.hub_height_m, z0, masts)?)
            }
        };

        let mut power = 0.0;
        for (direction, entry) in windrose.entries.iter().enumerate() {
            self.control.checkpoint(started)?;
            let layout = wake.and_then(|w| w.layouts.get(direction).map(|l| (l, w.max_wake_distance)));

            for (bin, &frequency) in windrose.speed_bins.iter().zip(&entry.frequencies) {
                if frequency <= 0.0 {
                    continue;
                }
                let base = to_ms(bin.aggregation_center(extension), windrose.speed_unit);
                if base <= 0.0 {
                    continue;
                }
                let at_hub =
                    law.extrapolate(base, kind.hub_height_m, windrose.measurement_height_m, z0)?;
                let deficit = layout.map_or(0.0, |(layout, max_wake_distance)| {
                    layout.total_deficit(turbines, index, base, k, max_wake_distance)
                });
                power += kind.power_at(at_hub * (1.0 - deficit)) * frequency / 100.0;
            }
        }

        Ok(power * (1.0 - windrose.calm_frequency / 100.0))
    }
}

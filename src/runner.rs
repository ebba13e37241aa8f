//! One-call computation of a project document, shared by the binary and the API.

use tracing::info;

use crate::config::EngineConfig;
use crate::engine::{FleetResult, YieldEngine};
use crate::model::ground::assign_ground_areas;
use crate::project::{ProjectDocument, ProjectError};
use crate::report::YieldReport;

pub struct ProjectRun {
    pub fleet: FleetResult,
    pub report: YieldReport,
}

/// Resolves `doc`, optionally assigns ground areas, and runs both passes.
///
/// # Errors
///
/// Returns [`ProjectError`] for unusable documents and wraps aborting
/// engine errors in [`ProjectError::Engine`].
pub fn run_project(
    doc: &ProjectDocument,
    config: &EngineConfig,
    assign_areas: bool,
) -> Result<ProjectRun, ProjectError> {
    let mut inputs = doc.to_inputs(config.ground.defaults())?;
    if assign_areas {
        assign_ground_areas(&mut inputs.turbines, &inputs.ground);
    }
    info!(
        turbines = inputs.turbines.len(),
        ground_areas = inputs.ground.areas().len(),
        "project loaded"
    );

    let engine = YieldEngine::new(config.clone());
    let fleet = engine.compute_both(&inputs.turbines, &inputs.source, &inputs.ground)?;
    let report = YieldReport::from_fleet(&fleet);
    info!(
        without_wake_kw = report.total_without_wake_kw,
        with_wake_kw = report.total_with_wake_kw,
        wake_loss_pct = report.wake_loss_pct,
        "fleet computed"
    );
    Ok(ProjectRun { fleet, report })
}

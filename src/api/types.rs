//! API response and query types.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::report::YieldReport;

/// Fleet totals together with the configuration that produced them.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub config: EngineConfig,
    pub turbine_count: usize,
    pub available_turbines: usize,
    pub total_without_wake_kw: f64,
    pub total_with_wake_kw: f64,
    pub wake_loss_pct: f64,
    pub annual_energy_without_wake_mwh: f64,
    pub annual_energy_with_wake_mwh: f64,
    pub failed_turbines: usize,
}

impl SummaryResponse {
    pub fn new(config: &EngineConfig, report: &YieldReport) -> Self {
        Self {
            config: config.clone(),
            turbine_count: report.turbines.len(),
            available_turbines: report.turbines.iter().filter(|t| t.available).count(),
            total_without_wake_kw: report.total_without_wake_kw,
            total_with_wake_kw: report.total_with_wake_kw,
            wake_loss_pct: report.wake_loss_pct,
            annual_energy_without_wake_mwh: report.annual_energy_without_wake_mwh,
            annual_energy_with_wake_mwh: report.annual_energy_with_wake_mwh,
            failed_turbines: report.failed_turbines,
        }
    }
}

/// Optional wake-loss range for the turbines endpoint (percent, inclusive).
#[derive(Debug, Deserialize)]
pub struct TurbineQuery {
    pub min_loss_pct: Option<f64>,
    pub max_loss_pct: Option<f64>,
}

/// Options for the compute endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ComputeQuery {
    /// Assign turbines to ground areas by position before computing.
    #[serde(default)]
    pub assign_ground_areas: bool,
}

/// Error response body for 4xx/5xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

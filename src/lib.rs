//! Annual energy yield of a wind farm with and without wake losses.

#[cfg(feature = "api")]
pub mod api;
pub mod cli;
pub mod config;
pub mod demo;
pub mod engine;
pub mod error;
pub mod io;
/// Turbines, masts, windroses, curves, and ground areas.
pub mod model;
/// Wind profiles, geodesy, wake deficits, and windrose interpolation.
pub mod physics;
pub mod project;
pub mod report;
pub mod runner;
pub mod units;

pub use config::EngineConfig;
pub use engine::{FleetResult, PassResult, RunControl, WindroseSource, YieldEngine};
pub use error::EngineError;
pub use report::YieldReport;

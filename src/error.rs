//! Error taxonomy for the yield engine.

use thiserror::Error;

/// Broad classification of an [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed inputs; the calculation is aborted.
    Input,
    /// Degenerate math that input validation should have prevented.
    Domain,
    /// A wind-speed unit label that is not part of the closed unit set.
    Unit,
    /// The run was cancelled or exceeded its time budget.
    Aborted,
}

/// Errors raised by the yield engine and its numerical building blocks.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    #[error("no turbines to evaluate")]
    EmptyTurbines,

    #[error("invalid windrose: {reason}")]
    InvalidWindrose { reason: String },

    #[error("no available mast carries a windrose")]
    NoMastData,

    #[error("mast \"{mast}\" is incompatible with the reference mast: {reason}")]
    IncompatibleMast { mast: String, reason: String },

    #[error("max wake distance must be a finite number of rotor radii > 0, got {0}")]
    InvalidWakeDistance(f64),

    #[error("curve has no samples")]
    EmptyCurve,

    #[error("turbine \"{0}\" has no turbine type")]
    MissingTurbineType(String),

    #[error("domain error: {0}")]
    Domain(String),

    #[error("mast \"{mast}\" sits exactly at turbine \"{turbine}\"")]
    MastAtTurbine { mast: String, turbine: String },

    #[error("unrecognized speed unit \"{0}\"")]
    UnrecognizedUnit(String),

    #[error("calculation cancelled")]
    Cancelled,

    #[error("calculation exceeded its time budget of {budget_secs} s")]
    BudgetExceeded { budget_secs: f64 },
}

impl EngineError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyTurbines
            | Self::InvalidWindrose { .. }
            | Self::NoMastData
            | Self::IncompatibleMast { .. }
            | Self::InvalidWakeDistance(_)
            | Self::EmptyCurve
            | Self::MissingTurbineType(_) => ErrorKind::Input,
            Self::Domain(_) | Self::MastAtTurbine { .. } => ErrorKind::Domain,
            Self::UnrecognizedUnit(_) => ErrorKind::Unit,
            Self::Cancelled | Self::BudgetExceeded { .. } => ErrorKind::Aborted,
        }
    }

    /// Returns `true` when a failure on one turbine must abort the whole pass.
    ///
    /// A missing turbine type only affects that turbine.
    pub fn aborts_pass(&self) -> bool {
        match self {
            Self::MissingTurbineType(_) => false,
            _ => matches!(self.kind(), ErrorKind::Input | ErrorKind::Aborted),
        }
    }
}

/// A turbine that was evaluated with zero power because its calculation failed.
#[derive(Debug, Clone, PartialEq)]
pub struct TurbineFailure {
    /// Turbine identifier.
    pub turbine_id: String,
    /// What went wrong.
    pub error: EngineError,
}

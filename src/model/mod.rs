//! Input entities the engine reads and the result fields it writes.

/// Piecewise-linear power and thrust curves.
pub mod curve;
pub mod ground;
pub mod mast;
pub mod turbine;
/// Windrose distributions and speed bins.
pub mod windrose;

// Re-export the main types for convenience
pub use curve::Curve;
pub use ground::{GroundArea, GroundAreas, GroundDefaults};
pub use mast::Mast;
pub use turbine::{Turbine, TurbineType};
pub use windrose::{SpeedBin, Windrose, WindroseEntry};

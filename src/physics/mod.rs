//! Numerical building blocks: geodesy, wind profiles, windrose interpolation and wakes.

pub mod geo;
pub mod profile;
pub mod wake;
pub mod windrose_interp;

pub use profile::ProfileLaw;
pub use wake::{MAX_TOTAL_DEFICIT, ProjectedLayout};
pub use windrose_interp::interpolate_windroses;

//! Trajectory control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for trajectory control
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    
    /// RAMSETE convergence gain, must be positive.
    ///
    /// Units: radians^2/meters^2
    pub b: f64,

    /// RAMSETE damping, must be in (0, 1).
    ///
    /// Units: 1/radians
    pub zeta: f64,

    /// Position error within which the controller is at the reference.
    ///
    /// Units: meters
    pub tolerance_m: f64,

    /// Heading error within which the controller is at the reference.
    ///
    /// Units: radians
    pub tolerance_rad: f64
}

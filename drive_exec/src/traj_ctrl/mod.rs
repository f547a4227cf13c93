//! # Trajectory control module
//!
//! Trajectory control keeps the platform on a precomputed, time-indexed
//! trajectory. Each cycle the trajectory is sampled at the elapsed time of the
//! run, the RAMSETE law compares the sample to the current pose and produces a
//! corrected chassis speed, which is converted to wheel speeds and finally to
//! drive voltages by LocoCtrl.
//!
//! The RAMSETE law takes two gains: `b`, which sets how aggressively position
//! error is corrected, and `zeta`, which damps the correction. Both are loaded
//! from `traj_ctrl.toml`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod params;
pub mod ramsete;
pub mod state;
pub mod trajectory;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::Params;
pub use ramsete::*;
pub use state::*;
pub use trajectory::*;

use crate::loco_ctrl::LocoCtrlError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while building a trajectory.
#[derive(Debug, thiserror::Error)]
pub enum TrajectoryError {
    #[error("A trajectory must contain at least one state")]
    Empty,

    #[error("State {index} has time {time_s} s which is before the previous state")]
    NonMonotonicTime {
        index: usize,
        time_s: f64
    },

    #[error("State {0} contains a non-finite value")]
    NonFiniteState(usize),

    #[error("Could not read the trajectory file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Could not decode the trajectory JSON: {0}")]
    DeserialiseError(serde_json::Error)
}

/// Errors which can occur while configuring trajectory control.
#[derive(Debug, thiserror::Error)]
pub enum TrajCtrlError {
    #[error("RAMSETE b must be positive and finite, found {0}")]
    InvalidB(f64),

    #[error("RAMSETE zeta must be in (0, 1), found {0}")]
    InvalidZeta(f64),

    #[error("Invalid trajectory: {0}")]
    TrajectoryError(#[from] TrajectoryError),

    #[error("Invalid LocoCtrl configuration: {0}")]
    LocoCtrlError(#[from] LocoCtrlError)
}

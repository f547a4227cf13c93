//! # Locomotion control module
//!
//! Converts between whole-chassis motion and per-wheel speeds, and turns
//! desired wheel speeds into clamped drive voltages using a motor feedforward
//! model plus a PID correction per side.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod feedforward;
mod kinematics;
pub(crate) mod params;
mod pid;
mod voltage;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use feedforward::*;
pub use kinematics::*;
pub use params::*;
pub use pid::*;
pub use voltage::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Identifies one side of the drivetrain.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Side {
    Left,
    Right
}

/// Possible errors that can occur when configuring LocoCtrl.
#[derive(Debug, thiserror::Error)]
pub enum LocoCtrlError {
    #[error("Track width must be positive and finite, found {0}")]
    InvalidTrackWidth(f64),

    #[error("Wheel radius must be positive and finite, found {0}")]
    InvalidWheelRadius(f64),

    #[error("Maximum voltage must be positive and finite, found {0}")]
    InvalidMaxVoltage(f64),

    #[error("Gain {name} on the {side:?} side must be non-negative and finite, found {value}")]
    InvalidGain {
        side: Side,
        name: &'static str,
        value: f64
    },

    #[error("The {0:?} side motor model needs a positive k_v or k_a")]
    DegenerateMotorModel(Side)
}

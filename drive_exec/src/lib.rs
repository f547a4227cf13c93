//! # Drive control library
//!
//! Path following for a two-wheel differential drive. The control stack is,
//! leaves first:
//!
//! - `loc` - pose representation and wheel/heading odometry
//! - `loco_ctrl` - drive kinematics, motor feedforward, PID correction and the
//!   voltage synthesiser
//! - `traj_ctrl` - trajectory sampling, the RAMSETE tracking law and the
//!   per-tick control-loop driver
//! - `cmd` - the command lifecycle and its sequence/parallel/race combinators
//! - `drive` - the drivetrain subsystem, its hardware seam and a simulated
//!   drivetrain

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod cmd;
pub mod drive;
pub mod loc;
pub mod loco_ctrl;
pub mod params;
pub mod traj_ctrl;

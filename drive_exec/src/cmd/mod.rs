//! # Command module
//!
//! Commands are behaviours run by the executable once per control cycle,
//! through a three stage lifecycle:
//!
//! - `on_start` once when the command is scheduled
//! - `on_tick` once per cycle until it returns `RunStatus::Finished`
//! - `on_end` once, with `interrupted` set if the command was cancelled rather
//!   than finishing on its own
//!
//! Composite commands (`Sequence`, `Parallel` and `Race`) hold child `Cmd`s
//! and drive their lifecycles in turn.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod basic;
mod group;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;

// Internal
pub use basic::*;
pub use group::*;

use crate::drive::DriveIf;
use crate::loc::Pose;
use crate::loco_ctrl::WheelVoltages;
use crate::traj_ctrl::RamseteCmd;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// The lifecycle of a command.
pub trait Command {
    /// Called once when the command is scheduled.
    fn on_start(&mut self, drive: &mut dyn DriveIf);

    /// Called once per cycle, `dt_s` seconds after the previous call (or 
    /// after `on_start` for the first call).
    fn on_tick(&mut self, drive: &mut dyn DriveIf, dt_s: f64) -> RunStatus;

    /// Called once after the command finishes or is cancelled.
    fn on_end(&mut self, drive: &mut dyn DriveIf, interrupted: bool);
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Result of a single tick of a command.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Finished
}

/// The commands available to the executable.
pub enum Cmd {
    /// Re-anchor odometry (and zero the encoders) at the given pose.
    ResetOdometry(Pose),

    /// Follow a trajectory.
    Ramsete(Box<RamseteCmd>),

    /// Command zero voltage to both sides.
    StopDrive,

    /// Do nothing for a fixed time.
    Wait(Wait),

    Sequence(Sequence),
    Parallel(Parallel),
    Race(Race),

    /// Any other behaviour implementing the lifecycle.
    Other(Box<dyn Command>)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Cmd {
    /// Find the first trajectory following command within this command.
    pub fn find_ramsete(&self) -> Option<&RamseteCmd> {
        match self {
            Cmd::Ramsete(r) => Some(r.as_ref()),
            Cmd::Sequence(g) => g.children().iter().find_map(Cmd::find_ramsete),
            Cmd::Parallel(g) => g.children().iter().find_map(Cmd::find_ramsete),
            Cmd::Race(g) => g.children().iter().find_map(Cmd::find_ramsete),
            _ => None
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Cmd::ResetOdometry(_) => "ResetOdometry",
            Cmd::Ramsete(_) => "Ramsete",
            Cmd::StopDrive => "StopDrive",
            Cmd::Wait(_) => "Wait",
            Cmd::Sequence(_) => "Sequence",
            Cmd::Parallel(_) => "Parallel",
            Cmd::Race(_) => "Race",
            Cmd::Other(_) => "Other"
        }
    }
}

impl Command for Cmd {
    fn on_start(&mut self, drive: &mut dyn DriveIf) {
        debug!("Starting {} command", self.name());

        match self {
            Cmd::ResetOdometry(_) | Cmd::StopDrive => (),
            Cmd::Ramsete(c) => c.on_start(drive),
            Cmd::Wait(c) => c.on_start(drive),
            Cmd::Sequence(c) => c.on_start(drive),
            Cmd::Parallel(c) => c.on_start(drive),
            Cmd::Race(c) => c.on_start(drive),
            Cmd::Other(c) => c.on_start(drive)
        }
    }

    fn on_tick(&mut self, drive: &mut dyn DriveIf, dt_s: f64) -> RunStatus {
        match self {
            Cmd::ResetOdometry(pose) => {
                drive.reset_pose(*pose);
                RunStatus::Finished
            },
            Cmd::StopDrive => {
                drive.set_voltages(WheelVoltages::zero());
                RunStatus::Finished
            },
            Cmd::Ramsete(c) => c.on_tick(drive, dt_s),
            Cmd::Wait(c) => c.on_tick(drive, dt_s),
            Cmd::Sequence(c) => c.on_tick(drive, dt_s),
            Cmd::Parallel(c) => c.on_tick(drive, dt_s),
            Cmd::Race(c) => c.on_tick(drive, dt_s),
            Cmd::Other(c) => c.on_tick(drive, dt_s)
        }
    }

    fn on_end(&mut self, drive: &mut dyn DriveIf, interrupted: bool) {
        debug!("Ending {} command (interrupted: {})", self.name(), interrupted);

        match self {
            Cmd::ResetOdometry(_) | Cmd::StopDrive => (),
            Cmd::Ramsete(c) => c.on_end(drive, interrupted),
            Cmd::Wait(c) => c.on_end(drive, interrupted),
            Cmd::Sequence(c) => c.on_end(drive, interrupted),
            Cmd::Parallel(c) => c.on_end(drive, interrupted),
            Cmd::Race(c) => c.on_end(drive, interrupted),
            Cmd::Other(c) => c.on_end(drive, interrupted)
        }
    }
}

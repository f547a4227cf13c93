//! # Drive Executable Parameters
//!
//! This module provide parameters for the drive executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};
use util::logger::LogConfig;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DriveExecParams {

    /// Target period of one control cycle
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// If true each cycle is paced to real time
    pub realtime: bool,

    /// Path to the trajectory to follow, relative to the params directory
    pub trajectory_path: String,

    /// Number of integration substeps per cycle in the simulated drivetrain
    pub sim_substeps: usize,

    /// Time after which an unfinished run is cancelled
    ///
    /// Units: seconds
    pub max_run_time_s: f64,

    /// Logging levels, with overrides for the per-cycle targets
    #[serde(default)]
    pub log: LogConfig
}

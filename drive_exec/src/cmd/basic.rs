//! Simple leaf commands

use log::trace;

use super::{Command, RunStatus};
use crate::drive::DriveIf;

/// Waits for a fixed duration before finishing.
#[derive(Debug, Clone)]
pub struct Wait {
    duration_s: f64,
    elapsed_s: f64
}

impl Wait {
    pub fn new(duration_s: f64) -> Self {
        Self {
            duration_s,
            elapsed_s: 0.0
        }
    }
}

impl Command for Wait {
    fn on_start(&mut self, _drive: &mut dyn DriveIf) {
        self.elapsed_s = 0.0;
    }

    fn on_tick(&mut self, _drive: &mut dyn DriveIf, dt_s: f64) -> RunStatus {
        if dt_s > 0.0 {
            self.elapsed_s += dt_s;
        }
        trace!("Wait {:.3}/{:.3} s", self.elapsed_s, self.duration_s);

        if self.elapsed_s >= self.duration_s {
            RunStatus::Finished
        }
        else {
            RunStatus::Running
        }
    }

    fn on_end(&mut self, _drive: &mut dyn DriveIf, _interrupted: bool) {}
}

//! Command groups
//!
//! Groups own their children and forward the lifecycle to them. Interrupting
//! a group interrupts exactly the children which are still running.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{Cmd, Command, RunStatus};
use crate::drive::DriveIf;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Runs children one after another.
///
/// When a child finishes it is ended and the next child is started in the
/// same tick. The next child's first tick happens on the following cycle.
pub struct Sequence {
    children: Vec<Cmd>,

    /// Index of the running child, equal to the number of children once all
    /// have finished.
    current: usize
}

/// Runs all children together, finishing once every child has finished.
pub struct Parallel {
    children: Vec<Cmd>,
    running: Vec<bool>
}

/// Runs all children together, finishing as soon as any child finishes.
///
/// The children that had not finished are interrupted.
pub struct Race {
    children: Vec<Cmd>,
    running: bool
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Sequence {
    pub fn new(children: Vec<Cmd>) -> Self {
        let current = children.len();
        Self { children, current }
    }

    pub fn children(&self) -> &[Cmd] {
        &self.children
    }
}

impl Command for Sequence {
    fn on_start(&mut self, drive: &mut dyn DriveIf) {
        self.current = 0;

        if let Some(first) = self.children.first_mut() {
            first.on_start(drive);
        }
    }

    fn on_tick(&mut self, drive: &mut dyn DriveIf, dt_s: f64) -> RunStatus {
        let child = match self.children.get_mut(self.current) {
            Some(c) => c,
            None => return RunStatus::Finished
        };

        if child.on_tick(drive, dt_s) == RunStatus::Finished {
            child.on_end(drive, false);
            self.current += 1;

            match self.children.get_mut(self.current) {
                Some(next) => next.on_start(drive),
                None => return RunStatus::Finished
            }
        }

        RunStatus::Running
    }

    fn on_end(&mut self, drive: &mut dyn DriveIf, interrupted: bool) {
        if interrupted {
            if let Some(child) = self.children.get_mut(self.current) {
                child.on_end(drive, true);
            }
        }
        self.current = self.children.len();
    }
}

impl Parallel {
    pub fn new(children: Vec<Cmd>) -> Self {
        let running = vec![false; children.len()];
        Self { children, running }
    }

    pub fn children(&self) -> &[Cmd] {
        &self.children
    }
}

impl Command for Parallel {
    fn on_start(&mut self, drive: &mut dyn DriveIf) {
        for (child, running) in self.children.iter_mut().zip(self.running.iter_mut()) {
            child.on_start(drive);
            *running = true;
        }
    }

    fn on_tick(&mut self, drive: &mut dyn DriveIf, dt_s: f64) -> RunStatus {
        for (child, running) in self.children.iter_mut().zip(self.running.iter_mut()) {
            if *running && child.on_tick(drive, dt_s) == RunStatus::Finished {
                child.on_end(drive, false);
                *running = false;
            }
        }

        if self.running.iter().any(|r| *r) {
            RunStatus::Running
        }
        else {
            RunStatus::Finished
        }
    }

    fn on_end(&mut self, drive: &mut dyn DriveIf, interrupted: bool) {
        for (child, running) in self.children.iter_mut().zip(self.running.iter_mut()) {
            if *running && interrupted {
                child.on_end(drive, true);
            }
            *running = false;
        }
    }
}

impl Race {
    pub fn new(children: Vec<Cmd>) -> Self {
        Self { children, running: false }
    }

    pub fn children(&self) -> &[Cmd] {
        &self.children
    }
}

impl Command for Race {
    fn on_start(&mut self, drive: &mut dyn DriveIf) {
        for child in self.children.iter_mut() {
            child.on_start(drive);
        }
        self.running = true;
    }

    fn on_tick(&mut self, drive: &mut dyn DriveIf, dt_s: f64) -> RunStatus {
        if !self.running {
            return RunStatus::Finished
        }

        let statuses: Vec<RunStatus> = self.children.iter_mut()
            .map(|c| c.on_tick(drive, dt_s))
            .collect();

        if statuses.is_empty() || statuses.contains(&RunStatus::Finished) {
            for (child, status) in self.children.iter_mut().zip(statuses) {
                child.on_end(drive, status == RunStatus::Running);
            }
            self.running = false;
            RunStatus::Finished
        }
        else {
            RunStatus::Running
        }
    }

    fn on_end(&mut self, drive: &mut dyn DriveIf, interrupted: bool) {
        if self.running && interrupted {
            for child in self.children.iter_mut() {
                child.on_end(drive, true);
            }
        }
        self.running = false;
    }
}

// src/types.rs

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Outcome of one guarded run.
///
/// `Status::default()` is the "zero" status: it is what a skipped run
/// returns, since no process was ever started.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    /// OS process id, `0` if nothing was spawned.
    pub pid: u32,
    /// `true` once the process has exited and all output has been relayed.
    pub complete: bool,
    /// Exit code; `-1` when the process was terminated by a signal.
    pub exit_code: i32,
    pub signaled: bool,
    /// Terminating signal number (unix only).
    pub signal: Option<i32>,
    pub start_ts: Option<DateTime<Utc>>,
    pub stop_ts: Option<DateTime<Utc>>,
    pub runtime: Duration,
}

impl Status {
    /// The process ran to completion and exited with code 0.
    pub fn success(&self) -> bool {
        self.complete && !self.signaled && self.exit_code == 0
    }

    /// No process was started for this run.
    pub fn skipped(&self) -> bool {
        !self.complete && self.pid == 0 && self.start_ts.is_none()
    }

    /// Exit code suitable for handing back to the shell.
    ///
    /// Signaled processes map to `128 + signal` like POSIX shells do.
    pub fn shell_exit_code(&self) -> i32 {
        if self.skipped() {
            return 0;
        }
        match (self.signaled, self.signal) {
            (true, Some(sig)) => 128 + sig,
            (true, None) => 1,
            _ => self.exit_code,
        }
    }
}

/// Phases of a single guarded run, used for tracing only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    CheckingDeadline,
    Skipped,
    Spawning,
    Running,
    Draining,
    Completed,
}

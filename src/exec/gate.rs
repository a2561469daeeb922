// src/exec/gate.rs

//! The break-time gate: a pure decision over (deadline, now).

use chrono::{DateTime, FixedOffset, Utc};

use crate::deadline::format_deadline;
use crate::exec::request::command_line;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Run the command. `deadline` is whatever was configured, if anything.
    Allow {
        deadline: Option<DateTime<FixedOffset>>,
    },
    /// The break time has passed.
    Skip { deadline: DateTime<FixedOffset> },
}

impl Gate {
    pub fn is_skip(&self) -> bool {
        matches!(self, Gate::Skip { .. })
    }
}

/// Skip only when a deadline exists and `now` is strictly after it.
pub fn decide(deadline: Option<DateTime<FixedOffset>>, now: DateTime<Utc>) -> Gate {
    match deadline {
        Some(deadline) if now > deadline => Gate::Skip { deadline },
        _ => Gate::Allow { deadline },
    }
}

/// Notice written to the caller's stderr when a run is skipped.
pub fn skip_notice(deadline: &DateTime<FixedOffset>, command: &str, args: &[String]) -> String {
    format!(
        "the command cannot be run after {}. skipped command: `{}`\n",
        format_deadline(deadline),
        command_line(command, args)
    )
}

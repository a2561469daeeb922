// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`gate`] decides whether a command may run at all.
//! - [`request`] holds the per-invocation [`RunRequest`] and sink helpers.
//! - [`relay`] copies the child's output lines to the caller's sinks on a
//!   dedicated task.
//! - [`runner`] ties it together in [`GuardedExecutor`], spawning commands
//!   with `tokio::process::Command`.

pub mod gate;
pub mod relay;
pub mod request;
pub mod runner;

pub use gate::{Gate, decide, skip_notice};
pub use relay::RelayReport;
pub use request::{RunRequest, SharedSink, Sink};
pub use runner::GuardedExecutor;

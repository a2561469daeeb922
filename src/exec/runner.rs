// src/exec/runner.rs

//! Guarded executor: check the break time, then run and relay.

use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::deadline::{DeadlineSource, format_deadline};
use crate::errors::{BlakerError, Result};
use crate::exec::gate::{Gate, decide, skip_notice};
use crate::exec::relay::{RelayReport, spawn_relay};
use crate::exec::request::{RunRequest, Sink};
use crate::types::{RunPhase, Status};

/// How long the relay may keep draining after a timed-out child was killed.
/// Grandchildren that inherited the pipes can otherwise hold them open forever.
const KILL_DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Runs commands unless the configured break time has passed.
///
/// Holds no per-run state; concurrent `run` calls are independent.
#[derive(Debug, Clone)]
pub struct GuardedExecutor {
    deadlines: DeadlineSource,
    clock: Arc<dyn Clock>,
}

impl GuardedExecutor {
    pub fn new(deadlines: DeadlineSource, clock: Arc<dyn Clock>) -> Self {
        Self { deadlines, clock }
    }

    /// Evaluate the gate without running anything.
    pub async fn check(&self) -> Result<Gate> {
        let deadline = self.deadlines.get_deadline().await?;
        let now = self.clock.now();
        Ok(decide(deadline, now))
    }

    /// Gate, then spawn, relay and wait.
    ///
    /// A skipped run is `Ok(Status::default())`. Any error from the deadline
    /// lookup is returned before a process is started.
    pub async fn run(&self, request: RunRequest) -> Result<Status> {
        let RunRequest {
            command,
            args,
            stdout,
            mut stderr,
            wait,
            verbose,
            no_delay,
        } = request;

        phase(verbose, &command, RunPhase::CheckingDeadline);
        let gate = self.check().await?;

        if let Gate::Skip { deadline } = gate {
            phase(verbose, &command, RunPhase::Skipped);
            let message = skip_notice(&deadline, &command, &args);
            write_notice(&mut stderr, &message)
                .await
                .map_err(|source| BlakerError::SkipNoticeWriteFailed {
                    message: message.trim_end().to_string(),
                    source,
                })?;
            info!(
                command = %command,
                deadline = %format_deadline(&deadline),
                "break time has passed; command skipped"
            );
            return Ok(Status::default());
        }

        phase(verbose, &command, RunPhase::Spawning);
        let mut cmd = Command::new(&command);
        cmd.args(&args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let started = Instant::now();
        let start_ts = self.clock.now();
        let mut child = cmd
            .spawn()
            .map_err(|source| BlakerError::ProcessSpawnFailed {
                command: command.clone(),
                source,
            })?;

        let pid = child.id().unwrap_or_default();
        if verbose {
            info!(command = %command, ?args, pid, ?wait, no_delay, "command started");
        } else {
            debug!(command = %command, ?args, pid, ?wait, no_delay, "command started");
        }

        let mut relay = spawn_relay(
            command.clone(),
            child.stdout.take(),
            child.stderr.take(),
            stdout,
            stderr,
        );

        phase(verbose, &command, RunPhase::Running);
        let waited = match wait {
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(res) => res,
                Err(_) => {
                    warn!(command = %command, pid, ?limit, "wait duration elapsed; killing process");
                    if let Err(e) = child.kill().await {
                        warn!(command = %command, pid, error = %e, "failed to kill timed-out process");
                    }
                    if tokio::time::timeout(KILL_DRAIN_GRACE, &mut relay).await.is_err() {
                        warn!(command = %command, pid, "output still open after kill; abandoning relay");
                        relay.abort();
                    }
                    return Err(BlakerError::Timeout {
                        command,
                        after: limit,
                    });
                }
            },
            None => child.wait().await,
        };

        let exit = waited.map_err(|source| BlakerError::WaitFailed {
            command: command.clone(),
            source,
        })?;

        phase(verbose, &command, RunPhase::Draining);
        let report: RelayReport = relay.await.map_err(|e| BlakerError::RelayFailed {
            command: command.clone(),
            reason: e.to_string(),
        })?;

        let status = build_status(pid, exit, start_ts, self.clock.now(), started.elapsed());
        phase(verbose, &command, RunPhase::Completed);

        if verbose {
            info!(
                command = %command,
                pid,
                exit_code = status.exit_code,
                signaled = status.signaled,
                stdout_lines = report.stdout_lines,
                stderr_lines = report.stderr_lines,
                "command finished"
            );
        } else {
            debug!(
                command = %command,
                pid,
                exit_code = status.exit_code,
                signaled = status.signaled,
                stdout_lines = report.stdout_lines,
                stderr_lines = report.stderr_lines,
                "command finished"
            );
        }
        if report.write_errors > 0 {
            warn!(
                command = %command,
                write_errors = report.write_errors,
                "some output lines could not be written to their sink"
            );
        }

        Ok(status)
    }
}

fn phase(verbose: bool, command: &str, phase: RunPhase) {
    if verbose {
        info!(command, ?phase, "run phase");
    } else {
        debug!(command, ?phase, "run phase");
    }
}

async fn write_notice(sink: &mut Sink, message: &str) -> std::io::Result<()> {
    sink.write_all(message.as_bytes()).await?;
    sink.flush().await
}

fn build_status(
    pid: u32,
    exit: ExitStatus,
    start_ts: chrono::DateTime<chrono::Utc>,
    stop_ts: chrono::DateTime<chrono::Utc>,
    runtime: Duration,
) -> Status {
    let signal = exit_signal(&exit);
    Status {
        pid,
        complete: true,
        exit_code: exit.code().unwrap_or(-1),
        signaled: signal.is_some(),
        signal,
        start_ts: Some(start_ts),
        stop_ts: Some(stop_ts),
        runtime,
    }
}

#[cfg(unix)]
fn exit_signal(exit: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    exit.signal()
}

#[cfg(not(unix))]
fn exit_signal(_exit: &ExitStatus) -> Option<i32> {
    None
}

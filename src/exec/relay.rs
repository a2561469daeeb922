// src/exec/relay.rs

//! Output relay task.
//!
//! One Tokio task per run owns both child pipes and both sinks. It copies
//! every line to its sink as soon as the child emits it and returns once
//! both pipes have hit EOF, so awaiting its `JoinHandle` is the drain
//! barrier: when the join completes, nothing is left unrelayed.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader, Split};
use tokio::task::JoinHandle;
use tracing::{trace, warn};

use crate::exec::request::Sink;

/// What the relay did, returned when it finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayReport {
    pub stdout_lines: usize,
    pub stderr_lines: usize,
    /// Sink writes that failed; the relay kept draining after each.
    pub write_errors: usize,
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    fn as_str(self) -> &'static str {
        match self {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }
}

/// Spawn the relay for one child.
///
/// A `None` pipe counts as already closed.
pub fn spawn_relay<O, E>(
    command: String,
    stdout: Option<O>,
    stderr: Option<E>,
    out_sink: Sink,
    err_sink: Sink,
) -> JoinHandle<RelayReport>
where
    O: AsyncRead + Send + Unpin + 'static,
    E: AsyncRead + Send + Unpin + 'static,
{
    tokio::spawn(relay(command, stdout, stderr, out_sink, err_sink))
}

async fn relay<O, E>(
    command: String,
    stdout: Option<O>,
    stderr: Option<E>,
    mut out_sink: Sink,
    mut err_sink: Sink,
) -> RelayReport
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let mut out_lines = stdout.map(|s| BufReader::new(s).split(b'\n'));
    let mut err_lines = stderr.map(|s| BufReader::new(s).split(b'\n'));
    let mut report = RelayReport::default();

    loop {
        // `next_segment` is cancel safe, so losing a select race drops no data.
        tokio::select! {
            seg = next_segment(&mut out_lines), if out_lines.is_some() => {
                match seg {
                    Some(line) => {
                        report.stdout_lines += 1;
                        if !forward(&command, Stream::Stdout, &mut out_sink, line).await {
                            report.write_errors += 1;
                        }
                    }
                    None => out_lines = None,
                }
            }
            seg = next_segment(&mut err_lines), if err_lines.is_some() => {
                match seg {
                    Some(line) => {
                        report.stderr_lines += 1;
                        if !forward(&command, Stream::Stderr, &mut err_sink, line).await {
                            report.write_errors += 1;
                        }
                    }
                    None => err_lines = None,
                }
            }
            else => break,
        }
    }

    trace!(
        command = %command,
        stdout_lines = report.stdout_lines,
        stderr_lines = report.stderr_lines,
        "output relay drained"
    );
    report
}

/// Next line without its `\n`; `None` on EOF or on a read error.
async fn next_segment<R>(lines: &mut Option<Split<BufReader<R>>>) -> Option<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let split = lines.as_mut()?;
    match split.next_segment().await {
        Ok(seg) => seg,
        Err(e) => {
            warn!(error = %e, "reading child output failed; closing stream");
            None
        }
    }
}

/// Write one line plus newline in a single call, then flush. Returns `false`
/// if the sink rejected it.
async fn forward(command: &str, stream: Stream, sink: &mut Sink, mut line: Vec<u8>) -> bool {
    trace!(command, stream = stream.as_str(), line = %String::from_utf8_lossy(&line), "relay");
    line.push(b'\n');

    let res = async {
        sink.write_all(&line).await?;
        sink.flush().await
    }
    .await;

    match res {
        Ok(()) => true,
        Err(e) => {
            warn!(
                command,
                stream = stream.as_str(),
                error = %e,
                "failed to write relayed line; continuing"
            );
            false
        }
    }
}

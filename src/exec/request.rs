// src/exec/request.rs

//! Per-invocation run request and the output sinks it carries.

use std::fmt;
use std::io::Write;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::AsyncWrite;

/// Destination for one of the child's output streams.
pub type Sink = Box<dyn AsyncWrite + Send + Unpin>;

/// Everything needed for one guarded run. Built fresh for every invocation.
pub struct RunRequest {
    pub command: String,
    pub args: Vec<String>,
    pub stdout: Sink,
    pub stderr: Sink,
    /// Hard timeout; `None` lets the command run for as long as it likes.
    pub wait: Option<Duration>,
    /// Raises the executor's own log events from debug to info.
    pub verbose: bool,
    /// Accepted for compatibility; only recorded in logs.
    pub no_delay: bool,
}

impl RunRequest {
    /// Request relaying to this process's own stdout / stderr.
    pub fn new<I, S>(command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
            stdout: Box::new(tokio::io::stdout()),
            stderr: Box::new(tokio::io::stderr()),
            wait: None,
            verbose: false,
            no_delay: false,
        }
    }

    pub fn stdout(mut self, sink: impl AsyncWrite + Send + Unpin + 'static) -> Self {
        self.stdout = Box::new(sink);
        self
    }

    pub fn stderr(mut self, sink: impl AsyncWrite + Send + Unpin + 'static) -> Self {
        self.stderr = Box::new(sink);
        self
    }

    /// Zero is treated as "no timeout".
    pub fn wait(mut self, wait: Option<Duration>) -> Self {
        self.wait = wait.filter(|d| !d.is_zero());
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn no_delay(mut self, no_delay: bool) -> Self {
        self.no_delay = no_delay;
        self
    }

    /// `command arg1 arg2 ...`
    pub fn command_line(&self) -> String {
        command_line(&self.command, &self.args)
    }
}

impl fmt::Debug for RunRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunRequest")
            .field("command", &self.command)
            .field("args", &self.args)
            .field("wait", &self.wait)
            .field("verbose", &self.verbose)
            .field("no_delay", &self.no_delay)
            .finish_non_exhaustive()
    }
}

pub(crate) fn command_line(command: &str, args: &[String]) -> String {
    if args.is_empty() {
        command.to_string()
    } else {
        format!("{} {}", command, args.join(" "))
    }
}

/// A writer that can be handed to both streams at once.
///
/// Clones share the underlying writer. Every `poll_write` writes the whole
/// buffer while holding the lock, so a relayed line is never split by a
/// write to the other stream.
#[derive(Debug, Default)]
pub struct SharedSink<W> {
    inner: Arc<Mutex<W>>,
}

impl<W> Clone for SharedSink<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W: Write> SharedSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(writer)),
        }
    }

    /// Run `f` with exclusive access to the underlying writer.
    pub fn with<R>(&self, f: impl FnOnce(&mut W) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

impl SharedSink<Vec<u8>> {
    /// In-memory capture buffer.
    pub fn buffer() -> Self {
        Self::new(Vec::new())
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        self.with(|buf| String::from_utf8_lossy(buf).into_owned())
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl<W: Write + Unpin> AsyncWrite for SharedSink<W> {
    fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<std::io::Result<usize>> {
        let res = self.with(|w| w.write_all(buf)).map(|()| buf.len());
        Poll::Ready(res)
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Poll::Ready(self.with(|w| w.flush()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        self.poll_flush(cx)
    }
}

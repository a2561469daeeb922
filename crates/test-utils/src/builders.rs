#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use blaker::clock::FixedClock;
use blaker::deadline::{
    DEFAULT_KEY, DEFAULT_KEY_ATTRIBUTE, DEFAULT_TABLE, DEFAULT_VALUE_ATTRIBUTE, DeadlineKey,
    DeadlineSource,
};
use blaker::exec::{GuardedExecutor, RunRequest, SharedSink};
use blaker::store::MemoryStore;

/// Builder for a `GuardedExecutor` over an in-memory store and a fixed clock.
pub struct ExecutorBuilder {
    store: MemoryStore,
    now: DateTime<Utc>,
}

impl ExecutorBuilder {
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            now: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    /// Store `value` as the break time under the default names.
    pub fn break_time(self, value: &str) -> Self {
        self.store.put_value(
            DEFAULT_TABLE,
            DEFAULT_KEY_ATTRIBUTE,
            DEFAULT_KEY,
            DEFAULT_VALUE_ATTRIBUTE,
            value,
        );
        self
    }

    pub fn now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn store_failing(self, message: &str) -> Self {
        self.store.fail_with(message);
        self
    }

    /// Handle to the store, shared with the built executor.
    pub fn store(&self) -> MemoryStore {
        self.store.clone()
    }

    pub fn build(self) -> GuardedExecutor {
        let deadlines = DeadlineSource::new(Arc::new(self.store), DeadlineKey::default());
        GuardedExecutor::new(deadlines, Arc::new(FixedClock::new(self.now)))
    }
}

impl Default for ExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A request whose output lands in two capture buffers.
pub struct Captured {
    pub request: RunRequest,
    pub stdout: SharedSink<Vec<u8>>,
    pub stderr: SharedSink<Vec<u8>>,
}

pub fn captured(command: &str, args: &[&str]) -> Captured {
    let stdout = SharedSink::buffer();
    let stderr = SharedSink::buffer();
    let request = RunRequest::new(command, args.iter().copied())
        .stdout(stdout.clone())
        .stderr(stderr.clone());
    Captured {
        request,
        stdout,
        stderr,
    }
}

/// `sh -c <script>` with captured output.
pub fn captured_sh(script: &str) -> Captured {
    captured("sh", &["-c", script])
}

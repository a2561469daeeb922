//! Shared helpers for blaker's integration tests.

pub mod builders;
pub mod failing_writer;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use blaker::logging::LOG_ENV;
use tracing_subscriber::{EnvFilter, fmt};

static TRACING: Once = Once::new();

/// Upper bound for any single async step in a test.
pub const TEST_DEADLINE: Duration = Duration::from_secs(5);

/// Filter used when `BLAKER_LOG` is unset: blaker's own events at debug,
/// everything else quiet.
const DEFAULT_TEST_FILTER: &str = "warn,blaker=debug";

/// Install a per-test capturing subscriber once per test binary.
///
/// `BLAKER_LOG` takes a full filter directive, e.g.
/// `BLAKER_LOG=blaker::exec=trace cargo test -- --nocapture`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = std::env::var(LOG_ENV)
            .ok()
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_TEST_FILTER));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `f`, failing the test if it takes longer than [`TEST_DEADLINE`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_DEADLINE, f).await {
        Ok(value) => value,
        Err(_) => panic!("step did not finish within {:?}", TEST_DEADLINE),
    }
}

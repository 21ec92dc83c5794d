//! Shared helpers for `goalslot` integration tests.

pub mod builders;
pub mod recording_sink;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use goalslot::logging::LOG_ENV_VAR;
use tracing_subscriber::{EnvFilter, fmt};

/// Upper bound for a single scenario; goals here run with a zero or
/// millisecond step interval.
pub const SCENARIO_TIMEOUT: Duration = Duration::from_secs(5);

static INIT: Once = Once::new();

/// Install a per-test tracing subscriber once per test binary.
///
/// The filter comes from `GOALSLOT_LOG` (same variable the library reads),
/// then `RUST_LOG`, then `info`. Output goes through `with_test_writer`, so it
/// only shows up for failing tests or under `--nocapture`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = test_filter(
            std::env::var(LOG_ENV_VAR).ok().as_deref(),
            std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(),
        );

        // A unit test in the library may already have claimed the global slot.
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

fn test_filter(goalslot_log: Option<&str>, rust_log: Option<&str>) -> EnvFilter {
    [goalslot_log, rust_log]
        .into_iter()
        .flatten()
        .find_map(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Await `f`, failing the test if it takes longer than [`SCENARIO_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    with_timeout_of(SCENARIO_TIMEOUT, f).await
}

/// Await `f`, failing the test if it takes longer than `limit`.
///
/// Under `start_paused` the limit is virtual time, so long step intervals
/// can be given a matching budget without slowing the test down.
pub async fn with_timeout_of<F, T>(limit: Duration, f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(limit, f).await {
        Ok(value) => value,
        Err(_) => panic!("scenario did not settle within {limit:?}"),
    }
}

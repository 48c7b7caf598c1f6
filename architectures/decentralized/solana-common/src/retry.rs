use std::time::Duration;

use backon::ExponentialBuilder;

const RETRY_MIN_DELAY: Duration = Duration::from_millis(500);
const RETRY_MAX_DELAY: Duration = Duration::from_secs(8);
const RETRY_MAX_TIMES: usize = 4;

/// Backoff for operator sends. The claim workflow never retries on its own.
pub fn transient_backoff() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(RETRY_MIN_DELAY)
        .with_max_delay(RETRY_MAX_DELAY)
        .with_max_times(RETRY_MAX_TIMES)
        .with_jitter()
}

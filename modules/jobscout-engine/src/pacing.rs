use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;

use crate::engine::ScraperConfig;
use crate::error::ScrapeError;

/// Randomized pause between entries. Request shaping, not correctness;
/// must stay responsive to cancellation mid-wait.
pub(crate) async fn between_entries(
    config: &ScraperConfig,
    cancel: &CancellationToken,
) -> Result<(), ScrapeError> {
    let pause = jitter(config.pace_min, config.pace_max);
    tokio::select! {
        _ = cancel.cancelled() => Err(ScrapeError::Cancelled),
        _ = tokio::time::sleep(pause) => Ok(()),
    }
}

/// Uniform draw from `[min, max]`. Degenerate ranges collapse to `min`.
pub(crate) fn jitter(min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    let span = (max - min).as_millis() as u64;
    min + Duration::from_millis(rand::rng().random_range(0..=span))
}

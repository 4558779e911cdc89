//! Scrape orchestration: session lifecycle, entry discovery, sequential
//! iteration with pacing, and the completeness flag.
//!
//! One scrape owns one browser session for its whole lifetime and releases
//! it on every exit path. Entries are never processed concurrently: the
//! session holds a single navigable document, and concurrent clicks would
//! corrupt element references.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use jobscout_common::{JobPosting, ScrapeOutcome, ScrapeRequest};
use webdriver_client::{BrowserSession, SessionFactory};

use crate::error::ScrapeError;
use crate::item::{ItemOutcome, ItemProcessor};
use crate::{locators, pacing};

/// Default listing source.
pub const DEFAULT_LISTING_URL: &str = "https://www.indeed.com/jobs";

/// Timeouts and pacing bounds. Tests run with near-zero values.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub listing_url: String,
    /// Bounded wait for the entry collection to render.
    pub collection_timeout: Duration,
    /// Bounded wait for an entry's detail pane to render.
    pub detail_timeout: Duration,
    /// Pacing interval between entries, drawn uniformly at random.
    pub pace_min: Duration,
    pub pace_max: Duration,
    /// Total attempts per entry, first try included.
    pub max_attempts: u32,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            collection_timeout: Duration::from_secs(10),
            detail_timeout: Duration::from_secs(10),
            pace_min: Duration::from_millis(100),
            pace_max: Duration::from_millis(300),
            max_attempts: 3,
        }
    }
}

/// Caller-facing contract: always an outcome, except under cancellation,
/// which surfaces as its own error rather than a degraded result.
#[async_trait]
pub trait JobScraper: Send + Sync {
    async fn scrape(
        &self,
        request: &ScrapeRequest,
        cancel: CancellationToken,
    ) -> Result<ScrapeOutcome, ScrapeError>;
}

pub struct ScrapeEngine {
    sessions: Arc<dyn SessionFactory>,
    config: ScraperConfig,
}

impl ScrapeEngine {
    pub fn new(sessions: Arc<dyn SessionFactory>) -> Self {
        Self::with_config(sessions, ScraperConfig::default())
    }

    pub fn with_config(sessions: Arc<dyn SessionFactory>, config: ScraperConfig) -> Self {
        Self { sessions, config }
    }

    async fn run(
        &self,
        session: &dyn BrowserSession,
        request: &ScrapeRequest,
        cancel: &CancellationToken,
    ) -> Result<ScrapeOutcome, ScrapeError> {
        let mut results = ResultAggregator::new();

        let url = listing_url(&self.config.listing_url, request);
        if let Err(e) = session.navigate(&url).await {
            warn!(error = %e, %url, "Navigation failed");
            return Ok(results.into_outcome(false));
        }

        let entries = tokio::select! {
            _ = cancel.cancelled() => return Err(ScrapeError::Cancelled),
            found = session.wait_for_all(locators::CARD_CONTAINER, self.config.collection_timeout) => {
                match found {
                    Ok(entries) => entries,
                    Err(e) => {
                        warn!(error = %e, "Entry collection never resolved");
                        return Ok(results.into_outcome(false));
                    }
                }
            }
        };

        info!(cards = entries.len(), "Scraping started");

        let processor = ItemProcessor::new(&self.config);
        for (index, entry) in entries.iter().enumerate() {
            match processor.process(session, entry, request, cancel).await? {
                ItemOutcome::Recorded(posting) => results.push(posting),
                ItemOutcome::Skipped => {}
                ItemOutcome::Abort => {
                    warn!(
                        card = index + 1,
                        scraped = results.len(),
                        "Page blocked, returning partial results"
                    );
                    return Ok(results.into_outcome(false));
                }
            }
            pacing::between_entries(&self.config, cancel).await?;
        }

        info!(cards = entries.len(), scraped = results.len(), "Scraping finished");
        Ok(results.into_outcome(true))
    }
}

#[async_trait]
impl JobScraper for ScrapeEngine {
    async fn scrape(
        &self,
        request: &ScrapeRequest,
        cancel: CancellationToken,
    ) -> Result<ScrapeOutcome, ScrapeError> {
        let session = match self.sessions.open().await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Failed to open browser session");
                return Ok(ScrapeOutcome::empty_incomplete());
            }
        };

        let result = self.run(session.as_ref(), request, &cancel).await;

        // Release the session on every exit path, cancellation included.
        if let Err(e) = session.close().await {
            warn!(error = %e, "Failed to close browser session");
        }

        result
    }
}

/// Accumulates records in discovery order and stamps the completeness flag.
struct ResultAggregator {
    postings: Vec<JobPosting>,
}

impl ResultAggregator {
    fn new() -> Self {
        Self {
            postings: Vec::new(),
        }
    }

    fn push(&mut self, posting: JobPosting) {
        self.postings.push(posting);
    }

    fn len(&self) -> usize {
        self.postings.len()
    }

    fn into_outcome(self, complete: bool) -> ScrapeOutcome {
        ScrapeOutcome {
            postings: self.postings,
            complete,
        }
    }
}

fn listing_url(base: &str, request: &ScrapeRequest) -> String {
    url::Url::parse_with_params(
        base,
        [
            ("q", request.query.as_str()),
            ("l", request.location.as_str()),
        ],
    )
    .map(String::from)
    .unwrap_or_else(|e| {
        warn!(error = %e, base, "Bad listing URL, using it verbatim");
        base.to_string()
    })
}

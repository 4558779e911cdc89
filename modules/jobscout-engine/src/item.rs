//! Per-entry processing: age filter, detail activation, field extraction,
//! and the bounded retry state machine around all of it.
//!
//! Three failure tiers meet here. A missing field narrows the record to a
//! null in that slot. A transient item failure (stale handle, unrendered
//! detail pane, unexpected driver error) spends one of the entry's retry
//! attempts. An interaction-blocked click is structural and aborts the whole
//! page immediately.

use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use jobscout_common::{JobPosting, ScrapeRequest};
use webdriver_client::{BrowserSession, ElementHandle, WebDriverError};

use crate::engine::ScraperConfig;
use crate::error::ScrapeError;
use crate::{fields, locators};

/// What one entry contributed to the scrape.
#[derive(Debug)]
pub(crate) enum ItemOutcome {
    Recorded(JobPosting),
    Skipped,
    /// Structural blocker; the orchestrator must stop iterating.
    Abort,
}

/// Retry state machine. `Retrying(n)` carries the number of attempts spent.
#[derive(Debug)]
enum ItemState {
    Pending,
    Retrying(u32),
    Succeeded(JobPosting),
    Skipped,
    Blocked,
}

pub(crate) struct ItemProcessor<'a> {
    config: &'a ScraperConfig,
}

impl<'a> ItemProcessor<'a> {
    pub(crate) fn new(config: &'a ScraperConfig) -> Self {
        Self { config }
    }

    pub(crate) async fn process(
        &self,
        session: &dyn BrowserSession,
        entry: &ElementHandle,
        request: &ScrapeRequest,
        cancel: &CancellationToken,
    ) -> Result<ItemOutcome, ScrapeError> {
        let mut state = ItemState::Pending;
        loop {
            state = match state {
                ItemState::Pending => self.attempt(session, entry, request, cancel, 1).await?,
                ItemState::Retrying(n) if n >= self.config.max_attempts => {
                    warn!(attempts = n, "Dropping entry, retry budget exhausted");
                    ItemState::Skipped
                }
                ItemState::Retrying(n) => {
                    warn!(attempt = n + 1, "Retrying entry");
                    self.attempt(session, entry, request, cancel, n + 1).await?
                }
                ItemState::Succeeded(posting) => return Ok(ItemOutcome::Recorded(posting)),
                ItemState::Skipped => return Ok(ItemOutcome::Skipped),
                ItemState::Blocked => return Ok(ItemOutcome::Abort),
            };
        }
    }

    /// One full pass over the entry. Returns the next state.
    async fn attempt(
        &self,
        session: &dyn BrowserSession,
        entry: &ElementHandle,
        request: &ScrapeRequest,
        cancel: &CancellationToken,
        attempt: u32,
    ) -> Result<ItemState, ScrapeError> {
        // Age filter. Skipping an out-of-range entry costs no retries.
        if let Some(limit) = request.age_limit() {
            match fields::posted_days_ago(session, entry).await {
                Ok(Some(days)) if days > limit => return Ok(ItemState::Skipped),
                Ok(_) => {} // absent or unparsable age fails open
                Err(e) => return Ok(retry_after(attempt, "posting age", e)),
            }
        }

        // Activation: reveal the detail pane. A blocked click is a page
        // problem (typically an unclosable overlay), not an item problem.
        if let Err(e) = session.click(entry).await {
            if e.is_click_intercepted() {
                error!(error = %e, "Entry click intercepted");
                return Ok(ItemState::Blocked);
            }
            return Ok(retry_after(attempt, "activation click", e));
        }

        // An unrendered detail pane is usually a transient render delay.
        let detail = tokio::select! {
            _ = cancel.cancelled() => return Err(ScrapeError::Cancelled),
            found = session.wait_for_one(locators::DETAIL_PANE, self.config.detail_timeout) => found,
        };
        if let Err(e) = detail {
            return Ok(retry_after(attempt, "detail pane", e));
        }

        match self.extract(session, entry).await {
            Ok(posting) => Ok(ItemState::Succeeded(posting)),
            Err(e) => Ok(retry_after(attempt, "field extraction", e)),
        }
    }

    /// Five independent field reads. Only stale/unexpected driver failures
    /// escape; plain absence has already become `None` per field.
    async fn extract(
        &self,
        session: &dyn BrowserSession,
        entry: &ElementHandle,
    ) -> Result<JobPosting, WebDriverError> {
        let title = fields::scoped_text(session, entry, locators::CARD_TITLE, "title").await?;
        let company =
            fields::scoped_text(session, entry, locators::CARD_COMPANY, "company").await?;
        let location =
            fields::scoped_text(session, entry, locators::CARD_LOCATION, "location").await?;
        let description =
            fields::page_text(session, locators::DETAIL_DESCRIPTION, "description").await?;
        let salary = fields::salary(session).await?;

        Ok(JobPosting {
            title,
            company,
            location,
            description,
            salary,
        })
    }
}

fn retry_after(attempt: u32, stage: &str, e: WebDriverError) -> ItemState {
    if e.is_stale() {
        warn!(stage, "Stale element reference, retrying entry");
    } else {
        warn!(stage, error = %e, "Entry attempt failed");
    }
    ItemState::Retrying(attempt)
}

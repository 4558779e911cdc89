pub mod error;
mod session;

pub use error::{Result, WebDriverError};
pub use session::{WebDriverClient, WebDriverSession};

use std::time::Duration;

use async_trait::async_trait;

/// Poll interval for the client-side bounded waits.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Opaque handle to one element in the session's current document. Valid
/// only until the page mutates underneath it; a read through a dead handle
/// surfaces as `WebDriverError::StaleElement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle(pub String);

impl ElementHandle {
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// The narrow browser capability the scrape engine consumes: navigate,
/// locate, read text, click, close. Locators are XPath expressions.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Locate every element matching `locator` in the current document.
    /// An empty match is `Ok(vec![])`, not an error.
    async fn find_all(&self, locator: &str) -> Result<Vec<ElementHandle>>;

    /// Locate a single element in the current document.
    async fn find_one(&self, locator: &str) -> Result<ElementHandle>;

    /// Locate a single element scoped under `scope`.
    async fn find_in(&self, scope: &ElementHandle, locator: &str) -> Result<ElementHandle>;

    async fn text(&self, element: &ElementHandle) -> Result<String>;

    async fn click(&self, element: &ElementHandle) -> Result<()>;

    async fn close(&self) -> Result<()>;

    /// Poll `find_all` until it returns a non-empty collection or the
    /// deadline lapses.
    async fn wait_for_all(
        &self,
        locator: &str,
        timeout: Duration,
    ) -> Result<Vec<ElementHandle>> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            match self.find_all(locator).await {
                Ok(elements) if !elements.is_empty() => return Ok(elements),
                Ok(_) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(WebDriverError::Timeout(locator.to_string()));
            }
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        }
    }

    /// Poll `find_one` until the element appears or the deadline lapses.
    async fn wait_for_one(&self, locator: &str, timeout: Duration) -> Result<ElementHandle> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            match self.find_one(locator).await {
                Ok(element) => return Ok(element),
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(WebDriverError::Timeout(locator.to_string()));
            }
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        }
    }
}

/// Opens fresh browser sessions. One session per scrape; the caller owns
/// the session for the scrape's lifetime and is responsible for closing it.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self) -> Result<Box<dyn BrowserSession>>;
}

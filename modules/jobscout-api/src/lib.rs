pub mod routes;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use jobscout_engine::JobScraper;

use store::ResultStore;

pub struct AppState {
    pub scraper: Arc<dyn JobScraper>,
    pub store: Arc<dyn ResultStore>,
    /// Wall-clock budget for one scrape request.
    pub budget: Duration,
}

//! Scripted in-memory browser session for engine tests. Cards are declared
//! up front; handles encode the card index and field so reads can be routed
//! without a real document.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use jobscout_engine::{locators, ScrapeEngine, ScraperConfig};
use webdriver_client::{BrowserSession, ElementHandle, Result, SessionFactory, WebDriverError};

#[derive(Debug, Clone, Default)]
pub struct FakeCard {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub salary: Option<String>,
    pub age_text: Option<String>,
    /// Number of description reads that raise a stale reference before
    /// the text becomes readable.
    pub stale_description_reads: u32,
    pub click_intercepted: bool,
    /// Detail pane never renders for this card.
    pub detail_missing: bool,
}

impl FakeCard {
    pub fn full(n: usize) -> Self {
        Self {
            title: Some(format!("Title {n}")),
            company: Some(format!("Company {n}")),
            location: Some(format!("Location {n}")),
            description: Some(format!("Description {n}")),
            salary: Some(format!("${n}5 an hour")),
            ..Self::default()
        }
    }
}

struct State {
    active: Option<usize>,
    stale_remaining: Vec<u32>,
}

pub struct FakeSession {
    cards: Vec<FakeCard>,
    state: Mutex<State>,
    closed: Arc<AtomicBool>,
}

fn not_found(what: &str) -> WebDriverError {
    WebDriverError::NotFound(what.to_string())
}

fn card_index(id: &str) -> Option<usize> {
    let rest = id.strip_prefix("card-")?;
    let digits = rest.split(':').next()?;
    digits.parse().ok()
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn navigate(&self, _url: &str) -> Result<()> {
        Ok(())
    }

    async fn find_all(&self, locator: &str) -> Result<Vec<ElementHandle>> {
        if locator == locators::CARD_CONTAINER {
            return Ok((0..self.cards.len())
                .map(|i| ElementHandle(format!("card-{i}")))
                .collect());
        }
        Ok(Vec::new())
    }

    async fn find_one(&self, locator: &str) -> Result<ElementHandle> {
        let active = self.state.lock().unwrap().active;
        let Some(i) = active else {
            return Err(not_found(locator));
        };
        let card = &self.cards[i];

        if locator == locators::DETAIL_PANE {
            if card.detail_missing {
                return Err(not_found(locator));
            }
            return Ok(ElementHandle(format!("card-{i}:detail-pane")));
        }
        if locator == locators::DETAIL_DESCRIPTION {
            if card.description.is_none() {
                return Err(not_found(locator));
            }
            return Ok(ElementHandle(format!("card-{i}:description")));
        }
        if locator == locators::DETAIL_SALARY_CONTAINER {
            if card.salary.is_none() {
                return Err(not_found(locator));
            }
            return Ok(ElementHandle(format!("card-{i}:salary-box")));
        }
        Err(not_found(locator))
    }

    async fn find_in(&self, scope: &ElementHandle, locator: &str) -> Result<ElementHandle> {
        let id = scope.id();
        let Some(i) = card_index(id) else {
            return Err(not_found(locator));
        };

        if id.ends_with(":salary-box") {
            if locator == locators::INNER_SPAN {
                return Ok(ElementHandle(format!("card-{i}:salary")));
            }
            return Err(not_found(locator));
        }

        let card = &self.cards[i];
        let (present, field) = if locator == locators::CARD_TITLE {
            (card.title.is_some(), "title")
        } else if locator == locators::CARD_COMPANY {
            (card.company.is_some(), "company")
        } else if locator == locators::CARD_LOCATION {
            (card.location.is_some(), "location")
        } else if locator == locators::CARD_POSTING_AGE {
            (card.age_text.is_some(), "age")
        } else {
            (false, "unknown")
        };

        if present {
            Ok(ElementHandle(format!("card-{i}:{field}")))
        } else {
            Err(not_found(locator))
        }
    }

    async fn text(&self, element: &ElementHandle) -> Result<String> {
        let id = element.id();
        let Some(i) = card_index(id) else {
            return Err(not_found(id));
        };
        let card = &self.cards[i];
        let field = id.split(':').nth(1).unwrap_or_default();

        if field == "description" {
            let mut state = self.state.lock().unwrap();
            if state.stale_remaining[i] > 0 {
                state.stale_remaining[i] -= 1;
                return Err(WebDriverError::StaleElement(id.to_string()));
            }
        }

        let value = match field {
            "title" => card.title.clone(),
            "company" => card.company.clone(),
            "location" => card.location.clone(),
            "description" => card.description.clone(),
            "salary" => card.salary.clone(),
            "age" => card.age_text.clone(),
            _ => None,
        };
        value.ok_or_else(|| not_found(id))
    }

    async fn click(&self, element: &ElementHandle) -> Result<()> {
        let Some(i) = card_index(element.id()) else {
            return Err(not_found(element.id()));
        };
        if self.cards[i].click_intercepted {
            return Err(WebDriverError::ClickIntercepted(element.id().to_string()));
        }
        self.state.lock().unwrap().active = Some(i);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeFactory {
    cards: Vec<FakeCard>,
    fail_open: bool,
    pub closed: Arc<AtomicBool>,
}

impl FakeFactory {
    pub fn new(cards: Vec<FakeCard>) -> Self {
        Self {
            cards,
            fail_open: false,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn failing() -> Self {
        Self {
            cards: Vec::new(),
            fail_open: true,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait]
impl SessionFactory for FakeFactory {
    async fn open(&self) -> Result<Box<dyn BrowserSession>> {
        if self.fail_open {
            return Err(WebDriverError::Api {
                code: "session not created".to_string(),
                message: "driver unavailable".to_string(),
            });
        }
        let stale_remaining = self.cards.iter().map(|c| c.stale_description_reads).collect();
        Ok(Box::new(FakeSession {
            cards: self.cards.clone(),
            state: Mutex::new(State {
                active: None,
                stale_remaining,
            }),
            closed: self.closed.clone(),
        }))
    }
}

pub fn test_config() -> ScraperConfig {
    ScraperConfig {
        listing_url: "https://jobs.example.test/listings".to_string(),
        collection_timeout: Duration::from_millis(300),
        detail_timeout: Duration::from_millis(300),
        pace_min: Duration::from_millis(1),
        pace_max: Duration::from_millis(3),
        max_attempts: 3,
    }
}

/// Engine over a scripted session, plus the closed flag for lifecycle asserts.
pub fn engine_with(cards: Vec<FakeCard>) -> (ScrapeEngine, Arc<AtomicBool>) {
    let factory = Arc::new(FakeFactory::new(cards));
    let closed = factory.closed.clone();
    (ScrapeEngine::with_config(factory, test_config()), closed)
}

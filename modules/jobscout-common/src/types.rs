use serde::{Deserialize, Serialize};

/// Parameters for one scrape run. Immutable once the run starts.
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub query: String,
    pub location: String,
    /// Only keep postings at most this many days old. `None` or a
    /// non-positive value disables the filter.
    pub max_age_days: Option<i32>,
}

impl ScrapeRequest {
    pub fn new(query: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            location: location.into(),
            max_age_days: None,
        }
    }

    pub fn with_max_age_days(mut self, days: i32) -> Self {
        self.max_age_days = Some(days);
        self
    }

    /// The age filter is active only for positive day counts.
    pub fn age_limit(&self) -> Option<i32> {
        self.max_age_days.filter(|d| *d > 0)
    }
}

/// One extracted job posting. Every field is independently optional: a
/// failed read of one field never invalidates the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub salary: Option<String>,
}

/// Final result of a scrape. `complete = false` means the run was aborted
/// before exhausting the discovered entries; the postings collected up to
/// that point are still returned in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeOutcome {
    pub postings: Vec<JobPosting>,
    pub complete: bool,
}

impl ScrapeOutcome {
    pub fn empty_incomplete() -> Self {
        Self {
            postings: Vec::new(),
            complete: false,
        }
    }
}

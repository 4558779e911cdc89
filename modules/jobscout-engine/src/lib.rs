mod engine;
mod error;
mod fields;
mod item;
pub mod locators;
mod pacing;

pub use engine::{JobScraper, ScrapeEngine, ScraperConfig};
pub use error::ScrapeError;

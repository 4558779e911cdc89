use std::env;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Postgres
    pub database_url: String,

    // Remote WebDriver endpoint (chromedriver / selenium-server)
    pub webdriver_url: String,

    // Web server
    pub api_host: String,
    pub api_port: u16,

    /// Wall-clock budget for one scrape request, in seconds.
    pub scrape_budget_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            database_url: required_env("DATABASE_URL"),
            webdriver_url: env::var("WEBDRIVER_URL")
                .unwrap_or_else(|_| "http://localhost:4444".to_string()),
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("API_PORT must be a number"),
            scrape_budget_secs: env::var("SCRAPE_BUDGET_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .expect("SCRAPE_BUDGET_SECS must be a number"),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

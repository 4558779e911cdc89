/// Result type alias for WebDriver operations.
pub type Result<T> = std::result::Result<T, WebDriverError>;

/// Failure kinds the scrape engine must tell apart. The first four map to
/// W3C WebDriver error codes; the rest are transport/protocol problems.
#[derive(Debug, thiserror::Error)]
pub enum WebDriverError {
    #[error("No such element: {0}")]
    NotFound(String),

    #[error("Stale element reference: {0}")]
    StaleElement(String),

    #[error("Interaction blocked: {0}")]
    ClickIntercepted(String),

    #[error("Timed out waiting for: {0}")]
    Timeout(String),

    #[error("WebDriver error `{code}`: {message}")]
    Api { code: String, message: String },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed WebDriver response: {0}")]
    Protocol(String),
}

impl WebDriverError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, WebDriverError::NotFound(_))
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, WebDriverError::StaleElement(_))
    }

    pub fn is_click_intercepted(&self) -> bool {
        matches!(self, WebDriverError::ClickIntercepted(_))
    }
}

/// Map a W3C error code string to a typed error.
pub(crate) fn classify(code: &str, message: String) -> WebDriverError {
    match code {
        "no such element" => WebDriverError::NotFound(message),
        "stale element reference" => WebDriverError::StaleElement(message),
        "element click intercepted" | "element not interactable" => {
            WebDriverError::ClickIntercepted(message)
        }
        "timeout" | "script timeout" => WebDriverError::Timeout(message),
        _ => WebDriverError::Api {
            code: code.to_string(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_w3c_error_codes() {
        assert!(classify("no such element", String::new()).is_not_found());
        assert!(classify("stale element reference", String::new()).is_stale());
        assert!(classify("element click intercepted", String::new()).is_click_intercepted());
        assert!(classify("element not interactable", String::new()).is_click_intercepted());
        assert!(matches!(
            classify("timeout", String::new()),
            WebDriverError::Timeout(_)
        ));
        assert!(matches!(
            classify("invalid session id", String::new()),
            WebDriverError::Api { .. }
        ));
    }
}

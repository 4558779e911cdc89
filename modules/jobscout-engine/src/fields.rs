//! Per-field extraction helpers. Each field is an independent attempt: an
//! element that isn't there yields `None` and leaves sibling fields alone.
//! Stale handles and other unexpected driver failures propagate so the item
//! processor can spend a retry on them.

use tracing::debug;
use webdriver_client::{BrowserSession, ElementHandle, WebDriverError};

use crate::locators;

/// Read the text of a sub-element of `scope`. Absence is `Ok(None)`.
pub(crate) async fn scoped_text(
    session: &dyn BrowserSession,
    scope: &ElementHandle,
    locator: &str,
    field: &str,
) -> Result<Option<String>, WebDriverError> {
    match session.find_in(scope, locator).await {
        Ok(element) => read_text(session, &element, field).await,
        Err(e) if e.is_not_found() => {
            debug!(field, "Field element not present");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Read the text of a page-level element. Absence is `Ok(None)`.
pub(crate) async fn page_text(
    session: &dyn BrowserSession,
    locator: &str,
    field: &str,
) -> Result<Option<String>, WebDriverError> {
    match session.find_one(locator).await {
        Ok(element) => read_text(session, &element, field).await,
        Err(e) if e.is_not_found() => {
            debug!(field, "Field element not present");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

async fn read_text(
    session: &dyn BrowserSession,
    element: &ElementHandle,
    field: &str,
) -> Result<Option<String>, WebDriverError> {
    match session.text(element).await {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.is_not_found() => {
            debug!(field, "Field text not readable");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Salary lives in a span inside the detail pane's salary container and is
/// only accepted when it reads as an amount.
pub(crate) async fn salary(
    session: &dyn BrowserSession,
) -> Result<Option<String>, WebDriverError> {
    let container = match session.find_one(locators::DETAIL_SALARY_CONTAINER).await {
        Ok(c) => c,
        Err(e) if e.is_not_found() => return Ok(None),
        Err(e) => return Err(e),
    };
    let text = match session.find_in(&container, locators::INNER_SPAN).await {
        Ok(span) => read_text(session, &span, "salary").await?,
        Err(e) if e.is_not_found() => None,
        Err(e) => return Err(e),
    };
    Ok(text.as_deref().and_then(accept_salary))
}

/// Validity predicate for the salary field: must start with a currency
/// marker, otherwise the container held job-type text instead.
pub(crate) fn accept_salary(text: &str) -> Option<String> {
    text.starts_with('$').then(|| text.to_string())
}

/// "Posted N days ago" → N. Absent or unparsable text is `None`; the age
/// filter fails open on it.
pub(crate) async fn posted_days_ago(
    session: &dyn BrowserSession,
    entry: &ElementHandle,
) -> Result<Option<i32>, WebDriverError> {
    let text = scoped_text(session, entry, locators::CARD_POSTING_AGE, "posting age").await?;
    Ok(text.as_deref().and_then(leading_digits))
}

/// First contiguous run of ASCII digits anywhere in the string.
pub(crate) fn leading_digits(text: &str) -> Option<i32> {
    let run: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    run.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_day_count_from_posting_age_text() {
        assert_eq!(leading_digits("Posted 10 days ago"), Some(10));
        assert_eq!(leading_digits("Active 3 days ago"), Some(3));
        assert_eq!(leading_digits("Posted 30+ days ago"), Some(30));
        assert_eq!(leading_digits("Just posted"), None);
        assert_eq!(leading_digits(""), None);
    }

    #[test]
    fn takes_only_the_first_digit_run() {
        assert_eq!(leading_digits("3 of 10 days"), Some(3));
    }

    #[test]
    fn salary_must_start_with_currency_marker() {
        assert_eq!(
            accept_salary("$55,000 a year"),
            Some("$55,000 a year".to_string())
        );
        assert_eq!(accept_salary("Full-time"), None);
        assert_eq!(accept_salary("Up to $20 an hour"), None);
    }
}

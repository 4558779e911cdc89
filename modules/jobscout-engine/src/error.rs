/// The engine never fails outright on a bad page: field failures narrow the
/// record, item failures consume retries, page failures degrade the outcome
/// to `complete = false`. Cancellation is the one caller-visible error and
/// must never be conflated with a partial result.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("Scrape cancelled")]
    Cancelled,
}

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use jobscout_common::{JobPosting, ScrapeRequest};
use jobscout_engine::ScrapeError;

use crate::AppState;

// Defaults applied to omitted request fields.
pub const DEFAULT_QUERY: &str = "Cannabis";
pub const DEFAULT_LOCATION: &str = "California";
pub const DEFAULT_LAST_NDAYS: i32 = -1;

pub const FULL_SCRAPE_MESSAGE: &str = "Full page scraped.";
pub const PARTIAL_SCRAPE_MESSAGE: &str =
    "Some job posts may be missing due to an exception hit while scraping.";
pub const CACHED_QUERY_MESSAGE: &str = "Query Retrieved";
pub const TIMEOUT_MESSAGE: &str = "The scraping operation timed out.";
pub const UNKNOWN_ID_MESSAGE: &str = "Query ID not found in database.";

/// Sentinel returned when the cache write failed.
pub const DEGRADED_QUERY_ID: i64 = -1;

const ALLOWED_FIELDS: [&str; 3] = ["query", "location", "lastndays"];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeParams {
    pub query: Option<String>,
    pub location: Option<String>,
    pub last_ndays: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryMetadata {
    pub query_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub metadata: QueryMetadata,
    pub results: Vec<JobPosting>,
    pub message: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/scrape/{source}", post(scrape_jobs))
        .route("/scrape/{source}/{query_id}", get(cached_query))
        .with_state(state)
}

/// Reject bodies carrying fields we don't recognize, then bind the rest.
fn parse_params(body: &Value) -> Result<ScrapeParams, String> {
    match body {
        Value::Null => Ok(ScrapeParams::default()),
        Value::Object(map) => {
            for key in map.keys() {
                if !ALLOWED_FIELDS.contains(&key.to_ascii_lowercase().as_str()) {
                    return Err(format!("Invalid parameter: {key}"));
                }
            }
            serde_json::from_value(body.clone())
                .map_err(|e| format!("Invalid request body: {e}"))
        }
        _ => Err("Request body must be a JSON object".to_string()),
    }
}

async fn scrape_jobs(
    State(state): State<Arc<AppState>>,
    Path(source): Path<String>,
    body: Option<Json<Value>>,
) -> impl IntoResponse {
    let body = body.map(|Json(value)| value).unwrap_or(Value::Null);
    let params = match parse_params(&body) {
        Ok(params) => params,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response();
        }
    };

    let request = ScrapeRequest {
        query: params.query.unwrap_or_else(|| DEFAULT_QUERY.to_string()),
        location: params
            .location
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
        max_age_days: Some(params.last_ndays.unwrap_or(DEFAULT_LAST_NDAYS)),
    };

    info!(%source, query = %request.query, location = %request.location, "Scrape requested");

    let cancel = CancellationToken::new();
    let scrape = state.scraper.scrape(&request, cancel.clone());
    tokio::pin!(scrape);

    let result = tokio::select! {
        result = &mut scrape => result,
        _ = tokio::time::sleep(state.budget) => {
            // Budget exhausted: cancel, then drain the future so the
            // browser session closes before we answer.
            cancel.cancel();
            scrape.await
        }
    };

    match result {
        Ok(outcome) => {
            let query_id = state
                .store
                .save(&outcome.postings)
                .await
                .unwrap_or(DEGRADED_QUERY_ID);
            let message = if outcome.complete {
                FULL_SCRAPE_MESSAGE
            } else {
                PARTIAL_SCRAPE_MESSAGE
            };
            let response = QueryResponse {
                metadata: QueryMetadata { query_id },
                results: outcome.postings,
                message: message.to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(ScrapeError::Cancelled) => (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({ "error": TIMEOUT_MESSAGE })),
        )
            .into_response(),
    }
}

async fn cached_query(
    State(state): State<Arc<AppState>>,
    Path((_source, query_id)): Path<(String, i64)>,
) -> impl IntoResponse {
    match state.store.load(query_id).await {
        Ok(Some(postings)) => {
            let response = QueryResponse {
                metadata: QueryMetadata { query_id },
                results: postings,
                message: CACHED_QUERY_MESSAGE.to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": UNKNOWN_ID_MESSAGE })),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, query_id, "Failed to load cached query");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "An error occurred" })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_bind_camel_case_fields() {
        let body = json!({ "query": "farm", "location": "Idaho", "lastNdays": 7 });
        let params = parse_params(&body).unwrap();
        assert_eq!(params.query.as_deref(), Some("farm"));
        assert_eq!(params.location.as_deref(), Some("Idaho"));
        assert_eq!(params.last_ndays, Some(7));
    }

    #[test]
    fn unknown_field_is_rejected_by_name() {
        let body = json!({ "query": "farm", "radius": 10 });
        let err = parse_params(&body).unwrap_err();
        assert!(err.contains("radius"));
    }

    #[test]
    fn missing_body_binds_to_defaults() {
        let params = parse_params(&Value::Null).unwrap();
        assert!(params.query.is_none());
        assert!(params.location.is_none());
        assert!(params.last_ndays.is_none());
    }
}

// Postgres cache of scraped result sets, keyed by a generated integer id.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;

use jobscout_common::JobPosting;

#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Best-effort write; `None` when the insert fails. A failed cache
    /// write degrades the response's query id, never the response itself.
    async fn save(&self, postings: &[JobPosting]) -> Option<i64>;

    async fn load(&self, id: i64) -> Result<Option<Vec<JobPosting>>, sqlx::Error>;
}

pub struct PgResultStore {
    pool: PgPool,
}

impl PgResultStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the embedded SQL migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl ResultStore for PgResultStore {
    async fn save(&self, postings: &[JobPosting]) -> Option<i64> {
        let results = match serde_json::to_value(postings) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Failed to serialize postings for caching");
                return None;
            }
        };

        let row = sqlx::query_scalar::<_, i64>(
            "INSERT INTO job_post_queries (results) VALUES ($1) RETURNING id",
        )
        .bind(&results)
        .fetch_one(&self.pool)
        .await;

        match row {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(error = %e, "Failed to cache scrape results");
                None
            }
        }
    }

    async fn load(&self, id: i64) -> Result<Option<Vec<JobPosting>>, sqlx::Error> {
        let row: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT results FROM job_post_queries WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|value| {
            serde_json::from_value(value).map_err(|e| sqlx::Error::Decode(Box::new(e)))
        })
        .transpose()
    }
}

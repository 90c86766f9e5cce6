use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::{info_span, Instrument};

use crate::auth::{StoreError, TokenRevocationStore};

/// [`TokenRevocationStore`] backed by the `revoked_tokens` table.
#[derive(Clone, Debug)]
pub struct PgRevocationStore {
    pool: PgPool,
}

impl PgRevocationStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRevocationStore for PgRevocationStore {
    async fn mark_revoked(&self, token_id: &str, expires_at: i64) -> Result<(), StoreError> {
        let query = r"
            INSERT INTO revoked_tokens (token_id, expires_at)
            VALUES ($1, to_timestamp($2::double precision))
            ON CONFLICT (token_id) DO NOTHING
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(token_id)
            .bind(expires_at)
            .execute(&self.pool)
            .instrument(span)
            .await?;
        Ok(())
    }

    async fn is_revoked(&self, token_id: &str) -> Result<bool, StoreError> {
        let query =
            "SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE token_id = $1) AS revoked";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(token_id)
            .fetch_one(&self.pool)
            .instrument(span)
            .await?;
        Ok(row.try_get("revoked")?)
    }
}

use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use super::is_unique_violation;
use crate::auth::{password, PartialUser, StoreError, User, UserStore};

/// [`UserStore`] backed by the `users` table.
#[derive(Clone, Debug)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Shared WHERE clause: every bound filter field must match, unset ones are NULL.
const FILTER_CLAUSE: &str = r"
    ($1::uuid IS NULL OR id = $1)
    AND ($2::bigint IS NULL OR legacy_id = $2)
    AND ($3::text IS NULL OR username = $3)
    AND ($4::text IS NULL OR password_hash = $4)
";

/// Bindable form of a filter. `None` when the filter cannot match any row.
struct FilterBinds {
    id: Option<Uuid>,
    legacy_id: Option<i64>,
    username: Option<String>,
    password_hash: Option<String>,
}

impl FilterBinds {
    fn from_partial(filter: &PartialUser) -> Option<Self> {
        if filter.is_empty() {
            return None;
        }
        let id = match &filter.id {
            Some(raw) => Some(Uuid::parse_str(raw).ok()?),
            None => None,
        };
        Some(Self {
            id,
            legacy_id: filter.legacy_id,
            username: filter.username.clone(),
            password_hash: filter.password.clone(),
        })
    }
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    let id: Uuid = row.try_get("id")?;
    Ok(User {
        id: id.to_string(),
        legacy_id: row.try_get("legacy_id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
    })
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, username: &str, password_hash: &str) -> Result<(), StoreError> {
        let query = "INSERT INTO users (username, password_hash) VALUES ($1, $2)";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        match sqlx::query(query)
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .instrument(span)
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(StoreError::DuplicateUsername),
            Err(err) => Err(err.into()),
        }
    }

    async fn fetch_and_verify(&self, username: &str, password: &str) -> Result<User, StoreError> {
        let query = "SELECT id, legacy_id, username, password_hash FROM users WHERE username = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?
            .ok_or(StoreError::UserNotFound)?;

        let user = user_from_row(&row)?;

        if password::verify(password, &user.password_hash).await {
            Ok(user)
        } else {
            Err(StoreError::InvalidCredentials)
        }
    }

    async fn update(&self, filter: &PartialUser, patch: &PartialUser) -> Result<User, StoreError> {
        let binds = FilterBinds::from_partial(filter).ok_or(StoreError::UserNotFound)?;

        let query = format!(
            r"
            WITH target AS (
                SELECT id FROM users WHERE {FILTER_CLAUSE}
                ORDER BY id LIMIT 1 FOR UPDATE
            )
            UPDATE users u SET
                legacy_id = COALESCE($5::bigint, u.legacy_id),
                username = COALESCE($6::text, u.username),
                password_hash = COALESCE($7::text, u.password_hash),
                updated_at = NOW()
            FROM target
            WHERE u.id = target.id
            RETURNING u.id, u.legacy_id, u.username, u.password_hash
            "
        );
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query.as_str()
        );
        let result = sqlx::query(&query)
            .bind(binds.id)
            .bind(binds.legacy_id)
            .bind(binds.username)
            .bind(binds.password_hash)
            .bind(patch.legacy_id)
            .bind(patch.username.as_deref())
            .bind(patch.password.as_deref())
            .fetch_optional(&self.pool)
            .instrument(span)
            .await;

        match result {
            Ok(Some(row)) => Ok(user_from_row(&row)?),
            Ok(None) => Err(StoreError::UserNotFound),
            Err(err) if is_unique_violation(&err) => Err(StoreError::DuplicateUsername),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, identity: &PartialUser) -> Result<(), StoreError> {
        let binds = FilterBinds::from_partial(identity).ok_or(StoreError::UserNotFound)?;

        let query = format!(
            r"
            WITH target AS (
                SELECT id FROM users WHERE {FILTER_CLAUSE}
                ORDER BY id LIMIT 1
            )
            DELETE FROM users u USING target WHERE u.id = target.id
            "
        );
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query.as_str()
        );
        let result = sqlx::query(&query)
            .bind(binds.id)
            .bind(binds.legacy_id)
            .bind(binds.username)
            .bind(binds.password_hash)
            .execute(&self.pool)
            .instrument(span)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::UserNotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_has_no_binds() {
        assert!(FilterBinds::from_partial(&PartialUser::default()).is_none());
    }

    #[test]
    fn malformed_id_cannot_match() {
        assert!(FilterBinds::from_partial(&PartialUser::with_id("not-a-uuid")).is_none());
    }

    #[test]
    fn filter_binds_keep_set_fields() {
        let id = Uuid::new_v4();
        let binds = FilterBinds::from_partial(&PartialUser {
            id: Some(id.to_string()),
            legacy_id: Some(3),
            username: Some("alice".to_string()),
            password: None,
        });
        let binds = binds.expect("filter should bind");
        assert_eq!(binds.id, Some(id));
        assert_eq!(binds.legacy_id, Some(3));
        assert_eq!(binds.username.as_deref(), Some("alice"));
        assert!(binds.password_hash.is_none());
    }
}

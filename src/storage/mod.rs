//! PostgreSQL backends for the auth store capabilities.
//!
//! The schema lives in `sql/schema.sql`. `users.username` carries a unique
//! index; inserts that violate it surface as
//! [`crate::auth::StoreError::DuplicateUsername`].

mod revocations;
mod users;

pub use revocations::PgRevocationStore;
pub use users::PgUserStore;

use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

pub const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

/// Open a connection pool.
///
/// # Errors
/// Returns an error if the database cannot be reached.
pub async fn connect(dsn: &str, max_connections: u32) -> Result<PgPool> {
    PgPoolOptions::new()
        .min_connections(1)
        .max_connections(max_connections)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(dsn)
        .await
        .context("Failed to connect to database")
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

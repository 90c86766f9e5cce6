use crate::{
    api,
    auth::{
        AuthConfig, AuthCore, MemoryRevocationStore, MemoryUserStore, TokenRevocationStore,
        UserStore,
    },
    storage::{self, PgRevocationStore, PgUserStore},
};
use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use url::Url;

pub struct Args {
    pub port: u16,
    pub dsn: Option<String>,
    pub db_max_connections: u32,
    pub auth_config: AuthConfig,
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("port", &self.port)
            .field("dsn", &self.dsn.as_deref().map(redact_dsn))
            .field("db_max_connections", &self.db_max_connections)
            .field("auth_config", &self.auth_config)
            .finish()
    }
}

/// Mask the password part of a DSN for logging.
fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut url) => {
            if url.password().is_some() {
                // set_password only fails for URLs that cannot carry credentials
                let _ = url.set_password(Some("***"));
            }
            url.to_string()
        }
        Err(_) => "***".to_string(),
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database cannot be reached, the schema cannot be
/// applied, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!("Server args: {:?}", args);

    let (users, revocations, pool) = match &args.dsn {
        Some(dsn) => {
            let pool = storage::connect(dsn, args.db_max_connections).await?;
            apply_schema(&pool).await?;
            let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
            let revocations: Arc<dyn TokenRevocationStore> =
                Arc::new(PgRevocationStore::new(pool.clone()));
            (users, revocations, Some(pool))
        }
        None => {
            warn!("No --dsn given, users and revoked tokens are kept in memory");
            let users: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
            let revocations: Arc<dyn TokenRevocationStore> =
                Arc::new(MemoryRevocationStore::new());
            (users, revocations, None)
        }
    };

    let core = Arc::new(AuthCore::new(users, revocations, &args.auth_config));

    info!("Storage backend: {}", if pool.is_some() { "postgresql" } else { "memory" });

    api::new(args.port, core, pool).await
}

async fn apply_schema(pool: &PgPool) -> Result<()> {
    let span = info_span!("db.migrate", db.system = "postgresql");
    sqlx::raw_sql(storage::SCHEMA_SQL)
        .execute(pool)
        .instrument(span)
        .await
        .context("Failed to apply database schema")?;
    Ok(())
}

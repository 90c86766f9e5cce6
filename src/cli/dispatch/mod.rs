//! Map parsed CLI arguments to an [`Action`].

use crate::auth::AuthConfig;
use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{auth, ARG_DB_MAX_CONNECTIONS, ARG_DSN, ARG_PORT};
use anyhow::{anyhow, Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if the signing key is missing or too short.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .filter(|dsn| !dsn.trim().is_empty());
    let db_max_connections = matches
        .get_one::<u32>(ARG_DB_MAX_CONNECTIONS)
        .copied()
        .unwrap_or(5);

    let auth_opts = auth::Options::parse(matches)?;
    let auth_config = AuthConfig::new(auth_opts.jwt_secret);
    auth_config
        .validate()
        .map_err(|e| anyhow!(e))
        .context("invalid --jwt-secret")?;

    Ok(Action::Server(Args {
        port,
        dsn,
        db_max_connections,
        auth_config,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn matches_with(vars: [(&str, Option<&str>); 4]) -> clap::ArgMatches {
        temp_env::with_vars(vars, || {
            crate::cli::commands::new().get_matches_from(vec!["sesame"])
        })
    }

    #[test]
    fn builds_server_action() -> Result<()> {
        let matches = matches_with([
            ("SESAME_JWT_SECRET", Some(SECRET)),
            ("SESAME_DSN", Some("postgres://localhost/sesame")),
            ("SESAME_PORT", Some("9000")),
            ("SESAME_DB_MAX_CONNECTIONS", None),
        ]);
        let Action::Server(args) = handler(&matches)?;
        assert_eq!(args.port, 9000);
        assert_eq!(args.dsn.as_deref(), Some("postgres://localhost/sesame"));
        assert_eq!(args.db_max_connections, 5);
        Ok(())
    }

    #[test]
    fn blank_dsn_means_memory() -> Result<()> {
        let matches = matches_with([
            ("SESAME_JWT_SECRET", Some(SECRET)),
            ("SESAME_DSN", Some("  ")),
            ("SESAME_PORT", None),
            ("SESAME_DB_MAX_CONNECTIONS", None),
        ]);
        let Action::Server(args) = handler(&matches)?;
        assert!(args.dsn.is_none());
        Ok(())
    }

    #[test]
    fn short_secret_is_rejected() {
        let matches = matches_with([
            ("SESAME_JWT_SECRET", Some("short")),
            ("SESAME_DSN", None),
            ("SESAME_PORT", None),
            ("SESAME_DB_MAX_CONNECTIONS", None),
        ]);
        let result = handler(&matches);
        assert!(result.is_err());
        if let Err(err) = result {
            assert!(format!("{err:#}").contains("invalid --jwt-secret"));
            assert!(!format!("{err:#}").contains("short"));
        }
    }
}

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_JWT_SECRET: &str = "jwt-secret";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_JWT_SECRET)
            .long(ARG_JWT_SECRET)
            .help("HMAC key used to sign session tokens (at least 32 bytes)")
            .env("SESAME_JWT_SECRET")
            .hide_env_values(true)
            .required(true),
    )
}

pub struct Options {
    pub jwt_secret: SecretString,
}

impl Options {
    /// # Errors
    /// Returns an error if the signing key is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let jwt_secret = matches
            .get_one::<String>(ARG_JWT_SECRET)
            .cloned()
            .context("missing required argument: --jwt-secret")?;

        Ok(Self {
            jwt_secret: SecretString::from(jwt_secret),
        })
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("jwt_secret", &"***")
            .finish()
    }
}

//! # Sesame (credential and session token service)
//!
//! `sesame` registers users, checks their passwords and hands out signed,
//! time-bounded session tokens that can be revoked before they expire.
//!
//! ## Tokens
//!
//! A session token is an HS256-signed JWT carrying the user record, a unique
//! `jti` and an expiry 24 hours after issue. Verification checks the signature,
//! the expiry and the revocation ledger; any failure reads the same to callers.
//!
//! ## Storage
//!
//! Users and revoked token ids live in PostgreSQL (`--dsn`). Without a DSN the
//! server falls back to in-memory stores, which lose everything on restart.
//!
//! ## Passwords
//!
//! Passwords are bcrypt-hashed (cost 8) before they are stored. Profile updates
//! and account deletion revoke the caller's token so a fresh sign-in is required.

pub mod api;
pub mod auth;
pub mod cli;
pub mod storage;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

//! Session management for the bearer token.
//!
//! `Session` holds the one token a client instance authenticates with. It can
//! live in memory or be persisted to `session.json` in the cache directory,
//! playing the part a browser cookie plays for a web frontend.

pub mod session;

pub use session::{Session, SessionData, SessionError};

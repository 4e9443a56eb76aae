//! User directory for privasee.
//!
//! Records are assigned to users managed by Auth0. This crate lists those
//! users through the Auth0 Management API so the frontend never has to hold
//! a management token.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │   Gateway        │────▶│  UserDirectory   │
//! │   /api/users     │     │  (trait)         │
//! └──────────────────┘     └────────┬─────────┘
//!                                   │
//!                 ┌─────────────────┴──────────────┐
//!        ┌────────▼─────────┐             ┌────────▼─────────┐
//!        │  Auth0Directory  │             │  StaticDirectory │
//!        │  (TTL cache)     │             │  (local runs)    │
//!        └────────┬─────────┘             └──────────────────┘
//!                 │ HTTPS
//!        ┌────────▼─────────┐
//!        │  Auth0 /api/v2   │
//!        └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use privasee_identity::{Auth0Config, Auth0Directory, UserDirectory};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let directory = Auth0Directory::new(Auth0Config {
//!     domain: "privasee.eu.auth0.com".to_string(),
//!     api_token: "management-api-token".to_string(),
//!     cache_ttl_seconds: 60,
//! })?;
//!
//! for user in directory.list_users().await? {
//!     println!("{} {:?}", user.user_id, user.email);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::time::Duration;

pub mod auth0;
pub mod directory;
pub mod error;

pub use auth0::Auth0Directory;
pub use directory::{DirectoryUser, StaticDirectory, UserDirectory};
pub use error::{IdentityError, Result};

/// Configuration for the Auth0 Management API.
#[derive(Clone)]
pub struct Auth0Config {
    /// Tenant domain (e.g. `privasee.eu.auth0.com`). A value with an
    /// `http://` or `https://` scheme is used as the base URL unchanged.
    pub domain: String,
    /// Management API access token.
    pub api_token: String,
    /// How long a fetched user list is served from cache, in seconds.
    pub cache_ttl_seconds: u64,
}

impl Auth0Config {
    /// Base URL of the tenant.
    #[must_use]
    pub fn base_url(&self) -> String {
        let domain = self.domain.trim_end_matches('/');
        if domain.starts_with("http://") || domain.starts_with("https://") {
            domain.to_string()
        } else {
            format!("https://{domain}")
        }
    }

    /// Get the users endpoint URL.
    #[must_use]
    pub fn users_url(&self) -> String {
        format!("{}/api/v2/users", self.base_url())
    }

    /// Get the cache lifetime as a `Duration`.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}

impl std::fmt::Debug for Auth0Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth0Config")
            .field("domain", &self.domain)
            .field("api_token", &"<redacted>")
            .field("cache_ttl_seconds", &self.cache_ttl_seconds)
            .finish()
    }
}

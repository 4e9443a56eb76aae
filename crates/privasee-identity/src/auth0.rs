//! Auth0 Management API directory.
//!
//! Lists users from `GET https://{domain}/api/v2/users` with a management
//! API token and caches the result for a short time.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;

use crate::directory::{DirectoryUser, UserDirectory};
use crate::error::{IdentityError, Result};

/// Users requested per page.
const PAGE_SIZE: usize = 100;

/// Auth0 returns at most this many users through paging.
const MAX_PAGES: usize = 10;

/// Error body returned by the Management API.
#[derive(Debug, Deserialize)]
struct Auth0ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "errorCode")]
    error_code: Option<String>,
}

struct CachedUsers {
    users: Vec<DirectoryUser>,
    fetched_at: Instant,
}

/// Directory backed by the Auth0 Management API.
pub struct Auth0Directory {
    config: crate::Auth0Config,
    client: reqwest::Client,
    cache: RwLock<Option<CachedUsers>>,
}

impl Auth0Directory {
    /// Create a directory client.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Unavailable` if the HTTP client cannot be built.
    pub fn new(config: crate::Auth0Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| IdentityError::Unavailable(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            client,
            cache: RwLock::new(None),
        })
    }

    fn cached(&self) -> Option<Vec<DirectoryUser>> {
        let ttl = self.config.cache_ttl();
        let cache = self.cache.read();
        cache
            .as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < ttl)
            .map(|cached| cached.users.clone())
    }

    async fn fetch_page(&self, page: usize) -> Result<Vec<DirectoryUser>> {
        let url = self.config.users_url();
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.api_token)
            .query(&[("page", page), ("per_page", PAGE_SIZE)])
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| IdentityError::Malformed(format!("invalid users response: {e}")));
        }

        let body: Option<Auth0ErrorResponse> = response.json().await.ok();
        let message = body
            .and_then(|b| b.message.or(b.error_code))
            .unwrap_or_else(|| format!("HTTP {status}"));

        tracing::error!(status = %status, error = %message, "Auth0 users request failed");

        match status.as_u16() {
            401 | 403 => Err(IdentityError::Unauthorized(message)),
            429 => Err(IdentityError::RateLimited),
            _ => Err(IdentityError::Unavailable(message)),
        }
    }

    async fn fetch_users(&self) -> Result<Vec<DirectoryUser>> {
        let mut users = Vec::new();
        for page in 0..MAX_PAGES {
            let batch = self.fetch_page(page).await?;
            let last = batch.len() < PAGE_SIZE;
            users.extend(batch);
            if last {
                break;
            }
        }
        Ok(users)
    }
}

#[async_trait]
impl UserDirectory for Auth0Directory {
    async fn list_users(&self) -> Result<Vec<DirectoryUser>> {
        if let Some(users) = self.cached() {
            return Ok(users);
        }

        tracing::debug!(domain = %self.config.domain, "Fetching Auth0 users");
        let users = self.fetch_users().await?;
        tracing::debug!(count = users.len(), "Cached Auth0 users");

        *self.cache.write() = Some(CachedUsers {
            users: users.clone(),
            fetched_at: Instant::now(),
        });
        Ok(users)
    }
}

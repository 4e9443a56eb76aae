//! Gateway configuration types.
//!
//! Settings come from command-line flags with environment fallbacks
//! ([`Cli`]) and are split into the per-crate configuration structs.

use std::time::Duration;

use clap::Parser;
use privasee_identity::Auth0Config;
use privasee_store::AirtableConfig;
use serde::Deserialize;
use thiserror::Error;

/// Configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Listen address (e.g., "0.0.0.0:3001").
    #[serde(default = "GatewayConfig::default_listen_addr")]
    pub listen_addr: String,

    /// Allowed CORS origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    #[serde(default = "GatewayConfig::default_max_body")]
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    #[serde(default = "GatewayConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Company name stamped on new records that carry none.
    #[serde(default = "GatewayConfig::default_company_name")]
    pub company_name: String,

    /// Company id stamped on new records that carry none.
    #[serde(default)]
    pub company_id: u64,
}

impl GatewayConfig {
    fn default_listen_addr() -> String {
        "0.0.0.0:3001".to_string()
    }

    const fn default_max_body() -> usize {
        1024 * 1024 // 1 MB
    }

    const fn default_request_timeout() -> u64 {
        30
    }

    fn default_company_name() -> String {
        "Test Company".to_string()
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: Self::default_listen_addr(),
            cors_origins: vec!["*".to_string()],
            max_body_bytes: Self::default_max_body(),
            request_timeout_seconds: Self::default_request_timeout(),
            company_name: Self::default_company_name(),
            company_id: 0,
        }
    }
}

/// Errors in the startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting is absent.
    #[error("missing required setting {0} (or pass --in-memory)")]
    Missing(&'static str),
}

/// Privasee records API server.
#[derive(Parser, Debug)]
#[command(name = "privasee-gateway")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Address to listen on.
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:3001")]
    pub listen_addr: String,

    /// Allowed CORS origins, comma separated. `*` allows any origin.
    #[arg(long, env = "CORS_ORIGINS", default_value = "*", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    #[arg(long, env = "MAX_BODY_BYTES", default_value_t = 1024 * 1024)]
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    #[arg(long, env = "REQUEST_TIMEOUT_SECONDS", default_value_t = 30)]
    pub request_timeout_seconds: u64,

    /// Airtable API key.
    #[arg(long, env = "AIRTABLE_API_KEY", hide_env_values = true)]
    pub airtable_api_key: Option<String>,

    /// Airtable base id.
    #[arg(long, env = "AIRTABLE_BASE_ID")]
    pub airtable_base_id: Option<String>,

    /// Airtable table name.
    #[arg(long, env = "AIRTABLE_TABLE", default_value = "questions_answers")]
    pub airtable_table: String,

    /// Airtable API root.
    #[arg(long, env = "AIRTABLE_API_URL", default_value = "https://api.airtable.com/v0")]
    pub airtable_api_url: String,

    /// Timeout for each Airtable request, in seconds.
    #[arg(long, env = "AIRTABLE_TIMEOUT_SECONDS", default_value_t = 30)]
    pub airtable_timeout_seconds: u64,

    /// Auth0 tenant domain.
    #[arg(long, env = "AUTH0_DOMAIN")]
    pub auth0_domain: Option<String>,

    /// Auth0 Management API token.
    #[arg(long, env = "AUTH0_API_ACCESS_TOKEN", hide_env_values = true)]
    pub auth0_api_token: Option<String>,

    /// How long the user list is cached, in seconds.
    #[arg(long, env = "AUTH0_CACHE_TTL_SECONDS", default_value_t = 60)]
    pub auth0_cache_ttl_seconds: u64,

    /// Company name for new records.
    #[arg(long, env = "COMPANY_NAME", default_value = "Test Company")]
    pub company_name: String,

    /// Company id for new records.
    #[arg(long, env = "COMPANY_ID", default_value_t = 0)]
    pub company_id: u64,

    /// Keep records in memory instead of Airtable.
    #[arg(long, env = "IN_MEMORY")]
    pub in_memory: bool,
}

impl Cli {
    /// HTTP server settings.
    #[must_use]
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            listen_addr: self.listen_addr.clone(),
            cors_origins: self
                .cors_origins
                .iter()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
            company_name: self.company_name.clone(),
            company_id: self.company_id,
        }
    }

    /// Airtable settings, or `None` when running in memory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if credentials are absent and
    /// `--in-memory` is not set.
    pub fn airtable_config(&self) -> Result<Option<AirtableConfig>, ConfigError> {
        if self.in_memory {
            return Ok(None);
        }

        let api_key = non_empty(self.airtable_api_key.as_deref())
            .ok_or(ConfigError::Missing("AIRTABLE_API_KEY"))?;
        let base_id = non_empty(self.airtable_base_id.as_deref())
            .ok_or(ConfigError::Missing("AIRTABLE_BASE_ID"))?;

        let mut config = AirtableConfig::new(api_key, base_id);
        config.table.clone_from(&self.airtable_table);
        config.api_url.clone_from(&self.airtable_api_url);
        config.request_timeout_seconds = self.airtable_timeout_seconds;
        Ok(Some(config))
    }

    /// Auth0 settings, or `None` if either the domain or token is absent.
    #[must_use]
    pub fn auth0_config(&self) -> Option<Auth0Config> {
        let domain = non_empty(self.auth0_domain.as_deref())?;
        let api_token = non_empty(self.auth0_api_token.as_deref())?;
        Some(Auth0Config {
            domain: domain.to_string(),
            api_token: api_token.to_string(),
            cache_ttl_seconds: self.auth0_cache_ttl_seconds,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["privasee-gateway"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.listen_addr, "0.0.0.0:3001");
        assert_eq!(config.max_body_bytes, 1024 * 1024);
        assert_eq!(config.company_name, "Test Company");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn cli_splits_cors_origins() {
        let cli = parse(&[
            "--in-memory",
            "--cors-origins",
            "http://localhost:3000, https://app.privasee.io",
        ]);
        assert_eq!(
            cli.gateway_config().cors_origins,
            vec!["http://localhost:3000", "https://app.privasee.io"]
        );
    }

    #[test]
    fn in_memory_needs_no_airtable_credentials() {
        let cli = parse(&["--in-memory"]);
        assert!(cli.airtable_config().unwrap().is_none());
    }

    #[test]
    fn airtable_credentials_are_required() {
        let cli = parse(&["--airtable-api-key", "key"]);
        assert!(matches!(
            cli.airtable_config(),
            Err(ConfigError::Missing("AIRTABLE_BASE_ID"))
        ));

        let cli = parse(&[
            "--airtable-api-key",
            "key",
            "--airtable-base-id",
            "appX",
            "--airtable-table",
            "qa",
        ]);
        let config = cli.airtable_config().unwrap().unwrap();
        assert_eq!(config.base_id, "appX");
        assert_eq!(config.table, "qa");
        assert_eq!(config.api_url, "https://api.airtable.com/v0");
        assert_eq!(config.request_timeout_seconds, 30);

        let cli = parse(&[
            "--airtable-api-key",
            "key",
            "--airtable-base-id",
            "appX",
            "--airtable-timeout-seconds",
            "5",
        ]);
        let config = cli.airtable_config().unwrap().unwrap();
        assert_eq!(config.request_timeout_seconds, 5);
    }

    #[test]
    fn auth0_needs_domain_and_token() {
        assert!(parse(&["--auth0-domain", "t.auth0.com"]).auth0_config().is_none());

        let config = parse(&["--auth0-domain", "t.auth0.com", "--auth0-api-token", "tok"])
            .auth0_config()
            .unwrap();
        assert_eq!(config.users_url(), "https://t.auth0.com/api/v2/users");
        assert_eq!(config.cache_ttl_seconds, 60);
    }
}

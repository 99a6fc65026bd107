//! Token issuance and rotation configuration

use serde::{Deserialize, Serialize};

/// Signing secret used when none is configured. Refused in production.
pub const DEVELOPMENT_SIGNING_SECRET: &str = "development-secret-please-change-in-production";

/// Longest accepted token lifetime (ten years), in seconds
pub const MAX_TOKEN_TTL_SECONDS: i64 = 10 * 365 * 24 * 3600;

/// Access/refresh token policy supplied once at startup
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    /// Symmetric key for signing access tokens
    pub signing_secret: String,

    /// Access token lifetime in seconds
    pub access_token_ttl: i64,

    /// Refresh token lifetime in seconds
    pub refresh_token_ttl: i64,

    /// Issuer claim written into access tokens
    pub issuer: String,

    /// bcrypt cost factor for refresh secret hashes
    #[serde(default = "default_hash_cost")]
    pub hash_cost: u32,

    /// Refresh lookup strategy ("scan" or "fingerprint")
    #[serde(default = "default_lookup_strategy")]
    pub lookup_strategy: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            signing_secret: String::from(DEVELOPMENT_SIGNING_SECRET),
            access_token_ttl: 900,    // 15 minutes
            refresh_token_ttl: 86400, // 24 hours
            issuer: String::from("token-lifecycle"),
            hash_cost: default_hash_cost(),
            lookup_strategy: default_lookup_strategy(),
        }
    }
}

impl TokenConfig {
    /// Create a new token configuration with secret
    pub fn new(signing_secret: impl Into<String>) -> Self {
        Self {
            signing_secret: signing_secret.into(),
            ..Default::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            signing_secret: std::env::var("TOKEN_SIGNING_SECRET")
                .unwrap_or(defaults.signing_secret),
            access_token_ttl: parse_env("TOKEN_ACCESS_TTL_SECONDS", defaults.access_token_ttl),
            refresh_token_ttl: parse_env("TOKEN_REFRESH_TTL_SECONDS", defaults.refresh_token_ttl),
            issuer: std::env::var("TOKEN_ISSUER").unwrap_or(defaults.issuer),
            hash_cost: parse_env("TOKEN_HASH_COST", defaults.hash_cost),
            lookup_strategy: std::env::var("TOKEN_LOOKUP_STRATEGY")
                .unwrap_or(defaults.lookup_strategy),
        }
    }

    /// Set access token lifetime in minutes
    pub fn with_access_ttl_minutes(mut self, minutes: i64) -> Self {
        self.access_token_ttl = minutes.saturating_mul(60);
        self
    }

    /// Set refresh token lifetime in hours
    pub fn with_refresh_ttl_hours(mut self, hours: i64) -> Self {
        self.refresh_token_ttl = hours.saturating_mul(3600);
        self
    }

    /// True when both lifetimes are positive and no longer than ten years
    pub fn has_valid_lifetimes(&self) -> bool {
        let in_range = |ttl: i64| ttl > 0 && ttl <= MAX_TOKEN_TTL_SECONDS;
        in_range(self.access_token_ttl) && in_range(self.refresh_token_ttl)
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.signing_secret == DEVELOPMENT_SIGNING_SECRET
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn default_hash_cost() -> u32 {
    12
}

fn default_lookup_strategy() -> String {
    String::from("scan")
}

//! Application configuration.
//!
//! Stripe, storage, geocoding and email sections are optional. A missing
//! section disables the corresponding feature at boot instead of failing.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Marketplace configuration.
    pub marketplace: MarketplaceConfig,
    /// Stripe billing configuration (optional).
    #[serde(default)]
    pub stripe: Option<StripeConfig>,
    /// Media storage configuration (optional, defaults to local).
    #[serde(default)]
    pub storage: Option<StorageSettings>,
    /// Google geocoding configuration (optional).
    #[serde(default)]
    pub geocoding: Option<GeocodingConfig>,
    /// Email provider configuration (optional).
    #[serde(default)]
    pub email: Option<EmailSettings>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Marketplace identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketplaceConfig {
    /// Marketplace display name.
    pub name: String,
    /// Marketplace description shown on the meta endpoint.
    #[serde(default)]
    pub description: Option<String>,
    /// Support contact email.
    #[serde(default)]
    pub support_email: Option<String>,
}

/// Stripe billing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeConfig {
    /// Secret API key (`sk_...`).
    pub secret_key: String,
    /// Webhook endpoint signing secret (`whsec_...`).
    pub webhook_secret: String,
    /// Price ID for the developer subscription plan.
    pub developer_price_id: String,
    /// Allowed clock drift for webhook timestamps, in seconds.
    #[serde(default = "default_signature_tolerance")]
    pub signature_tolerance_secs: i64,
}

/// Media storage settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageSettings {
    /// Local filesystem storage.
    Local {
        /// Base path for stored files.
        base_path: String,
        /// Base URL for serving files.
        base_url: String,
    },
    /// S3-compatible object storage.
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// AWS region.
        region: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Public URL prefix for serving files.
        #[serde(default)]
        public_url: Option<String>,
        /// Presigned PUT expiry in seconds.
        #[serde(default = "default_presign_expiry")]
        presign_expiry_secs: u64,
    },
}

/// Google geocoding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingConfig {
    /// Google Maps API key.
    pub api_key: String,
}

/// Email provider settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum EmailSettings {
    /// SMTP relay.
    Smtp {
        /// SMTP host.
        host: String,
        /// SMTP port.
        port: u16,
        /// From address.
        from_address: String,
    },
    /// SendGrid HTTP API.
    Sendgrid {
        /// SendGrid API key.
        api_key: String,
        /// From address.
        from_address: String,
    },
    /// Mailgun HTTP API.
    Mailgun {
        /// Mailgun API key.
        api_key: String,
        /// Mailgun domain.
        domain: String,
        /// From address.
        from_address: String,
    },
    /// In-memory mock provider for development and tests.
    Mock {
        /// From address.
        from_address: String,
    },
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_signature_tolerance() -> i64 {
    300
}

const fn default_presign_expiry() -> u64 {
    900
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `HESTIA_ENV`)
    /// 3. Environment variables with `HESTIA_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("HESTIA_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("HESTIA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("HESTIA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

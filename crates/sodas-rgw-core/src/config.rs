//! Gateway configuration.
//!
//! Provides [`GatewayConfig`], the immutable settings shared by every
//! operation: where the gateway lives, which region to sign for, the service
//! account used against the admin API, and transport limits. Values are
//! loaded from environment variables or assembled with the typed builder.

use std::fmt;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::{StorageAdminError, StorageAdminResult};

/// Gateway connection settings.
///
/// # Examples
///
/// ```
/// use sodas_rgw_core::config::GatewayConfig;
///
/// let config = GatewayConfig::builder()
///     .endpoint("http://rgw.internal:7480".into())
///     .admin_access_key("admin".into())
///     .admin_secret_key("secret".into())
///     .build();
/// assert_eq!(config.admin_url().unwrap().as_str(), "http://rgw.internal:7480/admin");
/// ```
#[derive(Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Base URL of the gateway, shared by the S3 and admin APIs.
    #[builder(default = String::from("http://localhost:7480"))]
    pub endpoint: String,

    /// Region used for request signing.
    #[builder(default = String::from("us-west-2"))]
    pub region: String,

    /// Access key of the service account used against the admin API.
    #[builder(default)]
    pub admin_access_key: String,

    /// Secret key of the service account used against the admin API.
    #[builder(default)]
    #[serde(default, skip_serializing)]
    pub admin_secret_key: String,

    /// Path of the admin API below the endpoint.
    #[builder(default = String::from("/admin"))]
    pub admin_path: String,

    /// Lifetime of presigned download URLs, in seconds.
    #[builder(default = 900)]
    pub presign_expiry_secs: u64,

    /// Per-operation timeout for remote calls, in seconds.
    #[builder(default = 30)]
    pub request_timeout_secs: u64,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("admin_access_key", &self.admin_access_key)
            .field("admin_secret_key", &"<redacted>")
            .field("admin_path", &self.admin_path)
            .field("presign_expiry_secs", &self.presign_expiry_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `RGW_ENDPOINT` | `http://localhost:7480` |
    /// | `RGW_REGION` | `us-west-2` |
    /// | `RGW_ADMIN_ACCESS_KEY` | *(empty)* |
    /// | `RGW_ADMIN_SECRET_KEY` | *(empty)* |
    /// | `RGW_ADMIN_PATH` | `/admin` |
    /// | `RGW_PRESIGN_EXPIRY_SECS` | `900` |
    /// | `RGW_REQUEST_TIMEOUT_SECS` | `30` |
    /// | `LOG_LEVEL` | `info` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from `lookup`, falling back to the default for
    /// every variable it does not return. Unparsable numbers keep their
    /// defaults.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("RGW_ENDPOINT") {
            config.endpoint = v;
        }
        if let Some(v) = lookup("RGW_REGION") {
            config.region = v;
        }
        if let Some(v) = lookup("RGW_ADMIN_ACCESS_KEY") {
            config.admin_access_key = v;
        }
        if let Some(v) = lookup("RGW_ADMIN_SECRET_KEY") {
            config.admin_secret_key = v;
        }
        if let Some(v) = lookup("RGW_ADMIN_PATH") {
            config.admin_path = v;
        }
        if let Some(n) = lookup("RGW_PRESIGN_EXPIRY_SECS").and_then(|v| v.parse::<u64>().ok()) {
            config.presign_expiry_secs = n;
        }
        if let Some(n) = lookup("RGW_REQUEST_TIMEOUT_SECS").and_then(|v| v.parse::<u64>().ok()) {
            config.request_timeout_secs = n;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }

    /// Check the settings that every client depends on.
    ///
    /// Clients are built lazily, so a bad endpoint otherwise surfaces on the
    /// first remote call. [`StorageAdmin::try_new`](crate::StorageAdmin::try_new)
    /// runs this check up front.
    ///
    /// # Errors
    ///
    /// [`StorageAdminError::Configuration`] if the endpoint or admin path is
    /// malformed.
    pub fn validate(&self) -> StorageAdminResult<()> {
        self.admin_url().map(|_| ())
    }

    /// The gateway endpoint as an absolute `http`/`https` URL.
    ///
    /// # Errors
    ///
    /// [`StorageAdminError::Configuration`] if the endpoint does not parse, uses
    /// another scheme, or has no host.
    pub fn endpoint_url(&self) -> StorageAdminResult<Url> {
        let url = Url::parse(&self.endpoint).map_err(|e| {
            StorageAdminError::Configuration(format!(
                "invalid gateway endpoint {:?}: {e}",
                self.endpoint
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(StorageAdminError::Configuration(format!(
                "gateway endpoint must use http or https: {:?}",
                self.endpoint
            )));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(StorageAdminError::Configuration(format!(
                "gateway endpoint has no host: {:?}",
                self.endpoint
            )));
        }
        Ok(url)
    }

    /// Base URL of the admin API, `<endpoint><admin_path>`.
    ///
    /// # Errors
    ///
    /// [`StorageAdminError::Configuration`] if the endpoint is invalid or the
    /// admin path is empty.
    pub fn admin_url(&self) -> StorageAdminResult<Url> {
        let admin_path = self.admin_path.trim_matches('/');
        if admin_path.is_empty() {
            return Err(StorageAdminError::Configuration(
                "admin path must not be empty".to_owned(),
            ));
        }
        let mut url = self.endpoint_url()?;
        let base = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{base}/{admin_path}"));
        url.set_query(None);
        Ok(url)
    }

    /// Lifetime of presigned download URLs.
    #[must_use]
    pub fn presign_expiry(&self) -> Duration {
        Duration::from_secs(self.presign_expiry_secs)
    }

    /// Per-operation timeout for remote calls.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

//! Integration tests against a running Ceph RADOS Gateway.
//!
//! These tests need a gateway reachable at `RGW_ENDPOINT` (default
//! `http://localhost:7480`) with admin credentials in `RGW_ADMIN_ACCESS_KEY`
//! and `RGW_ADMIN_SECRET_KEY`. Bucket and object tests use the key pair in
//! `RGW_TEST_ACCESS_KEY` / `RGW_TEST_SECRET_KEY`, falling back to the admin
//! keys. They are marked `#[ignore]` so they don't run during normal
//! `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p sodas-rgw-integration -- --ignored
//! ```

use std::sync::Once;

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use sodas_rgw_core::{GatewayConfig, StorageAdmin};
use sodas_rgw_model::AccessKeyPair;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing(config: &GatewayConfig) {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
            )
            .with_test_writer()
            .init();
    });
}

/// Gateway configuration from the environment.
#[must_use]
pub fn gateway_config() -> GatewayConfig {
    let config = GatewayConfig::from_env();
    init_tracing(&config);
    config
}

/// A facade over the gateway configured from the environment.
#[must_use]
pub fn storage_admin() -> StorageAdmin {
    StorageAdmin::try_new(gateway_config())
        .unwrap_or_else(|e| panic!("invalid gateway configuration: {e}"))
}

/// Key pair used for bucket and object calls.
#[must_use]
pub fn caller_key() -> AccessKeyPair {
    let config = gateway_config();
    let access_key =
        std::env::var("RGW_TEST_ACCESS_KEY").unwrap_or_else(|_| config.admin_access_key.clone());
    let secret_key =
        std::env::var("RGW_TEST_SECRET_KEY").unwrap_or_else(|_| config.admin_secret_key.clone());
    AccessKeyPair::new(access_key, secret_key)
}

/// A raw S3 client with the caller's key, for checking results independently
/// of the facade.
#[must_use]
pub fn s3_client() -> aws_sdk_s3::Client {
    let config = gateway_config();
    let key = caller_key();
    let creds = Credentials::new(key.access_key, key.secret_key, None, None, "integration-test");

    let s3_config = aws_sdk_s3::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .credentials_provider(creds)
        .endpoint_url(config.endpoint.clone())
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}

/// Generate a unique bucket name for a test.
#[must_use]
pub fn test_bucket_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

/// Generate a unique user id for a test.
#[must_use]
pub fn test_user_id(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("it-{prefix}-{id}")
}

/// Create a bucket through the facade and return its name. Caller is
/// responsible for cleanup.
pub async fn create_test_bucket(admin: &StorageAdmin, prefix: &str) -> String {
    let name = test_bucket_name(prefix);
    admin
        .create_bucket(&caller_key(), &name)
        .await
        .unwrap_or_else(|e| panic!("failed to create bucket {name}: {e}"));
    name
}

/// Delete a bucket and its objects, ignoring failures.
pub async fn cleanup_bucket(admin: &StorageAdmin, bucket: &str) {
    let _ = admin.delete_bucket(&caller_key(), bucket).await;
}

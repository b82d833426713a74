//! The storage administration facade.
//!
//! [`StorageAdmin`] holds the immutable configuration and the seams every
//! operation goes through: the per-caller object store factory, the shared
//! admin client handle, and the access checker. Operations live in the
//! `ops` module as `impl StorageAdmin` blocks.

use std::fmt;
use std::sync::Arc;

use sodas_rgw_model::AccessKeyPair;
use tracing::warn;

use crate::access::{AllowAll, AuthChecker};
use crate::admin::{AdminApi, AdminHandle};
use crate::config::GatewayConfig;
use crate::error::{StorageAdminError, StorageAdminResult};
use crate::s3::S3StoreFactory;
use crate::store::{ObjectStore, ObjectStoreFactory};

/// Facade over the gateway's object API and admin API.
///
/// All fields are `Arc`-wrapped; the facade is `Send + Sync` and meant to be
/// shared behind an `Arc`.
///
/// # Examples
///
/// ```
/// use sodas_rgw_core::StorageAdmin;
/// use sodas_rgw_core::config::GatewayConfig;
///
/// let admin = StorageAdmin::new(GatewayConfig::default());
/// assert_eq!(admin.config().region, "us-west-2");
/// ```
pub struct StorageAdmin {
    /// Gateway configuration.
    pub(crate) config: Arc<GatewayConfig>,
    /// Builds object store clients per caller key.
    pub(crate) stores: Arc<dyn ObjectStoreFactory>,
    /// Lazily-built admin client.
    pub(crate) admin: Arc<AdminHandle>,
    /// Decides which callers may use key-scoped operations.
    pub(crate) auth: Arc<dyn AuthChecker>,
}

impl fmt::Debug for StorageAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageAdmin")
            .field("config", &self.config)
            .field("admin", &self.admin)
            .finish_non_exhaustive()
    }
}

impl StorageAdmin {
    /// Create a facade talking to the configured gateway, permitting every
    /// caller.
    #[must_use]
    pub fn new(config: GatewayConfig) -> Self {
        let config = Arc::new(config);
        Self {
            stores: Arc::new(S3StoreFactory::new(Arc::clone(&config))),
            admin: Arc::new(AdminHandle::rgw()),
            auth: Arc::new(AllowAll),
            config,
        }
    }

    /// Like [`StorageAdmin::new`], but rejects a malformed endpoint or admin
    /// path before any client is built.
    ///
    /// # Errors
    ///
    /// [`StorageAdminError::Configuration`] if [`GatewayConfig::validate`]
    /// fails.
    pub fn try_new(config: GatewayConfig) -> StorageAdminResult<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Replace the object store factory.
    #[must_use]
    pub fn with_store_factory(mut self, stores: Arc<dyn ObjectStoreFactory>) -> Self {
        self.stores = stores;
        self
    }

    /// Replace the admin client handle.
    #[must_use]
    pub fn with_admin_handle(mut self, admin: Arc<AdminHandle>) -> Self {
        self.admin = admin;
        self
    }

    /// Replace the access checker.
    #[must_use]
    pub fn with_auth_checker(mut self, auth: Arc<dyn AuthChecker>) -> Self {
        self.auth = auth;
        self
    }

    /// Returns a reference to the gateway configuration.
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// An object store client bound to `key`, one per call.
    ///
    /// # Errors
    ///
    /// [`StorageAdminError::Configuration`] if the endpoint or key is unusable.
    pub fn client_for(&self, key: &AccessKeyPair) -> StorageAdminResult<Arc<dyn ObjectStore>> {
        self.stores.client_for(key)
    }

    /// The shared admin client, built on first use.
    ///
    /// # Errors
    ///
    /// [`StorageAdminError::Configuration`] if the admin client cannot be built.
    pub fn admin_client(&self) -> StorageAdminResult<Arc<dyn AdminApi>> {
        self.admin.get(&self.config)
    }

    /// Whether `key` may use key-scoped operations.
    #[must_use]
    pub fn validate_access(&self, key: &AccessKeyPair) -> bool {
        self.auth.is_allowed(key)
    }

    /// Check access, then build a store for `key`.
    pub(crate) fn authorized_store(
        &self,
        key: &AccessKeyPair,
    ) -> StorageAdminResult<Arc<dyn ObjectStore>> {
        if !self.validate_access(key) {
            warn!(access_key = %key.access_key, "Access denied");
            return Err(StorageAdminError::AccessDenied {
                access_key: key.access_key.clone(),
            });
        }
        self.client_for(key)
    }
}

//! Lazily-built, shared admin client.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::info;

use super::{AdminApi, RgwAdminClient};
use crate::config::GatewayConfig;
use crate::error::StorageAdminResult;

/// Constructor of the admin client, run at most once per successful build.
pub type AdminClientBuilder =
    Box<dyn Fn(&GatewayConfig) -> StorageAdminResult<Arc<dyn AdminApi>> + Send + Sync>;

/// Holds the admin client and builds it on first use.
///
/// Concurrent first calls to [`AdminHandle::get`] run the builder once and
/// all observe the same instance; later calls read it without locking. A
/// failed build is not cached.
pub struct AdminHandle {
    cell: OnceCell<Arc<dyn AdminApi>>,
    builder: AdminClientBuilder,
}

impl fmt::Debug for AdminHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminHandle")
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

impl AdminHandle {
    /// A handle using a custom builder.
    pub fn new(
        builder: impl Fn(&GatewayConfig) -> StorageAdminResult<Arc<dyn AdminApi>>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            cell: OnceCell::new(),
            builder: Box::new(builder),
        }
    }

    /// A handle that builds an [`RgwAdminClient`] from the configuration.
    #[must_use]
    pub fn rgw() -> Self {
        Self::new(|config| Ok(Arc::new(RgwAdminClient::new(config)?) as Arc<dyn AdminApi>))
    }

    /// A handle already holding `client`.
    #[must_use]
    pub fn with_client(client: Arc<dyn AdminApi>) -> Self {
        let handle = Self::rgw();
        // A fresh cell accepts the first value.
        let _ = handle.cell.set(client);
        handle
    }

    /// The admin client, built from `config` on first use.
    ///
    /// # Errors
    ///
    /// Whatever the builder returns; the next call retries.
    pub fn get(&self, config: &GatewayConfig) -> StorageAdminResult<Arc<dyn AdminApi>> {
        self.cell
            .get_or_try_init(|| {
                let client = (self.builder)(config)?;
                info!(endpoint = %config.endpoint, "Initialized admin client");
                Ok(client)
            })
            .cloned()
    }

    /// Whether the client has been built.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

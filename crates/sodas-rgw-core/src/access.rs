//! Caller access validation.
//!
//! This module defines the [`AuthChecker`] trait consulted before every
//! key-scoped operation, along with [`AllowAll`] (the default) and
//! [`StaticKeyChecker`] for deployments with a fixed set of callers.

use std::collections::HashSet;

use sodas_rgw_model::AccessKeyPair;

/// Decides whether a caller key may use the facade.
///
/// Any `Fn(&AccessKeyPair) -> bool + Send + Sync` closure implements this
/// trait.
pub trait AuthChecker: Send + Sync {
    /// Whether the caller identified by `key` is allowed.
    fn is_allowed(&self, key: &AccessKeyPair) -> bool;
}

impl<F> AuthChecker for F
where
    F: Fn(&AccessKeyPair) -> bool + Send + Sync,
{
    fn is_allowed(&self, key: &AccessKeyPair) -> bool {
        self(key)
    }
}

/// Permits every caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AuthChecker for AllowAll {
    fn is_allowed(&self, _key: &AccessKeyPair) -> bool {
        true
    }
}

/// Permits callers whose access key is in a fixed set.
///
/// # Examples
///
/// ```
/// use sodas_rgw_core::access::{AuthChecker, StaticKeyChecker};
/// use sodas_rgw_model::AccessKeyPair;
///
/// let checker = StaticKeyChecker::new(["AKID".to_owned()]);
/// assert!(checker.is_allowed(&AccessKeyPair::new("AKID", "secret")));
/// assert!(!checker.is_allowed(&AccessKeyPair::new("OTHER", "secret")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticKeyChecker {
    access_keys: HashSet<String>,
}

impl StaticKeyChecker {
    /// Create a checker from the allowed access keys.
    pub fn new(access_keys: impl IntoIterator<Item = String>) -> Self {
        Self {
            access_keys: access_keys.into_iter().collect(),
        }
    }
}

impl AuthChecker for StaticKeyChecker {
    fn is_allowed(&self, key: &AccessKeyPair) -> bool {
        self.access_keys.contains(&key.access_key)
    }
}

//! Access credentials.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An S3 access key / secret key pair identifying a caller.
///
/// Supplied per call and never persisted. The `Debug` output redacts the
/// secret so the pair can be carried in tracing spans safely.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessKeyPair {
    /// Access key ID.
    pub access_key: String,
    /// Secret access key.
    pub secret_key: String,
}

impl AccessKeyPair {
    /// Create a new key pair.
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }
}

impl fmt::Debug for AccessKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessKeyPair")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// An S3 key as reported by the admin API.
///
/// `user` is the owning identity: `"<uid>"` for a user's own key and
/// `"<uid>:<sub_user_id>"` for a sub-user key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Credential {
    /// Owning user or sub-user id.
    pub user: String,
    /// Access key ID.
    pub access_key: String,
    /// Secret access key.
    #[serde(default)]
    pub secret_key: String,
}

impl S3Credential {
    /// The key pair carried by this credential.
    #[must_use]
    pub fn key_pair(&self) -> AccessKeyPair {
        AccessKeyPair::new(self.access_key.clone(), self.secret_key.clone())
    }
}

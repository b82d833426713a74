//! Error types for the storage administration facade.
//!
//! Every operation returns [`StorageAdminResult`]. Remote failures are never
//! translated: the HTTP status and error code reported by the gateway travel
//! unchanged inside [`StorageAdminError::Remote`].
//!
//! # Usage
//!
//! ```
//! use sodas_rgw_core::error::StorageAdminError;
//!
//! let err = StorageAdminError::not_found("bucket", "photos");
//! assert_eq!(err.to_string(), "bucket not found: photos");
//! ```

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use sodas_rgw_model::PermissionParseError;

/// Storage administration error type.
#[derive(Debug, thiserror::Error)]
pub enum StorageAdminError {
    /// A client could not be built from the configured endpoint or credentials.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The remote entity does not exist.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// What was looked up (`"bucket"`, `"user"`, `"sub-user"`, ...).
        kind: &'static str,
        /// The name or id that was looked up.
        name: String,
    },

    /// The gateway answered with a non-success response, or could not be reached.
    #[error("{operation} failed{}: {message}", remote_detail(*.status, .code.as_deref()))]
    Remote {
        /// Remote operation name, e.g. `"ListObjectsV2"` or `"GetUserInfo"`.
        operation: &'static str,
        /// HTTP status, absent when no response was received.
        status: Option<u16>,
        /// Gateway error code such as `NoSuchBucket`.
        code: Option<String>,
        /// Human readable detail.
        message: String,
    },

    /// The upload source could not be read.
    #[error("failed to read upload source: {0}")]
    Io(#[from] std::io::Error),

    /// Utilization was requested for a bucket without a positive size quota.
    #[error("bucket {bucket} has no size quota to measure utilization against")]
    QuotaUndefined {
        /// The bucket name.
        bucket: String,
    },

    /// The access checker refused the caller.
    #[error("access denied for key {access_key}")]
    AccessDenied {
        /// The refused access key.
        access_key: String,
    },

    /// An argument could not be interpreted.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience result type for storage administration operations.
pub type StorageAdminResult<T> = Result<T, StorageAdminError>;

impl StorageAdminError {
    /// Shorthand for [`StorageAdminError::NotFound`].
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Shorthand for [`StorageAdminError::Remote`].
    pub fn remote(
        operation: &'static str,
        status: Option<u16>,
        code: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Remote {
            operation,
            status,
            code,
            message: message.into(),
        }
    }

    /// Convert an `aws-sdk-s3` error, keeping the gateway's status and code.
    pub fn from_sdk<E>(operation: &'static str, err: SdkError<E>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    {
        let status = err.raw_response().map(|r| r.status().as_u16());
        let code = err.code().map(ToOwned::to_owned);
        let message = err
            .message()
            .map_or_else(|| DisplayErrorContext(&err).to_string(), ToOwned::to_owned);
        Self::remote(operation, status, code, message)
    }

    /// Whether this is a remote `404` response.
    #[must_use]
    pub fn is_remote_not_found(&self) -> bool {
        matches!(self, Self::Remote { status: Some(404), .. })
    }
}

impl From<PermissionParseError> for StorageAdminError {
    fn from(err: PermissionParseError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

fn remote_detail(status: Option<u16>, code: Option<&str>) -> String {
    match (status, code) {
        (Some(status), Some(code)) => format!(" ({status} {code})"),
        (Some(status), None) => format!(" ({status})"),
        (None, Some(code)) => format!(" ({code})"),
        (None, None) => String::new(),
    }
}

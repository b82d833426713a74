//! Data model for the Sodas RGW storage administration library.
//!
//! This crate holds two families of types:
//!
//! - Local records handed to callers ([`AccessKeyPair`], [`BucketSummary`],
//!   [`ObjectSummary`], [`QuotaSpec`], [`UserSpec`], [`SubUserSpec`], ...).
//! - Wire shapes of the RGW admin API ([`BucketInfo`], [`UserInfo`],
//!   [`Quota`], [`SubUser`], [`S3Credential`]), deserialized straight from the
//!   gateway's JSON responses.
//!
//! Nothing here performs I/O; the types are plain values shared by the
//! signing and core crates.

pub mod acl;
pub mod bucket;
pub mod credentials;
pub mod error;
pub mod quota;
pub mod user;

pub use acl::{Acl, AclGrant, AclOwner, AclPermission, Grantee};
pub use bucket::{BucketSummary, ObjectPage, ObjectSummary};
pub use credentials::{AccessKeyPair, S3Credential};
pub use error::PermissionParseError;
pub use quota::{BucketInfo, BucketQuotaReport, Quota, QuotaSpec, QuotaUpdate, UsageStats};
pub use user::{
    SubUser, SubUserPermission, SubUserSpec, UserInfo, UserSpec, qualified_sub_user_id,
};

/// Strip separators and lowercase a permission spelling so that `READ_WRITE`,
/// `read-write` and `ReadWrite` compare equal.
pub(crate) fn normalize_permission(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' ' | '<' | '>'))
        .flat_map(char::to_lowercase)
        .collect()
}

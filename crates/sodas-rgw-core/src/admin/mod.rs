//! The RGW admin API seam.
//!
//! [`AdminApi`] covers the admin operations the facade forwards: bucket
//! statistics, quotas, users, sub-users and S3 keys. [`RgwAdminClient`] speaks
//! the admin REST protocol; [`AdminHandle`] builds it at most once.
//!
//! Reads return `None` when the gateway answers `404`.

mod client;
mod handle;

pub use client::RgwAdminClient;
pub use handle::{AdminClientBuilder, AdminHandle};

use sodas_rgw_model::{
    AccessKeyPair, BucketInfo, Quota, QuotaSpec, S3Credential, SubUser, SubUserPermission,
    SubUserSpec, UserInfo, UserSpec,
};

use crate::error::StorageAdminResult;

/// Operations of the RGW admin API.
#[async_trait::async_trait]
pub trait AdminApi: Send + Sync {
    /// Bucket record with usage statistics.
    async fn bucket_info(&self, bucket: &str) -> StorageAdminResult<Option<BucketInfo>>;

    /// The aggregate quota of a user.
    async fn user_quota(&self, uid: &str) -> StorageAdminResult<Option<Quota>>;

    /// Set and enable the quota of one bucket owned by `uid`.
    async fn set_bucket_quota(
        &self,
        uid: &str,
        bucket: &str,
        quota: &QuotaSpec,
    ) -> StorageAdminResult<()>;

    /// Create a user.
    async fn create_user(&self, spec: &UserSpec) -> StorageAdminResult<UserInfo>;

    /// User record, including sub-users and keys.
    async fn user_info(&self, uid: &str) -> StorageAdminResult<Option<UserInfo>>;

    /// Create a sub-user with the permission and S3 key pair of `spec`.
    ///
    /// Returns the user's sub-users after the change.
    async fn create_sub_user(
        &self,
        uid: &str,
        spec: &SubUserSpec,
    ) -> StorageAdminResult<Vec<SubUser>>;

    /// Change the permission of a sub-user.
    async fn set_sub_user_permission(
        &self,
        uid: &str,
        sub_user_id: &str,
        permission: SubUserPermission,
    ) -> StorageAdminResult<()>;

    /// Remove a sub-user.
    async fn remove_sub_user(&self, uid: &str, sub_user_id: &str) -> StorageAdminResult<()>;

    /// Register `key` for the user or one of its sub-users, or have the
    /// gateway generate a pair when `key` is `None`.
    ///
    /// Returns the keys of the user after the change.
    async fn create_s3_credential(
        &self,
        uid: &str,
        sub_user_id: Option<&str>,
        key: Option<&AccessKeyPair>,
    ) -> StorageAdminResult<Vec<S3Credential>>;

    /// Remove an S3 key from the user or one of its sub-users.
    async fn remove_s3_credential(
        &self,
        uid: &str,
        sub_user_id: Option<&str>,
        access_key: &str,
    ) -> StorageAdminResult<()>;
}

//! The object data API seam.
//!
//! [`ObjectStore`] is the subset of the S3 protocol the facade needs, bound
//! to one caller key. [`ObjectStoreFactory`] builds a store per caller.
//!
//! # Object safety
//!
//! Both traits are used as `Arc<dyn ...>` so that tests can substitute
//! in-memory fakes, hence `#[async_trait]`.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::Url;
use sodas_rgw_model::{AccessKeyPair, Acl, AclOwner, BucketSummary, ObjectPage};

use crate::error::StorageAdminResult;

/// Bucket and object operations on behalf of one caller.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Buckets owned by the caller.
    async fn list_buckets(&self) -> StorageAdminResult<Vec<BucketSummary>>;

    /// The caller's account owner as reported by the bucket listing.
    async fn account_owner(&self) -> StorageAdminResult<Option<AclOwner>>;

    /// Create a bucket.
    async fn create_bucket(&self, bucket: &str) -> StorageAdminResult<()>;

    /// Delete an empty bucket.
    async fn delete_bucket(&self, bucket: &str) -> StorageAdminResult<()>;

    /// One page of a `ListObjectsV2` listing.
    async fn list_objects_page(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
    ) -> StorageAdminResult<ObjectPage>;

    /// Store `body` under `key`.
    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> StorageAdminResult<()>;

    /// Delete one object.
    async fn delete_object(&self, bucket: &str, key: &str) -> StorageAdminResult<()>;

    /// A presigned `GET` URL valid for `expires_in`.
    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageAdminResult<Url>;

    /// ACL of a bucket.
    async fn bucket_acl(&self, bucket: &str) -> StorageAdminResult<Acl>;

    /// Replace the ACL of a bucket.
    async fn put_bucket_acl(&self, bucket: &str, acl: &Acl) -> StorageAdminResult<()>;

    /// ACL of an object.
    async fn object_acl(&self, bucket: &str, key: &str) -> StorageAdminResult<Acl>;

    /// Replace the ACL of an object.
    async fn put_object_acl(&self, bucket: &str, key: &str, acl: &Acl) -> StorageAdminResult<()>;
}

/// Builds an [`ObjectStore`] bound to a caller key.
pub trait ObjectStoreFactory: Send + Sync {
    /// Build a store for `key`.
    ///
    /// # Errors
    ///
    /// [`crate::error::StorageAdminError::Configuration`] if no client can be
    /// built for the key or the configured endpoint.
    fn client_for(&self, key: &AccessKeyPair) -> StorageAdminResult<Arc<dyn ObjectStore>>;
}

//! Bucket operations.
//!
//! Implements `list_buckets`, `create_bucket`, `list_objects` and the
//! cascading `delete_bucket`.

use std::collections::HashSet;

use sodas_rgw_model::{AccessKeyPair, BucketSummary, ObjectSummary};
use tracing::{debug, info};

use crate::error::{StorageAdminError, StorageAdminResult};
use crate::provider::StorageAdmin;
use crate::store::ObjectStore;

/// Error code reported when a listing cannot make progress.
pub const INVALID_CONTINUATION: &str = "InvalidContinuation";

impl StorageAdmin {
    /// Buckets owned by the caller.
    pub async fn list_buckets(
        &self,
        key: &AccessKeyPair,
    ) -> StorageAdminResult<Vec<BucketSummary>> {
        let store = self.authorized_store(key)?;
        let buckets = store.list_buckets().await?;
        debug!(count = buckets.len(), "list_buckets completed");
        Ok(buckets)
    }

    /// Create a bucket owned by the caller.
    ///
    /// The returned summary has no creation time; the gateway does not
    /// report one on creation.
    pub async fn create_bucket(
        &self,
        key: &AccessKeyPair,
        bucket: &str,
    ) -> StorageAdminResult<BucketSummary> {
        let store = self.authorized_store(key)?;
        store.create_bucket(bucket).await?;
        info!(bucket, "Created bucket");
        Ok(BucketSummary {
            name: bucket.to_owned(),
            created_at: None,
        })
    }

    /// Every object in `bucket`, following continuation tokens to the end.
    pub async fn list_objects(
        &self,
        key: &AccessKeyPair,
        bucket: &str,
    ) -> StorageAdminResult<Vec<ObjectSummary>> {
        let store = self.authorized_store(key)?;
        collect_objects(store.as_ref(), bucket).await
    }

    /// Delete every object of `bucket` in listing order, then the bucket.
    ///
    /// The first failing object delete aborts the call. Objects deleted
    /// before the failure stay deleted.
    pub async fn delete_bucket(&self, key: &AccessKeyPair, bucket: &str) -> StorageAdminResult<()> {
        let store = self.authorized_store(key)?;
        let objects = collect_objects(store.as_ref(), bucket).await?;

        for object in &objects {
            store.delete_object(bucket, &object.key).await?;
        }
        store.delete_bucket(bucket).await?;

        info!(bucket, objects = objects.len(), "Deleted bucket");
        Ok(())
    }
}

/// List all pages of `bucket`.
///
/// A page that claims truncation without a token, or hands back a token
/// already used, fails with [`INVALID_CONTINUATION`].
pub(crate) async fn collect_objects(
    store: &dyn ObjectStore,
    bucket: &str,
) -> StorageAdminResult<Vec<ObjectSummary>> {
    let mut objects = Vec::new();
    let mut seen_tokens = HashSet::new();
    let mut token: Option<String> = None;

    loop {
        let page = store.list_objects_page(bucket, token.as_deref()).await?;
        objects.extend(page.objects);
        if !page.is_truncated {
            break;
        }

        let next = page.next_continuation_token.ok_or_else(|| {
            invalid_continuation(bucket, "truncated page carries no continuation token")
        })?;
        if !seen_tokens.insert(next.clone()) {
            return Err(invalid_continuation(
                bucket,
                "continuation token did not advance",
            ));
        }
        token = Some(next);
    }

    debug!(
        bucket,
        count = objects.len(),
        pages = seen_tokens.len() + 1,
        "list_objects completed"
    );
    Ok(objects)
}

fn invalid_continuation(bucket: &str, reason: &str) -> StorageAdminError {
    StorageAdminError::remote(
        "ListObjectsV2",
        None,
        Some(INVALID_CONTINUATION.to_owned()),
        format!("listing of bucket {bucket}: {reason}"),
    )
}

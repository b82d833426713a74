//! ACL operations.
//!
//! `grant_bucket_permission` is not atomic: the bucket ACL is written first,
//! then each object ACL in listing order. A failure part way leaves the
//! earlier writes in place.

use sodas_rgw_model::{AccessKeyPair, Acl, AclPermission, Grantee};
use tracing::{debug, info};

use crate::error::{StorageAdminError, StorageAdminResult};
use crate::ops::bucket::collect_objects;
use crate::provider::StorageAdmin;

impl StorageAdmin {
    /// Grant `permission` on `bucket` to the canonical user `grantee`, then
    /// grant the same permission on every object in the bucket to the
    /// caller's account owner.
    pub async fn grant_bucket_permission(
        &self,
        key: &AccessKeyPair,
        grantee: &str,
        permission: AclPermission,
        bucket: &str,
    ) -> StorageAdminResult<()> {
        let store = self.authorized_store(key)?;

        let mut acl = store.bucket_acl(bucket).await?;
        acl.grant(Grantee::canonical(grantee), permission);
        store.put_bucket_acl(bucket, &acl).await?;
        info!(bucket, grantee, %permission, "Granted bucket permission");

        let objects = collect_objects(store.as_ref(), bucket).await?;
        if objects.is_empty() {
            return Ok(());
        }

        let owner = store
            .account_owner()
            .await?
            .ok_or_else(|| StorageAdminError::not_found("account owner", key.access_key.clone()))?;

        for object in &objects {
            let mut object_acl = store.object_acl(bucket, &object.key).await?;
            object_acl.grant(Grantee::canonical(owner.id.clone()), permission);
            store
                .put_object_acl(bucket, &object.key, &object_acl)
                .await?;
        }
        debug!(bucket, objects = objects.len(), owner = %owner.id, "Granted object permissions");
        Ok(())
    }

    /// ACL of a bucket.
    pub async fn bucket_acl(&self, key: &AccessKeyPair, bucket: &str) -> StorageAdminResult<Acl> {
        let store = self.authorized_store(key)?;
        store.bucket_acl(bucket).await
    }

    /// ACL of an object.
    pub async fn object_acl(
        &self,
        key: &AccessKeyPair,
        bucket: &str,
        object: &str,
    ) -> StorageAdminResult<Acl> {
        let store = self.authorized_store(key)?;
        store.object_acl(bucket, object).await
    }
}

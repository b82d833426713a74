//! User, sub-user and S3 credential operations.

use sodas_rgw_model::{
    AccessKeyPair, S3Credential, SubUser, SubUserPermission, SubUserSpec, UserInfo, UserSpec,
};
use tracing::{debug, info};

use crate::error::{StorageAdminError, StorageAdminResult};
use crate::provider::StorageAdmin;

impl StorageAdmin {
    /// Create a user.
    pub async fn create_user(&self, spec: &UserSpec) -> StorageAdminResult<UserInfo> {
        self.admin_client()?.create_user(spec).await
    }

    /// The user record of `uid`, or `None` when it does not exist.
    pub async fn user_info(&self, uid: &str) -> StorageAdminResult<Option<UserInfo>> {
        self.admin_client()?.user_info(uid).await
    }

    /// Create a sub-user of `uid` holding the key pair of `spec`.
    ///
    /// The sub-user always starts with [`SubUserPermission::None`]; the
    /// permission in `spec` is ignored.
    pub async fn create_sub_user(
        &self,
        uid: &str,
        spec: &SubUserSpec,
    ) -> StorageAdminResult<Vec<SubUser>> {
        let spec = SubUserSpec {
            permission: SubUserPermission::None,
            ..spec.clone()
        };
        self.admin_client()?.create_sub_user(uid, &spec).await
    }

    /// Current permission of a sub-user.
    pub async fn get_sub_user_permission(
        &self,
        uid: &str,
        sub_user_id: &str,
    ) -> StorageAdminResult<SubUserPermission> {
        let user = self
            .user_info(uid)
            .await?
            .ok_or_else(|| StorageAdminError::not_found("user", uid))?;
        let permission = user
            .sub_user(sub_user_id)
            .map(|s| s.permissions)
            .ok_or_else(|| StorageAdminError::not_found("sub-user", sub_user_id))?;
        debug!(uid, sub_user = sub_user_id, %permission, "Fetched sub-user permission");
        Ok(permission)
    }

    /// Replace the permission of a sub-user.
    pub async fn set_sub_user_permission(
        &self,
        uid: &str,
        sub_user_id: &str,
        permission: SubUserPermission,
    ) -> StorageAdminResult<()> {
        self.admin_client()?
            .set_sub_user_permission(uid, sub_user_id, permission)
            .await
    }

    /// Remove the sub-user's S3 key `key.access_key`, then the sub-user.
    ///
    /// The sub-user is left in place when the key removal fails.
    pub async fn delete_sub_user(
        &self,
        uid: &str,
        sub_user_id: &str,
        key: &AccessKeyPair,
    ) -> StorageAdminResult<()> {
        let admin = self.admin_client()?;
        admin
            .remove_s3_credential(uid, Some(sub_user_id), &key.access_key)
            .await?;
        admin.remove_sub_user(uid, sub_user_id).await?;
        info!(uid, sub_user = sub_user_id, "Deleted sub-user and its key");
        Ok(())
    }

    /// Register another S3 key pair for an existing sub-user.
    pub async fn set_sub_user_credential(
        &self,
        uid: &str,
        sub_user_id: &str,
        key: &AccessKeyPair,
    ) -> StorageAdminResult<Vec<S3Credential>> {
        self.admin_client()?
            .create_s3_credential(uid, Some(sub_user_id), Some(key))
            .await
    }

    /// Add an S3 key to `uid`: `key` when given, otherwise one generated by
    /// the gateway. Returns every key of the user afterwards.
    pub async fn create_credential(
        &self,
        uid: &str,
        key: Option<&AccessKeyPair>,
    ) -> StorageAdminResult<Vec<S3Credential>> {
        self.admin_client()?
            .create_s3_credential(uid, None, key)
            .await
    }

    /// Remove the S3 key `access_key` of `uid`.
    pub async fn delete_credential(&self, uid: &str, access_key: &str) -> StorageAdminResult<()> {
        self.admin_client()?
            .remove_s3_credential(uid, None, access_key)
            .await
    }

    /// S3 keys of `uid` and its sub-users; empty when the user does not exist.
    pub async fn list_credentials(&self, uid: &str) -> StorageAdminResult<Vec<S3Credential>> {
        Ok(self
            .user_info(uid)
            .await?
            .map(|user| user.keys)
            .unwrap_or_default())
    }
}

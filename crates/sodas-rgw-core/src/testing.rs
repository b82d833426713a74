//! In-memory fakes of the object store and the admin API for unit tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use reqwest::Url;
use sodas_rgw_model::{
    AccessKeyPair, Acl, AclOwner, BucketInfo, BucketSummary, ObjectPage, ObjectSummary, Quota,
    QuotaSpec, S3Credential, SubUser, SubUserPermission, SubUserSpec, UserInfo, UserSpec,
    qualified_sub_user_id,
};

use crate::StorageAdmin;
use crate::access::AuthChecker;
use crate::admin::{AdminApi, AdminHandle};
use crate::config::GatewayConfig;
use crate::error::{StorageAdminError, StorageAdminResult};
use crate::store::{ObjectStore, ObjectStoreFactory};

/// A facade wired to the given fakes.
pub(crate) fn facade(store: &Arc<FakeObjectStore>, admin: &Arc<FakeAdmin>) -> StorageAdmin {
    StorageAdmin::new(GatewayConfig::default())
        .with_store_factory(Arc::new(FakeStoreFactory::new(Arc::clone(store))))
        .with_admin_handle(Arc::new(AdminHandle::with_client(
            Arc::clone(admin) as Arc<dyn AdminApi>
        )))
}

/// A facade wired to the fakes with a custom access checker.
pub(crate) fn guarded_facade(
    store: &Arc<FakeObjectStore>,
    admin: &Arc<FakeAdmin>,
    auth: impl AuthChecker + 'static,
) -> StorageAdmin {
    facade(store, admin).with_auth_checker(Arc::new(auth))
}

pub(crate) fn caller() -> AccessKeyPair {
    AccessKeyPair::new("AKCALLER", "caller-secret")
}

fn not_found(operation: &'static str, code: &str) -> StorageAdminError {
    StorageAdminError::remote(operation, Some(404), Some(code.to_owned()), code)
}

fn conflict(operation: &'static str, code: &str) -> StorageAdminError {
    StorageAdminError::remote(operation, Some(409), Some(code.to_owned()), code)
}

#[derive(Debug, Default)]
struct FakeBucket {
    objects: BTreeMap<String, Bytes>,
    acl: Acl,
    object_acls: HashMap<String, Acl>,
}

#[derive(Debug)]
struct FakeStoreState {
    buckets: BTreeMap<String, FakeBucket>,
    owner: Option<AclOwner>,
    page_size: usize,
    stuck_token: bool,
    missing_token: bool,
    fail_delete_on: Option<String>,
    calls: Vec<String>,
}

/// Object store keeping buckets in memory and recording every call.
#[derive(Debug)]
pub(crate) struct FakeObjectStore {
    state: Mutex<FakeStoreState>,
}

impl FakeObjectStore {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(FakeStoreState {
                buckets: BTreeMap::new(),
                owner: Some(AclOwner {
                    id: "owner-id".to_owned(),
                    display_name: Some("Owner".to_owned()),
                }),
                page_size: 1000,
                stuck_token: false,
                missing_token: false,
                fail_delete_on: None,
                calls: Vec::new(),
            }),
        }
    }

    pub(crate) fn with_bucket(self, bucket: &str, keys: &[&str]) -> Self {
        {
            let mut state = self.state.lock();
            let owner = state.owner.clone();
            let entry = state.buckets.entry(bucket.to_owned()).or_default();
            entry.acl.owner.clone_from(&owner);
            for key in keys {
                entry
                    .objects
                    .insert((*key).to_owned(), Bytes::from_static(b"data"));
                entry.object_acls.insert(
                    (*key).to_owned(),
                    Acl {
                        owner: owner.clone(),
                        grants: Vec::new(),
                    },
                );
            }
        }
        self
    }

    pub(crate) fn with_page_size(self, page_size: usize) -> Self {
        self.state.lock().page_size = page_size;
        self
    }

    pub(crate) fn with_stuck_token(self) -> Self {
        self.state.lock().stuck_token = true;
        self
    }

    pub(crate) fn with_missing_token(self) -> Self {
        self.state.lock().missing_token = true;
        self
    }

    pub(crate) fn with_failing_delete(self, key: &str) -> Self {
        self.state.lock().fail_delete_on = Some(key.to_owned());
        self
    }

    pub(crate) fn without_owner(self) -> Self {
        self.state.lock().owner = None;
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    pub(crate) fn has_bucket(&self, bucket: &str) -> bool {
        self.state.lock().buckets.contains_key(bucket)
    }

    pub(crate) fn object_keys(&self, bucket: &str) -> Vec<String> {
        self.state
            .lock()
            .buckets
            .get(bucket)
            .map(|b| b.objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) fn object_body(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.state
            .lock()
            .buckets
            .get(bucket)
            .and_then(|b| b.objects.get(key).cloned())
    }

    pub(crate) fn stored_bucket_acl(&self, bucket: &str) -> Option<Acl> {
        self.state.lock().buckets.get(bucket).map(|b| b.acl.clone())
    }

    pub(crate) fn stored_object_acl(&self, bucket: &str, key: &str) -> Option<Acl> {
        self.state
            .lock()
            .buckets
            .get(bucket)
            .and_then(|b| b.object_acls.get(key).cloned())
    }

    fn record(&self, call: impl Into<String>) {
        self.state.lock().calls.push(call.into());
    }
}

#[async_trait::async_trait]
impl ObjectStore for FakeObjectStore {
    async fn list_buckets(&self) -> StorageAdminResult<Vec<BucketSummary>> {
        self.record("ListBuckets");
        Ok(self
            .state
            .lock()
            .buckets
            .keys()
            .map(|name| BucketSummary {
                name: name.clone(),
                created_at: None,
            })
            .collect())
    }

    async fn account_owner(&self) -> StorageAdminResult<Option<AclOwner>> {
        self.record("ListBuckets");
        Ok(self.state.lock().owner.clone())
    }

    async fn create_bucket(&self, bucket: &str) -> StorageAdminResult<()> {
        self.record(format!("CreateBucket:{bucket}"));
        let mut state = self.state.lock();
        if state.buckets.contains_key(bucket) {
            return Err(conflict("CreateBucket", "BucketAlreadyExists"));
        }
        let owner = state.owner.clone();
        let entry = state.buckets.entry(bucket.to_owned()).or_default();
        entry.acl.owner = owner;
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> StorageAdminResult<()> {
        self.record(format!("DeleteBucket:{bucket}"));
        let mut state = self.state.lock();
        let has_objects = match state.buckets.get(bucket) {
            None => return Err(not_found("DeleteBucket", "NoSuchBucket")),
            Some(b) => !b.objects.is_empty(),
        };
        if has_objects {
            return Err(conflict("DeleteBucket", "BucketNotEmpty"));
        }
        state.buckets.remove(bucket);
        Ok(())
    }

    async fn list_objects_page(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
    ) -> StorageAdminResult<ObjectPage> {
        self.record(format!(
            "ListObjectsV2:{bucket}:{}",
            continuation_token.unwrap_or("-")
        ));
        let state = self.state.lock();
        let entry = state
            .buckets
            .get(bucket)
            .ok_or_else(|| not_found("ListObjectsV2", "NoSuchBucket"))?;

        let start = continuation_token
            .and_then(|t| t.strip_prefix('t'))
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0);
        let end = (start + state.page_size).min(entry.objects.len());
        let objects: Vec<ObjectSummary> = entry
            .objects
            .iter()
            .skip(start)
            .take(end.saturating_sub(start))
            .map(|(key, body)| ObjectSummary {
                key: key.clone(),
                size_bytes: i64::try_from(body.len()).unwrap_or(i64::MAX),
                last_modified: None,
            })
            .collect();

        let is_truncated = end < entry.objects.len();
        let next_continuation_token = if !is_truncated || state.missing_token {
            None
        } else if state.stuck_token {
            Some(continuation_token.map_or_else(|| format!("t{end}"), ToOwned::to_owned))
        } else {
            Some(format!("t{end}"))
        };

        Ok(ObjectPage {
            objects,
            is_truncated,
            next_continuation_token,
        })
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> StorageAdminResult<()> {
        self.record(format!("PutObject:{bucket}/{key}"));
        let mut state = self.state.lock();
        let owner = state.owner.clone();
        let entry = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| not_found("PutObject", "NoSuchBucket"))?;
        entry.objects.insert(key.to_owned(), body);
        entry.object_acls.insert(
            key.to_owned(),
            Acl {
                owner,
                grants: Vec::new(),
            },
        );
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StorageAdminResult<()> {
        self.record(format!("DeleteObject:{bucket}/{key}"));
        let mut state = self.state.lock();
        if state.fail_delete_on.as_deref() == Some(key) {
            return Err(StorageAdminError::remote(
                "DeleteObject",
                Some(500),
                Some("InternalError".to_owned()),
                "injected failure",
            ));
        }
        let entry = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| not_found("DeleteObject", "NoSuchBucket"))?;
        entry.objects.remove(key);
        entry.object_acls.remove(key);
        Ok(())
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageAdminResult<Url> {
        self.record(format!("PresignGetObject:{bucket}/{key}"));
        Url::parse(&format!(
            "http://fake.local/{bucket}/{key}?X-Amz-Expires={}",
            expires_in.as_secs()
        ))
        .map_err(|e| StorageAdminError::InvalidArgument(e.to_string()))
    }

    async fn bucket_acl(&self, bucket: &str) -> StorageAdminResult<Acl> {
        self.record(format!("GetBucketAcl:{bucket}"));
        self.state
            .lock()
            .buckets
            .get(bucket)
            .map(|b| b.acl.clone())
            .ok_or_else(|| not_found("GetBucketAcl", "NoSuchBucket"))
    }

    async fn put_bucket_acl(&self, bucket: &str, acl: &Acl) -> StorageAdminResult<()> {
        self.record(format!("PutBucketAcl:{bucket}"));
        let mut state = self.state.lock();
        let entry = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| not_found("PutBucketAcl", "NoSuchBucket"))?;
        entry.acl = acl.clone();
        Ok(())
    }

    async fn object_acl(&self, bucket: &str, key: &str) -> StorageAdminResult<Acl> {
        self.record(format!("GetObjectAcl:{bucket}/{key}"));
        self.state
            .lock()
            .buckets
            .get(bucket)
            .and_then(|b| b.object_acls.get(key).cloned())
            .ok_or_else(|| not_found("GetObjectAcl", "NoSuchKey"))
    }

    async fn put_object_acl(&self, bucket: &str, key: &str, acl: &Acl) -> StorageAdminResult<()> {
        self.record(format!("PutObjectAcl:{bucket}/{key}"));
        let mut state = self.state.lock();
        let entry = state
            .buckets
            .get_mut(bucket)
            .filter(|b| b.objects.contains_key(key))
            .ok_or_else(|| not_found("PutObjectAcl", "NoSuchKey"))?;
        entry.object_acls.insert(key.to_owned(), acl.clone());
        Ok(())
    }
}

/// Hands out the same fake store for every key.
#[derive(Debug)]
pub(crate) struct FakeStoreFactory {
    store: Arc<FakeObjectStore>,
}

impl FakeStoreFactory {
    pub(crate) fn new(store: Arc<FakeObjectStore>) -> Self {
        Self { store }
    }
}

impl ObjectStoreFactory for FakeStoreFactory {
    fn client_for(&self, _key: &AccessKeyPair) -> StorageAdminResult<Arc<dyn ObjectStore>> {
        Ok(Arc::clone(&self.store) as Arc<dyn ObjectStore>)
    }
}

#[derive(Debug, Default)]
struct FakeAdminState {
    users: BTreeMap<String, UserInfo>,
    user_quotas: HashMap<String, Quota>,
    buckets: HashMap<String, BucketInfo>,
    generated_keys: usize,
    calls: Vec<String>,
}

/// Admin API keeping users and bucket records in memory.
///
/// Like the gateway with `purge-keys=false`, it refuses to remove a sub-user
/// that still owns keys.
#[derive(Debug, Default)]
pub(crate) struct FakeAdmin {
    state: Mutex<FakeAdminState>,
}

impl FakeAdmin {
    pub(crate) fn with_user(self, uid: &str) -> Self {
        self.state.lock().users.insert(
            uid.to_owned(),
            UserInfo {
                user_id: uid.to_owned(),
                display_name: uid.to_owned(),
                ..UserInfo::default()
            },
        );
        self
    }

    pub(crate) fn with_user_quota(self, uid: &str, max_size_kb: i64, max_objects: i64) -> Self {
        self.state.lock().user_quotas.insert(
            uid.to_owned(),
            Quota {
                enabled: true,
                max_size_kb,
                max_objects,
            },
        );
        self
    }

    pub(crate) fn with_bucket(self, info: BucketInfo) -> Self {
        self.state
            .lock()
            .buckets
            .insert(info.bucket.clone(), info);
        self
    }

    pub(crate) fn bucket(&self, bucket: &str) -> Option<BucketInfo> {
        self.state.lock().buckets.get(bucket).cloned()
    }

    pub(crate) fn user(&self, uid: &str) -> Option<UserInfo> {
        self.state.lock().users.get(uid).cloned()
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.state.lock().calls.push(call.into());
    }
}

#[async_trait::async_trait]
impl AdminApi for FakeAdmin {
    async fn bucket_info(&self, bucket: &str) -> StorageAdminResult<Option<BucketInfo>> {
        self.record(format!("GetBucketInfo:{bucket}"));
        Ok(self.state.lock().buckets.get(bucket).cloned())
    }

    async fn user_quota(&self, uid: &str) -> StorageAdminResult<Option<Quota>> {
        self.record(format!("GetUserQuota:{uid}"));
        Ok(self.state.lock().user_quotas.get(uid).copied())
    }

    async fn set_bucket_quota(
        &self,
        uid: &str,
        bucket: &str,
        quota: &QuotaSpec,
    ) -> StorageAdminResult<()> {
        self.record(format!("SetBucketQuota:{uid}:{bucket}"));
        let mut state = self.state.lock();
        let info = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| not_found("SetBucketQuota", "NoSuchBucket"))?;
        info.bucket_quota = Quota {
            enabled: true,
            max_size_kb: quota.max_size_kb,
            max_objects: quota.max_objects,
        };
        Ok(())
    }

    async fn create_user(&self, spec: &UserSpec) -> StorageAdminResult<UserInfo> {
        self.record(format!("CreateUser:{}", spec.uid));
        let mut state = self.state.lock();
        if state.users.contains_key(&spec.uid) {
            return Err(conflict("CreateUser", "UserAlreadyExists"));
        }
        let user = UserInfo {
            user_id: spec.uid.clone(),
            display_name: spec.display_name.clone(),
            email: spec.email.clone(),
            ..UserInfo::default()
        };
        state.users.insert(spec.uid.clone(), user.clone());
        Ok(user)
    }

    async fn user_info(&self, uid: &str) -> StorageAdminResult<Option<UserInfo>> {
        self.record(format!("GetUserInfo:{uid}"));
        Ok(self.state.lock().users.get(uid).cloned())
    }

    async fn create_sub_user(
        &self,
        uid: &str,
        spec: &SubUserSpec,
    ) -> StorageAdminResult<Vec<SubUser>> {
        self.record(format!("CreateSubUser:{uid}:{}", spec.sub_user_id));
        let mut state = self.state.lock();
        let user = state
            .users
            .get_mut(uid)
            .ok_or_else(|| not_found("CreateSubUser", "NoSuchUser"))?;
        let id = qualified_sub_user_id(uid, &spec.sub_user_id);
        user.subusers.push(SubUser {
            id: id.clone(),
            permissions: spec.permission,
        });
        user.keys.push(S3Credential {
            user: id,
            access_key: spec.access_key.clone(),
            secret_key: spec.secret_key.clone(),
        });
        Ok(user.subusers.clone())
    }

    async fn set_sub_user_permission(
        &self,
        uid: &str,
        sub_user_id: &str,
        permission: SubUserPermission,
    ) -> StorageAdminResult<()> {
        self.record(format!("ModifySubUser:{uid}:{sub_user_id}"));
        let mut state = self.state.lock();
        let sub_user = state
            .users
            .get_mut(uid)
            .and_then(|u| u.subusers.iter_mut().find(|s| s.is(uid, sub_user_id)))
            .ok_or_else(|| not_found("ModifySubUser", "NoSuchSubUser"))?;
        sub_user.permissions = permission;
        Ok(())
    }

    async fn remove_sub_user(&self, uid: &str, sub_user_id: &str) -> StorageAdminResult<()> {
        self.record(format!("RemoveSubUser:{uid}:{sub_user_id}"));
        let mut state = self.state.lock();
        let user = state
            .users
            .get_mut(uid)
            .ok_or_else(|| not_found("RemoveSubUser", "NoSuchUser"))?;
        let id = qualified_sub_user_id(uid, sub_user_id);
        if user.keys.iter().any(|k| k.user == id) {
            return Err(conflict("RemoveSubUser", "SubUserHasKeys"));
        }
        let before = user.subusers.len();
        user.subusers.retain(|s| s.id != id);
        if user.subusers.len() == before {
            return Err(not_found("RemoveSubUser", "NoSuchSubUser"));
        }
        Ok(())
    }

    async fn create_s3_credential(
        &self,
        uid: &str,
        sub_user_id: Option<&str>,
        key: Option<&AccessKeyPair>,
    ) -> StorageAdminResult<Vec<S3Credential>> {
        self.record(format!("CreateKey:{uid}:{}", sub_user_id.unwrap_or("-")));
        let mut state = self.state.lock();
        state.generated_keys += 1;
        let generated = state.generated_keys;
        let user = state
            .users
            .get_mut(uid)
            .ok_or_else(|| not_found("CreateKey", "NoSuchUser"))?;
        let owner = sub_user_id.map_or_else(|| uid.to_owned(), |s| qualified_sub_user_id(uid, s));
        let pair = key.cloned().unwrap_or_else(|| {
            AccessKeyPair::new(format!("GEN{generated}"), format!("GENSECRET{generated}"))
        });
        user.keys.push(S3Credential {
            user: owner,
            access_key: pair.access_key,
            secret_key: pair.secret_key,
        });
        Ok(user.keys.clone())
    }

    async fn remove_s3_credential(
        &self,
        uid: &str,
        sub_user_id: Option<&str>,
        access_key: &str,
    ) -> StorageAdminResult<()> {
        self.record(format!(
            "RemoveKey:{uid}:{}:{access_key}",
            sub_user_id.unwrap_or("-")
        ));
        let mut state = self.state.lock();
        let user = state
            .users
            .get_mut(uid)
            .ok_or_else(|| not_found("RemoveKey", "NoSuchUser"))?;
        let owner = sub_user_id.map_or_else(|| uid.to_owned(), |s| qualified_sub_user_id(uid, s));
        let before = user.keys.len();
        user.keys
            .retain(|k| !(k.access_key == access_key && k.user == owner));
        if user.keys.len() == before {
            return Err(not_found("RemoveKey", "InvalidAccessKeyId"));
        }
        Ok(())
    }
}

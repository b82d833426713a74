//! [`ObjectStore`] over `aws-sdk-s3`.
//!
//! The client is pointed at the gateway endpoint with path-style addressing,
//! signs with the caller's key and the configured region, and is bounded by
//! the configured operation timeout.

use std::sync::Arc;
use std::time::Duration;

use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region, RequestChecksumCalculation};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::{ByteStream, DateTime as SdkDateTime};
use aws_sdk_s3::types::{
    AccessControlPolicy, Grant, Grantee as SdkGrantee, Owner, Permission, Type,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::Url;
use sodas_rgw_model::{
    AccessKeyPair, Acl, AclGrant, AclOwner, AclPermission, BucketSummary, Grantee, ObjectPage,
    ObjectSummary,
};
use tracing::{debug, warn};

use crate::config::GatewayConfig;
use crate::error::{StorageAdminError, StorageAdminResult};
use crate::store::{ObjectStore, ObjectStoreFactory};

/// Provider name attached to the static credentials.
const CREDENTIALS_PROVIDER: &str = "sodas-rgw";

/// Builds one [`S3ObjectStore`] per caller key.
#[derive(Debug, Clone)]
pub struct S3StoreFactory {
    config: Arc<GatewayConfig>,
}

impl S3StoreFactory {
    /// Create a factory for the configured gateway.
    #[must_use]
    pub fn new(config: Arc<GatewayConfig>) -> Self {
        Self { config }
    }
}

impl ObjectStoreFactory for S3StoreFactory {
    fn client_for(&self, key: &AccessKeyPair) -> StorageAdminResult<Arc<dyn ObjectStore>> {
        Ok(Arc::new(S3ObjectStore::new(&self.config, key)?))
    }
}

/// Object store backed by an `aws-sdk-s3` client.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    /// Build a path-style client for `key` against the configured gateway.
    ///
    /// # Errors
    ///
    /// [`StorageAdminError::Configuration`] if the endpoint is malformed or
    /// either half of the key is empty.
    pub fn new(config: &GatewayConfig, key: &AccessKeyPair) -> StorageAdminResult<Self> {
        if key.access_key.is_empty() || key.secret_key.is_empty() {
            return Err(StorageAdminError::Configuration(
                "access key and secret key must not be empty".to_owned(),
            ));
        }
        let endpoint = config.endpoint_url()?;

        let credentials = Credentials::new(
            key.access_key.clone(),
            key.secret_key.clone(),
            None,
            None,
            CREDENTIALS_PROVIDER,
        );
        let timeouts = TimeoutConfig::builder()
            .operation_timeout(config.request_timeout())
            .build();

        let sdk_config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(endpoint.as_str().trim_end_matches('/'))
            .force_path_style(true)
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .timeout_config(timeouts)
            .build();

        debug!(endpoint = %endpoint, access_key = %key.access_key, "Built object store client");
        Ok(Self {
            client: aws_sdk_s3::Client::from_conf(sdk_config),
        })
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_buckets(&self) -> StorageAdminResult<Vec<BucketSummary>> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| StorageAdminError::from_sdk("ListBuckets", e))?;

        Ok(output
            .buckets()
            .iter()
            .map(|b| BucketSummary {
                name: b.name().unwrap_or_default().to_owned(),
                created_at: b.creation_date().and_then(to_chrono),
            })
            .collect())
    }

    async fn account_owner(&self) -> StorageAdminResult<Option<AclOwner>> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| StorageAdminError::from_sdk("ListBuckets", e))?;
        Ok(output.owner().and_then(owner_from_sdk))
    }

    async fn create_bucket(&self, bucket: &str) -> StorageAdminResult<()> {
        self.client
            .create_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| StorageAdminError::from_sdk("CreateBucket", e))?;
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> StorageAdminResult<()> {
        self.client
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| StorageAdminError::from_sdk("DeleteBucket", e))?;
        Ok(())
    }

    async fn list_objects_page(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
    ) -> StorageAdminResult<ObjectPage> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .set_continuation_token(continuation_token.map(ToOwned::to_owned))
            .send()
            .await
            .map_err(|e| StorageAdminError::from_sdk("ListObjectsV2", e))?;

        let objects = output
            .contents()
            .iter()
            .map(|o| ObjectSummary {
                key: o.key().unwrap_or_default().to_owned(),
                size_bytes: o.size().unwrap_or_default(),
                last_modified: o.last_modified().and_then(to_chrono),
            })
            .collect();

        Ok(ObjectPage {
            objects,
            is_truncated: output.is_truncated().unwrap_or(false),
            next_continuation_token: output.next_continuation_token().map(ToOwned::to_owned),
        })
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> StorageAdminResult<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_length(i64::try_from(body.len()).unwrap_or(i64::MAX))
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StorageAdminError::from_sdk("PutObject", e))?;
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StorageAdminResult<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageAdminError::from_sdk("DeleteObject", e))?;
        Ok(())
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageAdminResult<Url> {
        let presigning = PresigningConfig::expires_in(expires_in).map_err(|e| {
            StorageAdminError::InvalidArgument(format!("presign expiry {expires_in:?}: {e}"))
        })?;
        let request = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| StorageAdminError::from_sdk("GetObject", e))?;

        Url::parse(request.uri()).map_err(|e| {
            StorageAdminError::remote("GetObject", None, None, format!("bad presigned url: {e}"))
        })
    }

    async fn bucket_acl(&self, bucket: &str) -> StorageAdminResult<Acl> {
        let output = self
            .client
            .get_bucket_acl()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| StorageAdminError::from_sdk("GetBucketAcl", e))?;
        Ok(acl_from_sdk(output.owner(), output.grants()))
    }

    async fn put_bucket_acl(&self, bucket: &str, acl: &Acl) -> StorageAdminResult<()> {
        self.client
            .put_bucket_acl()
            .bucket(bucket)
            .access_control_policy(acl_to_sdk(acl)?)
            .send()
            .await
            .map_err(|e| StorageAdminError::from_sdk("PutBucketAcl", e))?;
        Ok(())
    }

    async fn object_acl(&self, bucket: &str, key: &str) -> StorageAdminResult<Acl> {
        let output = self
            .client
            .get_object_acl()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageAdminError::from_sdk("GetObjectAcl", e))?;
        Ok(acl_from_sdk(output.owner(), output.grants()))
    }

    async fn put_object_acl(&self, bucket: &str, key: &str, acl: &Acl) -> StorageAdminResult<()> {
        self.client
            .put_object_acl()
            .bucket(bucket)
            .key(key)
            .access_control_policy(acl_to_sdk(acl)?)
            .send()
            .await
            .map_err(|e| StorageAdminError::from_sdk("PutObjectAcl", e))?;
        Ok(())
    }
}

fn to_chrono(dt: &SdkDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}

fn owner_from_sdk(owner: &Owner) -> Option<AclOwner> {
    owner.id().map(|id| AclOwner {
        id: id.to_owned(),
        display_name: owner.display_name().map(ToOwned::to_owned),
    })
}

fn acl_from_sdk(owner: Option<&Owner>, grants: &[Grant]) -> Acl {
    let grants = grants
        .iter()
        .filter_map(|grant| {
            let grantee = grantee_from_sdk(grant.grantee()?)?;
            let raw = grant.permission()?.as_str();
            match raw.parse::<AclPermission>() {
                Ok(permission) => Some(AclGrant {
                    grantee,
                    permission,
                }),
                Err(e) => {
                    warn!(permission = raw, error = %e, "Skipping grant with unknown permission");
                    None
                }
            }
        })
        .collect();

    Acl {
        owner: owner.and_then(owner_from_sdk),
        grants,
    }
}

fn grantee_from_sdk(grantee: &SdkGrantee) -> Option<Grantee> {
    if let Some(id) = grantee.id() {
        return Some(Grantee::CanonicalUser {
            id: id.to_owned(),
            display_name: grantee.display_name().map(ToOwned::to_owned),
        });
    }
    if let Some(uri) = grantee.uri() {
        return Some(Grantee::Group {
            uri: uri.to_owned(),
        });
    }
    grantee.email_address().map(|address| Grantee::Email {
        address: address.to_owned(),
    })
}

fn grantee_to_sdk(grantee: &Grantee) -> StorageAdminResult<SdkGrantee> {
    let builder = match grantee {
        Grantee::CanonicalUser { id, display_name } => SdkGrantee::builder()
            .r#type(Type::CanonicalUser)
            .id(id)
            .set_display_name(display_name.clone()),
        Grantee::Group { uri } => SdkGrantee::builder().r#type(Type::Group).uri(uri),
        Grantee::Email { address } => SdkGrantee::builder()
            .r#type(Type::AmazonCustomerByEmail)
            .email_address(address),
    };
    builder
        .build()
        .map_err(|e| StorageAdminError::InvalidArgument(format!("invalid grantee: {e}")))
}

fn acl_to_sdk(acl: &Acl) -> StorageAdminResult<AccessControlPolicy> {
    let grants = acl
        .grants
        .iter()
        .map(|grant| {
            Ok(Grant::builder()
                .grantee(grantee_to_sdk(&grant.grantee)?)
                .permission(Permission::from(grant.permission.as_str()))
                .build())
        })
        .collect::<StorageAdminResult<Vec<_>>>()?;

    let owner = acl.owner.as_ref().map(|o| {
        Owner::builder()
            .id(&o.id)
            .set_display_name(o.display_name.clone())
            .build()
    });

    Ok(AccessControlPolicy::builder()
        .set_grants(Some(grants))
        .set_owner(owner)
        .build())
}

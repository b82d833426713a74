//! HTTP client for the RGW admin REST API.
//!
//! Every request carries `format=json` and is signed with SigV4 (service
//! `s3`) using the service's admin credentials. The query string is encoded
//! once with [`encode_query_pairs`] and sent exactly as signed.

use bytes::Bytes;
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use sodas_rgw_auth::{SignedRequest, SigningParams, encode_query_pairs, hash_payload, sign_request};
use sodas_rgw_model::{
    AccessKeyPair, BucketInfo, Quota, QuotaSpec, S3Credential, SubUser, SubUserPermission,
    SubUserSpec, UserInfo, UserSpec, qualified_sub_user_id,
};
use tracing::{debug, info};

use super::AdminApi;
use crate::config::GatewayConfig;
use crate::error::{StorageAdminError, StorageAdminResult};

/// Signing service name; RGW verifies admin requests like S3 requests.
const SIGNING_SERVICE: &str = "s3";

/// Error document returned by the admin API.
#[derive(Debug, Default, Deserialize)]
struct RemoteErrorBody {
    #[serde(rename = "Code")]
    code: Option<String>,
    #[serde(rename = "Message")]
    message: Option<String>,
}

/// Signed client for `<endpoint><admin_path>`.
#[derive(Debug, Clone)]
pub struct RgwAdminClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: AccessKeyPair,
    region: String,
}

impl RgwAdminClient {
    /// Build a client from the configured admin credentials.
    ///
    /// # Errors
    ///
    /// [`StorageAdminError::Configuration`] if the admin credentials are
    /// missing, the endpoint is malformed, or the HTTP client cannot be built.
    pub fn new(config: &GatewayConfig) -> StorageAdminResult<Self> {
        if config.admin_access_key.is_empty() || config.admin_secret_key.is_empty() {
            return Err(StorageAdminError::Configuration(
                "admin access key and secret key must be set".to_owned(),
            ));
        }
        let base_url = config.admin_url()?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| {
                StorageAdminError::Configuration(format!("failed to build admin http client: {e}"))
            })?;

        Ok(Self {
            http,
            base_url,
            credentials: AccessKeyPair::new(
                config.admin_access_key.clone(),
                config.admin_secret_key.clone(),
            ),
            region: config.region.clone(),
        })
    }

    /// URL of an admin resource (`user`, `bucket`, ...) with the given
    /// parameters plus `format=json`.
    fn resource_url(&self, resource: &str, params: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        let base = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{base}/{resource}"));

        let mut pairs = params.to_vec();
        pairs.push(("format", "json"));
        url.set_query(Some(&encode_query_pairs(&pairs)));
        url
    }

    fn sign(&self, method: &Method, url: &Url, payload: &[u8]) -> SignedRequest {
        let host = host_header(url);
        let params = SigningParams {
            access_key: &self.credentials.access_key,
            secret_key: &self.credentials.secret_key,
            region: &self.region,
            service: SIGNING_SERVICE,
            time: Utc::now(),
        };
        sign_request(
            method.as_str(),
            url.path(),
            url.query().unwrap_or_default(),
            &[("host", host.as_str())],
            &hash_payload(payload),
            &params,
        )
    }

    /// Send a signed request and return the body of a `2xx` response.
    async fn call(
        &self,
        operation: &'static str,
        method: Method,
        resource: &str,
        params: &[(&str, &str)],
        body: Option<Vec<u8>>,
    ) -> StorageAdminResult<Bytes> {
        let url = self.resource_url(resource, params);
        let payload = body.unwrap_or_default();
        let signed = self.sign(&method, &url, &payload);
        debug!(operation, method = %method, path = url.path(), "Sending admin request");

        let mut request = self.http.request(method, url);
        for (name, value) in signed.headers() {
            request = request.header(name, value);
        }
        if !payload.is_empty() {
            request = request.header(CONTENT_TYPE, "application/json");
        }

        let response = request
            .body(payload)
            .send()
            .await
            .map_err(|e| transport_error(operation, &e))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(operation, &e))?;

        if status.is_success() {
            Ok(bytes)
        } else {
            Err(remote_error(operation, status, &bytes))
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        resource: &str,
        params: &[(&str, &str)],
    ) -> StorageAdminResult<Option<T>> {
        let body =
            absent_on_not_found(self.call(operation, Method::GET, resource, params, None).await)?;
        body.map(|b| parse_body(operation, &b)).transpose()
    }
}

#[async_trait::async_trait]
impl AdminApi for RgwAdminClient {
    async fn bucket_info(&self, bucket: &str) -> StorageAdminResult<Option<BucketInfo>> {
        self.fetch(
            "GetBucketInfo",
            "bucket",
            &[("bucket", bucket), ("stats", "true")],
        )
        .await
    }

    async fn user_quota(&self, uid: &str) -> StorageAdminResult<Option<Quota>> {
        self.fetch(
            "GetUserQuota",
            "user",
            &[("quota", ""), ("uid", uid), ("quota-type", "user")],
        )
        .await
    }

    async fn set_bucket_quota(
        &self,
        uid: &str,
        bucket: &str,
        quota: &QuotaSpec,
    ) -> StorageAdminResult<()> {
        let body = serde_json::to_vec(&serde_json::json!({
            "max_objects": quota.max_objects,
            "max_size_kb": quota.max_size_kb,
            "enabled": true,
        }))
        .map_err(|e| StorageAdminError::InvalidArgument(format!("quota body: {e}")))?;

        self.call(
            "SetBucketQuota",
            Method::PUT,
            "bucket",
            &[("quota", ""), ("uid", uid), ("bucket", bucket)],
            Some(body),
        )
        .await?;
        info!(
            uid,
            bucket,
            max_size_kb = quota.max_size_kb,
            max_objects = quota.max_objects,
            "Set bucket quota"
        );
        Ok(())
    }

    async fn create_user(&self, spec: &UserSpec) -> StorageAdminResult<UserInfo> {
        let mut params = vec![
            ("uid", spec.uid.as_str()),
            ("display-name", spec.display_name.as_str()),
        ];
        if !spec.email.is_empty() {
            params.push(("email", spec.email.as_str()));
        }

        let body = self
            .call("CreateUser", Method::PUT, "user", &params, None)
            .await?;
        info!(uid = %spec.uid, "Created user");
        parse_body("CreateUser", &body)
    }

    async fn user_info(&self, uid: &str) -> StorageAdminResult<Option<UserInfo>> {
        self.fetch("GetUserInfo", "user", &[("uid", uid)]).await
    }

    async fn create_sub_user(
        &self,
        uid: &str,
        spec: &SubUserSpec,
    ) -> StorageAdminResult<Vec<SubUser>> {
        let sub_user = qualified_sub_user_id(uid, &spec.sub_user_id);
        let mut params = vec![
            ("uid", uid),
            ("subuser", sub_user.as_str()),
            ("access-key", spec.access_key.as_str()),
            ("secret-key", spec.secret_key.as_str()),
            ("key-type", "s3"),
        ];
        if spec.permission != SubUserPermission::None {
            params.push(("access", spec.permission.as_access_param()));
        }

        let body = self
            .call("CreateSubUser", Method::PUT, "user", &params, None)
            .await?;
        info!(uid, sub_user = %sub_user, "Created sub-user");
        parse_body("CreateSubUser", &body)
    }

    async fn set_sub_user_permission(
        &self,
        uid: &str,
        sub_user_id: &str,
        permission: SubUserPermission,
    ) -> StorageAdminResult<()> {
        let sub_user = qualified_sub_user_id(uid, sub_user_id);
        self.call(
            "ModifySubUser",
            Method::POST,
            "user",
            &[
                ("uid", uid),
                ("subuser", sub_user.as_str()),
                ("access", permission.as_access_param()),
            ],
            None,
        )
        .await?;
        info!(uid, sub_user = %sub_user, %permission, "Changed sub-user permission");
        Ok(())
    }

    async fn remove_sub_user(&self, uid: &str, sub_user_id: &str) -> StorageAdminResult<()> {
        let sub_user = qualified_sub_user_id(uid, sub_user_id);
        self.call(
            "RemoveSubUser",
            Method::DELETE,
            "user",
            &[("uid", uid), ("subuser", sub_user.as_str())],
            None,
        )
        .await?;
        info!(uid, sub_user = %sub_user, "Removed sub-user");
        Ok(())
    }

    async fn create_s3_credential(
        &self,
        uid: &str,
        sub_user_id: Option<&str>,
        key: Option<&AccessKeyPair>,
    ) -> StorageAdminResult<Vec<S3Credential>> {
        let sub_user = sub_user_id.map(|s| qualified_sub_user_id(uid, s));
        let mut params = vec![("key", ""), ("uid", uid), ("key-type", "s3")];
        if let Some(sub_user) = &sub_user {
            params.push(("subuser", sub_user.as_str()));
        }
        match key {
            Some(key) => {
                params.push(("access-key", key.access_key.as_str()));
                params.push(("secret-key", key.secret_key.as_str()));
            }
            None => params.push(("generate-key", "true")),
        }

        let body = self
            .call("CreateKey", Method::PUT, "user", &params, None)
            .await?;
        info!(
            uid,
            sub_user = sub_user.as_deref(),
            generated = key.is_none(),
            "Created S3 key"
        );
        parse_body("CreateKey", &body)
    }

    async fn remove_s3_credential(
        &self,
        uid: &str,
        sub_user_id: Option<&str>,
        access_key: &str,
    ) -> StorageAdminResult<()> {
        let sub_user = sub_user_id.map(|s| qualified_sub_user_id(uid, s));
        let mut params = vec![
            ("key", ""),
            ("uid", uid),
            ("key-type", "s3"),
            ("access-key", access_key),
        ];
        if let Some(sub_user) = &sub_user {
            params.push(("subuser", sub_user.as_str()));
        }

        self.call("RemoveKey", Method::DELETE, "user", &params, None)
            .await?;
        info!(uid, sub_user = sub_user.as_deref(), access_key, "Removed S3 key");
        Ok(())
    }
}

/// `host[:port]` exactly as the HTTP client will send it.
fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    }
}

fn transport_error(operation: &'static str, err: &reqwest::Error) -> StorageAdminError {
    StorageAdminError::remote(
        operation,
        err.status().map(|s| s.as_u16()),
        None,
        err.to_string(),
    )
}

fn remote_error(operation: &'static str, status: StatusCode, body: &[u8]) -> StorageAdminError {
    let parsed: RemoteErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let message = parsed.message.unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_owned()
    });
    StorageAdminError::remote(operation, Some(status.as_u16()), parsed.code, message)
}

fn parse_body<T: DeserializeOwned>(operation: &'static str, body: &[u8]) -> StorageAdminResult<T> {
    serde_json::from_slice(body).map_err(|e| {
        StorageAdminError::remote(operation, None, None, format!("unexpected response body: {e}"))
    })
}

fn absent_on_not_found<T>(result: StorageAdminResult<T>) -> StorageAdminResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_remote_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

//! AWS Signature Version 4 signing.
//!
//! 1. Add `x-amz-date` and `x-amz-content-sha256` to the request headers.
//! 2. Build the canonical request over every header given.
//! 3. Build the string to sign from the timestamp, credential scope and
//!    canonical request hash.
//! 4. Derive the signing key with the HMAC-SHA256 chain and sign.
//!
//! The main entry point is [`sign_request`].

use chrono::{DateTime, Utc};
use hmac::{Hmac, KeyInit, Mac};
use sha2::{Digest, Sha256};
use tracing::trace;

use crate::canonical::{build_canonical_request, build_signed_headers_string};

/// The only algorithm produced by this implementation.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// `strftime` format of the `x-amz-date` header.
const AMZ_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// `strftime` format of the credential scope date.
const SCOPE_DATE_FORMAT: &str = "%Y%m%d";

type HmacSha256 = Hmac<Sha256>;

/// Inputs that identify the signer and the signing moment.
#[derive(Debug, Clone, Copy)]
pub struct SigningParams<'a> {
    /// Access key ID placed in the credential scope.
    pub access_key: &'a str,
    /// Secret key the signing key is derived from.
    pub secret_key: &'a str,
    /// Region of the credential scope.
    pub region: &'a str,
    /// Service of the credential scope (`s3` for RGW).
    pub service: &'a str,
    /// Signing time.
    pub time: DateTime<Utc>,
}

/// Header values produced by [`sign_request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// Value of the `Authorization` header.
    pub authorization: String,
    /// Value of the `x-amz-date` header.
    pub amz_date: String,
    /// Value of the `x-amz-content-sha256` header.
    pub content_sha256: String,
    /// The bare hex signature.
    pub signature: String,
}

impl SignedRequest {
    /// Header name/value pairs to attach to the outgoing request.
    #[must_use]
    pub fn headers(&self) -> [(&'static str, &str); 3] {
        [
            ("authorization", self.authorization.as_str()),
            ("x-amz-date", self.amz_date.as_str()),
            ("x-amz-content-sha256", self.content_sha256.as_str()),
        ]
    }
}

/// Sign an outgoing request.
///
/// `headers` must contain at least `host`, with the exact value the HTTP
/// client will send. `query` must be the encoded query string that goes on
/// the wire.
#[must_use]
pub fn sign_request(
    method: &str,
    path: &str,
    query: &str,
    headers: &[(&str, &str)],
    payload_hash: &str,
    params: &SigningParams<'_>,
) -> SignedRequest {
    let amz_date = params.time.format(AMZ_DATE_FORMAT).to_string();
    let scope_date = params.time.format(SCOPE_DATE_FORMAT).to_string();

    let mut owned: Vec<(String, String)> = headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), (*value).to_owned()))
        .filter(|(name, _)| name != "x-amz-date" && name != "x-amz-content-sha256")
        .collect();
    owned.push(("x-amz-content-sha256".to_owned(), payload_hash.to_owned()));
    owned.push(("x-amz-date".to_owned(), amz_date.clone()));

    let header_pairs: Vec<(&str, &str)> = owned
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect();
    let mut signed_headers: Vec<&str> = header_pairs.iter().map(|(name, _)| *name).collect();
    signed_headers.sort_unstable();
    signed_headers.dedup();

    let canonical_request = build_canonical_request(
        method,
        path,
        query,
        &header_pairs,
        &signed_headers,
        payload_hash,
    );
    trace!(canonical_request, "Built canonical request");

    let canonical_hash = hex::encode(Sha256::digest(canonical_request.as_bytes()));
    let credential_scope = format!(
        "{scope_date}/{}/{}/aws4_request",
        params.region, params.service
    );
    let string_to_sign = build_string_to_sign(&amz_date, &credential_scope, &canonical_hash);

    let signing_key = derive_signing_key(
        params.secret_key,
        &scope_date,
        params.region,
        params.service,
    );
    let signature = compute_signature(&signing_key, &string_to_sign);

    let authorization = format!(
        "{ALGORITHM} Credential={}/{credential_scope}, SignedHeaders={}, Signature={signature}",
        params.access_key,
        build_signed_headers_string(&signed_headers),
    );

    SignedRequest {
        authorization,
        amz_date,
        content_sha256: payload_hash.to_owned(),
        signature,
    }
}

/// Build the SigV4 string to sign.
///
/// # Examples
///
/// ```
/// use sodas_rgw_auth::sigv4::build_string_to_sign;
///
/// let sts = build_string_to_sign(
///     "20130524T000000Z",
///     "20130524/us-east-1/s3/aws4_request",
///     "7344ae5b7ee6c3e7e6b0fe0640412a37625d1fbfff95c48bbb2dc43964946972",
/// );
/// assert!(sts.starts_with("AWS4-HMAC-SHA256\n20130524T000000Z\n"));
/// ```
#[must_use]
pub fn build_string_to_sign(
    timestamp: &str,
    credential_scope: &str,
    canonical_request_hash: &str,
) -> String {
    format!("{ALGORITHM}\n{timestamp}\n{credential_scope}\n{canonical_request_hash}")
}

/// Derive the SigV4 signing key.
///
/// ```text
/// DateKey              = HMAC-SHA256("AWS4" + secret_key, date)
/// DateRegionKey        = HMAC-SHA256(DateKey, region)
/// DateRegionServiceKey = HMAC-SHA256(DateRegionKey, service)
/// SigningKey           = HMAC-SHA256(DateRegionServiceKey, "aws4_request")
/// ```
#[must_use]
pub fn derive_signing_key(secret_key: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let date_key = hmac_sha256(format!("AWS4{secret_key}").as_bytes(), date.as_bytes());
    let date_region_key = hmac_sha256(&date_key, region.as_bytes());
    let date_region_service_key = hmac_sha256(&date_region_key, service.as_bytes());
    hmac_sha256(&date_region_service_key, b"aws4_request")
}

/// Hex-encoded HMAC-SHA256 of `data` under `signing_key`.
#[must_use]
pub fn compute_signature(signing_key: &[u8], data: &str) -> String {
    hex::encode(hmac_sha256(signing_key, data.as_bytes()))
}

/// Hex-encoded SHA-256 of a payload, the `x-amz-content-sha256` value.
///
/// # Examples
///
/// ```
/// use sodas_rgw_auth::sigv4::hash_payload;
///
/// assert_eq!(
///     hash_payload(b""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
#[must_use]
pub fn hash_payload(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can accept keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

//! Bucket and object listing records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bucket visible to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketSummary {
    /// Bucket name.
    pub name: String,
    /// Creation time, when the gateway reports one.
    pub created_at: Option<DateTime<Utc>>,
}

/// An object inside a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSummary {
    /// Object key.
    pub key: String,
    /// Object size in bytes.
    pub size_bytes: i64,
    /// Last modification time, when the gateway reports one.
    pub last_modified: Option<DateTime<Utc>>,
}

/// One page of an object listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    /// Objects in this page, in listing order.
    pub objects: Vec<ObjectSummary>,
    /// Whether more pages follow.
    pub is_truncated: bool,
    /// Token to request the next page with.
    pub next_continuation_token: Option<String>,
}

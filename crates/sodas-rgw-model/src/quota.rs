//! Quota records and the admin API's bucket statistics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Usage category RGW reports for regular object data.
pub const MAIN_USAGE_CATEGORY: &str = "rgw.main";

/// A requested or current size/object-count limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaSpec {
    /// Maximum bucket size in KiB.
    pub max_size_kb: i64,
    /// Maximum number of objects.
    pub max_objects: i64,
}

impl QuotaSpec {
    /// Create a quota from its two limits.
    #[must_use]
    pub const fn new(max_size_kb: i64, max_objects: i64) -> Self {
        Self {
            max_size_kb,
            max_objects,
        }
    }

    /// Whether both limits of `self` are within `limit`.
    ///
    /// Plain numeric comparison: RGW's negative "unlimited" marker on `limit`
    /// is compared as the number it is.
    #[must_use]
    pub fn fits_within(&self, limit: &Quota) -> bool {
        self.max_size_kb <= limit.max_size_kb && self.max_objects <= limit.max_objects
    }
}

/// A quota as reported by the admin API (user or bucket scope).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    /// Whether the gateway enforces this quota.
    #[serde(default)]
    pub enabled: bool,
    /// Maximum size in KiB; negative means unlimited.
    #[serde(default)]
    pub max_size_kb: i64,
    /// Maximum number of objects; negative means unlimited.
    #[serde(default)]
    pub max_objects: i64,
}

impl From<Quota> for QuotaSpec {
    fn from(quota: Quota) -> Self {
        Self::new(quota.max_size_kb, quota.max_objects)
    }
}

/// Per-category usage statistics of a bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    /// Logical size in bytes.
    #[serde(default)]
    pub size: i64,
    /// Allocated size in bytes (rounded up to the backend's block size).
    #[serde(default)]
    pub size_actual: i64,
    /// Number of objects.
    #[serde(default)]
    pub num_objects: i64,
}

/// Bucket record returned by `GET /admin/bucket?stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketInfo {
    /// Bucket name.
    pub bucket: String,
    /// Owning user id.
    #[serde(default)]
    pub owner: String,
    /// Usage by category; empty for a bucket that never held data.
    #[serde(default)]
    pub usage: HashMap<String, UsageStats>,
    /// The bucket's own quota.
    #[serde(default)]
    pub bucket_quota: Quota,
}

impl BucketInfo {
    /// Usage of regular object data, zeroed when the gateway reports none.
    #[must_use]
    pub fn main_usage(&self) -> UsageStats {
        self.usage
            .get(MAIN_USAGE_CATEGORY)
            .copied()
            .unwrap_or_default()
    }
}

/// Quota limits of a bucket together with its current allocated size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BucketQuotaReport {
    /// Maximum bucket size in KiB.
    pub max_size_kb: i64,
    /// Maximum number of objects.
    pub max_objects: i64,
    /// Allocated size in bytes.
    pub actual_size_bytes: i64,
}

impl From<&BucketInfo> for BucketQuotaReport {
    fn from(info: &BucketInfo) -> Self {
        Self {
            max_size_kb: info.bucket_quota.max_size_kb,
            max_objects: info.bucket_quota.max_objects,
            actual_size_bytes: info.main_usage().size_actual,
        }
    }
}

/// Outcome of a bucket quota update.
///
/// Both variants carry the caller's requested quota unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaUpdate {
    /// The quota fit within the user's aggregate quota and was written.
    Applied(QuotaSpec),
    /// The quota exceeded the user's aggregate quota; nothing was written.
    Rejected(QuotaSpec),
}

impl QuotaUpdate {
    /// The requested quota, whatever the outcome.
    #[must_use]
    pub fn quota(&self) -> QuotaSpec {
        match self {
            Self::Applied(q) | Self::Rejected(q) => *q,
        }
    }

    /// Whether the quota was written.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

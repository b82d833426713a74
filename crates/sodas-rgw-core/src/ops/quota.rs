//! Quota operations backed by the admin API.

use sodas_rgw_model::{BucketInfo, BucketQuotaReport, QuotaSpec, QuotaUpdate};
use tracing::{debug, warn};

use crate::error::{StorageAdminError, StorageAdminResult};
use crate::provider::StorageAdmin;

impl StorageAdmin {
    /// Quota limits of `bucket` and its allocated size.
    pub async fn get_bucket_quota(&self, bucket: &str) -> StorageAdminResult<BucketQuotaReport> {
        let info = self.bucket_record(bucket).await?;
        Ok(BucketQuotaReport::from(&info))
    }

    /// Set the quota of `bucket` if it fits within the aggregate quota of
    /// its owner `uid`.
    ///
    /// Both outcomes carry `quota` unchanged; nothing is written on
    /// [`QuotaUpdate::Rejected`].
    pub async fn set_bucket_quota(
        &self,
        uid: &str,
        bucket: &str,
        quota: QuotaSpec,
    ) -> StorageAdminResult<QuotaUpdate> {
        let admin = self.admin_client()?;
        let limit = admin
            .user_quota(uid)
            .await?
            .ok_or_else(|| StorageAdminError::not_found("user quota", uid))?;

        if !quota.fits_within(&limit) {
            warn!(
                uid,
                bucket,
                requested_size_kb = quota.max_size_kb,
                requested_objects = quota.max_objects,
                user_size_kb = limit.max_size_kb,
                user_objects = limit.max_objects,
                "Bucket quota exceeds user quota, not applied"
            );
            return Ok(QuotaUpdate::Rejected(quota));
        }

        admin.set_bucket_quota(uid, bucket, &quota).await?;
        Ok(QuotaUpdate::Applied(quota))
    }

    /// Allocated size of `bucket` as a percentage of its size quota.
    ///
    /// # Errors
    ///
    /// [`StorageAdminError::QuotaUndefined`] when the bucket has no positive
    /// size quota.
    pub async fn quota_utilization_percent(&self, bucket: &str) -> StorageAdminResult<f64> {
        let info = self.bucket_record(bucket).await?;
        let max_size_kb = info.bucket_quota.max_size_kb;
        if max_size_kb <= 0 {
            return Err(StorageAdminError::QuotaUndefined {
                bucket: bucket.to_owned(),
            });
        }

        // Sizes stay far below 2^52 bytes, so the conversions are exact.
        #[allow(clippy::cast_precision_loss)]
        let percent =
            info.main_usage().size_actual as f64 / (max_size_kb as f64 * 1024.0) * 100.0;
        debug!(bucket, percent, "Computed quota utilization");
        Ok(percent)
    }

    /// Logical size of the objects in `bucket`, in bytes.
    pub async fn bucket_usage_bytes(&self, bucket: &str) -> StorageAdminResult<i64> {
        let info = self.bucket_record(bucket).await?;
        Ok(info.main_usage().size)
    }

    async fn bucket_record(&self, bucket: &str) -> StorageAdminResult<BucketInfo> {
        self.admin_client()?
            .bucket_info(bucket)
            .await?
            .ok_or_else(|| StorageAdminError::not_found("bucket", bucket))
    }
}

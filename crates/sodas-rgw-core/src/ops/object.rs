//! Object operations: upload, delete and presigned download URLs.

use bytes::Bytes;
use reqwest::Url;
use sodas_rgw_model::AccessKeyPair;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info};

use crate::error::StorageAdminResult;
use crate::provider::StorageAdmin;

impl StorageAdmin {
    /// Delete one object.
    pub async fn delete_object(
        &self,
        key: &AccessKeyPair,
        bucket: &str,
        object: &str,
    ) -> StorageAdminResult<()> {
        let store = self.authorized_store(key)?;
        store.delete_object(bucket, object).await?;
        info!(bucket, object, "Deleted object");
        Ok(())
    }

    /// Read `source` to its end and store it as `filename` in `bucket`.
    ///
    /// Nothing is sent when the source fails to read.
    pub async fn upload_object<R>(
        &self,
        key: &AccessKeyPair,
        mut source: R,
        filename: &str,
        bucket: &str,
    ) -> StorageAdminResult<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        let store = self.authorized_store(key)?;

        let mut buf = Vec::new();
        source.read_to_end(&mut buf).await?;
        let size = buf.len();

        store.put_object(bucket, filename, Bytes::from(buf)).await?;
        info!(bucket, object = filename, size, "Uploaded object");
        Ok(())
    }

    /// A presigned `GET` URL for `object`, valid for the configured expiry.
    pub async fn presigned_download_url(
        &self,
        key: &AccessKeyPair,
        bucket: &str,
        object: &str,
    ) -> StorageAdminResult<Url> {
        let store = self.authorized_store(key)?;
        let expires_in = self.config.presign_expiry();
        let url = store.presign_get(bucket, object, expires_in).await?;
        debug!(bucket, object, expires_in_secs = expires_in.as_secs(), "Presigned download url");
        Ok(url)
    }
}

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;

use crate::errors::AppError;
use crate::storage::{ObjectStore, StoredObject, UploadTarget};

/// S3-compatible store. Objects are addressed as `{public_base_url}/{folder}/{filename}`.
#[derive(Clone)]
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3Store {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        target: &UploadTarget,
    ) -> Result<StoredObject, AppError> {
        let key = target.key();
        let size = bytes.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes))
            .content_type(&target.content_type)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload of {key} failed: {e}")))?;

        info!("Uploaded {size} bytes to s3://{}/{}", self.bucket, key);

        Ok(StoredObject {
            url: format!("{}/{}", self.public_base_url, key),
            key,
        })
    }
}

use crate::config::S3Config;
use crate::error::PipelineError;
use anyhow::Result;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
#[cfg(test)]
use mockall::automock;
use tracing::{debug, info, instrument};

#[cfg(test)]
pub use MockPhotoObjectStore as ObjectStore;
#[cfg(not(test))]
pub use PhotoObjectStore as ObjectStore;

/// Derivatives must never be served stale: they are overwritten in place
/// whenever a photo is reprocessed.
const DERIVATIVE_CACHE_CONTROL: &str = "no-cache";

/// A fetched source image with its declared content type
#[derive(Debug, Clone)]
pub struct SourceObject {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

/// S3 client wrapper for the photo bucket
pub struct PhotoObjectStore {
    client: S3Client,
    bucket: String,
}

impl PhotoObjectStore {
    /// Create a new object store handle for the configured bucket
    pub async fn new(config: &S3Config) -> Result<Self> {
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        let mut s3_config_builder = S3ConfigBuilder::from(&aws_config);

        // Configure custom endpoint for MinIO/LocalStack
        if let Some(ref endpoint_url) = config.endpoint_url {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint_url);
        }

        // Force path-style access for MinIO compatibility
        if config.force_path_style {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }

        let client = S3Client::from_conf(s3_config_builder.build());

        info!(
            bucket = %config.bucket,
            region = %config.region,
            "Photo object store initialized"
        );

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
        })
    }
}

#[cfg_attr(test, automock)]
impl PhotoObjectStore {
    /// Fetch an original image by key
    ///
    /// The response body borrows the connection, so it is drained into memory
    /// here rather than handed back as a stream.
    #[instrument(skip(self))]
    pub async fn fetch_original(&self, key: &str) -> Result<SourceObject, PipelineError> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                if err
                    .as_service_error()
                    .map(GetObjectError::is_no_such_key)
                    .unwrap_or(false)
                {
                    PipelineError::SourceNotFound {
                        key: key.to_string(),
                    }
                } else {
                    PipelineError::SourceFetch {
                        key: key.to_string(),
                        message: err.to_string(),
                    }
                }
            })?;

        let content_type = response.content_type().map(str::to_string);

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|err| PipelineError::SourceFetch {
                key: key.to_string(),
                message: err.to_string(),
            })?
            .into_bytes();

        debug!(
            size_bytes = bytes.len(),
            content_type = content_type.as_deref().unwrap_or("<none>"),
            "Fetched source object"
        );

        Ok(SourceObject {
            bytes,
            content_type,
        })
    }

    /// Upload an encoded derivative to the given key
    #[instrument(skip(self, bytes), fields(size_bytes = bytes.len()))]
    pub async fn put_derivative(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), PipelineError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .cache_control(DERIVATIVE_CACHE_CONTROL)
            .send()
            .await
            .map_err(|err| PipelineError::Publish {
                key: key.to_string(),
                message: err.to_string(),
            })?;

        debug!("Derivative uploaded");

        Ok(())
    }
}

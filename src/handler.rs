use crate::config::Config;
use crate::error::PipelineError;
use crate::generator::DerivativeGenerator;
use crate::metadata_store::MetadataStore;
use crate::object_store::ObjectStore;
use crate::publisher::{DerivativePublisher, LARGE_PROFILE, SMALL_PROFILE};
use crate::stream::{self, MalformedEvent, PhotoInsert, StreamBatch};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Per-batch processing summary, observable via logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub processed: usize,
    pub failed: usize,
}

/// Drives the per-photo pipeline over one stream batch
///
/// One failed photo never blocks the rest of the batch: the failure is
/// logged with its classified kind and the batch continues. There is no
/// per-photo retry and no rollback of already-published derivatives;
/// reprocessing the same insert later converges to the same state because
/// every step overwrites deterministically.
pub struct PhotoPipeline {
    publisher: DerivativePublisher,
    metadata_store: Arc<MetadataStore>,
    base_content_url: String,
}

impl PhotoPipeline {
    pub fn new(
        object_store: Arc<ObjectStore>,
        metadata_store: Arc<MetadataStore>,
        config: &Config,
    ) -> Self {
        let generator =
            DerivativeGenerator::new(object_store.clone(), config.derivatives.jpeg_quality);
        let publisher = DerivativePublisher::new(object_store, generator, &config.derivatives);

        Self {
            publisher,
            metadata_store,
            base_content_url: config.cdn.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Process every insert record in the batch, in arrival order
    ///
    /// Returns an error only for a malformed batch; individual photo
    /// failures are absorbed here.
    #[instrument(skip(self, batch), fields(records = batch.records.len()))]
    pub async fn process_batch(&self, batch: &StreamBatch) -> Result<BatchOutcome, MalformedEvent> {
        let mut outcome = BatchOutcome::default();
        let mut inserts = 0usize;

        for insert in stream::extract_inserts(batch) {
            inserts += 1;
            let insert = insert?;

            info!(
                user_id = %insert.user_id,
                photo_uuid = %insert.photo_uuid,
                s3_key = %insert.source_key,
                sort_key = %insert.sort_key,
                "Processing photo insert"
            );

            match self.process_insert(&insert).await {
                Ok(()) => {
                    outcome.processed += 1;
                    metrics::counter!("derivatives.photos.processed").increment(1);
                    info!(s3_key = %insert.source_key, "Photo processed successfully");
                }
                Err(err) => {
                    outcome.failed += 1;
                    metrics::counter!("derivatives.photos.failed", "kind" => err.kind())
                        .increment(1);
                    error!(
                        error = %err,
                        kind = err.kind(),
                        user_id = %insert.user_id,
                        photo_uuid = %insert.photo_uuid,
                        s3_key = %insert.source_key,
                        "Failed to process photo insert"
                    );
                }
            }
        }

        let skipped = batch.records.len() - inserts;
        if skipped > 0 {
            metrics::counter!("derivatives.records.skipped").increment(skipped as u64);
        }

        info!(
            processed = outcome.processed,
            failed = outcome.failed,
            skipped = skipped,
            "Batch complete"
        );

        Ok(outcome)
    }

    /// Publish both derivatives for one photo, then record their URLs
    async fn process_insert(&self, insert: &PhotoInsert) -> Result<(), PipelineError> {
        // The two publishes read the same immutable source and write
        // distinct keys; the metadata update waits for both.
        let (thumbnail_key, high_quality_key) = futures::try_join!(
            self.publisher.publish(
                SMALL_PROFILE,
                &insert.source_key,
                &insert.user_id,
                &insert.photo_uuid,
            ),
            self.publisher.publish(
                LARGE_PROFILE,
                &insert.source_key,
                &insert.user_id,
                &insert.photo_uuid,
            ),
        )?;

        let thumbnail_url = self.content_url(&thumbnail_key);
        let high_quality_url = self.content_url(&high_quality_key);

        self.metadata_store
            .update_derivative_urls(
                &insert.user_id,
                &insert.sort_key,
                &thumbnail_url,
                &high_quality_url,
            )
            .await
    }

    fn content_url(&self, destination_key: &str) -> String {
        format!("{}/{}", self.base_content_url, destination_key)
    }
}

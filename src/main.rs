#![recursion_limit = "256"]

use anyhow::Context;
use derivatives_service::config::Config;
use derivatives_service::handler::PhotoPipeline;
use derivatives_service::metadata_store::PhotoMetadataStore;
use derivatives_service::object_store::PhotoObjectStore;
use derivatives_service::stream::StreamBatch;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_tracing(&config.service.log_level);

    info!(
        service = %config.service.name,
        bucket = %config.s3.bucket,
        table = %config.metadata.table,
        "Starting photo derivatives service"
    );

    // Initialize components
    let object_store = Arc::new(
        PhotoObjectStore::new(&config.s3)
            .await
            .context("Failed to initialize photo object store")?,
    );

    let metadata_store = Arc::new(PhotoMetadataStore::new(&config.metadata).await);

    let pipeline = Arc::new(PhotoPipeline::new(object_store, metadata_store, &config));

    run(service_fn(move |event: LambdaEvent<StreamBatch>| {
        let pipeline = pipeline.clone();
        async move {
            pipeline.process_batch(&event.payload).await?;
            Ok::<(), Error>(())
        }
    }))
    .await
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json())
        .init();
}

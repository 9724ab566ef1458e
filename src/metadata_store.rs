use crate::config::MetadataConfig;
use crate::error::PipelineError;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::config::Builder as DynamoConfigBuilder;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client as DynamoClient;
#[cfg(test)]
use mockall::automock;
use tracing::{debug, info, instrument};

#[cfg(test)]
pub use MockPhotoMetadataStore as MetadataStore;
#[cfg(not(test))]
pub use PhotoMetadataStore as MetadataStore;

/// Partial update touching only the two derivative URL fields, leaving the
/// rest of the record (caption, status, original URL, ...) untouched.
const UPDATE_DERIVATIVE_URLS: &str = "SET photo_info.mobile_thumbnail_url = :thumbnail_url, \
     photo_info.mobile_high_quality_url = :high_quality_url";

/// DynamoDB client wrapper for the photo gallery table
pub struct PhotoMetadataStore {
    client: DynamoClient,
    table: String,
}

impl PhotoMetadataStore {
    /// Create a new metadata store handle for the configured table
    pub async fn new(config: &MetadataConfig) -> Self {
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        let mut dynamo_config_builder = DynamoConfigBuilder::from(&aws_config);

        // Configure custom endpoint for DynamoDB Local
        if let Some(ref endpoint_url) = config.endpoint_url {
            dynamo_config_builder = dynamo_config_builder.endpoint_url(endpoint_url);
        }

        let client = DynamoClient::from_conf(dynamo_config_builder.build());

        info!(table = %config.table, "Photo metadata store initialized");

        Self {
            client,
            table: config.table.clone(),
        }
    }
}

#[cfg_attr(test, automock)]
impl PhotoMetadataStore {
    /// Set the derivative URLs on one photo record
    ///
    /// Conditioned on the record existing: an insert event always refers to a
    /// record that was just written, so a missing key is a store-level error
    /// reported to the caller, never an upsert.
    #[instrument(skip(self, thumbnail_url, high_quality_url))]
    pub async fn update_derivative_urls(
        &self,
        user_id: &str,
        sort_key: &str,
        thumbnail_url: &str,
        high_quality_url: &str,
    ) -> Result<(), PipelineError> {
        let response = self
            .client
            .update_item()
            .table_name(&self.table)
            .key("user_id", AttributeValue::S(user_id.to_string()))
            .key("sort_key", AttributeValue::S(sort_key.to_string()))
            .update_expression(UPDATE_DERIVATIVE_URLS)
            .expression_attribute_values(
                ":thumbnail_url",
                AttributeValue::S(thumbnail_url.to_string()),
            )
            .expression_attribute_values(
                ":high_quality_url",
                AttributeValue::S(high_quality_url.to_string()),
            )
            .condition_expression("attribute_exists(user_id)")
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await
            .map_err(|err| PipelineError::MetadataUpdate {
                user_id: user_id.to_string(),
                sort_key: sort_key.to_string(),
                message: err.to_string(),
            })?;

        debug!(
            updated_fields = response.attributes().map(|a| a.len()).unwrap_or(0),
            "Photo record updated with derivative urls"
        );

        Ok(())
    }
}

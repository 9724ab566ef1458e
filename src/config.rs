use serde::Deserialize;

/// Main configuration for the derivatives service
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Service configuration
    #[serde(default)]
    pub service: ServiceConfig,
    /// S3 configuration
    pub s3: S3Config,
    /// Photo metadata table configuration
    pub metadata: MetadataConfig,
    /// Content delivery configuration
    pub cdn: CdnConfig,
    /// Derivative profile configuration
    #[serde(default)]
    pub derivatives: DerivativesConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Service name for logging
    #[serde(default = "default_service_name")]
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// S3 configuration for the photo bucket
#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    /// Bucket holding originals and derivatives
    pub bucket: String,
    /// AWS region
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint URL (for MinIO, LocalStack, etc.)
    pub endpoint_url: Option<String>,
    /// Force path-style access (required for MinIO)
    #[serde(default)]
    pub force_path_style: bool,
}

/// DynamoDB configuration for the photo metadata table
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataConfig {
    /// Photo gallery table name
    pub table: String,
    /// AWS region
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint URL (for DynamoDB Local)
    pub endpoint_url: Option<String>,
}

/// Content delivery configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CdnConfig {
    /// Base URL prefixed to derivative object keys in stored records
    pub base_url: String,
}

/// Bounding boxes and encoder settings for the derivative profiles
#[derive(Debug, Clone, Deserialize)]
pub struct DerivativesConfig {
    /// Thumbnail bounding box
    #[serde(default = "default_small_bounds")]
    pub small: ProfileBounds,
    /// High-quality bounding box
    #[serde(default = "default_large_bounds")]
    pub large: ProfileBounds,
    /// JPEG encode quality (0-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

/// Maximum dimensions a derivative must fit within
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ProfileBounds {
    pub max_width: u32,
    pub max_height: u32,
}

// Default value functions
fn default_service_name() -> String {
    "derivatives-service".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_small_bounds() -> ProfileBounds {
    ProfileBounds {
        max_width: 320,
        max_height: 320,
    }
}

fn default_large_bounds() -> ProfileBounds {
    ProfileBounds {
        max_width: 1080,
        max_height: 1080,
    }
}

fn default_jpeg_quality() -> u8 {
    85
}

impl Config {
    /// Load configuration from environment and config files
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            // Add config file if present
            .add_source(config::File::with_name("config/derivatives").required(false))
            .add_source(config::File::with_name("/etc/gallery/derivatives").required(false))
            // Override with environment variables
            // GALLERY__S3__BUCKET -> s3.bucket
            .add_source(
                config::Environment::with_prefix("GALLERY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize().map_err(Into::into)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

impl Default for DerivativesConfig {
    fn default() -> Self {
        Self {
            small: default_small_bounds(),
            large: default_large_bounds(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let derivatives = DerivativesConfig::default();
        assert_eq!(derivatives.small.max_width, 320);
        assert_eq!(derivatives.large.max_height, 1080);
        assert_eq!(derivatives.jpeg_quality, 85);
    }

    #[test]
    fn test_small_bounds_fit_inside_large_bounds() {
        let derivatives = DerivativesConfig::default();
        assert!(derivatives.small.max_width <= derivatives.large.max_width);
        assert!(derivatives.small.max_height <= derivatives.large.max_height);
    }
}

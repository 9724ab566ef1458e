use crate::config::DerivativesConfig;
use crate::error::PipelineError;
use crate::generator::DerivativeGenerator;
use crate::object_store::ObjectStore;
use std::sync::Arc;
use tracing::{info, instrument};

/// Thumbnail profile name, also the middle segment of derivative keys
pub const SMALL_PROFILE: &str = "small";
/// High-quality profile name
pub const LARGE_PROFILE: &str = "large";

/// A named derivative profile with its bounding box
#[derive(Debug, Clone, Copy)]
pub struct DerivativeProfile {
    pub name: &'static str,
    pub max_width: u32,
    pub max_height: u32,
}

/// Generates and uploads one derivative per profile
///
/// The profile set is fixed at construction: exactly one thumbnail and one
/// high-quality variant per source image. Destination keys are deterministic
/// (`{user_id}/{profile}/{photo_uuid}`), so reprocessing a photo overwrites
/// its previous derivatives in place.
pub struct DerivativePublisher {
    store: Arc<ObjectStore>,
    generator: DerivativeGenerator,
    profiles: [DerivativeProfile; 2],
}

impl DerivativePublisher {
    pub fn new(
        store: Arc<ObjectStore>,
        generator: DerivativeGenerator,
        config: &DerivativesConfig,
    ) -> Self {
        let profiles = [
            DerivativeProfile {
                name: SMALL_PROFILE,
                max_width: config.small.max_width,
                max_height: config.small.max_height,
            },
            DerivativeProfile {
                name: LARGE_PROFILE,
                max_width: config.large.max_width,
                max_height: config.large.max_height,
            },
        ];

        Self {
            store,
            generator,
            profiles,
        }
    }

    /// Generate the profile's derivative of `source_key` and upload it,
    /// returning the destination key
    #[instrument(skip(self))]
    pub async fn publish(
        &self,
        profile_name: &str,
        source_key: &str,
        user_id: &str,
        photo_uuid: &str,
    ) -> Result<String, PipelineError> {
        // Resolve before touching the source: an unknown profile is a
        // configuration error, not a per-photo one.
        let profile = self.resolve_profile(profile_name)?;
        let destination_key = format!("{}/{}/{}", user_id, profile.name, photo_uuid);

        let derivative = self
            .generator
            .generate(source_key, (profile.max_width, profile.max_height))
            .await?;

        let content_type = derivative.encoding.derivative_content_type();
        self.store
            .put_derivative(&destination_key, derivative.bytes, &content_type)
            .await?;

        info!(
            destination_key = %destination_key,
            profile = profile.name,
            "Derivative published"
        );

        Ok(destination_key)
    }

    fn resolve_profile(&self, name: &str) -> Result<&DerivativeProfile, PipelineError> {
        self.profiles
            .iter()
            .find(|profile| profile.name == name)
            .ok_or_else(|| PipelineError::InvalidProfile(name.to_string()))
    }
}

use crate::encoding::EncodingError;
use thiserror::Error;

/// Errors from processing a single photo insert
///
/// Every variant is a per-item failure: the orchestrator logs it with the
/// offending identifiers and moves on to the next record. Batch-fatal
/// conditions live in [`crate::stream::MalformedEvent`] instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("source object not found: {key}")]
    SourceNotFound { key: String },

    #[error("failed to fetch source object {key}: {message}")]
    SourceFetch { key: String, message: String },

    #[error("unsupported source encoding: {0}")]
    UnsupportedEncoding(#[from] EncodingError),

    #[error("failed to decode image {key}: {message}")]
    Decode { key: String, message: String },

    #[error("failed to encode derivative as {format}: {message}")]
    Encode { format: String, message: String },

    #[error("failed to upload derivative {key}: {message}")]
    Publish { key: String, message: String },

    #[error("unknown derivative profile: {0}")]
    InvalidProfile(String),

    #[error("failed to update photo record ({user_id}, {sort_key}): {message}")]
    MetadataUpdate {
        user_id: String,
        sort_key: String,
        message: String,
    },
}

impl PipelineError {
    /// Stable tag for log fields and metric labels
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SourceNotFound { .. } => "source_not_found",
            Self::SourceFetch { .. } => "source_fetch",
            Self::UnsupportedEncoding(EncodingError::Missing) => "missing_content_type",
            Self::UnsupportedEncoding(EncodingError::Unsupported(_)) => "unsupported_encoding",
            Self::Decode { .. } => "decode",
            Self::Encode { .. } => "encode",
            Self::Publish { .. } => "publish",
            Self::InvalidProfile(_) => "invalid_profile",
            Self::MetadataUpdate { .. } => "metadata_update",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_distinguishes_classifier_failures() {
        let missing = PipelineError::from(EncodingError::Missing);
        let unsupported = PipelineError::from(EncodingError::Unsupported("gif".to_string()));

        assert_eq!(missing.kind(), "missing_content_type");
        assert_eq!(unsupported.kind(), "unsupported_encoding");
    }

    #[test]
    fn test_display_carries_identifiers() {
        let err = PipelineError::SourceNotFound {
            key: "42/original/abc-uuid".to_string(),
        };
        assert_eq!(err.to_string(), "source object not found: 42/original/abc-uuid");
    }
}

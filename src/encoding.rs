use thiserror::Error;

/// Errors from content-type classification
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodingError {
    #[error("source object has no content type")]
    Missing,

    #[error("unsupported content type: {0}")]
    Unsupported(String),
}

/// Normalized encoding of a source image and its derivatives
///
/// Only the formats the gallery accepts at upload time are supported here.
/// Anything else is rejected before any image bytes are touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEncoding {
    Jpeg,
    Png,
}

impl ImageEncoding {
    /// Classify an encoding from a declared content type
    ///
    /// The subtype is the substring after the last `/` (a value without a
    /// slash is treated as a bare subtype), trimmed. `jpg` normalizes to
    /// `jpeg` so it can be used directly as an encoder format tag.
    pub fn from_content_type(content_type: Option<&str>) -> Result<Self, EncodingError> {
        let content_type = content_type.ok_or(EncodingError::Missing)?;
        let subtype = content_type
            .rsplit('/')
            .next()
            .unwrap_or(content_type)
            .trim();

        match subtype {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            other => Err(EncodingError::Unsupported(other.to_string())),
        }
    }

    /// Encoder format tag (`jpeg`/`png`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }

    /// Content type stamped on uploaded derivatives
    pub fn derivative_content_type(&self) -> String {
        format!("application/{}", self.as_str())
    }
}

impl std::fmt::Display for ImageEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_supported_content_types() {
        assert_eq!(
            ImageEncoding::from_content_type(Some("image/jpeg")),
            Ok(ImageEncoding::Jpeg)
        );
        assert_eq!(
            ImageEncoding::from_content_type(Some("image/jpg")),
            Ok(ImageEncoding::Jpeg)
        );
        assert_eq!(
            ImageEncoding::from_content_type(Some("image/png")),
            Ok(ImageEncoding::Png)
        );
    }

    #[test]
    fn test_bare_subtype_is_accepted() {
        assert_eq!(
            ImageEncoding::from_content_type(Some("png")),
            Ok(ImageEncoding::Png)
        );
    }

    #[test]
    fn test_subtype_whitespace_is_trimmed() {
        assert_eq!(
            ImageEncoding::from_content_type(Some("image/jpeg ")),
            Ok(ImageEncoding::Jpeg)
        );
    }

    #[test]
    fn test_missing_content_type_is_rejected() {
        assert_eq!(
            ImageEncoding::from_content_type(None),
            Err(EncodingError::Missing)
        );
    }

    #[test]
    fn test_unsupported_content_types_are_rejected() {
        assert_eq!(
            ImageEncoding::from_content_type(Some("image/gif")),
            Err(EncodingError::Unsupported("gif".to_string()))
        );
        assert_eq!(
            ImageEncoding::from_content_type(Some("image/svg+xml")),
            Err(EncodingError::Unsupported("svg+xml".to_string()))
        );
        assert_eq!(
            ImageEncoding::from_content_type(Some("application/octet-stream")),
            Err(EncodingError::Unsupported("octet-stream".to_string()))
        );
    }

    #[test]
    fn test_derivative_content_type() {
        assert_eq!(
            ImageEncoding::Jpeg.derivative_content_type(),
            "application/jpeg"
        );
        assert_eq!(
            ImageEncoding::Png.derivative_content_type(),
            "application/png"
        );
    }
}

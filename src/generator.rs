use crate::encoding::ImageEncoding;
use crate::error::PipelineError;
use crate::object_store::ObjectStore;
use image::{DynamicImage, GenericImageView, ImageOutputFormat};
use std::io::Cursor;
use std::sync::Arc;
use tracing::{debug, instrument};

/// An encoded derivative ready for upload
#[derive(Debug, Clone)]
pub struct EncodedDerivative {
    pub bytes: Vec<u8>,
    pub encoding: ImageEncoding,
}

/// Produces size-bounded derivatives from original images
///
/// Fetches the original, classifies its encoding from the declared content
/// type, decodes, shrinks the image to fit a bounding box, and re-encodes in
/// the same encoding. The whole chain is deterministic: the same source and
/// bounds always produce the same bytes.
pub struct DerivativeGenerator {
    store: Arc<ObjectStore>,
    jpeg_quality: u8,
}

impl DerivativeGenerator {
    pub fn new(store: Arc<ObjectStore>, jpeg_quality: u8) -> Self {
        Self {
            store,
            jpeg_quality,
        }
    }

    /// Generate a derivative of the image at `source_key` bounded by
    /// `(max_width, max_height)`
    #[instrument(skip(self))]
    pub async fn generate(
        &self,
        source_key: &str,
        bounds: (u32, u32),
    ) -> Result<EncodedDerivative, PipelineError> {
        let (max_width, max_height) = bounds;
        let source = self.store.fetch_original(source_key).await?;
        let encoding = ImageEncoding::from_content_type(source.content_type.as_deref())?;

        let image =
            image::load_from_memory(&source.bytes).map_err(|err| PipelineError::Decode {
                key: source_key.to_string(),
                message: err.to_string(),
            })?;

        let (source_width, source_height) = image.dimensions();
        let resized = resize_to_fit(image, max_width, max_height);
        let (width, height) = resized.dimensions();

        let bytes = self.encode(&resized, encoding)?;

        debug!(
            source_width,
            source_height,
            width,
            height,
            encoding = %encoding,
            size_bytes = bytes.len(),
            "Derivative generated"
        );

        Ok(EncodedDerivative { bytes, encoding })
    }

    /// Encode an image into an in-memory buffer
    fn encode(
        &self,
        image: &DynamicImage,
        encoding: ImageEncoding,
    ) -> Result<Vec<u8>, PipelineError> {
        let format = match encoding {
            ImageEncoding::Jpeg => ImageOutputFormat::Jpeg(self.jpeg_quality),
            ImageEncoding::Png => ImageOutputFormat::Png,
        };

        let mut buf = Vec::new();
        let mut cursor = Cursor::new(&mut buf);

        image
            .write_to(&mut cursor, format)
            .map_err(|err| PipelineError::Encode {
                format: encoding.as_str().to_string(),
                message: err.to_string(),
            })?;

        Ok(buf)
    }
}

/// Shrink an image to fit within the bounding box, preserving aspect ratio
///
/// Images already inside the box are returned unchanged; nothing is ever
/// upscaled.
fn resize_to_fit(image: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    let (width, height) = image.dimensions();

    if width <= max_width && height <= max_height {
        return image;
    }

    image.thumbnail(max_width, max_height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::EncodingError;
    use crate::object_store::{MockPhotoObjectStore, SourceObject};
    use bytes::Bytes;
    use image::{Rgb, RgbImage};

    /// Encode a solid-color test image in the given format
    fn test_image_bytes(width: u32, height: u32, format: ImageOutputFormat) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            Rgb([120, 180, 60]),
        ));
        let mut buf = Vec::new();
        image.write_to(&mut Cursor::new(&mut buf), format).unwrap();
        buf
    }

    fn store_with_object(content_type: Option<&str>, bytes: Vec<u8>) -> MockPhotoObjectStore {
        let content_type = content_type.map(str::to_string);
        let mut store = MockPhotoObjectStore::new();
        store.expect_fetch_original().returning(move |_| {
            Ok(SourceObject {
                bytes: Bytes::from(bytes.clone()),
                content_type: content_type.clone(),
            })
        });
        store
    }

    #[tokio::test]
    async fn test_shrinks_oversized_image_within_bounds() {
        let store = store_with_object(
            Some("image/png"),
            test_image_bytes(1200, 800, ImageOutputFormat::Png),
        );
        let generator = DerivativeGenerator::new(Arc::new(store), 85);

        let derivative = generator
            .generate("4/original/photo", (320, 320))
            .await
            .unwrap();

        assert_eq!(derivative.encoding, ImageEncoding::Png);

        let resized = image::load_from_memory(&derivative.bytes).unwrap();
        let (width, height) = resized.dimensions();
        assert!(width <= 320 && height <= 320);
        // Aspect ratio preserved within rounding
        assert_eq!(width, 320);
        assert_eq!(height, 213);
    }

    #[tokio::test]
    async fn test_never_upscales_small_image() {
        let store = store_with_object(
            Some("image/png"),
            test_image_bytes(100, 80, ImageOutputFormat::Png),
        );
        let generator = DerivativeGenerator::new(Arc::new(store), 85);

        let derivative = generator
            .generate("4/original/photo", (320, 320))
            .await
            .unwrap();

        let resized = image::load_from_memory(&derivative.bytes).unwrap();
        assert_eq!(resized.dimensions(), (100, 80));
    }

    #[tokio::test]
    async fn test_jpeg_source_yields_jpeg_derivative() {
        let store = store_with_object(
            Some("image/jpg"),
            test_image_bytes(640, 480, ImageOutputFormat::Jpeg(90)),
        );
        let generator = DerivativeGenerator::new(Arc::new(store), 85);

        let derivative = generator
            .generate("4/original/photo", (320, 320))
            .await
            .unwrap();

        assert_eq!(derivative.encoding, ImageEncoding::Jpeg);
        assert_eq!(
            image::guess_format(&derivative.bytes).unwrap(),
            image::ImageFormat::Jpeg
        );
    }

    #[tokio::test]
    async fn test_generation_is_deterministic() {
        let bytes = test_image_bytes(1200, 800, ImageOutputFormat::Png);
        let generator = DerivativeGenerator::new(
            Arc::new(store_with_object(Some("image/png"), bytes)),
            85,
        );

        let first = generator
            .generate("4/original/photo", (320, 320))
            .await
            .unwrap();
        let second = generator
            .generate("4/original/photo", (320, 320))
            .await
            .unwrap();

        assert_eq!(first.bytes, second.bytes);
    }

    #[tokio::test]
    async fn test_missing_content_type_fails_classification() {
        let store = store_with_object(None, test_image_bytes(64, 64, ImageOutputFormat::Png));
        let generator = DerivativeGenerator::new(Arc::new(store), 85);

        let err = generator
            .generate("4/original/photo", (320, 320))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::UnsupportedEncoding(EncodingError::Missing)
        ));
    }

    #[tokio::test]
    async fn test_corrupt_payload_fails_decode() {
        let store = store_with_object(Some("image/png"), b"definitely not a png".to_vec());
        let generator = DerivativeGenerator::new(Arc::new(store), 85);

        let err = generator
            .generate("4/original/photo", (320, 320))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_fetch_errors_propagate() {
        let mut store = MockPhotoObjectStore::new();
        store.expect_fetch_original().returning(|key| {
            Err(PipelineError::SourceNotFound {
                key: key.to_string(),
            })
        });
        let generator = DerivativeGenerator::new(Arc::new(store), 85);

        let err = generator
            .generate("4/original/gone", (320, 320))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::SourceNotFound { .. }));
    }
}

/// Image transform stage
///
/// Turns a picked image into a bounded-size JPEG payload:
/// read → decode → downscale to the width limit → encode.
/// The same handle and parameters always give the same bytes.

use image::codecs::jpeg::JpegEncoder;
use image::{imageops::FilterType, DynamicImage, RgbImage};
use std::path::Path;

use crate::error::TransformError;
use crate::state::data::{EncodedPayload, PayloadFormat, RawImageHandle};

/// JPEG quality (percent) is lowered by this much per retry when the payload is not smaller
const QUALITY_STEP: u8 = 10;

/// Lowest JPEG quality (percent) tried before giving up
const MIN_QUALITY: u8 = 10;

/// Async transform stage with fixed parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageTransform {
    pub max_width: u32,
    pub quality: f32,
}

impl ImageTransform {
    pub fn new(max_width: u32, quality: f32) -> Self {
        Self { max_width, quality }
    }

    /// Run the transform on the blocking pool (decode and resize are CPU-bound)
    pub async fn run(&self, handle: RawImageHandle) -> Result<EncodedPayload, TransformError> {
        let Self { max_width, quality } = *self;
        let path = handle.path().to_path_buf();

        tokio::task::spawn_blocking(move || transform(&handle, max_width, quality))
            .await
            .map_err(|e| TransformError::SourceUnreadable {
                path,
                reason: format!("transform task failed: {}", e),
            })?
    }
}

/// Resize and encode an image for analysis.
///
/// `quality` is in (0, 1]; values outside are clamped.
pub fn transform(
    handle: &RawImageHandle,
    max_width: u32,
    quality: f32,
) -> Result<EncodedPayload, TransformError> {
    let path = handle.path();

    // Step 1: Read the source file
    let source = std::fs::read(path).map_err(|e| TransformError::SourceUnreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    // Step 2: Decode it
    let img = decode(path, &source)?;

    // Step 3: Downscale to the width limit (never upscale)
    let img = fit_width(img, max_width.max(1));
    let (width, height) = (img.width(), img.height());

    // Step 4: Encode, lowering quality until the payload is smaller than the source
    let mut percent = (quality * 100.0).round().clamp(1.0, 100.0) as u8;
    let rgb = img.to_rgb8();
    loop {
        let bytes = encode_jpeg(&rgb, percent)?;

        if bytes.len() < source.len() {
            tracing::debug!(
                "📦 {} → {}x{} JPEG, {}KB → {}KB (q={})",
                path.display(),
                width,
                height,
                source.len() / 1024,
                bytes.len() / 1024,
                percent
            );
            return Ok(EncodedPayload {
                bytes,
                width,
                height,
                format: PayloadFormat::Jpeg,
                quality_factor: f32::from(percent) / 100.0,
                source_len: source.len(),
            });
        }

        if percent < MIN_QUALITY + QUALITY_STEP {
            return Err(TransformError::NotReduced {
                source_len: source.len(),
                encoded_len: bytes.len(),
            });
        }
        percent -= QUALITY_STEP;
    }
}

/// Decode the source bytes, sniffing the format from content
fn decode(path: &Path, data: &[u8]) -> Result<DynamicImage, TransformError> {
    let format = image::guess_format(data).map_err(|_| {
        TransformError::UnsupportedFormat(format!("{} is not a recognised image", path.display()))
    })?;

    image::load_from_memory_with_format(data, format)
        .map_err(|e| TransformError::UnsupportedFormat(format!("{:?}: {}", format, e)))
}

/// Scale down to `max_width`, keeping the aspect ratio
fn fit_width(img: DynamicImage, max_width: u32) -> DynamicImage {
    if img.width() <= max_width {
        return img;
    }

    let height = (u64::from(img.height()) * u64::from(max_width) / u64::from(img.width())).max(1);
    img.resize_exact(max_width, height as u32, FilterType::Lanczos3)
}

fn encode_jpeg(img: &RgbImage, percent: u8) -> Result<Vec<u8>, TransformError> {
    let mut bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut bytes, percent);
    encoder
        .encode_image(img)
        .map_err(|e| TransformError::UnsupportedFormat(format!("JPEG encoding failed: {}", e)))?;
    Ok(bytes)
}

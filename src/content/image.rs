//! Inline image capture.
//!
//! Editors attach images to content fields as `data:` URIs stored inside the
//! content document itself, trading document bloat for not needing an object
//! store. Incoming images are gated on size and type, downscaled to a bounded
//! width, and re-encoded as JPEG.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::imageops::FilterType;
use image::DynamicImage;
use thiserror::Error;

/// Limits applied to captured images.
#[derive(Debug, Clone, Copy)]
pub struct ImagePolicy {
  /// Maximum accepted input size in bytes.
  pub max_bytes: usize,
  /// Maximum output width; taller-than-wide images keep their aspect ratio.
  pub max_width: u32,
  /// JPEG re-encode quality (1-100).
  pub jpeg_quality: u8,
}

impl Default for ImagePolicy {
  fn default() -> Self {
    Self {
      max_bytes: 2 * 1024 * 1024,
      max_width: 800,
      jpeg_quality: 80,
    }
  }
}

#[derive(Debug, Error)]
pub enum ImageError {
  #[error("no image data provided")]
  Empty,
  #[error("file is {size} bytes, exceeding the {max} byte limit")]
  TooLarge { size: usize, max: usize },
  #[error("unsupported content type '{0}', expected an image")]
  NotAnImage(String),
  #[error("could not decode image: {0}")]
  Decode(String),
  #[error("could not encode image: {0}")]
  Encode(String),
}

/// Validates and re-encodes an uploaded image, returning a
/// `data:image/jpeg;base64,...` URI.
///
/// Rejections (empty input, non-image payload or declared type, oversize
/// input) leave no state behind; the caller surfaces the error to the user
/// and keeps the field's previous value.
pub fn capture(
  bytes: &[u8],
  declared_type: Option<&str>,
  policy: &ImagePolicy,
) -> Result<String, ImageError> {
  if bytes.is_empty() {
    return Err(ImageError::Empty);
  }
  if bytes.len() > policy.max_bytes {
    return Err(ImageError::TooLarge {
      size: bytes.len(),
      max: policy.max_bytes,
    });
  }
  if let Some(mime) = declared_type {
    if !mime.starts_with("image/") {
      return Err(ImageError::NotAnImage(mime.to_string()));
    }
  }

  let format = image::guess_format(bytes)
    .map_err(|_| ImageError::NotAnImage("application/octet-stream".to_string()))?;
  let img = image::load_from_memory_with_format(bytes, format)
    .map_err(|e| ImageError::Decode(e.to_string()))?;

  let img = downscale(img, policy.max_width);

  // JPEG has no alpha channel; flatten before encoding.
  let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
  let mut buf = Vec::new();
  let encoder =
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, policy.jpeg_quality);
  rgb
    .write_with_encoder(encoder)
    .map_err(|e| ImageError::Encode(e.to_string()))?;

  Ok(format!("data:image/jpeg;base64,{}", BASE64.encode(&buf)))
}

/// Resizes so width <= `max_width`, preserving aspect ratio. Images already
/// within bounds pass through untouched.
fn downscale(img: DynamicImage, max_width: u32) -> DynamicImage {
  let (w, h) = (img.width(), img.height());
  if w <= max_width {
    return img;
  }
  let target_h = ((h as u64 * max_width as u64) / w as u64).max(1) as u32;
  img.resize_exact(max_width, target_h, FilterType::Triangle)
}

//! Payload decoding.
//!
//! A payload goes through up to three stages:
//!
//! - **A**: textual payloads lose any data-URI prefix and all whitespace
//! - **B**: the text is Base64-decoded by the first strategy that yields bytes
//! - **C**: the bytes are decoded into pixels with default settings, then
//!   once more with limits lifted and RGBA8 output forced
//!
//! Payloads that are not UTF-8 are treated as raw image bytes and go
//! straight to stage C. UTF-8 payloads that do not yield an image through
//! stages A and B get one stage C attempt on their original bytes. Failing
//! every strategy is a definitive [`DecodeError`]; nothing partially decoded
//! is ever returned.

pub mod sniff;
pub mod text;

use std::io::Cursor;

use banner_core::Error;
use image::{DynamicImage, ImageReader};

pub use sniff::{FormatHint, sniff_format};
pub use text::{decode_base64, normalize_text};

#[derive(Debug, Clone, thiserror::Error)]
pub enum DecodeError {
    #[error("payload is empty")]
    Empty,

    #[error("no base64 strategy produced any bytes")]
    Base64Exhausted,

    #[error("image decode failed: {0}")]
    Image(String),
}

impl From<DecodeError> for Error {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Empty => Error::EmptyPayload(err.to_string()),
            other => Error::Decode(other.to_string()),
        }
    }
}

/// Decoded pixels plus the sniffed source format.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub pixels: DynamicImage,
    pub format: Option<FormatHint>,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Stage C.
fn materialize(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    let first_error = match image::load_from_memory(bytes) {
        Ok(pixels) => return Ok(pixels),
        Err(e) => e,
    };
    tracing::debug!(error = %first_error, "default decode failed, retrying as RGBA8");

    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::Image(e.to_string()))?;
    reader.no_limits();

    let pixels = reader
        .decode()
        .map_err(|e| DecodeError::Image(format!("{first_error}; rgba8 retry: {e}")))?;

    Ok(DynamicImage::ImageRgba8(pixels.into_rgba8()))
}

fn decode_bytes(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let format = sniff_format(bytes);
    tracing::debug!(?format, bytes = bytes.len(), "decoding image");

    let pixels = materialize(bytes)?;
    tracing::debug!(width = pixels.width(), height = pixels.height(), "image decoded");

    Ok(DecodedImage { pixels, format })
}

/// Decode a downloaded payload into pixels.
///
/// UTF-8 payloads are tried as Base64 text first; when that yields no image
/// the original bytes are decoded as-is, since a small binary image can be
/// plain ASCII.
///
/// # Errors
///
/// Returns `DecodeError::Empty` for empty payloads, `Base64Exhausted` when
/// text cannot be decoded by any strategy, and `Image` when neither image
/// decode attempt succeeds.
pub fn decode_image(raw: &[u8]) -> Result<DecodedImage, DecodeError> {
    if raw.is_empty() {
        return Err(DecodeError::Empty);
    }

    let Ok(text) = std::str::from_utf8(raw) else {
        return decode_bytes(raw);
    };

    let normalized = normalize_text(text);
    tracing::debug!(chars = text.len(), normalized = normalized.len(), "treating payload as base64 text");
    let text_error = match decode_base64(&normalized) {
        Ok(bytes) => match decode_bytes(&bytes) {
            Ok(image) => return Ok(image),
            Err(e) => e,
        },
        Err(e) => e,
    };

    tracing::debug!(error = %text_error, "no image from base64 text, decoding payload as raw bytes");
    decode_bytes(raw).map_err(|_| text_error)
}

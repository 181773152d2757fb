//! Image encoding: `DynamicImage` → base64 PNG.
//!
//! The chat-completions API takes images as base64 data-URIs inside the JSON
//! body. PNG is lossless, which keeps small print legible for the model.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a rasterised page as base64 PNG (no data-URI prefix).
pub fn encode_page(img: &DynamicImage) -> Result<String, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded image → {} bytes base64", b64.len());

    Ok(b64)
}

/// Wrap base64 PNG data in a `data:` URI.
pub fn png_data_uri(b64: &str) -> String {
    format!("data:image/png;base64,{b64}")
}

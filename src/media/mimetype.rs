use std::path::Path;
use anyhow::{Result, Context};

/// Raster formats the decoder is built with.
const SUPPORTED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/bmp",
    "image/tiff",
];

pub fn detect_mimetype(path: &Path) -> Result<String> {
    let kind = infer::get_from_path(path)
        .with_context(|| format!("Failed to read {:?} for mimetype detection", path))?;

    match kind {
        Some(k) => Ok(k.mime_type().to_string()),
        None => Ok("application/octet-stream".to_string()),
    }
}

pub fn is_supported_image(mime: &str) -> bool {
    SUPPORTED_IMAGE_TYPES.contains(&mime)
}

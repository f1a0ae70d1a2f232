use std::fs;
use std::path::Path;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("could not read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0} is not a recognised image file")]
    NotAnImage(String),
}

const EXTENSION_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("svg", "image/svg+xml"),
];

fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    EXTENSION_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

fn mime_from_magic(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else if bytes.starts_with(b"BM") {
        Some("image/bmp")
    } else {
        None
    }
}

/// Encode raw image bytes as a `data:` URI. The type comes from the file name
/// when it has a known image extension, otherwise from the leading bytes.
pub fn encode_image_bytes(name: &Path, bytes: &[u8]) -> Result<String, ImageError> {
    let mime = mime_from_extension(name)
        .or_else(|| mime_from_magic(bytes))
        .ok_or_else(|| ImageError::NotAnImage(name.display().to_string()))?;
    Ok(format!("data:{mime};base64,{}", BASE64.encode(bytes)))
}

pub fn encode_image_file(path: &Path) -> Result<String, ImageError> {
    let bytes = fs::read(path)?;
    encode_image_bytes(path, &bytes)
}

/// `(mime type, decoded size in bytes)` of an attachment, for display.
pub fn describe_data_uri(uri: &str) -> Option<(&str, usize)> {
    let rest = uri.strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(";base64,")?;
    let decoded = BASE64.decode(payload).ok()?;
    Some((mime, decoded.len()))
}

use base64::Engine as _;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Failed to read image {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),
    #[error("Image file is empty: {0}")]
    Empty(PathBuf),
}

/// Mime type of an image, judged by file extension
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        "avif" => Some("image/avif"),
        _ => None,
    }
}

/// Read an image file into an inline `data:<mime>;base64,<payload>` URI
pub fn encode_image_file(path: &Path) -> Result<String, ImageError> {
    let mime = mime_for_path(path)
        .ok_or_else(|| ImageError::UnsupportedType(path.display().to_string()))?;
    let bytes = fs::read(path).map_err(|source| ImageError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.is_empty() {
        return Err(ImageError::Empty(path.to_path_buf()));
    }
    log::debug!("encoded {} ({} bytes) as {}", path.display(), bytes.len(), mime);
    Ok(encode_data_uri(mime, &bytes))
}

pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// What is known about an inline image without rendering it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUriInfo {
    pub mime: String,
    pub byte_len: usize,
}

/// Inspect a base64 data URI. Returns `None` for anything that is not one.
pub fn inspect_data_uri(uri: &str) -> Option<DataUriInfo> {
    let rest = uri.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .ok()?;
    Some(DataUriInfo {
        mime: if mime.is_empty() { "application/octet-stream".to_string() } else { mime.to_string() },
        byte_len: bytes.len(),
    })
}

/// Human readable size, e.g. `812 B`, `12.4 KB`, `1.3 MB`
pub fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

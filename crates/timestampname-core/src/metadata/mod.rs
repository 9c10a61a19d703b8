pub mod boxes;
pub mod cr3;
pub mod error;
pub mod jpeg;
pub mod mp4;
pub mod reader;
pub mod tiff;
pub mod timestamp;

#[cfg(test)]
pub(crate) mod fixtures;

use serde::{Deserialize, Serialize};

pub use error::{Error, Result};
pub use reader::{BoundedReader, ByteSource, Endian, FileSource};

/// Container format, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Jpeg,
    /// TIFF-based raw formats (DNG, NEF).
    Tiff,
    Mp4,
    Cr3,
}

impl MediaKind {
    /// `ext` with or without the leading dot, any case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.strip_prefix('.').unwrap_or(ext).to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(MediaKind::Jpeg),
            "dng" | "nef" => Some(MediaKind::Tiff),
            "mp4" => Some(MediaKind::Mp4),
            "cr3" => Some(MediaKind::Cr3),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Jpeg => "JPEG",
            MediaKind::Tiff => "TIFF",
            MediaKind::Mp4 => "MP4",
            MediaKind::Cr3 => "CR3",
        }
    }
}

/// Canonical capture timestamp of `source`, read as `kind`.
pub fn extract_timestamp(source: &dyn ByteSource, kind: MediaKind) -> Result<String> {
    if source.is_empty() {
        return Err(Error::TruncatedStream(format!("{} is empty", source.name())));
    }
    let stream = BoundedReader::new(source);
    log::debug!("{}: extracting as {}", source.name(), kind.label());
    match kind {
        MediaKind::Jpeg => jpeg::extract_timestamp(&stream),
        MediaKind::Tiff => tiff::extract_timestamp(&stream),
        MediaKind::Mp4 => mp4::extract_timestamp(&stream),
        MediaKind::Cr3 => cr3::extract_timestamp(&stream),
    }
}

/// Like [`extract_timestamp`], choosing the format from an extension.
pub fn extract_timestamp_for_extension(source: &dyn ByteSource, ext: &str) -> Result<String> {
    let kind = MediaKind::from_extension(ext)
        .ok_or_else(|| Error::UnsupportedFormat(format!("'{}' ({})", ext, source.name())))?;
    extract_timestamp(source, kind)
}

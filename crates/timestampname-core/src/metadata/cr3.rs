use super::boxes::{find_box, find_uuid_box};
use super::error::Result;
use super::reader::BoundedReader;
use super::tiff;

pub const CANON_METADATA_UUID: &str = "85c0b687820f11e08111f4ce462b6a48";

/// Canonical capture timestamp of a CR3 file: the earlier of the `CMT1`
/// (IFD0) and `CMT2` (EXIF) streams in Canon's metadata box.
pub fn extract_timestamp(stream: &BoundedReader<'_>) -> Result<String> {
    let moov = find_box(stream, b"moov")?;
    let canon = find_uuid_box(&moov, CANON_METADATA_UUID)?;

    let cmt1 = tiff::extract_timestamp(&find_box(&canon, b"CMT1")?)?;
    let cmt2 = tiff::extract_timestamp(&find_box(&canon, b"CMT2")?)?;
    log::debug!("{}: CMT1 {}, CMT2 {}", stream.name(), cmt1, cmt2);
    Ok(cmt1.min(cmt2))
}

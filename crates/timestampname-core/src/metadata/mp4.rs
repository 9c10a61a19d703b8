use super::boxes::find_box;
use super::error::{Error, Result};
use super::reader::{BoundedReader, Endian};
use super::timestamp;

/// `mvhd` creation and modification times, seconds since 1904-01-01 UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovieHeader {
    pub version: u8,
    pub creation_time: u64,
    pub modification_time: u64,
}

/// Parse the times at the start of an `mvhd` body.
pub fn read_movie_header(mvhd: &BoundedReader<'_>) -> Result<MovieHeader> {
    let mut reader = mvhd.rewound();
    let version = reader.read_u8()?;
    reader.skip(3)?; // flags
    let (creation_time, modification_time) = match version {
        0 => (
            u64::from(reader.read_u32(Endian::Big)?),
            u64::from(reader.read_u32(Endian::Big)?),
        ),
        1 => (reader.read_u64(Endian::Big)?, reader.read_u64(Endian::Big)?),
        other => return Err(Error::UnsupportedVersion(other)),
    };
    Ok(MovieHeader {
        version,
        creation_time,
        modification_time,
    })
}

/// Canonical capture timestamp of an MP4/QuickTime file, taken from the
/// `mvhd` modification time.
pub fn extract_timestamp(stream: &BoundedReader<'_>) -> Result<String> {
    let moov = find_box(stream, b"moov")?;
    let mvhd = find_box(&moov, b"mvhd")?;
    let header = read_movie_header(&mvhd)?;
    log::debug!("{}: movie header {:?}", stream.name(), header);
    timestamp::from_quicktime_seconds(header.modification_time)
}

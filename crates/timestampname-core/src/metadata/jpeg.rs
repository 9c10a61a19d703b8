use super::error::{Error, Result};
use super::reader::{BoundedReader, Endian};
use super::tiff;

pub const SOI: u16 = 0xFFD8;
pub const EOI: u16 = 0xFFD9;
pub const SOS: u16 = 0xFFDA;
pub const APP1: u16 = 0xFFE1;

const EXIF_HEADER: [u8; 4] = *b"Exif";
const EXIF_HEADER_SUFFIX: u16 = 0x0000;

/// Segment length field (2) plus the Exif header (4) and its suffix (2).
const APP1_PREAMBLE_LEN: u16 = 8;

fn truncated(reader: &BoundedReader<'_>, what: &str) -> Error {
    Error::TruncatedStream(format!(
        "{} at offset {} of {}",
        what,
        reader.position(),
        reader.name()
    ))
}

/// The TIFF stream carried by the first APP1 segment.
pub fn exif_stream<'a>(stream: &BoundedReader<'a>) -> Result<BoundedReader<'a>> {
    let mut reader = stream.rewound();
    if reader.remaining() < 2 {
        return Err(Error::InvalidFormat(format!("{} is too short for JPEG", reader.name())));
    }
    let soi = reader.read_u16(Endian::Big)?;
    if soi != SOI {
        return Err(Error::InvalidFormat(format!(
            "unexpected JPEG start marker 0x{:04x} in {}",
            soi,
            reader.name()
        )));
    }

    loop {
        if reader.is_at_end() {
            return Err(Error::NotFound(format!("Exif APP1 segment in {}", reader.name())));
        }
        if reader.remaining() < 2 {
            return Err(truncated(&reader, "segment marker"));
        }
        let offset = reader.position();
        let marker = reader.read_u16(Endian::Big)?;
        if marker == SOS || marker == EOI {
            // metadata segments never follow the image data
            return Err(Error::NotFound(format!("Exif APP1 segment in {}", reader.name())));
        }
        if reader.remaining() < 2 {
            return Err(truncated(&reader, "segment length"));
        }
        let length = reader.read_u16(Endian::Big)?;
        log::debug!(
            "{}: JPEG segment 0x{:04x} at offset {}, length {}",
            reader.name(),
            marker,
            offset,
            length
        );
        if length < 2 {
            return Err(Error::InvalidFormat(format!(
                "JPEG segment 0x{:04x} at offset {} declares length {}",
                marker, offset, length
            )));
        }
        let body_len = u64::from(length - 2);
        if body_len > reader.remaining() {
            return Err(truncated(&reader, "segment body"));
        }

        if marker != APP1 {
            reader.skip(body_len)?;
            continue;
        }

        if length < APP1_PREAMBLE_LEN {
            return Err(Error::InvalidFormat(format!(
                "APP1 segment at offset {} is too short for an Exif header",
                offset
            )));
        }
        let header = reader.read_array::<4>()?;
        let suffix = reader.read_u16(Endian::Big)?;
        if header != EXIF_HEADER || suffix != EXIF_HEADER_SUFFIX {
            return Err(Error::InvalidFormat(format!(
                "APP1 segment at offset {} of {} has no Exif header",
                offset,
                reader.name()
            )));
        }
        return reader.view_from_here(u64::from(length - APP1_PREAMBLE_LEN));
    }
}

/// Canonical capture timestamp of a JPEG file.
pub fn extract_timestamp(stream: &BoundedReader<'_>) -> Result<String> {
    tiff::extract_timestamp(&exif_stream(stream)?)
}

use std::collections::{BTreeSet, HashSet};
use std::io::SeekFrom;

use super::error::{Error, Result};
use super::reader::{BoundedReader, Endian};
use super::timestamp;

pub const TIFF_MAGIC: u16 = 42;

pub const TAG_DATE_TIME: u16 = 0x0132;
pub const TAG_DATE_TIME_ORIGINAL: u16 = 0x9003;
pub const TAG_DATE_TIME_DIGITIZED: u16 = 0x9004;
pub const TAG_EXIF_IFD_POINTER: u16 = 0x8769;

pub const TYPE_ASCII: u16 = 2;
pub const TYPE_SHORT: u16 = 3;
pub const TYPE_LONG: u16 = 4;

/// Date values are 19 characters plus the NUL terminator.
pub const DATE_VALUE_COUNT: u32 = 20;
const DATE_LEN: usize = 19;

/// Entry count (2 bytes) plus next-IFD offset (4 bytes).
const IFD_MIN_LEN: u64 = 6;

/// Single IFD entry (tag, type, count, value/offset).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IfdEntry {
    pub tag: u16,
    pub field_type: u16,
    pub count: u32,
    pub value_offset: u32,
}

impl IfdEntry {
    fn require(&self, field_type: u16, count: u32) -> Result<()> {
        if self.field_type != field_type || self.count != count {
            return Err(Error::MalformedTag {
                tag: self.tag,
                field_type: self.field_type,
                count: self.count,
            });
        }
        Ok(())
    }
}

#[derive(Debug)]
struct Ifd {
    entries: Vec<IfdEntry>,
    next: u32,
}

/// Read the byte order marker, the magic number and the first IFD offset.
pub fn read_tiff_header(reader: &mut BoundedReader<'_>) -> Result<(Endian, u32)> {
    let endian = match &reader.read_array::<2>()? {
        b"II" => Endian::Little,
        b"MM" => Endian::Big,
        other => {
            return Err(Error::InvalidFormat(format!(
                "TIFF byte order marker {:02x}{:02x} in {}",
                other[0],
                other[1],
                reader.name()
            )))
        }
    };
    let magic = reader.read_u16(endian)?;
    if magic != TIFF_MAGIC {
        return Err(Error::InvalidFormat(format!(
            "TIFF magic number {} in {}",
            magic,
            reader.name()
        )));
    }
    let first_ifd = reader.read_u32(endian)?;
    Ok((endian, first_ifd))
}

/// Read one 12 byte entry at the cursor.
pub fn read_ifd_entry(reader: &mut BoundedReader<'_>, endian: Endian) -> Result<IfdEntry> {
    Ok(IfdEntry {
        tag: reader.read_u16(endian)?,
        field_type: reader.read_u16(endian)?,
        count: reader.read_u32(endian)?,
        value_offset: reader.read_u32(endian)?,
    })
}

fn read_ifd(reader: &mut BoundedReader<'_>, endian: Endian, offset: u32) -> Result<Ifd> {
    if u64::from(offset) + IFD_MIN_LEN >= reader.size() {
        return Err(Error::OutOfBounds {
            offset: u64::from(offset),
            len: IFD_MIN_LEN,
            size: reader.size(),
        });
    }
    reader.seek(SeekFrom::Start(u64::from(offset)))?;
    let count = reader.read_u16(endian)?;
    let entries = (0..count)
        .map(|_| read_ifd_entry(reader, endian))
        .collect::<Result<Vec<_>>>()?;
    let next = reader.read_u32(endian)?;
    Ok(Ifd { entries, next })
}

/// Earliest raw date string of a self-contained TIFF stream.
///
/// The main IFD chain is walked first, in offset order, then any EXIF
/// sub-IFDs it points to. A chain that points back to an IFD already
/// walked fails with [`Error::RecursiveStructure`]; an EXIF pointer, or the
/// next link of an EXIF IFD, to an IFD already walked is ignored.
pub fn earliest_date(stream: &BoundedReader<'_>) -> Result<String> {
    let mut reader = stream.rewound();
    let (endian, first_ifd) = read_tiff_header(&mut reader)?;
    log::debug!(
        "{}: TIFF {:?} endian, first IFD at {}",
        reader.name(),
        endian,
        first_ifd
    );

    let mut chain = BTreeSet::new();
    if first_ifd != 0 {
        chain.insert(first_ifd);
    }
    let mut exif = BTreeSet::new();
    let mut visited = HashSet::new();
    let mut date_offsets = BTreeSet::new();

    loop {
        let (offset, from_exif) = match chain.pop_first() {
            Some(offset) => (offset, false),
            None => match exif.pop_first() {
                Some(offset) if visited.contains(&offset) => {
                    log::debug!("{}: EXIF IFD at {} already walked", reader.name(), offset);
                    continue;
                }
                Some(offset) => (offset, true),
                None => break,
            },
        };
        visited.insert(offset);

        let ifd = read_ifd(&mut reader, endian, offset)?;
        log::debug!(
            "{}: IFD at {} with {} entries, next {}",
            reader.name(),
            offset,
            ifd.entries.len(),
            ifd.next
        );
        for entry in &ifd.entries {
            match entry.tag {
                TAG_DATE_TIME | TAG_DATE_TIME_ORIGINAL | TAG_DATE_TIME_DIGITIZED => {
                    entry.require(TYPE_ASCII, DATE_VALUE_COUNT)?;
                    log::trace!("date tag 0x{:04x} value at {}", entry.tag, entry.value_offset);
                    date_offsets.insert(entry.value_offset);
                }
                TAG_EXIF_IFD_POINTER => {
                    entry.require(TYPE_LONG, 1)?;
                    log::trace!("EXIF IFD pointer to {}", entry.value_offset);
                    if !visited.contains(&entry.value_offset) {
                        exif.insert(entry.value_offset);
                    }
                }
                _ => {}
            }
        }

        if ifd.next == offset {
            return Err(Error::RecursiveStructure { offset });
        }
        if ifd.next != 0 && !exif.contains(&ifd.next) {
            if !visited.contains(&ifd.next) {
                chain.insert(ifd.next);
            } else if from_exif {
                // an EXIF IFD linking into the main chain; nothing new to walk
                log::debug!("{}: IFD at {} already walked", reader.name(), ifd.next);
            } else {
                return Err(Error::RecursiveStructure { offset: ifd.next });
            }
        }
    }

    if date_offsets.is_empty() {
        return Err(Error::NoDateFound);
    }

    let mut earliest: Option<String> = None;
    for offset in date_offsets {
        let value = read_date_value(&reader, offset)?;
        log::debug!("{}: date value {:?} at {}", reader.name(), value, offset);
        if earliest.as_ref().map_or(true, |current| value < *current) {
            earliest = Some(value);
        }
    }
    earliest.ok_or(Error::NoDateFound)
}

fn read_date_value(reader: &BoundedReader<'_>, offset: u32) -> Result<String> {
    let offset = u64::from(offset);
    if offset + u64::from(DATE_VALUE_COUNT) > reader.size() {
        return Err(Error::OutOfBounds {
            offset,
            len: u64::from(DATE_VALUE_COUNT),
            size: reader.size(),
        });
    }
    let mut value = [0u8; DATE_LEN];
    reader.read_at(offset, &mut value)?;
    Ok(String::from_utf8_lossy(&value).into_owned())
}

/// Canonical capture timestamp of a TIFF stream (DNG, NEF, EXIF payloads).
pub fn extract_timestamp(stream: &BoundedReader<'_>) -> Result<String> {
    timestamp::normalize(&earliest_date(stream)?)
}

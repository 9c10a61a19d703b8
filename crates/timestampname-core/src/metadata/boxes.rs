use std::borrow::Cow;

use super::error::{Error, Result};
use super::reader::{BoundedReader, Endian};

pub const UUID_BOX: [u8; 4] = *b"uuid";

const HEADER_LEN: u64 = 8;
const LARGE_HEADER_LEN: u64 = 16;
const UUID_LEN: u64 = 16;

/// One box of a forward scan. `body` excludes the header and the UUID.
#[derive(Debug, Clone)]
pub struct MediaBox<'a> {
    pub box_type: [u8; 4],
    pub uuid: Option<[u8; 16]>,
    pub body: BoundedReader<'a>,
}

impl MediaBox<'_> {
    pub fn type_name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.box_type)
    }

    pub fn uuid_hex(&self) -> Option<String> {
        self.uuid.map(hex::encode)
    }
}

/// Forward iterator over the boxes of a region.
///
/// Iteration ends at the end of the region or at an all-zero length/type
/// marker. The first error ends iteration as well.
#[derive(Debug)]
pub struct Boxes<'a> {
    reader: BoundedReader<'a>,
    done: bool,
}

impl<'a> Boxes<'a> {
    /// Scan `region` from its start, whatever its cursor position.
    pub fn new(region: &BoundedReader<'a>) -> Self {
        Self {
            reader: region.rewound(),
            done: false,
        }
    }

    fn read_next(&mut self) -> Result<Option<MediaBox<'a>>> {
        let reader = &mut self.reader;
        if reader.is_at_end() {
            return Ok(None);
        }
        let offset = reader.position();
        if reader.remaining() < HEADER_LEN {
            return Err(Error::TruncatedStream(format!(
                "{} bytes of box header at offset {} in {}",
                reader.remaining(),
                offset,
                reader.name()
            )));
        }

        let length = reader.read_u32(Endian::Big)?;
        let box_type = reader.read_array::<4>()?;
        if length == 0 && box_type == [0; 4] {
            log::debug!("{}: terminal box marker at offset {}", reader.name(), offset);
            return Ok(None);
        }

        let too_short = |declared: u64| {
            Error::InvalidFormat(format!(
                "box '{}' at offset {} declares length {} smaller than its header",
                String::from_utf8_lossy(&box_type),
                offset,
                declared
            ))
        };
        let mut body_len = match length {
            0 => reader.remaining(),
            1 => {
                let large = reader.read_u64(Endian::Big)?;
                large.checked_sub(LARGE_HEADER_LEN).ok_or_else(|| too_short(large))?
            }
            n => u64::from(n)
                .checked_sub(HEADER_LEN)
                .ok_or_else(|| too_short(u64::from(n)))?,
        };

        let uuid = if box_type == UUID_BOX {
            let uuid = reader.read_array::<16>()?;
            body_len = body_len
                .checked_sub(UUID_LEN)
                .ok_or_else(|| too_short(body_len))?;
            Some(uuid)
        } else {
            None
        };

        let body = reader.view_from_here(body_len)?;
        reader.skip(body_len)?;
        let found = MediaBox {
            box_type,
            uuid,
            body,
        };
        log::debug!(
            "{}: box '{}' {} at offset {}, body {} bytes",
            reader.name(),
            found.type_name(),
            found.uuid_hex().unwrap_or_default(),
            offset,
            body_len
        );
        Ok(Some(found))
    }
}

impl<'a> Iterator for Boxes<'a> {
    type Item = Result<MediaBox<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_next() {
            Ok(Some(found)) => Some(Ok(found)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Body of the first box in `region` whose type matches and, when a UUID
/// predicate is given, whose UUID matches too. `what` names the box in the
/// `NotFound` error.
pub fn find_box_where<'a>(
    region: &BoundedReader<'a>,
    what: &str,
    matches_type: impl Fn(&[u8; 4]) -> bool,
    matches_uuid: Option<&dyn Fn(&[u8; 16]) -> bool>,
) -> Result<BoundedReader<'a>> {
    for found in Boxes::new(region) {
        let found = found?;
        if !matches_type(&found.box_type) {
            continue;
        }
        let uuid_matches = match (matches_uuid, &found.uuid) {
            (None, _) => true,
            (Some(predicate), Some(uuid)) => predicate(uuid),
            (Some(_), None) => false,
        };
        if uuid_matches {
            return Ok(found.body);
        }
    }
    Err(Error::NotFound(format!("{} in {}", what, region.name())))
}

/// Body of the first box of type `box_type`.
pub fn find_box<'a>(region: &BoundedReader<'a>, box_type: &[u8; 4]) -> Result<BoundedReader<'a>> {
    find_box_where(
        region,
        &format!("box '{}'", String::from_utf8_lossy(box_type)),
        |found| found == box_type,
        None,
    )
}

/// Body of the first `uuid` box whose UUID, as lowercase hex, is `uuid_hex`.
pub fn find_uuid_box<'a>(region: &BoundedReader<'a>, uuid_hex: &str) -> Result<BoundedReader<'a>> {
    let matches_uuid = |uuid: &[u8; 16]| hex::encode(uuid) == uuid_hex;
    find_box_where(
        region,
        &format!("uuid box {}", uuid_hex),
        |found| found == &UUID_BOX,
        Some(&matches_uuid),
    )
}

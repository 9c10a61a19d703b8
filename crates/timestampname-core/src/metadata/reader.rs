use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use super::error::{Error, Result};

/// Immutable-length, random-access byte store with a displayable identity.
pub trait ByteSource {
    /// Total length in bytes.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identity used in diagnostics (usually the file name).
    fn name(&self) -> &str;

    /// Fill `buf` from absolute `offset`.
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()>;
}

impl ByteSource for Vec<u8> {
    fn len(&self) -> u64 {
        self.as_slice().len() as u64
    }

    fn name(&self) -> &str {
        "<memory>"
    }

    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let start = usize::try_from(offset)
            .map_err(|_| io::Error::new(io::ErrorKind::UnexpectedEof, "offset beyond buffer"))?;
        let end = start
            .checked_add(buf.len())
            .filter(|&end| end <= self.as_slice().len())
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "read beyond buffer"))?;
        buf.copy_from_slice(&self[start..end]);
        Ok(())
    }
}

/// An already-open file. The length is taken once, at construction.
#[derive(Debug)]
pub struct FileSource {
    file: File,
    len: u64,
    name: String,
}

impl FileSource {
    pub fn new(file: File, name: impl Into<String>) -> io::Result<Self> {
        let len = file.metadata()?.len();
        Ok(Self {
            file,
            len,
            name: name.into(),
        })
    }
}

impl ByteSource for FileSource {
    fn len(&self) -> u64 {
        self.len
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let mut file = &self.file;
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)
    }
}

/// Byte order of multi-byte integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    fn decode_u16(self, bytes: &[u8]) -> u16 {
        match self {
            Endian::Little => LittleEndian::read_u16(bytes),
            Endian::Big => BigEndian::read_u16(bytes),
        }
    }

    fn decode_u32(self, bytes: &[u8]) -> u32 {
        match self {
            Endian::Little => LittleEndian::read_u32(bytes),
            Endian::Big => BigEndian::read_u32(bytes),
        }
    }

    fn decode_u64(self, bytes: &[u8]) -> u64 {
        match self {
            Endian::Little => LittleEndian::read_u64(bytes),
            Endian::Big => BigEndian::read_u64(bytes),
        }
    }
}

/// A bounded window over a [`ByteSource`] with its own cursor.
///
/// Offsets given to a reader are relative to its window. Views created with
/// [`BoundedReader::sub_view`] are relative to their immediate parent and
/// keep pointing into the same source, so nesting never copies bytes.
#[derive(Clone)]
pub struct BoundedReader<'a> {
    source: &'a dyn ByteSource,
    base: u64,
    size: u64,
    pos: u64,
}

impl fmt::Debug for BoundedReader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedReader")
            .field("source", &self.source.name())
            .field("base", &self.base)
            .field("size", &self.size)
            .field("pos", &self.pos)
            .finish()
    }
}

impl<'a> BoundedReader<'a> {
    /// A view over the whole source.
    pub fn new(source: &'a dyn ByteSource) -> Self {
        Self {
            source,
            base: 0,
            size: source.len(),
            pos: 0,
        }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn name(&self) -> &str {
        self.source.name()
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn remaining(&self) -> u64 {
        self.size - self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.size
    }

    /// Same window, cursor back at zero.
    pub fn rewound(&self) -> Self {
        Self {
            pos: 0,
            ..self.clone()
        }
    }

    /// Move the cursor. The target must lie within `[0, size]`; the end
    /// position itself is allowed, reading from it is not.
    pub fn seek(&mut self, to: SeekFrom) -> Result<u64> {
        let target = match to {
            SeekFrom::Start(n) => i128::from(n),
            SeekFrom::Current(n) => i128::from(self.pos) + i128::from(n),
            SeekFrom::End(n) => i128::from(self.size) + i128::from(n),
        };
        if target < 0 || target > i128::from(self.size) {
            return Err(Error::OutOfBounds {
                offset: target.max(0) as u64,
                len: 0,
                size: self.size,
            });
        }
        self.pos = target as u64;
        Ok(self.pos)
    }

    /// Advance the cursor by `n` bytes.
    pub fn skip(&mut self, n: u64) -> Result<()> {
        let to = self.pos.checked_add(n).ok_or(Error::OutOfBounds {
            offset: self.pos,
            len: n,
            size: self.size,
        })?;
        self.seek(SeekFrom::Start(to)).map(|_| ())
    }

    fn check(&self, offset: u64, len: u64) -> Result<()> {
        match offset.checked_add(len) {
            Some(end) if end <= self.size => Ok(()),
            _ => Err(Error::OutOfBounds {
                offset,
                len,
                size: self.size,
            }),
        }
    }

    /// Read at `offset` without moving the cursor.
    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.check(offset, buf.len() as u64)?;
        self.source.read_exact_at(self.base + offset, buf)?;
        Ok(())
    }

    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.read_at(self.pos, buf)?;
        self.pos += buf.len() as u64;
        Ok(())
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let [byte] = self.read_array::<1>()?;
        Ok(byte)
    }

    pub fn read_u16(&mut self, endian: Endian) -> Result<u16> {
        Ok(endian.decode_u16(&self.read_array::<2>()?))
    }

    pub fn read_u32(&mut self, endian: Endian) -> Result<u32> {
        Ok(endian.decode_u32(&self.read_array::<4>()?))
    }

    pub fn read_u64(&mut self, endian: Endian) -> Result<u64> {
        Ok(endian.decode_u64(&self.read_array::<8>()?))
    }

    /// A nested window of `len` bytes starting at `offset` of this one.
    pub fn sub_view(&self, offset: u64, len: u64) -> Result<BoundedReader<'a>> {
        self.check(offset, len)?;
        log::trace!(
            "{}: new view at {} (+{}) of {} bytes",
            self.name(),
            offset,
            self.base,
            len
        );
        Ok(BoundedReader {
            source: self.source,
            base: self.base + offset,
            size: len,
            pos: 0,
        })
    }

    /// A nested window of `len` bytes starting at the cursor.
    pub fn view_from_here(&self, len: u64) -> Result<BoundedReader<'a>> {
        self.sub_view(self.pos, len)
    }
}

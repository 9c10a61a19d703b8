use super::reader::Endian;
use super::tiff::{TAG_EXIF_IFD_POINTER, TYPE_ASCII, TYPE_LONG};

pub fn bmff_box(box_type: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 8);
    out.extend_from_slice(&(body.len() as u32 + 8).to_be_bytes());
    out.extend_from_slice(box_type);
    out.extend_from_slice(body);
    out
}

pub fn large_bmff_box(box_type: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 16);
    out.extend_from_slice(&1u32.to_be_bytes());
    out.extend_from_slice(box_type);
    out.extend_from_slice(&(body.len() as u64 + 16).to_be_bytes());
    out.extend_from_slice(body);
    out
}

pub fn uuid_box(uuid: &[u8; 16], body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 24);
    out.extend_from_slice(&(body.len() as u32 + 24).to_be_bytes());
    out.extend_from_slice(b"uuid");
    out.extend_from_slice(uuid);
    out.extend_from_slice(body);
    out
}

/// `(tag, type, count, value_or_offset)`
pub type Entry = (u16, u16, u32, u32);

pub fn date_entry(tag: u16, offset: u32) -> Entry {
    (tag, TYPE_ASCII, 20, offset)
}

pub fn exif_pointer(offset: u32) -> Entry {
    (TAG_EXIF_IFD_POINTER, TYPE_LONG, 1, offset)
}

/// Appends TIFF structures one after another and hands out their offsets.
pub struct TiffBuilder {
    endian: Endian,
    buf: Vec<u8>,
}

impl TiffBuilder {
    pub fn new(endian: Endian) -> Self {
        let mut builder = Self {
            endian,
            buf: Vec::new(),
        };
        builder.buf.extend_from_slice(match endian {
            Endian::Little => b"II",
            Endian::Big => b"MM",
        });
        builder.put_u16(42);
        builder.put_u32(0);
        builder
    }

    fn put_u16(&mut self, v: u16) {
        let bytes = match self.endian {
            Endian::Little => v.to_le_bytes(),
            Endian::Big => v.to_be_bytes(),
        };
        self.buf.extend_from_slice(&bytes);
    }

    fn put_u32(&mut self, v: u32) {
        let bytes = match self.endian {
            Endian::Little => v.to_le_bytes(),
            Endian::Big => v.to_be_bytes(),
        };
        self.buf.extend_from_slice(&bytes);
    }

    /// Offset the next appended structure will land at.
    pub fn next_offset(&self) -> u32 {
        self.buf.len() as u32
    }

    pub fn set_first_ifd(&mut self, offset: u32) {
        let bytes = match self.endian {
            Endian::Little => offset.to_le_bytes(),
            Endian::Big => offset.to_be_bytes(),
        };
        self.buf[4..8].copy_from_slice(&bytes);
    }

    /// NUL-terminated ASCII value.
    pub fn ascii(&mut self, value: &str) -> u32 {
        let offset = self.next_offset();
        self.buf.extend_from_slice(value.as_bytes());
        self.buf.push(0);
        offset
    }

    pub fn ifd(&mut self, entries: &[Entry], next: u32) -> u32 {
        let offset = self.next_offset();
        self.put_u16(entries.len() as u16);
        for &(tag, field_type, count, value) in entries {
            self.put_u16(tag);
            self.put_u16(field_type);
            self.put_u32(count);
            self.put_u32(value);
        }
        self.put_u32(next);
        offset
    }

    pub fn padding(&mut self, len: usize) {
        self.buf.resize(self.buf.len() + len, 0);
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// A TIFF stream whose single IFD holds the given date tags.
pub fn tiff_with_dates(endian: Endian, dates: &[(u16, &str)]) -> Vec<u8> {
    let mut tiff = TiffBuilder::new(endian);
    let entries: Vec<Entry> = dates
        .iter()
        .map(|&(tag, value)| date_entry(tag, tiff.ascii(value)))
        .collect();
    let ifd0 = tiff.ifd(&entries, 0);
    tiff.set_first_ifd(ifd0);
    tiff.padding(4);
    tiff.finish()
}

pub fn jpeg_segment(marker: u16, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 4);
    out.extend_from_slice(&marker.to_be_bytes());
    out.extend_from_slice(&(body.len() as u16 + 2).to_be_bytes());
    out.extend_from_slice(body);
    out
}

/// SOI, a JFIF APP0, the Exif APP1 carrying `tiff`, then the start of scan.
pub fn jpeg_with_exif(tiff: &[u8]) -> Vec<u8> {
    let mut app1 = b"Exif\0\0".to_vec();
    app1.extend_from_slice(tiff);
    [
        vec![0xFF, 0xD8],
        jpeg_segment(0xFFE0, b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0"),
        jpeg_segment(0xFFE1, &app1),
        jpeg_segment(0xFFDA, &[0; 10]),
        vec![0x12, 0x34, 0xFF, 0xD9],
    ]
    .concat()
}

pub fn mvhd_v0(creation: u32, modification: u32) -> Vec<u8> {
    let mut body = vec![0, 0, 0, 0];
    body.extend_from_slice(&creation.to_be_bytes());
    body.extend_from_slice(&modification.to_be_bytes());
    body.extend_from_slice(&1000u32.to_be_bytes());
    body.extend_from_slice(&5000u32.to_be_bytes());
    bmff_box(b"mvhd", &body)
}

pub fn mvhd_v1(creation: u64, modification: u64) -> Vec<u8> {
    let mut body = vec![1, 0, 0, 0];
    body.extend_from_slice(&creation.to_be_bytes());
    body.extend_from_slice(&modification.to_be_bytes());
    body.extend_from_slice(&1000u32.to_be_bytes());
    body.extend_from_slice(&5000u64.to_be_bytes());
    bmff_box(b"mvhd", &body)
}

/// `ftyp`, `moov` holding `moov_body`, then a small `mdat`.
pub fn movie(moov_body: &[u8]) -> Vec<u8> {
    [
        bmff_box(b"ftyp", b"isom\0\0\x02\0isomiso2mp41"),
        bmff_box(b"moov", moov_body),
        bmff_box(b"mdat", &[0xAA; 32]),
    ]
    .concat()
}

pub const CANON_UUID: [u8; 16] = [
    0x85, 0xc0, 0xb6, 0x87, 0x82, 0x0f, 0x11, 0xe0, 0x81, 0x11, 0xf4, 0xce, 0x46, 0x2b, 0x6a, 0x48,
];

/// A CR3 file whose Canon metadata box carries `cmt1` and `cmt2`.
pub fn cr3(cmt1: &[u8], cmt2: &[u8]) -> Vec<u8> {
    let canon = [
        bmff_box(b"CNCV", b"CanonCR3_001/00.09.00/00.00.00"),
        bmff_box(b"CCTP", &[0; 12]),
        bmff_box(b"CMT1", cmt1),
        bmff_box(b"CMT2", cmt2),
        bmff_box(b"CMT3", &[0; 8]),
    ]
    .concat();
    let moov = [
        uuid_box(&CANON_UUID, &canon),
        mvhd_v0(0, 0),
        bmff_box(b"trak", &[0; 16]),
    ]
    .concat();
    [
        bmff_box(b"ftyp", b"crx \0\0\0\x01crx isom"),
        bmff_box(b"moov", &moov),
        uuid_box(&[0xea; 16], &[0; 24]),
        bmff_box(b"mdat", &[0x55; 64]),
    ]
    .concat()
}

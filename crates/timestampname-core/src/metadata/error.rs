use thiserror::Error;

/// Failure of a single timestamp extraction.
///
/// Every variant is final for the file being read: the structures are
/// deterministic, so re-reading the same bytes cannot succeed.
#[derive(Error, Debug)]
pub enum Error {
    /// Header, magic number or signature mismatch.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// A recognized tag carries an unexpected type or count.
    #[error("malformed tag 0x{tag:04x}: type {field_type}, count {count}")]
    MalformedTag { tag: u16, field_type: u16, count: u32 },

    /// A read or seek would leave the current bounded view.
    #[error("out of bounds: {len} bytes at offset {offset} exceed view size {size}")]
    OutOfBounds { offset: u64, len: u64, size: u64 },

    /// An IFD chain points back to an IFD that was already processed.
    #[error("recursive IFD structure at offset {offset}")]
    RecursiveStructure { offset: u32 },

    /// A required box, segment, UUID or sub-box is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// The `mvhd` box has a version this reader does not know.
    #[error("unsupported movie header version: {0}")]
    UnsupportedVersion(u8),

    /// Neither accepted date grammar matched.
    #[error("failed to parse date {value:?}: {reason}")]
    DateParse { value: String, reason: String },

    /// The structure was valid but carried no date tag.
    #[error("no date tag found")]
    NoDateFound,

    /// The stream ended in the middle of a structure.
    #[error("truncated stream: {0}")]
    TruncatedStream(String),

    /// No extractor exists for this kind of file.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

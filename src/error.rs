//! Error types for decoding records and walking archives.

use std::fmt;

use thiserror::Error;

/// The primary error type for all decoding operations in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The view ends before the record (or one of its fixed fields) does.
    #[error("buffer too short: need {needed} bytes, {available} available")]
    BufferTooShort { needed: usize, available: usize },

    /// A dynamic field's length is outside its allowed range or past the end of the view.
    #[error(
        "invalid length {requested} for {field}: allowed {min}..={max}, {available} bytes available"
    )]
    InvalidDynamicLength {
        field: String,
        requested: u64,
        min: usize,
        max: usize,
        available: usize,
    },

    /// On write, a dynamic field's bound bytes disagree with its length field.
    #[error("length field of {field} declares {declared} bytes but {actual} are bound")]
    DynamicLengthMismatch {
        field: String,
        declared: u64,
        actual: usize,
    },

    #[error("bad {record} signature: expected {expected:#010x}, found {found:#010x}")]
    SignatureMismatch {
        record: &'static str,
        expected: u32,
        found: u32,
    },

    #[error("structural validation failed: {0}")]
    StructuralValidationFailed(#[from] ValidationError),

    /// No end of central directory record could be located.
    #[error("end of central directory record not found")]
    SignatureNotFound,

    #[error("unsupported compression method: {0}")]
    UnsupportedCompressionMethod(u16),

    #[error("encrypted entries are not supported")]
    UnsupportedEncryption,

    #[error("decompression failed: {0}")]
    Decompression(String),

    #[error("CRC-32 mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    /// A failure tied to one archive entry.
    #[error("entry {index}: {stage} failed")]
    Entry {
        index: usize,
        stage: Stage,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn at_entry(self, index: usize, stage: Stage) -> Self {
        Error::Entry {
            index,
            stage,
            source: Box::new(self),
        }
    }

    /// The innermost error, with any entry context stripped.
    pub fn root(&self) -> &Error {
        match self {
            Error::Entry { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Processing stage of a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CentralHeader,
    LocalHeader,
    Decompression,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::CentralHeader => "central directory header",
            Stage::LocalHeader => "local file header",
            Stage::Decompression => "decompression",
        })
    }
}

/// A cross-record consistency check that did not hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("multi-disk archives are not supported (disk {disk}, central directory on disk {cd_disk})")]
    MultiDisk { disk: u16, cd_disk: u16 },

    #[error("entries on this disk ({this_disk}) differ from total entries ({total})")]
    EntryCountMismatch { this_disk: u16, total: u16 },

    #[error("{field} declares {declared} bytes but {actual} are bound")]
    LengthMismatch {
        field: &'static str,
        declared: u64,
        actual: usize,
    },

    #[error("central directory [{offset}, +{size}) lies outside the archive ({archive_size} bytes)")]
    CentralDirectoryOutOfBounds {
        offset: u64,
        size: u64,
        archive_size: u64,
    },

    #[error("central directory overlaps the end of central directory record at {eocd_offset}")]
    CentralDirectoryOverlapsEocd { eocd_offset: u64 },

    #[error("central directory size {size} cannot hold {entries} entries ({min}..={max} bytes)")]
    CentralDirectorySize {
        size: u64,
        entries: u16,
        min: u64,
        max: u64,
    },

    #[error("local header offset {offset} is outside [0, {limit})")]
    LocalHeaderOutOfBounds { offset: u64, limit: u64 },

    #[error("local header at {offset} leaves {gap} bytes before the central directory, need {min}")]
    LocalHeaderTooClose { offset: u64, gap: u64, min: usize },

    #[error("compressed size {size} exceeds limit {limit}")]
    CompressedSizeOutOfBounds { size: u64, limit: u64 },

    #[error("payload of {size} bytes runs past the {available} bytes before the central directory")]
    PayloadOutOfBounds { size: u64, available: usize },

    #[error("local header disagrees with central directory on {field}")]
    HeaderMismatch { field: &'static str },
}

/// A convenience `Result` type alias using the crate's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

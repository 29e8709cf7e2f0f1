//! Custom error types for TIFF processing

use std::fmt;
use std::io;

/// TIFF-specific error types
#[derive(Debug)]
pub enum TiffError {
    /// I/O error
    IoError(io::Error),
    /// Invalid TIFF header
    InvalidHeader,
    /// Invalid byte order marker
    InvalidByteOrder(u16),
    /// Invalid BigTIFF header
    InvalidBigTIFFHeader,
    /// Unsupported TIFF version
    UnsupportedVersion(u16),
    /// Tag not found
    TagNotFound(u16),
    /// Unsupported field type
    UnsupportedFieldType(u16),
    /// Unsupported compression method
    UnsupportedCompression(u64),
    /// Image dimensions not found
    MissingDimensions,
    /// Generic error with message
    GenericError(String),

    /// A directory, entry, or payload could not be parsed as valid TIFF.
    Malformed(String),
    /// A read ended before the requested number of bytes were available.
    Truncated,
    /// A field type or feature is recognised but not implemented; the
    /// value is surfaced opaquely rather than aborting enumeration.
    Unsupported(String),
    /// The tag was present but its stored field type did not match the
    /// type requested by the caller.
    TypeMismatch { tag: u16, expected: u16, found: u16 },
    /// The requested tag is not present in the directory.
    NotFound(u16),
    /// A caller-supplied size limit (entry count, string length, ...) was
    /// exceeded.
    SizeLimitExceeded { limit: u64, actual: u64 },
    /// An emitted offset exceeded 2^32 - 1 while the writer was created in
    /// Classic mode; the header was never written.
    BigTiffRequired,
    /// The owning reader/writer/builder has already been disposed.
    Disposed,
    /// The writer has already been flushed; no further writes are permitted.
    Completed,
    /// A cancellation token was signalled before the next suspension point.
    Cancelled,
    /// A row, tile, or byte range fell outside the addressable buffer.
    OutOfRange,
    /// The positioned I/O backend reported a failure.
    IoFailure(io::Error),
}

impl fmt::Display for TiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TiffError::IoError(e) => write!(f, "I/O error: {}", e),
            TiffError::InvalidHeader => write!(f, "Invalid TIFF header"),
            TiffError::InvalidByteOrder(v) => write!(f, "Invalid byte order marker: {:#06x}", v),
            TiffError::InvalidBigTIFFHeader => write!(f, "Invalid BigTIFF header"),
            TiffError::UnsupportedVersion(v) => write!(f, "Unsupported TIFF version: {}", v),
            TiffError::TagNotFound(tag) => write!(f, "Tag not found: {}", tag),
            TiffError::UnsupportedFieldType(ft) => write!(f, "Unsupported field type: {}", ft),
            TiffError::UnsupportedCompression(c) => write!(f, "Unsupported compression method: {}", c),
            TiffError::MissingDimensions => write!(f, "Image dimensions not found"),
            TiffError::GenericError(msg) => write!(f, "TIFF error: {}", msg),
            TiffError::Malformed(msg) => write!(f, "Malformed TIFF data: {}", msg),
            TiffError::Truncated => write!(f, "Truncated TIFF stream"),
            TiffError::Unsupported(what) => write!(f, "Unsupported: {}", what),
            TiffError::TypeMismatch { tag, expected, found } => write!(
                f,
                "Tag {} has field type {}, expected {}",
                tag, found, expected
            ),
            TiffError::NotFound(tag) => write!(f, "Tag {} not present in directory", tag),
            TiffError::SizeLimitExceeded { limit, actual } => write!(
                f,
                "Size limit exceeded: {} entries requested, limit is {}",
                actual, limit
            ),
            TiffError::BigTiffRequired => write!(
                f,
                "Emitted offsets exceed the 32-bit range; this file must be written as BigTIFF"
            ),
            TiffError::Disposed => write!(f, "Operation attempted on a disposed handle"),
            TiffError::Completed => write!(f, "Operation attempted after the writer was flushed"),
            TiffError::Cancelled => write!(f, "Operation cancelled"),
            TiffError::OutOfRange => write!(f, "Row or byte range out of bounds"),
            TiffError::IoFailure(e) => write!(f, "Positioned I/O backend failed: {}", e),
        }
    }
}

impl std::error::Error for TiffError {}

impl From<io::Error> for TiffError {
    fn from(error: io::Error) -> Self {
        TiffError::IoError(error)
    }
}

/// Result type for TIFF operations
pub type TiffResult<T> = Result<T, TiffError>;

impl From<String> for TiffError {
    fn from(msg: String) -> Self {
        TiffError::GenericError(msg)
    }
}
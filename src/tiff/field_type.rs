//! TIFF field type enumeration, width-aware for both Classic and BigTIFF.
//!
//! This supersedes the raw `u16` tag-type constants in `tiff::constants::field_types`
//! for the streaming codec subsystems (entry codec, IFD reader/writer); the raw
//! constants remain for the legacy GeoTIFF/colormap inspection path.

use crate::tiff::errors::{TiffError, TiffResult};

/// A TIFF field type, as stored in the `type` slot of an IFD entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Byte,
    Ascii,
    Short,
    Long,
    Rational,
    SByte,
    Undefined,
    SShort,
    SLong,
    SRational,
    Float,
    Double,
    Ifd,
    Long8,
    SLong8,
    Ifd8,
    /// A field type this codec does not recognise. Carries the raw code so
    /// the entry can still be surfaced opaquely instead of aborting
    /// enumeration (§4.D).
    Unknown(u16),
}

impl FieldType {
    /// Byte width of a single element of this type.
    pub fn width(self) -> u64 {
        match self {
            FieldType::Byte | FieldType::Ascii | FieldType::SByte | FieldType::Undefined => 1,
            FieldType::Short | FieldType::SShort => 2,
            FieldType::Long | FieldType::SLong | FieldType::Float | FieldType::Ifd => 4,
            FieldType::Rational
            | FieldType::SRational
            | FieldType::Double
            | FieldType::Long8
            | FieldType::SLong8
            | FieldType::Ifd8 => 8,
            FieldType::Unknown(_) => 1,
        }
    }

    /// The on-disk numeric code for this type.
    pub fn code(self) -> u16 {
        match self {
            FieldType::Byte => 1,
            FieldType::Ascii => 2,
            FieldType::Short => 3,
            FieldType::Long => 4,
            FieldType::Rational => 5,
            FieldType::SByte => 6,
            FieldType::Undefined => 7,
            FieldType::SShort => 8,
            FieldType::SLong => 9,
            FieldType::SRational => 10,
            FieldType::Float => 11,
            FieldType::Double => 12,
            FieldType::Ifd => 13,
            FieldType::Long8 => 16,
            FieldType::SLong8 => 17,
            FieldType::Ifd8 => 18,
            FieldType::Unknown(code) => code,
        }
    }

    /// Decode a raw on-disk type code. Unknown codes never fail — they
    /// round-trip as `Unknown` so callers can still read the opaque bytes.
    pub fn from_code(code: u16) -> FieldType {
        match code {
            1 => FieldType::Byte,
            2 => FieldType::Ascii,
            3 => FieldType::Short,
            4 => FieldType::Long,
            5 => FieldType::Rational,
            6 => FieldType::SByte,
            7 => FieldType::Undefined,
            8 => FieldType::SShort,
            9 => FieldType::SLong,
            10 => FieldType::SRational,
            11 => FieldType::Float,
            12 => FieldType::Double,
            13 => FieldType::Ifd,
            16 => FieldType::Long8,
            17 => FieldType::SLong8,
            18 => FieldType::Ifd8,
            other => FieldType::Unknown(other),
        }
    }

    /// Fail if this is an `Unknown` type; used by typed readers that must
    /// reject a field type mismatch rather than silently accept it.
    pub fn require_known(self) -> TiffResult<FieldType> {
        match self {
            FieldType::Unknown(code) => Err(TiffError::Unsupported(format!(
                "unknown field type code {}",
                code
            ))),
            known => Ok(known),
        }
    }
}

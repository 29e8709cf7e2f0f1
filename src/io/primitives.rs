//! Positioned, byte-order-aware primitive codec (§4.A).
//!
//! Extends `io::byte_order`'s `Read`-cursor strategy objects with
//! positioned reads/writes over a `PositionedReader`/`PositionedWriter`,
//! and adds the signed and BigTIFF-width primitives the cursor-based
//! handlers didn't need.

use crate::io::backend::{checked_result, PositionedReader, PositionedWriter};
use crate::tiff::errors::{TiffError, TiffResult};

/// Byte order used to interpret multi-byte primitives, mirroring the `II`/`MM`
/// marker in the file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

macro_rules! read_fixed {
    ($name:ident, $ty:ty, $width:expr) => {
        pub fn $name(reader: &dyn PositionedReader, endian: Endian, offset: u64) -> TiffResult<$ty> {
            let mut buf = [0u8; $width];
            checked_result(reader.read_exact_at(offset, &mut buf)).map_err(|e| match e {
                TiffError::IoFailure(ioerr) if ioerr.kind() == std::io::ErrorKind::UnexpectedEof => {
                    TiffError::Truncated
                }
                other => other,
            })?;
            Ok(match endian {
                Endian::Little => <$ty>::from_le_bytes(buf),
                Endian::Big => <$ty>::from_be_bytes(buf),
            })
        }
    };
}

macro_rules! write_fixed {
    ($name:ident, $ty:ty) => {
        pub fn $name(
            writer: &dyn PositionedWriter,
            endian: Endian,
            offset: u64,
            value: $ty,
        ) -> TiffResult<()> {
            let bytes = match endian {
                Endian::Little => value.to_le_bytes(),
                Endian::Big => value.to_be_bytes(),
            };
            checked_result(writer.write_at(offset, &bytes))
        }
    };
}

read_fixed!(read_u16, u16, 2);
read_fixed!(read_u32, u32, 4);
read_fixed!(read_u64, u64, 8);
read_fixed!(read_i16, i16, 2);
read_fixed!(read_i32, i32, 4);
read_fixed!(read_i64, i64, 8);
read_fixed!(read_f32, f32, 4);
read_fixed!(read_f64, f64, 8);

write_fixed!(write_u16, u16);
write_fixed!(write_u32, u32);
write_fixed!(write_u64, u64);
write_fixed!(write_i16, i16);
write_fixed!(write_i32, i32);
write_fixed!(write_i64, i64);
write_fixed!(write_f32, f32);
write_fixed!(write_f64, f64);

/// Rationals are numerator-then-denominator (§4.A).
pub fn read_rational(reader: &dyn PositionedReader, endian: Endian, offset: u64) -> TiffResult<(u32, u32)> {
    let n = read_u32(reader, endian, offset)?;
    let d = read_u32(reader, endian, offset + 4)?;
    Ok((n, d))
}

pub fn read_srational(reader: &dyn PositionedReader, endian: Endian, offset: u64) -> TiffResult<(i32, i32)> {
    let n = read_i32(reader, endian, offset)?;
    let d = read_i32(reader, endian, offset + 4)?;
    Ok((n, d))
}

pub fn write_rational(
    writer: &dyn PositionedWriter,
    endian: Endian,
    offset: u64,
    value: (u32, u32),
) -> TiffResult<()> {
    write_u32(writer, endian, offset, value.0)?;
    write_u32(writer, endian, offset + 4, value.1)
}

pub fn write_srational(
    writer: &dyn PositionedWriter,
    endian: Endian,
    offset: u64,
    value: (i32, i32),
) -> TiffResult<()> {
    write_i32(writer, endian, offset, value.0)?;
    write_i32(writer, endian, offset + 4, value.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::backend::SeekLockedStore;
    use std::io::Cursor;

    #[test]
    fn round_trips_every_primitive_width() {
        let store = SeekLockedStore::new(Cursor::new(vec![0u8; 64]));
        write_u16(&store, Endian::Little, 0, 0x1234).unwrap();
        write_u32(&store, Endian::Little, 2, 0xdead_beef).unwrap();
        write_u64(&store, Endian::Little, 6, 0x0102_0304_0506_0708).unwrap();
        write_i32(&store, Endian::Little, 14, -42).unwrap();
        write_f64(&store, Endian::Little, 18, 3.5).unwrap();
        write_rational(&store, Endian::Little, 26, (3, 4)).unwrap();

        assert_eq!(read_u16(&store, Endian::Little, 0).unwrap(), 0x1234);
        assert_eq!(read_u32(&store, Endian::Little, 2).unwrap(), 0xdead_beef);
        assert_eq!(
            read_u64(&store, Endian::Little, 6).unwrap(),
            0x0102_0304_0506_0708
        );
        assert_eq!(read_i32(&store, Endian::Little, 14).unwrap(), -42);
        assert_eq!(read_f64(&store, Endian::Little, 18).unwrap(), 3.5);
        assert_eq!(read_rational(&store, Endian::Little, 26).unwrap(), (3, 4));
    }

    #[test]
    fn big_endian_differs_from_little() {
        let store = SeekLockedStore::new(Cursor::new(vec![0u8; 8]));
        write_u32(&store, Endian::Big, 0, 1).unwrap();
        let mut raw = [0u8; 4];
        store.read_at(0, &mut raw).unwrap();
        assert_eq!(raw, [0, 0, 0, 1]);
    }

    #[test]
    fn truncated_read_reports_truncated() {
        let store = SeekLockedStore::new(Cursor::new(vec![0u8; 2]));
        let err = read_u32(&store, Endian::Little, 0).unwrap_err();
        assert!(matches!(err, TiffError::Truncated));
    }
}

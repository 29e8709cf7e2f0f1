//! Conversion between the new `Directory`/`RawEntry` codec representation
//! and the legacy `tiff::ifd::{IFD, IFDEntry}` representation GeoTIFF tag
//! inspection (`geotags`, `geo_key_parser`, `colormap`) and the CLI's
//! `analyze`/`extract` commands still operate on (§3 "legacy in-memory
//! representation").
//!
//! Both sides already agree on how a 4-or-8-byte inline slot is
//! interpreted: neither tries to type-aware unpack it, each just reads the
//! slot as one plain integer in the file's byte order. That's what makes
//! this conversion a straight field-by-field copy rather than a decode.

use crate::io::primitives::Endian;
use crate::tiff::entry::{self, RawEntry};
use crate::tiff::field_type::FieldType;
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::ifd_reader::Directory;
use crate::tiff::mode::FileMode;

/// Converts one decoded `Directory` into a legacy `IFD`, so GeoTIFF
/// inspection code can run unmodified over a directory the new reader
/// produced.
pub fn directory_to_ifd(directory: &Directory, mode: FileMode, endian: Endian, number: usize, offset: u64) -> IFD {
    let mut ifd = IFD::new(number, offset);
    for raw in &directory.entries {
        ifd.add_entry(IFDEntry::new(
            raw.tag,
            raw.field_type.code(),
            raw.count,
            raw.offset(mode, endian),
        ));
    }
    ifd
}

/// Converts a legacy `IFD` back into the fixed-width `RawEntry` records the
/// new writer/reader operate on, so a directory built via the legacy
/// builders (`tiff::builder::TiffBuilder`) can still be committed through
/// `tiff::ifd_writer::IfdWriter` if desired.
pub fn ifd_to_raw_entries(ifd: &IFD, mode: FileMode, endian: Endian) -> Vec<RawEntry> {
    ifd.get_entries()
        .iter()
        .map(|legacy| RawEntry {
            tag: legacy.tag,
            field_type: FieldType::from_code(legacy.field_type),
            count: legacy.count,
            value_or_offset: entry::pack_offset(mode, endian, legacy.value_offset),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::backend::SeekLockedStore;
    use crate::tiff::ifd_reader::{read_directory, IfdReaderOptions};
    use crate::tiff::ifd_writer::IfdWriter;
    use crate::tiff::cursor::WriterCursor;
    use crate::values::ValueCollection;
    use std::io::Cursor;

    #[test]
    fn directory_round_trips_through_the_legacy_ifd_shape() {
        let cursor = WriterCursor::new(SeekLockedStore::new(Cursor::new(Vec::new())), FileMode::Classic, Endian::Little);
        let mut ifd = IfdWriter::new(&cursor);
        ifd.add_entry::<u32>(256, &ValueCollection::from(200u32));
        ifd.add_entry::<u32>(257, &ValueCollection::from(100u32));
        let offset = ifd.commit(None).unwrap();
        cursor.flush_header().unwrap();

        let directory =
            read_directory(cursor.backend(), Endian::Little, FileMode::Classic, offset, &IfdReaderOptions::default())
                .unwrap();

        let legacy = directory_to_ifd(&directory, FileMode::Classic, Endian::Little, 0, offset);
        assert_eq!(legacy.get_dimensions(), Some((200, 100)));

        let back = ifd_to_raw_entries(&legacy, FileMode::Classic, Endian::Little);
        assert_eq!(back.len(), 2);
        assert_eq!(back[0].tag, 256);
        assert_eq!(back[0].offset(FileMode::Classic, Endian::Little), 200);
    }
}

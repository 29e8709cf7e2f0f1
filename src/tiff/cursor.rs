//! Writer cursor and alignment state machine (§4.F).
//!
//! The teacher's `tiff::builders::writer::WriterBuilder` computes every
//! IFD's offset in two batch passes over a `Vec<IFD>` it already holds in
//! memory (`calculate_offsets`, `write_ifds`). `WriterCursor` replaces that
//! with a genuine forward-only stream: callers advance it as they write,
//! it tracks whether the file has grown past the 32-bit offset range, and
//! it patches the header and `next-IFD` pointers after the fact rather
//! than precomputing every offset before writing begins.

use std::sync::Mutex;

use crate::io::backend::{checked_result, PositionedReader, PositionedWriter};
use crate::io::primitives::{self, Endian};
use crate::tiff::entry::{self, RawEntry};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::field_type::FieldType;
use crate::tiff::mode::FileMode;
use crate::values::ValueCollection;

const CLASSIC_MAGIC_OFFSET: u64 = 2;
const CLASSIC_FIRST_IFD_OFFSET: u64 = 4;
const BIG_FIRST_IFD_OFFSET: u64 = 8;

struct CursorState {
    position: u64,
    requires_big: bool,
    first_ifd_offset: Option<u64>,
    completed: bool,
    disposed: bool,
}

/// A forward-only stream cursor tracking the writer's file position,
/// word alignment, and BigTIFF-required promotion (§3 "File mode").
pub struct WriterCursor<W> {
    backend: W,
    mode: FileMode,
    endian: Endian,
    state: Mutex<CursorState>,
}

impl<W: PositionedWriter + PositionedReader> WriterCursor<W> {
    /// Creates a cursor positioned just past the header for `mode`. The
    /// header itself is written lazily by `flush_header`, once the first
    /// IFD's offset is known.
    pub fn new(backend: W, mode: FileMode, endian: Endian) -> Self {
        WriterCursor {
            backend,
            mode,
            endian,
            state: Mutex::new(CursorState {
                position: mode.header_size(),
                requires_big: false,
                first_ifd_offset: None,
                completed: false,
                disposed: false,
            }),
        }
    }

    pub fn mode(&self) -> FileMode {
        self.mode
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn position(&self) -> u64 {
        self.state.lock().unwrap().position
    }

    fn guard_writable(&self) -> TiffResult<()> {
        let state = self.state.lock().unwrap();
        if state.disposed {
            return Err(TiffError::Disposed);
        }
        if state.completed {
            return Err(TiffError::Completed);
        }
        Ok(())
    }

    /// Moves the cursor to an arbitrary offset. Permitted freely; callers
    /// are responsible for not leaving gaps that violate the on-disk
    /// layout invariants.
    pub fn seek(&self, offset: u64) -> TiffResult<()> {
        self.guard_writable()?;
        self.state.lock().unwrap().position = offset;
        Ok(())
    }

    fn advance(&self, n: u64) {
        let mut state = self.state.lock().unwrap();
        state.position += n;
        if state.position > u32::MAX as u64 {
            state.requires_big = true;
        }
    }

    /// Writes a NUL pad byte if the position is odd. Idempotent on even
    /// positions. Returns the post-align offset.
    pub fn align_to_word(&self) -> TiffResult<u64> {
        self.guard_writable()?;
        let position = self.position();
        if position % 2 != 0 {
            checked_result(self.backend.write_at(position, &[0u8]))?;
            self.advance(1);
        }
        Ok(self.position())
    }

    /// Writes `buf` at the current position and advances by `buf.len()`.
    pub fn write_bytes(&self, buf: &[u8]) -> TiffResult<u64> {
        self.guard_writable()?;
        let offset = self.position();
        checked_result(self.backend.write_at(offset, buf))?;
        self.advance(buf.len() as u64);
        Ok(offset)
    }

    /// `align_to_word()` then `write_bytes(buf)` — the alignment rule for
    /// out-of-line payloads (§4.F).
    pub fn write_aligned_bytes(&self, buf: &[u8]) -> TiffResult<u64> {
        self.align_to_word()?;
        self.write_bytes(buf)
    }

    /// Marshals a typed value collection to bytes in the file's declared
    /// byte order and writes it aligned. Returns `(offset, length)`.
    pub fn write_aligned_values<T: entry::TiffPrimitive>(
        &self,
        values: &ValueCollection<T>,
    ) -> TiffResult<(u64, u64)> {
        let bytes = entry::pack_values(values, self.endian);
        let offset = self.write_aligned_bytes(&bytes)?;
        Ok((offset, bytes.len() as u64))
    }

    /// Marshals an ASCII value collection (NUL-terminated concatenation)
    /// and writes it aligned. Returns `(offset, total_bytes_written)`.
    pub fn write_aligned_ascii(&self, values: &ValueCollection<String>) -> TiffResult<(u64, u64)> {
        let bytes = entry::pack_ascii(values);
        let offset = self.write_aligned_bytes(&bytes)?;
        Ok((offset, bytes.len() as u64))
    }

    /// Records where the header should point once flushed.
    pub fn set_first_ifd_offset(&self, offset: u64) {
        self.state.lock().unwrap().first_ifd_offset = Some(offset);
    }

    pub fn requires_big(&self) -> bool {
        self.state.lock().unwrap().requires_big
    }

    /// Writes the final header. Fails with `BigTiffRequired` if the
    /// stream grew past the 32-bit range while the cursor was created in
    /// Classic mode — and in that case, no header bytes are written at
    /// all (§8 invariant 5).
    pub fn flush_header(&self) -> TiffResult<()> {
        self.guard_writable()?;
        let (requires_big, first_ifd_offset) = {
            let state = self.state.lock().unwrap();
            (state.requires_big, state.first_ifd_offset.unwrap_or(0))
        };

        if requires_big && self.mode == FileMode::Classic {
            return Err(TiffError::BigTiffRequired);
        }

        let marker: u16 = match self.endian {
            Endian::Little => 0x4949,
            Endian::Big => 0x4D4D,
        };
        primitives::write_u16(&self.backend, self.endian, 0, marker)?;
        primitives::write_u16(&self.backend, self.endian, CLASSIC_MAGIC_OFFSET, self.mode.magic())?;

        match self.mode {
            FileMode::Classic => {
                primitives::write_u32(
                    &self.backend,
                    self.endian,
                    CLASSIC_FIRST_IFD_OFFSET,
                    first_ifd_offset as u32,
                )?;
            }
            FileMode::Big => {
                primitives::write_u16(&self.backend, self.endian, 4, 8)?; // offset-size
                primitives::write_u16(&self.backend, self.endian, 6, 0)?; // reserved
                primitives::write_u64(&self.backend, self.endian, BIG_FIRST_IFD_OFFSET, first_ifd_offset)?;
            }
        }

        self.state.lock().unwrap().completed = true;
        checked_result(self.backend.flush())
    }

    /// Reads the entry count at `prev_ifd_offset`, skips over its entries,
    /// and overwrites the trailing next-IFD field with `new_ifd_offset`.
    pub fn update_next_ifd_pointer(&self, prev_ifd_offset: u64, new_ifd_offset: u64) -> TiffResult<()> {
        self.guard_writable()?;
        let count = match self.mode {
            FileMode::Classic => {
                primitives::read_u16(&self.backend, self.endian, prev_ifd_offset)? as u64
            }
            FileMode::Big => primitives::read_u64(&self.backend, self.endian, prev_ifd_offset)?,
        };
        let next_pointer_pos =
            prev_ifd_offset + self.mode.count_width() + count * self.mode.entry_size();
        match self.mode {
            FileMode::Classic => {
                primitives::write_u32(&self.backend, self.endian, next_pointer_pos, new_ifd_offset as u32)?
            }
            FileMode::Big => {
                primitives::write_u64(&self.backend, self.endian, next_pointer_pos, new_ifd_offset)?
            }
        }
        Ok(())
    }

    /// Disposes the cursor. Scoped and idempotent: all operations fail
    /// with `Disposed` afterwards (§4.F invariant).
    pub fn dispose(&self) -> TiffResult<()> {
        let mut state = self.state.lock().unwrap();
        if !state.disposed {
            state.disposed = true;
            drop(state);
            checked_result(self.backend.flush())?;
        }
        Ok(())
    }

    pub(crate) fn backend(&self) -> &W {
        &self.backend
    }
}

/// Builds the fixed-width on-disk form of one entry given an
/// already-resolved value (inline bytes or out-of-line offset), matching
/// §4.D's encode contract.
pub fn build_raw_entry(
    tag: u16,
    field_type: FieldType,
    count: u64,
    mode: FileMode,
    endian: Endian,
    inline_or_offset: InlineOrOffset,
) -> RawEntry {
    let value_or_offset = match inline_or_offset {
        InlineOrOffset::Inline(bytes) => {
            let mut slot = [0u8; 8];
            let cap = mode.inline_cap() as usize;
            slot[..bytes.len().min(cap)].copy_from_slice(&bytes[..bytes.len().min(cap)]);
            slot
        }
        InlineOrOffset::Offset(offset) => entry::pack_offset(mode, endian, offset),
    };
    RawEntry {
        tag,
        field_type,
        count,
        value_or_offset,
    }
}

/// Whether a built entry's payload is small enough to live inline, or had
/// to be written out-of-line and is now referenced by offset.
pub enum InlineOrOffset {
    Inline(Vec<u8>),
    Offset(u64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::backend::SeekLockedStore;
    use std::io::Cursor;

    fn cursor(mode: FileMode) -> WriterCursor<SeekLockedStore<Cursor<Vec<u8>>>> {
        let store = SeekLockedStore::new(Cursor::new(Vec::new()));
        WriterCursor::new(store, mode, Endian::Little)
    }

    #[test]
    fn alignment_is_idempotent_on_even_positions() {
        let c = cursor(FileMode::Classic);
        assert_eq!(c.position(), 8);
        let aligned = c.align_to_word().unwrap();
        assert_eq!(aligned, 8);
        c.write_bytes(&[1]).unwrap();
        assert_eq!(c.position(), 9);
        let aligned = c.align_to_word().unwrap();
        assert_eq!(aligned, 10);
    }

    #[test]
    fn flush_header_fails_when_classic_but_requires_big() {
        let c = cursor(FileMode::Classic);
        c.seek(u32::MAX as u64).unwrap();
        c.write_bytes(&[0u8; 16]).unwrap();
        assert!(c.requires_big());
        let err = c.flush_header().unwrap_err();
        assert!(matches!(err, TiffError::BigTiffRequired));
    }

    #[test]
    fn flush_header_succeeds_in_big_mode_past_32_bits() {
        let c = cursor(FileMode::Big);
        c.seek(u32::MAX as u64 + 16).unwrap();
        c.write_bytes(&[0u8; 4]).unwrap();
        c.set_first_ifd_offset(16);
        c.flush_header().unwrap();
    }

    #[test]
    fn no_write_after_completed() {
        let c = cursor(FileMode::Classic);
        c.set_first_ifd_offset(8);
        c.flush_header().unwrap();
        let err = c.write_bytes(&[1]).unwrap_err();
        assert!(matches!(err, TiffError::Completed));
    }

    #[test]
    fn no_write_after_dispose() {
        let c = cursor(FileMode::Classic);
        c.dispose().unwrap();
        let err = c.write_bytes(&[1]).unwrap_err();
        assert!(matches!(err, TiffError::Disposed));
    }

    #[test]
    fn update_next_ifd_pointer_patches_trailing_field() {
        let c = cursor(FileMode::Classic);
        // One fabricated zero-entry IFD at offset 8: count=0, next=0.
        c.write_bytes(&0u16.to_le_bytes()).unwrap();
        c.write_bytes(&0u32.to_le_bytes()).unwrap();
        c.update_next_ifd_pointer(8, 42).unwrap();
        let next = primitives::read_u32(c.backend(), Endian::Little, 8 + 2).unwrap();
        assert_eq!(next, 42);
    }
}

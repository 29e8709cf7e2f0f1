//! Pixel buffer writer: a row-addressable 2-D target for decoded pixels
//! (§4.J). Generalises read-side row/tile addressing into a write-side,
//! row-scoped handle that photometric interpreters write through.

use std::sync::{Mutex, MutexGuard};

use crate::tiff::errors::{TiffError, TiffResult};

/// A strided, byte-addressed raster. Pixel format is described only by its
/// `bytes_per_pixel` — the photometric interpreters know how to lay out
/// whatever pixel type they produce into that stride.
pub struct PixelBuffer {
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
    data: Mutex<Vec<u8>>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, bytes_per_pixel: usize) -> Self {
        let len = width as usize * height as usize * bytes_per_pixel;
        PixelBuffer {
            width,
            height,
            bytes_per_pixel,
            data: Mutex::new(vec![0u8; len]),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.bytes_per_pixel
    }

    pub fn row_stride(&self) -> usize {
        self.width as usize * self.bytes_per_pixel
    }

    /// Lends exclusive access to one row. Holding the buffer's single lock
    /// for the handle's lifetime is what makes "no concurrent row handles"
    /// an invariant rather than a convention: a second `acquire_row` call
    /// while one is outstanding blocks rather than racing it.
    pub fn acquire_row(&self, row: u32) -> TiffResult<RowSpan<'_>> {
        if row >= self.height {
            return Err(TiffError::OutOfRange);
        }
        let guard = self.data.lock().unwrap();
        Ok(RowSpan {
            guard,
            row,
            row_stride: self.row_stride(),
        })
    }

    /// A consistent snapshot of the whole buffer. Blocks if a row handle is
    /// outstanding.
    pub fn snapshot(&self) -> Vec<u8> {
        self.data.lock().unwrap().clone()
    }
}

/// A scoped handle over one row. Writes land in the backing buffer only
/// once the span is written to and then dropped — there is no partial
/// commit.
pub struct RowSpan<'a> {
    guard: MutexGuard<'a, Vec<u8>>,
    row: u32,
    row_stride: usize,
}

impl RowSpan<'_> {
    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn len(&self) -> usize {
        self.row_stride
    }

    /// Writes a full row's worth of bytes. `bytes.len()` must equal the
    /// buffer's row stride.
    pub fn write(&mut self, bytes: &[u8]) -> TiffResult<()> {
        if bytes.len() != self.row_stride {
            return Err(TiffError::Malformed(format!(
                "row {} expects {} bytes, got {}",
                self.row,
                self.row_stride,
                bytes.len()
            )));
        }
        let start = self.row as usize * self.row_stride;
        self.guard[start..start + self.row_stride].copy_from_slice(bytes);
        Ok(())
    }

    /// Direct mutable access, for interpreters that build the row in place
    /// rather than assembling a separate `Vec` first.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        let start = self.row as usize * self.row_stride;
        &mut self.guard[start..start + self.row_stride]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_row_rejects_out_of_range() {
        let buf = PixelBuffer::new(4, 2, 1);
        let err = buf.acquire_row(2).unwrap_err();
        assert!(matches!(err, TiffError::OutOfRange));
    }

    #[test]
    fn row_write_lands_in_the_right_stride() {
        let buf = PixelBuffer::new(2, 2, 1);
        {
            let mut row = buf.acquire_row(1).unwrap();
            row.write(&[0xAA, 0xBB]).unwrap();
        }
        assert_eq!(buf.snapshot(), vec![0, 0, 0xAA, 0xBB]);
    }

    #[test]
    fn wrong_length_write_is_rejected() {
        let buf = PixelBuffer::new(2, 2, 1);
        let mut row = buf.acquire_row(0).unwrap();
        let err = row.write(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, TiffError::Malformed(_)));
    }

    #[test]
    fn as_mut_slice_targets_the_requested_row() {
        let buf = PixelBuffer::new(2, 2, 2);
        {
            let mut row = buf.acquire_row(1).unwrap();
            let slice = row.as_mut_slice();
            slice.copy_from_slice(&[1, 2, 3, 4]);
        }
        assert_eq!(buf.snapshot(), vec![0, 0, 0, 0, 1, 2, 3, 4]);
    }
}

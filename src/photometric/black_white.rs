//! `BlackIsZero{1,4,8,16}` and `WhiteIsZero{1,4,8,16}` (§4.I). WhiteIsZero
//! is computed as the bitwise-NOT of BlackIsZero's row bytes for the same
//! bit depth, which is what gives invariant 6 (XOR = 0xFF) for free rather
//! than as a separately maintained property.

use async_trait::async_trait;

use crate::pipeline::{DecodeContext, Middleware, PipelineNode};
use crate::tiff::errors::TiffResult;

use super::unpack_bits;

fn scale_to_byte(value: u16, bits: u8) -> u8 {
    match bits {
        1 => {
            if value != 0 {
                0xFF
            } else {
                0
            }
        }
        4 => (value as u8) * 17,
        8 => value as u8,
        16 => (value >> 8) as u8,
        other => panic!("unsupported sample width {} bits", other),
    }
}

fn bytes_per_pixel(bits: u8) -> usize {
    if bits == 16 {
        2
    } else {
        1
    }
}

/// At 16 bits the sample is written out whole (big-endian), not truncated
/// through `scale_to_byte`, so `decode_rows`'s per-byte NOT has to reproduce
/// `0xFFFF - v` for invariant 6 to hold. It does: for a big-endian pair
/// `(hi, lo)`, `(!hi, !lo)` is `(255-hi, 255-lo)`, which as a big-endian u16
/// is `(255-hi)*256 + (255-lo) = 0xFFFF - (hi*256 + lo)`. So NOT-ing both
/// bytes independently is exactly the 16-bit arithmetic complement.
fn row_to_bytes(samples: &[u16], bits: u8) -> Vec<u8> {
    if bits == 16 {
        samples.iter().flat_map(|&v| v.to_be_bytes()).collect()
    } else {
        samples.iter().map(|&v| scale_to_byte(v, bits)).collect()
    }
}

fn decode_rows(context: &mut DecodeContext, bits: u8, invert: bool) -> TiffResult<()> {
    let width = context.image_width as usize;
    let height = context.image_height;
    let row_stride_bits = width * bits as usize;
    let row_stride_bytes = (row_stride_bits + 7) / 8;

    for row in 0..height {
        let bit_offset = row as usize * row_stride_bytes * 8;
        let samples = unpack_bits(&context.uncompressed_data, bit_offset, width, bits);
        let mut bytes = row_to_bytes(&samples, bits);
        if invert {
            for b in bytes.iter_mut() {
                *b = !*b;
            }
        }
        let mut span = context.pixel_buffer.acquire_row(row)?;
        span.write(&bytes)?;
    }
    Ok(())
}

/// Samples map directly onto the pixel buffer: 0 is black, the max value
/// for the bit depth is white.
pub struct BlackIsZero {
    pub bits: u8,
}

impl BlackIsZero {
    pub fn new(bits: u8) -> Self {
        BlackIsZero { bits }
    }

    pub fn bytes_per_pixel(&self) -> usize {
        bytes_per_pixel(self.bits)
    }
}

#[async_trait]
impl Middleware for BlackIsZero {
    async fn invoke(&self, context: &mut DecodeContext, next: &PipelineNode) -> TiffResult<()> {
        decode_rows(context, self.bits, false)?;
        next.run(context).await
    }
}

/// The bitwise-NOT of `BlackIsZero` at the same bit depth: 0 is white.
pub struct WhiteIsZero {
    pub bits: u8,
}

impl WhiteIsZero {
    pub fn new(bits: u8) -> Self {
        WhiteIsZero { bits }
    }

    pub fn bytes_per_pixel(&self) -> usize {
        bytes_per_pixel(self.bits)
    }
}

#[async_trait]
impl Middleware for WhiteIsZero {
    async fn invoke(&self, context: &mut DecodeContext, next: &PipelineNode) -> TiffResult<()> {
        decode_rows(context, self.bits, true)?;
        next.run(context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixelbuffer::PixelBuffer;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    fn context_with(data: Vec<u8>, width: u32, height: u32, bytes_per_pixel: usize) -> DecodeContext {
        let buffer = Arc::new(PixelBuffer::new(width, height, bytes_per_pixel));
        let mut context = DecodeContext::new(buffer, CancellationToken::new());
        context.uncompressed_data = data;
        context
    }

    #[tokio::test]
    async fn black_is_zero_eight_bit_is_identity() {
        let mut context = context_with(vec![0x00, 0x55, 0xAA, 0xFF], 4, 1, 1);
        BlackIsZero::new(8).invoke(&mut context, &PipelineNode::Terminal).await.unwrap();
        assert_eq!(context.pixel_buffer.snapshot(), vec![0x00, 0x55, 0xAA, 0xFF]);
    }

    #[tokio::test]
    async fn white_is_zero_eight_bit_inverts_black_is_zero() {
        let mut context = context_with(vec![0x00, 0x55, 0xAA, 0xFF], 4, 1, 1);
        WhiteIsZero::new(8).invoke(&mut context, &PipelineNode::Terminal).await.unwrap();
        assert_eq!(context.pixel_buffer.snapshot(), vec![0xFF, 0xAA, 0x55, 0x00]);
    }

    #[tokio::test]
    async fn inversion_identity_holds_byte_for_byte() {
        let mut black = context_with(vec![0x3C], 8, 1, 1);
        BlackIsZero::new(8).invoke(&mut black, &PipelineNode::Terminal).await.unwrap();

        let mut white = context_with(vec![0x3C], 8, 1, 1);
        WhiteIsZero::new(8).invoke(&mut white, &PipelineNode::Terminal).await.unwrap();

        let b = black.pixel_buffer.snapshot()[0];
        let w = white.pixel_buffer.snapshot()[0];
        assert_eq!(b ^ w, 0xFF);
    }

    #[tokio::test]
    async fn one_bit_samples_expand_to_full_byte_range() {
        let mut context = context_with(vec![0b1000_0000], 8, 1, 1);
        BlackIsZero::new(1).invoke(&mut context, &PipelineNode::Terminal).await.unwrap();
        assert_eq!(context.pixel_buffer.snapshot(), vec![0xFF, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[tokio::test]
    async fn one_bit_inversion_identity_holds_byte_for_byte() {
        let mut black = context_with(vec![0b1011_0000], 8, 1, 1);
        BlackIsZero::new(1).invoke(&mut black, &PipelineNode::Terminal).await.unwrap();

        let mut white = context_with(vec![0b1011_0000], 8, 1, 1);
        WhiteIsZero::new(1).invoke(&mut white, &PipelineNode::Terminal).await.unwrap();

        for (b, w) in black.pixel_buffer.snapshot().iter().zip(white.pixel_buffer.snapshot().iter()) {
            assert_eq!(b ^ w, 0xFF);
        }
    }

    #[tokio::test]
    async fn four_bit_inversion_identity_holds_byte_for_byte() {
        let mut black = context_with(vec![0x3A, 0xC5], 4, 1, 1);
        BlackIsZero::new(4).invoke(&mut black, &PipelineNode::Terminal).await.unwrap();

        let mut white = context_with(vec![0x3A, 0xC5], 4, 1, 1);
        WhiteIsZero::new(4).invoke(&mut white, &PipelineNode::Terminal).await.unwrap();

        let b = black.pixel_buffer.snapshot();
        let w = white.pixel_buffer.snapshot();
        assert_eq!(b.len(), 4);
        for (bb, ww) in b.iter().zip(w.iter()) {
            assert_eq!(bb ^ ww, 0xFF);
        }
    }

    #[tokio::test]
    async fn sixteen_bit_black_is_zero_passes_the_sample_through_whole() {
        // 0x1234 as a big-endian pair, one pixel in a 1-wide row.
        let mut context = context_with(vec![0x12, 0x34], 1, 1, 2);
        BlackIsZero::new(16).invoke(&mut context, &PipelineNode::Terminal).await.unwrap();
        assert_eq!(context.pixel_buffer.snapshot(), vec![0x12, 0x34]);
    }

    #[tokio::test]
    async fn sixteen_bit_white_is_zero_is_the_arithmetic_complement() {
        let mut white = context_with(vec![0x12, 0x34], 1, 1, 2);
        WhiteIsZero::new(16).invoke(&mut white, &PipelineNode::Terminal).await.unwrap();
        // 0xFFFF - 0x1234 = 0xEDCB
        assert_eq!(white.pixel_buffer.snapshot(), vec![0xED, 0xCB]);
    }

    #[tokio::test]
    async fn sixteen_bit_inversion_identity_holds_byte_for_byte() {
        let mut black = context_with(vec![0x00, 0x00, 0x7F, 0xFF, 0xFF, 0xFF], 3, 1, 2);
        BlackIsZero::new(16).invoke(&mut black, &PipelineNode::Terminal).await.unwrap();

        let mut white = context_with(vec![0x00, 0x00, 0x7F, 0xFF, 0xFF, 0xFF], 3, 1, 2);
        WhiteIsZero::new(16).invoke(&mut white, &PipelineNode::Terminal).await.unwrap();

        let b = black.pixel_buffer.snapshot();
        let w = white.pixel_buffer.snapshot();
        for (bb, ww) in b.iter().zip(w.iter()) {
            assert_eq!(bb ^ ww, 0xFF);
        }
    }
}

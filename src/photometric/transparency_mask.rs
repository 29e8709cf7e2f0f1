//! `TransparencyMask` (§4.I): one bit per pixel, row-byte-aligned, same
//! unpacking rule as `BlackIsZero{1}` but kept as its own interpreter since
//! it carries different tag semantics (an alpha channel, not a grayscale
//! raster).

use async_trait::async_trait;

use crate::pipeline::{DecodeContext, Middleware, PipelineNode};
use crate::tiff::errors::TiffResult;

use super::unpack_bits;

pub struct TransparencyMask;

impl TransparencyMask {
    pub fn bytes_per_pixel(&self) -> usize {
        1
    }
}

#[async_trait]
impl Middleware for TransparencyMask {
    async fn invoke(&self, context: &mut DecodeContext, next: &PipelineNode) -> TiffResult<()> {
        let width = context.image_width as usize;
        let row_stride_bytes = (width + 7) / 8;
        for row in 0..context.image_height {
            let bit_offset = row as usize * row_stride_bytes * 8;
            let samples = unpack_bits(&context.uncompressed_data, bit_offset, width, 1);
            let bytes: Vec<u8> = samples.iter().map(|&v| if v != 0 { 0xFF } else { 0 }).collect();
            let mut span = context.pixel_buffer.acquire_row(row)?;
            span.write(&bytes)?;
        }
        next.run(context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixelbuffer::PixelBuffer;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn expands_mask_bits_to_bytes() {
        let buffer = Arc::new(PixelBuffer::new(8, 1, 1));
        let mut context = DecodeContext::new(buffer, CancellationToken::new());
        context.uncompressed_data = vec![0b1100_0011];
        TransparencyMask.invoke(&mut context, &PipelineNode::Terminal).await.unwrap();
        assert_eq!(
            context.pixel_buffer.snapshot(),
            vec![0xFF, 0xFF, 0, 0, 0, 0, 0xFF, 0xFF]
        );
    }
}

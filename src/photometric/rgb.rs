//! `RGB{8,16}` (§4.I). Source samples are already interleaved per pixel
//! (R, G, B, R, G, B, ...) in the file's native byte order, so decoding is
//! a row-at-a-time copy through the scoped row span rather than a
//! per-sample transform.

use async_trait::async_trait;

use crate::pipeline::{DecodeContext, Middleware, PipelineNode};
use crate::tiff::errors::TiffResult;

pub struct Rgb {
    pub bits: u8,
}

impl Rgb {
    pub fn new(bits: u8) -> Self {
        Rgb { bits }
    }

    pub fn bytes_per_pixel(&self) -> usize {
        3 * (self.bits as usize / 8)
    }
}

#[async_trait]
impl Middleware for Rgb {
    async fn invoke(&self, context: &mut DecodeContext, next: &PipelineNode) -> TiffResult<()> {
        let bpp = self.bytes_per_pixel();
        let row_stride = context.image_width as usize * bpp;
        for row in 0..context.image_height {
            let start = row as usize * row_stride;
            let end = start + row_stride;
            let mut span = context.pixel_buffer.acquire_row(row)?;
            span.write(&context.uncompressed_data[start..end])?;
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
    async fn eight_bit_rgb_copies_interleaved_rows() {
        let buffer = Arc::new(PixelBuffer::new(2, 2, 3));
        let mut context = DecodeContext::new(buffer, CancellationToken::new());
        context.uncompressed_data = (0u8..12).collect();
        Rgb::new(8).invoke(&mut context, &PipelineNode::Terminal).await.unwrap();
        assert_eq!(context.pixel_buffer.snapshot(), (0u8..12).collect::<Vec<_>>());
    }
}

//! `CMYK{8}` (§4.I). Like `Rgb`, the source is already interleaved per
//! pixel (C, M, Y, K); the interpreter's job ends at producing a typed
//! 4-channel pixel buffer, not at converting to a displayable colour space
//! (no rendering — §1 Non-goals).

use async_trait::async_trait;

use crate::pipeline::{DecodeContext, Middleware, PipelineNode};
use crate::tiff::errors::TiffResult;

pub struct Cmyk8;

impl Cmyk8 {
    pub fn bytes_per_pixel(&self) -> usize {
        4
    }
}

#[async_trait]
impl Middleware for Cmyk8 {
    async fn invoke(&self, context: &mut DecodeContext, next: &PipelineNode) -> TiffResult<()> {
        let row_stride = context.image_width as usize * 4;
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
    async fn copies_four_channel_rows_unmodified() {
        let buffer = Arc::new(PixelBuffer::new(2, 1, 4));
        let mut context = DecodeContext::new(buffer, CancellationToken::new());
        context.uncompressed_data = vec![1, 2, 3, 4, 5, 6, 7, 8];
        Cmyk8.invoke(&mut context, &PipelineNode::Terminal).await.unwrap();
        assert_eq!(context.pixel_buffer.snapshot(), vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }
}

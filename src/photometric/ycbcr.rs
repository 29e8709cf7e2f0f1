//! `YCbCr{8}` (§4.I). Chroma is subsampled per the `YCbCrSubSampling` tag:
//! each block of `horizontal × vertical` luma samples shares one Cb/Cr
//! pair. Off-grid pixels at the right/bottom edges replicate the last
//! valid chroma sample rather than reading past the block.

use async_trait::async_trait;

use crate::pipeline::{DecodeContext, Middleware, PipelineNode};
use crate::tiff::errors::TiffResult;

/// BT.601 reference-white coefficients, as named by the `YCbCrCoefficients`
/// tag; the default values are the ones nearly every encoder emits.
#[derive(Debug, Clone, Copy)]
pub struct YCbCrCoefficients {
    pub lr: f32,
    pub lg: f32,
    pub lb: f32,
}

impl Default for YCbCrCoefficients {
    fn default() -> Self {
        YCbCrCoefficients {
            lr: 0.299,
            lg: 0.587,
            lb: 0.114,
        }
    }
}

pub struct YCbCr8 {
    pub horizontal_subsampling: u8,
    pub vertical_subsampling: u8,
    pub coefficients: YCbCrCoefficients,
}

impl YCbCr8 {
    pub fn new(horizontal_subsampling: u8, vertical_subsampling: u8) -> Self {
        YCbCr8 {
            horizontal_subsampling,
            vertical_subsampling,
            coefficients: YCbCrCoefficients::default(),
        }
    }

    pub fn bytes_per_pixel(&self) -> usize {
        3
    }

    fn ycbcr_to_rgb(&self, y: u8, cb: u8, cr: u8) -> (u8, u8, u8) {
        let c = &self.coefficients;
        let y = y as f32;
        let cb = cb as f32 - 128.0;
        let cr = cr as f32 - 128.0;

        let r = y + 2.0 * cr * (1.0 - c.lr);
        let b = y + 2.0 * cb * (1.0 - c.lb);
        let g = (y - c.lr * r - c.lb * b) / c.lg;

        (clamp_to_byte(r), clamp_to_byte(g), clamp_to_byte(b))
    }
}

fn clamp_to_byte(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[async_trait]
impl Middleware for YCbCr8 {
    async fn invoke(&self, context: &mut DecodeContext, next: &PipelineNode) -> TiffResult<()> {
        let width = context.image_width as usize;
        let height = context.image_height as usize;
        let h_sub = self.horizontal_subsampling as usize;
        let v_sub = self.vertical_subsampling as usize;

        let blocks_per_row = (width + h_sub - 1) / h_sub;
        let luma_per_block = h_sub * v_sub;
        let block_bytes = luma_per_block + 2;

        for row in 0..height {
            let block_row = row / v_sub;
            let row_in_block = row % v_sub;
            let mut out_row = Vec::with_capacity(width * 3);

            for col in 0..width {
                let block_col = col / h_sub;
                let col_in_block = col % h_sub;

                let block_index = block_row * blocks_per_row + block_col;
                let block_start = block_index * block_bytes;
                let luma_index = row_in_block * h_sub + col_in_block;

                let y = *context
                    .uncompressed_data
                    .get(block_start + luma_index)
                    .unwrap_or(&0);
                // Chroma is replicated across the whole block; an
                // incomplete block at the right/bottom edge still reads
                // the same pair, which is exactly the "replicate the last
                // valid sample" rule for off-grid pixels.
                let cb = *context
                    .uncompressed_data
                    .get(block_start + luma_per_block)
                    .unwrap_or(&128);
                let cr = *context
                    .uncompressed_data
                    .get(block_start + luma_per_block + 1)
                    .unwrap_or(&128);

                let (r, g, b) = self.ycbcr_to_rgb(y, cb, cr);
                out_row.push(r);
                out_row.push(g);
                out_row.push(b);
            }

            let mut span = context.pixel_buffer.acquire_row(row as u32)?;
            span.write(&out_row)?;
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
    async fn four_two_zero_block_decodes_to_flat_colour() {
        // 2x2 luma block sharing one Cb/Cr pair: Y=Y=Y=Y=180, Cb=90, Cr=200.
        let interp = YCbCr8::new(2, 2);
        let buffer = Arc::new(PixelBuffer::new(2, 2, 3));
        let mut context = DecodeContext::new(buffer, CancellationToken::new());
        context.uncompressed_data = vec![180, 180, 180, 180, 90, 200];

        interp.invoke(&mut context, &PipelineNode::Terminal).await.unwrap();
        let pixels = context.pixel_buffer.snapshot();
        // All four pixels decode identically since they share one chroma pair.
        let p0 = &pixels[0..3];
        let p3 = &pixels[9..12];
        assert_eq!(p0, p3);
    }

    #[tokio::test]
    async fn pure_luma_with_neutral_chroma_is_grayscale() {
        let interp = YCbCr8::new(1, 1);
        let buffer = Arc::new(PixelBuffer::new(1, 1, 3));
        let mut context = DecodeContext::new(buffer, CancellationToken::new());
        context.uncompressed_data = vec![128, 128, 128];

        interp.invoke(&mut context, &PipelineNode::Terminal).await.unwrap();
        let pixels = context.pixel_buffer.snapshot();
        assert_eq!(pixels, vec![128, 128, 128]);
    }
}

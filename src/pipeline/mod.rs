//! Decode pipeline: an ordered chain of middleware sharing a mutable
//! decode context (§4.H). Generalises a "one compression method, swapped
//! by code" strategy shape into a composable chain. Decompression is
//! itself just the first node, with photometric interpretation as the
//! nodes after it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::pixelbuffer::PixelBuffer;
use crate::tiff::errors::{TiffError, TiffResult};

/// The mutable, per-image bundle threaded through one pipeline traversal.
/// Must not escape the `run` call that owns it (§3 "Decode context").
pub struct DecodeContext {
    pub compressed_data: Vec<u8>,
    pub uncompressed_data: Vec<u8>,
    pub image_width: u32,
    pub image_height: u32,
    pub source_read_offset: u64,
    pub read_size: u64,
    pub pixel_buffer: Arc<PixelBuffer>,
    pub cancellation: CancellationToken,
}

impl DecodeContext {
    pub fn new(pixel_buffer: Arc<PixelBuffer>, cancellation: CancellationToken) -> Self {
        DecodeContext {
            compressed_data: Vec::new(),
            uncompressed_data: Vec::new(),
            image_width: pixel_buffer.width(),
            image_height: pixel_buffer.height(),
            source_read_offset: 0,
            read_size: 0,
            pixel_buffer,
            cancellation,
        }
    }
}

/// One interceptor in the pipeline. `invoke` decides whether and when to
/// call `next.run(context)` — not calling it short-circuits the remainder
/// of the chain.
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn invoke(&self, context: &mut DecodeContext, next: &PipelineNode) -> TiffResult<()>;
}

/// A reified link in the pipeline graph: built once, traversed many times
/// (§9 "Pipeline as reified graph").
pub enum PipelineNode {
    Link {
        middleware: Arc<dyn Middleware>,
        next: Box<PipelineNode>,
    },
    Terminal,
}

impl PipelineNode {
    /// Checks cancellation before dispatch, then either runs the terminal
    /// no-op or hands off to this node's middleware.
    pub async fn run(&self, context: &mut DecodeContext) -> TiffResult<()> {
        if context.cancellation.is_cancelled() {
            return Err(TiffError::Cancelled);
        }
        match self {
            PipelineNode::Terminal => Ok(()),
            PipelineNode::Link { middleware, next } => middleware.invoke(context, next).await,
        }
    }
}

/// Assembles a fixed middleware order into a `Pipeline`.
pub struct PipelineBuilder {
    stages: Vec<Arc<dyn Middleware>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        PipelineBuilder { stages: Vec::new() }
    }

    pub fn push(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.stages.push(middleware);
        self
    }

    pub fn build(self) -> Pipeline {
        let mut node = PipelineNode::Terminal;
        for middleware in self.stages.into_iter().rev() {
            node = PipelineNode::Link {
                middleware,
                next: Box::new(node),
            };
        }
        Pipeline { root: node }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A built, reusable chain of middleware.
pub struct Pipeline {
    root: PipelineNode,
}

impl Pipeline {
    pub async fn run(&self, context: &mut DecodeContext) -> TiffResult<()> {
        self.root.run(context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RecordingMiddleware {
        calls_next: bool,
        fill: u8,
    }

    #[async_trait]
    impl Middleware for RecordingMiddleware {
        async fn invoke(&self, context: &mut DecodeContext, next: &PipelineNode) -> TiffResult<()> {
            context.uncompressed_data.push(self.fill);
            if self.calls_next {
                next.run(context).await
            } else {
                Ok(())
            }
        }
    }

    fn new_context() -> DecodeContext {
        let buffer = Arc::new(PixelBuffer::new(2, 2, 1));
        DecodeContext::new(buffer, CancellationToken::new())
    }

    #[tokio::test]
    async fn short_circuit_stops_downstream_nodes() {
        let pipeline = PipelineBuilder::new()
            .push(Arc::new(RecordingMiddleware {
                calls_next: false,
                fill: 1,
            }))
            .push(Arc::new(RecordingMiddleware {
                calls_next: true,
                fill: 2,
            }))
            .build();
        let mut context = new_context();
        pipeline.run(&mut context).await.unwrap();
        assert_eq!(context.uncompressed_data, vec![1]);
    }

    #[tokio::test]
    async fn full_chain_runs_in_order() {
        let pipeline = PipelineBuilder::new()
            .push(Arc::new(RecordingMiddleware {
                calls_next: true,
                fill: 1,
            }))
            .push(Arc::new(RecordingMiddleware {
                calls_next: true,
                fill: 2,
            }))
            .build();
        let mut context = new_context();
        pipeline.run(&mut context).await.unwrap();
        assert_eq!(context.uncompressed_data, vec![1, 2]);
    }

    #[tokio::test]
    async fn cancellation_before_dispatch_raises_cancelled() {
        let pipeline = PipelineBuilder::new()
            .push(Arc::new(RecordingMiddleware {
                calls_next: true,
                fill: 1,
            }))
            .build();
        let mut context = new_context();
        context.cancellation.cancel();
        let err = pipeline.run(&mut context).await.unwrap_err();
        assert!(matches!(err, TiffError::Cancelled));
        assert!(context.uncompressed_data.is_empty());
    }
}

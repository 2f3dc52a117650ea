use crate::error::{Error, Result};
use crate::render_queue::{RenderQueueGroup, Renderable};
use crate::renderer::Renderer;
use crate::engine_error;

/// Destination of proxy submissions and executor of a frame
pub trait RenderPipeline {
    /// Queues the proxies submit into
    fn queue_group(&mut self) -> &mut RenderQueueGroup;

    /// Append a renderable to the first queue named `queue`
    fn submit(&mut self, queue: &str, renderable: Renderable) -> Result<()> {
        match self.queue_group().render_queue_mut(queue) {
            Some(q) => {
                q.add_renderable(renderable);
                Ok(())
            }
            None => {
                engine_error!("staged::RenderPipeline", "Submit to unknown RenderQueue '{}'", queue);
                Err(Error::NotFound(format!("render queue '{}'", queue)))
            }
        }
    }

    /// Execute the frame's queued work
    fn render(&mut self, renderer: &mut dyn Renderer) -> Result<()>;

    /// GPU memory held by the pipeline's render targets, in bytes
    fn render_target_memory(&self) -> u64 {
        0
    }
}

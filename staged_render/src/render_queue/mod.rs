//! Render queues - ordered batches of draw submissions

mod material;
mod render_queue;
mod render_queue_group;

pub use material::Material;
pub use render_queue::{RenderQueue, Renderable};
pub use render_queue_group::RenderQueueGroup;

/*!
# Staged Render

Core of a staged, frame-synchronous rendering pipeline.

This crate decides every frame what is visible, in which order draw work is
grouped and how that work is handed to a graphics backend. The backend itself
stays behind the [`Renderer`](renderer::Renderer) trait so the pipeline can be
driven by Vulkan, OpenGL or a test double alike.

## Architecture

- **Frustum**: lazily cached corner vertices, planes and AABB of a view volume
- **Camera**: view / projection / view-projection matrices with dirty tracking
- **RenderQueueGroup**: ordered, name-indexed registry of render queues
- **RenderStageManager**: fixed, ID-ordered sequence of pipeline stages
- **StagedPipeline**: the concrete render pipeline tying queues, stages and
  render targets together
- **RenderScene**: per-frame bridge from camera frustums to proxy submission

Frame order: `Camera::update()` → `RenderScene::update()` →
`RenderSceneRegistry::render_all()` (which renders each scene's proxies and
then runs every stage).
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod config;
pub mod utils;
pub mod geometry;
pub mod camera;
pub mod renderer;
pub mod target;
pub mod render_queue;
pub mod render_stage;
pub mod pipeline;
pub mod scene;

// Main staged namespace module
pub mod staged {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging facade
    pub use crate::engine::Engine;

    // Configuration
    pub use crate::config::PipelineConfig;

    // Backend collaborator traits
    pub use crate::renderer::{Renderer, RenderProxy, RenderType, ClipSpaceConvention};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Geometry sub-module
    pub mod geometry {
        pub use crate::geometry::*;
    }

    // Render sub-module with queues, stages, targets and pipeline
    pub mod render {
        pub use crate::renderer::*;
        pub use crate::render_queue::*;
        pub use crate::render_stage::*;
        pub use crate::target::*;
        pub use crate::pipeline::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;

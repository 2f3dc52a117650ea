//! Render pipelines - where scene proxies submit their draw work

mod render_pipeline;
mod staged_pipeline;

pub use render_pipeline::RenderPipeline;
pub use staged_pipeline::StagedPipeline;

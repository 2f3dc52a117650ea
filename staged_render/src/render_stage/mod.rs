//! Render stages - the fixed, ID-ordered steps of a frame

mod render_stage;
mod queue_stage;
mod post_process;
mod glow;
mod shadow_map;
mod water_reflection;
mod render_stage_manager;

pub use render_stage::{
    queue_names, RenderStage, RenderStageId, StageContext, StageState, StageStatus,
};
pub use queue_stage::QueueRenderStage;
pub use post_process::{
    EffectOverride, ImageEffect, ImageEffectConfig, ImageEffectFlags, PostProcessRenderStage,
};
pub use glow::GlowRenderStage;
pub use shadow_map::ShadowMapRenderStage;
pub use water_reflection::WaterReflectionRenderStage;
pub use render_stage_manager::RenderStageManager;

#[cfg(test)]
mod test_fixture;

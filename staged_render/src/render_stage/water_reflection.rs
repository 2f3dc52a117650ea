use std::any::Any;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::target::{
    ClearValues, PixelFormat, RenderTargetId, RenderTargetManager, TargetOptions,
};
use crate::engine_warn;
use super::render_stage::{queue_names, RenderStage, RenderStageId, StageContext, StageState};

/// Planar water reflection stage.
///
/// Disabled until content needs it (a water material enables it). Lazy:
/// the reflection and refraction targets are created on first enable,
/// and only when the backend supports planar reflection.
#[derive(Debug, Clone)]
pub struct WaterReflectionRenderStage {
    state: StageState,
    clear: ClearValues,
}

impl WaterReflectionRenderStage {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            state: StageState::new(false),
            clear: ClearValues::color_depth(config.clear_color, config.depth_clear),
        }
    }
}

impl RenderStage for WaterReflectionRenderStage {
    fn id(&self) -> RenderStageId {
        RenderStageId::WaterReflection
    }

    fn state(&self) -> &StageState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut StageState {
        &mut self.state
    }

    fn initialize(&mut self, targets: &mut dyn RenderTargetManager, config: &PipelineConfig) -> Result<()> {
        if !config.water_reflection_supported {
            engine_warn!("staged::WaterReflectionRenderStage", "Water reflection not supported by the backend");
            return Ok(());
        }
        let options = TargetOptions { scale_factor: 0.5, ..TargetOptions::screen_with_depth() };
        for id in [RenderTargetId::WATER_REFLECTION, RenderTargetId::WATER_REFRACTION] {
            if targets.render_target(id).is_none() {
                targets.create_render_target(id, 0, 0, PixelFormat::Rgba8Unorm, options)?;
            }
        }
        self.state.mark_initialized();
        Ok(())
    }

    fn render(&mut self, ctx: &mut StageContext<'_>) -> Result<()> {
        let queue = queue_names::WATER_REFLECTION;
        if !self.state.is_active() {
            return ctx.queues.clear_render_queue(queue, queue, true);
        }
        ctx.draw_queue_range(RenderTargetId::WATER_REFLECTION, self.clear, queue, queue, true)?;
        Ok(())
    }

    fn destroy(&mut self, targets: &mut dyn RenderTargetManager) {
        if self.state.is_initialized() {
            targets.destroy_render_target(RenderTargetId::WATER_REFLECTION);
            targets.destroy_render_target(RenderTargetId::WATER_REFRACTION);
        }
        self.state.mark_destroyed();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

use std::any::Any;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::target::{PixelFormat, RenderTargetId, RenderTargetManager, TargetOptions};
use crate::engine_warn;
use super::post_process::{EffectOverride, ImageEffectFlags, PostProcessRenderStage};
use super::render_stage::{RenderStage, RenderStageId, StageContext, StageState};

/// Glow stage.
///
/// Lazy: initializes on first enable, and only when the backend supports
/// glow. When active it borrows the post-process chain with only the glow
/// effect on, reading the final LDR buffer into the half-res glow target,
/// which is then presented to the back buffer. Otherwise it copies the final
/// LDR buffer to the back buffer.
#[derive(Debug, Clone)]
pub struct GlowRenderStage {
    state: StageState,
}

impl GlowRenderStage {
    /// Effects switched off while glow runs. The final LDR buffer is
    /// already tone mapped.
    pub const SUPPRESSED: ImageEffectFlags = ImageEffectFlags::BLOOM
        .union(ImageEffectFlags::BLUR)
        .union(ImageEffectFlags::DOF)
        .union(ImageEffectFlags::TONE_MAPPING);

    pub fn new(enabled: bool) -> Self {
        Self { state: StageState::new(enabled) }
    }
}

impl RenderStage for GlowRenderStage {
    fn id(&self) -> RenderStageId {
        RenderStageId::Glow
    }

    fn state(&self) -> &StageState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut StageState {
        &mut self.state
    }

    fn initialize(&mut self, targets: &mut dyn RenderTargetManager, config: &PipelineConfig) -> Result<()> {
        if !config.glow_supported {
            engine_warn!("staged::GlowRenderStage", "Glow not supported by the backend, stage stays uninitialized");
            return Ok(());
        }
        if targets.render_target(RenderTargetId::GLOW).is_none() {
            targets.create_render_target(
                RenderTargetId::GLOW,
                0,
                0,
                PixelFormat::Rgba8Unorm,
                TargetOptions { scale_factor: 0.5, ..TargetOptions::screen() },
            )?;
        }
        self.state.mark_initialized();
        Ok(())
    }

    fn render(&mut self, ctx: &mut StageContext<'_>) -> Result<()> {
        if !self.state.is_active() {
            return ctx.targets.update_render_target(
                RenderTargetId::FINAL_LDR_BUFFER,
                RenderTargetId::DEFAULT_BACK_BUFFER,
            );
        }

        {
            let effects = EffectOverride::apply(&mut *ctx.effects, Self::SUPPRESSED, ImageEffectFlags::GLOW);
            PostProcessRenderStage::run_effect_chain(
                &mut *ctx.renderer,
                &mut *ctx.targets,
                effects.flags(),
                RenderTargetId::FINAL_LDR_BUFFER,
                RenderTargetId::GLOW,
            )?;
        }
        ctx.targets.update_render_target(RenderTargetId::GLOW, RenderTargetId::DEFAULT_BACK_BUFFER)
    }

    fn destroy(&mut self, targets: &mut dyn RenderTargetManager) {
        if self.state.is_initialized() {
            targets.destroy_render_target(RenderTargetId::GLOW);
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

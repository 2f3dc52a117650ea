/// Post-process stage and the image effect chain.
///
/// The chain reads the scene color target and ends in the final LDR
/// buffer, ping-ponging through the post-process target: the destination
/// of each pass is picked so the last pass always lands in the requested
/// output.

use std::any::Any;
use bitflags::bitflags;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::renderer::Renderer;
use crate::target::{
    ClearValues, PixelFormat, RenderTargetId, RenderTargetManager, TargetOptions,
};
use crate::engine_trace;
use super::queue_stage::QueueRenderStage;
use super::render_stage::{RenderStage, RenderStageId, StageContext, StageState};

bitflags! {
    /// Active image effects
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImageEffectFlags: u32 {
        const BLOOM = 1 << 0;
        const BLUR = 1 << 1;
        const DOF = 1 << 2;
        const GLOW = 1 << 3;
        const TONE_MAPPING = 1 << 4;
    }
}

/// One full-screen effect pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageEffect {
    Bloom,
    Blur,
    Dof,
    Glow,
    ToneMapping,
}

impl ImageEffect {
    /// Pass order of the chain
    pub const CHAIN: [ImageEffect; 5] = [
        ImageEffect::Bloom,
        ImageEffect::Blur,
        ImageEffect::Dof,
        ImageEffect::Glow,
        ImageEffect::ToneMapping,
    ];

    pub fn flag(self) -> ImageEffectFlags {
        match self {
            ImageEffect::Bloom => ImageEffectFlags::BLOOM,
            ImageEffect::Blur => ImageEffectFlags::BLUR,
            ImageEffect::Dof => ImageEffectFlags::DOF,
            ImageEffect::Glow => ImageEffectFlags::GLOW,
            ImageEffect::ToneMapping => ImageEffectFlags::TONE_MAPPING,
        }
    }

    /// Effects of `flags`, in chain order
    pub fn chain(flags: ImageEffectFlags) -> Vec<ImageEffect> {
        Self::CHAIN.into_iter().filter(|e| flags.contains(e.flag())).collect()
    }
}

/// Post-process configuration shared by the stages of a pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct ImageEffectConfig {
    pub flags: ImageEffectFlags,
}

impl ImageEffectConfig {
    pub fn new(flags: ImageEffectFlags) -> Self {
        Self { flags }
    }
}

/// Temporary change of the effect flags, undone on drop
///
/// ```ignore
/// {
///     let effects = EffectOverride::apply(config, ImageEffectFlags::BLOOM, ImageEffectFlags::GLOW);
///     run(effects.flags());
/// } // previous flags restored here
/// ```
pub struct EffectOverride<'a> {
    config: &'a mut ImageEffectConfig,
    saved: ImageEffectFlags,
}

impl<'a> EffectOverride<'a> {
    pub fn apply(
        config: &'a mut ImageEffectConfig,
        disable: ImageEffectFlags,
        enable: ImageEffectFlags,
    ) -> Self {
        let saved = config.flags;
        config.flags = saved.difference(disable).union(enable);
        Self { config, saved }
    }

    /// Flags in effect while the override lives
    pub fn flags(&self) -> ImageEffectFlags {
        self.config.flags
    }

    /// Flags that will be restored
    pub fn saved(&self) -> ImageEffectFlags {
        self.saved
    }
}

impl Drop for EffectOverride<'_> {
    fn drop(&mut self) {
        self.config.flags = self.saved;
    }
}

/// Runs the image effect chain over the scene color target
#[derive(Debug, Clone)]
pub struct PostProcessRenderStage {
    state: StageState,
    source: RenderTargetId,
}

impl PostProcessRenderStage {
    pub fn new(config: &PipelineConfig, enabled: bool) -> Self {
        Self {
            state: StageState::new(enabled),
            source: QueueRenderStage::scene_color_target(config),
        }
    }

    /// Target the chain reads
    pub fn source(&self) -> RenderTargetId {
        self.source
    }

    /// Re-point the chain, used when the pipeline switches HDR at runtime
    pub fn set_source(&mut self, source: RenderTargetId) {
        self.source = source;
    }

    /// Apply every effect of `flags` from `source` into `output`
    ///
    /// Without effects `source` is copied to `output`. Returns the number
    /// of effect passes.
    pub fn run_effect_chain(
        renderer: &mut dyn Renderer,
        targets: &mut dyn RenderTargetManager,
        flags: ImageEffectFlags,
        source: RenderTargetId,
        output: RenderTargetId,
    ) -> Result<usize> {
        let effects = ImageEffect::chain(flags);
        if effects.is_empty() {
            targets.update_render_target(source, output)?;
            return Ok(0);
        }

        let count = effects.len();
        let mut src = source;
        for (i, effect) in effects.into_iter().enumerate() {
            let dst = if (count - 1 - i) % 2 == 0 { output } else { RenderTargetId::POST_PROCESS };
            targets.begin_render_target(dst, ClearValues::none())?;
            let drawn = renderer.draw_image_effect(effect, src, dst);
            targets.end_render_target(dst)?;
            drawn?;
            engine_trace!("staged::PostProcess", "{:?}: {} -> {}", effect, src, dst);
            src = dst;
        }
        Ok(count)
    }
}

impl RenderStage for PostProcessRenderStage {
    fn id(&self) -> RenderStageId {
        RenderStageId::PostProcess
    }

    fn state(&self) -> &StageState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut StageState {
        &mut self.state
    }

    fn initialize(&mut self, targets: &mut dyn RenderTargetManager, _config: &PipelineConfig) -> Result<()> {
        if targets.render_target(RenderTargetId::POST_PROCESS).is_none() {
            targets.create_render_target(
                RenderTargetId::POST_PROCESS,
                0,
                0,
                PixelFormat::Rgba16Float,
                TargetOptions::screen(),
            )?;
        }
        self.state.mark_initialized();
        Ok(())
    }

    /// Effect chain into the final LDR buffer, or a plain copy when disabled
    fn render(&mut self, ctx: &mut StageContext<'_>) -> Result<()> {
        if !self.state.is_active() {
            return ctx.targets.update_render_target(self.source, RenderTargetId::FINAL_LDR_BUFFER);
        }
        Self::run_effect_chain(
            &mut *ctx.renderer,
            &mut *ctx.targets,
            ctx.effects.flags,
            self.source,
            RenderTargetId::FINAL_LDR_BUFFER,
        )?;
        Ok(())
    }

    fn destroy(&mut self, targets: &mut dyn RenderTargetManager) {
        if self.state.is_initialized() {
            targets.destroy_render_target(RenderTargetId::POST_PROCESS);
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

#[cfg(test)]
#[path = "post_process_tests.rs"]
mod tests;

/// The staged render pipeline.
///
/// Owns the queue group, the stage manager, the render targets and the
/// image effect configuration. A frame is: proxies submit into the queues,
/// then `render()` runs every stage in ID order and resets the queues.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::render_queue::RenderQueueGroup;
use crate::render_stage::{
    queue_names, ImageEffectConfig, PostProcessRenderStage, QueueRenderStage, RenderStageId,
    RenderStageManager, StageContext,
};
use crate::renderer::Renderer;
use crate::target::{
    ClearValues, PixelFormat, RenderTargetId, RenderTargetManager, TargetManager, TargetOptions,
};
use crate::{engine_info, engine_warn};
use super::render_pipeline::RenderPipeline;

pub struct StagedPipeline {
    config: PipelineConfig,
    queues: RenderQueueGroup,
    stages: RenderStageManager,
    targets: TargetManager,
    effects: ImageEffectConfig,
    frame_count: u64,
}

impl StagedPipeline {
    /// Create the base targets, the default queues and every stage
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let mut targets = TargetManager::new(config.screen_width, config.screen_height);
        targets.create_render_target(
            RenderTargetId::LDR_SCENE_COLOR,
            0,
            0,
            PixelFormat::Rgba8Unorm,
            TargetOptions::screen_with_depth(),
        )?;
        targets.create_render_target(
            RenderTargetId::FINAL_LDR_BUFFER,
            0,
            0,
            PixelFormat::Rgba8Unorm,
            TargetOptions::screen(),
        )?;

        let mut queues = RenderQueueGroup::new();
        for name in queue_names::DEFAULT_QUEUE_ORDER {
            queues.add_render_queue(name);
        }

        let stages = RenderStageManager::with_default_stages(&mut targets, &config)?;
        engine_info!(
            "staged::StagedPipeline",
            "Pipeline ready: {}x{}, {} stages, {} queues",
            config.screen_width, config.screen_height, stages.stage_count(), queues.render_queue_count()
        );

        Ok(Self {
            effects: ImageEffectConfig::new(config.image_effects),
            config,
            queues,
            stages,
            targets,
            frame_count: 0,
        })
    }

    // ===== ACCESSORS =====

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn queues(&self) -> &RenderQueueGroup {
        &self.queues
    }

    pub fn queues_mut(&mut self) -> &mut RenderQueueGroup {
        &mut self.queues
    }

    pub fn stages(&self) -> &RenderStageManager {
        &self.stages
    }

    pub fn stages_mut(&mut self) -> &mut RenderStageManager {
        &mut self.stages
    }

    pub fn targets(&self) -> &TargetManager {
        &self.targets
    }

    pub fn targets_mut(&mut self) -> &mut TargetManager {
        &mut self.targets
    }

    pub fn effects(&self) -> &ImageEffectConfig {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut ImageEffectConfig {
        &mut self.effects
    }

    /// Frames rendered so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    // ===== CONTROL =====

    /// Enable or disable a stage
    ///
    /// The LDR and HDR scene color stages are a pair: toggling either one
    /// switches the pipeline through `set_hdr`.
    pub fn set_stage_enable(&mut self, id: RenderStageId, enable: bool) -> Result<()> {
        match id {
            RenderStageId::HdrSceneColor => self.set_hdr(enable),
            RenderStageId::LdrSceneColor => self.set_hdr(!enable),
            _ => self.stages.set_stage_enable(id, enable, &mut self.targets, &self.config),
        }
    }

    /// Switch the scene color between the LDR and HDR targets
    ///
    /// Exactly one scene color stage stays enabled. The post-process chain
    /// and the editor background follow the new target.
    pub fn set_hdr(&mut self, enabled: bool) -> Result<()> {
        // Enable first so the new target exists before anything reads it
        let (on, off) = if enabled {
            (RenderStageId::HdrSceneColor, RenderStageId::LdrSceneColor)
        } else {
            (RenderStageId::LdrSceneColor, RenderStageId::HdrSceneColor)
        };
        self.stages.set_stage_enable(on, true, &mut self.targets, &self.config)?;
        self.stages.set_stage_enable(off, false, &mut self.targets, &self.config)?;
        self.config.hdr = enabled;

        let source = QueueRenderStage::scene_color_target(&self.config);
        if let Some(stage) = self.stages.stage_by_id_mut::<PostProcessRenderStage>(RenderStageId::PostProcess) {
            stage.set_source(source);
        }
        if let Some(stage) = self.stages.stage_by_id_mut::<QueueRenderStage>(RenderStageId::EditorBackground) {
            stage.set_target(source);
        }
        engine_info!("staged::StagedPipeline", "Scene color now {}", source);
        Ok(())
    }

    /// Toggle the editor background and foreground stages
    ///
    /// With the editor background on, the scene stages only clear depth.
    pub fn set_editor_mode(&mut self, enabled: bool) -> Result<()> {
        self.config.editor_mode = enabled;
        self.set_stage_enable(RenderStageId::EditorBackground, enabled)?;
        self.set_stage_enable(RenderStageId::EditorForeground, enabled)?;

        let clear = if enabled {
            ClearValues::depth(self.config.depth_clear)
        } else {
            ClearValues::color_depth(self.config.clear_color, self.config.depth_clear)
        };
        for id in [RenderStageId::LdrSceneColor, RenderStageId::HdrSceneColor] {
            if let Some(stage) = self.stages.stage_by_id_mut::<QueueRenderStage>(id) {
                stage.set_clear_values(clear);
            }
        }
        Ok(())
    }

    /// Resize the back buffer and every screen-relative target
    pub fn on_screen_size_changed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            engine_warn!("staged::StagedPipeline", "Ignoring resize to {}x{}", width, height);
            return;
        }
        self.config.screen_width = width;
        self.config.screen_height = height;
        self.targets.on_screen_size_changed(width, height);
    }

    /// Release every stage and render target
    pub fn destroy(&mut self) {
        self.stages.destroy(&mut self.targets);
        self.targets.clear();
        self.queues.clear();
    }
}

impl RenderPipeline for StagedPipeline {
    fn queue_group(&mut self) -> &mut RenderQueueGroup {
        &mut self.queues
    }

    /// Run every stage, then reset the queues for the next frame
    fn render(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        let mut ctx = StageContext {
            renderer,
            queues: &mut self.queues,
            targets: &mut self.targets,
            effects: &mut self.effects,
            config: &self.config,
        };
        let failures = self.stages.process_render_stages(&mut ctx);
        if failures > 0 {
            engine_warn!(
                "staged::StagedPipeline",
                "Frame {}: {} stage(s) failed",
                self.frame_count, failures
            );
        }

        self.queues.begin_render();
        self.frame_count += 1;
        Ok(())
    }

    fn render_target_memory(&self) -> u64 {
        self.targets.memory_size()
    }
}

#[cfg(test)]
#[path = "staged_pipeline_tests.rs"]
mod tests;

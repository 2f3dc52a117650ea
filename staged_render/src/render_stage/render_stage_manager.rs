/// Owner of the pipeline's render stages.
///
/// Stages are keyed by `RenderStageId`; iteration follows the ID order, so
/// the frame order is fixed whatever order the stages were registered in.

use std::collections::BTreeMap;
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::target::RenderTargetManager;
use crate::{engine_bail, engine_error, engine_trace};
use super::glow::GlowRenderStage;
use super::post_process::PostProcessRenderStage;
use super::queue_stage::QueueRenderStage;
use super::render_stage::{RenderStage, RenderStageId, StageContext};
use super::shadow_map::ShadowMapRenderStage;
use super::water_reflection::WaterReflectionRenderStage;

#[derive(Default)]
pub struct RenderStageManager {
    stages: BTreeMap<RenderStageId, Box<dyn RenderStage>>,
}

impl RenderStageManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the full stage set and initialize the enabled stages
    ///
    /// Disabled stages initialize on their first enable.
    pub fn with_default_stages(
        targets: &mut dyn RenderTargetManager,
        config: &PipelineConfig,
    ) -> Result<Self> {
        let mut manager = Self::new();
        let stages: Vec<Box<dyn RenderStage>> = vec![
            Box::new(QueueRenderStage::editor_background(config)),
            Box::new(QueueRenderStage::coverage(config)),
            Box::new(QueueRenderStage::ldr_scene_color(config)),
            Box::new(QueueRenderStage::hdr_scene_color(config)),
            Box::new(PostProcessRenderStage::new(config, true)),
            Box::new(QueueRenderStage::after_post_process()),
            Box::new(QueueRenderStage::reflective()),
            Box::new(ShadowMapRenderStage::new(config)),
            Box::new(WaterReflectionRenderStage::new(config)),
            Box::new(GlowRenderStage::new(false)),
            Box::new(QueueRenderStage::skeletal_2d()),
            Box::new(QueueRenderStage::ui()),
            Box::new(QueueRenderStage::editor_foreground(config)),
        ];
        for stage in stages {
            manager.register_stage(stage)?;
        }

        for stage in manager.stages.values_mut() {
            if stage.state().is_enabled() {
                stage.initialize(targets, config)?;
            }
        }
        Ok(manager)
    }

    /// Add a stage
    ///
    /// # Errors
    ///
    /// Returns an error if a stage with the same ID is already registered.
    pub fn register_stage(&mut self, stage: Box<dyn RenderStage>) -> Result<()> {
        let id = stage.id();
        if self.stages.contains_key(&id) {
            engine_bail!("staged::RenderStageManager", "Stage {} already registered", id.name());
        }
        self.stages.insert(id, stage);
        Ok(())
    }

    // ===== ACCESS =====

    pub fn render_stage_by_id(&self, id: RenderStageId) -> Option<&dyn RenderStage> {
        let stage = self.stages.get(&id)?;
        Some(&**stage)
    }

    pub fn render_stage_by_id_mut(&mut self, id: RenderStageId) -> Option<&mut dyn RenderStage> {
        let stage = self.stages.get_mut(&id)?;
        Some(&mut **stage)
    }

    /// First stage of concrete type `T`
    pub fn stage<T: RenderStage>(&self) -> Option<&T> {
        self.stages.values().find_map(|s| s.as_any().downcast_ref::<T>())
    }

    pub fn stage_mut<T: RenderStage>(&mut self) -> Option<&mut T> {
        self.stages.values_mut().find_map(|s| s.as_any_mut().downcast_mut::<T>())
    }

    /// Stage `id` as concrete type `T`
    pub fn stage_by_id_mut<T: RenderStage>(&mut self, id: RenderStageId) -> Option<&mut T> {
        self.stages.get_mut(&id)?.as_any_mut().downcast_mut::<T>()
    }

    pub fn shadow_map_stage(&self) -> Option<&ShadowMapRenderStage> {
        self.stage::<ShadowMapRenderStage>()
    }

    pub fn shadow_map_stage_mut(&mut self) -> Option<&mut ShadowMapRenderStage> {
        self.stage_mut::<ShadowMapRenderStage>()
    }

    /// Registered IDs in execution order
    pub fn stage_ids(&self) -> Vec<RenderStageId> {
        self.stages.keys().copied().collect()
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    // ===== CONTROL =====

    /// Enable or disable a stage (initializing it on first enable)
    pub fn set_stage_enable(
        &mut self,
        id: RenderStageId,
        enable: bool,
        targets: &mut dyn RenderTargetManager,
        config: &PipelineConfig,
    ) -> Result<()> {
        let Some(stage) = self.stages.get_mut(&id) else {
            engine_error!("staged::RenderStageManager", "Stage {} not found", id.name());
            return Err(Error::NotFound(format!("render stage {}", id.name())));
        };
        stage.set_enable(enable, targets, config)
    }

    /// Render every stage in ID order
    ///
    /// A failing stage is logged and the next stage still runs. Destroyed
    /// stages are skipped. Returns the number of stages that failed.
    pub fn process_render_stages(&mut self, ctx: &mut StageContext<'_>) -> usize {
        let mut failures = 0;
        for (id, stage) in self.stages.iter_mut() {
            if stage.state().is_destroyed() {
                continue;
            }
            engine_trace!("staged::RenderStageManager", "Render stage {}", id.name());
            if let Err(e) = stage.render(ctx) {
                engine_error!("staged::RenderStageManager", "Stage {} failed: {}", id.name(), e);
                failures += 1;
            }
        }
        failures
    }

    /// Destroy every stage and release their targets
    pub fn destroy(&mut self, targets: &mut dyn RenderTargetManager) {
        for stage in self.stages.values_mut() {
            if !stage.state().is_destroyed() {
                stage.destroy(targets);
            }
        }
    }
}

#[cfg(test)]
#[path = "render_stage_manager_tests.rs"]
mod tests;

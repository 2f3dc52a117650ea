use std::any::Any;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::target::{
    ClearValues, PixelFormat, RenderTargetId, RenderTargetManager, TargetOptions,
};
use crate::engine_trace;
use super::render_stage::{queue_names, RenderStage, RenderStageId, StageContext, StageState};

/// Target a stage creates on initialization and releases on destroy
#[derive(Debug, Clone, Copy)]
struct OwnedTarget {
    format: PixelFormat,
    options: TargetOptions,
}

/// Stage that renders a contiguous range of queues into one target.
///
/// When disabled nothing is drawn. The range is left untouched since an
/// alternative stage (LDR vs HDR scene color) may render the same queues.
#[derive(Debug, Clone)]
pub struct QueueRenderStage {
    id: RenderStageId,
    state: StageState,
    target: RenderTargetId,
    owned: Option<OwnedTarget>,
    clear: ClearValues,
    begin_queue: String,
    end_queue: String,
    include_end: bool,
}

impl QueueRenderStage {
    pub fn new(
        id: RenderStageId,
        target: RenderTargetId,
        clear: ClearValues,
        begin_queue: &str,
        end_queue: &str,
        include_end: bool,
        enabled: bool,
    ) -> Self {
        Self {
            id,
            state: StageState::new(enabled),
            target,
            owned: None,
            clear,
            begin_queue: begin_queue.to_string(),
            end_queue: end_queue.to_string(),
            include_end,
        }
    }

    /// Stage rendering a single queue
    pub fn single(id: RenderStageId, target: RenderTargetId, clear: ClearValues, queue: &str, enabled: bool) -> Self {
        Self::new(id, target, clear, queue, queue, true, enabled)
    }

    /// Make the stage create its target on initialization
    pub fn owning_target(mut self, format: PixelFormat, options: TargetOptions) -> Self {
        self.owned = Some(OwnedTarget { format, options });
        self
    }

    // ===== DEFAULT LAYOUT =====

    /// Scene color target written by the scene stages
    pub fn scene_color_target(config: &PipelineConfig) -> RenderTargetId {
        if config.hdr { RenderTargetId::SCENE_COLOR } else { RenderTargetId::LDR_SCENE_COLOR }
    }

    pub fn editor_background(config: &PipelineConfig) -> Self {
        Self::single(
            RenderStageId::EditorBackground,
            Self::scene_color_target(config),
            ClearValues::color_depth(config.clear_color, config.depth_clear),
            queue_names::EDITOR_BACKGROUND,
            config.editor_mode,
        )
    }

    pub fn coverage(config: &PipelineConfig) -> Self {
        Self::single(
            RenderStageId::Coverage,
            RenderTargetId::COVERAGE,
            ClearValues::color_depth([0.0; 4], config.depth_clear),
            queue_names::COVERAGE,
            false,
        )
        .owning_target(PixelFormat::R8Unorm, TargetOptions { scale_factor: 0.5, ..TargetOptions::screen_with_depth() })
    }

    /// Background through Effect into the LDR scene color target
    pub fn ldr_scene_color(config: &PipelineConfig) -> Self {
        Self::new(
            RenderStageId::LdrSceneColor,
            RenderTargetId::LDR_SCENE_COLOR,
            Self::scene_clear(config),
            queue_names::BACKGROUND,
            queue_names::EFFECT,
            true,
            !config.hdr,
        )
    }

    /// Background through Effect into the HDR scene color target
    pub fn hdr_scene_color(config: &PipelineConfig) -> Self {
        Self::new(
            RenderStageId::HdrSceneColor,
            RenderTargetId::SCENE_COLOR,
            Self::scene_clear(config),
            queue_names::BACKGROUND,
            queue_names::EFFECT,
            true,
            config.hdr,
        )
        .owning_target(PixelFormat::Rgba16Float, TargetOptions::screen_with_depth())
    }

    fn scene_clear(config: &PipelineConfig) -> ClearValues {
        // The editor background already filled the color buffer
        if config.editor_mode {
            ClearValues::depth(config.depth_clear)
        } else {
            ClearValues::color_depth(config.clear_color, config.depth_clear)
        }
    }

    pub fn after_post_process() -> Self {
        Self::single(
            RenderStageId::AfterPostProcess,
            RenderTargetId::FINAL_LDR_BUFFER,
            ClearValues::none(),
            queue_names::AFTER_POST_PROCESS,
            true,
        )
    }

    pub fn reflective() -> Self {
        Self::single(
            RenderStageId::Reflective,
            RenderTargetId::FINAL_LDR_BUFFER,
            ClearValues::none(),
            queue_names::REFLECTIVE,
            true,
        )
    }

    pub fn skeletal_2d() -> Self {
        Self::single(
            RenderStageId::Skeletal2d,
            RenderTargetId::DEFAULT_BACK_BUFFER,
            ClearValues::none(),
            queue_names::SKELETAL_2D,
            true,
        )
    }

    pub fn ui() -> Self {
        Self::single(
            RenderStageId::Ui,
            RenderTargetId::DEFAULT_BACK_BUFFER,
            ClearValues::none(),
            queue_names::UI,
            true,
        )
    }

    pub fn editor_foreground(config: &PipelineConfig) -> Self {
        Self::single(
            RenderStageId::EditorForeground,
            RenderTargetId::DEFAULT_BACK_BUFFER,
            ClearValues::none(),
            queue_names::EDITOR_FOREGROUND,
            config.editor_mode,
        )
    }

    // ===== ACCESSORS =====

    pub fn target(&self) -> RenderTargetId {
        self.target
    }

    pub fn set_target(&mut self, target: RenderTargetId) {
        self.target = target;
    }

    pub fn clear_values(&self) -> ClearValues {
        self.clear
    }

    pub fn set_clear_values(&mut self, clear: ClearValues) {
        self.clear = clear;
    }

    /// First queue, last queue and whether the last one is rendered
    pub fn queue_range(&self) -> (&str, &str, bool) {
        (&self.begin_queue, &self.end_queue, self.include_end)
    }
}

impl RenderStage for QueueRenderStage {
    fn id(&self) -> RenderStageId {
        self.id
    }

    fn state(&self) -> &StageState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut StageState {
        &mut self.state
    }

    fn initialize(&mut self, targets: &mut dyn RenderTargetManager, _config: &PipelineConfig) -> Result<()> {
        if let Some(owned) = self.owned {
            if targets.render_target(self.target).is_none() {
                targets.create_render_target(self.target, 0, 0, owned.format, owned.options)?;
            }
        }
        self.state.mark_initialized();
        Ok(())
    }

    fn render(&mut self, ctx: &mut StageContext<'_>) -> Result<()> {
        if !self.state.is_active() {
            return Ok(());
        }
        let drawn = ctx.draw_queue_range(
            self.target,
            self.clear,
            &self.begin_queue,
            &self.end_queue,
            self.include_end,
        )?;
        engine_trace!("staged::QueueRenderStage", "{}: {} draws", self.id.name(), drawn);
        Ok(())
    }

    fn destroy(&mut self, targets: &mut dyn RenderTargetManager) {
        if self.owned.is_some() && self.state.is_initialized() {
            targets.destroy_render_target(self.target);
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

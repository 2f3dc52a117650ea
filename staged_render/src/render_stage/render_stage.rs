/// Render stage contract.
///
/// A stage moves through `Uninitialized -> Enabled <-> Disabled ->
/// Destroyed`. It is initialized at most once; lazy stages (whose
/// resources depend on optional backend features) stay uninitialized
/// until they are enabled and retry on every enable until it succeeds.
/// `render()` runs every frame until the stage is destroyed: a disabled
/// stage may still do fallback work so later stages find their inputs.

use std::any::Any;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::render_queue::RenderQueueGroup;
use crate::renderer::Renderer;
use crate::target::{ClearValues, RenderTargetId, RenderTargetManager};
use crate::{engine_debug, engine_warn};
use super::post_process::ImageEffectConfig;

/// Stage identifiers, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderStageId {
    EditorBackground,
    Coverage,
    LdrSceneColor,
    HdrSceneColor,
    PostProcess,
    AfterPostProcess,
    Reflective,
    ShadowMap,
    WaterReflection,
    Glow,
    Skeletal2d,
    Ui,
    EditorForeground,
}

impl RenderStageId {
    pub const ALL: [RenderStageId; 13] = [
        RenderStageId::EditorBackground,
        RenderStageId::Coverage,
        RenderStageId::LdrSceneColor,
        RenderStageId::HdrSceneColor,
        RenderStageId::PostProcess,
        RenderStageId::AfterPostProcess,
        RenderStageId::Reflective,
        RenderStageId::ShadowMap,
        RenderStageId::WaterReflection,
        RenderStageId::Glow,
        RenderStageId::Skeletal2d,
        RenderStageId::Ui,
        RenderStageId::EditorForeground,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RenderStageId::EditorBackground => "EditorBackground",
            RenderStageId::Coverage => "Coverage",
            RenderStageId::LdrSceneColor => "LdrSceneColor",
            RenderStageId::HdrSceneColor => "HdrSceneColor",
            RenderStageId::PostProcess => "PostProcess",
            RenderStageId::AfterPostProcess => "AfterPostProcess",
            RenderStageId::Reflective => "Reflective",
            RenderStageId::ShadowMap => "ShadowMap",
            RenderStageId::WaterReflection => "WaterReflection",
            RenderStageId::Glow => "Glow",
            RenderStageId::Skeletal2d => "Skeletal2d",
            RenderStageId::Ui => "Ui",
            RenderStageId::EditorForeground => "EditorForeground",
        }
    }
}

/// Names of the built-in render queues
pub mod queue_names {
    pub const EDITOR_BACKGROUND: &str = "EditorBackground";
    pub const COVERAGE: &str = "Coverage";
    pub const BACKGROUND: &str = "Background";
    pub const OPAQUE: &str = "Opaque";
    pub const TRANSPARENT: &str = "Transparent";
    pub const EFFECT: &str = "Effect";
    pub const AFTER_POST_PROCESS: &str = "AfterPostProcess";
    pub const REFLECTIVE: &str = "Reflective";
    pub const SHADOW_MAP: &str = "ShadowMap";
    pub const WATER_REFLECTION: &str = "WaterReflection";
    pub const SKELETAL_2D: &str = "Skeletal2d";
    pub const UI: &str = "UI";
    pub const EDITOR_FOREGROUND: &str = "EditorForeground";

    /// Queue order of a freshly built pipeline
    pub const DEFAULT_QUEUE_ORDER: [&str; 13] = [
        EDITOR_BACKGROUND,
        COVERAGE,
        BACKGROUND,
        OPAQUE,
        TRANSPARENT,
        EFFECT,
        AFTER_POST_PROCESS,
        REFLECTIVE,
        SHADOW_MAP,
        WATER_REFLECTION,
        SKELETAL_2D,
        UI,
        EDITOR_FOREGROUND,
    ];
}

/// Lifecycle state of a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Uninitialized,
    Enabled,
    Disabled,
    Destroyed,
}

/// Flags shared by every stage
#[derive(Debug, Clone, Default)]
pub struct StageState {
    enabled: bool,
    initialized: bool,
    destroyed: bool,
    init_count: u32,
}

impl StageState {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, ..Self::default() }
    }

    pub fn status(&self) -> StageStatus {
        if self.destroyed {
            StageStatus::Destroyed
        } else if !self.initialized {
            StageStatus::Uninitialized
        } else if self.enabled {
            StageStatus::Enabled
        } else {
            StageStatus::Disabled
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Enabled and initialized
    pub fn is_active(&self) -> bool {
        self.enabled && self.initialized && !self.destroyed
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Record a successful initialization; false if it already happened
    pub fn mark_initialized(&mut self) -> bool {
        if self.initialized {
            return false;
        }
        self.initialized = true;
        self.init_count += 1;
        true
    }

    pub fn mark_destroyed(&mut self) {
        self.destroyed = true;
        self.enabled = false;
        self.initialized = false;
    }

    /// Number of successful initializations (0 or 1)
    pub fn init_count(&self) -> u32 {
        self.init_count
    }
}

/// Everything a stage may touch while rendering
pub struct StageContext<'a> {
    pub renderer: &'a mut dyn Renderer,
    pub queues: &'a mut RenderQueueGroup,
    pub targets: &'a mut dyn RenderTargetManager,
    pub effects: &'a mut ImageEffectConfig,
    pub config: &'a PipelineConfig,
}

impl StageContext<'_> {
    /// Bind `target`, render the queue range into it, unbind
    ///
    /// The target is unbound even when a queue fails.
    pub fn draw_queue_range(
        &mut self,
        target: RenderTargetId,
        clear: ClearValues,
        begin: &str,
        end: &str,
        include_end: bool,
    ) -> Result<u32> {
        self.targets.begin_render_target(target, clear)?;
        let drawn = self.queues.exec_render_queue(begin, end, include_end, &mut *self.renderer);
        self.targets.end_render_target(target)?;
        drawn
    }
}

/// A step of the frame
pub trait RenderStage: Any {
    fn id(&self) -> RenderStageId;

    fn state(&self) -> &StageState;

    fn state_mut(&mut self) -> &mut StageState;

    /// Acquire the stage's resources
    ///
    /// Only called while uninitialized. A lazy stage whose feature is
    /// unavailable returns `Ok` without marking itself initialized.
    fn initialize(&mut self, _targets: &mut dyn RenderTargetManager, _config: &PipelineConfig) -> Result<()> {
        self.state_mut().mark_initialized();
        Ok(())
    }

    /// Enable or disable the stage, initializing it on enable if needed
    fn set_enable(
        &mut self,
        enable: bool,
        targets: &mut dyn RenderTargetManager,
        config: &PipelineConfig,
    ) -> Result<()> {
        if self.state().is_destroyed() {
            engine_warn!("staged::RenderStage", "Stage {} is destroyed, set_enable ignored", self.id().name());
            return Ok(());
        }
        self.state_mut().set_enabled(enable);
        if enable && !self.state().is_initialized() {
            engine_debug!("staged::RenderStage", "Initializing stage {} on enable", self.id().name());
            self.initialize(targets, config)?;
        }
        Ok(())
    }

    /// Called once per frame, in stage ID order
    fn render(&mut self, ctx: &mut StageContext<'_>) -> Result<()>;

    /// Release resources; terminal
    fn destroy(&mut self, _targets: &mut dyn RenderTargetManager) {
        self.state_mut().mark_destroyed();
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

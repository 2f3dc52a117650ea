/// Stage test fixture: a mock backend, the default queues and a target
/// manager holding the targets the pipeline creates up front.

use std::cell::RefCell;
use std::rc::Rc;
use std::any::Any;
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::render_queue::RenderQueueGroup;
use crate::renderer::mock_renderer::MockRenderer;
use crate::target::{PixelFormat, RenderTargetId, RenderTargetManager, TargetManager, TargetOptions};
use super::post_process::ImageEffectConfig;
use super::render_stage::{queue_names, RenderStage, RenderStageId, StageContext, StageState};

pub struct Fixture {
    pub renderer: MockRenderer,
    pub queues: RenderQueueGroup,
    pub targets: TargetManager,
    pub effects: ImageEffectConfig,
    pub config: PipelineConfig,
}

impl Fixture {
    pub fn new(config: PipelineConfig) -> Self {
        let mut targets = TargetManager::new(config.screen_width, config.screen_height);
        for id in [RenderTargetId::LDR_SCENE_COLOR, RenderTargetId::FINAL_LDR_BUFFER] {
            targets
                .create_render_target(id, 0, 0, PixelFormat::Rgba8Unorm, TargetOptions::screen_with_depth())
                .unwrap();
        }
        targets.take_journal();

        let mut queues = RenderQueueGroup::new();
        for name in queue_names::DEFAULT_QUEUE_ORDER {
            queues.add_render_queue(name);
        }

        Self {
            renderer: MockRenderer::new(),
            queues,
            targets,
            effects: ImageEffectConfig::new(config.image_effects),
            config,
        }
    }

    pub fn ctx(&mut self) -> StageContext<'_> {
        StageContext {
            renderer: &mut self.renderer,
            queues: &mut self.queues,
            targets: &mut self.targets,
            effects: &mut self.effects,
            config: &self.config,
        }
    }
}

/// Stage that records its ID when rendered
pub struct RecordingStage {
    pub id: RenderStageId,
    pub state: StageState,
    pub log: Rc<RefCell<Vec<RenderStageId>>>,
    pub fail: bool,
}

impl RecordingStage {
    pub fn boxed(id: RenderStageId, log: &Rc<RefCell<Vec<RenderStageId>>>) -> Box<dyn RenderStage> {
        Box::new(Self { id, state: StageState::new(true), log: Rc::clone(log), fail: false })
    }

    pub fn failing(id: RenderStageId, log: &Rc<RefCell<Vec<RenderStageId>>>) -> Box<dyn RenderStage> {
        Box::new(Self { id, state: StageState::new(true), log: Rc::clone(log), fail: true })
    }
}

impl RenderStage for RecordingStage {
    fn id(&self) -> RenderStageId {
        self.id
    }

    fn state(&self) -> &StageState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut StageState {
        &mut self.state
    }

    fn render(&mut self, _ctx: &mut StageContext<'_>) -> Result<()> {
        self.log.borrow_mut().push(self.id);
        if self.fail {
            return Err(Error::BackendError(format!("{} failed", self.id.name())));
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Mock Renderer for unit tests (no GPU required)
///
/// Records every queue it executes, every proxy category it is asked to
/// gather and every image effect pass, so tests can assert on ordering.

use std::sync::Arc;
use glam::{Mat4, Vec3};
use crate::error::Result;
use crate::camera::Frustum;
use crate::pipeline::RenderPipeline;
use crate::render_queue::{RenderQueue, RenderQueueGroup, Renderable};
use crate::render_stage::ImageEffect;
use crate::renderer::{ClipSpaceConvention, RenderProxy, RenderType, Renderer};
use crate::target::RenderTargetId;
use crate::engine_bail;

// ============================================================================
// Mock Proxy
// ============================================================================

#[derive(Debug, Clone)]
pub struct MockProxy {
    pub id: u64,
    pub render_type: RenderType,
    pub queue: String,
    pub position: Vec3,
}

impl MockProxy {
    pub fn new(id: u64, render_type: RenderType, queue: &str, position: Vec3) -> Self {
        Self { id, render_type, queue: queue.to_string(), position }
    }
}

impl RenderProxy for MockProxy {
    fn render_type(&self) -> RenderType {
        self.render_type
    }

    fn submit_to_render_queue(&self, pipeline: &mut dyn RenderPipeline) -> Result<()> {
        pipeline.submit(&self.queue, Renderable::new(self.id, Mat4::from_translation(self.position)))
    }
}

// ============================================================================
// Mock Renderer
// ============================================================================

#[derive(Default)]
pub struct MockRenderer {
    pub proxies: Vec<Arc<MockProxy>>,
    /// Names of executed queues, in execution order
    pub executed: Vec<String>,
    /// Renderable count of each executed queue
    pub executed_sizes: Vec<usize>,
    pub gathered: Vec<RenderType>,
    pub effects: Vec<(ImageEffect, RenderTargetId, RenderTargetId)>,
    /// Queue whose execution fails
    pub fail_queue: Option<String>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_proxies(proxies: Vec<MockProxy>) -> Self {
        Self {
            proxies: proxies.into_iter().map(Arc::new).collect(),
            ..Self::default()
        }
    }

    pub fn failing_on(queue: &str) -> Self {
        Self {
            fail_queue: Some(queue.to_string()),
            ..Self::default()
        }
    }

    pub fn reset(&mut self) {
        self.executed.clear();
        self.executed_sizes.clear();
        self.gathered.clear();
        self.effects.clear();
    }
}

impl ClipSpaceConvention for MockRenderer {}

impl Renderer for MockRenderer {
    fn gather_render_proxies(
        &mut self,
        render_type: RenderType,
        frustum: &mut Frustum,
    ) -> Vec<Arc<dyn RenderProxy>> {
        self.gathered.push(render_type);
        self.proxies
            .iter()
            .filter(|p| p.render_type == render_type && frustum.is_point_in(p.position))
            .map(|p| Arc::clone(p) as Arc<dyn RenderProxy>)
            .collect()
    }

    fn draw_render_queue(&mut self, queue: &RenderQueue) -> Result<u32> {
        if self.fail_queue.as_deref() == Some(queue.name()) {
            engine_bail!("staged::MockRenderer", "Queue '{}' rejected", queue.name());
        }
        self.executed.push(queue.name().to_string());
        self.executed_sizes.push(queue.renderables().len());
        Ok(queue.renderables().len() as u32)
    }

    fn draw_image_effect(
        &mut self,
        effect: ImageEffect,
        source: RenderTargetId,
        destination: RenderTargetId,
    ) -> Result<()> {
        self.effects.push((effect, source, destination));
        Ok(())
    }
}

// ============================================================================
// Mock Pipeline
// ============================================================================

/// Pipeline that only collects submissions (no stages)
pub struct MockPipeline {
    pub queues: RenderQueueGroup,
    pub render_calls: u32,
}

impl MockPipeline {
    pub fn with_queues(names: &[&str]) -> Self {
        let mut queues = RenderQueueGroup::new();
        for name in names {
            queues.add_render_queue(name);
        }
        Self { queues, render_calls: 0 }
    }
}

impl RenderPipeline for MockPipeline {
    fn queue_group(&mut self) -> &mut RenderQueueGroup {
        &mut self.queues
    }

    fn render(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        self.render_calls += 1;
        self.queues.render(renderer).map(|_| ())
    }
}

#[cfg(test)]
#[path = "mock_renderer_tests.rs"]
mod tests;

use std::sync::Arc;
use glam::Mat4;
use crate::error::Result;
use crate::renderer::Renderer;
use super::material::Material;

/// One draw submission
#[derive(Debug, Clone, PartialEq)]
pub struct Renderable {
    /// Backend handle of the drawable
    pub id: u64,
    pub world_matrix: Mat4,
}

impl Renderable {
    pub fn new(id: u64, world_matrix: Mat4) -> Self {
        Self { id, world_matrix }
    }
}

/// Named, ordered list of draw submissions sharing at most one material
#[derive(Debug, Clone)]
pub struct RenderQueue {
    name: String,
    material: Option<Arc<Material>>,
    renderables: Vec<Renderable>,
}

impl RenderQueue {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            material: None,
            renderables: Vec::new(),
        }
    }

    pub fn with_material(material: Arc<Material>) -> Self {
        Self {
            name: material.queue_key(),
            material: Some(material),
            renderables: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn material(&self) -> Option<&Arc<Material>> {
        self.material.as_ref()
    }

    pub fn set_material(&mut self, material: Arc<Material>) {
        self.material = Some(material);
    }

    /// Append a submission (submission order is draw order)
    pub fn add_renderable(&mut self, renderable: Renderable) {
        self.renderables.push(renderable);
    }

    pub fn renderables(&self) -> &[Renderable] {
        &self.renderables
    }

    pub fn is_empty(&self) -> bool {
        self.renderables.is_empty()
    }

    /// Submissions the queue can hold without reallocating
    pub fn capacity(&self) -> usize {
        self.renderables.capacity()
    }

    /// Hand the queue to the backend, returning its draw count
    ///
    /// Empty queues are still handed over: backends may draw fixed
    /// content (sky, full-screen passes) from a queue's material alone.
    pub fn render_queue(&self, renderer: &mut dyn Renderer) -> Result<u32> {
        renderer.draw_render_queue(self)
    }

    /// Reset for the next frame, keeping the allocation
    pub fn begin_render(&mut self) {
        self.renderables.clear();
    }

    /// Drop every submission and release the allocation
    pub fn clear_renderables(&mut self) {
        self.renderables = Vec::new();
    }
}

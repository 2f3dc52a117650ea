/// Backend-facing traits of the staged pipeline
///
/// The pipeline never talks to a graphics API directly. A backend
/// implements `Renderer` (visibility gathering, queue execution, image
/// effects) and the `ClipSpaceConvention` hooks that adapt the camera's
/// right-handed, [0, 1] depth matrices to its own clip space.

use std::sync::Arc;
use glam::{Mat4, Vec2, Vec3, Vec4};
use crate::error::Result;
use crate::camera::Frustum;
use crate::pipeline::RenderPipeline;
use crate::render_queue::RenderQueue;
use crate::render_stage::ImageEffect;
use crate::target::RenderTargetId;

/// Category of drawable, one frustum per category per scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderType {
    Scene3d,
    Scene2d,
    Ui,
}

impl RenderType {
    /// Submission order within a scene
    pub const ALL: [RenderType; 3] = [RenderType::Scene3d, RenderType::Scene2d, RenderType::Ui];
}

/// Clip-space adaptation hooks
///
/// The defaults describe a right-handed clip space with depth in [0, 1]
/// (the convention `glam`'s `*_rh` projections produce).
pub trait ClipSpaceConvention {
    fn convert_mat_view(&self, _view: &mut Mat4) {}

    fn convert_mat_proj(&self, _projection: &mut Mat4) {}

    fn convert_mat_ortho(&self, _projection: &mut Mat4) {}

    /// NDC depth of the near and far planes
    fn depth_range(&self) -> Vec2 {
        Vec2::new(0.0, 1.0)
    }

    /// Map an NDC point back to world space
    fn unproject(&self, ndc: Vec3, view_projection: &Mat4) -> Vec3 {
        view_projection.inverse().project_point3(ndc)
    }
}

/// Clip space with depth in [0, 1] (Vulkan, D3D, Metal)
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConvention;

impl ClipSpaceConvention for DefaultConvention {}

/// Clip space with depth in [-1, 1] (OpenGL, GLES)
#[derive(Debug, Clone, Copy, Default)]
pub struct GlConvention;

impl GlConvention {
    fn remap_depth(projection: &mut Mat4) {
        // z' = 2z - w
        let remap = Mat4::from_cols(
            Vec4::X,
            Vec4::Y,
            Vec4::new(0.0, 0.0, 2.0, 0.0),
            Vec4::new(0.0, 0.0, -1.0, 1.0),
        );
        *projection = remap * *projection;
    }
}

impl ClipSpaceConvention for GlConvention {
    fn convert_mat_proj(&self, projection: &mut Mat4) {
        Self::remap_depth(projection);
    }

    fn convert_mat_ortho(&self, projection: &mut Mat4) {
        Self::remap_depth(projection);
    }

    fn depth_range(&self) -> Vec2 {
        Vec2::new(-1.0, 1.0)
    }
}

/// A visible drawable handed out by the backend for one frame
pub trait RenderProxy: Send + Sync {
    fn render_type(&self) -> RenderType;

    /// Append this drawable's work to the pipeline's queues
    fn submit_to_render_queue(&self, pipeline: &mut dyn RenderPipeline) -> Result<()>;
}

/// Graphics backend as seen by the pipeline
pub trait Renderer: ClipSpaceConvention {
    /// Drawables of `render_type` visible in `frustum`
    fn gather_render_proxies(
        &mut self,
        render_type: RenderType,
        frustum: &mut Frustum,
    ) -> Vec<Arc<dyn RenderProxy>>;

    /// Execute one render queue, returning the number of draws issued
    fn draw_render_queue(&mut self, queue: &RenderQueue) -> Result<u32>;

    /// Run one full-screen image effect pass from `source` into the bound target
    fn draw_image_effect(
        &mut self,
        effect: ImageEffect,
        source: RenderTargetId,
        destination: RenderTargetId,
    ) -> Result<()>;
}

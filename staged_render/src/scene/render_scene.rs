/// RenderScene - the per-frame bridge between cameras and render queues.
///
/// A scene holds copies of the driving cameras' frustums. Each frame it is
/// updated first, then rendered: the backend gathers the proxies visible in
/// each frustum (3D, then 2D, then UI), every proxy submits itself to the
/// pipeline, and finally the pipeline runs its stages.

use glam::Mat4;
use crate::camera::{Camera, Frustum};
use crate::error::Result;
use crate::pipeline::RenderPipeline;
use crate::renderer::{RenderType, Renderer};
use crate::{engine_error, engine_trace, engine_warn};

#[derive(Debug, Clone)]
pub struct RenderScene {
    name: String,
    world_matrix: Mat4,
    view: Mat4,
    projection: Mat4,
    frustum_3d: Frustum,
    frustum_2d: Frustum,
    frustum_ui: Frustum,
    /// Set by `update`, consumed by `render`
    updated: bool,
}

impl RenderScene {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            world_matrix: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            frustum_3d: Frustum::new(),
            frustum_2d: Frustum::new(),
            frustum_ui: Frustum::new(),
            updated: false,
        }
    }

    // ===== ACCESSORS =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }

    pub fn set_world_matrix(&mut self, matrix: Mat4) {
        self.world_matrix = matrix;
    }

    pub fn view_matrix(&self) -> &Mat4 {
        &self.view
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection
    }

    pub fn frustum(&self, render_type: RenderType) -> &Frustum {
        match render_type {
            RenderType::Scene3d => &self.frustum_3d,
            RenderType::Scene2d => &self.frustum_2d,
            RenderType::Ui => &self.frustum_ui,
        }
    }

    fn frustum_mut(&mut self, render_type: RenderType) -> &mut Frustum {
        match render_type {
            RenderType::Scene3d => &mut self.frustum_3d,
            RenderType::Scene2d => &mut self.frustum_2d,
            RenderType::Ui => &mut self.frustum_ui,
        }
    }

    /// Whether `update` ran since the last `render`
    pub fn is_updated(&self) -> bool {
        self.updated
    }

    // ===== FRAME =====

    /// Replace the three frustums together
    pub fn update(&mut self, frustum_3d: &Frustum, frustum_2d: &Frustum, frustum_ui: &Frustum) {
        self.frustum_3d = frustum_3d.clone();
        self.frustum_2d = frustum_2d.clone();
        self.frustum_ui = frustum_ui.clone();
        self.updated = true;
    }

    /// Copy the matrices of `camera_3d` and the frustum of each camera
    ///
    /// The cameras must have been updated this frame.
    pub fn update_from_cameras(&mut self, camera_3d: &Camera, camera_2d: &Camera, camera_ui: &Camera) {
        if camera_3d.is_view_stale() || camera_3d.is_projection_stale() {
            engine_warn!("staged::RenderScene", "Scene '{}' updated from a stale camera", self.name);
        }
        self.view = *camera_3d.view_matrix();
        self.projection = *camera_3d.projection_matrix();
        self.update(camera_3d.frustum(), camera_2d.frustum(), camera_ui.frustum());
    }

    /// Gather, submit and render one frame of this scene
    ///
    /// `draw_calls` is increased by the number of proxies submitted. A proxy
    /// that fails to submit is logged and skipped.
    pub fn render(
        &mut self,
        renderer: &mut dyn Renderer,
        pipeline: &mut dyn RenderPipeline,
        draw_calls: &mut u32,
    ) -> Result<()> {
        if !self.updated {
            engine_warn!("staged::RenderScene", "Scene '{}' rendered without update", self.name);
        }

        for render_type in RenderType::ALL {
            let proxies = renderer.gather_render_proxies(render_type, self.frustum_mut(render_type));
            let mut submitted = 0u32;
            for proxy in &proxies {
                match proxy.submit_to_render_queue(pipeline) {
                    Ok(()) => submitted += 1,
                    Err(e) => engine_error!(
                        "staged::RenderScene",
                        "Scene '{}': {:?} proxy submission failed: {}",
                        self.name, render_type, e
                    ),
                }
            }
            engine_trace!(
                "staged::RenderScene",
                "Scene '{}': {} {:?} proxies submitted",
                self.name, submitted, render_type
            );
            *draw_calls += submitted;
        }

        self.updated = false;
        pipeline.render(renderer)
    }
}

#[cfg(test)]
#[path = "render_scene_tests.rs"]
mod tests;

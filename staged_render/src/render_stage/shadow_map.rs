use std::any::Any;
use glam::{Mat4, Vec3};
use crate::camera::Frustum;
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::target::{
    ClearValues, PixelFormat, RenderTargetId, RenderTargetManager, TargetOptions,
};
use crate::engine_trace;
use super::render_stage::{queue_names, RenderStage, RenderStageId, StageContext, StageState};

/// Shadow map stage.
///
/// Renders the ShadowMap queue into a square depth target from a
/// directional light. The light volume is an orthographic frustum that
/// callers use to gather shadow casters.
#[derive(Debug, Clone)]
pub struct ShadowMapRenderStage {
    state: StageState,
    size: u32,
    depth_clear: f32,
    frustum: Frustum,
    light_direction: Vec3,
    light_view_projection: Mat4,
}

impl ShadowMapRenderStage {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            state: StageState::new(config.shadows_enabled()),
            size: config.shadow_map_size,
            depth_clear: config.depth_clear,
            frustum: Frustum::new(),
            light_direction: Vec3::NEG_Y,
            light_view_projection: Mat4::IDENTITY,
        }
    }

    /// Edge length of the shadow map in texels
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn light_direction(&self) -> Vec3 {
        self.light_direction
    }

    pub fn light_view_projection(&self) -> &Mat4 {
        &self.light_view_projection
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    pub fn frustum_mut(&mut self) -> &mut Frustum {
        &mut self.frustum
    }

    /// Aim the light volume
    ///
    /// The volume is a box `extent` wide and `depth` deep, centered on
    /// `focus` and looking along `direction`.
    pub fn set_light(&mut self, direction: Vec3, focus: Vec3, extent: f32, depth: f32) -> Result<()> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return Err(Error::DegenerateGeometry("zero light direction".to_string()));
        }
        let up = if direction.cross(Vec3::Y).length_squared() < 1e-6 { Vec3::Z } else { Vec3::Y };
        let eye = focus - direction * (depth * 0.5);

        self.frustum.set_ortho(extent, extent, 0.0, depth);
        self.frustum.build(eye, direction, up, true)?;

        let half = extent * 0.5;
        let view = Mat4::look_to_rh(eye, direction, up);
        let projection = Mat4::orthographic_rh(-half, half, -half, half, 0.0, depth);
        self.light_view_projection = projection * view;
        self.light_direction = direction;
        Ok(())
    }
}

impl RenderStage for ShadowMapRenderStage {
    fn id(&self) -> RenderStageId {
        RenderStageId::ShadowMap
    }

    fn state(&self) -> &StageState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut StageState {
        &mut self.state
    }

    fn initialize(&mut self, targets: &mut dyn RenderTargetManager, _config: &PipelineConfig) -> Result<()> {
        if self.size == 0 {
            return Err(Error::InitializationFailed("shadow map size is 0".to_string()));
        }
        if targets.render_target(RenderTargetId::SHADOW_MAP).is_none() {
            targets.create_render_target(
                RenderTargetId::SHADOW_MAP,
                self.size,
                self.size,
                PixelFormat::Depth32Float,
                TargetOptions::default(),
            )?;
        }
        self.state.mark_initialized();
        Ok(())
    }

    fn render(&mut self, ctx: &mut StageContext<'_>) -> Result<()> {
        let queue = queue_names::SHADOW_MAP;
        if !self.state.is_active() {
            return ctx.queues.clear_render_queue(queue, queue, true);
        }
        let drawn = ctx.draw_queue_range(
            RenderTargetId::SHADOW_MAP,
            ClearValues::depth(self.depth_clear),
            queue,
            queue,
            true,
        )?;
        engine_trace!("staged::ShadowMapRenderStage", "{} shadow casters", drawn);
        Ok(())
    }

    fn destroy(&mut self, targets: &mut dyn RenderTargetManager) {
        if self.state.is_initialized() {
            targets.destroy_render_target(RenderTargetId::SHADOW_MAP);
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

/// Camera - derives view, projection and view-projection matrices on demand.
///
/// Setters only record parameters and mark the affected matrices stale:
/// position and orientation touch the view matrix, every other parameter
/// touches both. `update()` rebuilds what is stale, recombines the
/// view-projection matrix if anything changed, then re-parameterizes and
/// rebuilds the owned frustum.

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use bytemuck::{Pod, Zeroable};
use crate::error::Result;
use crate::geometry::Ray;
use crate::renderer::ClipSpaceConvention;
use crate::utils::Cached;
use crate::engine_debug;
use super::frustum::Frustum;

/// Projection used by a camera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    /// Perspective with a vertical field of view
    Perspective,
    /// Orthographic, `width * scale` by `height * scale` world units
    Orthographic,
    /// Orthographic in pixel units centered on the camera, scale ignored
    Ui,
}

/// Camera creation parameters
#[derive(Debug, Clone)]
pub struct CameraDesc {
    pub position: Vec3,
    pub orientation: Quat,
    pub mode: ProjectionMode,
    /// Vertical field of view in radians
    pub fov: f32,
    pub width: f32,
    pub height: f32,
    pub near: f32,
    pub far: f32,
    /// Orthographic zoom factor
    pub scale: f32,
}

impl Default for CameraDesc {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            mode: ProjectionMode::Perspective,
            fov: std::f32::consts::FRAC_PI_4,
            width: 800.0,
            height: 600.0,
            near: 0.1,
            far: 1000.0,
            scale: 1.0,
        }
    }
}

/// Camera matrices laid out for a GPU uniform buffer
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view: Mat4,
    pub projection: Mat4,
    pub view_projection: Mat4,
    /// World position (w = 1)
    pub position: Vec4,
}

impl CameraUniform {
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    orientation: Quat,
    forward: Vec3,
    up: Vec3,
    right: Vec3,
    mode: ProjectionMode,
    fov: f32,
    width: f32,
    height: f32,
    near: f32,
    far: f32,
    scale: f32,
    view: Cached<Mat4>,
    projection: Cached<Mat4>,
    view_projection: Mat4,
    frustum: Frustum,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraDesc::default())
    }
}

impl Camera {
    pub fn new(desc: CameraDesc) -> Self {
        let mut camera = Self {
            position: desc.position,
            orientation: Quat::IDENTITY,
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            mode: desc.mode,
            fov: desc.fov,
            width: desc.width,
            height: desc.height,
            near: desc.near,
            far: desc.far,
            scale: desc.scale,
            view: Cached::stale(Mat4::IDENTITY),
            projection: Cached::stale(Mat4::IDENTITY),
            view_projection: Mat4::IDENTITY,
            frustum: Frustum::new(),
        };
        camera.set_orientation(desc.orientation);
        camera
    }

    // ===== VIEW PARAMETERS (view stale) =====

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.view.invalidate();
    }

    /// Set the orientation and re-derive the basis from it
    ///
    /// `forward = q * -Z`, `up = q * +Y`, `right = forward x up`.
    pub fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation.normalize();
        self.forward = self.orientation * Vec3::NEG_Z;
        self.up = self.orientation * Vec3::Y;
        self.right = self.forward.cross(self.up);
        self.view.invalidate();
    }

    /// Orient the camera toward `target`
    ///
    /// Leaves the orientation unchanged when `target` coincides with the
    /// position or the view direction is parallel to `world_up`.
    pub fn look_at(&mut self, target: Vec3, world_up: Vec3) {
        let forward = (target - self.position).normalize_or_zero();
        let right = forward.cross(world_up).normalize_or_zero();
        if forward == Vec3::ZERO || right == Vec3::ZERO {
            engine_debug!("staged::Camera", "look_at ignored: degenerate direction {:?}", forward);
            return;
        }
        let up = right.cross(forward);
        // Columns of the camera-to-world rotation: right, up, -forward
        let rotation = glam::Mat3::from_cols(right, up, -forward);
        self.set_orientation(Quat::from_mat3(&rotation));
    }

    // ===== PROJECTION PARAMETERS (view and projection stale) =====

    fn invalidate_all(&mut self) {
        self.view.invalidate();
        self.projection.invalidate();
    }

    pub fn set_projection_mode(&mut self, mode: ProjectionMode) {
        self.mode = mode;
        self.invalidate_all();
    }

    /// Vertical field of view in radians
    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov;
        self.invalidate_all();
    }

    pub fn set_width(&mut self, width: f32) {
        self.width = width;
        self.invalidate_all();
    }

    pub fn set_height(&mut self, height: f32) {
        self.height = height;
        self.invalidate_all();
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
        self.invalidate_all();
    }

    pub fn set_near(&mut self, near: f32) {
        self.near = near;
        self.invalidate_all();
    }

    pub fn set_far(&mut self, far: f32) {
        self.far = far;
        self.invalidate_all();
    }

    // ===== UPDATE =====

    /// Rebuild stale matrices, then the frustum
    pub fn update<C: ClipSpaceConvention + ?Sized>(&mut self, convention: &C) -> Result<()> {
        self.update_matrix(convention);
        self.update_frustum()
    }

    /// Rebuild the view and projection matrices that are stale
    ///
    /// Both flags are cleared together, after the view-projection matrix
    /// has been recombined.
    pub fn update_matrix<C: ClipSpaceConvention + ?Sized>(&mut self, convention: &C) {
        let view_stale = self.view.is_stale();
        let projection_stale = self.projection.is_stale();

        if view_stale {
            let mut view = self.compute_view();
            convention.convert_mat_view(&mut view);
            self.view.replace(view);
        }

        if projection_stale {
            let mut projection = self.compute_projection();
            match self.mode {
                ProjectionMode::Perspective => convention.convert_mat_proj(&mut projection),
                ProjectionMode::Orthographic | ProjectionMode::Ui => {
                    convention.convert_mat_ortho(&mut projection)
                }
            }
            self.projection.replace(projection);
        }

        if view_stale || projection_stale {
            self.view_projection = *self.projection.peek() * *self.view.peek();
            self.view.validate();
            self.projection.validate();
        }
    }

    /// Re-parameterize the frustum and place it at the camera
    pub fn update_frustum(&mut self) -> Result<()> {
        match self.mode {
            ProjectionMode::Perspective => {
                self.frustum.set_perspective(self.fov, self.width, self.height, self.near, self.far)
            }
            ProjectionMode::Orthographic => self.frustum.set_ortho(
                self.width * self.scale,
                self.height * self.scale,
                self.near,
                self.far,
            ),
            ProjectionMode::Ui => self.frustum.set_ortho(self.width, self.height, self.near, self.far),
        }
        self.frustum.build(self.position, self.forward, self.up, true)
    }

    fn compute_view(&self) -> Mat4 {
        let (r, u, f, p) = (self.right, self.up, self.forward, self.position);
        Mat4::from_cols(
            Vec4::new(r.x, u.x, -f.x, 0.0),
            Vec4::new(r.y, u.y, -f.y, 0.0),
            Vec4::new(r.z, u.z, -f.z, 0.0),
            Vec4::new(-r.dot(p), -u.dot(p), f.dot(p), 1.0),
        )
    }

    fn compute_projection(&self) -> Mat4 {
        match self.mode {
            ProjectionMode::Perspective => {
                let aspect = if self.height > 0.0 { self.width / self.height } else { 1.0 };
                Mat4::perspective_rh(self.fov, aspect, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let half_w = self.width * self.scale * 0.5;
                let half_h = self.height * self.scale * 0.5;
                Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, self.near, self.far)
            }
            ProjectionMode::Ui => {
                let half_w = self.width * 0.5;
                let half_h = self.height * 0.5;
                Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, self.near, self.far)
            }
        }
    }

    // ===== PICKING =====

    /// World ray through a screen position (pixels, origin top-left)
    ///
    /// Unprojects the near and far ends of the backend depth range through
    /// the inverse view-projection matrix.
    pub fn camera_ray<C: ClipSpaceConvention + ?Sized>(&mut self, screen_pos: Vec2, convention: &C) -> Ray {
        self.update_matrix(convention);

        let width = if self.width > 0.0 { self.width } else { 1.0 };
        let height = if self.height > 0.0 { self.height } else { 1.0 };
        let ndc_x = screen_pos.x / width * 2.0 - 1.0;
        let ndc_y = 1.0 - screen_pos.y / height * 2.0;

        let depth = convention.depth_range();
        let near = convention.unproject(Vec3::new(ndc_x, ndc_y, depth.x), &self.view_projection);
        let far = convention.unproject(Vec3::new(ndc_x, ndc_y, depth.y), &self.view_projection);
        Ray::new(near, far - near)
    }

    // ===== GETTERS =====

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn projection_mode(&self) -> ProjectionMode {
        self.mode
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// View matrix as of the last `update()`
    pub fn view_matrix(&self) -> &Mat4 {
        self.view.peek()
    }

    /// Projection matrix as of the last `update()`
    pub fn projection_matrix(&self) -> &Mat4 {
        self.projection.peek()
    }

    /// `projection * view` as of the last `update()`
    pub fn view_projection_matrix(&self) -> &Mat4 {
        &self.view_projection
    }

    pub fn is_view_stale(&self) -> bool {
        self.view.is_stale()
    }

    pub fn is_projection_stale(&self) -> bool {
        self.projection.is_stale()
    }

    /// Number of view matrix rebuilds so far
    pub fn view_rebuild_count(&self) -> u64 {
        self.view.rebuild_count()
    }

    /// Number of projection matrix rebuilds so far
    pub fn projection_rebuild_count(&self) -> u64 {
        self.projection.rebuild_count()
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    pub fn frustum_mut(&mut self) -> &mut Frustum {
        &mut self.frustum
    }

    /// Uniform block for the backend
    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view: *self.view.peek(),
            projection: *self.projection.peek(),
            view_projection: self.view_projection,
            position: self.position.extend(1.0),
        }
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;

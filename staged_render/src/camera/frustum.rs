/// Frustum - viewing volume with lazily derived corners, planes and bounds.
///
/// The volume is parameterized by an eye, an orthonormal basis and the
/// half extents of the near and far rectangles. Derived data is cached:
/// - 8 corner vertices (near rectangle first, then far rectangle)
/// - 6 inward planes (A, B, C, D), inside when `dot(n, p) + D >= 0`
/// - 1 world-space AABB enclosing the corners
///
/// `set_perspective`, `set_ortho` and `build` mark every cache stale;
/// each is recomputed on first access.

use glam::{Vec3, Vec4};
use crate::error::{Error, Result};
use crate::geometry::AABB;
use crate::utils::Cached;
use crate::engine_warn;

/// Result of a 3-way frustum/AABB classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumTest {
    /// AABB is entirely outside the frustum
    Outside,
    /// AABB is entirely inside the frustum
    Inside,
    /// AABB partially overlaps the frustum
    Partial,
}

/// Shape of the viewing volume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumProjection {
    Perspective,
    Orthographic,
}

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

const BASIS_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone)]
pub struct Frustum {
    eye: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    near: f32,
    far: f32,
    /// Half width / half height of the near rectangle
    near_right: f32,
    near_up: f32,
    /// Half width / half height of the far rectangle
    far_right: f32,
    far_up: f32,
    projection: FrustumProjection,
    vertices: Cached<[Vec3; 8]>,
    planes: Cached<[Vec4; 6]>,
    aabb: Cached<AABB>,
}

impl Default for Frustum {
    fn default() -> Self {
        Self::new()
    }
}

impl Frustum {
    /// Unit orthographic volume at the origin looking down -Z
    pub fn new() -> Self {
        Self {
            eye: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
            near: 0.0,
            far: 1.0,
            near_right: 0.5,
            near_up: 0.5,
            far_right: 0.5,
            far_up: 0.5,
            projection: FrustumProjection::Orthographic,
            vertices: Cached::stale([Vec3::ZERO; 8]),
            planes: Cached::stale([Vec4::ZERO; 6]),
            aabb: Cached::stale(AABB::empty()),
        }
    }

    fn invalidate(&mut self) {
        self.vertices.invalidate();
        self.planes.invalidate();
        self.aabb.invalidate();
    }

    // ===== PARAMETERS =====

    /// Perspective volume with a vertical field of view (radians)
    pub fn set_perspective(&mut self, fov_y: f32, width: f32, height: f32, near: f32, far: f32) {
        let up_factor = (fov_y * 0.5).tan();
        let right_factor = if height > 0.0 { up_factor * width / height } else { up_factor };

        self.near = near;
        self.far = far;
        self.near_up = up_factor * near;
        self.near_right = right_factor * near;
        self.far_up = up_factor * far;
        self.far_right = right_factor * far;
        self.projection = FrustumProjection::Perspective;
        self.invalidate();
    }

    /// Box-shaped volume `width` x `height` between `near` and `far`
    pub fn set_ortho(&mut self, width: f32, height: f32, near: f32, far: f32) {
        self.near = near;
        self.far = far;
        self.near_right = width * 0.5;
        self.far_right = width * 0.5;
        self.near_up = height * 0.5;
        self.far_up = height * 0.5;
        self.projection = FrustumProjection::Orthographic;
        self.invalidate();
    }

    /// Place the volume in the world
    ///
    /// `right = cross(up, forward)` and `up` is re-derived from `forward`
    /// and `right`. With `normalize` the inputs are normalized first. A
    /// zero or parallel `forward`/`up` pair is rejected and the previous
    /// basis is kept.
    pub fn build(&mut self, eye: Vec3, forward: Vec3, up: Vec3, normalize: bool) -> Result<()> {
        let forward = if normalize { forward.normalize_or_zero() } else { forward };
        let up = if normalize { up.normalize_or_zero() } else { up };

        let right = up.cross(forward);
        if forward.length_squared() < BASIS_EPSILON || right.length_squared() < BASIS_EPSILON {
            engine_warn!(
                "staged::Frustum",
                "Degenerate frustum basis (forward {:?}, up {:?}), keeping previous basis",
                forward, up
            );
            return Err(Error::DegenerateGeometry(format!(
                "frustum basis from forward {:?} and up {:?}",
                forward, up
            )));
        }
        let right = right.normalize();
        let up = forward.cross(right).normalize();

        self.eye = eye;
        self.forward = forward;
        self.right = right;
        self.up = up;
        self.invalidate();
        Ok(())
    }

    // ===== ACCESSORS =====

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn projection(&self) -> FrustumProjection {
        self.projection
    }

    /// Whether any derived data will be recomputed on next access
    pub fn is_stale(&self) -> bool {
        self.vertices.is_stale() || self.planes.is_stale() || self.aabb.is_stale()
    }

    /// Number of corner recomputations so far
    pub fn vertex_rebuild_count(&self) -> u64 {
        self.vertices.rebuild_count()
    }

    // ===== DERIVED DATA =====

    /// Corner vertices: near left-bottom, right-bottom, right-top,
    /// left-top, then the far rectangle in the same order.
    ///
    /// Left and right follow the `right()` axis, which is `up x forward`
    /// and so points to the viewer's left for a right-handed camera.
    pub fn vertices(&mut self) -> &[Vec3; 8] {
        if self.vertices.is_stale() {
            let corners = self.compute_vertices();
            self.vertices.refresh(corners);
        }
        self.vertices.peek()
    }

    fn compute_vertices(&self) -> [Vec3; 8] {
        let near_center = self.eye + self.forward * self.near;
        let far_center = self.eye + self.forward * self.far;
        let (nr, nu) = (self.right * self.near_right, self.up * self.near_up);
        let (fr, fu) = (self.right * self.far_right, self.up * self.far_up);

        [
            near_center - nr - nu,
            near_center + nr - nu,
            near_center + nr + nu,
            near_center - nr + nu,
            far_center - fr - fu,
            far_center + fr - fu,
            far_center + fr + fu,
            far_center - fr + fu,
        ]
    }

    /// World-space bounds of the corners
    pub fn aabb(&mut self) -> AABB {
        if self.aabb.is_stale() {
            let aabb = AABB::from_points(self.vertices());
            self.aabb.refresh(aabb);
        }
        *self.aabb.peek()
    }

    /// Inward planes, indexed by the `PLANE_*` constants
    pub fn planes(&mut self) -> &[Vec4; 6] {
        if self.planes.is_stale() {
            let v = *self.vertices();
            let planes = self.compute_planes(&v);
            self.planes.refresh(planes);
        }
        self.planes.peek()
    }

    fn compute_planes(&self, v: &[Vec3; 8]) -> [Vec4; 6] {
        let center = v.iter().copied().sum::<Vec3>() / 8.0;

        // Side planes through three corners, flipped to face the center
        let side = |a: Vec3, b: Vec3, c: Vec3| -> Vec4 {
            let normal = (b - a).cross(c - a).normalize_or_zero();
            let normal = if normal.dot(center - a) < 0.0 { -normal } else { normal };
            normal.extend(-normal.dot(a))
        };

        let near_point = self.eye + self.forward * self.near;
        let far_point = self.eye + self.forward * self.far;

        // Plane names follow the viewer, opposite to the `right()` axis
        [
            side(v[1], v[5], v[6]),
            side(v[0], v[4], v[7]),
            side(v[0], v[4], v[5]),
            side(v[3], v[7], v[6]),
            self.forward.extend(-self.forward.dot(near_point)),
            (-self.forward).extend(self.forward.dot(far_point)),
        ]
    }

    // ===== CONTAINMENT =====

    /// Half extents of the cross section at view depth `depth`
    fn extents_at(&self, depth: f32) -> (f32, f32) {
        let span = self.far - self.near;
        let t = if span.abs() > f32::EPSILON { (depth - self.near) / span } else { 0.0 };
        (
            self.near_right + (self.far_right - self.near_right) * t,
            self.near_up + (self.far_up - self.near_up) * t,
        )
    }

    /// Point inside or on the boundary
    pub fn is_point_in(&self, point: Vec3) -> bool {
        let d = point - self.eye;
        let depth = d.dot(self.forward);
        if depth < self.near || depth > self.far {
            return false;
        }
        let (half_w, half_h) = self.extents_at(depth);
        d.dot(self.right).abs() <= half_w && d.dot(self.up).abs() <= half_h
    }

    /// Sphere inside or intersecting (may report false positives near corners)
    pub fn is_sphere_in(&self, center: Vec3, radius: f32) -> bool {
        let d = center - self.eye;
        let depth = d.dot(self.forward);
        if depth < self.near - radius || depth > self.far + radius {
            return false;
        }

        let clamped = depth.clamp(self.near, self.far);
        let (half_w, half_h) = self.extents_at(clamped);

        // Distance to a slanted side plane grows by the secant of its angle
        let (sec_w, sec_h) = match self.projection {
            FrustumProjection::Orthographic => (1.0, 1.0),
            FrustumProjection::Perspective if self.far > f32::EPSILON => {
                let slope_w = self.far_right / self.far;
                let slope_h = self.far_up / self.far;
                ((1.0 + slope_w * slope_w).sqrt(), (1.0 + slope_h * slope_h).sqrt())
            }
            FrustumProjection::Perspective => (1.0, 1.0),
        };

        d.dot(self.right).abs() <= half_w + radius * sec_w
            && d.dot(self.up).abs() <= half_h + radius * sec_h
    }

    /// AABB inside or intersecting (conservative)
    ///
    /// Rejects on the frustum bounds first, then runs the positive-vertex
    /// test against every plane.
    pub fn is_aabb_in(&mut self, aabb: &AABB) -> bool {
        if !self.aabb().intersects(aabb) {
            return false;
        }
        self.classify_aabb(aabb) != FrustumTest::Outside
    }

    /// Classify an AABB against the six planes.
    ///
    /// - p-vertex outside any plane: `Outside`
    /// - n-vertex outside some plane: `Partial`
    /// - otherwise: `Inside`
    pub fn classify_aabb(&mut self, aabb: &AABB) -> FrustumTest {
        let mut all_inside = true;

        for plane in self.planes() {
            let normal = plane.truncate();

            let p_vertex = Vec3::new(
                if normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );
            if normal.dot(p_vertex) + plane.w < 0.0 {
                return FrustumTest::Outside;
            }

            let n_vertex = Vec3::new(
                if normal.x >= 0.0 { aabb.min.x } else { aabb.max.x },
                if normal.y >= 0.0 { aabb.min.y } else { aabb.max.y },
                if normal.z >= 0.0 { aabb.min.z } else { aabb.max.z },
            );
            if normal.dot(n_vertex) + plane.w < 0.0 {
                all_inside = false;
            }
        }

        if all_inside { FrustumTest::Inside } else { FrustumTest::Partial }
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;

//! Camera module - camera, frustum and their GPU-facing uniform block.
//!
//! Cameras are owned and driven by the caller. `Camera::update()` must run
//! before the frame's scenes read its frustum.

mod camera;
mod frustum;

pub use camera::{Camera, CameraDesc, CameraUniform, ProjectionMode};
pub use frustum::{
    Frustum, FrustumProjection, FrustumTest,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};

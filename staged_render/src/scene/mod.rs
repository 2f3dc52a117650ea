//! Scene module - per-frame bridge from camera frustums to queue submission.
//!
//! Scenes are owned by an explicit `RenderSceneRegistry` which renders all
//! of them once per frame and publishes the totals to a `FrameState`.

mod frame_state;
mod render_scene;
mod render_scene_registry;

pub use frame_state::FrameState;
pub use render_scene::RenderScene;
pub use render_scene_registry::{RenderSceneKey, RenderSceneRegistry};

/// Registry owning every live RenderScene.
///
/// Uses a SlotMap for O(1) insert/remove with stable keys.

use slotmap::{new_key_type, SlotMap};
use crate::pipeline::RenderPipeline;
use crate::renderer::Renderer;
use crate::{engine_debug, engine_error};
use super::frame_state::FrameState;
use super::render_scene::RenderScene;

new_key_type! {
    /// Stable key for a RenderScene within the registry.
    pub struct RenderSceneKey;
}

#[derive(Default)]
pub struct RenderSceneRegistry {
    scenes: SlotMap<RenderSceneKey, RenderScene>,
}

impl RenderSceneRegistry {
    pub fn new() -> Self {
        Self { scenes: SlotMap::with_key() }
    }

    pub fn create_scene(&mut self, name: &str) -> RenderSceneKey {
        self.add_scene(RenderScene::new(name))
    }

    pub fn add_scene(&mut self, scene: RenderScene) -> RenderSceneKey {
        engine_debug!("staged::RenderSceneRegistry", "Register scene '{}'", scene.name());
        self.scenes.insert(scene)
    }

    /// Unregister a scene, handing it back to the caller
    pub fn remove_scene(&mut self, key: RenderSceneKey) -> Option<RenderScene> {
        self.scenes.remove(key)
    }

    pub fn scene(&self, key: RenderSceneKey) -> Option<&RenderScene> {
        self.scenes.get(key)
    }

    pub fn scene_mut(&mut self, key: RenderSceneKey) -> Option<&mut RenderScene> {
        self.scenes.get_mut(key)
    }

    /// Key of the first scene named `name`
    pub fn scene_key(&self, name: &str) -> Option<RenderSceneKey> {
        self.scenes.iter().find(|(_, s)| s.name() == name).map(|(key, _)| key)
    }

    pub fn scene_keys(&self) -> impl Iterator<Item = RenderSceneKey> + '_ {
        self.scenes.keys()
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Render every registered scene
    ///
    /// Failures are logged and the remaining scenes still render. The draw
    /// call total and the render target memory are published to
    /// `frame_state`. Returns the draw call total.
    pub fn render_all(
        &mut self,
        renderer: &mut dyn Renderer,
        pipeline: &mut dyn RenderPipeline,
        frame_state: &mut FrameState,
    ) -> u32 {
        let mut draw_calls = 0;
        for scene in self.scenes.values_mut() {
            if let Err(e) = scene.render(renderer, pipeline, &mut draw_calls) {
                engine_error!("staged::RenderSceneRegistry", "Scene '{}' failed: {}", scene.name(), e);
            }
        }

        frame_state.set_draw_calls(draw_calls);
        frame_state.set_render_target_size(pipeline.render_target_memory());
        frame_state.end_frame();
        draw_calls
    }
}

#[cfg(test)]
#[path = "render_scene_registry_tests.rs"]
mod tests;

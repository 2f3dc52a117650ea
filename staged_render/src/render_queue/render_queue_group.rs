/// Ordered registry of render queues.
///
/// Queues live in a `Vec` whose order is the execution order; a name index
/// maps each name to its first occurrence. Names are not required to be
/// unique: `add_render_queue` always appends and lookups return the first
/// match.

use std::ops::Range;
use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::renderer::Renderer;
use crate::{engine_error, engine_trace};
use super::material::Material;
use super::render_queue::RenderQueue;

#[derive(Debug, Default)]
pub struct RenderQueueGroup {
    queues: Vec<RenderQueue>,
    index: FxHashMap<String, usize>,
}

impl RenderQueueGroup {
    pub fn new() -> Self {
        Self::default()
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, queue) in self.queues.iter().enumerate() {
            self.index.entry(queue.name().to_string()).or_insert(i);
        }
    }

    // ===== CREATION =====

    /// Append a queue (no uniqueness check)
    pub fn add_render_queue(&mut self, name: &str) -> &mut RenderQueue {
        let position = self.queues.len();
        self.queues.push(RenderQueue::new(name));
        self.index.entry(name.to_string()).or_insert(position);
        &mut self.queues[position]
    }

    /// Queue for a material, created on first request
    ///
    /// A new queue is placed right after the last queue of its stage (the
    /// stage queue itself or an earlier material queue of the same stage),
    /// so it executes within the stage's range. Without a stage queue it
    /// is appended.
    pub fn add_material_render_queue(
        &mut self,
        template: &str,
        stage: &str,
        macros: &str,
        alpha_test: bool,
    ) -> &mut RenderQueue {
        let key = Material::key(template, stage, macros, alpha_test);
        if let Some(i) = self.index.get(&key).copied() {
            return &mut self.queues[i];
        }

        let prefix = format!("{}@", stage);
        let position = self
            .queues
            .iter()
            .rposition(|q| q.name() == stage || q.name().starts_with(&prefix))
            .map_or(self.queues.len(), |i| i + 1);

        let material = Arc::new(Material::new(template, stage, macros, alpha_test));
        engine_trace!("staged::RenderQueueGroup", "Create material queue '{}' at {}", key, position);
        self.queues.insert(position, RenderQueue::with_material(material));
        self.rebuild_index();
        &mut self.queues[position]
    }

    // ===== LOOKUP =====

    /// First queue named `name`
    pub fn render_queue(&self, name: &str) -> Option<&RenderQueue> {
        self.index.get(name).map(|&i| &self.queues[i])
    }

    pub fn render_queue_mut(&mut self, name: &str) -> Option<&mut RenderQueue> {
        let i = *self.index.get(name)?;
        self.queues.get_mut(i)
    }

    pub fn render_queue_by_index(&self, index: usize) -> Option<&RenderQueue> {
        self.queues.get(index)
    }

    pub fn render_queue_by_index_mut(&mut self, index: usize) -> Option<&mut RenderQueue> {
        self.queues.get_mut(index)
    }

    /// Position of the first queue named `name`
    pub fn render_queue_index(&self, name: &str) -> Option<usize> {
        let index = self.index.get(name).copied();
        if index.is_none() {
            engine_error!("staged::RenderQueueGroup", "RenderQueue '{}' not found", name);
        }
        index
    }

    pub fn render_queue_count(&self) -> usize {
        self.queues.len()
    }

    /// Queue names in execution order
    pub fn render_queue_names(&self) -> Vec<&str> {
        self.queues.iter().map(|q| q.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderQueue> {
        self.queues.iter()
    }

    // ===== RANGES =====

    /// Index range from `start` to `end` (inclusive iff `include_end`)
    ///
    /// An end that precedes the start yields an empty range.
    fn resolve_range(&self, start: &str, end: &str, include_end: bool) -> Result<Range<usize>> {
        let Some(begin) = self.render_queue_index(start) else {
            return Err(Error::InvalidRange(format!("start queue '{}' not found", start)));
        };
        let Some(last) = self.render_queue_index(end) else {
            return Err(Error::InvalidRange(format!("end queue '{}' not found", end)));
        };
        let stop = if include_end { last + 1 } else { last };
        Ok(begin..stop.max(begin))
    }

    /// Render the queues from `start` to `end` in order
    ///
    /// Returns the number of draws issued. Stops at the first backend error.
    pub fn exec_render_queue(
        &self,
        start: &str,
        end: &str,
        include_end: bool,
        renderer: &mut dyn Renderer,
    ) -> Result<u32> {
        let range = self.resolve_range(start, end, include_end)?;
        let mut draws = 0;
        for queue in &self.queues[range] {
            draws += queue.render_queue(renderer)?;
        }
        Ok(draws)
    }

    /// Drop the submissions of the queues from `start` to `end`
    pub fn clear_render_queue(&mut self, start: &str, end: &str, include_end: bool) -> Result<()> {
        let range = self.resolve_range(start, end, include_end)?;
        for queue in &mut self.queues[range] {
            queue.clear_renderables();
        }
        Ok(())
    }

    // ===== FRAME =====

    /// Render every queue in order, then reset every queue
    ///
    /// A failing queue does not stop the others. The first error is
    /// returned after all queues have been reset.
    pub fn render(&mut self, renderer: &mut dyn Renderer) -> Result<u32> {
        let mut draws = 0;
        let mut first_error = None;

        for queue in &self.queues {
            match queue.render_queue(renderer) {
                Ok(count) => draws += count,
                Err(e) => {
                    engine_error!("staged::RenderQueueGroup", "RenderQueue '{}' failed: {}", queue.name(), e);
                    first_error.get_or_insert(e);
                }
            }
        }
        self.begin_render();

        match first_error {
            Some(e) => Err(e),
            None => Ok(draws),
        }
    }

    /// Reset every queue for the next frame
    pub fn begin_render(&mut self) {
        for queue in &mut self.queues {
            queue.begin_render();
        }
    }

    /// Destroy every queue
    pub fn clear(&mut self) {
        self.queues.clear();
        self.index.clear();
    }
}

#[cfg(test)]
#[path = "render_queue_group_tests.rs"]
mod tests;

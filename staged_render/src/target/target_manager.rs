/// Render target management.
///
/// `RenderTargetManager` is the interface the stages use to bind, clear
/// and copy targets. `TargetManager` is the bookkeeping implementation:
/// it tracks every target by ID, the currently bound target and the
/// screen-relative targets, and journals each operation so a backend (or
/// a test) can replay the frame.

use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::utils::SlotAllocator;
use crate::{engine_bail, engine_debug, engine_error, engine_warn};
use super::render_target::{
    ClearValues, PixelFormat, RenderTarget, RenderTargetId, TargetOptions,
};

/// Render target operations, in the order the stages issued them
#[derive(Debug, Clone, PartialEq)]
pub enum TargetOp {
    Create(RenderTargetId),
    Destroy(RenderTargetId),
    Begin { id: RenderTargetId, clear: ClearValues },
    End(RenderTargetId),
    Update { src: RenderTargetId, dst: RenderTargetId },
}

/// Render target interface used by the stages
pub trait RenderTargetManager {
    fn create_render_target(
        &mut self,
        id: RenderTargetId,
        width: u32,
        height: u32,
        format: PixelFormat,
        options: TargetOptions,
    ) -> Result<()>;

    /// Release a target (unknown IDs are logged and ignored)
    fn destroy_render_target(&mut self, id: RenderTargetId);

    /// Bind a target for drawing and clear what `clear` asks for
    fn begin_render_target(&mut self, id: RenderTargetId, clear: ClearValues) -> Result<()>;

    /// Unbind the target bound by `begin_render_target`
    fn end_render_target(&mut self, id: RenderTargetId) -> Result<()>;

    /// Copy `src` into `dst`
    fn update_render_target(&mut self, src: RenderTargetId, dst: RenderTargetId) -> Result<()>;

    fn render_target(&self, id: RenderTargetId) -> Option<&RenderTarget>;

    /// Screen size used for screen-relative targets
    fn screen_size(&self) -> (u32, u32);
}

/// Bookkeeping render target manager
pub struct TargetManager {
    render_targets: FxHashMap<RenderTargetId, RenderTarget>,
    named_ids: FxHashMap<String, RenderTargetId>,
    id_allocator: SlotAllocator,
    bound: Option<RenderTargetId>,
    screen_width: u32,
    screen_height: u32,
    journal: Vec<TargetOp>,
}

impl TargetManager {
    /// Create a manager owning only the default back buffer
    pub fn new(screen_width: u32, screen_height: u32) -> Self {
        let mut manager = Self {
            render_targets: FxHashMap::default(),
            named_ids: FxHashMap::default(),
            id_allocator: SlotAllocator::with_range(
                RenderTargetId::NAMED_BEGIN,
                RenderTargetId::NAMED_END,
            ),
            bound: None,
            screen_width,
            screen_height,
            journal: Vec::new(),
        };
        manager.insert(RenderTarget {
            id: RenderTargetId::DEFAULT_BACK_BUFFER,
            width: screen_width,
            height: screen_height,
            format: PixelFormat::Rgba8Unorm,
            options: TargetOptions::screen_with_depth(),
        });
        manager
    }

    fn insert(&mut self, target: RenderTarget) {
        engine_debug!(
            "staged::TargetManager",
            "Create {} ({}x{}, {:?})",
            target.id, target.width, target.height, target.format
        );
        self.journal.push(TargetOp::Create(target.id));
        self.render_targets.insert(target.id, target);
    }

    fn require(&self, id: RenderTargetId) -> Result<()> {
        if self.render_targets.contains_key(&id) {
            Ok(())
        } else {
            engine_error!("staged::TargetManager", "Could not find {}", id);
            Err(Error::NotFound(format!("render target {}", id)))
        }
    }

    // ===== NAMED IDS =====

    /// ID for a named target, allocated on first request
    pub fn allocate_render_target_id(&mut self, name: &str) -> Result<RenderTargetId> {
        if let Some(id) = self.named_ids.get(name) {
            return Ok(*id);
        }
        let Some(raw) = self.id_allocator.alloc() else {
            engine_bail!("staged::TargetManager", "No free render target id for '{}'", name);
        };
        let id = RenderTargetId(raw);
        self.named_ids.insert(name.to_string(), id);
        Ok(id)
    }

    /// Release a named ID (the target itself must be destroyed separately)
    pub fn release_render_target_id(&mut self, name: &str) -> bool {
        match self.named_ids.remove(name) {
            Some(id) => self.id_allocator.free(id.0),
            None => false,
        }
    }

    /// ID for a named or predefined target
    pub fn render_target_id(&self, name: &str) -> Option<RenderTargetId> {
        self.named_ids
            .get(name)
            .copied()
            .or_else(|| RenderTargetId::from_predefined_name(name))
    }

    // ===== STATE =====

    /// Target currently bound by `begin_render_target`
    pub fn bound_render_target(&self) -> Option<RenderTargetId> {
        self.bound
    }

    pub fn render_target_count(&self) -> usize {
        self.render_targets.len()
    }

    /// GPU memory estimate of every target, in bytes
    pub fn memory_size(&self) -> u64 {
        self.render_targets.values().map(RenderTarget::memory_size).sum()
    }

    pub fn journal(&self) -> &[TargetOp] {
        &self.journal
    }

    /// Drain the journal (typically once per frame)
    pub fn take_journal(&mut self) -> Vec<TargetOp> {
        std::mem::take(&mut self.journal)
    }

    /// Resize the back buffer and every screen-relative target
    pub fn on_screen_size_changed(&mut self, width: u32, height: u32) {
        self.screen_width = width;
        self.screen_height = height;

        for target in self.render_targets.values_mut() {
            if target.options.resolution_relative {
                let scale = target.options.scale_factor;
                target.width = ((width as f32 * scale) as u32).max(1);
                target.height = ((height as f32 * scale) as u32).max(1);
            }
        }
        engine_debug!("staged::TargetManager", "Screen resized to {}x{}", width, height);
    }

    /// Destroy every target except the default back buffer
    pub fn clear(&mut self) {
        let ids: Vec<RenderTargetId> = self
            .render_targets
            .keys()
            .copied()
            .filter(|id| *id != RenderTargetId::DEFAULT_BACK_BUFFER)
            .collect();
        for id in ids {
            self.destroy_render_target(id);
        }
    }
}

impl RenderTargetManager for TargetManager {
    fn create_render_target(
        &mut self,
        id: RenderTargetId,
        width: u32,
        height: u32,
        format: PixelFormat,
        options: TargetOptions,
    ) -> Result<()> {
        if self.render_targets.contains_key(&id) {
            engine_bail!("staged::TargetManager", "{} already exists", id);
        }

        let (width, height) = if options.resolution_relative {
            (
                ((self.screen_width as f32 * options.scale_factor) as u32).max(1),
                ((self.screen_height as f32 * options.scale_factor) as u32).max(1),
            )
        } else {
            (width, height)
        };
        if width == 0 || height == 0 {
            return Err(Error::InvalidResource(format!("{} has a zero size", id)));
        }

        self.insert(RenderTarget { id, width, height, format, options });
        Ok(())
    }

    fn destroy_render_target(&mut self, id: RenderTargetId) {
        if self.render_targets.remove(&id).is_none() {
            engine_error!("staged::TargetManager", "Could not find {}", id);
            return;
        }
        if self.bound == Some(id) {
            self.bound = None;
        }
        self.journal.push(TargetOp::Destroy(id));
    }

    fn begin_render_target(&mut self, id: RenderTargetId, clear: ClearValues) -> Result<()> {
        self.require(id)?;
        if let Some(previous) = self.bound {
            engine_warn!(
                "staged::TargetManager",
                "{} still bound when binding {}, ending it",
                previous, id
            );
            self.journal.push(TargetOp::End(previous));
        }
        self.bound = Some(id);
        self.journal.push(TargetOp::Begin { id, clear });
        Ok(())
    }

    fn end_render_target(&mut self, id: RenderTargetId) -> Result<()> {
        if self.bound != Some(id) {
            engine_error!("staged::TargetManager", "{} is not bound", id);
            return Err(Error::InvalidResource(format!("{} is not bound", id)));
        }
        self.bound = None;
        self.journal.push(TargetOp::End(id));
        Ok(())
    }

    fn update_render_target(&mut self, src: RenderTargetId, dst: RenderTargetId) -> Result<()> {
        if src == RenderTargetId::DEFAULT_BACK_BUFFER {
            engine_error!("staged::TargetManager", "Could not support copy from default back buffer");
            return Err(Error::InvalidResource(
                "copy from the default back buffer".to_string(),
            ));
        }
        self.require(src)?;
        self.require(dst)?;
        self.journal.push(TargetOp::Update { src, dst });
        Ok(())
    }

    fn render_target(&self, id: RenderTargetId) -> Option<&RenderTarget> {
        self.render_targets.get(&id)
    }

    fn screen_size(&self) -> (u32, u32) {
        (self.screen_width, self.screen_height)
    }
}

#[cfg(test)]
#[path = "target_manager_tests.rs"]
mod tests;

/// Render target descriptions.
///
/// A render target is identified by a `RenderTargetId`. The predefined IDs
/// cover every target the built-in stages read or write. Additional IDs
/// for custom image effects are allocated by name from a reserved range
/// (see `TargetManager::allocate_render_target_id`).

use std::fmt;
use bitflags::bitflags;

/// Render target identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderTargetId(pub u32);

impl RenderTargetId {
    pub const DEFAULT_BACK_BUFFER: RenderTargetId = RenderTargetId(0);
    pub const SCENE_COLOR: RenderTargetId = RenderTargetId(1);
    pub const LDR_SCENE_COLOR: RenderTargetId = RenderTargetId(2);
    pub const LDR_VR_SCENE_COLOR: RenderTargetId = RenderTargetId(3);
    pub const COVERAGE: RenderTargetId = RenderTargetId(4);
    pub const SHADOW_MAP: RenderTargetId = RenderTargetId(5);
    pub const SHADOW_MAP_BLUR: RenderTargetId = RenderTargetId(6);
    pub const WATER_REFLECTION: RenderTargetId = RenderTargetId(7);
    pub const WATER_REFRACTION: RenderTargetId = RenderTargetId(8);
    pub const FINAL_LDR_BUFFER: RenderTargetId = RenderTargetId(9);
    pub const HALF_RES_DEPTH: RenderTargetId = RenderTargetId(10);
    pub const GLOW: RenderTargetId = RenderTargetId(11);
    pub const POST_PROCESS: RenderTargetId = RenderTargetId(12);

    /// First / one-past-last ID handed out for named targets
    pub const NAMED_BEGIN: u32 = 64;
    pub const NAMED_END: u32 = 128;

    const PREDEFINED: [(&'static str, RenderTargetId); 13] = [
        ("DefaultBackBuffer", Self::DEFAULT_BACK_BUFFER),
        ("SceneColor", Self::SCENE_COLOR),
        ("LdrSceneColor", Self::LDR_SCENE_COLOR),
        ("LdrVrSceneColor", Self::LDR_VR_SCENE_COLOR),
        ("Coverage", Self::COVERAGE),
        ("ShadowMap", Self::SHADOW_MAP),
        ("ShadowMapBlur", Self::SHADOW_MAP_BLUR),
        ("WaterReflection", Self::WATER_REFLECTION),
        ("WaterRefraction", Self::WATER_REFRACTION),
        ("FinalLdrBuffer", Self::FINAL_LDR_BUFFER),
        ("HalfResDepth", Self::HALF_RES_DEPTH),
        ("Glow", Self::GLOW),
        ("PostProcess", Self::POST_PROCESS),
    ];

    /// Name of a predefined ID
    pub fn predefined_name(self) -> Option<&'static str> {
        Self::PREDEFINED.iter().find(|(_, id)| *id == self).map(|(name, _)| *name)
    }

    /// Predefined ID for a name
    pub fn from_predefined_name(name: &str) -> Option<RenderTargetId> {
        Self::PREDEFINED.iter().find(|(n, _)| *n == name).map(|(_, id)| *id)
    }

    pub fn is_named(self) -> bool {
        (Self::NAMED_BEGIN..Self::NAMED_END).contains(&self.0)
    }
}

impl fmt::Display for RenderTargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.predefined_name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "RenderTarget[{}]", self.0),
        }
    }
}

/// Color buffer format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    R8Unorm,
    Rgba8Unorm,
    Rgba16Float,
    Rgba32Float,
    Depth32Float,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            PixelFormat::R8Unorm => 1,
            PixelFormat::Rgba8Unorm | PixelFormat::Depth32Float => 4,
            PixelFormat::Rgba16Float => 8,
            PixelFormat::Rgba32Float => 16,
        }
    }
}

/// Creation options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetOptions {
    /// Attach a 32-bit depth buffer
    pub depth: bool,
    /// Follow the screen size (times `scale_factor`) on resize
    pub resolution_relative: bool,
    pub scale_factor: f32,
}

impl Default for TargetOptions {
    fn default() -> Self {
        Self { depth: false, resolution_relative: false, scale_factor: 1.0 }
    }
}

impl TargetOptions {
    /// Screen-sized target with a depth buffer
    pub fn screen_with_depth() -> Self {
        Self { depth: true, resolution_relative: true, scale_factor: 1.0 }
    }

    /// Screen-sized color-only target
    pub fn screen() -> Self {
        Self { depth: false, resolution_relative: true, scale_factor: 1.0 }
    }
}

bitflags! {
    /// Buffers cleared when a target is bound
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

/// What to clear on `begin_render_target`, and to which values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearValues {
    pub flags: ClearFlags,
    pub color: [f32; 4],
    pub depth: f32,
    pub stencil: u32,
}

impl ClearValues {
    /// Keep previous contents
    pub fn none() -> Self {
        Self { flags: ClearFlags::empty(), color: [0.0; 4], depth: 1.0, stencil: 0 }
    }

    pub fn color(color: [f32; 4]) -> Self {
        Self { flags: ClearFlags::COLOR, color, ..Self::none() }
    }

    pub fn color_depth(color: [f32; 4], depth: f32) -> Self {
        Self { flags: ClearFlags::COLOR | ClearFlags::DEPTH, color, depth, stencil: 0 }
    }

    pub fn depth(depth: f32) -> Self {
        Self { flags: ClearFlags::DEPTH, depth, ..Self::none() }
    }
}

/// A render target known to the manager
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTarget {
    pub id: RenderTargetId,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub options: TargetOptions,
}

impl RenderTarget {
    /// GPU memory estimate in bytes (color plus optional depth)
    pub fn memory_size(&self) -> u64 {
        let pixels = self.width as u64 * self.height as u64;
        let depth = if self.options.depth { 4 } else { 0 };
        pixels * (self.format.bytes_per_pixel() as u64 + depth)
    }
}

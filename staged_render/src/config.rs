//! Pipeline configuration
//!
//! Plain data consumed when the pipeline, its render targets and its
//! stages are created. Optional GPU features (glow, water reflection) are
//! gated here: a lazy stage only initializes when its feature is supported.

use crate::render_stage::ImageEffectFlags;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Back buffer width in pixels
    pub screen_width: u32,
    /// Back buffer height in pixels
    pub screen_height: u32,
    /// Clear color (RGBA) for scene color targets
    pub clear_color: [f32; 4],
    /// Depth clear value
    pub depth_clear: f32,
    /// Render the scene into the HDR scene color target instead of the LDR one
    pub hdr: bool,
    /// Backend supports the glow effect (lazy Glow stage initialization)
    pub glow_supported: bool,
    /// Backend supports planar water reflection (lazy WaterReflection stage)
    pub water_reflection_supported: bool,
    /// Shadow map edge length in texels (0 disables the shadow map stage)
    pub shadow_map_size: u32,
    /// Image effects active in the post-process chain at startup
    pub image_effects: ImageEffectFlags,
    /// Enable the editor background / foreground stages
    pub editor_mode: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            screen_width: 1280,
            screen_height: 720,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            depth_clear: 1.0,
            hdr: false,
            glow_supported: true,
            water_reflection_supported: true,
            shadow_map_size: 2048,
            image_effects: ImageEffectFlags::BLOOM | ImageEffectFlags::TONE_MAPPING,
            editor_mode: false,
        }
    }
}

impl PipelineConfig {
    /// Configuration with a given back buffer size and defaults elsewhere
    pub fn with_screen_size(width: u32, height: u32) -> Self {
        Self {
            screen_width: width,
            screen_height: height,
            ..Self::default()
        }
    }

    /// Whether the shadow map stage should be built at all
    pub fn shadows_enabled(&self) -> bool {
        self.shadow_map_size > 0
    }
}

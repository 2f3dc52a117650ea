//! Render targets - identifiers, descriptions and the bookkeeping manager
//! the stages bind, clear and copy through.

mod render_target;
mod target_manager;

pub use render_target::{
    ClearFlags, ClearValues, PixelFormat, RenderTarget, RenderTargetId, TargetOptions,
};
pub use target_manager::{RenderTargetManager, TargetManager, TargetOp};

/// Renderer module - backend collaborator traits

pub mod renderer;

#[cfg(test)]
pub mod mock_renderer;

pub use renderer::*;

/// Frame statistics published by the scene registry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameState {
    draw_calls: u32,
    frame_count: u64,
    /// Bytes held by render targets
    render_target_size: u64,
}

impl FrameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_draw_calls(&mut self, count: u32) {
        self.draw_calls = count;
    }

    pub fn draw_calls(&self) -> u32 {
        self.draw_calls
    }

    /// Count a completed frame
    pub fn end_frame(&mut self) {
        self.frame_count += 1;
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn incr_render_target_size(&mut self, bytes: u64) {
        self.render_target_size += bytes;
    }

    /// Saturates at zero
    pub fn decr_render_target_size(&mut self, bytes: u64) {
        self.render_target_size = self.render_target_size.saturating_sub(bytes);
    }

    pub fn set_render_target_size(&mut self, bytes: u64) {
        self.render_target_size = bytes;
    }

    pub fn render_target_size(&self) -> u64 {
        self.render_target_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_state_counters() {
        let mut state = FrameState::new();
        state.set_draw_calls(12);
        state.end_frame();
        state.end_frame();

        assert_eq!(state.draw_calls(), 12);
        assert_eq!(state.frame_count(), 2);
    }

    #[test]
    fn test_render_target_size_accounting() {
        let mut state = FrameState::new();
        state.incr_render_target_size(4096);
        state.incr_render_target_size(1024);
        state.decr_render_target_size(1024);
        assert_eq!(state.render_target_size(), 4096);

        state.decr_render_target_size(10_000);
        assert_eq!(state.render_target_size(), 0);
    }
}

use finder_input::{CursorMode, InputState};

/// Per-frame view of the host window that scenes read and act on.
pub trait FrameContext {
    /// Drawable size in pixels.
    fn window_size(&self) -> (u32, u32);

    /// Seconds since the previous frame.
    fn delta_time(&self) -> f32;

    fn input(&self) -> &InputState;

    fn is_focused(&self) -> bool;

    fn cursor_mode(&self) -> CursorMode;

    fn set_cursor_mode(&mut self, mode: CursorMode);

    /// Ask the host to stop the frame loop after the current frame.
    fn request_exit(&mut self);

    fn exit_requested(&self) -> bool;
}

/// A [`FrameContext`] with no window behind it. Fields are set directly by
/// the driver between frames.
#[derive(Debug, Clone)]
pub struct HeadlessFrame {
    pub size: (u32, u32),
    pub delta_time: f32,
    pub input: InputState,
    pub focused: bool,
    pub cursor: CursorMode,
    exit: bool,
}

impl Default for HeadlessFrame {
    fn default() -> Self {
        Self {
            size: (1280, 720),
            delta_time: 1.0 / 60.0,
            input: InputState::new(),
            focused: true,
            cursor: CursorMode::Normal,
            exit: false,
        }
    }
}

impl HeadlessFrame {
    pub fn new(width: u32, height: u32, delta_time: f32) -> Self {
        Self {
            size: (width, height),
            delta_time,
            ..Self::default()
        }
    }

    /// Reset per-frame input accumulators. Held keys persist.
    pub fn end_frame(&mut self) {
        self.input.end_frame();
    }
}

impl FrameContext for HeadlessFrame {
    fn window_size(&self) -> (u32, u32) {
        self.size
    }

    fn delta_time(&self) -> f32 {
        self.delta_time
    }

    fn input(&self) -> &InputState {
        &self.input
    }

    fn is_focused(&self) -> bool {
        self.focused
    }

    fn cursor_mode(&self) -> CursorMode {
        self.cursor
    }

    fn set_cursor_mode(&mut self, mode: CursorMode) {
        self.cursor = mode;
    }

    fn request_exit(&mut self) {
        self.exit = true;
    }

    fn exit_requested(&self) -> bool {
        self.exit
    }
}

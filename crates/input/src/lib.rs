//! Input snapshot supplied by the frame driver once per frame.
//!
//! # Invariants
//! - Hosts translate device events into [`Key`]s; scenes never see raw events.
//! - Mouse motion accumulates between frames and is reset by `end_frame`.

pub mod action;

pub use action::Action;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Keys the engine reacts to. Anything else maps to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    W,
    A,
    S,
    D,
    Space,
    LeftShift,
    LeftControl,
    Escape,
    Other,
}

/// How the host treats the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorMode {
    #[default]
    Normal,
    Hidden,
    /// Hidden and confined to the window; used for mouse look.
    Grabbed,
}

/// Mouse motion since the previous frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MouseState {
    pub delta: Vec2,
}

/// Keyboard and mouse snapshot for one frame.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys_down: HashSet<Key>,
    mouse: MouseState,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    /// Whether any key bound to `action` is held.
    pub fn is_active(&self, action: Action) -> bool {
        action.keys().iter().any(|k| self.is_key_down(*k))
    }

    pub fn press(&mut self, key: Key) {
        if key != Key::Other {
            self.keys_down.insert(key);
        }
    }

    pub fn release(&mut self, key: Key) {
        self.keys_down.remove(&key);
    }

    /// Release every key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.keys_down.clear();
    }

    pub fn mouse(&self) -> MouseState {
        self.mouse
    }

    pub fn add_mouse_motion(&mut self, dx: f32, dy: f32) {
        self.mouse.delta += Vec2::new(dx, dy);
    }

    /// Reset per-frame accumulators. Held keys persist.
    pub fn end_frame(&mut self) {
        self.mouse = MouseState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release() {
        let mut input = InputState::new();
        input.press(Key::W);
        assert!(input.is_key_down(Key::W));
        input.release(Key::W);
        assert!(!input.is_key_down(Key::W));
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut input = InputState::new();
        input.press(Key::Other);
        assert!(!input.is_key_down(Key::Other));
    }

    #[test]
    fn mouse_motion_accumulates_until_end_of_frame() {
        let mut input = InputState::new();
        input.add_mouse_motion(2.0, -1.0);
        input.add_mouse_motion(1.0, 0.5);
        assert_eq!(input.mouse().delta, Vec2::new(3.0, -0.5));
        input.press(Key::Space);
        input.end_frame();
        assert_eq!(input.mouse().delta, Vec2::ZERO);
        assert!(input.is_key_down(Key::Space));
    }

    #[test]
    fn release_all_clears_keys() {
        let mut input = InputState::new();
        input.press(Key::A);
        input.press(Key::D);
        input.release_all();
        assert!(!input.is_key_down(Key::A));
        assert!(!input.is_key_down(Key::D));
    }

    #[test]
    fn cursor_mode_defaults_to_normal() {
        assert_eq!(CursorMode::default(), CursorMode::Normal);
    }
}

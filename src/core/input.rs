//! Input state tracking

use std::collections::HashSet;
use winit::event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Pixels of touchpad scroll that count as one wheel line
pub const PIXELS_PER_SCROLL_LINE: f64 = 40.0;

/// Tracks keyboard, pointer and scroll input between frames
#[derive(Debug, Default)]
pub struct InputState {
    /// Currently pressed keys
    keys_pressed: HashSet<KeyCode>,
    /// Keys pressed this frame
    keys_just_pressed: HashSet<KeyCode>,
    /// Last cursor position; `None` until the first cursor event latches it
    last_pointer: Option<(f64, f64)>,
    /// Look delta accumulated since the last take (x right, y up)
    look_delta: (f32, f32),
    /// Scroll lines accumulated since the last take
    scroll_delta: f32,
    /// Whether the cursor is grabbed and raw motion drives the look
    pointer_captured: bool,
}

impl InputState {
    /// Create new input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a window event
    pub fn process_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event: KeyEvent {
                    physical_key: PhysicalKey::Code(key_code),
                    state,
                    ..
                },
                ..
            } => match state {
                ElementState::Pressed => self.key_pressed(*key_code),
                ElementState::Released => self.key_released(*key_code),
            },
            WindowEvent::CursorMoved { position, .. } => {
                if !self.pointer_captured {
                    self.pointer_moved(position.x, position.y);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / PIXELS_PER_SCROLL_LINE) as f32,
                };
                self.scrolled(lines);
            }
            WindowEvent::Focused(false) => {
                self.keys_pressed.clear();
            }
            _ => {}
        }
    }

    /// Process device event for raw mouse motion (when cursor is grabbed)
    pub fn process_mouse_motion(&mut self, delta: (f64, f64)) {
        if self.pointer_captured {
            self.look_delta.0 += delta.0 as f32;
            self.look_delta.1 -= delta.1 as f32;
        }
    }

    /// Record an absolute cursor position; the first one only latches
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        if let Some((last_x, last_y)) = self.last_pointer {
            // Window y grows downward, look y grows upward
            self.look_delta.0 += (x - last_x) as f32;
            self.look_delta.1 += (last_y - y) as f32;
        }
        self.last_pointer = Some((x, y));
    }

    /// Accumulate a scroll amount in wheel lines
    pub fn scrolled(&mut self, lines: f32) {
        if lines.is_finite() {
            self.scroll_delta += lines;
        }
    }

    pub fn key_pressed(&mut self, key: KeyCode) {
        if self.keys_pressed.insert(key) {
            self.keys_just_pressed.insert(key);
        }
    }

    pub fn key_released(&mut self, key: KeyCode) {
        self.keys_pressed.remove(&key);
    }

    /// Take the look delta accumulated since the previous call
    pub fn take_look_delta(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.look_delta)
    }

    /// Take the scroll accumulated since the previous call
    pub fn take_scroll(&mut self) -> f32 {
        std::mem::take(&mut self.scroll_delta)
    }

    /// Call at end of frame to reset per-frame state
    pub fn end_frame(&mut self) {
        self.keys_just_pressed.clear();
    }

    /// Check if key is currently pressed
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Check if key was just pressed this frame
    pub fn is_key_just_pressed(&self, key: KeyCode) -> bool {
        self.keys_just_pressed.contains(&key)
    }

    pub fn last_pointer(&self) -> Option<(f64, f64)> {
        self.last_pointer
    }

    /// Switch between cursor-position and raw-motion look
    pub fn set_pointer_captured(&mut self, captured: bool) {
        self.pointer_captured = captured;
        self.last_pointer = None;
        self.look_delta = (0.0, 0.0);
    }

    pub fn is_pointer_captured(&self) -> bool {
        self.pointer_captured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_press() {
        let mut input = InputState::new();
        assert!(!input.is_key_pressed(KeyCode::KeyW));

        input.key_pressed(KeyCode::KeyW);
        assert!(input.is_key_pressed(KeyCode::KeyW));
        assert!(input.is_key_just_pressed(KeyCode::KeyW));

        input.end_frame();
        assert!(input.is_key_pressed(KeyCode::KeyW));
        assert!(!input.is_key_just_pressed(KeyCode::KeyW));

        // Key repeat does not count as a fresh press
        input.key_pressed(KeyCode::KeyW);
        assert!(!input.is_key_just_pressed(KeyCode::KeyW));

        input.key_released(KeyCode::KeyW);
        assert!(!input.is_key_pressed(KeyCode::KeyW));
    }

    #[test]
    fn test_first_pointer_event_only_latches() {
        let mut input = InputState::new();
        input.pointer_moved(400.0, 300.0);
        assert_eq!(input.take_look_delta(), (0.0, 0.0));
        assert_eq!(input.last_pointer(), Some((400.0, 300.0)));

        input.pointer_moved(410.0, 290.0);
        assert_eq!(input.take_look_delta(), (10.0, 10.0));
        assert_eq!(input.take_look_delta(), (0.0, 0.0));
    }

    #[test]
    fn test_pointer_deltas_accumulate() {
        let mut input = InputState::new();
        input.pointer_moved(0.0, 0.0);
        input.pointer_moved(5.0, 5.0);
        input.pointer_moved(3.0, 8.0);
        assert_eq!(input.take_look_delta(), (3.0, -8.0));
    }

    #[test]
    fn test_raw_motion_only_when_captured() {
        let mut input = InputState::new();
        input.process_mouse_motion((4.0, 2.0));
        assert_eq!(input.take_look_delta(), (0.0, 0.0));

        input.set_pointer_captured(true);
        input.process_mouse_motion((4.0, 2.0));
        input.process_mouse_motion((1.0, -1.0));
        assert_eq!(input.take_look_delta(), (5.0, -1.0));
    }

    #[test]
    fn test_capture_resets_latch() {
        let mut input = InputState::new();
        input.pointer_moved(10.0, 10.0);
        input.set_pointer_captured(false);
        assert_eq!(input.last_pointer(), None);
        input.pointer_moved(50.0, 50.0);
        assert_eq!(input.take_look_delta(), (0.0, 0.0));
    }

    #[test]
    fn test_scroll_accumulates() {
        let mut input = InputState::new();
        input.scrolled(1.0);
        input.scrolled(0.5);
        input.scrolled(f32::NAN);
        assert_eq!(input.take_scroll(), 1.5);
        assert_eq!(input.take_scroll(), 0.0);
    }
}

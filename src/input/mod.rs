use std::collections::HashSet;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};
pub use winit::keyboard::KeyCode;

/// Per-frame input snapshot fed to the scene driver.
///
/// Keys and buttons are level-triggered (held), mouse motion and wheel are
/// accumulated deltas that the frame loop clears after each update.
#[derive(Debug)]
pub struct InputState {
    keys_pressed: HashSet<KeyCode>,
    mouse_buttons_pressed: HashSet<MouseButton>,
    mouse_delta: (f32, f32),
    scroll_delta: f32,
    cursor_locked: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            keys_pressed: HashSet::new(),
            mouse_buttons_pressed: HashSet::new(),
            mouse_delta: (0.0, 0.0),
            scroll_delta: 0.0,
            cursor_locked: false,
        }
    }

    pub fn process_key(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.keys_pressed.insert(key);
            }
            ElementState::Released => {
                self.keys_pressed.remove(&key);
            }
        }
    }

    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.mouse_buttons_pressed.insert(button);
            }
            ElementState::Released => {
                self.mouse_buttons_pressed.remove(&button);
            }
        }
    }

    pub fn process_mouse_motion(&mut self, delta: (f64, f64)) {
        self.mouse_delta.0 += delta.0 as f32;
        self.mouse_delta.1 += delta.1 as f32;
    }

    pub fn process_scroll(&mut self, delta: MouseScrollDelta) {
        match delta {
            MouseScrollDelta::LineDelta(_, y) => self.scroll_delta += y,
            // Pixel deltas (touchpads) arrive much larger; normalize to the
            // classic 120-units-per-notch wheel step.
            MouseScrollDelta::PixelDelta(pos) => self.scroll_delta += pos.y as f32 / 120.0,
        }
    }

    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn is_mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons_pressed.contains(&button)
    }

    pub fn get_mouse_delta(&self) -> (f32, f32) {
        self.mouse_delta
    }

    pub fn get_scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    /// Clear accumulated deltas; called once per frame after the update.
    pub fn clear_frame_deltas(&mut self) {
        self.mouse_delta = (0.0, 0.0);
        self.scroll_delta = 0.0;
    }

    pub fn set_cursor_locked(&mut self, locked: bool) {
        self.cursor_locked = locked;
    }

    pub fn is_cursor_locked(&self) -> bool {
        self.cursor_locked
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_press_and_release() {
        let mut input = InputState::new();
        input.process_key(KeyCode::KeyW, ElementState::Pressed);
        assert!(input.is_key_pressed(KeyCode::KeyW));
        input.process_key(KeyCode::KeyW, ElementState::Released);
        assert!(!input.is_key_pressed(KeyCode::KeyW));
    }

    #[test]
    fn deltas_accumulate_until_cleared() {
        let mut input = InputState::new();
        input.process_mouse_motion((3.0, -2.0));
        input.process_mouse_motion((1.0, 1.0));
        input.process_scroll(MouseScrollDelta::LineDelta(0.0, 1.0));
        assert_eq!(input.get_mouse_delta(), (4.0, -1.0));
        assert_eq!(input.get_scroll_delta(), 1.0);
        input.clear_frame_deltas();
        assert_eq!(input.get_mouse_delta(), (0.0, 0.0));
        assert_eq!(input.get_scroll_delta(), 0.0);
    }
}

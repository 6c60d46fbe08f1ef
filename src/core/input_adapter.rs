use std::collections::HashSet;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::controller::{Button, Controller};

/// Pixels of trackpad scroll per wheel notch
const PIXELS_PER_NOTCH: f32 = 50.0;

/// Adapter that bridges Winit events to the Controller trait
#[derive(Debug, Clone)]
pub struct WinitController {
    /// Currently pressed buttons
    pressed_keys: HashSet<Button>,
    /// All pressed buttons as a vec (for efficient get_down_keys)
    pressed_vec: Vec<Button>,
    /// Buttons that went down since the last `take_pressed`
    just_pressed: Vec<Button>,
    /// Current mouse position (relative to window)
    mouse_position: Option<(f32, f32)>,
    /// Cursor movement while the left button is held
    drag_delta: (f32, f32),
    /// Wheel notches since last reset, positive away from the user
    scroll_delta: f32,
}

impl WinitController {
    pub fn new() -> Self {
        Self {
            pressed_keys: HashSet::new(),
            pressed_vec: Vec::new(),
            just_pressed: Vec::new(),
            mouse_position: None,
            drag_delta: (0.0, 0.0),
            scroll_delta: 0.0,
        }
    }

    /// Process a Winit WindowEvent and update internal state
    pub fn process_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    if let Some(button) = Self::keycode_to_button(keycode) {
                        self.set_state(button, event.state, event.repeat);
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if *button == MouseButton::Left {
                    self.set_state(Button::MouseLeft, *state, false);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let new_pos = (position.x as f32, position.y as f32);
                if let Some(old_pos) = self.mouse_position {
                    if self.is_down(Button::MouseLeft) {
                        self.drag_delta.0 += new_pos.0 - old_pos.0;
                        self.drag_delta.1 += new_pos.1 - old_pos.1;
                    }
                }
                self.mouse_position = Some(new_pos);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll_delta += match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_NOTCH,
                };
            }
            WindowEvent::Focused(false) => self.release_all(),
            _ => {}
        }
    }

    fn set_state(&mut self, button: Button, state: ElementState, repeat: bool) {
        match state {
            ElementState::Pressed => {
                if self.pressed_keys.insert(button) {
                    self.pressed_vec.push(button);
                }
                if !repeat {
                    self.just_pressed.push(button);
                }
            }
            ElementState::Released => {
                if self.pressed_keys.remove(&button) {
                    self.pressed_vec.retain(|&b| b != button);
                }
            }
        }
    }

    fn release_all(&mut self) {
        self.pressed_keys.clear();
        self.pressed_vec.clear();
    }

    /// One-shot presses since the previous call, in arrival order
    pub fn take_pressed(&mut self) -> Vec<Button> {
        std::mem::take(&mut self.just_pressed)
    }

    /// Reset per-frame state (drag and scroll)
    pub fn reset_deltas(&mut self) {
        self.drag_delta = (0.0, 0.0);
        self.scroll_delta = 0.0;
    }

    pub fn mouse_position(&self) -> Option<(f32, f32)> {
        self.mouse_position
    }

    pub fn drag_delta(&self) -> (f32, f32) {
        self.drag_delta
    }

    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    /// Map Winit KeyCode to Button
    fn keycode_to_button(keycode: KeyCode) -> Option<Button> {
        match keycode {
            KeyCode::KeyC => Some(Button::ToggleAr),
            KeyCode::Tab => Some(Button::NextObject),
            KeyCode::KeyD => Some(Button::NudgeXPos),
            KeyCode::KeyA => Some(Button::NudgeXNeg),
            KeyCode::KeyW => Some(Button::NudgeYPos),
            KeyCode::KeyS => Some(Button::NudgeYNeg),
            KeyCode::KeyR => Some(Button::NudgeZPos),
            KeyCode::KeyF => Some(Button::NudgeZNeg),
            KeyCode::ArrowLeft | KeyCode::KeyJ => Some(Button::TurnLeft),
            KeyCode::ArrowRight | KeyCode::KeyL => Some(Button::TurnRight),
            KeyCode::ArrowUp | KeyCode::KeyI => Some(Button::TiltUp),
            KeyCode::ArrowDown | KeyCode::KeyK => Some(Button::TiltDown),
            KeyCode::KeyQ => Some(Button::RollLeft),
            KeyCode::KeyE => Some(Button::RollRight),
            KeyCode::Escape => Some(Button::Escape),
            _ => None,
        }
    }
}

impl Default for WinitController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for WinitController {
    fn is_down(&self, button: Button) -> bool {
        self.pressed_keys.contains(&button)
    }

    fn get_down_keys(&self) -> &[Button] {
        &self.pressed_vec
    }
}

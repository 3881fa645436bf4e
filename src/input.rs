//! Held-key input state.

use winit::keyboard::KeyCode;

/// Current press state of the movement keys, plus the exit request.
///
/// Press sets a direction, release clears it; Escape latches the exit
/// flag until the loop observes it.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub exit_requested: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update from a physical key transition.
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        match key {
            KeyCode::Escape => {
                if pressed {
                    self.exit_requested = true;
                }
            }
            KeyCode::KeyW | KeyCode::ArrowUp => self.up = pressed,
            KeyCode::KeyS | KeyCode::ArrowDown => self.down = pressed,
            KeyCode::KeyA | KeyCode::ArrowLeft => self.left = pressed,
            KeyCode::KeyD | KeyCode::ArrowRight => self.right = pressed,
            _ => {}
        }
    }

    pub fn any_movement(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

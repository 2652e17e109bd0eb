// Movement key tracking for the first-person camera
// Abstracts winit keyboard events into six held/released movement flags

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// One of the six movement directions a key can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementKey {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

impl MovementKey {
    pub const ALL: [Self; 6] = [
        Self::Forward,
        Self::Backward,
        Self::Left,
        Self::Right,
        Self::Up,
        Self::Down,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Forward => "fwd",
            Self::Backward => "back",
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    /// Fixed key binding. Unbound keys return `None`.
    pub fn from_key_code(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::KeyW | KeyCode::ArrowUp => Some(Self::Forward),
            KeyCode::KeyS | KeyCode::ArrowDown => Some(Self::Backward),
            KeyCode::KeyA | KeyCode::ArrowLeft => Some(Self::Left),
            KeyCode::KeyD | KeyCode::ArrowRight => Some(Self::Right),
            KeyCode::Space => Some(Self::Up),
            KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(Self::Down),
            _ => None,
        }
    }
}

/// Which movement keys are currently held.
///
/// Written only by key events, read once per frame by the motion integrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl MovementState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag bound to `key`. Key repeat leaves the flag set.
    pub fn on_key_down(&mut self, key: KeyCode) {
        if let Some(movement) = MovementKey::from_key_code(key) {
            *self.flag_mut(movement) = true;
        }
    }

    /// Clear the flag bound to `key`. A release without a press is harmless.
    pub fn on_key_up(&mut self, key: KeyCode) {
        if let Some(movement) = MovementKey::from_key_code(key) {
            *self.flag_mut(movement) = false;
        }
    }

    /// Drop every held key. Used on focus loss, where key-up events go missing.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Feed a winit WindowEvent into the movement state.
    /// Non-keyboard events other than focus loss are ignored.
    pub fn process_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => self.on_key_down(key),
                        ElementState::Released => self.on_key_up(key),
                    }
                }
            }
            WindowEvent::Focused(false) => self.clear(),
            _ => {}
        }
    }

    pub fn is_held(&self, movement: MovementKey) -> bool {
        match movement {
            MovementKey::Forward => self.forward,
            MovementKey::Backward => self.backward,
            MovementKey::Left => self.left,
            MovementKey::Right => self.right,
            MovementKey::Up => self.up,
            MovementKey::Down => self.down,
        }
    }

    pub fn held(&self) -> impl Iterator<Item = MovementKey> + '_ {
        MovementKey::ALL.into_iter().filter(|m| self.is_held(*m))
    }

    pub fn any_held(&self) -> bool {
        *self != Self::default()
    }

    fn flag_mut(&mut self, movement: MovementKey) -> &mut bool {
        match movement {
            MovementKey::Forward => &mut self.forward,
            MovementKey::Backward => &mut self.backward,
            MovementKey::Left => &mut self.left,
            MovementKey::Right => &mut self.right,
            MovementKey::Up => &mut self.up,
            MovementKey::Down => &mut self.down,
        }
    }
}

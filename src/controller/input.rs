/// Platform-agnostic input handling system
use std::collections::HashSet;

use glam::Vec3;
use tracing::warn;

/// Platform-independent input events. Keys are `KeyboardEvent.code` strings
/// ("KeyW", "Space", "ShiftLeft", ...).
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    // Keyboard events
    KeyDown(String),
    KeyUp(String),

    // Mouse events
    MouseMove { dx: f32, dy: f32 },
    MouseButton { button: MouseButton, is_down: bool },
    MouseWheel { delta_y: f32 },

    // Window events
    FocusLost,
    VisibilityChanged { visible: bool },
    PointerLockChanged { locked: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    pub fn from_web_button(button: i16) -> Option<Self> {
        match button {
            0 => Some(MouseButton::Left),
            1 => Some(MouseButton::Middle),
            2 => Some(MouseButton::Right),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Polled input: held state plus edges and deltas accumulated since the last
/// `end_frame`
#[derive(Debug, Default)]
pub struct InputState {
    held_keys: HashSet<String>,
    pressed_keys: HashSet<String>,
    held_buttons: [bool; 3],
    pressed_buttons: [bool; 3],
    look_delta: (f32, f32),
    wheel_delta: f32,

    pointer_locked: bool,
    pointer_lock_cooldown: f32,
    pointer_lock_request: Option<bool>,
    visibility_changed: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent, lock_cooldown: f32) {
        match event {
            InputEvent::KeyDown(key) => {
                if self.held_keys.insert(key.clone()) {
                    self.pressed_keys.insert(key.clone());
                }
            }
            InputEvent::KeyUp(key) => {
                self.held_keys.remove(key.as_str());
            }
            InputEvent::MouseMove { dx, dy } => {
                if self.pointer_locked {
                    self.look_delta.0 += dx;
                    self.look_delta.1 += dy;
                }
            }
            InputEvent::MouseButton { button, is_down } => {
                let i = button.index();
                if *is_down && !self.held_buttons[i] {
                    self.pressed_buttons[i] = true;
                }
                self.held_buttons[i] = *is_down;
            }
            InputEvent::MouseWheel { delta_y } => {
                self.wheel_delta += delta_y;
            }
            InputEvent::FocusLost => {
                self.clear_held();
            }
            InputEvent::VisibilityChanged { .. } => {
                self.clear_held();
                self.visibility_changed = true;
            }
            InputEvent::PointerLockChanged { locked } => {
                // browsers refuse a new lock for a while after one ends
                if self.pointer_locked && !*locked {
                    self.pointer_lock_cooldown = lock_cooldown;
                }
                self.pointer_locked = *locked;
            }
        }
    }

    pub fn is_key_held(&self, key: &str) -> bool {
        self.held_keys.contains(key)
    }

    /// True only in the frame the key went down
    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    pub fn is_button_held(&self, button: MouseButton) -> bool {
        self.held_buttons[button.index()]
    }

    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.pressed_buttons[button.index()]
    }

    pub fn look_delta(&self) -> (f32, f32) {
        self.look_delta
    }

    pub fn wheel_delta(&self) -> f32 {
        self.wheel_delta
    }

    pub fn is_pointer_locked(&self) -> bool {
        self.pointer_locked
    }

    pub fn pointer_lock_cooldown(&self) -> f32 {
        self.pointer_lock_cooldown
    }

    /// Asks the host to change pointer lock. Lock requests during the cooldown
    /// are dropped.
    pub fn request_pointer_lock(&mut self, lock: bool) -> bool {
        if lock && self.pointer_lock_cooldown > 0.0 {
            warn!(
                "pointer lock request dropped, {:.2}s cooldown left",
                self.pointer_lock_cooldown
            );
            return false;
        }
        self.pointer_lock_request = Some(lock);
        true
    }

    /// Pending lock change for the host to apply
    pub fn take_pointer_lock_request(&mut self) -> Option<bool> {
        self.pointer_lock_request.take()
    }

    pub fn take_visibility_change(&mut self) -> bool {
        std::mem::take(&mut self.visibility_changed)
    }

    pub fn clear_held(&mut self) {
        self.held_keys.clear();
        self.held_buttons = [false; 3];
    }

    pub fn tick(&mut self, dt: f32) {
        self.pointer_lock_cooldown = (self.pointer_lock_cooldown - dt).max(0.0);
    }

    /// Clears edges and deltas once a frame has consumed them
    pub fn end_frame(&mut self) {
        self.pressed_keys.clear();
        self.pressed_buttons = [false; 3];
        self.look_delta = (0.0, 0.0);
        self.wheel_delta = 0.0;
    }
}

/// Key mapping configuration
#[derive(Clone, Debug)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
    pub up: String,
    pub down: String,
    pub jump: String,
    pub run: String,
    pub toggle_fly: String,
    pub toggle_pointer_lock: String,
    pub debug: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "KeyW".to_string(),
            backward: "KeyS".to_string(),
            left: "KeyA".to_string(),
            right: "KeyD".to_string(),
            up: "KeyE".to_string(),
            down: "KeyQ".to_string(),
            jump: "Space".to_string(),
            run: "ShiftLeft".to_string(),
            toggle_fly: "KeyO".to_string(),
            toggle_pointer_lock: "KeyP".to_string(),
            debug: "Backquote".to_string(),
        }
    }
}

/// What the held keys ask the player to do this tick
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MovementIntent {
    /// camera-local direction: x right, y up, z backward
    pub direction: Vec3,
    pub run: bool,
    pub jump: bool,
}

/// High-level input processor
#[derive(Clone, Debug, Default)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Vertical movement keys only count while flying
    pub fn movement_intent(&self, input: &InputState, flying: bool) -> MovementIntent {
        let b = &self.bindings;
        let axis = |neg: &str, pos: &str| -> f32 {
            (input.is_key_held(pos) as i32 - input.is_key_held(neg) as i32) as f32
        };

        let mut direction = Vec3::new(axis(&b.left, &b.right), 0.0, axis(&b.forward, &b.backward));
        if flying {
            direction.y = axis(&b.down, &b.up);
        }

        MovementIntent {
            direction,
            run: input.is_key_held(&b.run),
            jump: input.is_key_held(&b.jump),
        }
    }

    pub fn wants_toggle_fly(&self, input: &InputState) -> bool {
        input.is_key_pressed(&self.bindings.toggle_fly)
    }

    pub fn wants_toggle_pointer_lock(&self, input: &InputState) -> bool {
        input.is_key_pressed(&self.bindings.toggle_pointer_lock)
    }

    pub fn wants_debug(&self, input: &InputState) -> bool {
        input.is_key_pressed(&self.bindings.debug)
    }
}

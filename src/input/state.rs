//! Per-frame input snapshot
//!
//! Polls macroquad once per frame and freezes the result: the discrete
//! events since the last frame, the held-key table, the pointer position and
//! the pointer buttons. A snapshot only exists once it has been captured, so
//! there is no "not built yet" state to query by accident.

use std::collections::HashSet;

use macroquad::prelude::*;

/// Application-level event kinds that are not tied to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Window close requested
    Quit,
}

/// A discrete input event that happened during the frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(KeyCode),
    MouseDown(MouseButton),
    Quit,
}

impl InputEvent {
    /// Application event kind, if this event has one
    pub fn kind(&self) -> Option<EventKind> {
        match self {
            InputEvent::Quit => Some(EventKind::Quit),
            _ => None,
        }
    }
}

/// Something a control can be bound to.
///
/// `Key` codes match the held table and key-down events. `Event` codes only
/// match events of the same kind. `Mouse` codes match button-down events and
/// the button table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputCode {
    Key(KeyCode),
    Mouse(MouseButton),
    Event(EventKind),
}

/// Pointer button state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseButtons {
    pub left: bool,
    pub right: bool,
    pub middle: bool,
}

impl MouseButtons {
    pub fn is_down(&self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => self.left,
            MouseButton::Right => self.right,
            MouseButton::Middle => self.middle,
            _ => false,
        }
    }
}

/// Buttons polled into `MouseDown` events
const TRACKED_BUTTONS: [MouseButton; 3] = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];

/// One frame's worth of input
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    events: Vec<InputEvent>,
    held_keys: HashSet<KeyCode>,
    pointer: (i32, i32),
    buttons: MouseButtons,
    /// Frame timestamp in seconds
    pub time: f64,
}

impl InputSnapshot {
    /// Poll the toolkit. Call once per frame, before anything reads input.
    pub fn capture() -> Self {
        let mut events = Vec::new();
        if is_quit_requested() {
            events.push(InputEvent::Quit);
        }
        events.extend(get_keys_pressed().into_iter().map(InputEvent::KeyDown));
        for button in TRACKED_BUTTONS {
            if is_mouse_button_pressed(button) {
                events.push(InputEvent::MouseDown(button));
            }
        }

        let (mx, my) = mouse_position();
        Self {
            events,
            held_keys: get_keys_down(),
            pointer: (mx.floor() as i32, my.floor() as i32),
            buttons: MouseButtons {
                left: is_mouse_button_down(MouseButton::Left),
                right: is_mouse_button_down(MouseButton::Right),
                middle: is_mouse_button_down(MouseButton::Middle),
            },
            time: get_time(),
        }
    }

    /// Build a snapshot from already-polled parts
    #[cfg(test)]
    pub fn from_parts(
        events: Vec<InputEvent>,
        held_keys: &[KeyCode],
        pointer: (i32, i32),
        buttons: MouseButtons,
    ) -> Self {
        Self {
            events,
            held_keys: held_keys.iter().copied().collect(),
            pointer,
            buttons,
            time: 0.0,
        }
    }

    /// A frame with no input at all
    #[cfg(test)]
    pub fn empty() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    /// Pointer position in window pixels
    pub fn pointer(&self) -> (i32, i32) {
        self.pointer
    }

    /// True while the code's key or button is down
    pub fn is_key_held(&self, code: InputCode) -> bool {
        match code {
            InputCode::Key(key) => self.held_keys.contains(&key),
            InputCode::Mouse(button) => self.buttons.is_down(button),
            InputCode::Event(_) => false,
        }
    }

    /// True if one of this frame's events matches the code.
    ///
    /// An event matches when its kind equals the code directly, or when it
    /// is a key/button-down carrying the code's key/button.
    pub fn is_key_pressed(&self, code: InputCode) -> bool {
        self.events.iter().any(|event| match (code, *event) {
            (InputCode::Event(kind), event) => event.kind() == Some(kind),
            (InputCode::Key(key), InputEvent::KeyDown(pressed)) => key == pressed,
            (InputCode::Mouse(button), InputEvent::MouseDown(pressed)) => button == pressed,
            _ => false,
        })
    }
}

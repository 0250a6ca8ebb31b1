//! Default control schemes for the editor and the application shell

use macroquad::prelude::{KeyCode, MouseButton};

use super::{ControlScheme, EventKind, InputCode};

pub mod action {
    pub const QUIT: &str = "quit";
    pub const SAVE: &str = "save";
    pub const LOAD: &str = "load";
    pub const PLACE: &str = "place";
    pub const REMOVE: &str = "remove";
}

/// Palette slot keys, in slot order
const PALETTE_KEYS: [KeyCode; 9] = [
    KeyCode::Key1,
    KeyCode::Key2,
    KeyCode::Key3,
    KeyCode::Key4,
    KeyCode::Key5,
    KeyCode::Key6,
    KeyCode::Key7,
    KeyCode::Key8,
    KeyCode::Key9,
];

/// Action name selecting palette slot `index` (0-based)
pub fn select_action(index: usize) -> String {
    format!("select_{}", index + 1)
}

/// Palette slot for a `select_N` action name
pub fn parse_select_action(name: &str) -> Option<usize> {
    let slot: usize = name.strip_prefix("select_")?.parse().ok()?;
    (1..=PALETTE_KEYS.len()).contains(&slot).then(|| slot - 1)
}

/// Window close or Escape leaves the application
pub fn exit_scheme() -> ControlScheme {
    ControlScheme::new().single(
        action::QUIT,
        [InputCode::Event(EventKind::Quit), InputCode::Key(KeyCode::Escape)],
    )
}

/// Save/load, placement and palette selection
pub fn editor_scheme() -> ControlScheme {
    let mut scheme = ControlScheme::new()
        .single(action::SAVE, [InputCode::Key(KeyCode::S)])
        .single(action::LOAD, [InputCode::Key(KeyCode::L)])
        .held(action::PLACE, [InputCode::Mouse(MouseButton::Left)])
        .held(action::REMOVE, [InputCode::Mouse(MouseButton::Right)]);

    for (index, key) in PALETTE_KEYS.into_iter().enumerate() {
        scheme = scheme.single(&select_action(index), [InputCode::Key(key)]);
    }
    scheme
}

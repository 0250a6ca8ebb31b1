//! Named control schemes
//!
//! A scheme maps action names to the input codes that trigger them, split by
//! trigger kind. It holds no per-frame state: the active actions are a pure
//! function of the snapshot handed in and the static mapping.
//!
//! # Example
//! ```ignore
//! let scheme = ControlScheme::new()
//!     .single("save", [InputCode::Key(KeyCode::S)])
//!     .held("right", [InputCode::Key(KeyCode::D), InputCode::Key(KeyCode::Right)]);
//!
//! if scheme.is_active(&input, "save") {
//!     editor.save();
//! }
//! ```

use super::{InputCode, InputSnapshot};

/// How a control fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    /// Fires on the frame one of its codes is pressed
    Single,
    /// Fires every frame one of its codes is held
    Held,
}

/// One named action and the codes bound to it
#[derive(Debug, Clone)]
struct Binding {
    name: String,
    codes: Vec<InputCode>,
}

/// Action name -> input codes, per trigger kind, in registration order
#[derive(Debug, Clone, Default)]
pub struct ControlScheme {
    single: Vec<Binding>,
    held: Vec<Binding>,
}

impl ControlScheme {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a single-press action
    pub fn single(mut self, name: &str, codes: impl IntoIterator<Item = InputCode>) -> Self {
        self.bind(TriggerKind::Single, name, codes);
        self
    }

    /// Bind a held action
    pub fn held(mut self, name: &str, codes: impl IntoIterator<Item = InputCode>) -> Self {
        self.bind(TriggerKind::Held, name, codes);
        self
    }

    /// Add codes to an action. Binding an existing name again under the same
    /// kind extends its code list.
    pub fn bind(&mut self, kind: TriggerKind, name: &str, codes: impl IntoIterator<Item = InputCode>) {
        let bindings = match kind {
            TriggerKind::Single => &mut self.single,
            TriggerKind::Held => &mut self.held,
        };
        match bindings.iter_mut().find(|b| b.name == name) {
            Some(existing) => existing.codes.extend(codes),
            None => bindings.push(Binding {
                name: name.to_string(),
                codes: codes.into_iter().collect(),
            }),
        }
    }

    /// Actions that fired this frame: single actions first, then held ones,
    /// each in registration order. A name bound under both kinds can appear
    /// twice.
    pub fn active_actions<'a>(&'a self, input: &InputSnapshot) -> Vec<&'a str> {
        let single = self
            .single
            .iter()
            .filter(|b| b.codes.iter().any(|&code| input.is_key_pressed(code)));
        let held = self
            .held
            .iter()
            .filter(|b| b.codes.iter().any(|&code| input.is_key_held(code)));
        single.chain(held).map(|b| b.name.as_str()).collect()
    }

    /// True if the named action fired this frame under either kind
    pub fn is_active(&self, input: &InputSnapshot, name: &str) -> bool {
        self.active_actions(input).contains(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{EventKind, InputEvent, MouseButtons};
    use macroquad::prelude::KeyCode;

    fn frame(events: Vec<InputEvent>, held: Vec<KeyCode>) -> InputSnapshot {
        InputSnapshot::from_parts(events, &held, (0, 0), MouseButtons::default())
    }

    fn movement_scheme() -> ControlScheme {
        ControlScheme::new()
            .single("jump", [InputCode::Key(KeyCode::Space), InputCode::Key(KeyCode::W)])
            .single("quit", [InputCode::Event(EventKind::Quit), InputCode::Key(KeyCode::Escape)])
            .held("right", [InputCode::Key(KeyCode::D), InputCode::Key(KeyCode::Right)])
            .held("left", [InputCode::Key(KeyCode::A), InputCode::Key(KeyCode::Left)])
    }

    #[test]
    fn test_no_input_no_actions() {
        let scheme = movement_scheme();
        assert!(scheme.active_actions(&InputSnapshot::empty()).is_empty());
    }

    #[test]
    fn test_single_fires_on_press_only() {
        let scheme = movement_scheme();
        let pressed = frame(vec![InputEvent::KeyDown(KeyCode::Space)], vec![KeyCode::Space]);
        assert_eq!(scheme.active_actions(&pressed), vec!["jump"]);

        let still_down = frame(vec![], vec![KeyCode::Space]);
        assert!(scheme.active_actions(&still_down).is_empty());
    }

    #[test]
    fn test_held_fires_every_frame() {
        let scheme = movement_scheme();
        for _ in 0..3 {
            let input = frame(vec![], vec![KeyCode::Right]);
            assert_eq!(scheme.active_actions(&input), vec!["right"]);
        }
    }

    #[test]
    fn test_order_single_then_held() {
        let scheme = movement_scheme();
        let input = frame(
            vec![InputEvent::KeyDown(KeyCode::W), InputEvent::Quit],
            vec![KeyCode::A, KeyCode::D, KeyCode::W],
        );
        assert_eq!(scheme.active_actions(&input), vec!["jump", "quit", "right", "left"]);
    }

    #[test]
    fn test_name_reported_once_per_kind() {
        let scheme = movement_scheme();
        let input = frame(vec![], vec![KeyCode::D, KeyCode::Right]);
        assert_eq!(scheme.active_actions(&input), vec!["right"]);
    }

    #[test]
    fn test_same_name_in_both_kinds_appears_twice() {
        let scheme = ControlScheme::new()
            .single("place", [InputCode::Key(KeyCode::P)])
            .held("place", [InputCode::Key(KeyCode::P)]);
        let input = frame(vec![InputEvent::KeyDown(KeyCode::P)], vec![KeyCode::P]);
        assert_eq!(scheme.active_actions(&input), vec!["place", "place"]);
    }

    #[test]
    fn test_rebinding_merges_codes() {
        let scheme = ControlScheme::new()
            .single("save", [InputCode::Key(KeyCode::S)])
            .single("save", [InputCode::Key(KeyCode::F2)]);

        // Either key fires the one action, and it's reported once
        let input = frame(vec![InputEvent::KeyDown(KeyCode::F2)], vec![]);
        assert_eq!(scheme.active_actions(&input), vec!["save"]);
        let input = frame(vec![InputEvent::KeyDown(KeyCode::S), InputEvent::KeyDown(KeyCode::F2)], vec![]);
        assert_eq!(scheme.active_actions(&input), vec!["save"]);
    }

    #[test]
    fn test_quit_event_and_escape() {
        let scheme = movement_scheme();
        assert!(scheme.is_active(&frame(vec![InputEvent::Quit], vec![]), "quit"));
        assert!(scheme.is_active(&frame(vec![InputEvent::KeyDown(KeyCode::Escape)], vec![]), "quit"));
        assert!(!scheme.is_active(&frame(vec![], vec![KeyCode::Escape]), "quit"));
    }
}

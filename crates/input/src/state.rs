use parkview_common::MoveDirection;
use std::collections::BTreeSet;

use crate::action::Action;

/// Keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    W,
    A,
    S,
    D,
    Escape,
}

impl Key {
    pub fn direction(self) -> Option<MoveDirection> {
        match self {
            Key::W => Some(MoveDirection::Forward),
            Key::S => Some(MoveDirection::Backward),
            Key::A => Some(MoveDirection::Left),
            Key::D => Some(MoveDirection::Right),
            Key::Escape => None,
        }
    }
}

/// Held-key state, polled once per frame.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: BTreeSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key transition. Pressing Escape yields [`Action::Exit`].
    pub fn handle_key(&mut self, key: Key, pressed: bool) -> Option<Action> {
        if pressed {
            self.held.insert(key);
        } else {
            self.held.remove(&key);
        }
        (pressed && key == Key::Escape).then_some(Action::Exit)
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Movement actions for every held direction key, in a fixed order.
    pub fn movement_actions(&self) -> Vec<Action> {
        MoveDirection::ALL
            .into_iter()
            .filter(|dir| self.held.iter().any(|k| k.direction() == Some(*dir)))
            .map(Action::Move)
            .collect()
    }

    /// Map a scroll delta to a zoom action.
    pub fn scroll(&self, dy: f32) -> Option<Action> {
        (dy.is_finite() && dy != 0.0).then_some(Action::Zoom(dy))
    }

    /// Drop all held keys, e.g. on focus loss.
    pub fn clear(&mut self) {
        self.held.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_keys_become_moves_in_fixed_order() {
        let mut input = InputState::new();
        input.handle_key(Key::D, true);
        input.handle_key(Key::W, true);
        assert_eq!(
            input.movement_actions(),
            vec![
                Action::Move(MoveDirection::Forward),
                Action::Move(MoveDirection::Right)
            ]
        );

        input.handle_key(Key::W, false);
        assert_eq!(
            input.movement_actions(),
            vec![Action::Move(MoveDirection::Right)]
        );
    }

    #[test]
    fn escape_requests_exit() {
        let mut input = InputState::new();
        assert_eq!(input.handle_key(Key::Escape, true), Some(Action::Exit));
        assert_eq!(input.handle_key(Key::Escape, false), None);
        assert_eq!(input.handle_key(Key::W, true), None);
        assert!(input.movement_actions().len() == 1);
    }

    #[test]
    fn scroll_filters_noise() {
        let input = InputState::new();
        assert_eq!(input.scroll(-5.0), Some(Action::Zoom(-5.0)));
        assert_eq!(input.scroll(0.0), None);
        assert_eq!(input.scroll(f32::NAN), None);
    }

    #[test]
    fn clear_releases_everything() {
        let mut input = InputState::new();
        input.handle_key(Key::A, true);
        input.handle_key(Key::S, true);
        input.clear();
        assert!(input.movement_actions().is_empty());
        assert!(!input.is_held(Key::A));
    }
}

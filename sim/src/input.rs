//! Logical input state.
//!
//! Hosts translate their raw key events into `press`/`release` calls.
//! Movement is read level-triggered; fire, pause and restart are
//! edge-triggered through `take_press`, which yields once per press even if
//! the key was already released again before the next step.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Logical keys the simulation understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Fire,
    Pause,
    Restart,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct InputState {
    pressed: HashSet<Key>,
    /// Presses not yet acted on. Survives the matching release.
    pending: HashSet<Key>,
}

impl InputState {
    /// Key down. Repeats while already held do not latch a new press.
    pub fn press(&mut self, key: Key) {
        if self.pressed.insert(key) {
            self.pending.insert(key);
        }
    }

    pub fn release(&mut self, key: Key) {
        self.pressed.remove(&key);
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    /// Edge trigger: `true` once per press, then `false` until the key is
    /// released and pressed again.
    pub fn take_press(&mut self, key: Key) -> bool {
        self.pending.remove(&key)
    }

    /// Horizontal intent: -1 left, +1 right, 0 idle. Left wins ties.
    pub fn horizontal(&self) -> f32 {
        if self.is_down(Key::Left) {
            -1.0
        } else if self.is_down(Key::Right) {
            1.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_trigger_once_per_press() {
        let mut input = InputState::default();
        assert!(!input.take_press(Key::Fire));
        input.press(Key::Fire);
        assert!(input.take_press(Key::Fire));
        assert!(!input.take_press(Key::Fire), "held key must not repeat");
        input.release(Key::Fire);
        input.press(Key::Fire);
        assert!(input.take_press(Key::Fire));
    }

    #[test]
    fn test_horizontal_left_wins() {
        let mut input = InputState::default();
        assert_eq!(input.horizontal(), 0.0);
        input.press(Key::Right);
        assert_eq!(input.horizontal(), 1.0);
        input.press(Key::Left);
        assert_eq!(input.horizontal(), -1.0);
        input.release(Key::Left);
        assert_eq!(input.horizontal(), 1.0);
    }

    #[test]
    fn test_tap_between_steps_is_kept() {
        let mut input = InputState::default();
        input.press(Key::Pause);
        input.release(Key::Pause);
        assert!(!input.is_down(Key::Pause));
        assert!(input.take_press(Key::Pause), "released tap still counts once");
        assert!(!input.take_press(Key::Pause));
    }

    #[test]
    fn test_key_repeat_does_not_latch() {
        let mut input = InputState::default();
        input.press(Key::Fire);
        assert!(input.take_press(Key::Fire));
        input.press(Key::Fire);
        assert!(!input.take_press(Key::Fire), "auto-repeat while held");
    }
}

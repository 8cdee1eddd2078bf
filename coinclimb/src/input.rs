use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use winit::{
    event::{ElementState, KeyEvent},
    keyboard::{KeyCode, PhysicalKey},
};

/// A key transition reported to application callbacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyTransition {
    Pressed(KeyCode),
    Released(KeyCode),
}

/// Tracks keyboard state across frames.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame pressed/released flags.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    /// Handle a keyboard input event from winit.
    ///
    /// Returns the transition to dispatch, or `None` for OS auto-repeat and
    /// keys without a physical code.
    pub fn handle_key(&mut self, event: &KeyEvent) -> Option<KeyTransition> {
        let PhysicalKey::Code(keycode) = event.physical_key else {
            return None;
        };
        match event.state {
            ElementState::Pressed if event.repeat => None,
            ElementState::Pressed => self.press(keycode),
            ElementState::Released => self.release(keycode),
        }
    }

    /// Record a key going down. Returns `None` if it was already held.
    pub fn press(&mut self, key: KeyCode) -> Option<KeyTransition> {
        if self.keys_down.insert(key) {
            self.keys_pressed.insert(key);
            Some(KeyTransition::Pressed(key))
        } else {
            None
        }
    }

    /// Record a key going up. Returns `None` if it was not held.
    pub fn release(&mut self, key: KeyCode) -> Option<KeyTransition> {
        if self.keys_down.remove(&key) {
            self.keys_released.insert(key);
            Some(KeyTransition::Released(key))
        } else {
            None
        }
    }

    /// Returns true if the key is currently held down.
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key was pressed this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Returns true if the key was released this frame.
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }
}

/// Maps physical keys to game actions.
///
/// Several keys may drive the same action (arrow keys and WASD, say); each key
/// drives at most one action.
#[derive(Clone, Debug)]
pub struct KeyBindings<A> {
    bindings: HashMap<KeyCode, A>,
}

impl<A: Copy + Eq + Hash> KeyBindings<A> {
    /// Create an empty binding table.
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Bind `key` to `action`, replacing any previous binding for that key.
    pub fn bind(&mut self, key: KeyCode, action: A) -> &mut Self {
        self.bindings.insert(key, action);
        self
    }

    /// Action bound to `key`, if any.
    pub fn action_for(&self, key: KeyCode) -> Option<A> {
        self.bindings.get(&key).copied()
    }

    /// Check if any key bound to `action` is currently held.
    pub fn action_down(&self, input: &InputState, action: A) -> bool {
        self.bindings
            .iter()
            .any(|(key, bound)| *bound == action && input.is_key_down(*key))
    }
}

impl<A: Copy + Eq + Hash> Default for KeyBindings<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum Action {
        Jump,
        Left,
    }

    #[test]
    fn press_and_release_report_transitions_once() {
        let mut input = InputState::new();
        assert_eq!(
            input.press(KeyCode::ArrowUp),
            Some(KeyTransition::Pressed(KeyCode::ArrowUp))
        );
        assert_eq!(input.press(KeyCode::ArrowUp), None);
        assert!(input.is_key_down(KeyCode::ArrowUp));
        assert!(input.is_key_pressed(KeyCode::ArrowUp));

        input.begin_frame();
        assert!(!input.is_key_pressed(KeyCode::ArrowUp));

        assert_eq!(
            input.release(KeyCode::ArrowUp),
            Some(KeyTransition::Released(KeyCode::ArrowUp))
        );
        assert_eq!(input.release(KeyCode::ArrowUp), None);
        assert!(input.is_key_released(KeyCode::ArrowUp));
        assert!(!input.is_key_down(KeyCode::ArrowUp));
    }

    #[test]
    fn bindings_resolve_aliases() {
        let mut bindings = KeyBindings::new();
        bindings
            .bind(KeyCode::ArrowUp, Action::Jump)
            .bind(KeyCode::KeyW, Action::Jump)
            .bind(KeyCode::KeyA, Action::Left);

        assert_eq!(bindings.action_for(KeyCode::KeyW), Some(Action::Jump));
        assert_eq!(bindings.action_for(KeyCode::KeyQ), None);

        let mut input = InputState::new();
        input.press(KeyCode::KeyW);
        assert!(bindings.action_down(&input, Action::Jump));
        assert!(!bindings.action_down(&input, Action::Left));
    }
}

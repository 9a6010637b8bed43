//! # Input Manager
//!
//! This module turns winit keyboard events into per-tick [`ProcessedInputState`] snapshots.

use std::collections::{HashMap, HashSet};

use winit::{
    event::{ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::input_state::{ProcessedInputState, RawInputState};

/// Keys the scenes react to.
pub const KEY_CODES: [KeyCode; 8] = [
    KeyCode::KeyW,
    KeyCode::KeyS,
    KeyCode::KeyA,
    KeyCode::KeyD,
    KeyCode::KeyC,
    KeyCode::KeyQ,
    KeyCode::Escape,
    KeyCode::Enter,
];

/// Manages the state of the keyboard and processes input events.
///
/// Keys are sampled once per tick: events arriving between two ticks only update the
/// "new" state, and [`InputManager::get_and_reset_processed_input`] compares it against
/// the state seen by the previous tick. A key pressed and released again before the next
/// tick still reads as [`RawInputState::Pressed`] on that tick.
pub struct InputManager {
    /// State of all tracked keys as of the previous tick
    pub keyboard_inputs_old: HashMap<KeyCode, bool>,
    /// Current state of all tracked keys
    pub keyboard_inputs_new: HashMap<KeyCode, bool>,
    /// Keys pressed since the previous tick
    keyboard_presses: HashSet<KeyCode>,
}

impl InputManager {
    /// Creates a new InputManager with every tracked key released.
    pub fn new() -> Self {
        let keyboard_inputs_old: HashMap<KeyCode, bool> =
            KEY_CODES.iter().map(|&key| (key, false)).collect();
        let keyboard_inputs_new = keyboard_inputs_old.clone();

        Self {
            keyboard_inputs_old,
            keyboard_inputs_new,
            keyboard_presses: HashSet::new(),
        }
    }

    /// Processes a window event and updates internal input state.
    ///
    /// # Arguments
    /// * `event` - The window event to process
    pub fn intake_input(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state,
                        physical_key: PhysicalKey::Code(key),
                        ..
                    },
                ..
            } => self.set_key(*key, *state == ElementState::Pressed),
            WindowEvent::Focused(false) => self.release_all(),
            _ => {}
        }
    }

    /// Records `key` as down or up. Untracked keys are ignored.
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        if let Some(key_state) = self.keyboard_inputs_new.get_mut(&key) {
            *key_state = pressed;
            if pressed {
                self.keyboard_presses.insert(key);
            }
        }
    }

    /// Marks every key as released, so nothing stays stuck after the window loses focus.
    pub fn release_all(&mut self) {
        for state in self.keyboard_inputs_new.values_mut() {
            *state = false;
        }
        self.keyboard_presses.clear();
    }

    /// Translates the raw boolean states into [`RawInputState`] transitions.
    pub fn create_processed_input_state(&self) -> ProcessedInputState {
        let keyboard_states = self
            .keyboard_inputs_new
            .iter()
            .map(|(key, &new_state)| {
                let old_state = self.keyboard_inputs_old.get(key).copied().unwrap_or(false);
                let state = match RawInputState::from_raw_states(old_state, new_state) {
                    RawInputState::NotPressed if self.keyboard_presses.contains(key) => {
                        RawInputState::Pressed
                    }
                    state => state,
                };
                (*key, state)
            })
            .collect();

        ProcessedInputState { keyboard_states }
    }

    /// Returns the processed input state and moves the current state into the old one.
    pub fn get_and_reset_processed_input(&mut self) -> ProcessedInputState {
        let processed_input = self.create_processed_input_state();
        self.keyboard_inputs_old.clone_from(&self.keyboard_inputs_new);
        self.keyboard_presses.clear();
        processed_input
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_goes_through_press_hold_release() {
        let mut manager = InputManager::new();

        manager.set_key(KeyCode::Escape, true);
        assert!(manager.get_and_reset_processed_input().just_pressed(KeyCode::Escape));
        assert_eq!(
            manager.get_and_reset_processed_input().get_key_state(KeyCode::Escape),
            RawInputState::Held
        );

        manager.set_key(KeyCode::Escape, false);
        assert_eq!(
            manager.get_and_reset_processed_input().get_key_state(KeyCode::Escape),
            RawInputState::Released
        );
        assert_eq!(
            manager.get_and_reset_processed_input().get_key_state(KeyCode::Escape),
            RawInputState::NotPressed
        );
    }

    #[test]
    fn tap_between_ticks_is_not_lost() {
        let mut manager = InputManager::new();
        manager.set_key(KeyCode::Enter, true);
        manager.set_key(KeyCode::Enter, false);

        let tick = manager.get_and_reset_processed_input();
        assert!(tick.just_pressed(KeyCode::Enter));
        assert!(!tick.is_down(KeyCode::KeyW));
        assert_eq!(
            manager.get_and_reset_processed_input().get_key_state(KeyCode::Enter),
            RawInputState::NotPressed
        );
    }

    #[test]
    fn losing_focus_drops_pending_taps() {
        let mut manager = InputManager::new();
        manager.set_key(KeyCode::KeyC, true);
        manager.set_key(KeyCode::KeyC, false);
        manager.release_all();

        assert_eq!(
            manager.get_and_reset_processed_input().get_key_state(KeyCode::KeyC),
            RawInputState::NotPressed
        );
    }

    #[test]
    fn untracked_keys_are_ignored() {
        let mut manager = InputManager::new();
        manager.set_key(KeyCode::F3, true);
        assert!(!manager.get_and_reset_processed_input().is_down(KeyCode::F3));
    }

    #[test]
    fn losing_focus_releases_keys() {
        let mut manager = InputManager::new();
        manager.set_key(KeyCode::KeyW, true);
        manager.get_and_reset_processed_input();

        manager.release_all();
        assert!(manager
            .get_and_reset_processed_input()
            .get_key_state(KeyCode::KeyW)
            .is_just_released());
    }
}

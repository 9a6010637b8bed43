//! # Input State
//!
//! This module defines the input state types used by the input manager and handed to
//! scenes every tick.

use std::collections::HashMap;

use winit::keyboard::KeyCode;

/// Represents the state of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawInputState {
    /// Key is not pressed
    #[default]
    NotPressed,
    /// Key was just pressed this tick
    Pressed,
    /// Key has been held down for multiple ticks
    Held,
    /// Key was just released this tick
    Released,
}

impl RawInputState {
    /// Determines if the input is actively down (either pressed or held)
    pub fn is_active(&self) -> bool {
        matches!(self, RawInputState::Pressed | RawInputState::Held)
    }

    /// Determines if the input was just pressed this tick
    pub fn is_just_pressed(&self) -> bool {
        matches!(self, RawInputState::Pressed)
    }

    /// Determines if the input was just released this tick
    pub fn is_just_released(&self) -> bool {
        matches!(self, RawInputState::Released)
    }

    /// Derives the state transition from the previous and current raw states
    pub fn from_raw_states(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, true) => RawInputState::Pressed,
            (true, true) => RawInputState::Held,
            (true, false) => RawInputState::Released,
            (false, false) => RawInputState::NotPressed,
        }
    }
}

/// A snapshot of the processed keyboard states of one tick.
///
/// Keys that are not tracked read as [`RawInputState::NotPressed`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedInputState {
    /// Current state of all tracked keyboard keys
    pub keyboard_states: HashMap<KeyCode, RawInputState>,
}

impl ProcessedInputState {
    /// Builds a snapshot from explicit key states.
    pub fn from_keys(keys: impl IntoIterator<Item = (KeyCode, RawInputState)>) -> Self {
        Self {
            keyboard_states: keys.into_iter().collect(),
        }
    }

    /// Gets the state of a keyboard key
    pub fn get_key_state(&self, key: KeyCode) -> RawInputState {
        self.keyboard_states.get(&key).copied().unwrap_or_default()
    }

    /// Whether `key` went down this tick.
    pub fn just_pressed(&self, key: KeyCode) -> bool {
        self.get_key_state(key).is_just_pressed()
    }

    /// Whether `key` is down, pressed this tick or held.
    pub fn is_down(&self, key: KeyCode) -> bool {
        self.get_key_state(key).is_active()
    }
}

//! Keyboard actions and behaviors.
//!
//! Actions describe what happens when a key position is pressed, from plain key
//! presses to layer switching, lighting, audio and dynamic macro keys.
//!
//! - [`Action`] - Single operations that the keyboard sends or executes
//! - [`KeyAction`] - How a key position behaves (single action, tap, tap dance)
//! - [`EncoderAction`] - Rotary encoder actions

use crate::keycode::{HidKeyCode, KeyCode};
use crate::modifier::ModifierCombination;

/// EncoderAction is the action at a encoder position, stored in the encoder map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderAction {
    clockwise: KeyAction,
    counter_clockwise: KeyAction,
}

impl Default for EncoderAction {
    fn default() -> Self {
        Self {
            clockwise: KeyAction::No,
            counter_clockwise: KeyAction::No,
        }
    }
}

impl EncoderAction {
    pub const fn new(clockwise: KeyAction, counter_clockwise: KeyAction) -> Self {
        Self {
            clockwise,
            counter_clockwise,
        }
    }

    /// Transparent in both directions, falls through to the lower layer.
    pub const fn transparent() -> Self {
        Self::new(KeyAction::Transparent, KeyAction::Transparent)
    }

    pub fn clockwise(&self) -> KeyAction {
        self.clockwise
    }

    pub fn counter_clockwise(&self) -> KeyAction {
        self.counter_clockwise
    }

    pub fn is_transparent(&self) -> bool {
        self.clockwise == KeyAction::Transparent && self.counter_clockwise == KeyAction::Transparent
    }
}

/// A KeyAction is the action at a keyboard position, stored in the keymap.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyAction {
    /// No action.
    #[default]
    No,
    /// Transparent action, next layer will be checked.
    Transparent,
    /// A single action, such as triggering a key, or activating a layer.
    /// Action is triggered when pressed and cancelled when released.
    Single(Action),
    /// Don't wait the release of the key, auto-release after a time threshold.
    Tap(Action),
    /// Tap dance, the index refers to the tap dance list in the behavior config.
    TapDance(u8),
}

impl KeyAction {
    /// The action this key performs on a plain press, if any.
    pub fn to_action(self) -> Action {
        match self {
            KeyAction::Single(a) | KeyAction::Tap(a) => a,
            KeyAction::Transparent => Action::Transparent,
            KeyAction::No | KeyAction::TapDance(_) => Action::No,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, KeyAction::No)
    }
}

/// A single basic action that a keyboard can execute.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Default action, no action.
    No,
    /// Transparent action, next layer will be checked.
    Transparent,
    /// A normal key stroke, uses for all keycodes defined in `KeyCode` enum, including mouse key, consumer/system control, etc.
    Key(KeyCode),
    /// Modifier Combination, used for oneshot keyboard modifiers
    Modifier(ModifierCombination),
    /// Key stroke with modifier combination triggered.
    KeyWithModifier(KeyCode, ModifierCombination),
    /// Activate a layer
    LayerOn(u8),
    /// Deactivate a layer
    LayerOff(u8),
    /// Toggle a layer
    LayerToggle(u8),
    /// Set default layer
    DefaultLayer(u8),
    /// RGB underglow control
    Light(LightAction),
    /// Speaker control
    Audio(AudioAction),
    /// Dynamic macro recording and playback
    DynamicMacro(DynamicMacroAction),
    /// Keymap-defined keys with behavior outside of the builtin actions
    Custom(CustomKey),
}

impl Action {
    /// Returns the HID keycode if this action sends one.
    pub fn hid_keycode(&self) -> Option<HidKeyCode> {
        match self {
            Action::Key(KeyCode::Hid(k)) | Action::KeyWithModifier(KeyCode::Hid(k), _) => Some(*k),
            _ => None,
        }
    }

    /// Actions which produce HID output, these are what dynamic macros record.
    pub fn is_output(&self) -> bool {
        matches!(
            self,
            Action::Key(_) | Action::Modifier(_) | Action::KeyWithModifier(_, _)
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LightAction {
    Toggle,
    On,
    Off,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AudioAction {
    On,
    Off,
    Toggle,
    /// Click on every key press
    ClickyOn,
    ClickyOff,
    ClickyToggle,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DynamicMacroAction {
    /// Start recording into the given slot
    RecordStart(u8),
    /// Stop the recording in progress
    RecordStop,
    /// Replay the given slot
    Play(u8),
}

/// Keys owned by this keymap.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CustomKey {
    /// Set the underglow to the default color
    RgbOn,
    /// Set the underglow to black
    RgbOff,
    /// Enable toggling the underglow on every key event
    BlinkOn,
    BlinkOff,
    /// Push switch of the rotary encoder
    EncoderClick,
}

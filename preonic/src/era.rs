//! The era1112 keymap for the Preonic.

use heapless::Vec;

use crate::action::{Action, EncoderAction, KeyAction};
use crate::config::{BehaviorConfig, TapDancesConfig};
use crate::keycode::{HidKeyCode, KeyCode};
use crate::modifier::ModifierCombination;
use crate::tap_dance::TapDance;
use crate::{a, au, ck, dm, encoder, k, layer, mo, shifted, tap, td, tg};

// Matrix size comes from `keyboard.toml`
pub use crate::{COL, NUM_ENCODER, NUM_LAYER, ROW};

/// Base layer
pub const PREONIC: u8 = 0;
/// "Planck mode": the number row is disabled
pub const PLANCK: u8 = 1;
pub const LOWER: u8 = 2;
pub const RAISE: u8 = 3;
pub const ADJUST: u8 = 4;

/// Shift on tap and hold, caps lock on double tap
pub const TD_2_CAPSLOCK: u8 = 0;

#[rustfmt::skip]
pub const fn get_default_keymap() -> [[[KeyAction; COL]; ROW]; NUM_LAYER] {
    [
        layer!([
            [k!(Minus), k!(Kc1), k!(Kc2), k!(Kc3), k!(Kc4), k!(Kc5), k!(Kc6), k!(Kc7), k!(Kc8), k!(Kc9), k!(Kc0), k!(Equal)],
            [k!(Tab), k!(Q), k!(W), k!(E), k!(R), k!(T), k!(Y), k!(U), k!(I), k!(O), k!(P), k!(Backspace)],
            [k!(Escape), k!(A), k!(S), k!(D), k!(F), k!(G), k!(H), k!(J), k!(K), k!(L), k!(Semicolon), k!(Enter)],
            [k!(LShift), k!(Z), k!(X), k!(C), k!(V), k!(B), k!(N), k!(M), k!(Comma), k!(Dot), k!(Slash), td!(TD_2_CAPSLOCK)],
            [ck!(EncoderClick), k!(LAlt), k!(LGui), k!(LCtrl), mo!(LOWER), k!(Space), mo!(RAISE), k!(RCtrl), k!(Left), k!(Down), k!(Up), k!(Right)]
        ]),
        layer!([
            [a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), mo!(LOWER), a!(Transparent), mo!(RAISE), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)]
        ]),
        layer!([
            [dm!(play 0), dm!(rec 0), dm!(stop), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)],
            [a!(Transparent), k!(Kc1), k!(Kc2), k!(Kc3), k!(Kc4), k!(Kc5), k!(Kc6), k!(Kc7), k!(Kc8), k!(Kc9), k!(Kc0), k!(Delete)],
            [k!(Backspace), k!(F1), k!(F2), k!(F3), k!(F4), k!(F5), k!(F6), shifted!(Quote), shifted!(Grave), shifted!(LeftBracket), shifted!(RightBracket), a!(Transparent)],
            [a!(Transparent), k!(F7), k!(F8), k!(F9), k!(F10), k!(F11), k!(F12), k!(Minus), shifted!(Equal), k!(Equal), k!(Backslash), a!(Transparent)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), mo!(ADJUST), a!(Transparent), k!(Home), k!(PageDown), k!(PageUp), k!(End)]
        ]),
        layer!([
            [dm!(play 0), dm!(rec 0), dm!(stop), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)],
            [a!(Transparent), shifted!(Kc1), shifted!(Kc2), shifted!(Kc3), shifted!(Kc4), shifted!(Kc5), shifted!(Kc6), shifted!(Kc7), shifted!(Kc8), shifted!(Kc9), shifted!(Kc0), k!(Delete)],
            [k!(Delete), k!(F1), k!(F2), k!(F3), k!(F4), k!(F5), k!(F6), k!(Quote), k!(Grave), k!(LeftBracket), k!(RightBracket), a!(Transparent)],
            [a!(Transparent), k!(F7), k!(F8), k!(F9), k!(F10), k!(F11), k!(F12), k!(Minus), shifted!(Equal), shifted!(Minus), shifted!(Backslash), a!(Transparent)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), mo!(ADJUST), a!(Transparent), a!(Transparent), a!(Transparent), k!(AudioMute), k!(AudioVolDown), k!(AudioVolUp), k!(F24)]
        ]),
        layer!([
            [au!(On), au!(Off), au!(ClickyOn), au!(ClickyOff), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No)],
            [ck!(RgbOn), ck!(RgbOff), ck!(BlinkOn), ck!(BlinkOff), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No)],
            [tg!(PLANCK), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No)],
            [a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No)],
            [a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), k!(Insert)]
        ]),
    ]
}

/// Encoder actions per layer, `(clockwise, counter-clockwise)`
pub const fn get_encoder_map() -> [[EncoderAction; NUM_ENCODER]; NUM_LAYER] {
    [
        [encoder!(tap!(MouseWheelUp), tap!(MouseWheelDown))],
        [EncoderAction::transparent()],
        [encoder!(
            KeyAction::Tap(Action::KeyWithModifier(
                KeyCode::Hid(HidKeyCode::F3),
                ModifierCombination::LSHIFT
            )),
            tap!(F3)
        )],
        [encoder!(
            KeyAction::Tap(Action::KeyWithModifier(
                KeyCode::Hid(HidKeyCode::Z),
                ModifierCombination::LCTRL
            )),
            KeyAction::Tap(Action::KeyWithModifier(
                KeyCode::Hid(HidKeyCode::Y),
                ModifierCombination::LCTRL
            ))
        )],
        [encoder!(a!(No), a!(No))],
    ]
}

/// Behavior config of the keymap: the caps lock tap dance, everything else from `keyboard.toml`
pub fn get_behavior_config() -> BehaviorConfig {
    let mut tap_dances = Vec::new();
    let caps = TapDance::new(
        k!(RShift),
        k!(RShift),
        k!(RShift),
        k!(CapsLock),
        TapDancesConfig::default_tapping_term(),
    );
    if tap_dances.push(caps).is_err() {
        warn!("Tap dance config is full");
    }

    BehaviorConfig {
        tap_dance: TapDancesConfig { tap_dances },
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{CustomKey, DynamicMacroAction};

    #[test]
    fn test_keymap_shape() {
        let keymap = get_default_keymap();
        assert_eq!(keymap[PREONIC as usize][3][11], td!(TD_2_CAPSLOCK));
        assert_eq!(
            keymap[PREONIC as usize][4][0],
            KeyAction::Single(Action::Custom(CustomKey::EncoderClick))
        );
        assert_eq!(keymap[PLANCK as usize][0], [KeyAction::No; COL]);
        assert_eq!(keymap[PLANCK as usize][4][4], mo!(LOWER));
        assert_eq!(keymap[LOWER as usize][4][6], mo!(ADJUST));
        assert_eq!(keymap[RAISE as usize][4][4], mo!(ADJUST));
        assert_eq!(
            keymap[RAISE as usize][0][1],
            KeyAction::Single(Action::DynamicMacro(DynamicMacroAction::RecordStart(0)))
        );
        assert_eq!(keymap[ADJUST as usize][2][0], tg!(PLANCK));
        assert_eq!(keymap[ADJUST as usize][4][11], k!(Insert));
    }

    #[test]
    fn test_shifted_symbols() {
        let keymap = get_default_keymap();
        let pipe = KeyAction::Single(Action::KeyWithModifier(
            KeyCode::Hid(HidKeyCode::Backslash),
            ModifierCombination::LSHIFT,
        ));
        assert_eq!(keymap[RAISE as usize][3][10], pipe);
        assert_eq!(keymap[LOWER as usize][2][7], shifted!(Quote));
    }

    #[test]
    fn test_tap_dance_config() {
        let behavior = get_behavior_config();
        let caps = &behavior.tap_dance.tap_dances[TD_2_CAPSLOCK as usize];
        assert_eq!(caps.tap, k!(RShift));
        assert_eq!(caps.double_tap, k!(CapsLock));
        assert_eq!(caps.tapping_term, TapDancesConfig::default_tapping_term());
    }
}

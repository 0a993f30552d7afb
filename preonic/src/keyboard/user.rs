//! Behaviors of the era1112 keymap that run on top of the default action processing.

use crate::action::{Action, CustomKey, DynamicMacroAction, KeyAction};
use crate::audio::songs;
use crate::era::{PLANCK, PREONIC, TD_2_CAPSLOCK};
use crate::keyboard::Keyboard;
use crate::keycode::{HidKeyCode, KeyCode};
use crate::light::Hsv;
use crate::tap_dance::TapDanceState;

impl<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize, const NUM_ENCODER: usize>
    Keyboard<'a, ROW, COL, NUM_LAYER, NUM_ENCODER>
{
    /// Runs before the default processing of every resolved key action, on press and on release.
    ///
    /// Returns `false` when the action is fully handled here.
    pub(crate) async fn process_record_user(&mut self, key_action: KeyAction, pressed: bool) -> bool {
        match key_action.to_action() {
            Action::Custom(CustomKey::RgbOff) => {
                if pressed {
                    self.light.set_hsv(Hsv::OFF);
                    self.publish_light();
                }
                false
            }
            Action::Custom(CustomKey::RgbOn) => {
                if pressed {
                    self.light.set_hsv(self.light_config.default_hsv);
                    self.publish_light();
                }
                false
            }
            Action::Custom(CustomKey::BlinkOn) => {
                if pressed {
                    self.blinky = true;
                }
                false
            }
            Action::Custom(CustomKey::BlinkOff) => {
                if pressed {
                    self.blinky = false;
                }
                false
            }
            Action::Custom(CustomKey::EncoderClick) => {
                if pressed {
                    let clickable = {
                        let keymap = self.keymap.borrow();
                        keymap.is_layer_active(PREONIC) || keymap.is_layer_active(PLANCK)
                    };
                    if clickable {
                        self.tap_action(Action::Key(KeyCode::Hid(HidKeyCode::MouseBtn1)))
                            .await;
                    }
                }
                false
            }
            // The mode key
            Action::LayerToggle(PLANCK) => {
                if pressed {
                    let song = if self.keymap.borrow().is_layer_active(PLANCK) {
                        songs::PREONIC_SOUND
                    } else {
                        songs::PLANCK_SOUND
                    };
                    self.play(song);
                }
                true
            }
            Action::DynamicMacro(DynamicMacroAction::RecordStart(_)) => {
                if pressed {
                    self.play(songs::STARTUP_SOUND);
                }
                true
            }
            Action::DynamicMacro(DynamicMacroAction::RecordStop) => {
                if pressed {
                    self.play(songs::GOODBYE_SOUND);
                }
                true
            }
            Action::Key(KeyCode::Hid(HidKeyCode::Insert)) => {
                if pressed {
                    self.play(songs::AG_NORM_SOUND);
                }
                true
            }
            _ => {
                if self.blinky {
                    self.light.toggle();
                    self.publish_light();
                }
                true
            }
        }
    }

    /// Called when a tap dance is decided (`finished`) and when it is released afterwards
    pub(crate) fn tap_dance_user(&mut self, index: u8, state: TapDanceState, finished: bool) {
        if index == TD_2_CAPSLOCK && state == TapDanceState::DoubleTap {
            debug!("Caps lock {}", if finished { "pressed" } else { "released" });
            self.play(songs::CAPS_LOCK_ON_SOUND);
        }
    }

    /// A dynamic macro slot overflowed
    pub(crate) fn dynamic_macro_full(&mut self) {
        self.play(songs::GOODBYE_SOUND);
    }

    fn play(&self, song: crate::audio::Song) {
        self.audio.play(&self.channels.audio_channel, song);
    }
}

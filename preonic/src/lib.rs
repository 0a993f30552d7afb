//! Keymap firmware for the Preonic/Planck ortholinear keyboard.
//!
//! The crate turns [`event::KeyboardEvent`]s into HID reports, drives the RGB underglow state and
//! emits audio commands. Matrix scanning, the USB transport and the speaker driver live outside
//! of this crate; they talk to it through the channels in [`config::ChannelConfig`] and the
//! [`smart_leds::SmartLedsWrite`] / [`audio::Speaker`] traits.

#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod audio;
pub mod channel;
pub mod config;
pub mod dynamic_macro;
pub mod era;
pub mod event;
pub mod hid;
pub mod keyboard;
pub mod keymap;
pub mod layout_macro;
pub mod light;
pub mod tap_dance;

pub use preonic_types::{action, keycode, modifier};

use core::cell::RefCell;

use embassy_futures::join::join3;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use smart_leds::{RGB8, SmartLedsWrite};
use static_cell::StaticCell;

use crate::action::{EncoderAction, KeyAction};
use crate::audio::{AudioService, Speaker};
use crate::channel::CHANNELS;
use crate::keyboard::Keyboard;
use crate::keymap::KeyMap;
use crate::light::RgbController;

pub type RawMutex = CriticalSectionRawMutex;

/// Run the era1112 keymap: the keyboard, the underglow and the speaker.
///
/// Key events are read from `CHANNELS.key_event_channel` and HID reports are written to
/// `CHANNELS.keyboard_report_channel`, the board's matrix scanner and USB writer use them.
/// This function must be called only once.
pub async fn run_preonic<W: SmartLedsWrite<Color = RGB8>, S: Speaker>(led_writer: W, speaker: S) {
    static KEYMAP: StaticCell<[[[KeyAction; COL]; ROW]; NUM_LAYER]> = StaticCell::new();
    static ENCODER_MAP: StaticCell<[[EncoderAction; NUM_ENCODER]; NUM_LAYER]> = StaticCell::new();
    static KEY_MAP: StaticCell<RefCell<KeyMap<'static, ROW, COL, NUM_LAYER, NUM_ENCODER>>> = StaticCell::new();

    let behavior = era::get_behavior_config();
    let audio_config = behavior.audio;
    let keymap = KEY_MAP.init(RefCell::new(KeyMap::new(
        KEYMAP.init(era::get_default_keymap()),
        Some(ENCODER_MAP.init(era::get_encoder_map())),
        behavior,
    )));
    info!("{} started", KEYBOARD_NAME);

    let mut keyboard = Keyboard::new(keymap, &CHANNELS);
    let mut light: RgbController<'_, W, RGBLED_NUM> = RgbController::new(led_writer, &CHANNELS.light_signal);
    let mut audio = AudioService::new(speaker, &CHANNELS.audio_channel, &audio_config);

    join3(keyboard.run(), light.run(), audio.run()).await;
}

// Include the generated constants from keyboard.toml
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

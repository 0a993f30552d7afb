//! Runtime configurations, seeded from the constants generated out of `keyboard.toml`.

use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::Duration;
use heapless::Vec;

use crate::audio::AudioCommand;
use crate::event::KeyboardEvent;
use crate::hid::Report;
use crate::light::{Hsv, RgblightState};
use crate::tap_dance::TapDance;
use crate::{
    AGGRESSIVE_SCROLL_RATE, AUDIO_CHANNEL_SIZE, AUDIO_CLICKY, AUDIO_ENABLED, AUDIO_TEMPO, DEFAULT_BLINKY, DEFAULT_HUE,
    DEFAULT_SAT, DEFAULT_VAL, EVENT_CHANNEL_SIZE, RawMutex, REPORT_CHANNEL_SIZE, TAPPING_TERM_MS,
};

/// Maximum number of tap dances in a keymap
pub const TAP_DANCE_MAX_NUM: usize = 4;

/// Channels connecting the keyboard to the rest of the firmware.
///
/// The matrix/encoder scanners send into `key_event_channel`, the HID writer drains
/// `keyboard_report_channel`, the speaker task drains `audio_channel` and the underglow task
/// waits on `light_signal`.
pub struct ChannelConfig {
    pub key_event_channel: Channel<RawMutex, KeyboardEvent, EVENT_CHANNEL_SIZE>,
    pub keyboard_report_channel: Channel<RawMutex, Report, REPORT_CHANNEL_SIZE>,
    pub audio_channel: Channel<RawMutex, AudioCommand, AUDIO_CHANNEL_SIZE>,
    pub light_signal: Signal<RawMutex, RgblightState>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelConfig {
    pub const fn new() -> Self {
        Self {
            key_event_channel: Channel::new(),
            keyboard_report_channel: Channel::new(),
            audio_channel: Channel::new(),
            light_signal: Signal::new(),
        }
    }
}

/// Config for configurable action behavior
#[derive(Clone, Debug, Default)]
pub struct BehaviorConfig {
    pub tap_dance: TapDancesConfig,
    pub encoder: EncoderConfig,
    pub light: LightConfig,
    pub audio: AudioConfig,
}

#[derive(Clone, Debug, Default)]
pub struct TapDancesConfig {
    pub tap_dances: Vec<TapDance, TAP_DANCE_MAX_NUM>,
}

impl TapDancesConfig {
    /// Default tapping term of the tap dances, from `behavior.tapping_term`
    pub fn default_tapping_term() -> Duration {
        Duration::from_millis(TAPPING_TERM_MS)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct EncoderConfig {
    /// Number of wheel ticks sent per detent while shift is held
    pub aggressive_scroll_rate: u8,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            aggressive_scroll_rate: AGGRESSIVE_SCROLL_RATE,
        }
    }
}

/// RGB underglow defaults
#[derive(Clone, Copy, Debug)]
pub struct LightConfig {
    /// Color set at startup and by the RGB on key
    pub default_hsv: Hsv,
    /// Toggle the underglow on every key event
    pub blinky: bool,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            default_hsv: Hsv::new(DEFAULT_HUE, DEFAULT_SAT, DEFAULT_VAL),
            blinky: DEFAULT_BLINKY,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct AudioConfig {
    pub enabled: bool,
    pub clicky: bool,
    /// Beats per minute
    pub tempo: u16,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: AUDIO_ENABLED,
            clicky: AUDIO_CLICKY,
            tempo: AUDIO_TEMPO,
        }
    }
}

pub mod test_macro;

use core::cell::RefCell;

use embassy_futures::block_on;
use embassy_futures::select::select;
use embassy_time::{Duration, MockDriver};
use preonic::action::{EncoderAction, KeyAction};
use preonic::audio::{AudioCommand, Song};
use preonic::config::{BehaviorConfig, ChannelConfig};
use preonic::era::{self, COL, NUM_ENCODER, NUM_LAYER, ROW};
use preonic::event::{Direction, KeyboardEvent};
use preonic::hid::{KeyboardReport, Report};
use preonic::keyboard::Keyboard;
use preonic::keymap::KeyMap;

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

pub(crate) const KC_LSHIFT: u8 = 1 << 1;
pub(crate) const KC_LCTRL: u8 = 1 << 0;
pub(crate) const KC_RSHIFT: u8 = 1 << 5;

pub type EraKeyboard = Keyboard<'static, ROW, COL, NUM_LAYER, NUM_ENCODER>;

/// The era keyboard under test, with its own channels
pub struct TestKeyboard {
    pub keyboard: EraKeyboard,
    pub channels: &'static ChannelConfig,
}

pub fn wrap_keymap<const R: usize, const C: usize, const L: usize, const E: usize>(
    keymap: [[[KeyAction; C]; R]; L],
    encoders: [[EncoderAction; E]; L],
    config: BehaviorConfig,
) -> &'static RefCell<KeyMap<'static, R, C, L, E>> {
    // Box::leak is acceptable in tests
    let leaked_keymap = Box::leak(Box::new(keymap));
    let leaked_encoders = Box::leak(Box::new(encoders));
    let keymap = KeyMap::new(leaked_keymap, Some(leaked_encoders), config);
    Box::leak(Box::new(RefCell::new(keymap)))
}

pub fn create_test_keyboard() -> TestKeyboard {
    let keymap = wrap_keymap(
        era::get_default_keymap(),
        era::get_encoder_map(),
        era::get_behavior_config(),
    );
    let channels: &'static ChannelConfig = Box::leak(Box::new(ChannelConfig::new()));
    let mut keyboard = Keyboard::new(keymap, channels);
    keyboard.post_init();
    // Drop the initial light state
    channels.light_signal.reset();
    TestKeyboard { keyboard, channels }
}

impl TestKeyboard {
    /// Process one event, returns every report it produced
    pub fn process(&mut self, event: KeyboardEvent) -> Vec<Report> {
        let channels = self.channels;
        let mut reports = Vec::new();
        block_on(async {
            // Keep draining so that long bursts never block on a full report channel
            select(self.keyboard.process_event(event), async {
                loop {
                    reports.push(channels.keyboard_report_channel.receive().await);
                }
            })
            .await;
        });
        while let Ok(report) = channels.keyboard_report_channel.try_receive() {
            reports.push(report);
        }
        reports
    }

    pub fn press(&mut self, row: u8, col: u8) -> Vec<Report> {
        self.process(KeyboardEvent::key(row, col, true))
    }

    pub fn release(&mut self, row: u8, col: u8) -> Vec<Report> {
        self.process(KeyboardEvent::key(row, col, false))
    }

    /// Press and release, the reports of both
    pub fn tap(&mut self, row: u8, col: u8) -> Vec<Report> {
        let mut reports = self.press(row, col);
        reports.extend(self.release(row, col));
        reports
    }

    pub fn rotate(&mut self, direction: Direction) -> Vec<Report> {
        let mut reports = self.process(KeyboardEvent::rotary_encoder(0, direction, true));
        reports.extend(self.process(KeyboardEvent::rotary_encoder(0, direction, false)));
        reports
    }

    /// Move the mock clock forward and run the expired timeouts
    pub fn advance(&mut self, ms: u64) -> Vec<Report> {
        MockDriver::get().advance(Duration::from_millis(ms));
        let channels = self.channels;
        let mut reports = Vec::new();
        block_on(async {
            select(self.keyboard.process_timeout(), async {
                loop {
                    reports.push(channels.keyboard_report_channel.receive().await);
                }
            })
            .await;
        });
        while let Ok(report) = channels.keyboard_report_channel.try_receive() {
            reports.push(report);
        }
        reports
    }

    /// Songs queued to the speaker so far
    pub fn songs(&self) -> Vec<Song> {
        let mut songs = Vec::new();
        while let Ok(AudioCommand::Play(song)) = self.channels.audio_channel.try_receive() {
            songs.push(song);
        }
        songs
    }
}

/// Keep only the keyboard reports, as `(modifier, keycodes)`
pub fn keyboard_reports(reports: &[Report]) -> Vec<(u8, [u8; 6])> {
    reports
        .iter()
        .filter_map(|report| match report {
            Report::KeyboardReport(KeyboardReport { modifier, keycodes, .. }) => Some((*modifier, *keycodes)),
            _ => None,
        })
        .collect()
}

/// Keep only the mouse reports, as `(buttons, wheel)`
pub fn mouse_reports(reports: &[Report]) -> Vec<(u8, i8)> {
    reports
        .iter()
        .filter_map(|report| match report {
            Report::MouseReport(report) => Some((report.buttons, report.wheel)),
            _ => None,
        })
        .collect()
}

/// Keep only the media reports, as usage ids
pub fn media_reports(reports: &[Report]) -> Vec<u16> {
    reports
        .iter()
        .filter_map(|report| match report {
            Report::MediaKeyboardReport(report) => Some(report.usage_id),
            _ => None,
        })
        .collect()
}

//! Audio feedback: songs, the audio/clicky switches and the speaker task.
//!
//! The keyboard only decides *what* to play, it sends [`AudioCommand`]s to the audio channel.
//! [`AudioService`] turns them into tones on a [`Speaker`], which wraps the actual PWM or DAC.

use embassy_sync::channel::Channel;
use embassy_time::{Duration, Timer};

use crate::config::AudioConfig;
use crate::{AUDIO_CHANNEL_SIZE, RawMutex};

/// A note of a song. `duration` is in 64ths of a beat, same unit as QMK's `MUSICAL_NOTE`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Note {
    /// Frequency in Hz, 0 is a rest
    pub freq: f32,
    pub duration: u16,
}

impl Note {
    pub const fn new(freq: f32, duration: u16) -> Self {
        Self { freq, duration }
    }

    pub const fn eighth(freq: f32) -> Self {
        Self::new(freq, 8)
    }

    /// Dotted eighth
    pub const fn eighth_dotted(freq: f32) -> Self {
        Self::new(freq, 12)
    }
}

pub type Song = &'static [Note];

pub mod notes {
    pub const A3: f32 = 220.0;
    pub const B3: f32 = 246.94;
    pub const A4: f32 = 440.0;
    pub const A5: f32 = 880.0;
    pub const B5: f32 = 987.77;
    pub const DS6: f32 = 1244.51;
    pub const E6: f32 = 1318.51;
    pub const A6: f32 = 1760.0;
    pub const B6: f32 = 1975.53;
    pub const CS7: f32 = 2217.46;
    pub const E7: f32 = 2637.02;
}

pub mod songs {
    use super::notes::*;
    use super::{Note, Song};

    pub const STARTUP_SOUND: Song = &[Note::eighth(E6), Note::eighth(A6), Note::eighth_dotted(E7)];
    pub const GOODBYE_SOUND: Song = &[Note::eighth(E7), Note::eighth(A6), Note::eighth_dotted(E6)];
    pub const PLANCK_SOUND: Song = &[
        Note::eighth_dotted(E7),
        Note::eighth(CS7),
        Note::eighth(E6),
        Note::eighth(A6),
        Note::new(CS7, 20),
    ];
    pub const PREONIC_SOUND: Song = &[
        Note::new(B5, 20),
        Note::eighth(B6),
        Note::new(DS6, 20),
        Note::eighth(B6),
    ];
    pub const CAPS_LOCK_ON_SOUND: Song = &[Note::eighth(A3), Note::eighth(B3)];
    pub const AG_NORM_SOUND: Song = &[Note::eighth(A5), Note::eighth(A5)];
    pub const AUDIO_ON_SOUND: Song = &[Note::eighth(A5), Note::eighth(A6)];
    pub const AUDIO_OFF_SOUND: Song = &[Note::eighth(A6), Note::eighth(A5)];
    pub const CLICK_SOUND: Song = &[Note::new(A4, 2)];
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AudioCommand {
    Play(Song),
}

pub type AudioChannel = Channel<RawMutex, AudioCommand, AUDIO_CHANNEL_SIZE>;

/// Audio switches owned by the keyboard
#[derive(Clone, Copy, Debug)]
pub struct AudioState {
    pub enabled: bool,
    pub clicky: bool,
}

impl AudioState {
    pub fn new(config: &AudioConfig) -> Self {
        Self {
            enabled: config.enabled,
            clicky: config.clicky,
        }
    }

    /// Queue a song, nothing is played while audio is off.
    pub fn play(&self, channel: &AudioChannel, song: Song) {
        if !self.enabled {
            return;
        }
        if channel.try_send(AudioCommand::Play(song)).is_err() {
            warn!("Audio channel full, song dropped");
        }
    }

    /// Click on a key press when clicky is on
    pub fn click(&self, channel: &AudioChannel) {
        if self.clicky {
            self.play(channel, songs::CLICK_SOUND);
        }
    }

    pub fn turn_on(&mut self, channel: &AudioChannel) {
        self.enabled = true;
        self.play(channel, songs::AUDIO_ON_SOUND);
    }

    pub fn turn_off(&mut self, channel: &AudioChannel) {
        self.play(channel, songs::AUDIO_OFF_SOUND);
        self.enabled = false;
    }

    pub fn toggle(&mut self, channel: &AudioChannel) {
        if self.enabled {
            self.turn_off(channel);
        } else {
            self.turn_on(channel);
        }
    }
}

/// Tone output of the board
pub trait Speaker {
    /// Start a square wave at `freq` Hz
    fn tone(&mut self, freq: f32);
    fn silence(&mut self);
}

/// Plays the commands of the audio channel on a speaker.
pub struct AudioService<'a, S: Speaker> {
    speaker: S,
    channel: &'a AudioChannel,
    tempo: u16,
}

impl<'a, S: Speaker> AudioService<'a, S> {
    pub fn new(speaker: S, channel: &'a AudioChannel, config: &AudioConfig) -> Self {
        Self {
            speaker,
            channel,
            tempo: config.tempo.max(1),
        }
    }

    pub async fn run(&mut self) -> ! {
        loop {
            let command = self.channel.receive().await;
            self.play(command).await;
        }
    }

    pub async fn play(&mut self, command: AudioCommand) {
        let AudioCommand::Play(song) = command;
        for note in song {
            if note.freq > 0.0 {
                self.speaker.tone(note.freq);
            } else {
                self.speaker.silence();
            }
            Timer::after(self.note_duration(note)).await;
        }
        self.speaker.silence();
    }

    /// Length of a note at the current tempo
    pub fn note_duration(&self, note: &Note) -> Duration {
        Duration::from_micros(note.duration as u64 * 60_000_000 / (64 * self.tempo as u64))
    }
}

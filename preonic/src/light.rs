//! RGB underglow state and rendering.

use embassy_sync::signal::Signal;
use smart_leds::hsv::{Hsv as SmartHsv, hsv2rgb};
use smart_leds::{RGB8, SmartLedsWrite};

use crate::RawMutex;

/// A color in QMK's HSV space, every component ranges 0 ~ 255
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Hsv {
    pub hue: u8,
    pub sat: u8,
    pub val: u8,
}

impl Hsv {
    pub const OFF: Hsv = Hsv::new(0, 0, 0);

    pub const fn new(hue: u8, sat: u8, val: u8) -> Self {
        Self { hue, sat, val }
    }

    pub fn to_rgb(self) -> RGB8 {
        hsv2rgb(SmartHsv {
            hue: self.hue,
            sat: self.sat,
            val: self.val,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RgblightMode {
    /// One color on every LED
    #[default]
    StaticLight,
}

/// State of the underglow. Changes are not persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RgblightState {
    pub enabled: bool,
    pub hsv: Hsv,
    pub mode: RgblightMode,
}

impl RgblightState {
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    pub fn set_hsv(&mut self, hsv: Hsv) {
        self.hsv = hsv;
    }

    pub fn set_mode(&mut self, mode: RgblightMode) {
        self.mode = mode;
    }

    /// Colors of `N` LEDs, all black when disabled
    pub fn frame<const N: usize>(&self) -> [RGB8; N] {
        if !self.enabled {
            return [RGB8::default(); N];
        }
        match self.mode {
            RgblightMode::StaticLight => [self.hsv.to_rgb(); N],
        }
    }
}

/// Renders the underglow whenever the keyboard publishes a new state.
pub struct RgbController<'a, W: SmartLedsWrite<Color = RGB8>, const N: usize> {
    writer: W,
    signal: &'a Signal<RawMutex, RgblightState>,
}

impl<'a, W: SmartLedsWrite<Color = RGB8>, const N: usize> RgbController<'a, W, N> {
    pub fn new(writer: W, signal: &'a Signal<RawMutex, RgblightState>) -> Self {
        Self { writer, signal }
    }

    pub async fn run(&mut self) -> ! {
        loop {
            let state = self.signal.wait().await;
            self.render(&state);
        }
    }

    pub fn render(&mut self, state: &RgblightState) {
        if self.writer.write(state.frame::<N>()).is_err() {
            error!("Failed to write the RGB frame");
        }
    }
}

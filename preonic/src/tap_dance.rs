use embassy_time::{Duration, Instant};

use crate::action::KeyAction;
use crate::config::TapDancesConfig;

/// Actions of a tap dance key, chosen by the number of taps and whether the key is still held
/// when the dance ends.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TapDance {
    pub tap: KeyAction,
    pub hold: KeyAction,
    pub hold_after_tap: KeyAction,
    pub double_tap: KeyAction,
    pub tapping_term: Duration,
}

impl Default for TapDance {
    fn default() -> Self {
        Self {
            tap: KeyAction::No,
            hold: KeyAction::No,
            hold_after_tap: KeyAction::No,
            double_tap: KeyAction::No,
            tapping_term: TapDancesConfig::default_tapping_term(),
        }
    }
}

impl TapDance {
    pub fn new(
        tap: KeyAction,
        hold: KeyAction,
        hold_after_tap: KeyAction,
        double_tap: KeyAction,
        tapping_term: Duration,
    ) -> Self {
        Self {
            tap,
            hold,
            hold_after_tap,
            double_tap,
            tapping_term,
        }
    }

    /// The action registered when the dance finishes in `state`. More than two taps behave as a tap.
    pub fn action_for(&self, state: TapDanceState) -> KeyAction {
        match state {
            TapDanceState::SingleTap | TapDanceState::Unknown => self.tap,
            TapDanceState::SingleHold => self.hold,
            TapDanceState::DoubleTap => self.double_tap,
            TapDanceState::DoubleHold => self.hold_after_tap,
            TapDanceState::None => KeyAction::No,
        }
    }
}

/// How a tap dance ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TapDanceState {
    None,
    Unknown,
    SingleTap,
    SingleHold,
    DoubleTap,
    DoubleHold,
}

impl TapDanceState {
    /// Decide the outcome from the tap count and the key state at the end of the dance.
    ///
    /// A single tap interrupted by another key counts as a tap even if the key is still held.
    pub fn resolve(count: u8, interrupted: bool, pressed: bool) -> Self {
        match count {
            1 if interrupted || !pressed => TapDanceState::SingleTap,
            1 => TapDanceState::SingleHold,
            2 if pressed => TapDanceState::DoubleHold,
            2 => TapDanceState::DoubleTap,
            _ => TapDanceState::Unknown,
        }
    }
}

/// A tap dance in progress
#[derive(Clone, Debug)]
pub struct TapDanceProgress {
    pub count: u8,
    pub pressed: bool,
    pub interrupted: bool,
    /// Set once the outcome is decided and its action registered
    pub finished: bool,
    pub state: TapDanceState,
    last_press: Instant,
    tapping_term: Duration,
}

impl TapDanceProgress {
    /// Start a dance with its first press
    pub fn new(tapping_term: Duration, now: Instant) -> Self {
        Self {
            count: 1,
            pressed: true,
            interrupted: false,
            finished: false,
            state: TapDanceState::None,
            last_press: now,
            tapping_term,
        }
    }

    /// Another press of the dance key, restarts the tapping term
    pub fn press(&mut self, now: Instant) {
        self.count = self.count.saturating_add(1);
        self.pressed = true;
        self.last_press = now;
    }

    pub fn release(&mut self) {
        self.pressed = false;
    }

    /// When the dance ends if nothing else happens
    pub fn deadline(&self) -> Option<Instant> {
        if self.finished {
            None
        } else {
            Some(self.last_press + self.tapping_term)
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.deadline().is_some_and(|deadline| now >= deadline)
    }

    /// End the dance and decide its outcome
    pub fn finish(&mut self, interrupted: bool) -> TapDanceState {
        self.interrupted |= interrupted;
        self.finished = true;
        self.state = TapDanceState::resolve(self.count, self.interrupted, self.pressed);
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::keycode::{HidKeyCode, KeyCode};

    fn key(k: HidKeyCode) -> KeyAction {
        KeyAction::Single(Action::Key(KeyCode::Hid(k)))
    }

    #[test]
    fn test_resolve() {
        assert_eq!(TapDanceState::resolve(1, false, false), TapDanceState::SingleTap);
        assert_eq!(TapDanceState::resolve(1, true, true), TapDanceState::SingleTap);
        assert_eq!(TapDanceState::resolve(1, false, true), TapDanceState::SingleHold);
        assert_eq!(TapDanceState::resolve(2, false, false), TapDanceState::DoubleTap);
        assert_eq!(TapDanceState::resolve(2, true, false), TapDanceState::DoubleTap);
        assert_eq!(TapDanceState::resolve(2, false, true), TapDanceState::DoubleHold);
        assert_eq!(TapDanceState::resolve(3, false, false), TapDanceState::Unknown);
    }

    #[test]
    fn test_action_for_state() {
        let td = TapDance::new(
            key(HidKeyCode::RShift),
            key(HidKeyCode::RShift),
            key(HidKeyCode::RShift),
            key(HidKeyCode::CapsLock),
            Duration::from_millis(200),
        );
        assert_eq!(td.action_for(TapDanceState::DoubleTap), key(HidKeyCode::CapsLock));
        assert_eq!(td.action_for(TapDanceState::Unknown), key(HidKeyCode::RShift));
        assert_eq!(td.action_for(TapDanceState::None), KeyAction::No);
    }

    #[test]
    fn test_tapping_term_restarts_on_press() {
        let start = Instant::from_millis(1000);
        let mut progress = TapDanceProgress::new(Duration::from_millis(200), start);
        assert_eq!(progress.deadline(), Some(Instant::from_millis(1200)));
        progress.release();
        progress.press(Instant::from_millis(1150));
        assert_eq!(progress.count, 2);
        assert!(!progress.is_expired(Instant::from_millis(1300)));
        assert!(progress.is_expired(Instant::from_millis(1350)));
        progress.release();
        assert_eq!(progress.finish(false), TapDanceState::DoubleTap);
        assert_eq!(progress.deadline(), None);
    }

    #[test]
    fn test_interrupted_hold_is_tap() {
        let mut progress = TapDanceProgress::new(Duration::from_millis(200), Instant::from_millis(0));
        assert_eq!(progress.finish(true), TapDanceState::SingleTap);
        assert!(progress.pressed);
    }
}

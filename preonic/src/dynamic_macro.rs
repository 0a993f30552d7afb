//! Dynamic macros: key sequences recorded at runtime and replayed on demand.

use heapless::Vec;

use crate::DYNAMIC_MACRO_SIZE;
use crate::action::Action;

/// Number of dynamic macro slots
pub const NUM_DYNAMIC_MACRO: usize = 2;

/// A recorded key event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacroEvent {
    pub action: Action,
    pub pressed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordOutcome {
    Recorded,
    /// The slot is full, the event was dropped
    Full,
    NotRecording,
}

pub struct DynamicMacros {
    slots: [Vec<MacroEvent, DYNAMIC_MACRO_SIZE>; NUM_DYNAMIC_MACRO],
    recording: Option<u8>,
}

impl Default for DynamicMacros {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicMacros {
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| Vec::new()),
            recording: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    /// Start recording into `slot`, its previous content is discarded.
    pub fn start_recording(&mut self, slot: u8) -> bool {
        let Some(events) = self.slots.get_mut(slot as usize) else {
            warn!("Invalid dynamic macro slot {}", slot);
            return false;
        };
        events.clear();
        self.recording = Some(slot);
        info!("Dynamic macro {} recording", slot);
        true
    }

    /// Stop the recording, returns the slot that was recorded.
    ///
    /// Trailing presses are dropped, those are the keys still held to reach the stop key.
    pub fn stop_recording(&mut self) -> Option<u8> {
        let slot = self.recording.take()?;
        let events = &mut self.slots[slot as usize];
        while events.last().is_some_and(|e| e.pressed) {
            events.pop();
        }
        info!("Dynamic macro {} recorded, {} events", slot, events.len());
        Some(slot)
    }

    pub fn record(&mut self, action: Action, pressed: bool) -> RecordOutcome {
        let Some(slot) = self.recording else {
            return RecordOutcome::NotRecording;
        };
        match self.slots[slot as usize].push(MacroEvent { action, pressed }) {
            Ok(_) => RecordOutcome::Recorded,
            Err(_) => {
                warn!("Dynamic macro {} is full", slot);
                RecordOutcome::Full
            }
        }
    }

    pub fn events(&self, slot: u8) -> &[MacroEvent] {
        self.slots.get(slot as usize).map(|e| e.as_slice()).unwrap_or(&[])
    }
}

use core::cell::RefCell;

use embassy_futures::select::{Either, select};
use embassy_futures::yield_now;
use embassy_time::{Instant, Timer};
use usbd_hid::descriptor::{MediaKeyboardReport, MouseReport};

use crate::action::{Action, AudioAction, DynamicMacroAction, KeyAction, LightAction};
use crate::audio::AudioState;
use crate::config::{ChannelConfig, LightConfig, TAP_DANCE_MAX_NUM};
use crate::dynamic_macro::{DynamicMacros, RecordOutcome};
use crate::event::{Direction, KeyPos, KeyboardEvent, KeyboardEventPos};
use crate::hid::{KeyboardReport, Report};
use crate::keycode::{ConsumerKey, HidKeyCode, KeyCode};
use crate::keymap::KeyMap;
use crate::light::{RgblightMode, RgblightState};
use crate::modifier::{HidModifiers, ModifierCombination};
use crate::tap_dance::{TapDanceProgress, TapDanceState};

mod user;

pub struct Keyboard<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize, const NUM_ENCODER: usize = 0> {
    /// Keymap
    pub(crate) keymap: &'a RefCell<KeyMap<'a, ROW, COL, NUM_LAYER, NUM_ENCODER>>,

    /// Channels for reports, audio commands and the underglow state
    channels: &'a ChannelConfig,

    /// The held modifiers for the keyboard hid report
    held_modifiers: HidModifiers,

    /// The modifiers coming from `Action::KeyWithModifier`, only while the key is pressed
    with_modifiers: HidModifiers,

    /// The held keys for the keyboard hid report, except the modifiers
    held_keycodes: [HidKeyCode; 6],

    /// Internal mouse report buf
    mouse_report: MouseReport,

    /// Internal media report buf
    media_report: MediaKeyboardReport,

    /// Tap dances in progress, indexed by the tap dance number
    tap_dances: [Option<TapDanceProgress>; TAP_DANCE_MAX_NUM],

    /// Underglow
    pub(crate) light: RgblightState,
    pub(crate) light_config: LightConfig,
    /// Toggle the underglow on every ordinary key event
    pub(crate) blinky: bool,

    pub(crate) audio: AudioState,

    pub(crate) dynamic_macros: DynamicMacros,

    /// Wheel ticks per encoder detent while shift is held
    aggressive_scroll_rate: u8,
}

impl<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize, const NUM_ENCODER: usize>
    Keyboard<'a, ROW, COL, NUM_LAYER, NUM_ENCODER>
{
    pub fn new(keymap: &'a RefCell<KeyMap<'a, ROW, COL, NUM_LAYER, NUM_ENCODER>>, channels: &'a ChannelConfig) -> Self {
        let (light_config, audio, aggressive_scroll_rate) = {
            let keymap_ref = keymap.borrow();
            let behavior = &keymap_ref.behavior;
            (
                behavior.light,
                AudioState::new(&behavior.audio),
                behavior.encoder.aggressive_scroll_rate.max(1),
            )
        };

        Keyboard {
            keymap,
            channels,
            held_modifiers: HidModifiers::default(),
            with_modifiers: HidModifiers::default(),
            held_keycodes: [HidKeyCode::No; 6],
            mouse_report: MouseReport {
                buttons: 0,
                x: 0,
                y: 0,
                wheel: 0,
                pan: 0,
            },
            media_report: MediaKeyboardReport { usage_id: 0 },
            tap_dances: Default::default(),
            light: RgblightState::default(),
            light_config,
            blinky: light_config.blinky,
            audio,
            dynamic_macros: DynamicMacros::new(),
            aggressive_scroll_rate,
        }
    }

    /// Main loop: wait for key events, and for the end of the running tap dance.
    pub async fn run(&mut self) -> ! {
        self.post_init();
        loop {
            let event = match self.next_deadline() {
                Some(deadline) => {
                    match select(Timer::at(deadline), self.channels.key_event_channel.receive()).await {
                        Either::First(_) => {
                            self.process_timeout().await;
                            continue;
                        }
                        Either::Second(event) => event,
                    }
                }
                None => self.channels.key_event_channel.receive().await,
            };
            self.process_event(event).await;
        }
    }

    /// Initial underglow: on, default color, static mode. Nothing is persisted.
    pub fn post_init(&mut self) {
        self.light.enable();
        self.light.set_hsv(self.light_config.default_hsv);
        self.light.set_mode(RgblightMode::StaticLight);
        self.publish_light();
    }

    pub async fn process_event(&mut self, event: KeyboardEvent) {
        // Events can arrive after a deadline passed but before the timer fired
        self.process_timeout().await;

        match event.pos {
            KeyboardEventPos::Key(pos) => self.process_key(pos, event.pressed).await,
            KeyboardEventPos::RotaryEncoder(encoder) => {
                // One action per detent
                if event.pressed {
                    self.process_encoder(encoder.id, encoder.direction).await;
                }
            }
        }
    }

    /// Finish the tap dances whose tapping term has elapsed
    pub async fn process_timeout(&mut self) {
        let now = Instant::now();
        for index in 0..TAP_DANCE_MAX_NUM {
            let expired = self.tap_dances[index]
                .as_ref()
                .is_some_and(|progress| progress.is_expired(now));
            if expired {
                self.finish_tap_dance(index, false).await;
            }
        }
    }

    /// The earliest instant a running tap dance ends
    pub fn next_deadline(&self) -> Option<Instant> {
        self.tap_dances.iter().flatten().filter_map(|p| p.deadline()).min()
    }

    pub fn light_state(&self) -> RgblightState {
        self.light
    }

    pub fn blinky(&self) -> bool {
        self.blinky
    }

    pub fn is_layer_active(&self, layer_num: u8) -> bool {
        self.keymap.borrow().is_layer_active(layer_num)
    }

    pub fn is_recording(&self) -> bool {
        self.dynamic_macros.is_recording()
    }

    pub fn audio_state(&self) -> AudioState {
        self.audio
    }

    async fn process_key(&mut self, pos: KeyPos, pressed: bool) {
        if pressed {
            self.audio.click(&self.channels.audio_channel);
        }

        let key_action = self.keymap.borrow_mut().get_action_with_layer_cache(pos, pressed);
        debug!("Key ({}, {}) pressed: {}, action: {:?}", pos.row, pos.col, pressed, key_action);

        // Pressing any other key ends a running tap dance
        if pressed {
            let current = match key_action {
                KeyAction::TapDance(index) => Some(index as usize),
                _ => None,
            };
            self.interrupt_tap_dances(current).await;
        }

        self.process_key_action(key_action, pressed).await;
    }

    async fn process_key_action(&mut self, key_action: KeyAction, pressed: bool) {
        if !self.process_record_user(key_action, pressed).await {
            return;
        }

        match key_action {
            KeyAction::No | KeyAction::Transparent => (),
            KeyAction::Single(Action::DynamicMacro(macro_action)) => {
                if pressed {
                    self.process_action_dynamic_macro(macro_action).await;
                }
            }
            KeyAction::Single(action) => {
                self.record(action, pressed);
                self.process_action(action, pressed).await;
            }
            KeyAction::Tap(action) => {
                if pressed {
                    self.record(action, true);
                    self.record(action, false);
                    self.tap_action(action).await;
                }
            }
            KeyAction::TapDance(index) => self.process_tap_dance(index as usize, pressed).await,
        }
    }

    async fn process_encoder(&mut self, id: u8, direction: Direction) {
        let key_action = self.keymap.borrow().get_encoder_action(id, direction);
        let action = match key_action {
            KeyAction::Single(action) | KeyAction::Tap(action) => action,
            KeyAction::No | KeyAction::Transparent => return,
            KeyAction::TapDance(_) => {
                warn!("Tap dance is not supported on encoders");
                return;
            }
        };

        // Scroll faster while shift is held
        let is_wheel = action.hid_keycode().is_some_and(|k| k.is_mouse_wheel());
        let repeat = if is_wheel && self.held_modifiers.shift() {
            self.aggressive_scroll_rate
        } else {
            1
        };
        debug!("Encoder {} {:?}: {:?} x{}", id, direction, action, repeat);

        for _ in 0..repeat {
            self.tap_action(action).await;
        }
    }

    /// Press then release, without waiting in between
    pub(crate) async fn tap_action(&mut self, action: Action) {
        self.process_action(action, true).await;
        self.process_action(action, false).await;
    }

    async fn process_action(&mut self, action: Action, pressed: bool) {
        match action {
            Action::No | Action::Transparent => (),
            Action::Key(key) => self.process_action_key(key, pressed).await,
            Action::Modifier(modifiers) => {
                if pressed {
                    self.register_modifiers(modifiers);
                } else {
                    self.unregister_modifiers(modifiers);
                }
                self.send_keyboard_report().await;
            }
            Action::KeyWithModifier(key, modifiers) => {
                // These modifiers are pressed and released in the same report as the key
                if pressed {
                    self.with_modifiers |= modifiers.to_hid_modifiers();
                } else {
                    self.with_modifiers &= !modifiers.to_hid_modifiers();
                }
                self.process_action_key(key, pressed).await;
            }
            Action::LayerOn(layer_num) => {
                if pressed {
                    self.keymap.borrow_mut().activate_layer(layer_num);
                } else {
                    self.keymap.borrow_mut().deactivate_layer(layer_num);
                }
            }
            Action::LayerOff(layer_num) => {
                if pressed {
                    self.keymap.borrow_mut().deactivate_layer(layer_num);
                }
            }
            Action::LayerToggle(layer_num) => {
                // Toggle a layer when the key is released
                if !pressed {
                    self.keymap.borrow_mut().toggle_layer(layer_num);
                }
            }
            Action::DefaultLayer(layer_num) => {
                if pressed {
                    self.keymap.borrow_mut().set_default_layer(layer_num);
                }
            }
            Action::Light(light_action) => {
                if pressed {
                    self.process_action_light(light_action);
                }
            }
            Action::Audio(audio_action) => {
                if pressed {
                    self.process_action_audio(audio_action);
                }
            }
            // Dynamic macro keys are handled in `process_key_action`, custom keys in `process_record_user`
            Action::DynamicMacro(_) | Action::Custom(_) => (),
        }
    }

    async fn process_action_key(&mut self, key: KeyCode, pressed: bool) {
        match key {
            KeyCode::Consumer(consumer) => self.process_action_consumer_control(consumer, pressed).await,
            KeyCode::Hid(hid) => {
                if let Some(consumer) = hid.process_as_consumer() {
                    self.process_action_consumer_control(consumer, pressed).await;
                } else if hid.is_mouse_key() {
                    self.process_action_mouse(hid, pressed).await;
                } else {
                    self.process_basic(hid, pressed).await;
                }
            }
        }
    }

    async fn process_basic(&mut self, key: HidKeyCode, pressed: bool) {
        if key.is_modifier() {
            if pressed {
                self.register_modifiers(key.to_hid_modifiers());
            } else {
                self.unregister_modifiers(key.to_hid_modifiers());
            }
        } else if pressed {
            self.register_keycode(key);
        } else {
            self.unregister_keycode(key);
        }

        self.send_keyboard_report().await;
    }

    /// Process consumer control action. Consumer control keys are keys in hid consumer page, such as media keys.
    async fn process_action_consumer_control(&mut self, key: ConsumerKey, pressed: bool) {
        self.media_report.usage_id = if pressed { key as u16 } else { 0 };
        self.send_report(Report::MediaKeyboardReport(self.media_report)).await;
    }

    /// Process mouse key action. Wheel keys scroll one tick per press.
    async fn process_action_mouse(&mut self, key: HidKeyCode, pressed: bool) {
        let button = match key {
            HidKeyCode::MouseBtn1 => Some(0),
            HidKeyCode::MouseBtn2 => Some(1),
            HidKeyCode::MouseBtn3 => Some(2),
            HidKeyCode::MouseBtn4 => Some(3),
            HidKeyCode::MouseBtn5 => Some(4),
            HidKeyCode::MouseBtn6 => Some(5),
            HidKeyCode::MouseBtn7 => Some(6),
            HidKeyCode::MouseBtn8 => Some(7),
            _ => None,
        };

        if let Some(bit) = button {
            if pressed {
                self.mouse_report.buttons |= 1 << bit;
            } else {
                self.mouse_report.buttons &= !(1 << bit);
            }
        } else {
            let delta = if pressed { 1 } else { 0 };
            match key {
                HidKeyCode::MouseUp => self.mouse_report.y = -delta,
                HidKeyCode::MouseDown => self.mouse_report.y = delta,
                HidKeyCode::MouseLeft => self.mouse_report.x = -delta,
                HidKeyCode::MouseRight => self.mouse_report.x = delta,
                HidKeyCode::MouseWheelUp => self.mouse_report.wheel = delta,
                HidKeyCode::MouseWheelDown => self.mouse_report.wheel = -delta,
                HidKeyCode::MouseWheelLeft => self.mouse_report.pan = -delta,
                HidKeyCode::MouseWheelRight => self.mouse_report.pan = delta,
                _ => return,
            }
        }

        self.send_report(Report::MouseReport(self.mouse_report)).await;
    }

    fn process_action_light(&mut self, action: LightAction) {
        match action {
            LightAction::Toggle => self.light.toggle(),
            LightAction::On => self.light.enable(),
            LightAction::Off => self.light.disable(),
        }
        self.publish_light();
    }

    fn process_action_audio(&mut self, action: AudioAction) {
        let channel = &self.channels.audio_channel;
        match action {
            AudioAction::On => self.audio.turn_on(channel),
            AudioAction::Off => self.audio.turn_off(channel),
            AudioAction::Toggle => self.audio.toggle(channel),
            AudioAction::ClickyOn => self.audio.clicky = true,
            AudioAction::ClickyOff => self.audio.clicky = false,
            AudioAction::ClickyToggle => self.audio.clicky = !self.audio.clicky,
        }
        debug!("Audio enabled: {}, clicky: {}", self.audio.enabled, self.audio.clicky);
    }

    async fn process_action_dynamic_macro(&mut self, action: DynamicMacroAction) {
        // Any dynamic macro key ends a recording
        if self.dynamic_macros.is_recording() {
            self.dynamic_macros.stop_recording();
            return;
        }

        match action {
            DynamicMacroAction::RecordStart(slot) => {
                self.dynamic_macros.start_recording(slot);
            }
            DynamicMacroAction::RecordStop => (),
            DynamicMacroAction::Play(slot) => {
                let len = self.dynamic_macros.events(slot).len();
                debug!("Playing dynamic macro {}, {} events", slot, len);
                // Recorded events are output actions only, they are replayed like key presses
                for i in 0..len {
                    let event = self.dynamic_macros.events(slot)[i];
                    if self.process_record_user(KeyAction::Single(event.action), event.pressed).await {
                        self.process_action(event.action, event.pressed).await;
                    }
                }
            }
        }
    }

    /// Append an output action to the dynamic macro being recorded
    fn record(&mut self, action: Action, pressed: bool) {
        if !action.is_output() {
            return;
        }
        if self.dynamic_macros.record(action, pressed) == RecordOutcome::Full {
            self.dynamic_macro_full();
        }
    }

    async fn process_tap_dance(&mut self, index: usize, pressed: bool) {
        if index >= TAP_DANCE_MAX_NUM {
            warn!("Invalid tap dance index {}", index);
            return;
        }

        let now = Instant::now();
        if pressed {
            if let Some(progress) = self.tap_dances[index].as_mut().filter(|p| !p.finished) {
                progress.press(now);
                return;
            }
            let tapping_term = match self.keymap.borrow().behavior.tap_dance.tap_dances.get(index) {
                Some(tap_dance) => tap_dance.tapping_term,
                None => {
                    warn!("Tap dance {} is not configured", index);
                    return;
                }
            };
            self.tap_dances[index] = Some(TapDanceProgress::new(tapping_term, now));
        } else {
            let finished = match &mut self.tap_dances[index] {
                Some(progress) => {
                    progress.release();
                    progress.finished
                }
                None => return,
            };
            if finished {
                self.reset_tap_dance(index).await;
            }
        }
    }

    /// Pressing another key ends every running tap dance except the pressed one
    async fn interrupt_tap_dances(&mut self, current: Option<usize>) {
        for index in 0..TAP_DANCE_MAX_NUM {
            if Some(index) == current {
                continue;
            }
            let running = self.tap_dances[index].as_ref().is_some_and(|p| !p.finished);
            if running {
                self.finish_tap_dance(index, true).await;
            }
        }
    }

    /// Decide the outcome and register its action. The action is released right away if the key is up.
    async fn finish_tap_dance(&mut self, index: usize, interrupted: bool) {
        let Some(progress) = self.tap_dances[index].as_mut() else {
            return;
        };
        let state = progress.finish(interrupted);
        let pressed = progress.pressed;
        debug!("Tap dance {} finished: {:?}", index, state);

        self.tap_dance_user(index as u8, state, true);
        if let Some(action) = self.tap_dance_action(index, state) {
            self.record(action, true);
            self.process_action(action, true).await;
        }

        if !pressed {
            self.reset_tap_dance(index).await;
        }
    }

    async fn reset_tap_dance(&mut self, index: usize) {
        let Some(progress) = self.tap_dances[index].take() else {
            return;
        };
        let state = progress.state;
        debug!("Tap dance {} reset: {:?}", index, state);

        self.tap_dance_user(index as u8, state, false);
        if let Some(action) = self.tap_dance_action(index, state) {
            self.record(action, false);
            self.process_action(action, false).await;
        }
    }

    fn tap_dance_action(&self, index: usize, state: TapDanceState) -> Option<Action> {
        let keymap = self.keymap.borrow();
        let tap_dance = keymap.behavior.tap_dance.tap_dances.get(index)?;
        match tap_dance.action_for(state) {
            KeyAction::Single(action) | KeyAction::Tap(action) => Some(action),
            _ => None,
        }
    }

    pub(crate) fn publish_light(&self) {
        self.channels.light_signal.signal(self.light);
    }

    async fn send_report(&self, report: Report) {
        self.channels.keyboard_report_channel.send(report).await;
        // Yield once after sending the report to channel
        yield_now().await;
    }

    async fn send_keyboard_report(&mut self) {
        let modifiers = self.held_modifiers | self.with_modifiers;
        self.send_report(Report::KeyboardReport(KeyboardReport {
            modifier: modifiers.into_bits(),
            reserved: 0,
            leds: 0,
            keycodes: self.held_keycodes.map(|k| k as u8),
        }))
        .await;
    }

    /// Register a key to be sent in hid report.
    fn register_keycode(&mut self, key: HidKeyCode) {
        if self.held_keycodes.contains(&key) {
            return;
        }
        match self.held_keycodes.iter().position(|&k| k == HidKeyCode::No) {
            Some(index) => self.held_keycodes[index] = key,
            None => warn!("Too many keys pressed, {:?} dropped", key),
        }
    }

    /// Unregister a key from hid report.
    fn unregister_keycode(&mut self, key: HidKeyCode) {
        if let Some(index) = self.held_keycodes.iter().position(|&k| k == key) {
            self.held_keycodes[index] = HidKeyCode::No;
        }
    }

    fn register_modifiers(&mut self, modifiers: ModifierCombination) {
        self.held_modifiers |= modifiers.to_hid_modifiers();
    }

    fn unregister_modifiers(&mut self, modifiers: ModifierCombination) {
        self.held_modifiers &= !modifiers.to_hid_modifiers();
    }
}

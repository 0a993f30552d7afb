use crate::action::{EncoderAction, KeyAction};
use crate::config::BehaviorConfig;
use crate::event::{Direction, KeyPos};

/// Keymap bound to the 5x12 matrix and the rotary encoders.
///
/// Actions are looked up by `(row, col)` starting from the highest active layer, the lowest
/// checked layer is the default layer.
pub struct KeyMap<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize, const NUM_ENCODER: usize = 0> {
    /// Layers
    pub(crate) layers: &'a mut [[[KeyAction; COL]; ROW]; NUM_LAYER],
    /// Rotary encoders, each rotary encoder is represented as (Clockwise, CounterClockwise)
    pub(crate) encoders: Option<&'a mut [[EncoderAction; NUM_ENCODER]; NUM_LAYER]>,
    /// Bit `n` is set when layer `n` is activated
    layer_state: u32,
    /// Default layer number, max: 32
    default_layer: u8,
    /// The layer each pressed key was resolved on
    layer_cache: [[u8; COL]; ROW],
    /// Options for configurable action behavior
    pub(crate) behavior: BehaviorConfig,
}

impl<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize, const NUM_ENCODER: usize>
    KeyMap<'a, ROW, COL, NUM_LAYER, NUM_ENCODER>
{
    pub fn new(
        action_map: &'a mut [[[KeyAction; COL]; ROW]; NUM_LAYER],
        encoder_map: Option<&'a mut [[EncoderAction; NUM_ENCODER]; NUM_LAYER]>,
        behavior: BehaviorConfig,
    ) -> Self {
        KeyMap {
            layers: action_map,
            encoders: encoder_map,
            layer_state: 0,
            default_layer: 0,
            layer_cache: [[0; COL]; ROW],
            behavior,
        }
    }

    pub fn get_default_layer(&self) -> u8 {
        self.default_layer
    }

    pub fn set_default_layer(&mut self, layer_num: u8) {
        if !self.is_valid_layer(layer_num) {
            return;
        }
        info!("Default layer set to {}", layer_num);
        self.default_layer = layer_num;
    }

    /// Fetch the action in keymap, with layer cache.
    ///
    /// On press, the layer the action was found on is saved, the following release reads the
    /// action from that same layer.
    pub fn get_action_with_layer_cache(&mut self, pos: KeyPos, pressed: bool) -> KeyAction {
        let row = pos.row as usize;
        let col = pos.col as usize;
        if row >= ROW || col >= COL {
            warn!("Key position ({}, {}) is out of the matrix", pos.row, pos.col);
            return KeyAction::No;
        }

        if !pressed {
            // Releasing a pressed key, use cached layer and restore the cache
            let layer = self.pop_layer_from_cache(row, col);
            return self.layers[layer as usize][row][col];
        }

        match self.resolve(|layer| layer[row][col]) {
            Some((layer_idx, action)) => {
                self.layer_cache[row][col] = layer_idx as u8;
                action
            }
            None => KeyAction::No,
        }
    }

    /// Resolve the action of an encoder turn, transparent entries fall through to lower layers.
    pub fn get_encoder_action(&self, id: u8, direction: Direction) -> KeyAction {
        let Some(encoders) = &self.encoders else {
            return KeyAction::No;
        };
        if id as usize >= NUM_ENCODER {
            return KeyAction::No;
        }

        for layer_idx in self.active_layers_top_down() {
            let encoder = encoders[layer_idx][id as usize];
            let action = match direction {
                Direction::Clockwise => encoder.clockwise(),
                Direction::CounterClockwise => encoder.counter_clockwise(),
                Direction::None => return KeyAction::No,
            };
            if action != KeyAction::Transparent {
                return action;
            }
        }

        KeyAction::No
    }

    /// The highest activated layer
    pub fn get_activated_layer(&self) -> u8 {
        self.active_layers_top_down()
            .next()
            .map(|l| l as u8)
            .unwrap_or(self.default_layer)
    }

    /// Same as QMK's `layer_state_is`: when no layer bit is set, only layer 0 counts as active.
    pub fn is_layer_active(&self, layer_num: u8) -> bool {
        if self.layer_state == 0 {
            return layer_num == 0;
        }
        layer_num < 32 && self.layer_state & (1 << layer_num) != 0
    }

    /// Activate given layer
    pub fn activate_layer(&mut self, layer_num: u8) {
        if !self.is_valid_layer(layer_num) {
            return;
        }
        self.layer_state |= 1 << layer_num;
        debug!("Layer {} on, layer state: {:#b}", layer_num, self.layer_state);
    }

    /// Deactivate given layer
    pub fn deactivate_layer(&mut self, layer_num: u8) {
        if !self.is_valid_layer(layer_num) {
            return;
        }
        self.layer_state &= !(1 << layer_num);
        debug!("Layer {} off, layer state: {:#b}", layer_num, self.layer_state);
    }

    /// Toggle given layer
    pub fn toggle_layer(&mut self, layer_num: u8) {
        if !self.is_valid_layer(layer_num) {
            return;
        }
        self.layer_state ^= 1 << layer_num;
        debug!("Layer {} toggled, layer state: {:#b}", layer_num, self.layer_state);
    }

    fn is_valid_layer(&self, layer_num: u8) -> bool {
        if layer_num as usize >= NUM_LAYER {
            warn!(
                "Not a valid layer {}, keyboard supports only {} layers",
                layer_num, NUM_LAYER
            );
            return false;
        }
        true
    }

    fn is_layer_on(&self, layer_idx: usize) -> bool {
        self.layer_state & (1 << layer_idx) != 0 || layer_idx as u8 == self.default_layer
    }

    /// Indices of the layers taking part in the lookup, from the highest one down to the default layer
    fn active_layers_top_down(&self) -> impl Iterator<Item = usize> + '_ {
        let default_layer = self.default_layer as usize;
        (default_layer..NUM_LAYER).rev().filter(move |&l| self.is_layer_on(l))
    }

    fn resolve<F>(&self, lookup: F) -> Option<(usize, KeyAction)>
    where
        F: Fn(&[[KeyAction; COL]; ROW]) -> KeyAction,
    {
        self.active_layers_top_down()
            .map(|layer_idx| (layer_idx, lookup(&self.layers[layer_idx])))
            .find(|(_, action)| *action != KeyAction::Transparent)
    }

    fn pop_layer_from_cache(&mut self, row: usize, col: usize) -> u8 {
        let layer = self.layer_cache[row][col];
        self.layer_cache[row][col] = self.default_layer;

        layer
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

    fn pos(row: u8, col: u8) -> KeyPos {
        KeyPos { row, col }
    }

    #[test]
    fn test_transparent_falls_through() {
        let mut layers = [
            [[key(HidKeyCode::A), key(HidKeyCode::B)]],
            [[KeyAction::Transparent, key(HidKeyCode::C)]],
        ];
        let mut keymap: KeyMap<1, 2, 2> = KeyMap::new(&mut layers, None, BehaviorConfig::default());
        keymap.activate_layer(1);
        assert_eq!(keymap.get_action_with_layer_cache(pos(0, 0), true), key(HidKeyCode::A));
        assert_eq!(keymap.get_action_with_layer_cache(pos(0, 1), true), key(HidKeyCode::C));
        assert_eq!(keymap.get_activated_layer(), 1);
    }

    #[test]
    fn test_release_uses_cached_layer() {
        let mut layers = [[[key(HidKeyCode::A)]], [[key(HidKeyCode::B)]]];
        let mut keymap: KeyMap<1, 1, 2> = KeyMap::new(&mut layers, None, BehaviorConfig::default());
        keymap.activate_layer(1);
        assert_eq!(keymap.get_action_with_layer_cache(pos(0, 0), true), key(HidKeyCode::B));
        keymap.deactivate_layer(1);
        assert_eq!(keymap.get_action_with_layer_cache(pos(0, 0), false), key(HidKeyCode::B));
        // Cache restored to the default layer
        assert_eq!(keymap.get_action_with_layer_cache(pos(0, 0), false), key(HidKeyCode::A));
    }

    #[test]
    fn test_layer_state_is() {
        let mut layers = [[[KeyAction::No]]; 3];
        let mut keymap: KeyMap<1, 1, 3> = KeyMap::new(&mut layers, None, BehaviorConfig::default());
        assert!(keymap.is_layer_active(0));
        assert!(!keymap.is_layer_active(1));
        keymap.toggle_layer(1);
        assert!(!keymap.is_layer_active(0));
        assert!(keymap.is_layer_active(1));
        keymap.toggle_layer(1);
        assert!(keymap.is_layer_active(0));
    }

    #[test]
    fn test_invalid_layer_is_ignored() {
        let mut layers = [[[KeyAction::No]]; 2];
        let mut keymap: KeyMap<1, 1, 2> = KeyMap::new(&mut layers, None, BehaviorConfig::default());
        keymap.activate_layer(5);
        keymap.toggle_layer(2);
        assert_eq!(keymap.get_activated_layer(), 0);
        keymap.set_default_layer(9);
        assert_eq!(keymap.get_default_layer(), 0);
    }

    #[test]
    fn test_encoder_fall_through() {
        let mut layers = [[[KeyAction::No]]; 3];
        let mut encoders = [
            [EncoderAction::new(key(HidKeyCode::MouseWheelUp), key(HidKeyCode::MouseWheelDown))],
            [EncoderAction::transparent()],
            [EncoderAction::new(KeyAction::Transparent, key(HidKeyCode::F3))],
        ];
        let mut keymap: KeyMap<1, 1, 3, 1> = KeyMap::new(&mut layers, Some(&mut encoders), BehaviorConfig::default());
        keymap.activate_layer(1);
        assert_eq!(
            keymap.get_encoder_action(0, Direction::Clockwise),
            key(HidKeyCode::MouseWheelUp)
        );
        keymap.activate_layer(2);
        assert_eq!(
            keymap.get_encoder_action(0, Direction::Clockwise),
            key(HidKeyCode::MouseWheelUp)
        );
        assert_eq!(keymap.get_encoder_action(0, Direction::CounterClockwise), key(HidKeyCode::F3));
        assert_eq!(keymap.get_encoder_action(1, Direction::Clockwise), KeyAction::No);
    }
}

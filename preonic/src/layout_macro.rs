/// Create a layer in keymap
#[macro_export]
macro_rules! layer {
    ([$([$($x: expr), +]), +]) => {
        [$([$($x), +]),+]
    };
}

/// Create a normal key. For example, `k!(A)` represents `KeyAction::Single(Action::Key(KeyCode::Hid(HidKeyCode::A)))`
#[macro_export]
macro_rules! k {
    ($k: ident) => {
        $crate::action::KeyAction::Single($crate::action::Action::Key($crate::keycode::KeyCode::Hid(
            $crate::keycode::HidKeyCode::$k,
        )))
    };
}

/// Create a key which is pressed and released at once
#[macro_export]
macro_rules! tap {
    ($k: ident) => {
        $crate::action::KeyAction::Tap($crate::action::Action::Key($crate::keycode::KeyCode::Hid(
            $crate::keycode::HidKeyCode::$k,
        )))
    };
}

/// Create a normal key with modifier action
#[macro_export]
macro_rules! wm {
    ($x: ident, $m: expr) => {
        $crate::action::KeyAction::Single($crate::action::Action::KeyWithModifier(
            $crate::keycode::KeyCode::Hid($crate::keycode::HidKeyCode::$x),
            $m,
        ))
    };
}

/// Create a shifted key, `shifted!(Quote)` sends `"`
#[macro_export]
macro_rules! shifted {
    ($x: ident) => {
        $crate::wm!($x, $crate::modifier::ModifierCombination::LSHIFT)
    };
}

/// Create a normal action: `KeyAction`
#[macro_export]
macro_rules! a {
    ($a: ident) => {
        $crate::action::KeyAction::$a
    };
}

/// Create a layer activate action. For example, `mo!(1)` activates layer 1.
#[macro_export]
macro_rules! mo {
    ($x: expr) => {
        $crate::action::KeyAction::Single($crate::action::Action::LayerOn($x))
    };
}

/// Create a layer toggle action
#[macro_export]
macro_rules! tg {
    ($x: expr) => {
        $crate::action::KeyAction::Single($crate::action::Action::LayerToggle($x))
    };
}

/// create a switch default layer action, `n` is the layer number
#[macro_export]
macro_rules! df {
    ($x: expr) => {
        $crate::action::KeyAction::Single($crate::action::Action::DefaultLayer($x))
    };
}

/// Create a tap dance key, the number is the index in the tap dance config
#[macro_export]
macro_rules! td {
    ($x: expr) => {
        $crate::action::KeyAction::TapDance($x)
    };
}

/// Create a key of the keymap's own keycodes, e.g. `ck!(RgbOn)`
#[macro_export]
macro_rules! ck {
    ($x: ident) => {
        $crate::action::KeyAction::Single($crate::action::Action::Custom($crate::action::CustomKey::$x))
    };
}

/// Create an audio key, e.g. `au!(ClickyOn)`
#[macro_export]
macro_rules! au {
    ($x: ident) => {
        $crate::action::KeyAction::Single($crate::action::Action::Audio($crate::action::AudioAction::$x))
    };
}

/// Create a dynamic macro key: `dm!(rec 0)`, `dm!(play 0)` or `dm!(stop)`
#[macro_export]
macro_rules! dm {
    (rec $x: expr) => {
        $crate::action::KeyAction::Single($crate::action::Action::DynamicMacro(
            $crate::action::DynamicMacroAction::RecordStart($x),
        ))
    };
    (play $x: expr) => {
        $crate::action::KeyAction::Single($crate::action::Action::DynamicMacro(
            $crate::action::DynamicMacroAction::Play($x),
        ))
    };
    (stop) => {
        $crate::action::KeyAction::Single($crate::action::Action::DynamicMacro(
            $crate::action::DynamicMacroAction::RecordStop,
        ))
    };
}

/// Create an encoder action, the first argument is the clockwise action, the second is the counter-clockwise action
#[macro_export]
macro_rules! encoder {
    ($clockwise: expr, $counter_clockwise: expr) => {
        $crate::action::EncoderAction::new($clockwise, $counter_clockwise)
    };
}

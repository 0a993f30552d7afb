extern crate preonic;

// a rust macro to map a key name to its hid usage as u8
#[macro_export]
macro_rules! kc_to_u8 {
    ($key: ident) => {
        preonic::keycode::HidKeyCode::$key as u8
    };
}

// a rust macro to build the 6 keycodes of a keyboard report, `keys!(A, B)`
#[macro_export]
macro_rules! keys {
    () => {
        [0u8; 6]
    };
    ($($key: ident),+ $(,)?) => {{
        let mut keycodes = [0u8; 6];
        for (i, key) in [$($crate::kc_to_u8!($key)),+].into_iter().enumerate() {
            keycodes[i] = key;
        }
        keycodes
    }};
}

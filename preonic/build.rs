use std::path::{Path, PathBuf};
use std::{env, fs};

use const_gen::*;
use preonic_config::KeyboardTomlConfig;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=keyboard.toml");
    println!("cargo:rerun-if-env-changed=KEYBOARD_TOML_PATH");

    // Use KEYBOARD_TOML_PATH if it's set, otherwise the keyboard.toml next to this crate
    let toml_path = match env::var("KEYBOARD_TOML_PATH") {
        Ok(path) => {
            println!("cargo:rerun-if-changed={path}");
            Some(PathBuf::from(path))
        }
        Err(_) => {
            let local = Path::new(&env::var("CARGO_MANIFEST_DIR").unwrap()).join("keyboard.toml");
            local.exists().then_some(local)
        }
    };

    let config = match KeyboardTomlConfig::load(toml_path.as_ref()) {
        Ok(config) => config,
        Err(e) => panic!("❌ Parse `keyboard.toml` error: {e}"),
    };

    let constants = get_constants_str(&config);

    // Write to constants.rs file
    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("constants.rs");
    fs::write(&dest_path, constants).expect("Failed to write constants.rs file");
}

fn get_constants_str(config: &KeyboardTomlConfig) -> String {
    let layout = config.layout();
    let encoder = config.encoder();
    let rgb = config.rgb();
    let audio = config.audio();
    let behavior = config.behavior();
    let channel = config.channel();

    let keyboard_name = config.keyboard().name;
    let row = layout.rows as usize;
    let col = layout.cols as usize;
    let num_layer = layout.layers as usize;
    let num_encoder = encoder.num as usize;

    [
        const_declaration!(pub KEYBOARD_NAME = keyboard_name.as_str()),
        const_declaration!(pub ROW = row),
        const_declaration!(pub COL = col),
        const_declaration!(pub NUM_LAYER = num_layer),
        const_declaration!(pub NUM_ENCODER = num_encoder),
        const_declaration!(pub RGBLED_NUM = rgb.led_num),
        const_declaration!(pub(crate) DEFAULT_HUE = rgb.hue),
        const_declaration!(pub(crate) DEFAULT_SAT = rgb.sat),
        const_declaration!(pub(crate) DEFAULT_VAL = rgb.val),
        const_declaration!(pub(crate) DEFAULT_BLINKY = rgb.blinky),
        const_declaration!(pub(crate) AUDIO_ENABLED = audio.enabled),
        const_declaration!(pub(crate) AUDIO_CLICKY = audio.clicky),
        const_declaration!(pub(crate) AUDIO_TEMPO = audio.tempo),
        const_declaration!(pub(crate) TAPPING_TERM_MS = behavior.tapping_term),
        const_declaration!(pub(crate) AGGRESSIVE_SCROLL_RATE = encoder.aggressive_scroll_rate),
        const_declaration!(pub(crate) DYNAMIC_MACRO_SIZE = behavior.dynamic_macro_size),
        const_declaration!(pub(crate) EVENT_CHANNEL_SIZE = channel.event_channel_size),
        const_declaration!(pub(crate) REPORT_CHANNEL_SIZE = channel.report_channel_size),
        const_declaration!(pub(crate) AUDIO_CHANNEL_SIZE = channel.audio_channel_size),
    ]
    .join("\n")
}

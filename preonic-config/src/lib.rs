use std::path::Path;

use config::{Config, File, FileFormat};
use serde::de;
use serde_derive::Deserialize;
use serde_inline_default::serde_inline_default;

pub mod error;
mod validation;

pub use error::{ConfigError, ConfigResult};

/// Defaults of the board, merged below the user's keyboard.toml
pub const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Configurations for the keymap firmware, parsed from keyboard.toml
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyboardTomlConfig {
    keyboard: Option<KeyboardInfo>,
    layout: Option<LayoutConfig>,
    encoder: Option<EncoderConfig>,
    rgb: Option<RgbConfig>,
    audio: Option<AudioConfig>,
    behavior: Option<BehaviorConfig>,
    channel: Option<ChannelConfig>,
}

#[serde_inline_default]
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyboardInfo {
    #[serde_inline_default("Preonic".to_string())]
    pub name: String,
}

impl Default for KeyboardInfo {
    fn default() -> Self {
        Self {
            name: "Preonic".to_string(),
        }
    }
}

/// Size of the key matrix and the number of layers
#[serde_inline_default]
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutConfig {
    #[serde_inline_default(5)]
    pub rows: u8,
    #[serde_inline_default(12)]
    pub cols: u8,
    #[serde_inline_default(5)]
    pub layers: u8,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            rows: 5,
            cols: 12,
            layers: 5,
        }
    }
}

#[serde_inline_default]
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EncoderConfig {
    /// Number of rotary encoders
    #[serde_inline_default(1)]
    pub num: u8,
    /// Number of wheel ticks per detent while shift is held
    #[serde_inline_default(50)]
    pub aggressive_scroll_rate: u8,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            num: 1,
            aggressive_scroll_rate: 50,
        }
    }
}

/// RGB underglow
#[serde_inline_default]
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RgbConfig {
    #[serde_inline_default(9)]
    pub led_num: usize,
    #[serde_inline_default(36)]
    pub hue: u8,
    #[serde_inline_default(150)]
    pub sat: u8,
    #[serde_inline_default(255)]
    pub val: u8,
    /// Toggle the underglow on every key event
    #[serde_inline_default(true)]
    pub blinky: bool,
}

impl Default for RgbConfig {
    fn default() -> Self {
        Self {
            led_num: 9,
            hue: 36,
            sat: 150,
            val: 255,
            blinky: true,
        }
    }
}

#[serde_inline_default]
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AudioConfig {
    #[serde_inline_default(true)]
    pub enabled: bool,
    #[serde_inline_default(false)]
    pub clicky: bool,
    /// Song tempo in beats per minute
    #[serde_inline_default(120)]
    pub tempo: u16,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            clicky: false,
            tempo: 120,
        }
    }
}

#[serde_inline_default]
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BehaviorConfig {
    /// Tap dance window after the last press, in milliseconds
    #[serde_inline_default(200)]
    #[serde(deserialize_with = "parse_duration_millis")]
    pub tapping_term: u64,
    /// Number of key events each dynamic macro slot can hold
    #[serde_inline_default(128)]
    pub dynamic_macro_size: usize,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            tapping_term: 200,
            dynamic_macro_size: 128,
        }
    }
}

#[serde_inline_default]
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelConfig {
    #[serde_inline_default(16)]
    pub event_channel_size: usize,
    #[serde_inline_default(16)]
    pub report_channel_size: usize,
    #[serde_inline_default(4)]
    pub audio_channel_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            event_channel_size: 16,
            report_channel_size: 16,
            audio_channel_size: 4,
        }
    }
}

impl KeyboardTomlConfig {
    /// Parse a keyboard.toml string, missing sections fall back to their defaults.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: KeyboardTomlConfig = toml::from_str(content).map_err(|e| ConfigError::TomlParse {
            path: "<string>".to_string(),
            message: e.message().to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load the board defaults and merge the user's keyboard.toml on top of them.
    pub fn load<P: AsRef<Path>>(user_config: Option<P>) -> ConfigResult<Self> {
        let mut builder = Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        let mut path_str = "<default>".to_string();
        if let Some(path) = user_config {
            let path = path.as_ref();
            path_str = path.display().to_string();
            if !path.exists() {
                return Err(ConfigError::FileRead {
                    path: path_str,
                    message: "file not found".to_string(),
                });
            }
            builder = builder.add_source(File::new(&path_str, FileFormat::Toml));
        }

        let config: KeyboardTomlConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ConfigError::TomlParse {
                path: path_str,
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn keyboard(&self) -> KeyboardInfo {
        self.keyboard.clone().unwrap_or_default()
    }

    pub fn layout(&self) -> LayoutConfig {
        self.layout.clone().unwrap_or_default()
    }

    pub fn encoder(&self) -> EncoderConfig {
        self.encoder.clone().unwrap_or_default()
    }

    pub fn rgb(&self) -> RgbConfig {
        self.rgb.clone().unwrap_or_default()
    }

    pub fn audio(&self) -> AudioConfig {
        self.audio.clone().unwrap_or_default()
    }

    pub fn behavior(&self) -> BehaviorConfig {
        self.behavior.clone().unwrap_or_default()
    }

    pub fn channel(&self) -> ChannelConfig {
        self.channel.clone().unwrap_or_default()
    }
}

fn parse_duration_millis<'de, D: de::Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let input: String = de::Deserialize::deserialize(deserializer)?;
    let num = input.trim_end_matches(|c: char| !c.is_numeric());
    let unit = &input[num.len()..];
    let num: u64 = num
        .parse()
        .map_err(|_| de::Error::custom(format!("Invalid number \"{num}\" in duration")))?;

    match unit {
        "s" => Ok(num * 1000),
        "ms" => Ok(num),
        other => Err(de::Error::custom(format!(
            "Invalid duration unit \"{other}\": unit part must be either \"s\" or \"ms\""
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = KeyboardTomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.layout().rows, 5);
        assert_eq!(config.layout().cols, 12);
        assert_eq!(config.layout().layers, 5);
        assert_eq!(config.encoder().aggressive_scroll_rate, 50);
        assert_eq!(config.behavior().tapping_term, 200);
        let rgb = config.rgb();
        assert_eq!((rgb.hue, rgb.sat, rgb.val), (36, 150, 255));
        assert!(rgb.blinky);
    }

    #[test]
    fn test_partial_section() {
        let config = KeyboardTomlConfig::from_toml_str(
            r#"
            [behavior]
            tapping_term = "1s"

            [rgb]
            led_num = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.behavior().tapping_term, 1000);
        assert_eq!(config.behavior().dynamic_macro_size, 128);
        assert_eq!(config.rgb().led_num, 4);
        assert_eq!(config.rgb().hue, 36);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = KeyboardTomlConfig::from_toml_str("[layout]\nrow = 5\n").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse { .. }));
    }

    #[test]
    fn test_bad_duration_unit() {
        let err = KeyboardTomlConfig::from_toml_str("[behavior]\ntapping_term = \"200us\"\n").unwrap_err();
        assert!(err.to_string().contains("Invalid duration unit"));
    }

    #[test]
    fn test_load_defaults_without_user_file() {
        let config = KeyboardTomlConfig::load(None::<&Path>).unwrap();
        assert_eq!(config.keyboard().name, "Preonic");
        assert_eq!(config.channel().audio_channel_size, 4);
        assert!(config.audio().enabled);
    }

    #[test]
    fn test_load_missing_file() {
        let err = KeyboardTomlConfig::load(Some("/nonexistent/keyboard.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }
}

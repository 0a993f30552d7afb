use crate::{ConfigError, ConfigResult, KeyboardTomlConfig};

const TAPPING_TERM_RANGE: core::ops::RangeInclusive<u64> = 10..=5000;

impl KeyboardTomlConfig {
    /// Check the values that serde can't, called after every load.
    pub fn validate(&self) -> ConfigResult<()> {
        let layout = self.layout();
        if layout.rows == 0 || layout.cols == 0 {
            return Err(ConfigError::validation("layout", "rows and cols must be greater than 0"));
        }
        if layout.layers == 0 || layout.layers > 32 {
            return Err(ConfigError::validation(
                "layout.layers",
                format!("must be between 1 and 32, got {}", layout.layers),
            ));
        }

        if self.encoder().aggressive_scroll_rate == 0 {
            return Err(ConfigError::validation(
                "encoder.aggressive_scroll_rate",
                "must be at least 1",
            ));
        }

        let behavior = self.behavior();
        if !TAPPING_TERM_RANGE.contains(&behavior.tapping_term) {
            return Err(ConfigError::validation(
                "behavior.tapping_term",
                format!(
                    "must be between {}ms and {}ms, got {}ms",
                    TAPPING_TERM_RANGE.start(),
                    TAPPING_TERM_RANGE.end(),
                    behavior.tapping_term
                ),
            ));
        }
        if behavior.dynamic_macro_size == 0 {
            return Err(ConfigError::validation("behavior.dynamic_macro_size", "must be at least 1"));
        }

        let channel = self.channel();
        if channel.event_channel_size == 0 || channel.report_channel_size == 0 || channel.audio_channel_size == 0 {
            return Err(ConfigError::validation("channel", "channel sizes must be greater than 0"));
        }

        if self.audio().tempo == 0 {
            return Err(ConfigError::validation("audio.tempo", "must be greater than 0"));
        }

        Ok(())
    }
}

//! Exposed channels which can be used to share data across tasks

pub use embassy_sync::{blocking_mutex, channel, signal};

use crate::config::ChannelConfig;

/// Channels used by the firmware's tasks when they are not given their own
pub static CHANNELS: ChannelConfig = ChannelConfig::new();

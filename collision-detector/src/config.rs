//! Channel binding configuration
//!
//! The detector only needs to know which two channel identifiers to monitor.
//! How those identifiers are offered to a user (dropdowns, config files, flags)
//! is the host's business.

use crate::types::ChannelRole;
use serde::{Deserialize, Serialize};

/// Default identifier for the first monitored channel
pub const DEFAULT_CHANNEL1: &str = "Channel 1";

/// Default identifier for the second monitored channel
pub const DEFAULT_CHANNEL2: &str = "Channel 2";

/// Maps the two monitored roles to concrete channel identifiers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelBinding {
    #[serde(default = "default_channel1")]
    pub channel1: String,

    #[serde(default = "default_channel2")]
    pub channel2: String,
}

fn default_channel1() -> String {
    DEFAULT_CHANNEL1.to_string()
}

fn default_channel2() -> String {
    DEFAULT_CHANNEL2.to_string()
}

impl Default for ChannelBinding {
    fn default() -> Self {
        Self {
            channel1: default_channel1(),
            channel2: default_channel2(),
        }
    }
}

impl ChannelBinding {
    /// Create a binding for two channel identifiers
    pub fn new(channel1: impl Into<String>, channel2: impl Into<String>) -> Self {
        Self {
            channel1: channel1.into(),
            channel2: channel2.into(),
        }
    }

    /// Builder method: set the first channel
    pub fn with_channel1(mut self, channel: impl Into<String>) -> Self {
        self.channel1 = channel.into();
        self
    }

    /// Builder method: set the second channel
    pub fn with_channel2(mut self, channel: impl Into<String>) -> Self {
        self.channel2 = channel.into();
        self
    }

    /// Resolve a channel identifier to its monitored role.
    ///
    /// `channel1` is checked first, so a binding that names the same channel
    /// twice only ever resolves to [`ChannelRole::First`].
    pub fn role_of(&self, channel: &str) -> Option<ChannelRole> {
        if channel == self.channel1 {
            Some(ChannelRole::First)
        } else if channel == self.channel2 {
            Some(ChannelRole::Second)
        } else {
            None
        }
    }

    /// Identifier bound to a role
    pub fn channel(&self, role: ChannelRole) -> &str {
        match role {
            ChannelRole::First => &self.channel1,
            ChannelRole::Second => &self.channel2,
        }
    }

    /// True if both roles name the same channel
    pub fn is_self_paired(&self) -> bool {
        self.channel1 == self.channel2
    }
}

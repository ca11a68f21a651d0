// Run option domain models - per-guild settings the raid service reads.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Every configurable option. The discriminants are the stored keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunOptionType {
    /// Guild is currently locked down for a raid
    RaidModeEnabled = 0,
    /// Run raid detection on joins and flip raid mode automatically
    AutoRaidModeEnabled = 1,
    /// Sequential joins (within the cooldown) that count as a raid
    JoinsToTriggerRaidModePerMinute = 2,
    /// Consecutive joiners with near-identical account ages that count as a raid
    AccountCreationSimilarityJoinsToTriggerRaidMode = 3,
}

impl RunOptionType {
    pub const ALL: [RunOptionType; 4] = [
        RunOptionType::RaidModeEnabled,
        RunOptionType::AutoRaidModeEnabled,
        RunOptionType::JoinsToTriggerRaidModePerMinute,
        RunOptionType::AccountCreationSimilarityJoinsToTriggerRaidMode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RunOptionType::RaidModeEnabled => "RaidModeEnabled",
            RunOptionType::AutoRaidModeEnabled => "AutoRaidModeEnabled",
            RunOptionType::JoinsToTriggerRaidModePerMinute => "JoinsToTriggerRaidModePerMinute",
            RunOptionType::AccountCreationSimilarityJoinsToTriggerRaidMode => {
                "AccountCreationSimilarityJoinsToTriggerRaidMode"
            }
        }
    }

    /// Value used when a guild never set this option.
    pub fn default_value(&self) -> &'static str {
        match self {
            RunOptionType::RaidModeEnabled => "False",
            RunOptionType::AutoRaidModeEnabled => "False",
            RunOptionType::JoinsToTriggerRaidModePerMinute => "10",
            RunOptionType::AccountCreationSimilarityJoinsToTriggerRaidMode => "5",
        }
    }

    pub fn is_flag(&self) -> bool {
        matches!(
            self,
            RunOptionType::RaidModeEnabled | RunOptionType::AutoRaidModeEnabled
        )
    }

    pub fn key(&self) -> i64 {
        *self as i64
    }

    pub fn from_key(key: i64) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.key() == key)
    }
}

impl std::fmt::Display for RunOptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RunOptionType {
    type Err = ();

    /// Names match case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

/// A stored option value for one guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOption {
    pub option_type: RunOptionType,
    pub value: String,
}

/// Everything the raid service needs for one guild, already parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaidSettings {
    pub raid_mode_enabled: bool,
    pub auto_raid_mode_enabled: bool,
    pub sequential_limit: u32,
    pub account_creation_similarity_limit: u32,
}

impl Default for RaidSettings {
    fn default() -> Self {
        Self {
            raid_mode_enabled: false,
            auto_raid_mode_enabled: false,
            sequential_limit: 10,
            account_creation_similarity_limit: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_option_names() {
        assert_eq!(
            "autoraidmodeenabled".parse::<RunOptionType>(),
            Ok(RunOptionType::AutoRaidModeEnabled)
        );
        assert_eq!(
            " JoinsToTriggerRaidModePerMinute ".parse::<RunOptionType>(),
            Ok(RunOptionType::JoinsToTriggerRaidModePerMinute)
        );
        assert!("NotAnOption".parse::<RunOptionType>().is_err());
    }

    #[test]
    fn test_keys_round_trip() {
        for t in RunOptionType::ALL {
            assert_eq!(RunOptionType::from_key(t.key()), Some(t));
        }
        assert_eq!(RunOptionType::from_key(99), None);
    }

    #[test]
    fn test_defaults_match_settings_default() {
        let settings = RaidSettings::default();
        assert_eq!(
            RunOptionType::JoinsToTriggerRaidModePerMinute.default_value(),
            settings.sequential_limit.to_string()
        );
        assert_eq!(
            RunOptionType::AccountCreationSimilarityJoinsToTriggerRaidMode.default_value(),
            settings.account_creation_similarity_limit.to_string()
        );
    }
}

// Run option service - per-guild configuration for raid detection.
//
// Values are stored as strings (the same way admins type them) and parsed
// on read. Validation happens here on write so the raid calculator can
// trust whatever it is handed.

use super::run_option_models::{RaidSettings, RunOption, RunOptionType};
use async_trait::async_trait;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum RunOptionError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Invalid value '{value}' for {option}: {reason}")]
    InvalidValue {
        option: RunOptionType,
        value: String,
        reason: &'static str,
    },

    #[error("Unknown option: {0}")]
    UnknownOption(String),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait RunOptionStore: Send + Sync {
    /// Raw stored value, or `None` if the guild never set it.
    async fn get_option(
        &self,
        guild_id: u64,
        option_type: RunOptionType,
    ) -> Result<Option<String>, RunOptionError>;

    async fn set_option(
        &self,
        guild_id: u64,
        option_type: RunOptionType,
        value: &str,
    ) -> Result<(), RunOptionError>;

    /// Everything the guild has explicitly set.
    async fn list_options(&self, guild_id: u64) -> Result<Vec<RunOption>, RunOptionError>;
}

// Lets the binary pick a backend at startup without changing service types.
#[async_trait]
impl RunOptionStore for Box<dyn RunOptionStore> {
    async fn get_option(
        &self,
        guild_id: u64,
        option_type: RunOptionType,
    ) -> Result<Option<String>, RunOptionError> {
        (**self).get_option(guild_id, option_type).await
    }

    async fn set_option(
        &self,
        guild_id: u64,
        option_type: RunOptionType,
        value: &str,
    ) -> Result<(), RunOptionError> {
        (**self).set_option(guild_id, option_type, value).await
    }

    async fn list_options(&self, guild_id: u64) -> Result<Vec<RunOption>, RunOptionError> {
        (**self).list_options(guild_id).await
    }
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct RunOptionService<S: RunOptionStore> {
    store: S,
}

fn parse_flag(option: RunOptionType, value: &str) -> Result<bool, RunOptionError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(RunOptionError::InvalidValue {
            option,
            value: value.to_string(),
            reason: "expected true or false",
        }),
    }
}

fn parse_limit(option: RunOptionType, value: &str) -> Result<u32, RunOptionError> {
    match value.trim().parse::<u32>() {
        Ok(limit) if limit >= 1 => Ok(limit),
        _ => Err(RunOptionError::InvalidValue {
            option,
            value: value.to_string(),
            reason: "expected a whole number of at least 1",
        }),
    }
}

impl<S: RunOptionStore> RunOptionService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Current value for an option, falling back to its default.
    pub async fn get(
        &self,
        guild_id: u64,
        option_type: RunOptionType,
    ) -> Result<String, RunOptionError> {
        Ok(self
            .store
            .get_option(guild_id, option_type)
            .await?
            .unwrap_or_else(|| option_type.default_value().to_string()))
    }

    /// Every option with its effective value, in declaration order.
    pub async fn all(&self, guild_id: u64) -> Result<Vec<RunOption>, RunOptionError> {
        let stored = self.store.list_options(guild_id).await?;
        Ok(RunOptionType::ALL
            .iter()
            .map(|t| RunOption {
                option_type: *t,
                value: stored
                    .iter()
                    .find(|o| o.option_type == *t)
                    .map(|o| o.value.clone())
                    .unwrap_or_else(|| t.default_value().to_string()),
            })
            .collect())
    }

    /// Parsed settings for the raid service.
    pub async fn raid_settings(&self, guild_id: u64) -> Result<RaidSettings, RunOptionError> {
        let mut settings = RaidSettings::default();
        for option in self.all(guild_id).await? {
            let t = option.option_type;
            match t {
                RunOptionType::RaidModeEnabled => {
                    settings.raid_mode_enabled = parse_flag(t, &option.value)?
                }
                RunOptionType::AutoRaidModeEnabled => {
                    settings.auto_raid_mode_enabled = parse_flag(t, &option.value)?
                }
                RunOptionType::JoinsToTriggerRaidModePerMinute => {
                    settings.sequential_limit = parse_limit(t, &option.value)?
                }
                RunOptionType::AccountCreationSimilarityJoinsToTriggerRaidMode => {
                    settings.account_creation_similarity_limit = parse_limit(t, &option.value)?
                }
            }
        }
        Ok(settings)
    }

    /// Validate and store an option given by name, as typed by an admin.
    ///
    /// Returns the parsed option type so callers can echo it back.
    pub async fn update(
        &self,
        guild_id: u64,
        option_name: &str,
        value: &str,
    ) -> Result<RunOptionType, RunOptionError> {
        let option_type: RunOptionType = option_name
            .parse()
            .map_err(|_| RunOptionError::UnknownOption(option_name.to_string()))?;

        // Normalize so stored values always parse the same way
        let normalized = if option_type.is_flag() {
            if parse_flag(option_type, value)? {
                "True".to_string()
            } else {
                "False".to_string()
            }
        } else {
            parse_limit(option_type, value)?.to_string()
        };

        self.store
            .set_option(guild_id, option_type, &normalized)
            .await?;

        tracing::info!(
            guild_id,
            option = %option_type,
            value = %normalized,
            "Run option updated"
        );
        Ok(option_type)
    }

    /// Turn raid mode on or off.
    pub async fn set_raid_mode(&self, guild_id: u64, enabled: bool) -> Result<(), RunOptionError> {
        let value = if enabled { "True" } else { "False" };
        self.store
            .set_option(guild_id, RunOptionType::RaidModeEnabled, value)
            .await
    }
}

// ============================================================================
// TESTS
// ============================================================================

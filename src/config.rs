// Startup configuration, read from the environment (and `.env` if present).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing {0} environment variable! Create a .env file with your bot token.")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub discord_token: String,
    /// Directory holding the run option database
    pub data_dir: PathBuf,
    /// Channel that receives raid alerts, if any
    pub raid_alert_channel_id: Option<u64>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let discord_token = get("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let data_dir = get("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));

        let raid_alert_channel_id = match get("RAID_ALERT_CHANNEL_ID") {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                name: "RAID_ALERT_CHANNEL_ID",
                value: raw.clone(),
            })?),
            None => None,
        };

        Ok(Self {
            discord_token,
            data_dir,
            raid_alert_channel_id,
        })
    }

    pub fn run_options_db_path(&self) -> PathBuf {
        self.data_dir.join("run_options.db")
    }
}

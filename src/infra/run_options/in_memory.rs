// In-memory implementation of RunOptionStore.
//
// Used when no data directory is writable, and handy in tests. Values are
// lost on restart, same as the raid calculators themselves.

use crate::core::run_options::{RunOption, RunOptionError, RunOptionStore, RunOptionType};
use async_trait::async_trait;
use dashmap::DashMap;

pub struct InMemoryRunOptionStore {
    /// Maps (guild_id, option) -> raw value
    values: DashMap<(u64, RunOptionType), String>,
}

impl InMemoryRunOptionStore {
    pub fn new() -> Self {
        Self {
            values: DashMap::new(),
        }
    }
}

impl Default for InMemoryRunOptionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RunOptionStore for InMemoryRunOptionStore {
    async fn get_option(
        &self,
        guild_id: u64,
        option_type: RunOptionType,
    ) -> Result<Option<String>, RunOptionError> {
        Ok(self
            .values
            .get(&(guild_id, option_type))
            .map(|entry| entry.value().clone()))
    }

    async fn set_option(
        &self,
        guild_id: u64,
        option_type: RunOptionType,
        value: &str,
    ) -> Result<(), RunOptionError> {
        self.values
            .insert((guild_id, option_type), value.to_string());
        Ok(())
    }

    async fn list_options(&self, guild_id: u64) -> Result<Vec<RunOption>, RunOptionError> {
        let mut options: Vec<RunOption> = self
            .values
            .iter()
            .filter(|entry| entry.key().0 == guild_id)
            .map(|entry| RunOption {
                option_type: entry.key().1,
                value: entry.value().clone(),
            })
            .collect();
        options.sort_by_key(|o| o.option_type.key());
        Ok(options)
    }
}

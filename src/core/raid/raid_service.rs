// Raid service - owns one calculator per guild and feeds it joins.
//
// The calculator registry lives here rather than in a global so each guild's
// history is isolated, and dropping the service (or a guild) resets it.

use super::raid_calculator::RaidCalculator;
use crate::core::events::UserJoin;
use crate::core::run_options::{RunOptionError, RunOptionService, RunOptionStore};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;

/// Outcome of checking one join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaidCheck {
    /// Raid detection is switched off for the guild
    Disabled,
    /// Join looks normal
    Clear,
    /// Join is part of a raid
    Raid {
        /// Raid mode was already on before this join
        raid_mode_active: bool,
    },
}

/// Read-only view of a guild's detector state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaidSnapshot {
    pub sequential_join_count: u32,
    pub similar_creation_count: u32,
    pub last_join: Option<DateTime<Utc>>,
}

pub struct RaidService<S: RunOptionStore> {
    options: Arc<RunOptionService<S>>,
    // DashMap's entry guard gives each guild's calculator exclusive access
    calculators: DashMap<u64, RaidCalculator>,
}

impl<S: RunOptionStore> RaidService<S> {
    pub fn new(options: Arc<RunOptionService<S>>) -> Self {
        Self {
            options,
            calculators: DashMap::new(),
        }
    }

    /// Run a join through the guild's calculator using the guild's thresholds.
    ///
    /// Guilds with auto raid mode off are skipped entirely; their calculator
    /// is not created or advanced.
    pub async fn check_join(
        &self,
        guild_id: u64,
        join: &UserJoin,
    ) -> Result<RaidCheck, RunOptionError> {
        let settings = self.options.raid_settings(guild_id).await?;
        if !settings.auto_raid_mode_enabled {
            return Ok(RaidCheck::Disabled);
        }

        // Guard must be released before the next await point
        let (is_raid, sequential, similar) = {
            let mut calculator = self.calculators.entry(guild_id).or_default();
            let is_raid = calculator.calculate_is_raid(
                join,
                settings.sequential_limit,
                settings.account_creation_similarity_limit,
            );
            (
                is_raid,
                calculator.sequential_join_count(),
                calculator.similar_creation_count(),
            )
        };

        if !is_raid {
            tracing::debug!(
                guild_id,
                user_id = join.user_id,
                sequential_joins = sequential,
                similar_creation = similar,
                "Join checked"
            );
            return Ok(RaidCheck::Clear);
        }

        tracing::warn!(
            guild_id,
            user_id = join.user_id,
            sequential_joins = sequential,
            sequential_limit = settings.sequential_limit,
            similar_creation = similar,
            similarity_limit = settings.account_creation_similarity_limit,
            "Raid detected"
        );
        Ok(RaidCheck::Raid {
            raid_mode_active: settings.raid_mode_enabled,
        })
    }

    /// Current detector state for a guild, if it has seen any joins.
    pub fn snapshot(&self, guild_id: u64) -> Option<RaidSnapshot> {
        self.calculators.get(&guild_id).map(|calc| RaidSnapshot {
            sequential_join_count: calc.sequential_join_count(),
            similar_creation_count: calc.similar_creation_count(),
            last_join: calc.last_join(),
        })
    }

    /// Forget a guild's history (bot removed, or detection reset by an admin).
    pub fn remove_guild(&self, guild_id: u64) -> bool {
        self.calculators.remove(&guild_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::super::snowflake::snowflake_for_time;
    use super::*;
    use crate::core::run_options::{RunOption, RunOptionType};
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};

    struct MockRunOptionStore {
        values: DashMap<(u64, RunOptionType), String>,
    }

    #[async_trait]
    impl RunOptionStore for MockRunOptionStore {
        async fn get_option(
            &self,
            guild_id: u64,
            option_type: RunOptionType,
        ) -> Result<Option<String>, RunOptionError> {
            Ok(self.values.get(&(guild_id, option_type)).map(|v| v.clone()))
        }

        async fn set_option(
            &self,
            guild_id: u64,
            option_type: RunOptionType,
            value: &str,
        ) -> Result<(), RunOptionError> {
            self.values.insert((guild_id, option_type), value.to_string());
            Ok(())
        }

        async fn list_options(&self, guild_id: u64) -> Result<Vec<RunOption>, RunOptionError> {
            Ok(self
                .values
                .iter()
                .filter(|e| e.key().0 == guild_id)
                .map(|e| RunOption {
                    option_type: e.key().1,
                    value: e.value().clone(),
                })
                .collect())
        }
    }

    async fn service_with_detection(guilds: &[u64]) -> RaidService<MockRunOptionStore> {
        let options = Arc::new(RunOptionService::new(MockRunOptionStore {
            values: DashMap::new(),
        }));
        for guild in guilds {
            options.update(*guild, "AutoRaidModeEnabled", "true").await.unwrap();
            options
                .update(*guild, "JoinsToTriggerRaidModePerMinute", "3")
                .await
                .unwrap();
        }
        RaidService::new(options)
    }

    fn join(i: i64) -> UserJoin {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let created = Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap() + Duration::days(40 * i);
        UserJoin::new(snowflake_for_time(created), base + Duration::seconds(5 * i))
    }

    #[tokio::test]
    async fn test_disabled_guild_is_skipped() {
        let service = service_with_detection(&[]).await;

        for i in 0..10 {
            assert_eq!(service.check_join(1, &join(i)).await.unwrap(), RaidCheck::Disabled);
        }
        assert!(service.snapshot(1).is_none());
    }

    #[tokio::test]
    async fn test_raid_detected_at_guild_threshold() {
        let service = service_with_detection(&[1]).await;

        assert_eq!(service.check_join(1, &join(0)).await.unwrap(), RaidCheck::Clear);
        assert_eq!(service.check_join(1, &join(1)).await.unwrap(), RaidCheck::Clear);
        assert_eq!(
            service.check_join(1, &join(2)).await.unwrap(),
            RaidCheck::Raid {
                raid_mode_active: false
            }
        );

        service.options.set_raid_mode(1, true).await.unwrap();
        assert_eq!(
            service.check_join(1, &join(3)).await.unwrap(),
            RaidCheck::Raid {
                raid_mode_active: true
            }
        );
    }

    #[tokio::test]
    async fn test_guilds_are_isolated() {
        let service = service_with_detection(&[1, 2]).await;

        service.check_join(1, &join(0)).await.unwrap();
        service.check_join(1, &join(1)).await.unwrap();
        assert_eq!(service.check_join(2, &join(2)).await.unwrap(), RaidCheck::Clear);

        assert_eq!(service.snapshot(1).unwrap().sequential_join_count, 2);
        assert_eq!(service.snapshot(2).unwrap().sequential_join_count, 1);
    }

    #[tokio::test]
    async fn test_remove_guild_resets_history() {
        let service = service_with_detection(&[1]).await;

        service.check_join(1, &join(0)).await.unwrap();
        service.check_join(1, &join(1)).await.unwrap();
        assert!(service.remove_guild(1));
        assert!(!service.remove_guild(1));

        assert_eq!(service.check_join(1, &join(2)).await.unwrap(), RaidCheck::Clear);
        assert_eq!(service.snapshot(1).unwrap().sequential_join_count, 1);
    }
}

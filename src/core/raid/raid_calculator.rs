// Per-guild raid calculator.
//
// Two independent signals, OR-combined:
// - cadence: many joins, each within the join cooldown of the one before
// - clustering: consecutive joiners whose accounts were created close together
//
// State only moves forward through `calculate_is_raid`. Nothing here is persisted,
// so a restart starts every guild from a clean slate.

use super::snowflake::snowflake_created_at;
use crate::core::events::UserJoin;
use chrono::{DateTime, Duration, Utc};

/// Joins further apart than this many seconds start a new burst.
pub const JOIN_COOLDOWN_SECS: i64 = 90;

/// Accounts created within this many minutes of the previous joiner count as similar.
pub const ACCOUNT_CREATION_SIMILARITY_MINS: i64 = 60;

fn join_cooldown() -> Duration {
    Duration::seconds(JOIN_COOLDOWN_SECS)
}

fn account_creation_similarity() -> Duration {
    Duration::minutes(ACCOUNT_CREATION_SIMILARITY_MINS)
}

/// Streaming raid detector for one guild.
///
/// Calls must be sequential; the raid service gives each guild its own instance.
#[derive(Debug, Default, Clone)]
pub struct RaidCalculator {
    last_join: Option<DateTime<Utc>>,
    last_join_account_created: Option<DateTime<Utc>>,
    sequential_join_count: u32,
    similar_creation_count: u32,
}

impl RaidCalculator {
    /// Feed one join and decide whether the guild is being raided.
    ///
    /// Thresholds are not validated: a limit of 0 flags every join.
    pub fn calculate_is_raid(
        &mut self,
        join: &UserJoin,
        sequential_limit: u32,
        account_creation_similarity_limit: u32,
    ) -> bool {
        match self.last_join {
            Some(last) if join.joined_at - last <= join_cooldown() => {
                self.sequential_join_count = self.sequential_join_count.saturating_add(1);
            }
            _ => self.sequential_join_count = 1,
        }

        let account_created = snowflake_created_at(join.user_id);

        if let Some(previous) = self.last_join_account_created {
            let diff = account_created.max(previous) - account_created.min(previous);
            if diff <= account_creation_similarity() {
                self.similar_creation_count = self.similar_creation_count.saturating_add(1);
            } else {
                self.similar_creation_count = 1;
            }
        }

        self.last_join = Some(join.joined_at);
        self.last_join_account_created = Some(account_created);

        self.sequential_join_count >= sequential_limit
            || self.similar_creation_count >= account_creation_similarity_limit
    }

    pub fn sequential_join_count(&self) -> u32 {
        self.sequential_join_count
    }

    pub fn similar_creation_count(&self) -> u32 {
        self.similar_creation_count
    }

    pub fn last_join(&self) -> Option<DateTime<Utc>> {
        self.last_join
    }
}

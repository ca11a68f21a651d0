// Snowflake timestamp decoding.
//
// Discord ids embed their creation time in the top 42 bits as milliseconds
// since the Discord epoch (2015-01-01T00:00:00Z).

use chrono::{DateTime, TimeZone, Utc};

/// Discord epoch in Unix milliseconds.
pub const DISCORD_EPOCH_MS: i64 = 1_420_070_400_000;

const TIMESTAMP_SHIFT: u32 = 22;

/// When the entity behind `id` was created.
pub fn snowflake_created_at(id: u64) -> DateTime<Utc> {
    // (id >> 22) is at most 2^42, so this can't overflow i64.
    let millis = (id >> TIMESTAMP_SHIFT) as i64 + DISCORD_EPOCH_MS;
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Smallest snowflake created at `created_at`. Times before the epoch clamp to 0.
#[cfg(test)]
pub fn snowflake_for_time(created_at: DateTime<Utc>) -> u64 {
    let offset = (created_at.timestamp_millis() - DISCORD_EPOCH_MS).max(0) as u64;
    offset << TIMESTAMP_SHIFT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_snowflake() {
        // Example id from the Discord developer docs
        let created = snowflake_created_at(175_928_847_299_117_063);
        assert_eq!(created.timestamp_millis(), 1_462_015_105_796);
    }

    #[test]
    fn test_zero_is_epoch() {
        assert_eq!(snowflake_created_at(0).timestamp_millis(), DISCORD_EPOCH_MS);
    }

    #[test]
    fn test_for_time_inverts_decode() {
        let at = Utc.with_ymd_and_hms(2021, 6, 1, 12, 30, 0).unwrap();
        // Low bits (worker/process/increment) don't affect the timestamp
        let id = snowflake_for_time(at) | 0x3F_FFFF;
        assert_eq!(snowflake_created_at(id), at);
    }
}

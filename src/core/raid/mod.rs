// Core raid module - join-based raid detection.
//
// NO Discord dependencies here - snowflake decoding is plain arithmetic.

pub mod raid_calculator;
pub mod raid_service;
pub mod snowflake;

pub use raid_service::{RaidCheck, RaidService};

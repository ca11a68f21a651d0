// Core run option module - per-guild configuration values.

pub mod run_option_models;
pub mod run_option_service;

pub use run_option_models::*;
pub use run_option_service::*;

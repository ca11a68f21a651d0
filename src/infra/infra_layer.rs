// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "run_options/mod.rs"]
pub mod run_options;

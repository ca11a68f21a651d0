// Discord commands module.
// Each feature gets its own command file.

pub mod raid_mode;

pub mod run_options;

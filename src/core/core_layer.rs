// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "events/event_models.rs"]
pub mod events;

#[path = "queue/mod.rs"]
pub mod queue;

#[path = "raid/mod.rs"]
pub mod raid;

#[path = "run_options/mod.rs"]
pub mod run_options;

#[path = "pipeline/event_pipeline.rs"]
pub mod pipeline;

// Discord layer - gateway forwarding, raid responses and commands.

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "gateway/event_forwarder.rs"]
pub mod gateway;

#[path = "raid/raid_responder.rs"]
pub mod raid;

use crate::core::events::QueuedEvent;
use crate::core::queue::EventQueue;
use crate::core::raid::RaidService;
use crate::core::run_options::{RunOptionService, RunOptionStore};
use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Store backend chosen at startup (SQLite, or in-memory as a fallback).
pub type OptionStore = Box<dyn RunOptionStore>;

/// Data that's shared across all commands and event handlers.
pub struct Data {
    pub run_options: Arc<RunOptionService<OptionStore>>,
    pub raid: Arc<RaidService<OptionStore>>,
    pub events: Arc<EventQueue<QueuedEvent>>,
}

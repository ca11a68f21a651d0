// Event pipeline - the single consumer of the event queue.
//
// Pulls one event at a time, finishes it, then pulls the next. Joins go
// through raid detection; a positive verdict is handed to a `RaidResponder`,
// which decides what to actually do about it.

use crate::core::events::{QueuedEvent, UserJoin};
use crate::core::queue::{CancellationToken, EventQueue, QueueError};
use crate::core::raid::{RaidCheck, RaidService};
use crate::core::run_options::RunOptionStore;
use async_trait::async_trait;
use std::sync::Arc;

/// Reacts to a confirmed raid (lockdown, alerts, ...).
#[async_trait]
pub trait RaidResponder: Send + Sync {
    async fn on_raid_detected(
        &self,
        guild_id: u64,
        join: &UserJoin,
        raid_mode_active: bool,
    ) -> anyhow::Result<()>;
}

pub struct EventPipeline<S: RunOptionStore, R: RaidResponder> {
    queue: Arc<EventQueue<QueuedEvent>>,
    raid: Arc<RaidService<S>>,
    responder: R,
}

impl<S: RunOptionStore, R: RaidResponder> EventPipeline<S, R> {
    pub fn new(queue: Arc<EventQueue<QueuedEvent>>, raid: Arc<RaidService<S>>, responder: R) -> Self {
        Self {
            queue,
            raid,
            responder,
        }
    }

    /// Consume events until `token` fires. Returns how many events were handled.
    ///
    /// Events are never abandoned half-way: cancellation is only observed
    /// while waiting for the next one.
    pub async fn run(&self, token: CancellationToken) -> u64 {
        tracing::info!(capacity = self.queue.capacity(), "Event pipeline started");
        let mut processed: u64 = 0;

        loop {
            match self.queue.dequeue(&token).await {
                Ok(event) => {
                    self.handle(event).await;
                    processed += 1;
                }
                Err(QueueError::Cancelled) => break,
            }
        }

        tracing::info!(
            processed,
            dropped = self.queue.dropped_total(),
            pending = self.queue.len(),
            "Event pipeline stopped"
        );
        processed
    }

    async fn handle(&self, event: QueuedEvent) {
        match event {
            QueuedEvent::UserJoined {
                user_id,
                guild_id,
                joined_at,
                ..
            } => {
                let join = UserJoin::new(user_id, joined_at);
                self.handle_join(guild_id, join).await;
            }
            other => {
                tracing::debug!(
                    kind = other.kind(),
                    user_id = other.user_id(),
                    queued_at = %other.queued_at(),
                    "Activity event consumed"
                );
            }
        }
    }

    async fn handle_join(&self, guild_id: u64, join: UserJoin) {
        let check = match self.raid.check_join(guild_id, &join).await {
            Ok(check) => check,
            Err(e) => {
                tracing::error!(guild_id, user_id = join.user_id, "Raid check failed: {}", e);
                return;
            }
        };

        if let RaidCheck::Raid { raid_mode_active } = check {
            if let Err(e) = self
                .responder
                .on_raid_detected(guild_id, &join, raid_mode_active)
                .await
            {
                tracing::error!(guild_id, "Raid responder failed: {}", e);
            }
        }
    }
}

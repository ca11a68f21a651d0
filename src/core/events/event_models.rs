// Event domain models - what gateway listeners hand to the event queue.
//
// These are pure domain types with no Discord dependencies.
// The Discord layer converts serenity events into these before queueing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An activity event waiting in the event queue.
///
/// Every variant carries the user that caused it and the time it was queued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueuedEvent {
    /// A user posted a message.
    MessageSent {
        user_id: u64,
        guild_id: Option<u64>,
        channel_id: u64,
        queued_at: DateTime<Utc>,
    },
    /// A user connected to a voice channel.
    VoiceConnected {
        user_id: u64,
        guild_id: u64,
        channel_id: u64,
        session_id: String,
        queued_at: DateTime<Utc>,
    },
    /// A user left voice.
    VoiceDisconnected {
        user_id: u64,
        guild_id: u64,
        session_id: String,
        queued_at: DateTime<Utc>,
    },
    /// A user joined a guild. The pipeline projects this into a [`UserJoin`].
    UserJoined {
        user_id: u64,
        guild_id: u64,
        joined_at: DateTime<Utc>,
        queued_at: DateTime<Utc>,
    },
}

impl QueuedEvent {
    /// The user that caused this event.
    pub fn user_id(&self) -> u64 {
        match self {
            QueuedEvent::MessageSent { user_id, .. }
            | QueuedEvent::VoiceConnected { user_id, .. }
            | QueuedEvent::VoiceDisconnected { user_id, .. }
            | QueuedEvent::UserJoined { user_id, .. } => *user_id,
        }
    }

    /// When the event entered the queue.
    pub fn queued_at(&self) -> DateTime<Utc> {
        match self {
            QueuedEvent::MessageSent { queued_at, .. }
            | QueuedEvent::VoiceConnected { queued_at, .. }
            | QueuedEvent::VoiceDisconnected { queued_at, .. }
            | QueuedEvent::UserJoined { queued_at, .. } => *queued_at,
        }
    }

    /// Short name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            QueuedEvent::MessageSent { .. } => "message_sent",
            QueuedEvent::VoiceConnected { .. } => "voice_connected",
            QueuedEvent::VoiceDisconnected { .. } => "voice_disconnected",
            QueuedEvent::UserJoined { .. } => "user_joined",
        }
    }
}

/// The minimal fact the raid calculator needs about a join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserJoin {
    pub user_id: u64,
    pub joined_at: DateTime<Utc>,
}

impl UserJoin {
    pub fn new(user_id: u64, joined_at: DateTime<Utc>) -> Self {
        Self { user_id, joined_at }
    }
}

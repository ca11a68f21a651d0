// Gateway forwarding - turns serenity events into queue events.
//
// This runs inside serenity's event dispatch, so it must never wait:
// `EventQueue::queue` is lock-free and returns immediately.

use crate::core::events::QueuedEvent;
use crate::core::queue::EventQueue;
use chrono::{DateTime, Utc};
use poise::serenity_prelude as serenity;

/// Push whatever the pipeline cares about from `event` onto the queue.
pub fn forward_event(event: &serenity::FullEvent, queue: &EventQueue<QueuedEvent>) {
    let now = Utc::now();

    match event {
        serenity::FullEvent::Message { new_message } => {
            if new_message.author.bot {
                return;
            }
            queue.queue(QueuedEvent::MessageSent {
                user_id: new_message.author.id.get(),
                guild_id: new_message.guild_id.map(|id| id.get()),
                channel_id: new_message.channel_id.get(),
                queued_at: now,
            });
        }
        serenity::FullEvent::VoiceStateUpdate { old, new } => {
            let Some(guild_id) = new.guild_id else {
                return;
            };
            let transition = VoiceTransition {
                user_id: new.user_id.get(),
                guild_id: guild_id.get(),
                old_channel_id: old.as_ref().and_then(|s| s.channel_id.map(|id| id.get())),
                old_session_id: old.as_ref().map(|s| s.session_id.as_str()),
                new_channel_id: new.channel_id.map(|id| id.get()),
                new_session_id: &new.session_id,
            };
            for queued in transition.into_events(now) {
                queue.queue(queued);
            }
        }
        serenity::FullEvent::GuildMemberAddition { new_member } => {
            if new_member.user.bot {
                return;
            }
            queue.queue(member_joined(
                new_member.user.id.get(),
                new_member.guild_id.get(),
                new_member.joined_at,
                now,
            ));
        }
        _ => {}
    }
}

/// Build the join event, keeping the gateway's millisecond precision.
/// Members without a join time are stamped with `now`.
fn member_joined(
    user_id: u64,
    guild_id: u64,
    joined_at: Option<serenity::Timestamp>,
    now: DateTime<Utc>,
) -> QueuedEvent {
    QueuedEvent::UserJoined {
        user_id,
        guild_id,
        joined_at: joined_at.map(|ts| *ts).unwrap_or(now),
        queued_at: now,
    }
}

/// A voice state change reduced to the ids we need.
struct VoiceTransition<'a> {
    user_id: u64,
    guild_id: u64,
    old_channel_id: Option<u64>,
    old_session_id: Option<&'a str>,
    new_channel_id: Option<u64>,
    new_session_id: &'a str,
}

impl VoiceTransition<'_> {
    /// Moving between channels yields a disconnect followed by a connect.
    /// Mute/deafen updates within one channel yield nothing.
    fn into_events(self, now: DateTime<Utc>) -> Vec<QueuedEvent> {
        if self.old_channel_id == self.new_channel_id {
            return Vec::new();
        }

        let mut events = Vec::with_capacity(2);
        if self.old_channel_id.is_some() {
            events.push(QueuedEvent::VoiceDisconnected {
                user_id: self.user_id,
                guild_id: self.guild_id,
                session_id: self
                    .old_session_id
                    .unwrap_or(self.new_session_id)
                    .to_string(),
                queued_at: now,
            });
        }
        if let Some(channel_id) = self.new_channel_id {
            events.push(QueuedEvent::VoiceConnected {
                user_id: self.user_id,
                guild_id: self.guild_id,
                channel_id,
                session_id: self.new_session_id.to_string(),
                queued_at: now,
            });
        }
        events
    }
}

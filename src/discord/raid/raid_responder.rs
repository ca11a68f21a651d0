// Discord-specific raid response - translates a raid verdict into actions.
//
// Default policy: flip the guild into raid mode once and post an alert.
// Further raid verdicts while raid mode is on are only logged.

use crate::core::events::UserJoin;
use crate::core::pipeline::RaidResponder;
use crate::core::run_options::RunOptionService;
use crate::discord::OptionStore;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

pub struct DiscordRaidResponder {
    http: Arc<serenity::Http>,
    run_options: Arc<RunOptionService<OptionStore>>,
    alert_channel_id: Option<u64>,
}

impl DiscordRaidResponder {
    pub fn new(
        http: Arc<serenity::Http>,
        run_options: Arc<RunOptionService<OptionStore>>,
        alert_channel_id: Option<u64>,
    ) -> Self {
        Self {
            http,
            run_options,
            alert_channel_id,
        }
    }

    async fn send_alert(
        &self,
        channel_id: u64,
        guild_id: u64,
        join: &UserJoin,
    ) -> anyhow::Result<()> {
        let embed = serenity::CreateEmbed::new()
            .title("🚨 Raid detected")
            .description(format!(
                "Raid mode has been **enabled** after <@{}> joined.\n\
                 Use `/raidmode disable` once things calm down.",
                join.user_id
            ))
            .color(0xFF0000)
            .field("Joined at", format!("<t:{}:T>", join.joined_at.timestamp()), true)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "Guild ID: {}",
                guild_id
            )))
            .timestamp(serenity::Timestamp::now());

        serenity::ChannelId::new(channel_id)
            .send_message(&self.http, serenity::CreateMessage::new().embed(embed))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RaidResponder for DiscordRaidResponder {
    async fn on_raid_detected(
        &self,
        guild_id: u64,
        join: &UserJoin,
        raid_mode_active: bool,
    ) -> anyhow::Result<()> {
        if raid_mode_active {
            tracing::info!(guild_id, user_id = join.user_id, "Raid continues; raid mode already on");
            return Ok(());
        }

        self.run_options.set_raid_mode(guild_id, true).await?;
        tracing::warn!(guild_id, user_id = join.user_id, "Raid mode enabled automatically");

        match self.alert_channel_id {
            Some(channel_id) => self.send_alert(channel_id, guild_id, join).await?,
            None => tracing::debug!(guild_id, "No raid alert channel configured"),
        }
        Ok(())
    }
}

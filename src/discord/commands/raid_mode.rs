// Raid mode commands - inspect and override the raid state of a server.

use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Raid mode controls.
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    subcommands("status", "enable", "disable", "reset")
)]
pub async fn raidmode(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Show raid mode and the live detector counters.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();
    let settings = ctx.data().run_options.raid_settings(guild_id).await?;
    let snapshot = ctx.data().raid.snapshot(guild_id);

    let on_off = |on: bool| if on { "✅ On" } else { "❌ Off" };

    let detector = match snapshot {
        Some(s) => format!(
            "Sequential joins: {}/{}\nSimilar account ages: {}/{}\nLast join: {}",
            s.sequential_join_count,
            settings.sequential_limit,
            s.similar_creation_count,
            settings.account_creation_similarity_limit,
            s.last_join
                .map(|t| format!("<t:{}:R>", t.timestamp()))
                .unwrap_or_else(|| "Never".to_string())
        ),
        None => "No joins seen since startup".to_string(),
    };

    let embed = serenity::CreateEmbed::default()
        .title("🛡️ Raid Protection")
        .color(if settings.raid_mode_enabled {
            0xFF0000
        } else {
            0x00FF00
        })
        .field("Raid mode", on_off(settings.raid_mode_enabled), true)
        .field(
            "Automatic detection",
            on_off(settings.auto_raid_mode_enabled),
            true,
        )
        .field("Detector", detector, false)
        .field(
            "Queue",
            format!(
                "{} pending / {} capacity, {} dropped",
                ctx.data().events.len(),
                ctx.data().events.capacity(),
                ctx.data().events.dropped_total()
            ),
            false,
        )
        .timestamp(serenity::Timestamp::now());

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Turn raid mode on manually.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn enable(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();
    ctx.data().run_options.set_raid_mode(guild_id, true).await?;
    tracing::info!(guild_id, by = ctx.author().id.get(), "Raid mode enabled manually");
    ctx.say("🚨 Raid mode has been **enabled**.").await?;
    Ok(())
}

/// Turn raid mode off.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn disable(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();
    ctx.data().run_options.set_raid_mode(guild_id, false).await?;
    tracing::info!(guild_id, by = ctx.author().id.get(), "Raid mode disabled");
    ctx.say("✅ Raid mode has been **disabled**.").await?;
    Ok(())
}

/// Clear the detector's join history for this server.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn reset(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();
    if ctx.data().raid.remove_guild(guild_id) {
        ctx.say("🧹 Raid detector history cleared.").await?;
    } else {
        ctx.say("Nothing to clear yet.").await?;
    }
    Ok(())
}

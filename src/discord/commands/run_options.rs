// Run option commands - admins tune raid detection per server.
//
// Thin layer: pick the option, hand the raw value to the core service,
// report what happened.

use crate::core::run_options::{RunOptionError, RunOptionType};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum OptionChoice {
    #[name = "Raid mode enabled"]
    RaidModeEnabled,
    #[name = "Automatic raid detection"]
    AutoRaidModeEnabled,
    #[name = "Sequential joins to trigger raid mode"]
    JoinsToTriggerRaidModePerMinute,
    #[name = "Similar account ages to trigger raid mode"]
    AccountCreationSimilarityJoinsToTriggerRaidMode,
}

impl From<OptionChoice> for RunOptionType {
    fn from(value: OptionChoice) -> Self {
        match value {
            OptionChoice::RaidModeEnabled => RunOptionType::RaidModeEnabled,
            OptionChoice::AutoRaidModeEnabled => RunOptionType::AutoRaidModeEnabled,
            OptionChoice::JoinsToTriggerRaidModePerMinute => {
                RunOptionType::JoinsToTriggerRaidModePerMinute
            }
            OptionChoice::AccountCreationSimilarityJoinsToTriggerRaidMode => {
                RunOptionType::AccountCreationSimilarityJoinsToTriggerRaidMode
            }
        }
    }
}

/// Configure an option for the bot.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn configure(
    ctx: Context<'_>,
    #[description = "Option to change"] option: OptionChoice,
    #[description = "New value (true/false, or a number)"] value: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();
    let option_type = RunOptionType::from(option);

    match ctx
        .data()
        .run_options
        .update(guild_id, option_type.as_str(), &value)
        .await
    {
        Ok(updated) => {
            let stored = ctx.data().run_options.get(guild_id, updated).await?;
            ctx.say(format!("✅ {} configuration updated to {}", updated, stored))
                .await?;
        }
        Err(e @ RunOptionError::InvalidValue { .. }) | Err(e @ RunOptionError::UnknownOption(_)) => {
            ctx.say(format!("❌ {}", e)).await?;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Show every option and its current value.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn options(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();
    let all = ctx.data().run_options.all(guild_id).await?;

    let mut embed = serenity::CreateEmbed::default()
        .title("⚙️ Run Options")
        .color(serenity::Color::BLURPLE);
    for option in all {
        embed = embed.field(option.option_type.as_str(), option.value, false);
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

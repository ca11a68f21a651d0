// This is the entry point of the raid guard bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic): event queue, raid detection, run options
// - `infra/` = Implementations of core traits (SQLite / in-memory option stores)
// - `discord/` = Discord-specific adapters (gateway forwarding, raid response, commands)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Start the event pipeline (the single queue consumer)
// 4. Set up the Discord framework and forward gateway events into the queue

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

mod config;

use crate::config::AppConfig;
use crate::core::pipeline::EventPipeline;
use crate::core::queue::{CancellationSource, EventQueue};
use crate::core::raid::RaidService;
use crate::core::run_options::RunOptionService;
use crate::discord::raid::DiscordRaidResponder;
use crate::discord::{Data, Error, OptionStore};
use crate::infra::run_options::{InMemoryRunOptionStore, SqliteRunOptionStore};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Event handler for non-command Discord events.
/// Everything the pipeline needs goes onto the queue; nothing here waits on it.
async fn event_handler(
    _ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    discord::gateway::forward_event(event, &data.events);

    match event {
        serenity::FullEvent::GuildDelete { incomplete, .. } if !incomplete.unavailable => {
            // Bot was removed from the guild; its join history goes with it
            let guild_id = incomplete.id.get();
            if data.raid.remove_guild(guild_id) {
                tracing::info!(guild_id, "Dropped raid detector for removed guild");
            }
        }
        serenity::FullEvent::GuildMemberAddition { new_member } => {
            tracing::debug!(
                guild_id = new_member.guild_id.get(),
                user_id = new_member.user.id.get(),
                pending = data.events.len(),
                "Member join queued"
            );
        }
        _ => {}
    }

    Ok(())
}

/// Prefer SQLite; if the data directory is unusable, keep running on in-memory options.
async fn open_option_store(config: &AppConfig) -> OptionStore {
    let db_path = config.run_options_db_path();
    match SqliteRunOptionStore::open(&db_path.to_string_lossy()).await {
        Ok(store) => {
            tracing::info!(path = %db_path.display(), "Run options loaded from SQLite");
            Box::new(store)
        }
        Err(e) => {
            tracing::error!(
                path = %db_path.display(),
                "Failed to open run option database, falling back to in-memory options: {}",
                e
            );
            Box::new(InMemoryRunOptionStore::new())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // This is the "composition root" where we wire everything together.

    let run_options = Arc::new(RunOptionService::new(open_option_store(&config).await));
    let raid = Arc::new(RaidService::new(Arc::clone(&run_options)));
    let events = Arc::new(EventQueue::new());

    // The responder talks to Discord over REST, independently of the gateway client
    let http = Arc::new(serenity::Http::new(&config.discord_token));
    let responder = DiscordRaidResponder::new(
        http,
        Arc::clone(&run_options),
        config.raid_alert_channel_id,
    );

    // ========================================================================
    // EVENT PIPELINE
    // ========================================================================
    // One consumer for the whole process. It keeps draining until shutdown.

    let shutdown = CancellationSource::new();
    let pipeline = EventPipeline::new(Arc::clone(&events), Arc::clone(&raid), responder);
    let pipeline_task = tokio::spawn({
        let token = shutdown.token();
        async move { pipeline.run(token).await }
    });

    let data = Data {
        run_options: Arc::clone(&run_options),
        raid: Arc::clone(&raid),
        events: Arc::clone(&events),
    };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS // Required for member join events
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::GUILD_VOICE_STATES;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                discord::commands::run_options::configure(),
                discord::commands::run_options::options(),
                discord::commands::raid_mode::raidmode(),
            ],
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                tracing::info!(
                    user = %ready.user.name,
                    guilds = ready.guilds.len(),
                    "Commands registered, bot is ready"
                );
                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await?;

    // Ctrl-C closes the gateway; the pipeline is stopped once the client returns
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            return;
        }
        tracing::info!("Shutdown requested");
        shard_manager.shutdown_all().await;
    });

    let client_result = client.start().await;

    // No more producers: let the pipeline drain what is buffered, then stop
    shutdown.cancel();
    let processed = pipeline_task.await?;
    tracing::info!(processed, "Event pipeline finished");
    if !events.is_empty() {
        tracing::warn!(remaining = events.len(), "Events still queued after shutdown");
    }

    client_result?;
    Ok(())
}

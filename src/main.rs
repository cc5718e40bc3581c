mod bot;
mod cache;
mod config;
mod db;
mod error;
mod store;

use crate::config::Config;
use anyhow::Result;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load()?;

    let log_level = config.log_level();
    let log_dir = &config.logging.dir;

    std::fs::create_dir_all(log_dir)?;

    // Setup file appender (daily rotation)
    let file_appender = tracing_appender::rolling::daily(log_dir, "wardenbot.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Use local time for log timestamps
    let local_timer = ChronoLocal::rfc_3339();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_line_number(true)
        .with_file(true)
        .with_target(false)
        .with_timer(local_timer.clone());

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_timer(local_timer)
        .with_writer(non_blocking);

    let filter_layer = EnvFilter::from_default_env()
        .add_directive(log_level.into())
        .add_directive("sqlx=warn".parse()?)
        .add_directive("sea_orm=warn".parse()?);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    info!("Starting WardenBot...");
    info!("Logs are written to: {}", log_dir);

    // Connect to database
    let db = db::establish_connection(&config.database.url).await?;
    info!("Database connection established");

    // Run migrations
    migration::Migrator::up(&db, None).await?;
    info!("✅ Database migrations completed");

    let repo = Arc::new(db::repo::Repo::new(db.clone()));
    repo.ping().await?;
    info!("✅ Database ping successful");

    // Connect to redis
    let redis = cache::connect(&config.redis.url).await?;
    let settings_cache = cache::settings::SettingsCache::new(redis.clone());
    let pending = cache::pending::PendingStore::new(redis.clone());
    let members = cache::chat_member::BotMemberCache::new(redis);
    info!("✅ Redis caches initialized");

    let store = store::SettingsStore::new(repo.clone(), settings_cache);

    let deps = Arc::new(bot::fsm::engine::Deps {
        repo,
        store,
        pending,
        members,
        media: config.media.clone(),
    });

    info!("WardenBot initialization complete");

    let bot = teloxide::Bot::new(config.telegram.bot_token.clone());

    if let Err(e) = bot::run(bot, deps).await {
        error!("Bot error: {:?}", e);
    }

    Ok(())
}

mod models;
mod commands;
mod services;
mod util;
mod error;

use commands::{get_framework};
use models::config::Config;
use services::{*, database::Database};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::env;
use std::error::Error as StdError;
use serenity::{
    client::ClientBuilder,
    model::gateway::GatewayIntents
};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;

type Error = Box<dyn StdError + Send + Sync>;
type BenchContext<'a> = poise::Context<'a, Data, Error>;

pub struct Data {
    pub db: Arc<Database>
}

// The returned guard flushes the file writer when dropped, so main holds it until exit.
fn init_logger(log_directory: &str) -> io::Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::hourly(log_directory, "gpubench.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing::subscriber::set_global_default(
        fmt::Subscriber::builder()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_span_events(fmt::format::FmtSpan::CLOSE)
            .with_ansi(true)
            .with_max_level(tracing::Level::INFO)
            .finish()
            .with(fmt::Layer::default().with_writer(non_blocking))
    ).map_err(io::Error::other)?;

    const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");
    info!("Initializing gpubench v{}", VERSION.unwrap_or("<unknown>"));
    info!("Reading from {}", env::current_dir()?.display());

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config_json = fs::read_to_string("config.json").map_err(|ex| format!("config.json not found: {ex}"))?;
    let config: Config = serde_json::from_str(&config_json).map_err(|ex| format!("config.json is malformed: {ex}"))?;

    let _guard = match init_logger(&config.log_directory) {
        Ok(guard) => Some(guard),
        Err(ex) => {
            eprintln!("Failed to initialize logger: {ex}");
            None
        }
    };

    let database = Arc::new(Database::open(Path::new(&config.database_path))?);
    let framework_db = database.clone();

    let framework = poise::Framework::builder()
        .options(get_framework(&config.cmd_prefix))
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                bot_init::ready(ctx, ready);

                if let Err(ex) = poise::builtins::register_globally(ctx, &framework.options().commands).await {
                    error!("Failed to create slash commands: {}", ex);
                }

                Ok(Data { db: framework_db })
            })
        })
        .build();

    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT | GatewayIntents::GUILD_MEMBERS;
    let mut client = ClientBuilder::new(&config.token, intents)
        .framework(framework)
        .await?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(ex) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", ex);
            return;
        }

        info!("Received Ctrl-C, shutting down");
        shard_manager.shutdown_all().await;
    });

    if let Err(ex) = client.start().await {
        error!("Discord bot client error: {:?}", ex);
    }

    drop(client);

    match Arc::try_unwrap(database) {
        Ok(database) => database.close()?,
        Err(_) => warn!("Database is still referenced at shutdown, leaving it to close on drop")
    }

    Ok(())
}

mod core;
mod echonest;
mod player;
mod prompt;
mod retry;

use anyhow::Context;
use clap::Parser;
use radio_proto::config::Config;
use radio_proto::echonest::RadioKind;
use radio_proto::state::SessionState;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::echonest::{EchoNestClient, RecommendationService};
use crate::player::ScController;

/// Endless radio on spotifyd, steered by Echo Nest recommendations.
#[derive(Debug, Parser)]
#[command(name = "sc-radio", version)]
struct Cli {
    /// Start artist radio seeded with this artist (skips the prompts).
    #[arg(long, conflicts_with = "genre")]
    artist: Option<String>,

    /// Start genre radio seeded with this genre (skips the prompts).
    #[arg(long)]
    genre: Option<String>,

    /// Configuration file (default: ~/.config/sc-radio/config.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Look for the player client on PATH only.
    #[arg(long)]
    system_deps: bool,
}

fn init_logging() -> anyhow::Result<PathBuf> {
    let data_dir = radio_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("sc-radio.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // stdout belongs to the prompts, so logs only go to the file
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,radio_ctl=debug,radio_proto=debug")
            }),
        )
        .init();

    Ok(log_path)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log_path = init_logging()?;
    info!("Log file: {:?}", log_path);

    radio_proto::platform::set_use_system_deps(cli.system_deps);

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = Config::load_from(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    info!("Config loaded from: {:?}", config_path);

    let mut console = prompt::stdio();

    let (kind, seed) = match (cli.artist, cli.genre) {
        (Some(artist), _) => (RadioKind::Artist, artist),
        (None, Some(genre)) => (RadioKind::Genre, genre),
        (None, None) => {
            let Some(answer) = console.ask("Genre or artist radio? ").await? else {
                return Ok(());
            };
            let kind = RadioKind::from_answer(&answer);
            let question = format!(
                "Enter {} to use as seed for recommending more music: ",
                kind.label()
            );
            let Some(seed) = console.ask(&question).await? else {
                return Ok(());
            };
            (kind, seed)
        }
    };

    let recommender = Arc::new(EchoNestClient::new(&config.echonest)?);
    let session_id = recommender
        .create_session(kind, &seed)
        .await
        .with_context(|| format!("failed to start {} radio for {:?}", kind.label(), seed))?;
    info!("Session {} started ({} radio, seed {:?})", session_id, kind.label(), seed);

    let session = Arc::new(SessionState::new(session_id));
    let player = Arc::new(ScController::from_config(&config.player));
    let radio = crate::core::Radio::new(player, recommender, session, &config.radio);

    radio.bootstrap().await;

    // Not joined: returning from main ends it along with the runtime.
    tokio::spawn(radio.clone().run_refill());

    radio.run_feedback(&mut console).await?;

    let session = radio.session();
    let elapsed = chrono::Local::now() - session.started_at();
    info!(
        "Session {} ended after {} min, {} tracks queued",
        session.session_id(),
        elapsed.num_minutes(),
        session.len().await
    );
    Ok(())
}

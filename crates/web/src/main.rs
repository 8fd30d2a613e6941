use std::sync::{Arc, Mutex};

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use chess_bot_core::{
    HelpBook, HttpChatClient, MatchArchive, MatchContext, MessageBus, RenderAssets,
    StockfishLauncher,
};

mod config;
mod routes;

use config::Settings;

pub struct AppState {
    pub ctx: MatchContext,
    pub archive: Mutex<MatchArchive>,
    pub help: HelpBook,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::parse();

    let transport = HttpChatClient::new(
        &settings.api_url,
        &settings.upload_url,
        settings.token.clone(),
    )?;

    let assets = RenderAssets::load(&settings.assets_dir).unwrap_or_else(|e| {
        warn!("Failed to load render assets from {}: {}", settings.assets_dir.display(), e);
        RenderAssets::new()
    });

    let ctx = MatchContext {
        transport: Arc::new(transport),
        bus: MessageBus::new(),
        launcher: Arc::new(StockfishLauncher::new(settings.engine_path.clone())),
        assets: Arc::new(assets),
        bot_id: settings.bot_id.clone(),
        search_depth: settings.search_depth,
    };

    let archive = MatchArchive::open(&settings.database)?;
    info!(
        "Match archive at {} holds {} matches",
        settings.database.display(),
        archive.count_matches()?
    );

    let state = Arc::new(AppState {
        ctx,
        archive: Mutex::new(archive),
        help: HelpBook::new(settings.help_dir.clone()),
    });

    let app = routes::router(state);

    let listener = TcpListener::bind(&settings.listen).await?;
    info!("Chess bot listening on http://{}", settings.listen);

    axum::serve(listener, app).await?;
    Ok(())
}

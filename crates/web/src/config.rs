//! Command line and environment settings

use std::path::PathBuf;

use clap::Parser;

use chess_bot_core::engine::DEFAULT_SEARCH_DEPTH;

/// Every flag can also be set through its environment variable or `.env`
#[derive(Parser, Debug, Clone)]
#[command(name = "chess-bot")]
#[command(about = "Plays chess matches over a chat channel")]
pub struct Settings {
    /// Bot token sent with every chat API request
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub token: String,

    /// The bot's own user id. Mentioning it starts a match against the engine.
    #[arg(long, env = "BOT_USER_ID")]
    pub bot_id: String,

    #[arg(long, env = "CHAT_API_URL", default_value = "https://api.revolt.chat")]
    pub api_url: String,

    /// File server that stores board images
    #[arg(long, env = "CHAT_UPLOAD_URL", default_value = "https://autumn.revolt.chat")]
    pub upload_url: String,

    /// Address the event webhook listens on
    #[arg(long, env = "LISTEN_ADDR", default_value = "127.0.0.1:3000")]
    pub listen: String,

    #[arg(long, env = "ENGINE_PATH", default_value = "stockfish")]
    pub engine_path: String,

    /// Engine search depth per move
    #[arg(long, env = "SEARCH_DEPTH", default_value_t = DEFAULT_SEARCH_DEPTH)]
    pub search_depth: u8,

    #[arg(long, env = "DATABASE_PATH", default_value = "chess_bot.db")]
    pub database: PathBuf,

    /// Directory with `<command>.short.txt` and `<command>.long.txt` files
    #[arg(long, env = "HELP_DIR", default_value = "command-help")]
    pub help_dir: PathBuf,

    /// Directory with piece images and an optional `font.ttf`
    #[arg(long, env = "ASSETS_DIR", default_value = "assets")]
    pub assets_dir: PathBuf,
}

//! Error types for chess-bot-core

use thiserror::Error;

use crate::board::fen::FenError;
use crate::engine::EngineError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Chat API error: {0}")]
    Chat(String),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Malformed position: {0}")]
    Fen(#[from] FenError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Message bus closed while waiting for a reply")]
    BusClosed,
}

pub type Result<T> = std::result::Result<T, Error>;

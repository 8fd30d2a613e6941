//! Chess Bot Core Library
//!
//! Runs chess matches over a chat channel: setup negotiation, the turn loop,
//! move parsing, board rendering and the engine opponent.

pub mod board;
pub mod chat;
pub mod commands;
pub mod engine;
pub mod error;
pub mod game;
pub mod parser;
pub mod render;
pub mod rules;
pub mod storage;

pub use board::{Board, LastMove, Piece, PieceKind, PlayerMove, Side, Square};
pub use chat::{ChatTransport, HttpChatClient, Message, MessageBus, OutgoingMessage};
pub use commands::{Command, HelpBook};
pub use engine::{EngineLauncher, EngineOptions, SearchEngine, StockfishLauncher};
pub use error::{Error, Result};
pub use game::{play, MatchContext, MatchReport, PlayRequest, Resolution};
pub use render::{BoardRenderer, RenderAssets};
pub use rules::{MoveResult, RulesEngine, ShakmatyRules};
pub use storage::{MatchArchive, StoredMatch};

//! Chess engine integration
//!
//! Drives a UCI-compatible engine like Stockfish as the automated opponent.

pub mod analysis;
pub mod options;
pub mod stockfish;

use async_trait::async_trait;
use thiserror::Error;

pub use analysis::{Evaluation, SearchResult};
pub use options::{EngineOption, EngineOptions};
pub use stockfish::{EngineState, StockfishEngine, StockfishLauncher};

/// Default search depth for the engine's turn, in engine plies
pub const DEFAULT_SEARCH_DEPTH: u8 = 15;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to start the engine process
    #[error("Failed to start engine: {0}")]
    Spawn(String),
    /// Failed to communicate with engine
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Engine returned unexpected response
    #[error("Protocol error: {0}")]
    Protocol(String),
    /// Engine closed its output
    #[error("Engine exited unexpectedly")]
    Exited,
    /// Command issued in the wrong lifecycle state
    #[error("Engine is {state:?}, expected {expected:?}")]
    WrongState {
        state: EngineState,
        expected: EngineState,
    },
}

/// A configured engine ready to search, owned by one match
#[async_trait]
pub trait SearchEngine: Send {
    /// Replaces the engine's position with the given FEN
    async fn sync_position(&mut self, fen: &str) -> Result<(), EngineError>;

    /// Blocks until the engine reports its best move
    async fn search(&mut self, depth: u8) -> Result<SearchResult, EngineError>;

    /// Releases the engine process
    async fn terminate(&mut self) -> Result<(), EngineError>;
}

/// Starts engines that have completed the handshake, configuration and
/// readiness check
#[async_trait]
pub trait EngineLauncher: Send + Sync {
    async fn launch(&self, options: &EngineOptions) -> Result<Box<dyn SearchEngine>, EngineError>;
}

//! Match orchestration
//!
//! A match is negotiated in [`setup`], then played out in [`turns`]. Both
//! halves talk to players only through a [`Conversation`], so a match can
//! run against any [`ChatTransport`].

pub mod setup;
pub mod turns;

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::board::Side;
use crate::chat::{ChatTransport, Conversation, MessageBus};
use crate::engine::{EngineLauncher, EngineOptions};
use crate::error::Result;
use crate::render::RenderAssets;
use crate::rules::RulesEngine;

pub use setup::SetupOutcome;

/// Everything a match borrows from the running bot
#[derive(Clone)]
pub struct MatchContext {
    pub transport: Arc<dyn ChatTransport>,
    pub bus: Arc<MessageBus>,
    pub launcher: Arc<dyn EngineLauncher>,
    pub assets: Arc<RenderAssets>,
    /// The bot's own user id; mentioning it picks the engine as opponent
    pub bot_id: String,
    pub search_depth: u8,
}

/// The `/playchess` invocation that starts a match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayRequest {
    pub channel_id: String,
    pub message_id: String,
    pub author_id: String,
    /// Arguments after the command word
    pub args: Vec<String>,
    pub mentions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opponent {
    Human(String),
    Engine,
}

/// Who acts for one side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat<'a> {
    Human(&'a str),
    Engine,
}

/// Settled during setup, never changed afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchConfig {
    pub player1: String,
    pub opponent: Opponent,
    pub player1_side: Side,
    /// Present exactly when the opponent is the engine
    pub engine_options: Option<EngineOptions>,
}

impl MatchConfig {
    pub fn against_engine(&self) -> bool {
        self.opponent == Opponent::Engine
    }

    pub fn seat(&self, side: Side) -> Seat<'_> {
        if side == self.player1_side {
            return Seat::Human(&self.player1);
        }
        match &self.opponent {
            Opponent::Human(id) => Seat::Human(id),
            Opponent::Engine => Seat::Engine,
        }
    }

    /// User id playing `side`; the engine plays under the bot's id
    pub fn player_id<'a>(&'a self, side: Side, bot_id: &'a str) -> &'a str {
        match self.seat(side) {
            Seat::Human(id) => id,
            Seat::Engine => bot_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Checkmate { winner: Side },
    Stalemate,
    RepetitionDraw,
    Aborted { by: Side },
}

impl Resolution {
    pub fn winner(&self) -> Option<Side> {
        match self {
            Resolution::Checkmate { winner } => Some(*winner),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Resolution::Checkmate { .. } => "checkmate",
            Resolution::Stalemate => "stalemate",
            Resolution::RepetitionDraw => "repetition",
            Resolution::Aborted { .. } => "aborted",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Summary of a finished match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchReport {
    pub channel_id: String,
    pub white_id: String,
    pub black_id: String,
    pub against_engine: bool,
    pub resolution: Resolution,
    /// Accepted moves in coordinate notation
    pub moves: Vec<String>,
    pub final_fen: String,
}

impl MatchReport {
    pub fn winner_id(&self) -> Option<&str> {
        self.resolution.winner().map(|side| match side {
            Side::White => self.white_id.as_str(),
            Side::Black => self.black_id.as_str(),
        })
    }
}

/// Runs one match from the command to its resolution
///
/// Returns `None` when setup was declined or rejected. Errors are faults
/// from a collaborator; any engine process has already been released by
/// the time one is returned.
pub async fn play<R: RulesEngine>(
    ctx: &MatchContext,
    request: PlayRequest,
    rules: R,
) -> Result<Option<MatchReport>> {
    let convo = Conversation::new(
        Arc::clone(&ctx.transport),
        Arc::clone(&ctx.bus),
        request.channel_id.clone(),
    );

    let config = match setup::negotiate(ctx, &convo, &request).await? {
        SetupOutcome::Ready(config) => config,
        SetupOutcome::Rejected => {
            info!(channel = %request.channel_id, "Match setup ended without a game");
            return Ok(None);
        }
    };

    let report = turns::run(ctx, &convo, config, rules).await?;
    info!(
        channel = %report.channel_id,
        resolution = %report.resolution,
        moves = report.moves.len(),
        "Match finished"
    );
    Ok(Some(report))
}

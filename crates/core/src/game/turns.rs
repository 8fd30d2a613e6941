//! The turn loop
//!
//! Plies alternate strictly from White. The acting seat is derived from the
//! ply number and `player1_side` on every iteration and stored nowhere else.

use tracing::{debug, error, info, warn};

use super::{MatchConfig, MatchContext, MatchReport, Opponent, Resolution, Seat};
use crate::board::{fen, LastMove, PlayerMove, Side};
use crate::chat::{mention, Conversation, Elicit, OutgoingMessage};
use crate::engine::{EngineError, SearchEngine};
use crate::error::Result;
use crate::parser::moves::parse_coordinate_move;
use crate::parser::{parse_move_text, MoveIntent, NOTATION_HELP};
use crate::render::{BoardRenderer, PNG_CONTENT_TYPE};
use crate::rules::{MoveResult, RulesEngine};

const BOARD_FILE_NAME: &str = "chess.png";
const INVALID_MOVE: &str = "This is not a valid move.";

/// What the acting seat did with its ply
enum Turn {
    Played(PlayerMove, MoveResult),
    Abort,
}

/// Where a finished loop left the game
struct Finish {
    resolution: Resolution,
    moves: Vec<String>,
    final_fen: String,
}

/// Launches the engine if needed, plays the match out and releases the
/// engine on every exit path
pub async fn run<R: RulesEngine>(
    ctx: &MatchContext,
    convo: &Conversation,
    config: MatchConfig,
    mut rules: R,
) -> Result<MatchReport> {
    let mut engine = match config.opponent {
        Opponent::Engine => {
            let options = config.engine_options.clone().unwrap_or_default();
            info!(channel = %convo.channel_id(), "Launching engine");
            Some(ctx.launcher.launch(&options).await?)
        }
        Opponent::Human(_) => None,
    };

    let outcome = TurnLoop {
        ctx,
        convo,
        config: &config,
    }
    .drive(&mut rules, &mut engine)
    .await;

    if let Some(engine) = engine.as_mut() {
        if let Err(e) = engine.terminate().await {
            error!("Failed to terminate engine: {}", e);
        }
    }

    let finish = outcome?;
    Ok(MatchReport {
        channel_id: convo.channel_id().to_string(),
        white_id: config.player_id(Side::White, &ctx.bot_id).to_string(),
        black_id: config.player_id(Side::Black, &ctx.bot_id).to_string(),
        against_engine: config.against_engine(),
        resolution: finish.resolution,
        moves: finish.moves,
        final_fen: finish.final_fen,
    })
}

struct TurnLoop<'a> {
    ctx: &'a MatchContext,
    convo: &'a Conversation,
    config: &'a MatchConfig,
}

impl TurnLoop<'_> {
    fn player(&self, side: Side) -> &str {
        self.config.player_id(side, &self.ctx.bot_id)
    }

    async fn drive<R: RulesEngine>(
        &self,
        rules: &mut R,
        engine: &mut Option<Box<dyn SearchEngine>>,
    ) -> Result<Finish> {
        // Read once up front and once per accepted move
        let mut position = rules.position_string();

        self.convo
            .say(format!(
                "Starting chess game between {} (white) and {} (black)",
                mention(self.player(Side::White)),
                mention(self.player(Side::Black))
            ))
            .await?;

        if let Some(engine) = engine.as_deref_mut() {
            engine.sync_position(&position).await?;
        }

        let mut moves = Vec::new();
        let mut last_move: Option<LastMove> = None;
        let mut ply = 0;

        loop {
            let side = Side::for_ply(ply);

            let turn = match self.config.seat(side) {
                Seat::Human(player) => {
                    self.human_turn(rules, player, side, &position, last_move).await?
                }
                Seat::Engine => {
                    let engine = engine
                        .as_deref_mut()
                        .ok_or_else(|| EngineError::Protocol("no engine for engine seat".into()))?;
                    self.engine_turn(rules, engine).await?
                }
            };

            let (mv, result) = match turn {
                Turn::Played(mv, result) => (mv, result),
                Turn::Abort => {
                    self.convo
                        .say(format!("{} ended the game.", mention(self.player(side))))
                        .await?;
                    return Ok(Finish {
                        resolution: Resolution::Aborted { by: side },
                        moves,
                        final_fen: position,
                    });
                }
            };

            if result.is_accepted() {
                moves.push(mv.to_string());
                last_move = Some(mv.last_move());
                position = rules.position_string();
                if let Some(engine) = engine.as_deref_mut() {
                    engine.sync_position(&position).await?;
                }
            }

            let resolution = match result {
                MoveResult::Invalid => {
                    return Err(EngineError::Protocol(format!("rules rejected engine move {}", mv)).into());
                }
                MoveResult::Valid => None,
                MoveResult::Check => {
                    self.convo.say("Check!").await?;
                    None
                }
                MoveResult::Checkmate => Some((
                    Resolution::Checkmate { winner: side },
                    format!("Checkmate! {} wins.", mention(self.player(side))),
                )),
                MoveResult::Stalemate => Some((
                    Resolution::Stalemate,
                    "Stalemate! The game is a draw.".to_string(),
                )),
                MoveResult::RepetitionDraw => Some((
                    Resolution::RepetitionDraw,
                    "Draw by threefold repetition.".to_string(),
                )),
            };

            if let Some((resolution, text)) = resolution {
                self.announce(text, &position, side, last_move).await?;
                return Ok(Finish {
                    resolution,
                    moves,
                    final_fen: position,
                });
            }

            ply += 1;
        }
    }

    /// Prompts the acting player until they play a legal move or give up
    async fn human_turn<R: RulesEngine>(
        &self,
        rules: &mut R,
        player: &str,
        side: Side,
        position: &str,
        last_move: Option<LastMove>,
    ) -> Result<Turn> {
        let attachment = self.board_attachment(position, side, last_move).await?;
        let prompt = OutgoingMessage::text(format!("It's your turn, {}.", mention(player)))
            .with_attachment(attachment);

        self.convo
            .elicit(player, &prompt, |message| {
                let Some(content) = message.content.as_deref() else {
                    return Elicit::Retry(NOTATION_HELP.to_string());
                };
                match parse_move_text(content) {
                    MoveIntent::Abort => Elicit::Accept(Turn::Abort),
                    MoveIntent::NoMove => Elicit::Retry(NOTATION_HELP.to_string()),
                    MoveIntent::Move(mv) => match rules.apply_move(&mv) {
                        MoveResult::Invalid => {
                            debug!(%mv, "Rejected move");
                            Elicit::Retry(INVALID_MOVE.to_string())
                        }
                        result => Elicit::Accept(Turn::Played(mv, result)),
                    },
                }
            })
            .await
    }

    async fn engine_turn<R: RulesEngine>(
        &self,
        rules: &mut R,
        engine: &mut dyn SearchEngine,
    ) -> Result<Turn> {
        let search = engine.search(self.ctx.search_depth).await?;
        debug!("Engine search: {}", search.summary());

        let mv = parse_coordinate_move(&search.best_move).ok_or_else(|| {
            EngineError::Protocol(format!("unreadable best move {:?}", search.best_move))
        })?;

        self.convo.say(format!("I will play... {}", mv)).await?;
        Ok(Turn::Played(mv, rules.apply_move(&mv)))
    }

    /// Announces a result with the final board from the mover's side
    async fn announce(
        &self,
        text: String,
        position: &str,
        perspective: Side,
        last_move: Option<LastMove>,
    ) -> Result<()> {
        let attachment = self
            .board_attachment(position, perspective, last_move)
            .await?;
        self.convo
            .say(OutgoingMessage::text(text).with_attachment(attachment))
            .await
    }

    /// Renders and uploads the board
    ///
    /// A malformed position is a fault. Failing to encode or upload only
    /// costs the attachment.
    async fn board_attachment(
        &self,
        position: &str,
        perspective: Side,
        last_move: Option<LastMove>,
    ) -> Result<Option<String>> {
        let board = fen::decode(position)?;
        let png = match BoardRenderer::new(&self.ctx.assets).render_png(&board, perspective, last_move) {
            Ok(png) => png,
            Err(e) => {
                warn!("Failed to render board: {}", e);
                return Ok(None);
            }
        };

        match self
            .ctx
            .transport
            .upload_attachment(png, BOARD_FILE_NAME, PNG_CONTENT_TYPE)
            .await
        {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                warn!("Failed to upload board: {}", e);
                Ok(None)
            }
        }
    }
}

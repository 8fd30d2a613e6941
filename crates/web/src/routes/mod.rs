use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, MutexGuard};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use chess_bot_core::storage::{ArchiveStats, StoredMatch};
use chess_bot_core::{
    game, Command, MatchArchive, Message, OutgoingMessage, PlayRequest, ShakmatyRules,
};

use crate::AppState;

const FAILURE_NOTICE: &str = "Something went wrong and the chess game had to stop.";
const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 200;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/events", post(receive_event))
        .route("/matches", get(matches_list))
        .route("/stats", get(stats))
        .route("/health", get(health))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

fn archive(state: &AppState) -> MutexGuard<'_, MatchArchive> {
    state
        .archive
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Inbound chat message
///
/// Pending prompts get first claim; only unclaimed messages are read as
/// commands.
pub async fn receive_event(
    State(state): State<Arc<AppState>>,
    Json(message): Json<Message>,
) -> StatusCode {
    if message.author_id == state.ctx.bot_id {
        return StatusCode::NO_CONTENT;
    }

    let Some(message) = state.ctx.bus.dispatch(message) else {
        return StatusCode::ACCEPTED;
    };

    match Command::from_message(&message) {
        Some(Command::PlayChess { args }) => {
            let request = PlayRequest::from_message(&message, args);
            tokio::spawn(run_match(Arc::clone(&state), request));
        }
        Some(Command::Help { topic }) => {
            tokio::spawn(answer_help(Arc::clone(&state), message, topic));
        }
        None => debug!(channel = %message.channel_id, "Ignoring message"),
    }

    StatusCode::ACCEPTED
}

async fn run_match(state: Arc<AppState>, request: PlayRequest) {
    let channel_id = request.channel_id.clone();
    info!(channel = %channel_id, author = %request.author_id, "Starting match setup");

    match game::play(&state.ctx, request, ShakmatyRules::new()).await {
        Ok(Some(report)) => match archive(&state).record(&report) {
            Ok(id) => info!(id, channel = %channel_id, "Archived match"),
            Err(e) => error!("Failed to archive match in {}: {}", channel_id, e),
        },
        Ok(None) => {}
        Err(e) => {
            error!("Match in {} failed: {}", channel_id, e);
            if let Err(e) = state
                .ctx
                .transport
                .send_message(&channel_id, OutgoingMessage::text(FAILURE_NOTICE))
                .await
            {
                error!("Failed to send failure notice to {}: {}", channel_id, e);
            }
        }
    }
}

async fn answer_help(state: Arc<AppState>, message: Message, topic: Option<String>) {
    let text = state.help.respond(topic.as_deref()).await;
    let reply = OutgoingMessage::text(text).replying_to(&message.id);
    if let Err(e) = state.ctx.transport.send_message(&message.channel_id, reply).await {
        warn!("Failed to send help to {}: {}", message.channel_id, e);
    }
}

#[derive(Debug, Deserialize)]
pub struct MatchesQuery {
    pub limit: Option<u32>,
    pub player: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MatchRow {
    pub id: i64,
    pub white: String,
    pub black: String,
    pub against_engine: bool,
    pub resolution: String,
    pub winner: Option<String>,
    pub moves: u32,
    pub final_fen: String,
    pub finished: String,
}

impl From<StoredMatch> for MatchRow {
    fn from(m: StoredMatch) -> Self {
        let finished = chrono::DateTime::from_timestamp(m.finished_at as i64, 0)
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();

        MatchRow {
            id: m.id,
            white: m.white_id,
            black: m.black_id,
            against_engine: m.against_engine,
            resolution: m.resolution,
            winner: m.winner_id,
            moves: m.move_count,
            final_fen: m.final_fen,
            finished,
        }
    }
}

pub async fn matches_list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MatchesQuery>,
) -> Result<Json<Vec<MatchRow>>, StatusCode> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let archive = archive(&state);

    let stored = match query.player.as_deref() {
        Some(player) => archive.matches_for_player(player, limit),
        None => archive.recent_matches(limit),
    }
    .map_err(|e| {
        error!("Failed to read matches: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(stored.into_iter().map(MatchRow::from).collect()))
}

pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<ArchiveStats>, StatusCode> {
    archive(&state).stats().map(Json).map_err(|e| {
        error!("Failed to read archive stats: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

pub async fn health() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chess_bot_core::game::{MatchReport, Resolution};
    use chess_bot_core::{
        ChatTransport, HelpBook, MatchContext, MessageBus, RenderAssets, Side, StockfishLauncher,
    };

    #[derive(Default)]
    struct SilentChat {
        sent: Mutex<Vec<(String, OutgoingMessage)>>,
    }

    #[async_trait]
    impl ChatTransport for SilentChat {
        async fn send_message(&self, channel_id: &str, message: OutgoingMessage) -> chess_bot_core::Result<()> {
            self.sent.lock().unwrap().push((channel_id.to_string(), message));
            Ok(())
        }

        async fn upload_attachment(&self, _: Vec<u8>, _: &str, _: &str) -> chess_bot_core::Result<String> {
            Ok("file".into())
        }
    }

    fn state() -> Arc<AppState> {
        Arc::new(AppState {
            ctx: MatchContext {
                transport: Arc::new(SilentChat::default()),
                bus: MessageBus::new(),
                launcher: Arc::new(StockfishLauncher::new("stockfish")),
                assets: Arc::new(RenderAssets::new()),
                bot_id: "bot".into(),
                search_depth: 15,
            },
            archive: Mutex::new(MatchArchive::open_in_memory().unwrap()),
            help: HelpBook::new("command-help"),
        })
    }

    fn message(author: &str, content: &str) -> Message {
        Message {
            id: "m1".into(),
            channel_id: "c1".into(),
            author_id: author.into(),
            content: Some(content.into()),
            mentions: vec![],
        }
    }

    #[tokio::test]
    async fn test_pending_prompt_claims_event() {
        let state = state();
        let waiting = state.ctx.bus.register("c1", Some("alice"));

        let status = receive_event(State(Arc::clone(&state)), Json(message("alice", "e2e4"))).await;

        assert_eq!(status, StatusCode::ACCEPTED);
        let got = waiting.recv().await.unwrap();
        assert_eq!(got.content.as_deref(), Some("e2e4"));
    }

    #[tokio::test]
    async fn test_bot_messages_are_ignored() {
        let state = state();
        let _waiting = state.ctx.bus.register("c1", None);

        let status = receive_event(State(Arc::clone(&state)), Json(message("bot", "/help"))).await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(state.ctx.bus.pending(), 1);
    }

    #[tokio::test]
    async fn test_matches_list_and_stats() {
        let state = state();
        archive(&state)
            .record(&MatchReport {
                channel_id: "c1".into(),
                white_id: "alice".into(),
                black_id: "bot".into(),
                against_engine: true,
                resolution: Resolution::Checkmate { winner: Side::White },
                moves: vec!["e2e4".into()],
                final_fen: "8/8/8/8/8/8/8/8 w - - 0 1".into(),
            })
            .unwrap();

        let query = MatchesQuery {
            limit: None,
            player: Some("alice".into()),
        };
        let Json(rows) = matches_list(State(Arc::clone(&state)), Query(query)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].winner.as_deref(), Some("alice"));
        assert_eq!(rows[0].resolution, "checkmate");
        assert!(!rows[0].finished.is_empty());

        let Json(totals) = stats(State(state)).await.unwrap();
        assert_eq!(totals.against_engine, 1);
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(health().await, "OK");
    }
}

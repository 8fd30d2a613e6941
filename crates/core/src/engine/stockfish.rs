//! Stockfish chess engine interface
//!
//! Spawns Stockfish as a subprocess and communicates via UCI protocol.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use super::analysis::SearchResult;
use super::options::EngineOptions;
use super::{EngineError, EngineLauncher, SearchEngine};

/// How long `quit` waits for the process to exit before killing it
const QUIT_GRACE: Duration = Duration::from_millis(500);

/// Lifecycle of one engine session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Created,
    Initialized,
    Configured,
    Ready,
    Terminated,
}

type EngineInput = Box<dyn AsyncWrite + Send + Unpin>;
type EngineOutput = BufReader<Box<dyn AsyncRead + Send + Unpin>>;

/// Wrapper around a UCI engine process
pub struct StockfishEngine {
    /// The child process, absent when attached to existing pipes
    process: Option<Child>,
    /// Stdin for sending commands
    stdin: EngineInput,
    /// Stdout reader for receiving responses
    stdout: EngineOutput,
    state: EngineState,
}

impl StockfishEngine {
    /// Spawns the engine binary and completes the UCI handshake
    ///
    /// # Arguments
    /// * `path` - Path to stockfish binary (or "stockfish" if in PATH)
    pub async fn spawn(path: &str) -> Result<Self, EngineError> {
        let mut process = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineError::Spawn(format!("{}: {}", path, e)))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| EngineError::Spawn("Failed to open stdin".into()))?;

        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| EngineError::Spawn("Failed to open stdout".into()))?;

        let mut engine = Self::attach(stdout, stdin);
        engine.process = Some(process);
        engine.init().await?;

        Ok(engine)
    }

    /// Wraps an engine already reachable through a pair of pipes
    pub fn attach(
        output: impl AsyncRead + Send + Unpin + 'static,
        input: impl AsyncWrite + Send + Unpin + 'static,
    ) -> Self {
        let output: Box<dyn AsyncRead + Send + Unpin> = Box::new(output);
        Self {
            process: None,
            stdin: Box::new(input),
            stdout: BufReader::new(output),
            state: EngineState::Created,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    async fn send(&mut self, cmd: &str) -> Result<(), EngineError> {
        debug!(target: "uci", "> {}", cmd);
        self.stdin.write_all(cmd.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String, EngineError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line).await? == 0 {
            return Err(EngineError::Exited);
        }
        let line = line.trim().to_string();
        debug!(target: "uci", "< {}", line);
        Ok(line)
    }

    /// Reads lines until one starts with `expected`
    async fn read_until(&mut self, expected: &str) -> Result<Vec<String>, EngineError> {
        let mut lines = Vec::new();
        loop {
            let line = self.read_line().await?;
            let done = line.starts_with(expected);
            lines.push(line);
            if done {
                break;
            }
        }
        Ok(lines)
    }

    fn expect_state(&self, expected: EngineState) -> Result<(), EngineError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(EngineError::WrongState {
                state: self.state,
                expected,
            })
        }
    }

    /// UCI handshake
    pub async fn init(&mut self) -> Result<(), EngineError> {
        self.expect_state(EngineState::Created)?;
        self.send("uci").await?;
        self.read_until("uciok").await?;
        self.state = EngineState::Initialized;
        Ok(())
    }

    /// Sends every option, in order, as its own `setoption` command
    pub async fn configure(&mut self, options: &EngineOptions) -> Result<(), EngineError> {
        self.expect_state(EngineState::Initialized)?;
        for (option, value) in options.iter() {
            if value.chars().any(char::is_control) {
                return Err(EngineError::Protocol(format!(
                    "value for {} must be a single line",
                    option.uci_name()
                )));
            }
            self.send(&format!("setoption name {} value {}", option.uci_name(), value))
                .await?;
        }
        self.state = EngineState::Configured;
        Ok(())
    }

    /// Starts a fresh game and waits for `readyok`
    pub async fn ready(&mut self) -> Result<(), EngineError> {
        self.expect_state(EngineState::Configured)?;
        self.send("ucinewgame").await?;
        self.send("isready").await?;
        self.read_until("readyok").await?;
        self.state = EngineState::Ready;
        Ok(())
    }

    /// Sets the position from a FEN string
    pub async fn set_position(&mut self, fen: &str) -> Result<(), EngineError> {
        self.expect_state(EngineState::Ready)?;
        self.send(&format!("position fen {}", fen)).await
    }

    /// Searches the current position to a fixed depth
    pub async fn analyze(&mut self, depth: u8) -> Result<SearchResult, EngineError> {
        self.expect_state(EngineState::Ready)?;
        self.send(&format!("go depth {}", depth)).await?;

        let mut result = SearchResult::default();
        loop {
            let line = self.read_line().await?;
            if line.starts_with("info") {
                result.absorb_info(&line);
            } else if result.absorb_bestmove(&line) {
                break;
            }
        }

        if result.best_move.is_empty() || result.best_move == "(none)" {
            return Err(EngineError::Protocol(format!(
                "no best move returned at depth {}",
                depth
            )));
        }

        debug!(target: "uci", "{}", result.summary());
        Ok(result)
    }

    /// Quits the engine and reaps the process
    pub async fn quit(&mut self) -> Result<(), EngineError> {
        if self.state == EngineState::Terminated {
            return Ok(());
        }
        self.state = EngineState::Terminated;

        if let Err(e) = self.send("quit").await {
            debug!("engine did not accept quit: {}", e);
        }

        if let Some(mut process) = self.process.take() {
            match tokio::time::timeout(QUIT_GRACE, process.wait()).await {
                Ok(status) => {
                    status?;
                }
                Err(_) => {
                    warn!("engine ignored quit, killing it");
                    process.kill().await?;
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SearchEngine for StockfishEngine {
    async fn sync_position(&mut self, fen: &str) -> Result<(), EngineError> {
        self.set_position(fen).await
    }

    async fn search(&mut self, depth: u8) -> Result<SearchResult, EngineError> {
        self.analyze(depth).await
    }

    async fn terminate(&mut self) -> Result<(), EngineError> {
        self.quit().await
    }
}

/// Launches Stockfish processes from a binary path
#[derive(Debug, Clone)]
pub struct StockfishLauncher {
    path: String,
}

impl StockfishLauncher {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl EngineLauncher for StockfishLauncher {
    async fn launch(&self, options: &EngineOptions) -> Result<Box<dyn SearchEngine>, EngineError> {
        let mut engine = StockfishEngine::spawn(&self.path).await?;
        let configured = async {
            engine.configure(options).await?;
            engine.ready().await
        }
        .await;

        if let Err(e) = configured {
            let _ = engine.quit().await;
            return Err(e);
        }
        Ok(Box::new(engine))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineOption;
    use tokio::io::{duplex, DuplexStream};
    use tokio::task::JoinHandle;

    /// Minimal scripted engine; returns every command it received
    fn fake_engine(commands: DuplexStream, mut replies: DuplexStream) -> JoinHandle<Vec<String>> {
        tokio::spawn(async move {
            let mut lines = BufReader::new(commands).lines();
            let mut seen = Vec::new();
            while let Ok(Some(line)) = lines.next_line().await {
                seen.push(line.clone());
                let reply = match line.as_str() {
                    "uci" => "id name Fake\noption name Hash type spin\nuciok\n",
                    "isready" => "readyok\n",
                    "quit" => break,
                    l if l.starts_with("go") => {
                        "info depth 1 score cp 13 pv e7e5\ninfo depth 2 score cp 20 pv e7e5 g1f3\nbestmove e7e5 ponder g1f3\n"
                    }
                    _ => "",
                };
                if replies.write_all(reply.as_bytes()).await.is_err() {
                    break;
                }
            }
            seen
        })
    }

    fn attached() -> (StockfishEngine, JoinHandle<Vec<String>>) {
        let (engine_stdin, script_commands) = duplex(4096);
        let (script_replies, engine_stdout) = duplex(4096);
        let script = fake_engine(script_commands, script_replies);
        (StockfishEngine::attach(engine_stdout, engine_stdin), script)
    }

    #[tokio::test]
    async fn test_full_session_protocol() {
        let (mut engine, script) = attached();
        let options = EngineOptions::default();

        engine.init().await.unwrap();
        assert_eq!(engine.state(), EngineState::Initialized);
        engine.configure(&options).await.unwrap();
        assert_eq!(engine.state(), EngineState::Configured);
        engine.ready().await.unwrap();
        assert_eq!(engine.state(), EngineState::Ready);

        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
        engine.set_position(fen).await.unwrap();
        let result = engine.analyze(15).await.unwrap();
        assert_eq!(result.best_move, "e7e5");
        assert_eq!(result.ponder.as_deref(), Some("g1f3"));
        assert_eq!(result.depth, 2);
        engine.quit().await.unwrap();

        let seen = script.await.unwrap();
        let mut expected = vec!["uci".to_string()];
        for option in EngineOption::ALL {
            expected.push(format!(
                "setoption name {} value {}",
                option.uci_name(),
                options.get(option)
            ));
        }
        expected.extend([
            "ucinewgame".to_string(),
            "isready".to_string(),
            format!("position fen {}", fen),
            "go depth 15".to_string(),
            "quit".to_string(),
        ]);
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn test_overridden_values_pass_through() {
        let (mut engine, script) = attached();
        let mut options = EngineOptions::default();
        options.set(EngineOption::SkillLevel, "3");

        engine.init().await.unwrap();
        engine.configure(&options).await.unwrap();
        engine.quit().await.unwrap();

        let seen = script.await.unwrap();
        assert!(seen.contains(&"setoption name Skill Level value 3".to_string()));
    }

    #[tokio::test]
    async fn test_multiline_value_is_never_sent() {
        let (mut engine, script) = attached();
        let mut options = EngineOptions::default();
        options.set(EngineOption::Threads, "1\nquit");

        engine.init().await.unwrap();
        match engine.configure(&options).await {
            Err(EngineError::Protocol(msg)) => assert!(msg.contains("Threads")),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(engine.state(), EngineState::Initialized);
        engine.quit().await.unwrap();

        let seen = script.await.unwrap();
        assert_eq!(seen, vec!["uci".to_string(), "quit".to_string()]);
    }

    #[tokio::test]
    async fn test_search_before_ready_is_rejected() {
        let (mut engine, _script) = attached();
        engine.init().await.unwrap();
        match engine.analyze(10).await {
            Err(EngineError::WrongState { state, expected }) => {
                assert_eq!(state, EngineState::Initialized);
                assert_eq!(expected, EngineState::Ready);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_closed_output_is_reported() {
        let (engine_stdin, _commands) = duplex(64);
        let (replies, engine_stdout) = duplex(64);
        drop(replies);
        let mut engine = StockfishEngine::attach(engine_stdout, engine_stdin);
        assert!(matches!(engine.init().await, Err(EngineError::Exited)));
    }

    #[tokio::test]
    async fn test_quit_twice_is_harmless() {
        let (mut engine, _script) = attached();
        engine.quit().await.unwrap();
        engine.quit().await.unwrap();
        assert_eq!(engine.state(), EngineState::Terminated);
    }

    #[tokio::test]
    #[ignore] // Ignore by default - requires stockfish installed
    async fn test_stockfish_best_move() {
        let launcher = StockfishLauncher::new("stockfish");
        let mut engine = launcher.launch(&EngineOptions::default()).await.unwrap();
        engine
            .sync_position("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
            .await
            .unwrap();
        let result = engine.search(8).await.unwrap();
        assert_eq!(result.best_move.len(), 4);
        engine.terminate().await.unwrap();
    }
}

//! Search results reported by a UCI engine

use std::fmt;

/// Score from the point of view of the side to move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Centipawn score
    Centipawns(i32),
    /// Forced mate in N moves (negative when the side to move is mated)
    Mate(i32),
}

impl Default for Evaluation {
    fn default() -> Self {
        Evaluation::Centipawns(0)
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Centipawns(cp) => {
                let score = *cp as f32 / 100.0;
                if score >= 0.0 {
                    write!(f, "+{:.2}", score)
                } else {
                    write!(f, "{:.2}", score)
                }
            }
            Evaluation::Mate(moves) => write!(f, "M{}", moves),
        }
    }
}

/// Result of one `go depth N` search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    /// Best move in coordinate notation (e.g. "e2e4")
    pub best_move: String,
    /// Move the engine expects in reply, if it said
    pub ponder: Option<String>,
    pub evaluation: Evaluation,
    /// Deepest iteration reported
    pub depth: u8,
    /// Principal variation
    pub pv: Vec<String>,
}

impl SearchResult {
    pub fn summary(&self) -> String {
        format!(
            "Eval: {} | Best: {} | Depth: {} | PV: {}",
            self.evaluation,
            self.best_move,
            self.depth,
            self.pv.iter().take(5).cloned().collect::<Vec<_>>().join(" ")
        )
    }

    /// Folds one `info ...` line into the running result
    pub fn absorb_info(&mut self, line: &str) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let mut i = 1;

        while i < parts.len() {
            match parts[i] {
                "depth" => {
                    if let Some(depth) = parts.get(i + 1).and_then(|d| d.parse().ok()) {
                        self.depth = depth;
                    }
                    i += 2;
                }
                "score" => {
                    let value = parts.get(i + 2).and_then(|v| v.parse::<i32>().ok());
                    match (parts.get(i + 1), value) {
                        (Some(&"cp"), Some(cp)) => self.evaluation = Evaluation::Centipawns(cp),
                        (Some(&"mate"), Some(m)) => self.evaluation = Evaluation::Mate(m),
                        _ => {}
                    }
                    i += 3;
                }
                "pv" => {
                    // Everything after "pv" is the principal variation
                    self.pv = parts[i + 1..].iter().map(|s| s.to_string()).collect();
                    break;
                }
                _ => i += 1,
            }
        }
    }

    /// Reads `bestmove <move> [ponder <move>]`. Returns false for other lines.
    pub fn absorb_bestmove(&mut self, line: &str) -> bool {
        let mut parts = line.split_whitespace();
        if parts.next() != Some("bestmove") {
            return false;
        }
        self.best_move = parts.next().unwrap_or_default().to_string();
        if parts.next() == Some("ponder") {
            self.ponder = parts.next().map(str::to_string);
        }
        true
    }
}

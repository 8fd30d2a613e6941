//! Archive rows

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMatch {
    pub id: i64,
    pub channel_id: String,
    pub white_id: String,
    pub black_id: String,
    pub against_engine: bool,
    pub resolution: String,
    pub winner_id: Option<String>,
    /// Coordinate-notation moves separated by spaces
    pub moves: String,
    pub move_count: u32,
    pub final_fen: String,
    /// Unix seconds
    pub finished_at: u64,
}

impl StoredMatch {
    pub fn move_list(&self) -> Vec<&str> {
        self.moves.split_whitespace().collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveStats {
    pub total: u32,
    pub against_engine: u32,
    pub decisive: u32,
}

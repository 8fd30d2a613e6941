//! Database operations

use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use super::models::*;
use crate::error::Result;
use crate::game::MatchReport;

const SELECT_MATCH: &str = r#"
    SELECT id, channel_id, white_id, black_id, against_engine, resolution,
           winner_id, moves, move_count, final_fen, finished_at
    FROM matches
"#;

pub struct MatchArchive {
    conn: Connection,
}

impl MatchArchive {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let archive = Self { conn };
        archive.init_schema()?;
        Ok(archive)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let archive = Self { conn };
        archive.init_schema()?;
        Ok(archive)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS matches (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                channel_id TEXT NOT NULL,
                white_id TEXT NOT NULL,
                black_id TEXT NOT NULL,
                against_engine INTEGER NOT NULL,
                resolution TEXT NOT NULL,
                winner_id TEXT,
                moves TEXT NOT NULL,
                move_count INTEGER NOT NULL,
                final_fen TEXT NOT NULL,
                finished_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_matches_finished_at ON matches(finished_at);
            CREATE INDEX IF NOT EXISTS idx_matches_channel ON matches(channel_id);
            "#,
        )?;
        Ok(())
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }

    fn row_to_match(row: &Row<'_>) -> rusqlite::Result<StoredMatch> {
        Ok(StoredMatch {
            id: row.get(0)?,
            channel_id: row.get(1)?,
            white_id: row.get(2)?,
            black_id: row.get(3)?,
            against_engine: row.get(4)?,
            resolution: row.get(5)?,
            winner_id: row.get(6)?,
            moves: row.get(7)?,
            move_count: row.get(8)?,
            final_fen: row.get(9)?,
            finished_at: row.get(10)?,
        })
    }

    /// Stores a finished match and returns its row id
    pub fn record(&self, report: &MatchReport) -> Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO matches
            (channel_id, white_id, black_id, against_engine, resolution, winner_id,
             moves, move_count, final_fen, finished_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                report.channel_id,
                report.white_id,
                report.black_id,
                report.against_engine,
                report.resolution.label(),
                report.winner_id(),
                report.moves.join(" "),
                report.moves.len() as u32,
                report.final_fen,
                Self::now(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_match(&self, id: i64) -> Result<Option<StoredMatch>> {
        let mut stmt = self.conn.prepare(&format!("{} WHERE id = ?1", SELECT_MATCH))?;
        let mut rows = stmt.query_map(params![id], Self::row_to_match)?;
        Ok(rows.next().transpose()?)
    }

    /// Newest first
    pub fn recent_matches(&self, limit: u32) -> Result<Vec<StoredMatch>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} ORDER BY finished_at DESC, id DESC LIMIT ?1",
            SELECT_MATCH
        ))?;

        let matches = stmt
            .query_map(params![limit], Self::row_to_match)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(matches)
    }

    /// Matches a user played on either side, newest first
    pub fn matches_for_player(&self, user_id: &str, limit: u32) -> Result<Vec<StoredMatch>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE white_id = ?1 OR black_id = ?1 ORDER BY finished_at DESC, id DESC LIMIT ?2",
            SELECT_MATCH
        ))?;

        let matches = stmt
            .query_map(params![user_id, limit], Self::row_to_match)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(matches)
    }

    pub fn count_matches(&self) -> Result<u32> {
        let count: u32 = self
            .conn
            .query_row("SELECT COUNT(*) FROM matches", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn stats(&self) -> Result<ArchiveStats> {
        let stats = self.conn.query_row(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(against_engine), 0),
                   COALESCE(SUM(winner_id IS NOT NULL), 0)
            FROM matches
            "#,
            [],
            |row| {
                Ok(ArchiveStats {
                    total: row.get(0)?,
                    against_engine: row.get(1)?,
                    decisive: row.get(2)?,
                })
            },
        )?;
        Ok(stats)
    }
}

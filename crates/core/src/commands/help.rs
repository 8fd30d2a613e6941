//! `/help` backed by a directory of text files
//!
//! `<name>.short.txt` holds the one-line summary shown in the overview and
//! `<name>.long.txt` the full text for `/help <name>`.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::warn;

use crate::error::Result;

const SHORT_SUFFIX: &str = ".short.txt";
const LONG_SUFFIX: &str = ".long.txt";
const BANNER: &str = "Stockfish. A chess bot for Revolt.\nCommands:\n";

pub const UNAVAILABLE: &str = "Could not retrieve help files.";

#[derive(Debug, Clone)]
pub struct HelpBook {
    dir: PathBuf,
}

impl HelpBook {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Text to send for `/help [topic]`, or the fallback notice
    pub async fn respond(&self, topic: Option<&str>) -> String {
        let result = match topic {
            Some(topic) => self.topic(topic).await,
            None => self.overview().await,
        };

        result.unwrap_or_else(|e| {
            warn!("Error when reading a help file in {}: {}", self.dir.display(), e);
            UNAVAILABLE.to_string()
        })
    }

    /// Banner plus one `/<name>: <summary>` line per command, sorted by name
    pub async fn overview(&self) -> Result<String> {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if let Some(name) = file_name.strip_suffix(SHORT_SUFFIX) {
                names.push(name.to_string());
            }
        }
        names.sort();

        let mut text = String::from(BANNER);
        for name in names {
            let summary = fs::read_to_string(self.dir.join(format!("{}{}", name, SHORT_SUFFIX))).await?;
            text.push_str(&format!("\n/{}: {}", name, summary.trim()));
        }
        Ok(text)
    }

    pub async fn topic(&self, name: &str) -> Result<String> {
        let name = name.trim_start_matches('/');
        if name.is_empty() || name.contains(['/', '\\', '.']) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no help topic {:?}", name),
            )
            .into());
        }

        let text = fs::read_to_string(self.dir.join(format!("{}{}", name, LONG_SUFFIX))).await?;
        Ok(text.trim().to_string())
    }
}

//! Engine configuration negotiated during match setup

use std::fmt;

/// One configurable engine setting
///
/// `ALL` fixes the order in which options are both prompted for and sent to
/// the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineOption {
    Threads,
    Hash,
    Ponder,
    MultiPv,
    LimitStrength,
    Elo,
    SkillLevel,
    UseNnue,
}

impl EngineOption {
    pub const ALL: [EngineOption; 8] = [
        EngineOption::Threads,
        EngineOption::Hash,
        EngineOption::Ponder,
        EngineOption::MultiPv,
        EngineOption::LimitStrength,
        EngineOption::Elo,
        EngineOption::SkillLevel,
        EngineOption::UseNnue,
    ];

    /// Name shown to players
    pub fn key(self) -> &'static str {
        match self {
            EngineOption::Threads => "threads",
            EngineOption::Hash => "hash",
            EngineOption::Ponder => "ponder",
            EngineOption::MultiPv => "multi_pv",
            EngineOption::LimitStrength => "limit_strength",
            EngineOption::Elo => "elo",
            EngineOption::SkillLevel => "skill_level",
            EngineOption::UseNnue => "use_nnue",
        }
    }

    /// Name sent in `setoption name <...>`
    pub fn uci_name(self) -> &'static str {
        match self {
            EngineOption::Threads => "Threads",
            EngineOption::Hash => "Hash",
            EngineOption::Ponder => "Ponder",
            EngineOption::MultiPv => "MultiPV",
            EngineOption::LimitStrength => "UCI_LimitStrength",
            EngineOption::Elo => "UCI_Elo",
            EngineOption::SkillLevel => "Skill Level",
            EngineOption::UseNnue => "Use NNUE",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            EngineOption::Threads => "Number of search threads",
            EngineOption::Hash => "Hash table size in MB",
            EngineOption::Ponder => "Think on your time (true/false)",
            EngineOption::MultiPv => "Number of lines searched",
            EngineOption::LimitStrength => "Limit playing strength (true/false)",
            EngineOption::Elo => "Target rating when strength is limited",
            EngineOption::SkillLevel => "Skill level (0-20)",
            EngineOption::UseNnue => "Use the neural network evaluation (true/false)",
        }
    }

    pub fn default_value(self) -> String {
        match self {
            EngineOption::Threads => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
                .to_string(),
            EngineOption::Hash => "16".to_string(),
            EngineOption::Ponder => "true".to_string(),
            EngineOption::MultiPv => "1".to_string(),
            EngineOption::LimitStrength => "true".to_string(),
            EngineOption::Elo => "1320".to_string(),
            EngineOption::SkillLevel => "20".to_string(),
            EngineOption::UseNnue => "true".to_string(),
        }
    }
}

impl fmt::Display for EngineOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Ordered option values. Every option always has a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    values: Vec<(EngineOption, String)>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            values: EngineOption::ALL
                .iter()
                .map(|&option| (option, option.default_value()))
                .collect(),
        }
    }
}

impl EngineOptions {
    pub fn set(&mut self, option: EngineOption, value: impl Into<String>) {
        if let Some(slot) = self.values.iter_mut().find(|(o, _)| *o == option) {
            slot.1 = value.into();
        }
    }

    pub fn get(&self, option: EngineOption) -> &str {
        self.values
            .iter()
            .find(|(o, _)| *o == option)
            .map(|(_, value)| value.as_str())
            .unwrap_or_default()
    }

    /// Options in their fixed order
    pub fn iter(&self) -> impl Iterator<Item = (EngineOption, &str)> {
        self.values.iter().map(|(option, value)| (*option, value.as_str()))
    }
}

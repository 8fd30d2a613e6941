//! Setup replies: colour choice, yes/no confirmations, engine option values

use rand::Rng;

use super::words;
use crate::board::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorChoice {
    White,
    Black,
    Random,
}

impl ColorChoice {
    /// Turns the choice into a side. `Random` flips a fair coin on every call.
    pub fn resolve(self, rng: &mut impl Rng) -> Side {
        match self {
            ColorChoice::White => Side::White,
            ColorChoice::Black => Side::Black,
            ColorChoice::Random => {
                if rng.random_bool(0.5) {
                    Side::White
                } else {
                    Side::Black
                }
            }
        }
    }
}

/// Recognizes `white`, `black` or `random` in any casing
pub fn parse_color(text: &str) -> Option<ColorChoice> {
    match text.trim().to_lowercase().as_str() {
        "white" => Some(ColorChoice::White),
        "black" => Some(ColorChoice::Black),
        "random" => Some(ColorChoice::Random),
        _ => None,
    }
}

/// Reads a yes/no answer. `None` means neither or both were given.
pub fn parse_confirmation(text: &str) -> Option<bool> {
    let mut yes = false;
    let mut no = false;

    for word in words(text) {
        match word.to_lowercase().as_str() {
            "yes" | "agree" => yes = true,
            "no" | "abort" => no = true,
            _ => {}
        }
    }

    match (yes, no) {
        (true, false) => Some(true),
        (false, true) => Some(false),
        _ => None,
    }
}

/// A reply to one engine option prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionReply {
    Default,
    Value(String),
    Empty,
    /// Contains a line break or another control character
    Malformed,
}

pub fn parse_option_reply(text: &str) -> OptionReply {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return OptionReply::Empty;
    }
    if trimmed.chars().any(char::is_control) {
        return OptionReply::Malformed;
    }

    let lowered = trimmed.to_lowercase();
    if lowered == "default" || lowered == "use default" {
        OptionReply::Default
    } else {
        OptionReply::Value(trimmed.to_string())
    }
}

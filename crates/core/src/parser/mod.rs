//! Free-form chat text parsing

pub mod moves;
pub mod replies;

pub use moves::{parse_move_text, MoveIntent, NOTATION_HELP};
pub use replies::{parse_color, parse_confirmation, parse_option_reply, ColorChoice, OptionReply};

/// Splits chat text into alphanumeric words, so punctuation and emoji
/// around a token never hide it.
pub(crate) fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
}

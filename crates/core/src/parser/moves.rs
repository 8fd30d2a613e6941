//! Move notation parsing
//!
//! Players type moves in pure coordinate notation inside ordinary chat
//! messages. The parser pulls out the intent and leaves the rest alone.

use super::words;
use crate::board::{PieceKind, PlayerMove, Square};

/// Sent back when a message holds neither a move nor an abort request
pub const NOTATION_HELP: &str = "You must send a message in Pure Coordinate notation, meaning put the starting square first, then the ending square.
Like this: e2e4. Even castling is put in as something like e1g1 instead of O-O or O-O-O.
Some other examples:
  g1f3,
  g7g8q (pawn promotion, can use any of \"q\", \"r\", \"b\", or \"n\" to determine what the pawn is promoting to).
Send \"resign\" or \"abort\" to end the game.";

/// What a player meant by a chat message during their turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveIntent {
    Move(PlayerMove),
    Abort,
    NoMove,
}

/// Extracts the player's intent from a chat message
///
/// The whole word `abort` or `resign` anywhere wins over any move. Otherwise
/// the first word shaped like `e2e4` or `e7e8q` is the move.
pub fn parse_move_text(text: &str) -> MoveIntent {
    if words(text).any(|word| {
        word.eq_ignore_ascii_case("abort") || word.eq_ignore_ascii_case("resign")
    }) {
        return MoveIntent::Abort;
    }

    words(text)
        .find_map(parse_coordinate_move)
        .map_or(MoveIntent::NoMove, MoveIntent::Move)
}

/// Parses exactly one coordinate-notation token, such as `g1f3` or `b7b8N`
pub fn parse_coordinate_move(token: &str) -> Option<PlayerMove> {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() != 4 && chars.len() != 5 {
        return None;
    }

    let from = Square::from_chars(chars[0], chars[1])?;
    let to = Square::from_chars(chars[2], chars[3])?;

    let promotion = match chars.get(4) {
        Some(&c) => {
            let kind = PieceKind::from_letter(c.to_ascii_lowercase())?;
            if !kind.is_promotable() {
                return None;
            }
            Some(kind)
        }
        None => None,
    };

    Some(PlayerMove::new(from, to, promotion))
}

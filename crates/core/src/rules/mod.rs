//! Rules collaborator
//!
//! The orchestrator never judges moves itself. It hands each candidate to a
//! [`RulesEngine`] and acts on the [`MoveResult`] it gets back.

use std::collections::HashMap;

use shakmaty::{fen::Fen, uci::UciMove, Chess, EnPassantMode, Position};

use crate::board::PlayerMove;

/// Outcome of applying one move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    Invalid,
    Valid,
    Check,
    Checkmate,
    Stalemate,
    RepetitionDraw,
}

impl MoveResult {
    /// Whether the move was applied to the position
    pub fn is_accepted(self) -> bool {
        self != MoveResult::Invalid
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            MoveResult::Checkmate | MoveResult::Stalemate | MoveResult::RepetitionDraw
        )
    }
}

/// Authoritative, stateful position owner for one match
pub trait RulesEngine: Send {
    fn apply_move(&mut self, mv: &PlayerMove) -> MoveResult;

    /// Full FEN of the current position
    fn position_string(&self) -> String;
}

/// Rules collaborator backed by shakmaty
pub struct ShakmatyRules {
    position: Chess,
    seen: HashMap<String, u32>,
}

impl ShakmatyRules {
    pub fn new() -> Self {
        let mut rules = Self {
            position: Chess::default(),
            seen: HashMap::new(),
        };
        rules.record_position();
        rules
    }

    fn fen(&self) -> String {
        Fen::from_position(&self.position, EnPassantMode::Legal).to_string()
    }

    /// Counts the current position; clocks are excluded from the key
    fn record_position(&mut self) -> u32 {
        let key = self
            .fen()
            .split_whitespace()
            .take(4)
            .collect::<Vec<_>>()
            .join(" ");
        let count = self.seen.entry(key).or_insert(0);
        *count += 1;
        *count
    }
}

impl Default for ShakmatyRules {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesEngine for ShakmatyRules {
    fn apply_move(&mut self, mv: &PlayerMove) -> MoveResult {
        let uci: UciMove = match mv.to_string().parse() {
            Ok(uci) => uci,
            Err(_) => return MoveResult::Invalid,
        };

        let m = match uci.to_move(&self.position) {
            Ok(m) => m,
            Err(_) => return MoveResult::Invalid,
        };

        self.position = match self.position.clone().play(m) {
            Ok(next) => next,
            Err(_) => return MoveResult::Invalid,
        };

        let repetitions = self.record_position();

        if self.position.is_checkmate() {
            MoveResult::Checkmate
        } else if self.position.is_stalemate() {
            MoveResult::Stalemate
        } else if repetitions >= 3 {
            MoveResult::RepetitionDraw
        } else if self.position.is_check() {
            MoveResult::Check
        } else {
            MoveResult::Valid
        }
    }

    fn position_string(&self) -> String {
        self.fen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::moves::parse_coordinate_move;

    fn play(rules: &mut ShakmatyRules, moves: &[&str]) -> Vec<MoveResult> {
        moves
            .iter()
            .map(|m| rules.apply_move(&parse_coordinate_move(m).unwrap()))
            .collect()
    }

    #[test]
    fn test_pawn_advances() {
        let cases = [
            ("a2a3", "rnbqkbnr/pppppppp/8/8/8/P7/1PPPPPPP/RNBQKBNR b KQkq - 0 1"),
            ("e2e4", "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"),
            ("h2h4", "rnbqkbnr/pppppppp/8/8/7P/8/PPPPPPP1/RNBQKBNR b KQkq - 0 1"),
        ];
        for (mv, fen) in cases {
            let mut rules = ShakmatyRules::new();
            assert_eq!(play(&mut rules, &[mv]), vec![MoveResult::Valid]);
            assert_eq!(rules.position_string(), fen);
        }
    }

    #[test]
    fn test_illegal_move_leaves_position() {
        let mut rules = ShakmatyRules::new();
        let before = rules.position_string();
        assert_eq!(play(&mut rules, &["e2e5"]), vec![MoveResult::Invalid]);
        assert_eq!(play(&mut rules, &["e7e5"]), vec![MoveResult::Invalid]);
        assert_eq!(rules.position_string(), before);
    }

    #[test]
    fn test_fools_mate() {
        let mut rules = ShakmatyRules::new();
        let results = play(&mut rules, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert_eq!(results.last(), Some(&MoveResult::Checkmate));
    }

    #[test]
    fn test_check() {
        let mut rules = ShakmatyRules::new();
        let results = play(&mut rules, &["e2e4", "f7f6", "d1h5"]);
        assert_eq!(results.last(), Some(&MoveResult::Check));
    }

    #[test]
    fn test_threefold_repetition() {
        let mut rules = ShakmatyRules::new();
        let results = play(
            &mut rules,
            &["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"],
        );
        assert_eq!(&results[..7], &[MoveResult::Valid; 7]);
        assert_eq!(results[7], MoveResult::RepetitionDraw);
    }

    #[test]
    fn test_stalemate() {
        // Shortest known stalemate (Sam Loyd, 10 moves)
        let mut rules = ShakmatyRules::new();
        let results = play(
            &mut rules,
            &[
                "e2e3", "a7a5", "d1h5", "a8a6", "h5a5", "h7h5", "h2h4", "a6h6", "a5c7", "f7f6",
                "c7d7", "e8f7", "d7b7", "d8d3", "b7b8", "d3h7", "b8c8", "f7g6", "c8e6",
            ],
        );
        assert!(results[..18].iter().all(|r| r.is_accepted() && !r.is_terminal()));
        assert_eq!(results[18], MoveResult::Stalemate);
    }

    #[test]
    fn test_promotion_is_passed_through() {
        let mut rules = ShakmatyRules::new();
        let results = play(
            &mut rules,
            &["h2h4", "g7g5", "h4g5", "g8f6", "g5g6", "f6e4", "g6g7", "e4d6", "g7h8q"],
        );
        assert!(results.iter().all(|r| r.is_accepted()));
        assert!(rules.position_string().starts_with("rnbqkb1Q/"));
    }
}

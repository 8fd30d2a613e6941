//! FEN piece-placement decoding
//!
//! Only the first FEN field is read. Side to move, castling rights and the
//! clocks belong to the rules collaborator.

use thiserror::Error;

use super::{Board, Piece};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("empty position string")]
    Empty,
    #[error("expected 8 ranks, found {0}")]
    RankCount(usize),
    #[error("rank {rank} describes more than 8 files")]
    RankOverflow { rank: u8 },
    #[error("rank {rank} describes only {files} files")]
    RankUnderflow { rank: u8, files: usize },
    #[error("invalid run length {0:?}")]
    InvalidDigit(char),
    #[error("invalid piece letter {0:?}")]
    InvalidPiece(char),
}

/// Decodes the piece-placement field of a FEN string into a board
///
/// Trailing fields are ignored. Every rank must describe exactly eight
/// files; a run of `9` (or `0`) and unknown letters are rejected rather
/// than truncated.
pub fn decode(fen: &str) -> Result<Board, FenError> {
    let placement = fen.split_whitespace().next().ok_or(FenError::Empty)?;

    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::RankCount(ranks.len()));
    }

    let mut rows = [[None; 8]; 8];

    for (row, segment) in ranks.iter().enumerate() {
        let rank = 8 - row as u8;
        let mut file = 0usize;

        for c in segment.chars() {
            if let Some(run) = c.to_digit(10) {
                if !(1..=8).contains(&run) {
                    return Err(FenError::InvalidDigit(c));
                }
                file += run as usize;
                if file > 8 {
                    return Err(FenError::RankOverflow { rank });
                }
            } else {
                let piece = Piece::from_fen_char(c).ok_or(FenError::InvalidPiece(c))?;
                if file >= 8 {
                    return Err(FenError::RankOverflow { rank });
                }
                rows[row][file] = Some(piece);
                file += 1;
            }
        }

        if file != 8 {
            return Err(FenError::RankUnderflow { rank, files: file });
        }
    }

    Ok(Board::from_rows(rows))
}

/// Encodes a board back into a FEN piece-placement field
pub fn encode(board: &Board) -> String {
    let mut out = String::with_capacity(72);

    for (row, cells) in board.rows().iter().enumerate() {
        if row > 0 {
            out.push('/');
        }
        let mut empty = 0u8;
        for cell in cells {
            match cell {
                Some(piece) => {
                    if empty > 0 {
                        out.push((b'0' + empty) as char);
                        empty = 0;
                    }
                    out.push(piece.fen_char());
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            out.push((b'0' + empty) as char);
        }
    }

    out
}

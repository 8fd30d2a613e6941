//! Board value types
//!
//! Everything here is a disposable projection of the rules collaborator's
//! position. Boards are decoded fresh from FEN for every rendering call.

pub mod fen;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// One of the two players' colours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Side to act on the given zero-based ply. White always moves first.
    pub fn for_ply(ply: usize) -> Side {
        if ply % 2 == 0 {
            Side::White
        } else {
            Side::Black
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::White => "white",
            Side::Black => "black",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Maps a lowercase FEN letter to its piece kind
    pub fn from_letter(letter: char) -> Option<PieceKind> {
        match letter {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PieceKind::Pawn => "pawn",
            PieceKind::Knight => "knight",
            PieceKind::Bishop => "bishop",
            PieceKind::Rook => "rook",
            PieceKind::Queen => "queen",
            PieceKind::King => "king",
        }
    }

    /// Kinds a pawn may promote to
    pub fn is_promotable(self) -> bool {
        matches!(
            self,
            PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub side: Side,
}

impl Piece {
    pub fn new(kind: PieceKind, side: Side) -> Self {
        Self { kind, side }
    }

    /// Decodes a FEN piece letter. Uppercase is White, lowercase is Black.
    pub fn from_fen_char(c: char) -> Option<Piece> {
        let kind = PieceKind::from_letter(c.to_ascii_lowercase())?;
        let side = if c.is_ascii_uppercase() {
            Side::White
        } else {
            Side::Black
        };
        Some(Piece { kind, side })
    }

    pub fn fen_char(self) -> char {
        match self.side {
            Side::White => self.kind.letter().to_ascii_uppercase(),
            Side::Black => self.kind.letter(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid square: {0:?}")]
pub struct SquareError(pub String);

/// A board square. `file` and `rank` are both zero-based, so a1 is (0, 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    pub fn new(file: u8, rank: u8) -> Option<Square> {
        if file < 8 && rank < 8 {
            Some(Square { file, rank })
        } else {
            None
        }
    }

    /// Indices are taken modulo 8
    pub(crate) fn wrapping(file: usize, rank: usize) -> Square {
        Square {
            file: (file % 8) as u8,
            rank: (rank % 8) as u8,
        }
    }

    pub fn file(self) -> u8 {
        self.file
    }

    pub fn rank(self) -> u8 {
        self.rank
    }

    /// Parses two characters such as `e2`, ignoring case of the file letter
    pub fn from_chars(file: char, rank: char) -> Option<Square> {
        let file = file.to_ascii_lowercase();
        if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }
        Some(Square {
            file: file as u8 - b'a',
            rank: rank as u8 - b'1',
        })
    }
}

impl FromStr for Square {
    type Err = SquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(f), Some(r), None) => {
                Square::from_chars(f, r).ok_or_else(|| SquareError(s.to_string()))
            }
            _ => Err(SquareError(s.to_string())),
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file) as char, self.rank + 1)
    }
}

/// A move in pure coordinate notation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl PlayerMove {
    pub fn new(from: Square, to: Square, promotion: Option<PieceKind>) -> Self {
        Self { from, to, promotion }
    }

    pub fn last_move(&self) -> LastMove {
        LastMove {
            from: self.from,
            to: self.to,
        }
    }
}

impl fmt::Display for PlayerMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.letter())?;
        }
        Ok(())
    }
}

/// Origin and destination of the previous ply, kept only for highlighting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastMove {
    pub from: Square,
    pub to: Square,
}

impl LastMove {
    pub fn touches(&self, square: Square) -> bool {
        self.from == square || self.to == square
    }
}

/// 8x8 grid, rank-major with rank 8 in row 0 as FEN writes it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Board {
    rows: [[Option<Piece>; 8]; 8],
}

impl Board {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: [[Option<Piece>; 8]; 8]) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[[Option<Piece>; 8]; 8] {
        &self.rows
    }

    /// Cell at FEN row (0 = rank 8) and file
    pub fn cell(&self, row: usize, file: usize) -> Option<Piece> {
        self.rows[row][file]
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.rows[7 - square.rank() as usize][square.file() as usize]
    }

    pub fn set(&mut self, square: Square, piece: Option<Piece>) {
        self.rows[7 - square.rank() as usize][square.file() as usize] = piece;
    }

    pub fn occupied(&self) -> usize {
        self.rows.iter().flatten().filter(|cell| cell.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_alternates_from_white() {
        assert_eq!(Side::for_ply(0), Side::White);
        assert_eq!(Side::for_ply(1), Side::Black);
        assert_eq!(Side::for_ply(10), Side::White);
        assert_eq!(Side::White.opposite(), Side::Black);
    }

    #[test]
    fn test_square_parsing() {
        let sq: Square = "e2".parse().unwrap();
        assert_eq!((sq.file(), sq.rank()), (4, 1));
        assert_eq!(sq.to_string(), "e2");
        assert_eq!("H8".parse::<Square>().unwrap().to_string(), "h8");
        assert!("i1".parse::<Square>().is_err());
        assert!("a9".parse::<Square>().is_err());
        assert!("a10".parse::<Square>().is_err());
    }

    #[test]
    fn test_piece_letters() {
        assert_eq!(
            Piece::from_fen_char('N'),
            Some(Piece::new(PieceKind::Knight, Side::White))
        );
        assert_eq!(
            Piece::from_fen_char('k'),
            Some(Piece::new(PieceKind::King, Side::Black))
        );
        assert_eq!(Piece::from_fen_char('x'), None);
        assert_eq!(Piece::new(PieceKind::Queen, Side::White).fen_char(), 'Q');
    }

    #[test]
    fn test_board_square_addressing() {
        let mut board = Board::empty();
        let e4: Square = "e4".parse().unwrap();
        board.set(e4, Some(Piece::new(PieceKind::Pawn, Side::White)));
        assert_eq!(board.cell(4, 4), Some(Piece::new(PieceKind::Pawn, Side::White)));
        assert_eq!(board.piece_at(e4).map(|p| p.kind), Some(PieceKind::Pawn));
        assert_eq!(board.occupied(), 1);
    }

    #[test]
    fn test_move_display() {
        let mv = PlayerMove::new(
            "e7".parse().unwrap(),
            "e8".parse().unwrap(),
            Some(PieceKind::Queen),
        );
        assert_eq!(mv.to_string(), "e7e8q");
        assert!(mv.last_move().touches("e8".parse().unwrap()));
    }
}

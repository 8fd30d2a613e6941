//! Board rendering
//!
//! Output depends only on the board, the perspective and the last-move
//! hint, so the same inputs and assets always give the same pixels.

pub mod assets;

use std::io::Cursor;

use image::{imageops, DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut, draw_text_mut};
use imageproc::rect::Rect;

use crate::board::{Board, LastMove, Piece, Side, Square};
use crate::error::Result;

pub use assets::RenderAssets;

pub const SQUARE_SIZE: u32 = 60;
pub const BOARD_SIZE: u32 = SQUARE_SIZE * 8;
pub const PIECE_INSET: u32 = 6;
pub const PIECE_SIZE: u32 = SQUARE_SIZE - 2 * PIECE_INSET;

pub const LIGHT: Rgba<u8> = Rgba([0xFF, 0xFF, 0xFF, 0xFF]);
pub const DARK: Rgba<u8> = Rgba([0x66, 0xBB, 0x6A, 0xFF]);
pub const HIGHLIGHT: Rgba<u8> = Rgba([0xF6, 0xF6, 0x69, 0xFF]);

const WHITE_DISC: Rgba<u8> = Rgba([0xF5, 0xF5, 0xF5, 0xFF]);
const BLACK_DISC: Rgba<u8> = Rgba([0x21, 0x21, 0x21, 0xFF]);
const DISC_OUTLINE: Rgba<u8> = Rgba([0x00, 0x00, 0x00, 0xFF]);

const LABEL_SCALE: f32 = 14.0;
const LABEL_MARGIN: i32 = 3;

pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Shading of the square at display row and column
pub fn is_light(row: usize, col: usize) -> bool {
    (row ^ col) & 1 == 0
}

/// Board square drawn at display (row, col) for the given viewer
pub fn square_at(perspective: Side, row: usize, col: usize) -> Square {
    let (file, rank) = match perspective {
        Side::White => (col, 7 - row),
        Side::Black => (7 - col, row),
    };
    Square::wrapping(file, rank)
}

pub fn rank_label(perspective: Side, row: usize) -> char {
    let rank = match perspective {
        Side::White => 8 - row,
        Side::Black => row + 1,
    };
    (b'0' + rank as u8) as char
}

pub fn file_label(perspective: Side, col: usize) -> char {
    let file = match perspective {
        Side::White => col,
        Side::Black => 7 - col,
    };
    (b'a' + file as u8) as char
}

pub struct BoardRenderer<'a> {
    assets: &'a RenderAssets,
}

impl<'a> BoardRenderer<'a> {
    pub fn new(assets: &'a RenderAssets) -> Self {
        Self { assets }
    }

    pub fn render(&self, board: &Board, perspective: Side, last_move: Option<LastMove>) -> RgbaImage {
        let mut canvas = RgbaImage::new(BOARD_SIZE, BOARD_SIZE);

        for row in 0..8 {
            for col in 0..8 {
                let square = square_at(perspective, row, col);
                let x = (col as u32 * SQUARE_SIZE) as i32;
                let y = (row as u32 * SQUARE_SIZE) as i32;

                let light = is_light(row, col);
                let fill = match last_move {
                    Some(m) if m.touches(square) => HIGHLIGHT,
                    _ if light => LIGHT,
                    _ => DARK,
                };
                draw_filled_rect_mut(&mut canvas, Rect::at(x, y).of_size(SQUARE_SIZE, SQUARE_SIZE), fill);

                if let Some(piece) = board.piece_at(square) {
                    self.draw_piece(&mut canvas, piece, x, y);
                }

                let label_color = if light { DARK } else { LIGHT };
                if col == 0 {
                    self.draw_label(
                        &mut canvas,
                        label_color,
                        x + LABEL_MARGIN,
                        y + LABEL_MARGIN,
                        rank_label(perspective, row),
                    );
                }
                if row == 7 {
                    let size = SQUARE_SIZE as i32;
                    self.draw_label(
                        &mut canvas,
                        label_color,
                        x + size - LABEL_SCALE as i32,
                        y + size - LABEL_SCALE as i32 - LABEL_MARGIN,
                        file_label(perspective, col),
                    );
                }
            }
        }

        canvas
    }

    /// Renders and encodes as PNG
    pub fn render_png(&self, board: &Board, perspective: Side, last_move: Option<LastMove>) -> Result<Vec<u8>> {
        let image = self.render(board, perspective, last_move);
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(image).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    fn draw_piece(&self, canvas: &mut RgbaImage, piece: Piece, x: i32, y: i32) {
        let inset = PIECE_INSET as i32;
        match self.assets.piece(piece) {
            Some(image) => {
                imageops::overlay(canvas, image, (x + inset) as i64, (y + inset) as i64);
            }
            None => {
                let half = SQUARE_SIZE as i32 / 2;
                let center = (x + half, y + half);
                let radius = PIECE_SIZE as i32 / 2 - 4;
                let fill = match piece.side {
                    Side::White => WHITE_DISC,
                    Side::Black => BLACK_DISC,
                };
                draw_filled_circle_mut(canvas, center, radius, fill);
                draw_hollow_circle_mut(canvas, center, radius, DISC_OUTLINE);
            }
        }
    }

    fn draw_label(&self, canvas: &mut RgbaImage, color: Rgba<u8>, x: i32, y: i32, label: char) {
        if let Some(font) = self.assets.font() {
            draw_text_mut(canvas, color, x, y, LABEL_SCALE, font, &label.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::fen;
    use crate::board::PieceKind;

    const RED: Rgba<u8> = Rgba([0xFF, 0x00, 0x00, 0xFF]);

    fn center_of(row: u32, col: u32) -> (u32, u32) {
        (col * SQUARE_SIZE + SQUARE_SIZE / 2, row * SQUARE_SIZE + SQUARE_SIZE / 2)
    }

    fn corner_of(row: u32, col: u32) -> (u32, u32) {
        // Inside the inset border, clear of labels
        (col * SQUARE_SIZE + SQUARE_SIZE - 2, row * SQUARE_SIZE + 2)
    }

    fn red_white_pawn() -> RenderAssets {
        RenderAssets::new().with_piece(
            Piece::new(PieceKind::Pawn, Side::White),
            RgbaImage::from_pixel(PIECE_SIZE, PIECE_SIZE, RED),
        )
    }

    #[test]
    fn test_dimensions_and_shading() {
        let assets = RenderAssets::new();
        let image = BoardRenderer::new(&assets).render(&Board::empty(), Side::White, None);

        assert_eq!(image.dimensions(), (BOARD_SIZE, BOARD_SIZE));
        assert_eq!(*image.get_pixel(1, 1), LIGHT);
        assert_eq!(*image.get_pixel(SQUARE_SIZE + 1, 1), DARK);
        assert_eq!(*image.get_pixel(1, SQUARE_SIZE + 1), DARK);
        // h1 is light on a real board
        let (x, y) = corner_of(7, 7);
        assert_eq!(*image.get_pixel(x, y), LIGHT);
    }

    #[test]
    fn test_perspective_flips_both_axes() {
        let mut board = Board::empty();
        board.set("a1".parse().unwrap(), Some(Piece::new(PieceKind::Pawn, Side::White)));
        let assets = red_white_pawn();
        let renderer = BoardRenderer::new(&assets);

        let white = renderer.render(&board, Side::White, None);
        let (x, y) = center_of(7, 0);
        assert_eq!(*white.get_pixel(x, y), RED);
        let (x, y) = center_of(0, 7);
        assert_ne!(*white.get_pixel(x, y), RED);

        let black = renderer.render(&board, Side::Black, None);
        let (x, y) = center_of(0, 7);
        assert_eq!(*black.get_pixel(x, y), RED);
        let (x, y) = center_of(7, 0);
        assert_ne!(*black.get_pixel(x, y), RED);
    }

    #[test]
    fn test_piece_keeps_background_border() {
        let mut board = Board::empty();
        board.set("a1".parse().unwrap(), Some(Piece::new(PieceKind::Pawn, Side::White)));
        let assets = red_white_pawn();
        let image = BoardRenderer::new(&assets).render(&board, Side::White, None);

        let (x, y) = corner_of(7, 0);
        assert_eq!(*image.get_pixel(x, y), DARK);
    }

    #[test]
    fn test_last_move_highlight() {
        let board = fen::decode("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1").unwrap();
        let last = LastMove {
            from: "e2".parse().unwrap(),
            to: "e4".parse().unwrap(),
        };
        let assets = RenderAssets::new();
        let image = BoardRenderer::new(&assets).render(&board, Side::White, Some(last));

        for (row, col) in [(6, 4), (4, 4)] {
            let (x, y) = corner_of(row, col);
            assert_eq!(*image.get_pixel(x, y), HIGHLIGHT);
        }
        let (x, y) = corner_of(5, 4);
        assert_ne!(*image.get_pixel(x, y), HIGHLIGHT);
    }

    #[test]
    fn test_missing_piece_image_draws_disc() {
        let mut board = Board::empty();
        board.set("h8".parse().unwrap(), Some(Piece::new(PieceKind::King, Side::Black)));
        let assets = RenderAssets::new();
        let image = BoardRenderer::new(&assets).render(&board, Side::White, None);

        let (x, y) = center_of(0, 7);
        assert_eq!(*image.get_pixel(x, y), BLACK_DISC);
    }

    #[test]
    fn test_render_is_reproducible() {
        let board = fen::decode("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R").unwrap();
        let last = Some(LastMove {
            from: "b8".parse().unwrap(),
            to: "c6".parse().unwrap(),
        });
        let assets = red_white_pawn();
        let renderer = BoardRenderer::new(&assets);

        let first = renderer.render_png(&board, Side::Black, last).unwrap();
        let second = renderer.render_png(&board, Side::Black, last).unwrap();
        assert_eq!(first, second);
        assert_eq!(&first[1..4], b"PNG");
    }

    #[test]
    fn test_labels_follow_perspective() {
        assert_eq!(rank_label(Side::White, 0), '8');
        assert_eq!(rank_label(Side::Black, 0), '1');
        assert_eq!(file_label(Side::White, 0), 'a');
        assert_eq!(file_label(Side::Black, 0), 'h');
        assert_eq!(square_at(Side::Black, 7, 7).to_string(), "a8");
    }
}

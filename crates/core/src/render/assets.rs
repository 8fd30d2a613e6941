//! Piece images and the optional label font

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;

use ab_glyph::FontArc;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use tracing::{debug, warn};

use super::PIECE_SIZE;
use crate::board::{Piece, PieceKind, Side};
use crate::error::Result;

const FONT_FILE: &str = "font.ttf";

/// File name a piece image is loaded from, e.g. `white_knight.png`
pub fn piece_file_name(piece: Piece) -> String {
    format!("{}_{}.png", piece.side.name(), piece.kind.name())
}

/// Images are stored already scaled to the piece inset
#[derive(Clone, Default)]
pub struct RenderAssets {
    pieces: HashMap<Piece, RgbaImage>,
    font: Option<FontArc>,
}

impl RenderAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads whatever assets exist in `dir`
    ///
    /// Missing files are tolerated; the renderer falls back to discs and
    /// unlabelled edges. Files that exist but fail to decode are errors.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut assets = Self::new();

        for side in [Side::White, Side::Black] {
            for kind in PieceKind::ALL {
                let piece = Piece::new(kind, side);
                let path = dir.join(piece_file_name(piece));
                match std::fs::metadata(&path) {
                    Ok(_) => {
                        let image = image::open(&path)?.to_rgba8();
                        assets = assets.with_piece(piece, image);
                    }
                    Err(e) if e.kind() == ErrorKind::NotFound => {
                        warn!("Missing piece image {}", path.display());
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }

        let font_path = dir.join(FONT_FILE);
        match std::fs::read(&font_path) {
            Ok(bytes) => match FontArc::try_from_vec(bytes) {
                Ok(font) => assets = assets.with_font(font),
                Err(e) => warn!("Ignoring unreadable font {}: {}", font_path.display(), e),
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("No label font at {}", font_path.display());
            }
            Err(e) => return Err(e.into()),
        }

        debug!(pieces = assets.pieces.len(), font = assets.font.is_some(), "Loaded render assets");
        Ok(assets)
    }

    pub fn with_piece(mut self, piece: Piece, image: RgbaImage) -> Self {
        let scaled = if image.dimensions() == (PIECE_SIZE, PIECE_SIZE) {
            image
        } else {
            imageops::resize(&image, PIECE_SIZE, PIECE_SIZE, FilterType::Triangle)
        };
        self.pieces.insert(piece, scaled);
        self
    }

    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    pub fn piece(&self, piece: Piece) -> Option<&RgbaImage> {
        self.pieces.get(&piece)
    }

    pub fn font(&self) -> Option<&FontArc> {
        self.font.as_ref()
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }
}

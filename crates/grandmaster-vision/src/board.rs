//! Logical board assembled from a piece assignment.

use crate::pieces::{piece_for_tag, PieceIdentity};
use crate::DetectError;
use shakmaty::{Board, CastlingMode, Chess, Color, FromSetup, Piece, Setup, Square};
use std::fmt::Write as _;

/// A chess position as seen by the camera, built fresh every turn.
#[derive(Clone, Debug)]
pub struct LogicalBoard {
    board: Board,
    turn: Color,
    identities: [Option<&'static PieceIdentity>; 64],
}

impl LogicalBoard {
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board.piece_at(square)
    }

    /// Physical piece standing on `square`.
    pub fn identity_at(&self, square: Square) -> Option<&'static PieceIdentity> {
        self.identities[square as usize]
    }

    /// Number of occupied squares.
    pub fn piece_count(&self) -> usize {
        self.identities.iter().flatten().count()
    }

    /// Rules-checked position with this board and side to move.
    ///
    /// Castling rights and en passant are never inferred from a photo, so the
    /// position starts without either.
    pub fn to_position(&self) -> Result<Chess, DetectError> {
        let mut setup = Setup::empty();
        setup.board = self.board.clone();
        setup.turn = self.turn;
        Chess::from_setup(setup, CastlingMode::Standard)
            .map_err(|err| DetectError::InvalidPosition(err.to_string()))
    }

    /// Eight-line text diagram; `flipped` puts rank 1 on top and the h-file
    /// on the left, which is how the robot sees the board.
    pub fn render(&self, flipped: bool) -> String {
        let mut out = String::with_capacity(8 * 18);
        for row in 0..8u32 {
            let rank = if flipped { row } else { 7 - row };
            let _ = write!(out, "{} ", rank + 1);
            for col in 0..8u32 {
                let file = if flipped { 7 - col } else { col };
                let sq = Square::new(rank * 8 + file);
                let c = self.board.piece_at(sq).map_or('.', |p| p.char());
                out.push(c);
                if col < 7 {
                    out.push(' ');
                }
            }
            out.push('\n');
        }
        out.push_str(if flipped {
            "  h g f e d c b a"
        } else {
            "  a b c d e f g h"
        });
        out
    }
}

/// Place every assigned tag's piece on an empty board.
///
/// Squares without an assignment stay empty. Fails with
/// [`DetectError::UnknownPieceTag`] for ids missing from the identity table.
pub fn generate_board(
    assignment: impl IntoIterator<Item = (Square, u32)>,
    turn: Color,
) -> Result<LogicalBoard, DetectError> {
    let mut board = Board::empty();
    let mut identities = [None; 64];
    for (square, tag_id) in assignment {
        let identity = piece_for_tag(tag_id).ok_or(DetectError::UnknownPieceTag(tag_id))?;
        board.set_piece_at(square, identity.piece);
        identities[square as usize] = Some(identity);
    }
    Ok(LogicalBoard {
        board,
        turn,
        identities,
    })
}

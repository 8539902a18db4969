//! Fixed mapping from piece tag ids to individual physical pieces.
//!
//! Chess notation doesn't tell two black rooks apart, but the robot tracks
//! every physical piece by its own tag.

use shakmaty::{Color, Piece, Role};

/// One physical piece and the tag glued under it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PieceIdentity {
    pub name: &'static str,
    pub tag_id: u32,
    pub piece: Piece,
}

impl PieceIdentity {
    /// FEN letter of the piece (upper case for white).
    pub fn symbol(&self) -> char {
        self.piece.char()
    }
}

const fn white(name: &'static str, role: Role, tag_id: u32) -> PieceIdentity {
    PieceIdentity {
        name,
        tag_id,
        piece: Piece {
            color: Color::White,
            role,
        },
    }
}

const fn black(name: &'static str, role: Role, tag_id: u32) -> PieceIdentity {
    PieceIdentity {
        name,
        tag_id,
        piece: Piece {
            color: Color::Black,
            role,
        },
    }
}

pub const WHITE_TAG_OFFSET: u32 = 200;
pub const BLACK_TAG_OFFSET: u32 = 100;

pub const PIECE_TABLE: [PieceIdentity; 32] = [
    white("WHITE_ROOK_QS", Role::Rook, 200),
    white("WHITE_KNIGHT_QS", Role::Knight, 201),
    white("WHITE_BISHOP_QS", Role::Bishop, 202), // dark squares only
    white("WHITE_QUEEN", Role::Queen, 203),
    white("WHITE_KING", Role::King, 204),
    white("WHITE_BISHOP_KS", Role::Bishop, 205), // light squares only
    white("WHITE_KNIGHT_KS", Role::Knight, 206),
    white("WHITE_ROOK_KS", Role::Rook, 207),
    white("WHITE_PAWN_A", Role::Pawn, 208),
    white("WHITE_PAWN_B", Role::Pawn, 209),
    white("WHITE_PAWN_C", Role::Pawn, 210),
    white("WHITE_PAWN_D", Role::Pawn, 211),
    white("WHITE_PAWN_E", Role::Pawn, 212),
    white("WHITE_PAWN_F", Role::Pawn, 213),
    white("WHITE_PAWN_G", Role::Pawn, 214),
    white("WHITE_PAWN_H", Role::Pawn, 215),
    black("BLACK_ROOK_QS", Role::Rook, 100),
    black("BLACK_KNIGHT_QS", Role::Knight, 101),
    black("BLACK_BISHOP_QS", Role::Bishop, 102), // dark squares only
    black("BLACK_QUEEN", Role::Queen, 103),
    black("BLACK_KING", Role::King, 104),
    black("BLACK_BISHOP_KS", Role::Bishop, 105), // light squares only
    black("BLACK_KNIGHT_KS", Role::Knight, 106),
    black("BLACK_ROOK_KS", Role::Rook, 107),
    black("BLACK_PAWN_A", Role::Pawn, 108),
    black("BLACK_PAWN_B", Role::Pawn, 109),
    black("BLACK_PAWN_C", Role::Pawn, 110),
    black("BLACK_PAWN_D", Role::Pawn, 111),
    black("BLACK_PAWN_E", Role::Pawn, 112),
    black("BLACK_PAWN_F", Role::Pawn, 113),
    black("BLACK_PAWN_G", Role::Pawn, 114),
    black("BLACK_PAWN_H", Role::Pawn, 115),
];

/// Look up the physical piece carrying `tag_id`.
pub fn piece_for_tag(tag_id: u32) -> Option<&'static PieceIdentity> {
    let index = match tag_id {
        200..=215 => tag_id - WHITE_TAG_OFFSET,
        100..=115 => tag_id - BLACK_TAG_OFFSET + 16,
        _ => return None,
    };
    PIECE_TABLE.get(index as usize)
}

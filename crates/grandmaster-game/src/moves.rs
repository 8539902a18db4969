//! Move selection.
//!
//! The gantry can only slide one piece at a time over empty squares, so the
//! robot plays uniformly random legal moves that neither move a knight nor
//! capture. Strength is not a goal.

use crate::TurnError;
use rand::seq::SliceRandom;
use rand::Rng;
use shakmaty::{Chess, Move, Position, Role};

/// Legal moves the gantry can execute.
pub fn playable_moves(position: &Chess) -> Vec<Move> {
    let board = position.board();
    position
        .legal_moves()
        .into_iter()
        .filter(|m| {
            m.role() != Role::Knight
                && !m.is_capture()
                && !m.is_castle()
                && m.from().is_some()
                && board.piece_at(m.to()).is_none()
        })
        .collect()
}

/// Pick one playable move at random.
pub fn pick_move<R: Rng + ?Sized>(position: &Chess, rng: &mut R) -> Result<Move, TurnError> {
    playable_moves(position)
        .choose(rng)
        .cloned()
        .ok_or(TurnError::NoPlayableMove)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use shakmaty::fen::Fen;
    use shakmaty::CastlingMode;

    fn position(fen: &str) -> Chess {
        fen.parse::<Fen>()
            .expect("fen")
            .into_position(CastlingMode::Standard)
            .expect("legal")
    }

    #[test]
    fn never_knights_or_captures() {
        // Middlegame with captures available for both knights and pawns.
        let pos = position("r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4");
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let mv = pick_move(&pos, &mut rng).expect("move");
            assert_ne!(mv.role(), Role::Knight, "{mv}");
            assert!(!mv.is_capture(), "{mv}");
            assert!(pos.board().piece_at(mv.to()).is_none(), "{mv}");
        }
    }

    #[test]
    fn opening_has_sixteen_pawn_moves() {
        let pos = Chess::default();
        let moves = playable_moves(&pos);
        assert_eq!(moves.len(), 16);
        assert!(moves.iter().all(|m| m.role() == Role::Pawn));
    }

    #[test]
    fn castling_is_excluded() {
        let pos = position("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(playable_moves(&pos).iter().all(|m| !m.is_castle()));
    }

    #[test]
    fn only_knight_moves_left() {
        // King boxed in, pawns blocked, only the knight can move.
        let pos = position("4k3/8/8/8/8/6pp/6PP/6NK w - - 0 1");
        assert!(matches!(
            pick_move(&pos, &mut StdRng::seed_from_u64(1)),
            Err(TurnError::NoPlayableMove)
        ));
    }
}

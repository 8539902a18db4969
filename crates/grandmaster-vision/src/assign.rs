//! Greedy nearest-square assignment of piece tags.
//!
//! Lens distortion pushes pieces near the board edge outward in pixel space,
//! so edge pieces are the least ambiguous. Tags are processed from the one
//! farthest from the board center inward; each claims the nearest square that
//! is still free. The result is best-effort: there is no optimality guarantee
//! for ambiguous placements, only that no square is claimed twice.

use crate::{DetectError, SquareGrid};
use grandmaster_core::TagDetection;
use nalgebra::Point2;
use shakmaty::Square;

/// Lazy sequence of `(square, tag_id)` pairs.
///
/// Each call to `next` assigns one more piece tag. The sequence is finite
/// (one item per piece tag) and cannot be restarted.
#[derive(Clone, Debug)]
pub struct PieceAssignments {
    pending: std::vec::IntoIter<TagDetection>,
    available: Vec<(Square, Point2<f32>)>,
}

impl PieceAssignments {
    /// Order `pieces` and prepare the free-square pool from `grid`.
    pub fn new(grid: &SquareGrid, mut pieces: Vec<TagDetection>) -> Result<Self, DetectError> {
        if pieces.len() > grid.len() {
            return Err(DetectError::TooManyPieces {
                count: pieces.len(),
            });
        }

        let center = grid.board_center();
        pieces.sort_by(|a, b| b.distance_to(&center).total_cmp(&a.distance_to(&center)));

        Ok(Self {
            pending: pieces.into_iter(),
            available: grid.iter().collect(),
        })
    }

    /// Squares nobody has claimed yet.
    pub fn free_squares(&self) -> impl Iterator<Item = Square> + '_ {
        self.available.iter().map(|(sq, _)| *sq)
    }
}

impl Iterator for PieceAssignments {
    type Item = (Square, u32);

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.pending.next()?;
        let (idx, _) = self
            .available
            .iter()
            .enumerate()
            .map(|(idx, (_, c))| (idx, tag.distance_to(c)))
            .min_by(|a, b| a.1.total_cmp(&b.1))?;
        let (square, _) = self.available.remove(idx);
        log::debug!("tag {} -> {}", tag.id, square);
        Some((square, tag.id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.pending.size_hint()
    }
}

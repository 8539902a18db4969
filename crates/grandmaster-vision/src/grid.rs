//! Square center estimation from the four corner tags.
//!
//! The corner tags are centered one rank/file outside the playing area, so
//! nine square pitches separate neighbouring corner tags. The bottom-left tag
//! (a0) is the origin.
//!
//! Square centers are placed with a first-order rank/file basis plus a single
//! second-order term: how much the rank step changes per file. The symmetric
//! term (file step change per rank) is intentionally left out. The model is
//! not a projective fit; it matches the robot's camera mount closely enough
//! for nearest-square assignment.

use crate::{CornerIds, CornerTags, DetectError};
use grandmaster_core::TagDetection;
use nalgebra::{Point2, Vector2};
use shakmaty::Square;

/// Square pitches between two neighbouring corner tags.
const CORNER_SPAN: f32 = 9.0;

/// Per-frame basis vectors derived from the corner tags.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridBasis {
    pub origin: Point2<f32>,
    /// Rank step measured along the a-file side (a0 -> a9).
    pub rank_step_left: Vector2<f32>,
    /// Rank step measured along the I-file side (I0 -> I9).
    pub rank_step_right: Vector2<f32>,
    /// File step measured along rank 0 (a0 -> I0).
    pub file_step_bottom: Vector2<f32>,
    /// File step measured along rank 9 (a9 -> I9). Reported, not applied.
    pub file_step_top: Vector2<f32>,
    /// Change of the rank step per file index.
    pub rank_step_per_file: Vector2<f32>,
}

impl GridBasis {
    pub fn from_corners(corners: &CornerTags) -> Self {
        let rank_step_left = (corners.top_left - corners.bottom_left) / CORNER_SPAN;
        let rank_step_right = (corners.top_right - corners.bottom_right) / CORNER_SPAN;
        let file_step_bottom = (corners.bottom_right - corners.bottom_left) / CORNER_SPAN;
        let file_step_top = (corners.top_right - corners.top_left) / CORNER_SPAN;
        Self {
            origin: corners.bottom_left,
            rank_step_left,
            rank_step_right,
            file_step_bottom,
            file_step_top,
            rank_step_per_file: (rank_step_right - rank_step_left) / CORNER_SPAN,
        }
    }

    /// Pixel position of 1-based file index `file_i` and rank index `rank_i`.
    #[inline]
    pub fn position(&self, file_i: f32, rank_i: f32) -> Point2<f32> {
        self.origin
            + (self.rank_step_left + self.rank_step_per_file * file_i) * rank_i
            + self.file_step_bottom * file_i
    }
}

/// Pixel centers of all 64 squares for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct SquareGrid {
    basis: GridBasis,
    centers: [Point2<f32>; 64],
}

impl SquareGrid {
    pub fn from_corners(corners: &CornerTags) -> Self {
        let basis = GridBasis::from_corners(corners);
        let mut centers = [Point2::origin(); 64];
        for (idx, center) in centers.iter_mut().enumerate() {
            let file_i = (idx % 8) as f32 + 1.0;
            let rank_i = (idx / 8) as f32 + 1.0;
            *center = basis.position(file_i, rank_i);
        }

        log::debug!(
            "grid basis: origin=({:.0}, {:.0}) rank_step=({:.1}, {:.1}) file_step=({:.1}, {:.1}) top_file_step=({:.1}, {:.1})",
            basis.origin.x,
            basis.origin.y,
            basis.rank_step_left.x,
            basis.rank_step_left.y,
            basis.file_step_bottom.x,
            basis.file_step_bottom.y,
            basis.file_step_top.x,
            basis.file_step_top.y,
        );

        Self { basis, centers }
    }

    #[inline]
    pub fn basis(&self) -> &GridBasis {
        &self.basis
    }

    #[inline]
    pub fn center(&self, square: Square) -> Point2<f32> {
        self.centers[square as usize]
    }

    /// Always 64.
    #[inline]
    pub fn len(&self) -> usize {
        self.centers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Squares in a1, b1, ..., h8 order with their pixel centers.
    pub fn iter(&self) -> impl Iterator<Item = (Square, Point2<f32>)> + '_ {
        self.centers
            .iter()
            .enumerate()
            .map(|(idx, c)| (Square::new(idx as u32), *c))
    }

    /// Mean of the four central squares (d4, d5, e4, e5).
    pub fn board_center(&self) -> Point2<f32> {
        let sum = [Square::D4, Square::D5, Square::E4, Square::E5]
            .iter()
            .fold(Vector2::zeros(), |acc, sq| acc + self.center(*sq).coords);
        Point2::from(sum / 4.0)
    }
}

/// Compute the square grid from a frame's detections.
///
/// Fails with [`DetectError::MissingCorners`] unless all four corner tags are
/// present.
pub fn calculate_square_locations(
    tags: &[TagDetection],
    ids: &CornerIds,
) -> Result<SquareGrid, DetectError> {
    let corners = CornerTags::from_detections(tags, ids)?;
    Ok(SquareGrid::from_corners(&corners))
}

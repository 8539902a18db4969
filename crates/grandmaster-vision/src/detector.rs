//! Frame → tags → grid → piece assignment.

use crate::{
    assign::PieceAssignments,
    board::{generate_board, LogicalBoard},
    CornerTags, DetectError, DetectorParams, SquareGrid, TagScanner,
};
use grandmaster_core::TagDetection;
use image::{imageops, RgbImage};
use shakmaty::{Color, Square};
use std::collections::BTreeMap;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Everything detection learned about one frame.
///
/// Produced by [`BoardDetector::inspect`] for debug output.
#[derive(Clone, Debug)]
pub struct FrameReport {
    pub detections: Vec<TagDetection>,
    pub corners: CornerTags,
    pub grid: SquareGrid,
    pub pieces: Vec<TagDetection>,
    pub assignments: Vec<(Square, u32)>,
}

/// Tags of one frame split by role.
struct Partition {
    corners: CornerTags,
    pieces: Vec<TagDetection>,
}

/// Board detector owning the scanner and its parameters.
pub struct BoardDetector {
    params: DetectorParams,
    scanner: Box<dyn TagScanner + Send + Sync>,
}

impl BoardDetector {
    pub fn new(params: DetectorParams, scanner: impl TagScanner + Send + Sync + 'static) -> Self {
        Self {
            params,
            scanner: Box::new(scanner),
        }
    }

    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    /// Grayscale the frame and run the scanner on it.
    pub fn scan(&self, frame: &RgbImage) -> Result<Vec<TagDetection>, DetectError> {
        let gray = imageops::grayscale(frame);
        let detections = self.scanner.scan(self.params.family, &gray)?;
        log::debug!("scanner found {} tags", detections.len());
        Ok(detections)
    }

    /// Assign every piece tag in `frame` to a square.
    ///
    /// The returned sequence is lazy: each item performs one nearest-square
    /// claim. Corner tags missing from the frame fail the call before any
    /// assignment happens.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self, frame), fields(w = frame.width(), h = frame.height())))]
    pub fn detect_piece_positions(&self, frame: &RgbImage) -> Result<PieceAssignments, DetectError> {
        let detections = self.scan(frame)?;
        let Partition { corners, pieces } = self.partition(&detections)?;
        let grid = SquareGrid::from_corners(&corners);
        PieceAssignments::new(&grid, pieces)
    }

    /// Detect pieces and build the logical board with `turn` to move.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self, frame)))]
    pub fn detect_board(&self, frame: &RgbImage, turn: Color) -> Result<LogicalBoard, DetectError> {
        let assignments = self.detect_piece_positions(frame)?;
        let board = generate_board(assignments, turn)?;
        log::info!("detected {} pieces, {:?} to move", board.piece_count(), turn);
        Ok(board)
    }

    /// Run the full pipeline and keep every intermediate result.
    pub fn inspect(&self, frame: &RgbImage) -> Result<FrameReport, DetectError> {
        let detections = self.scan(frame)?;
        let Partition { corners, pieces } = self.partition(&detections)?;
        let grid = SquareGrid::from_corners(&corners);
        let assignments = PieceAssignments::new(&grid, pieces.clone())?.collect();
        Ok(FrameReport {
            detections,
            corners,
            grid,
            pieces,
            assignments,
        })
    }

    fn partition(&self, detections: &[TagDetection]) -> Result<Partition, DetectError> {
        // A tag seen twice keeps its last detection.
        let keyed: BTreeMap<u32, TagDetection> =
            detections.iter().map(|t| (t.id, *t)).collect();

        let corners = CornerTags::from_tags(&keyed, &self.params.corners)?;
        let total = keyed.len();
        let pieces: Vec<_> = keyed
            .into_values()
            .filter(|t| t.id >= self.params.piece_id_threshold)
            .collect();
        log::debug!(
            "{} piece tags, {} other tags (corners included)",
            pieces.len(),
            total - pieces.len()
        );
        Ok(Partition { corners, pieces })
    }
}

impl std::fmt::Debug for BoardDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardDetector")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

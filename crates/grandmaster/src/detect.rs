//! Offline detection from an image file and recorded tag detections.

use grandmaster_vision::{
    generate_board, save_annotated, BoardDetector, DetectError, DetectorParams, FrameReport,
    LogicalBoard, RecordedScanner, ScanError,
};
use image::RgbImage;
use shakmaty::Color;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum OfflineError {
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Detect(#[from] DetectError),
}

/// Result of one offline detection run.
#[derive(Clone, Debug)]
pub struct OfflineDetection {
    pub frame: RgbImage,
    pub report: FrameReport,
    pub board: LogicalBoard,
}

impl OfflineDetection {
    /// Write the annotated frame (format from the extension).
    pub fn save_annotated(&self, path: impl AsRef<Path>) -> Result<(), image::ImageError> {
        save_annotated(path, &self.frame, &self.report)
    }
}

/// Load `image_path`, replay the detections in `detections_path` and build
/// the board with `turn` to move.
pub fn detect_from_files(
    image_path: impl AsRef<Path>,
    detections_path: impl AsRef<Path>,
    params: &DetectorParams,
    turn: Color,
) -> Result<OfflineDetection, OfflineError> {
    let frame = image::open(image_path)?.to_rgb8();
    let scanner = RecordedScanner::load_json(detections_path)?;
    let detector = BoardDetector::new(params.clone(), scanner);
    let report = detector.inspect(&frame)?;
    let board = generate_board(report.assignments.iter().copied(), turn)?;
    Ok(OfflineDetection {
        frame,
        report,
        board,
    })
}

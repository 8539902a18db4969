//! Board detection for the Grandmaster chess robot.
//!
//! Turns AprilTag detections from one camera frame into a chess position:
//!
//! 1. four corner tags, placed one square outside each board corner, give a
//!    per-frame [`SquareGrid`] of 64 pixel centers;
//! 2. piece tags (id at or above [`DetectorParams::piece_id_threshold`]) are
//!    greedily assigned to the nearest free square, outermost tag first
//!    ([`PieceAssignments`]);
//! 3. the assignment is turned into a [`LogicalBoard`] through the fixed
//!    tag → piece table in [`pieces`].
//!
//! Tag detection itself sits behind the [`TagScanner`] trait.
//!
//! ```no_run
//! use grandmaster_vision::{BoardDetector, DetectorParams, RecordedScanner};
//! use shakmaty::Color;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let frame = image::open("frame.png")?.to_rgb8();
//! let scanner = RecordedScanner::load_json("tags.json")?;
//! let detector = BoardDetector::new(DetectorParams::default(), scanner);
//! let board = detector.detect_board(&frame, Color::Black)?;
//! println!("{}", board.render(true));
//! # Ok(())
//! # }
//! ```

mod annotate;
mod assign;
mod board;
mod corners;
mod detector;
mod error;
mod grid;
mod params;
pub mod pieces;
mod scanner;

pub use annotate::{annotate_frame, draw_marker, save_annotated, MARKER_SIZE};
pub use assign::PieceAssignments;
pub use board::{generate_board, LogicalBoard};
pub use corners::{CornerRole, CornerTags};
pub use detector::{BoardDetector, FrameReport};
pub use error::{DetectError, ScanError};
pub use grid::{calculate_square_locations, GridBasis, SquareGrid};
pub use params::{CornerIds, DetectorParams};
pub use pieces::{piece_for_tag, PieceIdentity};
pub use scanner::{RecordedScanner, TagScanner};

pub use grandmaster_core::{TagDetection, TagFamily};

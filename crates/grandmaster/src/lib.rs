//! Facade crate for the Grandmaster chess robot.
//!
//! This crate provides:
//! - re-exports of the component crates,
//! - [`detect`] helpers that run board detection offline from files,
//! - the `grandmaster` binary (feature `cli`).
//!
//! ## API map
//! - `grandmaster::core`: tag detections, output sinks, logging.
//! - `grandmaster::vision`: corner grid, piece assignment, logical board.
//! - `grandmaster::devices`: serial protocol, device manager, simulator.
//! - `grandmaster::game`: orchestrator state machine, config, image sources.
//!
//! ## Quickstart
//!
//! ```no_run
//! use grandmaster::detect::detect_from_files;
//! use grandmaster::vision::DetectorParams;
//! use shakmaty::Color;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let offline = detect_from_files("frame.png", "tags.json", &DetectorParams::default(), Color::Black)?;
//! println!("{}", offline.board.render(true));
//! # Ok(())
//! # }
//! ```

pub use grandmaster_core as core;
pub use grandmaster_devices as devices;
pub use grandmaster_game as game;
pub use grandmaster_vision as vision;

pub use grandmaster_core::{init_with_level, OutputSink, SharedSink, TagDetection};
pub use grandmaster_game::{GameConfig, GameState, Orchestrator};
pub use grandmaster_vision::{BoardDetector, DetectorParams, LogicalBoard};

pub mod detect;

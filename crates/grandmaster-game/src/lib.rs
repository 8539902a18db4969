//! Turn orchestration for the Grandmaster chess robot.
//!
//! [`Orchestrator`] is the state machine tying the camera, the board
//! detector and the two controllers together:
//!
//! ```text
//! STARTING --devices ready--> READY --start--> HUMAN_TURN --play--> COMPUTER_TURN
//!                               ^                  ^                     |
//!                               |                  +------ turn done ----+
//!                               +---- autoplay off
//! ```
//!
//! A failed turn (camera, detection, move choice or hardware) puts the game
//! back to HUMAN_TURN and the same leg is retried after a delay, forever.

mod config;
mod error;
mod input;
mod moves;
mod orchestrator;
mod source;
mod state;

pub use config::{CameraConfig, GameConfig, RetryBackoff};
pub use error::{ConfigError, ImageFetchError, ParseInputError, TurnError};
pub use input::{
    control_channel, default_button_handlers, ready_callback, spawn_line_reader, ControlInput,
};
pub use moves::{pick_move, playable_moves};
pub use orchestrator::Orchestrator;
pub use source::{fetch_with_retry, FileImageSource, HttpImageSource, ImageSource};
pub use state::{GameState, Leg};

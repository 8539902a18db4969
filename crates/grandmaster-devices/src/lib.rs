//! Serial device layer for the Grandmaster chess robot.
//!
//! Two Arduinos sit on USB serial ports: the gantry positioner and the board
//! controller (electromagnet, panel buttons, LEDs). [`DeviceManager`] finds
//! them by USB serial number, encodes commands, decodes status bytes, gates
//! every command on readiness and provides blocking waits for moves.
//!
//! The byte transport is the [`Link`] trait; [`SerialLink`] wraps a real
//! port and [`sim`] provides an in-process bench for tests and dry runs.

mod config;
mod discovery;
mod error;
mod link;
mod manager;
mod protocol;
pub mod sim;

pub use config::DeviceConfig;
pub use discovery::{find_port, list_ports, locate, PortInfo};
pub use error::DeviceError;
pub use link::{Controller, Link, SerialLink};
pub use manager::{ButtonHandler, ButtonHandlers, DeviceManager, DeviceState, ReadyCallback};
pub use protocol::{
    decode_gantry, encode_gantry, BoardCommand, BoardStatus, Button, GantryPosition, LedPalette,
    GANTRY_MAX,
};

use crate::Button;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum DeviceError {
    #[error("couldn't find the {controller} controller (serial number {serial_number})")]
    DeviceNotFound {
        controller: &'static str,
        serial_number: String,
    },
    #[error("controllers are not ready yet")]
    NotReady,
    #[error("({file}, {rank}) is outside the gantry's reach")]
    InvalidPosition { file: u8, rank: u8 },
    #[error("gave up waiting for {what} after {after:?}")]
    WaitTimeout { what: &'static str, after: Duration },
    #[error("button {0} already has a handler")]
    DuplicateHandler(Button),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serial(#[from] serialport::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

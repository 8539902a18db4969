use grandmaster_devices::DeviceError;
use grandmaster_vision::DetectError;

#[derive(thiserror::Error, Debug)]
pub enum ImageFetchError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Decode(#[from] image::ImageError),
    #[error("no frame after {attempts} attempts: {last}")]
    Exhausted {
        attempts: usize,
        last: Box<ImageFetchError>,
    },
}

/// Anything that stops a turn leg. All variants are retried the same way.
#[derive(thiserror::Error, Debug)]
pub enum TurnError {
    #[error("couldn't get a camera frame: {0}")]
    Image(#[from] ImageFetchError),
    #[error(transparent)]
    Detect(#[from] DetectError),
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error("no legal move without a knight or a capture")]
    NoPlayableMove,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// A control line that isn't a command.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ParseInputError {
    #[error("Unknown Command: '{0}'")]
    Unknown(String),
    #[error("'{command}' needs {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },
    #[error("'{command}': {reason}")]
    InvalidArgument {
        command: &'static str,
        reason: String,
    },
}

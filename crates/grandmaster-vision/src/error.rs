use crate::CornerRole;

/// Errors produced by the fiducial scanner adapters.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("scanner failed: {0}")]
    Backend(String),
}

/// Errors returned by the board detector.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("couldn't find board corners (missing: {})", format_roles(.missing))]
    MissingCorners { missing: Vec<CornerRole> },
    #[error("{count} piece tags detected, a board has only 64 squares")]
    TooManyPieces { count: usize },
    #[error("tag {0} is not a known piece")]
    UnknownPieceTag(u32),
    #[error("detected arrangement is not a playable position: {0}")]
    InvalidPosition(String),
    #[error(transparent)]
    Scan(#[from] ScanError),
}

fn format_roles(roles: &[CornerRole]) -> String {
    roles
        .iter()
        .map(|r| r.label())
        .collect::<Vec<_>>()
        .join(", ")
}

use grandmaster_core::TagFamily;
use serde::{Deserialize, Serialize};

/// Tag ids printed in the four off-board corner squares.
///
/// The corner tags sit one rank and one file beyond the playing area, in the
/// squares conventionally called α0, I0, α9 and I9.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CornerIds {
    /// I0, bottom right.
    pub bottom_right: u32,
    /// α0, bottom left. Origin of the grid.
    pub bottom_left: u32,
    /// α9, top left.
    pub top_left: u32,
    /// I9, top right.
    pub top_right: u32,
}

impl Default for CornerIds {
    fn default() -> Self {
        Self {
            bottom_right: 2,
            bottom_left: 3,
            top_left: 0,
            top_right: 1,
        }
    }
}

/// Configuration for [`crate::BoardDetector`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    /// Family used for both corner and piece tags.
    pub family: TagFamily,
    pub corners: CornerIds,
    /// Tags with an id at or above this value are treated as pieces.
    pub piece_id_threshold: u32,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            family: TagFamily::Tag36h11,
            corners: CornerIds::default(),
            piece_id_threshold: 100,
        }
    }
}

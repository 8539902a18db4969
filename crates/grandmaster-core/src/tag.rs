use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// AprilTag family printed on the board and the pieces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagFamily {
    #[default]
    #[serde(rename = "tag36h11")]
    Tag36h11,
    #[serde(rename = "tag25h9")]
    Tag25h9,
    #[serde(rename = "tag16h5")]
    Tag16h5,
}

impl TagFamily {
    pub fn name(self) -> &'static str {
        match self {
            TagFamily::Tag36h11 => "tag36h11",
            TagFamily::Tag25h9 => "tag25h9",
            TagFamily::Tag16h5 => "tag16h5",
        }
    }
}

impl fmt::Display for TagFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One fiducial found in a frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TagDetection {
    pub id: u32,
    /// Tag center in image pixels (x right, y down).
    pub center: Point2<f32>,
}

impl TagDetection {
    pub fn new(id: u32, x: f32, y: f32) -> Self {
        Self {
            id,
            center: Point2::new(x, y),
        }
    }

    /// Euclidean pixel distance from this tag's center to `p`.
    #[inline]
    pub fn distance_to(&self, p: &Point2<f32>) -> f32 {
        nalgebra::distance(&self.center, p)
    }
}

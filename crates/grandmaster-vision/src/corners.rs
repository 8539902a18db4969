//! Board corner tags.

use crate::{CornerIds, DetectError};
use grandmaster_core::TagDetection;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Role of a corner tag around the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerRole {
    BottomRight,
    BottomLeft,
    TopLeft,
    TopRight,
}

impl CornerRole {
    pub const ALL: [CornerRole; 4] = [
        CornerRole::BottomRight,
        CornerRole::BottomLeft,
        CornerRole::TopLeft,
        CornerRole::TopRight,
    ];

    /// Board-coordinate name of the square the tag sits on.
    pub fn label(self) -> &'static str {
        match self {
            CornerRole::BottomRight => "bottom right (I0)",
            CornerRole::BottomLeft => "bottom left (a0)",
            CornerRole::TopLeft => "top left (a9)",
            CornerRole::TopRight => "top right (I9)",
        }
    }

    pub fn tag_id(self, ids: &CornerIds) -> u32 {
        match self {
            CornerRole::BottomRight => ids.bottom_right,
            CornerRole::BottomLeft => ids.bottom_left,
            CornerRole::TopLeft => ids.top_left,
            CornerRole::TopRight => ids.top_right,
        }
    }
}

/// Pixel centers of all four corner tags.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CornerTags {
    pub bottom_right: Point2<f32>,
    pub bottom_left: Point2<f32>,
    pub top_left: Point2<f32>,
    pub top_right: Point2<f32>,
}

impl CornerTags {
    /// Pick the corner tags out of a keyed set of detections.
    ///
    /// Fails with [`DetectError::MissingCorners`] listing every absent role.
    pub fn from_tags(
        tags: &BTreeMap<u32, TagDetection>,
        ids: &CornerIds,
    ) -> Result<Self, DetectError> {
        let lookup = |role: CornerRole| tags.get(&role.tag_id(ids)).map(|t| t.center);

        match (
            lookup(CornerRole::BottomRight),
            lookup(CornerRole::BottomLeft),
            lookup(CornerRole::TopLeft),
            lookup(CornerRole::TopRight),
        ) {
            (Some(bottom_right), Some(bottom_left), Some(top_left), Some(top_right)) => Ok(Self {
                bottom_right,
                bottom_left,
                top_left,
                top_right,
            }),
            _ => Err(DetectError::MissingCorners {
                missing: CornerRole::ALL
                    .into_iter()
                    .filter(|role| lookup(*role).is_none())
                    .collect(),
            }),
        }
    }

    /// Convenience constructor from an unordered detection list.
    pub fn from_detections(tags: &[TagDetection], ids: &CornerIds) -> Result<Self, DetectError> {
        let keyed = tags.iter().map(|t| (t.id, *t)).collect();
        Self::from_tags(&keyed, ids)
    }

    pub fn get(&self, role: CornerRole) -> Point2<f32> {
        match role {
            CornerRole::BottomRight => self.bottom_right,
            CornerRole::BottomLeft => self.bottom_left,
            CornerRole::TopLeft => self.top_left,
            CornerRole::TopRight => self.top_right,
        }
    }
}

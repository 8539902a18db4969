//! Fiducial scanner seam.

use crate::ScanError;
use grandmaster_core::{TagDetection, TagFamily};
use image::GrayImage;
use std::fs;
use std::path::Path;

/// Finds AprilTags in a grayscale frame.
pub trait TagScanner {
    fn scan(&self, family: TagFamily, image: &GrayImage) -> Result<Vec<TagDetection>, ScanError>;
}

/// Replays a fixed set of detections for every frame.
///
/// Used for offline runs, the simulator and tests, where detections come from
/// a JSON dump instead of a live tag detector.
#[derive(Clone, Debug, Default)]
pub struct RecordedScanner {
    detections: Vec<TagDetection>,
}

impl RecordedScanner {
    pub fn from_detections(detections: Vec<TagDetection>) -> Self {
        Self { detections }
    }

    /// Load a JSON array of `{"id": .., "center": [x, y]}` objects.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ScanError> {
        let raw = fs::read_to_string(path)?;
        Ok(Self::from_detections(serde_json::from_str(&raw)?))
    }

    /// Write the recorded detections as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ScanError> {
        let json = serde_json::to_string_pretty(&self.detections)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn detections(&self) -> &[TagDetection] {
        &self.detections
    }
}

impl TagScanner for RecordedScanner {
    fn scan(&self, family: TagFamily, image: &GrayImage) -> Result<Vec<TagDetection>, ScanError> {
        log::debug!(
            "replaying {} {} detections for {}x{} frame",
            self.detections.len(),
            family,
            image.width(),
            image.height()
        );
        Ok(self.detections.clone())
    }
}

impl<T: TagScanner + ?Sized> TagScanner for Box<T> {
    fn scan(&self, family: TagFamily, image: &GrayImage) -> Result<Vec<TagDetection>, ScanError> {
        (**self).scan(family, image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tags.json");
        let scanner = RecordedScanner::from_detections(vec![
            TagDetection::new(3, 10.0, 900.0),
            TagDetection::new(208, 200.0, 800.0),
        ]);
        scanner.write_json(&path).expect("write");
        let loaded = RecordedScanner::load_json(&path).expect("load");
        assert_eq!(loaded.detections(), scanner.detections());
    }

    #[test]
    fn malformed_json_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").expect("write");
        assert!(matches!(
            RecordedScanner::load_json(&path),
            Err(ScanError::Json(_))
        ));
    }

    #[test]
    fn scan_replays_detections() {
        let scanner = RecordedScanner::from_detections(vec![TagDetection::new(1, 5.0, 5.0)]);
        let frame = GrayImage::new(4, 4);
        let found = scanner.scan(TagFamily::default(), &frame).expect("scan");
        assert_eq!(found, vec![TagDetection::new(1, 5.0, 5.0)]);
    }
}

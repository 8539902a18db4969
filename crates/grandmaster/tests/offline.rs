use grandmaster::detect::{detect_from_files, OfflineError};
use grandmaster::vision::{DetectError, DetectorParams, RecordedScanner, ScanError};
use grandmaster::TagDetection;
use image::RgbImage;
use shakmaty::{Color, Piece, Role, Square};
use std::path::Path;

fn board_tags() -> Vec<TagDetection> {
    vec![
        TagDetection::new(2, 1000.0, 1000.0),
        TagDetection::new(3, 100.0, 1000.0),
        TagDetection::new(0, 100.0, 100.0),
        TagDetection::new(1, 1000.0, 100.0),
        TagDetection::new(204, 602.0, 897.0),
        TagDetection::new(104, 598.0, 203.0),
    ]
}

fn write_inputs(dir: &Path, tags: Vec<TagDetection>) {
    RgbImage::new(1100, 1100)
        .save(dir.join("frame.png"))
        .expect("save frame");
    RecordedScanner::from_detections(tags)
        .write_json(dir.join("tags.json"))
        .expect("save tags");
}

#[test]
fn detects_kings_from_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_inputs(dir.path(), board_tags());

    let offline = detect_from_files(
        dir.path().join("frame.png"),
        dir.path().join("tags.json"),
        &DetectorParams::default(),
        Color::White,
    )
    .expect("detect");

    assert_eq!(offline.board.piece_count(), 2);
    assert_eq!(
        offline.board.piece_at(Square::E1),
        Some(Piece {
            color: Color::White,
            role: Role::King
        })
    );
    assert_eq!(
        offline.board.piece_at(Square::E8),
        Some(Piece {
            color: Color::Black,
            role: Role::King
        })
    );
    assert_eq!(offline.report.detections.len(), 6);

    let annotated = dir.path().join("annotated.png");
    offline.save_annotated(&annotated).expect("annotate");
    assert!(annotated.exists());
}

#[test]
fn missing_corner_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tags = board_tags().into_iter().filter(|t| t.id != 0).collect();
    write_inputs(dir.path(), tags);

    let err = detect_from_files(
        dir.path().join("frame.png"),
        dir.path().join("tags.json"),
        &DetectorParams::default(),
        Color::Black,
    )
    .expect_err("corner 0 missing");
    assert!(matches!(
        err,
        OfflineError::Detect(DetectError::MissingCorners { .. })
    ));
}

#[test]
fn malformed_detections_file_is_a_scan_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_inputs(dir.path(), board_tags());
    std::fs::write(dir.path().join("tags.json"), "not json").expect("write");

    let err = detect_from_files(
        dir.path().join("frame.png"),
        dir.path().join("tags.json"),
        &DetectorParams::default(),
        Color::Black,
    )
    .expect_err("bad json");
    assert!(matches!(err, OfflineError::Scan(ScanError::Json(_))));
}

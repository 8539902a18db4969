//! Debug overlay for camera frames.

use crate::{CornerRole, FrameReport};
use image::{Rgb, RgbImage};
use nalgebra::Point2;
use std::path::Path;

/// Side length of every marker, in pixels.
pub const MARKER_SIZE: u32 = 21;

pub const CORNER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const ORIGIN_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
pub const CENTER_COLOR: Rgb<u8> = Rgb([255, 0, 255]);
pub const PIECE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const SQUARE_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

/// Fill a `MARKER_SIZE` square centered on `center`, clipped to the image.
pub fn draw_marker(image: &mut RgbImage, center: Point2<f32>, color: Rgb<u8>) {
    let half = (MARKER_SIZE / 2) as i64;
    let cx = center.x.round() as i64;
    let cy = center.y.round() as i64;
    let (w, h) = (image.width() as i64, image.height() as i64);
    for y in (cy - half).max(0)..=(cy + half).min(h - 1) {
        for x in (cx - half).max(0)..=(cx + half).min(w - 1) {
            image.put_pixel(x as u32, y as u32, color);
        }
    }
}

/// Copy of `frame` with square centers, piece tags, corner tags, the grid
/// origin and the board center drawn on top, in that order.
pub fn annotate_frame(frame: &RgbImage, report: &FrameReport) -> RgbImage {
    let mut out = frame.clone();
    for (_, c) in report.grid.iter() {
        draw_marker(&mut out, c, SQUARE_COLOR);
    }
    for tag in &report.pieces {
        draw_marker(&mut out, tag.center, PIECE_COLOR);
    }
    for role in CornerRole::ALL {
        draw_marker(&mut out, report.corners.get(role), CORNER_COLOR);
    }
    draw_marker(&mut out, report.grid.basis().origin, ORIGIN_COLOR);
    draw_marker(&mut out, report.grid.board_center(), CENTER_COLOR);
    out
}

/// Annotate and write the frame as PNG (format from the extension).
pub fn save_annotated(
    path: impl AsRef<Path>,
    frame: &RgbImage,
    report: &FrameReport,
) -> Result<(), image::ImageError> {
    annotate_frame(frame, report).save(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_is_21_by_21() {
        let mut img = RgbImage::new(100, 100);
        draw_marker(&mut img, Point2::new(50.0, 50.0), PIECE_COLOR);
        let filled = img.pixels().filter(|p| **p == PIECE_COLOR).count();
        assert_eq!(filled, 21 * 21);
        assert_eq!(*img.get_pixel(40, 40), PIECE_COLOR);
        assert_eq!(*img.get_pixel(60, 60), PIECE_COLOR);
        assert_eq!(*img.get_pixel(39, 50), Rgb([0, 0, 0]));
    }

    #[test]
    fn marker_is_clipped_at_borders() {
        let mut img = RgbImage::new(30, 30);
        draw_marker(&mut img, Point2::new(0.0, 0.0), CORNER_COLOR);
        draw_marker(&mut img, Point2::new(-500.0, 40.0), CORNER_COLOR);
        let filled = img.pixels().filter(|p| **p == CORNER_COLOR).count();
        assert_eq!(filled, 11 * 11);
    }
}

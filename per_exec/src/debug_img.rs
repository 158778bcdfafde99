//! # Debug Images
//!
//! Annotated views of the region of interest, written into the session directory to show what
//! perception found in a frame.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::path::PathBuf;

use comms_if::eqpt::cam::Frame;
use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut},
    point::Point
};
use util::session::Session;

use crate::perception::{
    roi::{clip_rect, extract_rgb_roi, FrameGeometry},
    Detection, MarkerClass
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

const YELLOW: Rgb<u8> = Rgb([255, 255, 0]);
const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
const RED: Rgb<u8> = Rgb([255, 0, 0]);
const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const MAGENTA: Rgb<u8> = Rgb([255, 0, 255]);

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DebugImgError {
    #[error("Could not create the debug image directory: {0}")]
    DirError(std::io::Error),

    #[error("Could not save the debug image: {0}")]
    SaveError(image::ImageError)
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Draw the detection over the frame's region of interest.
pub fn render(frame: &Frame, geom: &FrameGeometry, det: &Detection) -> RgbImage {
    let mut img = extract_rgb_roi(frame, geom);
    let roi_h = geom.roi_height();

    // Obstacle zone which was masked out
    if let Some(r) = det.obstacle_zone {
        draw_hollow_rect_mut(&mut img, r, MAGENTA);
    }

    // Accepted blobs
    for (class, blob) in &det.blobs {
        let rect = clip_rect(
            blob.left.x,
            blob.top.y,
            blob.width + 1,
            blob.height + 1,
            geom.width,
            roi_h
        );
        if let Some(r) = rect {
            draw_hollow_rect_mut(&mut img, r, class_colour(*class));
        }
    }

    // Tracks
    for track in &[&det.left, &det.right, &det.stop] {
        draw_polyline(&mut img, track.points(), class_colour(track.class));
    }

    // Pairs the centreline is made from
    for (l, r) in &det.centerline.pairs {
        draw_line_segment_mut(&mut img, to_f32(*l), to_f32(*r), WHITE);
    }

    // Stop line
    if let Some((a, b)) = det.crossing.pair {
        draw_line_segment_mut(&mut img, to_f32(a), to_f32(b), RED);
    }

    // Centreline and the near point actually used
    draw_polyline(&mut img, &det.centerline.points, GREEN);
    for p in &det.centerline.points {
        draw_filled_circle_mut(&mut img, (p.x, p.y), 2, GREEN);
    }
    if let Some(p) = det.near_px {
        draw_filled_circle_mut(&mut img, (p.x, p.y), 4, MAGENTA);
    }

    img
}

/// Save a debug image into the session's `debug_img` directory.
///
/// Returns the path of the written file.
pub fn save(session: &Session, frame_num: u64, img: &RgbImage) -> Result<PathBuf, DebugImgError> {
    let dir = session.session_root.join("debug_img");
    std::fs::create_dir_all(&dir).map_err(DebugImgError::DirError)?;

    let path = dir.join(format!("frame_{:06}.png", frame_num));
    img.save(&path).map_err(DebugImgError::SaveError)?;

    Ok(path)
}

fn class_colour(class: MarkerClass) -> Rgb<u8> {
    match class {
        MarkerClass::Left => YELLOW,
        MarkerClass::Right => BLUE,
        MarkerClass::Stop => RED
    }
}

fn to_f32(p: Point<i32>) -> (f32, f32) {
    (p.x as f32, p.y as f32)
}

fn draw_polyline(img: &mut RgbImage, points: &[Point<i32>], colour: Rgb<u8>) {
    for w in points.windows(2) {
        draw_line_segment_mut(img, to_f32(w[0]), to_f32(w[1]), colour);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::perception::Perception;
    use chrono::Utc;

    #[test]
    fn test_render_marks_blobs() {
        let geom = FrameGeometry::new(320, 240);
        let mut frame = Frame::filled(Utc::now(), 320, 240, [60, 60, 60, 255]).unwrap();
        frame.fill_rect(40, 164, 20, 40, [0, 255, 255, 255]);

        let mut per = Perception::new(geom);
        let (det, _) = per.detect(&frame, None).unwrap();
        let img = render(&frame, &geom, &det);

        assert_eq!(img.dimensions(), (320, 120));

        // Something was drawn, the plain background is grey
        let annotated = img.pixels().any(|p| *p == GREEN || *p == MAGENTA);
        assert!(annotated);
    }
}

//! Region of interest selection and colour conversion

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::cam::Frame;
use image::{Rgb, RgbImage};
use imageproc::rect::Rect;
use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Geometry of the frames being processed.
///
/// The region of interest (ROI) is the lower half of the frame, starting on
/// row `height/2 - 1`. All perception coordinates are ROI pixels unless noted
/// otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameGeometry {
    pub width: i32,
    pub height: i32
}

/// A region of interest converted to HSV.
///
/// The three channels of each pixel hold hue (0 to 180), saturation and value.
pub type HsvImage = RgbImage;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FrameGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as i32,
            height: height as i32
        }
    }

    /// First frame row of the ROI.
    pub fn roi_top(&self) -> i32 {
        self.height / 2 - 1
    }

    /// Number of rows in the ROI.
    pub fn roi_height(&self) -> i32 {
        self.height / 2
    }

    /// Column of the image centreline.
    pub fn centre_x(&self) -> i32 {
        self.width / 2 - 1
    }

    /// Row of the ROI the forward axis of the vehicle is measured from.
    pub fn centre_y(&self) -> i32 {
        self.height / 2 - 1
    }

    /// Area of the full frame.
    pub fn frame_area(&self) -> i32 {
        self.width * self.height
    }

    /// Returns true if the frame has this geometry.
    pub fn matches(&self, frame: &Frame) -> bool {
        frame.width() as i32 == self.width && frame.height() as i32 == self.height
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert one pixel from BGR to 8-bit HSV.
///
/// Hue is halved to fit a byte, so it spans 0 to 180. Results are rounded to
/// the nearest integer.
pub fn bgr_to_hsv(b: u8, g: u8, r: u8) -> [u8; 3] {
    let (bf, gf, rf) = (b as f32, g as f32, r as f32);

    let v = bf.max(gf).max(rf);
    let min = bf.min(gf).min(rf);
    let diff = v - min;

    let s = if v > 0.0 {
        255.0 * diff / v
    }
    else {
        0.0
    };

    let mut h = if diff == 0.0 {
        0.0
    }
    else if v == rf {
        60.0 * (gf - bf) / diff
    }
    else if v == gf {
        120.0 + 60.0 * (bf - rf) / diff
    }
    else {
        240.0 + 60.0 * (rf - gf) / diff
    };
    if h < 0.0 {
        h += 360.0;
    }

    [
        (h / 2.0).round().min(180.0) as u8,
        s.round() as u8,
        v as u8
    ]
}

/// Select the ROI from a frame and convert it to HSV.
///
/// The frame must have the given geometry.
pub fn extract_hsv_roi(frame: &Frame, geom: &FrameGeometry) -> HsvImage {
    let top = geom.roi_top() as u32;
    let width = geom.width as u32;
    let data = frame.data();

    RgbImage::from_fn(width, geom.roi_height() as u32, |x, y| {
        let i = (((y + top) * width + x) * 4) as usize;
        Rgb(bgr_to_hsv(data[i], data[i + 1], data[i + 2]))
    })
}

/// Select the ROI from a frame as an RGB image.
pub fn extract_rgb_roi(frame: &Frame, geom: &FrameGeometry) -> RgbImage {
    let top = geom.roi_top() as u32;
    let width = geom.width as u32;
    let data = frame.data();

    RgbImage::from_fn(width, geom.roi_height() as u32, |x, y| {
        let i = (((y + top) * width + x) * 4) as usize;
        Rgb([data[i + 2], data[i + 1], data[i]])
    })
}

/// Clip a rectangle to `[0, width) x [0, height)`, returning `None` if
/// nothing is left.
pub fn clip_rect(x: i32, y: i32, w: i32, h: i32, width: i32, height: i32) -> Option<Rect> {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = x.saturating_add(w).min(width);
    let y1 = y.saturating_add(h).min(height);

    if x1 > x0 && y1 > y0 {
        Some(Rect::at(x0, y0).of_size((x1 - x0) as u32, (y1 - y0) as u32))
    }
    else {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_bgr_to_hsv() {
        // Pure colours
        assert_eq!(bgr_to_hsv(0, 255, 255), [30, 255, 255]);
        assert_eq!(bgr_to_hsv(140, 0, 0), [120, 255, 140]);
        assert_eq!(bgr_to_hsv(0, 0, 200), [0, 255, 200]);

        // Magenta-ish red wraps to the top of the hue range
        assert_eq!(bgr_to_hsv(40, 0, 200), [174, 255, 200]);

        // Greys have no hue or saturation
        assert_eq!(bgr_to_hsv(90, 90, 90), [0, 0, 90]);
        assert_eq!(bgr_to_hsv(0, 0, 0), [0, 0, 0]);
    }

    #[test]
    fn test_geometry() {
        let g = FrameGeometry::new(640, 480);

        assert_eq!(g.roi_top(), 239);
        assert_eq!(g.roi_height(), 240);
        assert_eq!(g.centre_x(), 319);
        assert_eq!(g.centre_y(), 239);
        assert_eq!(g.frame_area(), 307200);
    }

    #[test]
    fn test_extract_roi() {
        let geom = FrameGeometry::new(8, 6);
        let mut frame = Frame::filled(Utc::now(), 8, 6, [0, 0, 0, 255]).unwrap();

        // Row 2 is the first ROI row, row 5 is not in the ROI
        frame.fill_rect(0, 2, 8, 1, [0, 255, 255, 255]);
        frame.fill_rect(0, 5, 8, 1, [0, 0, 255, 255]);

        let hsv = extract_hsv_roi(&frame, &geom);
        assert_eq!(hsv.dimensions(), (8, 3));
        assert_eq!(hsv.get_pixel(3, 0).0, [30, 255, 255]);
        assert_eq!(hsv.get_pixel(3, 2).0, [0, 0, 0]);

        let rgb = extract_rgb_roi(&frame, &geom);
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 255, 0]);
    }

    #[test]
    fn test_clip_rect() {
        let r = clip_rect(-5, 2, 10, 100, 20, 10).unwrap();
        assert_eq!((r.left(), r.top(), r.width(), r.height()), (0, 2, 5, 8));

        assert!(clip_rect(25, 0, 10, 10, 20, 10).is_none());
        assert!(clip_rect(0, 0, 0, 10, 20, 10).is_none());

        // Oversized rectangles from a malformed box are clipped, not overflowed
        let r = clip_rect(5, 3, i32::MAX, i32::MAX, 20, 10).unwrap();
        assert_eq!((r.left(), r.top(), r.width(), r.height()), (5, 3, 15, 7));
        assert!(clip_rect(i32::MIN, i32::MIN, i32::MAX, i32::MAX, 20, 10).is_none());
    }
}

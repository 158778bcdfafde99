//! Marker segmentation
//!
//! Produces one binary mask per marker class from the HSV region of interest.
//! Parts of the ROI which can never contain a useful marker (the horizon band,
//! the vehicle's hood and the obstacle in front of it) are zeroed first.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::nav::ObstacleBox;
use image::{GrayImage, Luma, Rgb};
use imageproc::rect::Rect;
use log::trace;

use super::{
    roi::{clip_rect, FrameGeometry, HsvImage},
    ClassParams, Params
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Binary masks (0 or 255) of each marker class, with the ROI's dimensions.
#[derive(Debug, Clone)]
pub struct Masks {
    pub left: GrayImage,
    pub right: GrayImage,
    pub stop: GrayImage
}

/// Values computed during segmentation, kept for the status report.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentReport {
    pub left_sat_lower: u8,
    pub right_sat_lower: u8,
    pub obstacle_masked: bool
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Segment the HSV ROI into the three marker masks.
///
/// The ROI is modified in place, the masked out zones are set to zero.
pub fn segment(
    hsv: &mut HsvImage,
    obstacle: Option<&ObstacleBox>,
    geom: &FrameGeometry,
    params: &Params
) -> (Masks, SegmentReport) {
    let roi_w = hsv.width() as i32;
    let roi_h = hsv.height() as i32;

    // Saturation is measured before anything is zeroed
    let left_half = clip_rect(0, 0, geom.width / 2, geom.height / 2, roi_w, roi_h);
    let right_half = clip_rect(
        geom.width / 2 - 1, 0, geom.width / 2, geom.height / 2, roi_w, roi_h
    );
    let mean_left = left_half.map(|r| mean_saturation(hsv, r)).unwrap_or(0.0);
    let mean_right = right_half.map(|r| mean_saturation(hsv, r)).unwrap_or(0.0);

    let mut report = SegmentReport {
        left_sat_lower: params.left.sat_lower(mean_left, params.sat_reference),
        right_sat_lower: params.right.sat_lower(mean_right, params.sat_reference),
        obstacle_masked: false
    };

    trace!(
        "Mean saturation L/R: {:.1}/{:.1}, lower bounds {}/{}",
        mean_left, mean_right, report.left_sat_lower, report.right_sat_lower
    );

    // Horizon band
    if let Some(r) = clip_rect(0, 0, geom.width, params.horizon_band_height_px as i32, roi_w, roi_h) {
        zero_rect(hsv, r);
    }

    // Hood of the vehicle
    if let Some(r) = clip_rect(
        geom.width / 4 - 1,
        3 * geom.height / 8 - 1,
        geom.width / 2,
        geom.height / 8,
        roi_w,
        roi_h
    ) {
        zero_rect(hsv, r);
    }

    // Obstacle
    if let Some(r) = obstacle.and_then(|b| obstacle_zone(b, geom, params)) {
        zero_rect(hsv, r);
        report.obstacle_masked = true;
    }

    let stop_sat_lower = params.stop.sat_lower(0.0, params.sat_reference);

    let masks = Masks {
        left: in_range(hsv, &params.left, report.left_sat_lower),
        right: in_range(hsv, &params.right, report.right_sat_lower),
        stop: in_range(hsv, &params.stop, stop_sat_lower)
    };

    (masks, report)
}

/// Mean saturation of the pixels in the rectangle, which must lie inside the
/// image.
pub fn mean_saturation(hsv: &HsvImage, rect: Rect) -> f64 {
    let mut sum = 0u64;

    for y in rect.top()..=rect.bottom() {
        for x in rect.left()..=rect.right() {
            sum += hsv.get_pixel(x as u32, y as u32).0[1] as u64;
        }
    }

    sum as f64 / (rect.width() as f64 * rect.height() as f64)
}

/// Set every pixel in the rectangle, which must lie inside the image, to zero.
pub fn zero_rect(hsv: &mut HsvImage, rect: Rect) {
    for y in rect.top()..=rect.bottom() {
        for x in rect.left()..=rect.right() {
            hsv.put_pixel(x as u32, y as u32, Rgb([0, 0, 0]));
        }
    }
}

/// Get the part of the ROI hidden by an obstacle which shall be masked out.
///
/// The box is moved into ROI coordinates and clipped to the ROI, then its
/// central part horizontally and its upper part vertically are kept. Returns
/// `None` if there is no obstacle or nothing of it is in the ROI.
pub fn obstacle_zone(
    obstacle: &ObstacleBox,
    geom: &FrameGeometry,
    params: &Params
) -> Option<Rect> {
    if !obstacle.is_present() {
        return None
    }

    let roi_h = geom.roi_height();
    let clipped = clip_rect(
        obstacle.x,
        obstacle.y.saturating_sub(geom.roi_top()),
        obstacle.w,
        obstacle.h,
        geom.width,
        roi_h
    )?;

    let cw = clipped.width() as i32;
    let ch = clipped.height() as i32;
    let w = (cw as f64 * params.obstacle_mask_width_frac) as i32;
    let h = (ch as f64 * params.obstacle_mask_height_frac) as i32;

    clip_rect(clipped.left() + (cw - w) / 2, clipped.top(), w, h, geom.width, roi_h)
}

/// Threshold the HSV image with the class's (inclusive) ranges.
pub fn in_range(hsv: &HsvImage, class: &ClassParams, sat_lower: u8) -> GrayImage {
    let (h, s, v) = (class.h, [sat_lower, class.s[1]], class.v);

    GrayImage::from_fn(hsv.width(), hsv.height(), |x, y| {
        let [ph, ps, pv] = hsv.get_pixel(x, y).0;

        let inside = ph >= h[0] && ph <= h[1]
            && ps >= s[0] && ps <= s[1]
            && pv >= v[0] && pv <= v[1];

        Luma([if inside { 255 } else { 0 }])
    })
}

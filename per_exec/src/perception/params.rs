//! Parameters structure for perception

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Perception parameters.
///
/// All pixel distances are in frame pixels. Values missing from the parameter
/// file take their default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {

    /// Height of the band at the top of the region of interest which is
    /// ignored, it only contains the background beyond the track.
    pub horizon_band_height_px: u32,

    /// Mean saturation the adaptive saturation bounds are relative to.
    pub sat_reference: i32,

    /// Colour range of the left boundary markers (yellow).
    pub left: ClassParams,

    /// Colour range of the right boundary markers (blue).
    pub right: ClassParams,

    /// Colour range of the stop markers (red).
    pub stop: ClassParams,

    /// Fraction of the obstacle box width which is masked out, centred on
    /// the box.
    pub obstacle_mask_width_frac: f64,

    /// Fraction of the obstacle box height which is masked out, from the top
    /// of the box.
    pub obstacle_mask_height_frac: f64,

    /// Number of dilations, then erosions, applied to each mask.
    pub morph_iterations: u8,

    pub canny_low: f32,
    pub canny_high: f32,

    /// Douglas-Peucker tolerance used to simplify outlines.
    pub poly_epsilon_px: f64,

    /// Outlines with fewer vertices once simplified are ignored.
    pub min_poly_vertices: usize,

    /// Outlines with more vertices once simplified are ignored.
    pub max_poly_vertices: usize,

    /// Width over height bounds (exclusive) for accepted blobs.
    pub aspect_bounds: [f64; 2],

    /// Minimum blob area (exclusive).
    pub min_blob_area_px: i32,

    /// Blobs must be smaller than the frame area divided by this value.
    pub max_blob_area_div: i32,

    /// Centroids closer than this in both axes to the previously kept one are
    /// merged into it.
    pub merge_dist_px: i32,

    /// Stop markers forming a crossing lie on either side of the frame centre.
    /// The product of their offsets from it must exceed
    /// `(width / crossing_lateral_div)^2`.
    pub crossing_lateral_div: i32,

    /// Maximum vertical distance between the two stop markers of a crossing.
    pub crossing_max_dy_px: i32,

    /// Inset from the frame edges of the point synthesised for a missing
    /// boundary.
    pub synth_inset_px: i32,

    /// The near point is damped when it jumps laterally by more than
    /// `width / damping_div`.
    pub damping_div: f64,

    /// In verbose mode a diagnostic image is written every this many frames.
    pub debug_image_period: u32
}

/// HSV range of one marker class, in the 8-bit convention where hue spans
/// 0 to 180.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ClassParams {
    /// Inclusive hue bounds
    pub h: [u8; 2],

    /// Inclusive saturation bounds. The lower bound is replaced by the
    /// adaptive one if `adaptive_sat_base` is set.
    pub s: [u8; 2],

    /// Inclusive value bounds
    pub v: [u8; 2],

    /// When set the lower saturation bound is
    /// `adaptive_sat_base + (mean_saturation - sat_reference)`.
    pub adaptive_sat_base: Option<i32>
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            horizon_band_height_px: 40,
            sat_reference: 45,
            left: ClassParams {
                h: [10, 40],
                s: [0, 255],
                v: [100, 255],
                adaptive_sat_base: Some(70)
            },
            right: ClassParams {
                h: [110, 130],
                s: [0, 255],
                v: [20, 150],
                adaptive_sat_base: Some(101)
            },
            stop: ClassParams {
                h: [156, 180],
                s: [120, 255],
                v: [70, 255],
                adaptive_sat_base: None
            },
            obstacle_mask_width_frac: 0.5,
            obstacle_mask_height_frac: 0.7,
            morph_iterations: 4,
            canny_low: 30.0,
            canny_high: 90.0,
            poly_epsilon_px: 3.0,
            min_poly_vertices: 3,
            max_poly_vertices: 30,
            aspect_bounds: [0.15, 0.8],
            min_blob_area_px: 200,
            max_blob_area_div: 20,
            merge_dist_px: 25,
            crossing_lateral_div: 6,
            crossing_max_dy_px: 70,
            synth_inset_px: 50,
            damping_div: 25.0,
            debug_image_period: 10
        }
    }
}

impl ClassParams {
    /// Get the lower saturation bound given the mean saturation of the region
    /// the class is searched in.
    pub fn sat_lower(&self, mean_sat: f64, sat_reference: i32) -> u8 {
        match self.adaptive_sat_base {
            Some(base) => {
                let lower = base + (mean_sat as i32 - sat_reference);
                lower.max(0).min(255) as u8
            },
            None => self.s[0]
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sat_lower() {
        let p = Params::default();

        assert_eq!(p.left.sat_lower(45.0, p.sat_reference), 70);
        assert_eq!(p.left.sat_lower(20.7, p.sat_reference), 45);
        assert_eq!(p.right.sat_lower(250.0, p.sat_reference), 255);
        assert_eq!(p.left.sat_lower(0.0, -100), 170);
        assert_eq!(ClassParams { adaptive_sat_base: Some(-80), ..p.left }.sat_lower(0.0, 45), 0);

        // Non adaptive classes keep their own bound
        assert_eq!(p.stop.sat_lower(0.0, p.sat_reference), 120);
    }

    #[test]
    fn test_shipped_params_file() {
        let p: Params = util::params::load_from_path(
            concat!(env!("CARGO_MANIFEST_DIR"), "/../params/per_exec.toml")
        ).unwrap();

        assert_eq!(p.left.adaptive_sat_base, Some(70));
        assert_eq!(p.stop.adaptive_sat_base, None);
        assert_eq!(p.right.h, [110, 130]);
    }

    #[test]
    fn test_partial_params_file() {
        let p: Params = util::params::from_str("merge_dist_px = 30\n").unwrap();

        assert_eq!(p.merge_dist_px, 30);
        assert_eq!(p.min_blob_area_px, 200);
    }
}

//! Navigation control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for navigation control
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Params {

    /// Time to wait after startup before the first control tick, so that the
    /// other executables are up.
    pub startup_grace_s: f64,

    /// Previous pedal position to predicted displacement length
    pub k_s: f64,

    /// Previous steering request to predicted displacement angle
    pub k_a: f64,

    /// Weight of the measured near point against the predicted one
    pub blend_gain: f64,

    /// Steering controller proportional gain
    pub k_p: f64,

    /// Steering controller derivative gain
    pub k_d: f64,

    /// Headings shorter than this are given unit length
    pub min_heading_length: f64,

    /// Pedal position when driving straight, reduced in proportion to the
    /// steering request
    pub base_pedal: f64,

    /// Obstacle speed control needs the box to cover more than
    /// `1 / obstacle_min_area_div` of the image.
    pub obstacle_min_area_div: f64,

    /// Obstacle speed control needs the absolute cross product to be below
    /// this, so it is only used on straight sections.
    pub obstacle_max_cross: f64,

    /// Pedal position behind an obstacle which is just large enough to
    /// trigger speed control
    pub obstacle_pedal: f64,

    /// The obstacle pedal reaches zero when the box covers
    /// `1 / obstacle_max_area_div` of the image
    pub obstacle_max_area_div: f64,

    /// Pedal position limit while approaching a crossing with an obstacle in
    /// view
    pub crossing_max_pedal: f64,

    /// The vehicle stops at a crossing when the obstacle box reaches the
    /// right half of the image and covers more than
    /// `1 / crossing_stop_area_div` of it
    pub crossing_stop_area_div: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            startup_grace_s: 12.0,
            k_s: 600.0,
            k_a: 1.0,
            blend_gain: 0.65,
            k_p: 0.20,
            k_d: 0.05,
            min_heading_length: 0.01,
            base_pedal: 0.10,
            obstacle_min_area_div: 100.0,
            obstacle_max_cross: 0.15,
            obstacle_pedal: 0.2,
            obstacle_max_area_div: 10.0,
            crossing_max_pedal: 0.04,
            crossing_stop_area_div: 20.0
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_shipped_params_file() {
        let p: Params = util::params::load_from_path(
            concat!(env!("CARGO_MANIFEST_DIR"), "/../params/ctrl_exec.toml")
        ).unwrap();
        let d = Params::default();

        assert_eq!(p.startup_grace_s, d.startup_grace_s);
        assert_eq!(p.k_s, d.k_s);
        assert_eq!(p.crossing_stop_area_div, d.crossing_stop_area_div);
    }
}

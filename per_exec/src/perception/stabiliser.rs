//! Navigation point stabilisation
//!
//! Damps sudden lateral jumps of the near point, which are usually caused by a
//! marker briefly disappearing, and converts the centreline into vehicle
//! relative navigation points.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::nav::NearFarPoints;
use imageproc::point::Point;
use log::trace;
use util::maths::mid_i32;

use super::{roi::FrameGeometry, Centerline, Params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Keeps the near point of the previous frame.
#[derive(Debug, Clone)]
pub struct NavStabiliser {
    geom: FrameGeometry,

    /// Lateral jump above which the near point is damped
    threshold_px: f64,

    prev_near: Point<i32>
}

/// Output of the stabiliser for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Stabilised {
    /// Navigation points in vehicle coordinates
    pub nav: NearFarPoints,

    /// Near point in ROI pixels, after damping
    pub near_px: Option<Point<i32>>,

    /// True if the near point was damped
    pub damped: bool
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl NavStabiliser {
    /// Create a stabiliser, the initial near point is the centre of the ROI.
    pub fn new(geom: FrameGeometry, params: &Params) -> Self {
        Self {
            geom,
            threshold_px: geom.width as f64 / params.damping_div,
            prev_near: Point::new(geom.centre_x(), geom.centre_y())
        }
    }

    /// Near point retained from the last frame with a centreline.
    pub fn prev_near(&self) -> Point<i32> {
        self.prev_near
    }

    /// Stabilise this frame's centreline.
    ///
    /// When there is no centreline the output is all zeros, the crossing flag
    /// is cleared, and the retained near point is left as it is.
    pub fn update(&mut self, line: &Centerline, reach_cross_road: bool) -> Stabilised {
        let (near, far) = match (line.near(), line.far()) {
            (Some(n), Some(f)) => (n, f),
            _ => return Stabilised::default()
        };

        let prev = self.prev_near;
        let damped = ((prev.x - near.x).abs() as f64) > self.threshold_px;

        let near = if damped {
            trace!("Damping near point jump from {:?} to {:?}", prev, near);
            Point::new(mid_i32(prev.x, near.x), mid_i32(prev.y, near.y))
        }
        else {
            near
        };
        self.prev_near = near;

        // A single point is both near and far
        let far = if line.points.len() == 1 { near } else { far };

        let (near_x, near_y) = to_vehicle(near, &self.geom);
        let (far_x, far_y) = to_vehicle(far, &self.geom);

        Stabilised {
            nav: NearFarPoints {
                near_x,
                near_y,
                far_x,
                far_y,
                reach_cross_road
            },
            near_px: Some(near),
            damped
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a ROI pixel into vehicle coordinates, `(lateral, forward)`.
///
/// Lateral is positive to the left of the image centreline, forward is
/// positive up the ROI.
pub fn to_vehicle(p: Point<i32>, geom: &FrameGeometry) -> (i32, i32) {
    (geom.centre_x() - p.x, geom.centre_y() - p.y)
}

#[cfg(test)]
mod test {
    use super::*;

    fn line(v: &[(i32, i32)]) -> Centerline {
        Centerline {
            pairs: vec![],
            points: v.iter().map(|&(x, y)| Point::new(x, y)).collect()
        }
    }

    #[test]
    fn test_to_vehicle() {
        let g = FrameGeometry::new(320, 240);

        assert_eq!(to_vehicle(Point::new(159, 119), &g), (0, 0));
        assert_eq!(to_vehicle(Point::new(100, 60), &g), (59, 59));
        assert_eq!(to_vehicle(Point::new(300, 119), &g), (-141, 0));
    }

    #[test]
    fn test_damping() {
        let g = FrameGeometry::new(320, 240);
        let mut s = NavStabiliser::new(g, &Params::default());
        s.prev_near = Point::new(100, 100);

        // 320/25 = 12.8 px
        let out = s.update(&line(&[(140, 60)]), false);
        assert!(out.damped);
        assert_eq!(out.near_px, Some(Point::new(120, 80)));
        assert_eq!(s.prev_near(), Point::new(120, 80));

        // Single point, far is the damped near point
        assert_eq!(out.nav.near_x, out.nav.far_x);
        assert_eq!(out.nav.near_y, out.nav.far_y);

        // Small jumps are kept as they are
        let out = s.update(&line(&[(130, 70), (150, 10)]), true);
        assert!(!out.damped);
        assert_eq!(out.near_px, Some(Point::new(130, 70)));
        assert_eq!(out.nav, NearFarPoints {
            near_x: 29,
            near_y: 49,
            far_x: 9,
            far_y: 109,
            reach_cross_road: true
        });
    }

    #[test]
    fn test_no_centerline() {
        let g = FrameGeometry::new(320, 240);
        let mut s = NavStabiliser::new(g, &Params::default());
        assert_eq!(s.prev_near(), Point::new(159, 119));

        let out = s.update(&Centerline::default(), true);
        assert!(out.nav.is_empty());
        assert!(!out.nav.reach_cross_road);
        assert_eq!(s.prev_near(), Point::new(159, 119));
    }
}

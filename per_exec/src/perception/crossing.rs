//! Crossing detection from the stop marker track

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use imageproc::point::Point;
use util::maths::mid_i32;

use super::{roi::FrameGeometry, MarkerTrack, Params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Result of the crossing detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crossing {
    /// A crossing is ahead, more than one stop marker is visible
    pub reach: bool,

    /// The pair of stop markers spanning the track, if any
    pub pair: Option<(Point<i32>, Point<i32>)>
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Crossing {
    /// Midpoint of the stop line, which extends the centreline.
    pub fn point(&self) -> Option<Point<i32>> {
        self.pair.map(|(a, b)| Point::new(mid_i32(a.x, b.x), mid_i32(a.y, b.y)))
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Look for a crossing in the stop track.
///
/// The stop line is the first adjacent pair of stop markers lying on either
/// side of the image centre, far enough from it, and at a similar distance
/// from the vehicle.
pub fn detect_crossing(stop: &MarkerTrack, geom: &FrameGeometry, params: &Params) -> Crossing {
    let cx = geom.centre_x();
    let lateral = geom.width / params.crossing_lateral_div;
    let min_product = -(lateral * lateral);

    let pair = stop.points()
        .windows(2)
        .find(|w| {
            (w[0].x - cx) * (w[1].x - cx) < min_product
                && (w[0].y - w[1].y).abs() <= params.crossing_max_dy_px
        })
        .map(|w| (w[0], w[1]));

    Crossing {
        reach: stop.len() > 1,
        pair
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::perception::MarkerClass;

    fn track(v: &[(i32, i32)]) -> MarkerTrack {
        MarkerTrack::from_points(
            MarkerClass::Stop,
            v.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            25
        )
    }

    #[test]
    fn test_crossing_found() {
        // (240/6)^2 = 1600 < 50 * 50
        let g = FrameGeometry::new(240, 180);
        let p = Params::default();
        let cx = g.centre_x();

        let c = detect_crossing(&track(&[(cx - 50, 60), (cx + 50, 80)]), &g, &p);

        assert!(c.reach);
        assert_eq!(c.pair, Some((Point::new(cx + 50, 80), Point::new(cx - 50, 60))));
        assert_eq!(c.point(), Some(Point::new(cx, 70)));
    }

    #[test]
    fn test_crossing_rejected() {
        let g = FrameGeometry::new(240, 180);
        let p = Params::default();
        let cx = g.centre_x();

        // Same side of the centre
        let c = detect_crossing(&track(&[(cx + 60, 60), (cx + 120, 80)]), &g, &p);
        assert!(c.reach);
        assert_eq!(c.point(), None);

        // Too far apart vertically
        let c = detect_crossing(&track(&[(cx - 50, 0), (cx + 50, 80)]), &g, &p);
        assert_eq!(c.point(), None);

        // Too close to the centre on a wide frame, (640/6)^2 > 2500
        let g_wide = FrameGeometry::new(640, 480);
        let cx = g_wide.centre_x();
        let c = detect_crossing(&track(&[(cx - 50, 60), (cx + 50, 80)]), &g_wide, &p);
        assert_eq!(c.point(), None);

        // One marker is not a crossing
        let c = detect_crossing(&track(&[(10, 60)]), &g, &p);
        assert_eq!(c, Crossing::default());
    }
}

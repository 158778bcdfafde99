//! Centreline estimation from the boundary tracks

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use imageproc::point::Point;
use util::maths::mid_i32;

use super::{roi::FrameGeometry, MarkerTrack, Params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Centreline of the track, nearest point first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Centerline {
    /// Left and right boundary points each centreline point is made from
    pub pairs: Vec<(Point<i32>, Point<i32>)>,

    /// Centreline points, the crossing point last if there is one
    pub points: Vec<Point<i32>>
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Centerline {
    pub fn near(&self) -> Option<Point<i32>> {
        self.points.first().copied()
    }

    pub fn far(&self) -> Option<Point<i32>> {
        self.points.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Pair the boundary tracks into a centreline.
///
/// When only one boundary is visible the other is assumed to be in the upper
/// corner on its side of the ROI. Entries are paired index-wise, the extra
/// entries of the longer track are paired with the last entry of the shorter
/// one.
pub fn pair_tracks(
    left: &MarkerTrack,
    right: &MarkerTrack,
    crossing_point: Option<Point<i32>>,
    geom: &FrameGeometry,
    params: &Params
) -> Centerline {
    let inset = params.synth_inset_px;
    let synth_y = geom.height / 2 - 1 - inset;

    let synth_left = [Point::new(inset, synth_y)];
    let synth_right = [Point::new(geom.width - 1 - inset, synth_y)];

    let l: &[Point<i32>] = if left.is_empty() { &synth_left } else { left.points() };
    let r: &[Point<i32>] = if right.is_empty() { &synth_right } else { right.points() };

    let mut line = Centerline::default();

    if !(left.is_empty() && right.is_empty()) {
        for i in 0..l.len().max(r.len()) {
            let lp = l[i.min(l.len() - 1)];
            let rp = r[i.min(r.len() - 1)];

            line.pairs.push((lp, rp));
            line.points.push(Point::new(mid_i32(lp.x, rp.x), mid_i32(lp.y, rp.y)));
        }
    }

    if let Some(c) = crossing_point {
        line.points.push(c);
    }

    line
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::perception::MarkerClass;

    fn track(class: MarkerClass, v: &[(i32, i32)]) -> MarkerTrack {
        MarkerTrack::from_points(class, v.iter().map(|&(x, y)| Point::new(x, y)).collect(), 25)
    }

    fn geom() -> FrameGeometry {
        FrameGeometry::new(320, 240)
    }

    #[test]
    fn test_pair_single() {
        let l = track(MarkerClass::Left, &[(10, 50)]);
        let r = track(MarkerClass::Right, &[(90, 50)]);

        let c = pair_tracks(&l, &r, None, &geom(), &Params::default());

        assert_eq!(c.points, vec![Point::new(50, 50)]);
        assert_eq!(c.near(), c.far());
    }

    #[test]
    fn test_pair_uneven() {
        let l = track(MarkerClass::Left, &[(10, 100), (40, 60), (80, 20)]);
        let r = track(MarkerClass::Right, &[(300, 100)]);

        let c = pair_tracks(&l, &r, Some(Point::new(150, 5)), &geom(), &Params::default());

        assert_eq!(c.points, vec![
            Point::new(155, 100),
            Point::new(170, 80),
            Point::new(190, 60),
            Point::new(150, 5)
        ]);
        assert_eq!(c.pairs.len(), 3);
        assert_eq!(c.far(), Some(Point::new(150, 5)));
    }

    #[test]
    fn test_pair_synthesised() {
        let p = Params::default();
        let g = geom();

        // Missing right boundary is assumed at (269, 69)
        let l = track(MarkerClass::Left, &[(11, 101)]);
        let r = track(MarkerClass::Right, &[]);
        let c = pair_tracks(&l, &r, None, &g, &p);
        assert_eq!(c.points, vec![Point::new(140, 85)]);

        // Missing left boundary is assumed at (50, 69)
        let l = track(MarkerClass::Left, &[]);
        let r = track(MarkerClass::Right, &[(250, 101)]);
        let c = pair_tracks(&l, &r, None, &g, &p);
        assert_eq!(c.points, vec![Point::new(150, 85)]);
    }

    #[test]
    fn test_pair_empty() {
        let l = track(MarkerClass::Left, &[]);
        let r = track(MarkerClass::Right, &[]);

        let c = pair_tracks(&l, &r, None, &geom(), &Params::default());
        assert!(c.is_empty());

        // The crossing point alone still makes a centreline
        let c = pair_tracks(&l, &r, Some(Point::new(159, 40)), &geom(), &Params::default());
        assert_eq!(c.points, vec![Point::new(159, 40)]);
    }
}

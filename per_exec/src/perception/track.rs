//! Marker tracks
//!
//! A track is the ordered list of marker centroids of one class, nearest to
//! the vehicle (largest row) first.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use imageproc::point::Point;

use super::{MarkerBlob, MarkerClass};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Ordered centroids of the accepted blobs of one class.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerTrack {
    pub class: MarkerClass,
    points: Vec<Point<i32>>
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MarkerTrack {
    /// Build a track from blobs given in outline order.
    pub fn from_blobs(class: MarkerClass, blobs: &[MarkerBlob], merge_dist: i32) -> Self {
        Self::from_points(class, blobs.iter().map(|b| b.centroid).collect(), merge_dist)
    }

    /// Build a track from centroids given in outline order.
    pub fn from_points(class: MarkerClass, mut points: Vec<Point<i32>>, merge_dist: i32) -> Self {
        merge_close(&mut points, merge_dist);
        sort_nearest_first(&mut points);

        Self {
            class,
            points
        }
    }

    pub fn points(&self) -> &[Point<i32>] {
        &self.points
    }

    /// Nearest point of the track.
    pub fn first(&self) -> Option<Point<i32>> {
        self.points.first().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Drop every point closer than `dist` in both axes to the last point kept.
pub fn merge_close(points: &mut Vec<Point<i32>>, dist: i32) {
    points.dedup_by(|p, kept| (p.x - kept.x).abs() < dist && (p.y - kept.y).abs() < dist);
}

/// Stable sort by descending row.
pub fn sort_nearest_first(points: &mut [Point<i32>]) {
    points.sort_by(|a, b| b.y.cmp(&a.y));
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    fn pts(v: &[(i32, i32)]) -> Vec<Point<i32>> {
        v.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn test_merge_close() {
        let mut p = pts(&[(10, 10), (20, 30), (40, 30), (45, 200), (46, 205)]);
        merge_close(&mut p, 25);

        // (40, 30) is only close to (10, 10) vertically so it is kept
        assert_eq!(p, pts(&[(10, 10), (40, 30), (45, 200)]));
    }

    #[test]
    fn test_track_order() {
        let t = MarkerTrack::from_points(
            MarkerClass::Left,
            pts(&[(50, 20), (60, 90), (70, 55), (200, 90)]),
            25
        );

        assert_eq!(t.points(), pts(&[(60, 90), (200, 90), (70, 55), (50, 20)]).as_slice());
        assert_eq!(t.first(), Some(Point::new(60, 90)));
        assert_eq!(t.len(), 4);

        assert!(MarkerTrack::from_points(MarkerClass::Stop, vec![], 25).is_empty());
    }

    fn arb_points() -> impl Strategy<Value = Vec<Point<i32>>> {
        prop::collection::vec((0i32..320, 0i32..120), 0..20)
            .prop_map(|v| v.into_iter().map(|(x, y)| Point::new(x, y)).collect())
    }

    proptest! {
        #[test]
        fn prop_merge_idempotent(points in arb_points(), dist in 1i32..40) {
            let mut once = points.clone();
            merge_close(&mut once, dist);

            let mut twice = once.clone();
            merge_close(&mut twice, dist);

            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_track_sorted(points in arb_points()) {
            let t = MarkerTrack::from_points(MarkerClass::Right, points.clone(), 25);

            prop_assert!(t.len() <= points.len());
            for w in t.points().windows(2) {
                prop_assert!(w[0].y >= w[1].y);
            }
        }
    }
}

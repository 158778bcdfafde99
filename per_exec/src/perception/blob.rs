//! Marker blob extraction and shape filtering

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use image::GrayImage;
use imageproc::{
    contours::find_contours,
    distance_transform::Norm,
    edges::canny,
    geometry::{approximate_polygon_dp, convex_hull},
    morphology::{dilate, erode},
    point::Point
};
use serde::Serialize;

use super::{roi::FrameGeometry, Params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A candidate marker found in a mask.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerBlob {
    /// Simplified outline
    pub outline: Vec<Point<i32>>,

    /// Convex hull of the outline
    pub hull: Vec<Point<i32>>,

    /// Leftmost hull vertex
    pub left: Point<i32>,
    /// Rightmost hull vertex
    pub right: Point<i32>,
    /// Topmost hull vertex
    pub top: Point<i32>,
    /// Bottommost hull vertex
    pub bottom: Point<i32>,

    /// Midpoint of the extrema
    pub centroid: Point<i32>,

    pub width: i32,
    pub height: i32,
    pub area: i32
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Classes of marker found on the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarkerClass {
    /// Left boundary (yellow)
    Left,

    /// Right boundary (blue)
    Right,

    /// Stop line (red)
    Stop
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MarkerBlob {
    /// Build a blob from a simplified outline.
    ///
    /// Returns `None` if the outline is empty.
    pub fn from_outline(outline: Vec<Point<i32>>) -> Option<Self> {
        let hull = convex_hull(outline.as_slice());

        let first = *hull.first()?;
        let (mut left, mut right, mut top, mut bottom) = (first, first, first, first);

        for p in hull.iter().skip(1) {
            if p.x < left.x {
                left = *p;
            }
            if p.x > right.x {
                right = *p;
            }
            if p.y < top.y {
                top = *p;
            }
            if p.y > bottom.y {
                bottom = *p;
            }
        }

        let width = right.x - left.x;
        let height = bottom.y - top.y;

        Some(Self {
            centroid: Point::new((left.x + right.x) / 2, (top.y + bottom.y) / 2),
            outline,
            hull,
            left,
            right,
            top,
            bottom,
            width,
            height,
            area: width * height
        })
    }

    /// Width over height of the blob, `None` for a flat blob.
    pub fn aspect(&self) -> Option<f64> {
        if self.height > 0 {
            Some(self.width as f64 / self.height as f64)
        }
        else {
            None
        }
    }

    /// Returns true if the blob has the shape and size of a marker.
    pub fn shape_ok(&self, geom: &FrameGeometry, params: &Params) -> bool {
        let aspect_ok = match self.aspect() {
            Some(a) => a > params.aspect_bounds[0] && a < params.aspect_bounds[1],
            None => false
        };

        aspect_ok
            && self.area > params.min_blob_area_px
            && self.area < geom.frame_area() / params.max_blob_area_div
    }

    /// Returns true if the blob lies where markers of its class are expected.
    ///
    /// Boundary markers shall be nearer to the vehicle than the nearest stop
    /// marker (`max_stop_y`), and on their own side of the frame unless they
    /// are in the upper part of the ROI where the track may curve across.
    /// Stop markers shall be wider at their base than at their centre.
    pub fn position_ok(&self, class: MarkerClass, geom: &FrameGeometry, max_stop_y: i32) -> bool {
        let Point { x: x_mid, y: y_mid } = self.centroid;
        let upper_band = y_mid < geom.height / 4;

        match class {
            MarkerClass::Stop => self.right.y > y_mid && self.left.y > y_mid,
            MarkerClass::Left =>
                (upper_band || x_mid < geom.width / 2) && y_mid > max_stop_y,
            MarkerClass::Right =>
                (upper_band || x_mid > geom.width / 2) && y_mid > max_stop_y
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Close small gaps in a mask by dilating then eroding it.
///
/// Each iteration uses a 3x3 square structuring element.
pub fn clean_mask(mask: &GrayImage, iterations: u8) -> GrayImage {
    if iterations == 0 {
        return mask.clone()
    }

    let dilated = dilate(mask, Norm::LInf, iterations);
    erode(&dilated, Norm::LInf, iterations)
}

/// Find the simplified outlines of all shapes in a cleaned mask.
///
/// Nested outlines are included. Outlines whose vertex count is outside the
/// configured bounds are dropped.
pub fn find_outlines(mask: &GrayImage, params: &Params) -> Vec<Vec<Point<i32>>> {
    let edges = canny(mask, params.canny_low, params.canny_high);

    find_contours::<i32>(&edges)
        .into_iter()
        .map(|c| approximate_polygon_dp(&c.points, params.poly_epsilon_px, true))
        .filter(|o| o.len() >= params.min_poly_vertices && o.len() <= params.max_poly_vertices)
        .collect()
}

/// Extract the accepted marker blobs of one class from its raw mask, in
/// outline order.
pub fn extract_blobs(
    mask: &GrayImage,
    class: MarkerClass,
    geom: &FrameGeometry,
    params: &Params,
    max_stop_y: i32
) -> Vec<MarkerBlob> {
    let cleaned = clean_mask(mask, params.morph_iterations);

    find_outlines(&cleaned, params)
        .into_iter()
        .filter_map(MarkerBlob::from_outline)
        .filter(|b| b.shape_ok(geom, params) && b.position_ok(class, geom, max_stop_y))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use image::Luma;
    use imageproc::{drawing::draw_filled_rect_mut, rect::Rect};

    fn geom() -> FrameGeometry {
        FrameGeometry::new(320, 240)
    }

    fn quad(x: i32, y: i32, w: i32, h: i32) -> Vec<Point<i32>> {
        vec![
            Point::new(x, y),
            Point::new(x + w, y),
            Point::new(x + w, y + h),
            Point::new(x, y + h)
        ]
    }

    #[test]
    fn test_from_outline() {
        let b = MarkerBlob::from_outline(quad(10, 20, 20, 40)).unwrap();

        assert_eq!((b.width, b.height, b.area), (20, 40, 800));
        assert_eq!(b.centroid, Point::new(20, 40));
        assert_eq!(b.aspect(), Some(0.5));

        assert!(MarkerBlob::from_outline(vec![]).is_none());
    }

    #[test]
    fn test_shape_filter() {
        let g = geom();
        let p = Params::default();

        // Max area is 320*240/20 = 3840
        assert!(MarkerBlob::from_outline(quad(10, 20, 20, 40)).unwrap().shape_ok(&g, &p));

        // Too wide, too thin, too small, too big
        assert!(!MarkerBlob::from_outline(quad(10, 20, 40, 40)).unwrap().shape_ok(&g, &p));
        assert!(!MarkerBlob::from_outline(quad(10, 20, 5, 40)).unwrap().shape_ok(&g, &p));
        assert!(!MarkerBlob::from_outline(quad(10, 20, 8, 20)).unwrap().shape_ok(&g, &p));
        assert!(!MarkerBlob::from_outline(quad(10, 20, 40, 100)).unwrap().shape_ok(&g, &p));

        // Aspect bounds are exclusive
        assert!(!MarkerBlob::from_outline(quad(10, 0, 32, 40)).unwrap().shape_ok(&g, &p));
    }

    #[test]
    fn test_position_filter() {
        let g = geom();

        // Low in the ROI on the left
        let left_low = MarkerBlob::from_outline(quad(40, 70, 20, 40)).unwrap();
        assert!(left_low.position_ok(MarkerClass::Left, &g, 0));
        assert!(!left_low.position_ok(MarkerClass::Right, &g, 0));

        // Beyond the nearest stop marker
        assert!(!left_low.position_ok(MarkerClass::Left, &g, 95));

        // In the upper band either side is allowed
        let left_high = MarkerBlob::from_outline(quad(40, 10, 20, 40)).unwrap();
        assert!(left_high.position_ok(MarkerClass::Right, &g, 0));
    }

    #[test]
    fn test_stop_position() {
        let g = geom();

        // Trapezoid with its widest side at the bottom
        let outline = vec![
            Point::new(110, 60),
            Point::new(130, 60),
            Point::new(140, 100),
            Point::new(100, 100)
        ];
        let b = MarkerBlob::from_outline(outline).unwrap();
        assert!(b.position_ok(MarkerClass::Stop, &g, 0));

        // Upside down it is not a stop marker
        let outline = vec![
            Point::new(100, 60),
            Point::new(140, 60),
            Point::new(130, 100),
            Point::new(110, 100)
        ];
        let b = MarkerBlob::from_outline(outline).unwrap();
        assert!(!b.position_ok(MarkerClass::Stop, &g, 0));
    }

    #[test]
    fn test_clean_mask_closes_gaps() {
        let mut mask = GrayImage::new(60, 60);
        draw_filled_rect_mut(&mut mask, Rect::at(10, 10).of_size(10, 30), Luma([255]));
        draw_filled_rect_mut(&mut mask, Rect::at(22, 10).of_size(10, 30), Luma([255]));

        let cleaned = clean_mask(&mask, 4);

        // The gap is filled, the outside is untouched
        assert_eq!(cleaned.get_pixel(21, 20).0, [255]);
        assert_eq!(cleaned.get_pixel(5, 20).0, [0]);
        assert_eq!(cleaned.get_pixel(15, 20).0, [255]);
    }

    #[test]
    fn test_extract_blobs() {
        let g = geom();
        let p = Params::default();

        let mut mask = GrayImage::new(320, 120);
        draw_filled_rect_mut(&mut mask, Rect::at(40, 45).of_size(20, 40), Luma([255]));

        let blobs = extract_blobs(&mask, MarkerClass::Left, &g, &p, 0);
        assert!(!blobs.is_empty());
        for b in &blobs {
            assert!(b.shape_ok(&g, &p));
            assert!((b.centroid.x - 50).abs() <= 3);
            assert!((b.centroid.y - 65).abs() <= 3);
        }

        // The same marker is not a right boundary
        assert!(extract_blobs(&mask, MarkerClass::Right, &g, &p, 0).is_empty());

        // An empty mask has no blobs
        assert!(extract_blobs(&GrayImage::new(320, 120), MarkerClass::Left, &g, &p, 0).is_empty());
    }
}

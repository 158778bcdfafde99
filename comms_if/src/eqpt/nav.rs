//! # Navigation Communications Module
//!
//! Data produced by perception: the navigation points for the controller and the obstacle box
//! from the external detector.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Near and far navigation points in vehicle-relative pixel coordinates.
///
/// `x` is the lateral axis, positive to the left of the image centreline. `y` is the forward
/// axis, positive further up the region of interest. All fields are zero when no centreline
/// could be found.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NearFarPoints {
    pub near_x: i32,
    pub near_y: i32,
    pub far_x: i32,
    pub far_y: i32,

    /// True when a stop line crossing is ahead
    pub reach_cross_road: bool
}

/// Bounding box of the nearest obstacle, in frame pixels.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstacleBox {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub image_width: i32,
    pub image_height: i32,

    /// Number of detected obstacles, zero means there is no obstacle
    pub count: i32
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl NearFarPoints {
    /// Returns true if this is the "no centreline" value.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl ObstacleBox {
    /// Returns true if the detector found at least one obstacle.
    pub fn is_present(&self) -> bool {
        self.count > 0
    }

    /// Area of the box in pixels.
    pub fn area(&self) -> f64 {
        self.w as f64 * self.h as f64
    }

    /// Area of the image the box was detected in.
    pub fn image_area(&self) -> f64 {
        self.image_width as f64 * self.image_height as f64
    }
}

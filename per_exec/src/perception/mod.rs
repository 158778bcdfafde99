//! Track boundary perception
//!
//! Turns a raw camera frame into the near and far navigation points used by
//! the controller. Processing for each frame is:
//!
//! 1. Select the region of interest (lower half) and convert it to HSV.
//! 2. Segment the left, right and stop markers into binary masks.
//! 3. Clean each mask, extract the marker blobs and filter them by shape and
//!    position.
//! 4. Reduce the accepted blobs to one ordered track per class.
//! 5. Detect a crossing from the stop track.
//! 6. Pair the boundary tracks into a centreline.
//! 7. Stabilise the near point and convert to vehicle coordinates.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod blob;
mod centerline;
mod crossing;
mod params;
pub mod roi;
pub mod segment;
mod stabiliser;
mod state;
mod track;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use blob::*;
pub use centerline::*;
pub use crossing::*;
pub use params::*;
pub use roi::FrameGeometry;
pub use stabiliser::*;
pub use state::*;
pub use track::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during perception processing.
#[derive(Debug, thiserror::Error)]
pub enum PerceptionError {
    #[error("Expected a {expected_w}x{expected_h} frame, found {found_w}x{found_h}")]
    FrameSizeMismatch {
        expected_w: i32,
        expected_h: i32,
        found_w: u32,
        found_h: u32
    },

    #[error("Could not load the perception parameters: {0}")]
    ParamsError(util::params::LoadError),

    #[error("Could not create the perception archive: {0}")]
    ArchiveError(util::archive::ArchiveError)
}

//! # Perception library.
//!
//! This library allows other crates in the workspace, the benchmarks and the integration tests to
//! access items defined inside the perception executable.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Debug images - annotated views of what perception found in a frame
pub mod debug_img;

/// Frame client - recieves frames from the camera source
pub mod frame_client;

/// Navigation server - publishes the navigation points found in each frame
pub mod nav_server;

/// Obstacle client - keeps the latest obstacle box from the detector
pub mod obstacle_client;

/// Perception module - turns frames into navigation points
pub mod perception;

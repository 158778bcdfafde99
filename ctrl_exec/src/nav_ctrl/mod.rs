//! # Navigation control module
//!
//! Turns the navigation points found by perception, and the obstacle box,
//! into steering and pedal requests. Each tick:
//!
//! 1. Blends the measured near point with the one predicted from the previous
//!    demands.
//! 2. Computes the desired heading from the near and far points.
//! 3. Gets the steering request from a PD controller on the heading's cross
//!    product.
//! 4. Sets the pedal position from the steering request and the obstacle.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod controllers;
mod params;
mod state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use controllers::*;
pub use params::*;
pub use state::*;

//! # Control library.
//!
//! This library allows other crates in the workspace, and the integration tests, to access items
//! defined inside the control executable.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Demands server - publishes steering and pedal requests to the vehicle
pub mod dems_server;

/// Navigation client - recieves navigation points and obstacle boxes
pub mod nav_client;

/// Navigation control module - turns navigation points into demands
pub mod nav_ctrl;

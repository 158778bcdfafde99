//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the software: the
//! messages exchanged between the perception and control executables, the
//! envelope they travel in, and the zmq networking used to move them.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Payload definitions for equipment (camera, navigation, drive)
pub mod eqpt;

/// Message envelope and codec
pub mod msg;

/// Network module
pub mod net;

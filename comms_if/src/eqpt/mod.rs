//! # Equipment Interface
//!
//! This module defines the interface structures which are exchanged between the camera source,
//! the perception executable, the control executable and the vehicle.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod cam;
pub mod drive;
pub mod nav;

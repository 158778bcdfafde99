//! # Drive Communications Module
//!
//! Demands sent by the controller to the vehicle.

use serde::{Deserialize, Serialize};

/// Steering demand. Positive turns the vehicle to the left.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundSteeringRequest {
    pub ground_steering: f32
}

/// Throttle demand, between 0 and 1.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PedalPositionRequest {
    pub position: f32
}

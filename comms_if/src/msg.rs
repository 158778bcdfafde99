//! # Message Envelope
//!
//! Every message exchanged on the bus is a JSON encoded `Envelope`. The envelope carries the
//! session id (`cid`) the sender belongs to and a `sender_stamp` which tells apart several
//! senders of the same payload type.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{serde::ts_milliseconds, DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::eqpt::{
    drive::{GroundSteeringRequest, PedalPositionRequest},
    nav::{NearFarPoints, ObstacleBox}
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Sender stamp of the obstacle detector whose boxes are used, others are ignored.
pub const OBSTACLE_SENDER_STAMP: u32 = 0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A message as it travels on the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Session id of the sender
    pub cid: u16,

    /// Identifies the sender among those publishing the same payload
    pub sender_stamp: u32,

    /// Time at which the message was sent
    #[serde(with = "ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    pub payload: Payload
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// All payloads which may be carried by an envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    NearFarPoints(NearFarPoints),
    ObstacleBox(ObstacleBox),
    GroundSteeringRequest(GroundSteeringRequest),
    PedalPositionRequest(PedalPositionRequest)
}

/// Errors which can occur while encoding or decoding an envelope.
#[derive(Debug, thiserror::Error)]
pub enum MsgError {
    #[error("Could not serialize the envelope: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not deserialize the envelope: {0}")]
    DeserializeError(serde_json::Error)
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Envelope {
    /// Wrap a payload in a new envelope stamped with the current time.
    pub fn new<P: Into<Payload>>(cid: u16, sender_stamp: u32, payload: P) -> Self {
        Self {
            cid,
            sender_stamp,
            timestamp: Utc::now(),
            payload: payload.into()
        }
    }

    /// Encode the envelope as a JSON string.
    pub fn to_json(&self) -> Result<String, MsgError> {
        serde_json::to_string(self).map_err(MsgError::SerializationError)
    }

    /// Decode an envelope from a JSON string.
    pub fn from_json(s: &str) -> Result<Self, MsgError> {
        serde_json::from_str(s).map_err(MsgError::DeserializeError)
    }

    /// Returns true if this envelope belongs to the session `cid`.
    pub fn is_from_session(&self, cid: u16) -> bool {
        self.cid == cid
    }

    /// Get the obstacle box carried by this envelope, if it is one and it was sent by the
    /// retained detector.
    pub fn obstacle_box(&self) -> Option<ObstacleBox> {
        match self.payload {
            Payload::ObstacleBox(b) if self.sender_stamp == OBSTACLE_SENDER_STAMP => Some(b),
            _ => None
        }
    }
}

impl From<NearFarPoints> for Payload {
    fn from(p: NearFarPoints) -> Self {
        Payload::NearFarPoints(p)
    }
}

impl From<ObstacleBox> for Payload {
    fn from(p: ObstacleBox) -> Self {
        Payload::ObstacleBox(p)
    }
}

impl From<GroundSteeringRequest> for Payload {
    fn from(p: GroundSteeringRequest) -> Self {
        Payload::GroundSteeringRequest(p)
    }
}

impl From<PedalPositionRequest> for Payload {
    fn from(p: PedalPositionRequest) -> Self {
        Payload::PedalPositionRequest(p)
    }
}

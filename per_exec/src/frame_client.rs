//! # Frame Client
//!
//! Receives the frames published by the camera source. The subscriber is conflated so only the
//! most recent frame is ever read.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::convert::TryFrom;

use comms_if::{
    eqpt::cam::{CamFrame, Frame, FrameError},
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions}
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Receive timeout of the client, the run flag is checked at least this often.
pub const FRAME_RECV_TIMEOUT_MS: i32 = 100;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The frame client
pub struct FrameClient {
    socket: MonitoredSocket
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum FrameClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not recieve a frame from the camera source: {0}")]
    RecvError(zmq::Error),

    #[error("The camera source sent a message which was not valid UTF-8")]
    NonUtf8Message,

    #[error("Could not deserialize the frame: {0}")]
    DeserializeError(serde_json::Error),

    #[error("Invalid frame: {0}")]
    FrameError(FrameError)
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl FrameClient {
    /// Create a new instance of the frame client.
    ///
    /// This function will not block until the camera source is up.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, FrameClientError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: FRAME_RECV_TIMEOUT_MS,
            conflate: true,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(
            ctx,
            zmq::SUB,
            socket_options,
            &params.frame_endpoint
        ).map_err(FrameClientError::SocketError)?;

        Ok(Self {
            socket
        })
    }

    /// Returns true if the camera source is connected.
    pub fn is_connected(&self) -> bool {
        self.socket.connected()
    }

    /// Receive the latest frame.
    ///
    /// Returns `None` if no frame arrived within the receive timeout.
    pub fn recv_frame(&mut self) -> Result<Option<Frame>, FrameClientError> {
        let msg = match self.socket.recv_string(0) {
            Ok(Ok(s)) => s,
            Ok(Err(_)) => return Err(FrameClientError::NonUtf8Message),
            Err(zmq::Error::EAGAIN) => return Ok(None),
            Err(e) => return Err(FrameClientError::RecvError(e))
        };

        let cam_frame: CamFrame = serde_json::from_str(&msg)
            .map_err(FrameClientError::DeserializeError)?;

        Frame::try_from(&cam_frame)
            .map(Some)
            .map_err(FrameClientError::FrameError)
    }
}

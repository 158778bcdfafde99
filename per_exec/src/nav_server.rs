//! # Navigation Server
//!
//! Publishes the navigation points found in each frame.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::nav::NearFarPoints,
    msg::{Envelope, MsgError},
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions}
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Navigation points server
pub struct NavServer {
    socket: MonitoredSocket,

    cid: u16,

    sender_stamp: u32
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum NavServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send the navigation points: {0}")]
    SendError(zmq::Error),

    #[error("Could not encode the navigation points: {0}")]
    MsgError(MsgError)
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl NavServer {
    /// Create a new instance of the navigation server.
    ///
    /// This function will not block until a subscriber connects.
    pub fn new(
        ctx: &zmq::Context,
        params: &NetParams,
        cid: u16,
        sender_stamp: u32
    ) -> Result<Self, NavServerError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            bind: true,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            send_timeout: 10,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(
            ctx,
            zmq::PUB,
            socket_options,
            &params.nav_endpoint
        ).map_err(NavServerError::SocketError)?;

        Ok(Self {
            socket,
            cid,
            sender_stamp
        })
    }

    /// Publish one set of navigation points.
    pub fn send(&mut self, points: &NearFarPoints) -> Result<(), NavServerError> {
        let msg = Envelope::new(self.cid, self.sender_stamp, *points)
            .to_json()
            .map_err(NavServerError::MsgError)?;

        self.socket.send(&msg, 0)
            .map_err(NavServerError::SendError)
    }
}

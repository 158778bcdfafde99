//! # Demands Server
//!
//! Publishes the steering and pedal requests to the vehicle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    msg::{Envelope, MsgError, Payload},
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions}
};

use crate::nav_ctrl::Demands;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demands server
pub struct DemsServer {
    socket: MonitoredSocket,

    cid: u16,

    sender_stamp: u32
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DemsServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send the demands: {0}")]
    SendError(zmq::Error),

    #[error("Could not encode the demands: {0}")]
    MsgError(MsgError)
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DemsServer {
    /// Create a new instance of the demands server.
    ///
    /// This function will not block until a subscriber connects.
    pub fn new(
        ctx: &zmq::Context,
        params: &NetParams,
        cid: u16,
        sender_stamp: u32
    ) -> Result<Self, DemsServerError> {
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
            &params.dems_endpoint
        ).map_err(DemsServerError::SocketError)?;

        Ok(Self {
            socket,
            cid,
            sender_stamp
        })
    }

    /// Publish the steering request then the pedal request, with the same timestamp.
    pub fn send(&mut self, dems: &Demands) -> Result<(), DemsServerError> {
        let steering = Envelope::new(self.cid, self.sender_stamp, dems.ground_steering);
        let pedal = Envelope {
            payload: Payload::from(dems.pedal_position),
            ..steering.clone()
        };

        for env in &[steering, pedal] {
            let msg = env.to_json().map_err(DemsServerError::MsgError)?;
            self.socket.send(&msg, 0).map_err(DemsServerError::SendError)?;
        }

        Ok(())
    }
}

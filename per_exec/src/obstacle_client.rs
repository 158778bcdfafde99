//! # Obstacle Client
//!
//! Keeps the latest obstacle box published by the retained detector. Boxes are received by a
//! background listener and read by the main loop whenever a frame is processed.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use std::{sync::{atomic::AtomicBool, Arc}, thread::JoinHandle};

use comms_if::{
    eqpt::nav::ObstacleBox,
    net::{spawn_listener, zmq, LatestValue, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions}
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The obstacle client
pub struct ObstacleClient {
    latest: LatestValue<ObstacleBox>,

    join_handle: Option<JoinHandle<()>>
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ObstacleClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError)
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ObstacleClient {
    /// Connect to the obstacle detector and start listening for boxes from session `cid`.
    ///
    /// The listener runs for as long as `run` is set.
    pub fn new(
        ctx: &zmq::Context,
        params: &NetParams,
        cid: u16,
        run: Arc<AtomicBool>
    ) -> Result<Self, ObstacleClientError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            linger: 1,
            recv_timeout: 100,
            conflate: true,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(
            ctx,
            zmq::SUB,
            socket_options,
            &params.obstacle_endpoint
        ).map_err(ObstacleClientError::SocketError)?;

        let latest = LatestValue::new();
        let latest_clone = latest.clone();

        let join_handle = spawn_listener("ObstacleClient", socket, cid, run, move |env| {
            if let Some(b) = env.obstacle_box() {
                trace!("Obstacle box: {:?}", b);
                latest_clone.set(b);
            }
        });

        Ok(Self {
            latest,
            join_handle: Some(join_handle)
        })
    }

    /// Get the last box received, which may be stale. `None` if nothing was received yet.
    pub fn latest(&self) -> Option<ObstacleBox> {
        self.latest.get()
    }
}

impl Drop for ObstacleClient {
    fn drop(&mut self) {
        // The listener exits once the run flag is cleared
        if let Some(jh) = self.join_handle.take() {
            jh.join().ok();
        }
    }
}

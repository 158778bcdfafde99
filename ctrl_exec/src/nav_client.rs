//! # Navigation Client
//!
//! Listens for the navigation points published by perception and the boxes published by the
//! obstacle detector. Each is kept in its own latest value cell which the control loop reads
//! once per tick.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use std::{sync::{atomic::AtomicBool, Arc}, thread::JoinHandle};

use comms_if::{
    eqpt::nav::{NearFarPoints, ObstacleBox},
    msg::Payload,
    net::{spawn_listener, zmq, LatestValue, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions}
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Receive timeout of the listeners, the run flag is checked at least this often.
const LISTENER_RECV_TIMEOUT_MS: i32 = 100;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The navigation client
pub struct NavClient {
    nav: LatestValue<NearFarPoints>,

    obstacle: LatestValue<ObstacleBox>,

    join_handles: Vec<JoinHandle<()>>
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum NavClientError {
    #[error("Socket error on the {0} subscriber: {1}")]
    SocketError(&'static str, MonitoredSocketError)
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl NavClient {
    /// Connect to perception and the obstacle detector, listening for messages from session
    /// `cid` for as long as `run` is set.
    ///
    /// This function will not block until the publishers are up.
    pub fn new(
        ctx: &zmq::Context,
        params: &NetParams,
        cid: u16,
        run: Arc<AtomicBool>
    ) -> Result<Self, NavClientError> {
        let nav = LatestValue::new();
        let obstacle = LatestValue::new();

        let nav_socket = subscriber(ctx, &params.nav_endpoint)
            .map_err(|e| NavClientError::SocketError("navigation", e))?;
        let obstacle_socket = subscriber(ctx, &params.obstacle_endpoint)
            .map_err(|e| NavClientError::SocketError("obstacle", e))?;

        let nav_clone = nav.clone();
        let nav_jh = spawn_listener("NavClient", nav_socket, cid, run.clone(), move |env| {
            if let Payload::NearFarPoints(p) = env.payload {
                trace!("Navigation points: {:?}", p);
                nav_clone.set(p);
            }
        });

        let obstacle_clone = obstacle.clone();
        let obstacle_jh = spawn_listener("ObstacleClient", obstacle_socket, cid, run, move |env| {
            if let Some(b) = env.obstacle_box() {
                trace!("Obstacle box: {:?}", b);
                obstacle_clone.set(b);
            }
        });

        Ok(Self {
            nav,
            obstacle,
            join_handles: vec![nav_jh, obstacle_jh]
        })
    }

    /// Latest navigation points, all zero until perception has published.
    pub fn nav(&self) -> NearFarPoints {
        self.nav.get().unwrap_or_default()
    }

    /// Latest obstacle box, `None` until the detector has published.
    pub fn obstacle(&self) -> Option<ObstacleBox> {
        self.obstacle.get()
    }
}

impl Drop for NavClient {
    fn drop(&mut self) {
        // Listeners exit once the run flag is cleared
        for jh in self.join_handles.drain(..) {
            jh.join().ok();
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn subscriber(ctx: &zmq::Context, endpoint: &str) -> Result<MonitoredSocket, MonitoredSocketError> {
    let socket_options = SocketOptions {
        block_on_first_connect: false,
        heartbeat_ivl: 500,
        heartbeat_ttl: 1000,
        heartbeat_timeout: 1000,
        linger: 1,
        recv_timeout: LISTENER_RECV_TIMEOUT_MS,
        conflate: true,
        ..Default::default()
    };

    MonitoredSocket::new(ctx, zmq::SUB, socket_options, endpoint)
}

//! # Envelope Listener
//!
//! Background thread receiving envelopes from a subscriber socket and handing those which belong
//! to the current session to a handler.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{error, trace, warn};
use std::{
    sync::{atomic::{AtomicBool, Ordering}, Arc},
    thread::{self, JoinHandle}
};

use super::{zmq, MonitoredSocket};
use crate::msg::Envelope;

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Spawn a thread which listens on `socket` for as long as `run` is set.
///
/// Envelopes which cannot be decoded, or which come from a session other than `cid`, are
/// skipped. If the socket fails for any reason other than a receive timeout the thread clears
/// `run`, which stops the whole executable, and exits.
///
/// The socket shall have a receive timeout set so that the run flag is checked regularly.
pub fn spawn_listener<F>(
    name: &'static str,
    socket: MonitoredSocket,
    cid: u16,
    run: Arc<AtomicBool>,
    mut handler: F
) -> JoinHandle<()>
where
    F: FnMut(Envelope) + Send + 'static
{
    thread::spawn(move || {
        while run.load(Ordering::Relaxed) {
            let msg = match socket.recv_string(0) {
                Ok(Ok(s)) => s,
                Ok(Err(_)) => {
                    warn!("{}: non UTF-8 message received", name);
                    continue
                },
                Err(zmq::Error::EAGAIN) => continue,
                Err(e) => {
                    error!("{}: error receiving message: {}", name, e);
                    run.store(false, Ordering::Relaxed);
                    break
                }
            };

            let envelope = match Envelope::from_json(&msg) {
                Ok(e) => e,
                Err(e) => {
                    warn!("{}: {}", name, e);
                    continue
                }
            };

            if !envelope.is_from_session(cid) {
                trace!("{}: dropping envelope from session {}", name, envelope.cid);
                continue
            }

            handler(envelope);
        }

        trace!("{}: listener stopped", name);
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        eqpt::nav::NearFarPoints,
        msg::Payload,
        net::{LatestValue, SocketOptions}
    };
    use std::time::Duration;

    #[test]
    fn test_listener_filters_sessions() {
        let ctx = zmq::Context::new();
        let endpoint = "inproc://listener_test";

        let publisher = MonitoredSocket::new(
            &ctx,
            zmq::PUB,
            SocketOptions {
                bind: true,
                block_on_first_connect: false,
                linger: 0,
                ..Default::default()
            },
            endpoint
        ).unwrap();

        let subscriber = MonitoredSocket::new(
            &ctx,
            zmq::SUB,
            SocketOptions {
                block_on_first_connect: false,
                linger: 0,
                recv_timeout: 10,
                ..Default::default()
            },
            endpoint
        ).unwrap();

        let run = Arc::new(AtomicBool::new(true));
        let latest = LatestValue::new();
        let latest_clone = latest.clone();

        let jh = spawn_listener("test", subscriber, 7, run.clone(), move |env| {
            if let Payload::NearFarPoints(p) = env.payload {
                latest_clone.set(p);
            }
        });

        let ours = NearFarPoints { near_x: 1, near_y: 2, far_x: 3, far_y: 4, reach_cross_road: false };
        let theirs = NearFarPoints { near_x: 9, ..ours };

        // Keep publishing until the subscription has propagated
        for _ in 0..100 {
            publisher.send(&Envelope::new(8, 0, theirs).to_json().unwrap(), 0).unwrap();
            publisher.send(&Envelope::new(7, 0, ours).to_json().unwrap(), 0).unwrap();
            publisher.send("garbage", 0).unwrap();

            if latest.get().is_some() {
                break
            }
            thread::sleep(Duration::from_millis(10));
        }

        run.store(false, Ordering::Relaxed);
        jh.join().unwrap();

        assert_eq!(latest.get(), Some(ours));
    }
}

//! Main perception executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logger, parameters and perception
//!     - Main loop, until the session stops running:
//!         - Wait for the next frame from the camera source
//!         - Snapshot the latest obstacle box
//!         - Run the perception pipeline
//!         - Publish the navigation points
//!         - In verbose mode, periodically write a debug image

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, trace, warn};
use structopt::StructOpt;

// Internal
use comms_if::net::NetParams;
use per_lib::{
    debug_img,
    frame_client::{FrameClient, FrameClientError},
    nav_server::NavServer,
    obstacle_client::ObstacleClient,
    perception::{FrameGeometry, InputData, Perception}
};
use util::{
    host,
    logger::{level_from_verbose, logger_init},
    archive::Archived,
    module::State,
    session::Session
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Sender stamp of the navigation points published by this exec.
const NAV_SENDER_STAMP: u32 = 0;

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Command line options
#[derive(Debug, StructOpt)]
#[structopt(name = "per_exec", about = "Track boundary perception")]
struct Opts {
    /// Session id, messages from other sessions are ignored
    #[structopt(long)]
    cid: u16,

    /// Frame width in pixels
    #[structopt(long)]
    width: u32,

    /// Frame height in pixels
    #[structopt(long)]
    height: u32,

    /// Log debug information and write debug images
    #[structopt(long)]
    verbose: bool
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    let session = Session::new("per_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    logger_init(level_from_verbose(opts.verbose), &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Kiwi Perception Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}", session.session_root);
    debug!("CLI options: {:?}\n", opts);

    // ---- LOAD PARAMETERS ----

    let net_params: NetParams = util::params::load("net.toml")
        .wrap_err("Could not load net params")?;

    // ---- INITIALISE MODULES ----

    let geom = FrameGeometry::new(opts.width, opts.height);
    if geom.width < 2 || geom.height < 4 {
        return Err(color_eyre::eyre::eyre!(
            "Frame size {}x{} is too small", opts.width, opts.height
        ));
    }

    let mut perception = Perception::new(geom);
    perception.init("per_exec.toml", &session)
        .wrap_err("Failed to initialise Perception")?;
    info!("Perception init complete");

    let debug_image_period = perception.params().debug_image_period.max(1) as u64;

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = comms_if::net::zmq::Context::new();

    let mut frame_client = FrameClient::new(&zmq_ctx, &net_params)
        .wrap_err("Failed to initialise FrameClient")?;
    info!("FrameClient initialised");

    let obstacle_client = ObstacleClient::new(
        &zmq_ctx,
        &net_params,
        opts.cid,
        session.run_flag()
    ).wrap_err("Failed to initialise ObstacleClient")?;
    info!("ObstacleClient initialised");

    let mut nav_server = NavServer::new(&zmq_ctx, &net_params, opts.cid, NAV_SENDER_STAMP)
        .wrap_err("Failed to initialise NavServer")?;
    info!("NavServer initialised");

    info!("Network initialisation complete");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut num_frames: u64 = 0;
    let mut camera_connected = false;

    while session.is_running() {

        // ---- DATA INPUT ----

        let frame = match frame_client.recv_frame() {
            Ok(Some(f)) => f,
            Ok(None) => {
                if camera_connected && !frame_client.is_connected() {
                    warn!("Camera source disconnected");
                }
                camera_connected = frame_client.is_connected();
                continue
            },
            Err(FrameClientError::RecvError(e)) => {
                session.stop();
                return Err(e).wrap_err("Frame subscriber failed")
            },
            Err(e) => {
                warn!("Dropping frame: {}", e);
                continue
            }
        };

        if let Some(age_s) = util::time::duration_to_seconds(
            chrono::Utc::now().signed_duration_since(frame.timestamp)
        ) {
            trace!("Frame is {:.3} s old", age_s);
        }

        let input = InputData {
            frame,
            obstacle: obstacle_client.latest()
        };

        // ---- PERCEPTION PROCESSING ----

        let detection = match perception.proc(&input) {
            Ok((d, r)) => {
                debug!("Perception status: {:?}", r);
                d
            },
            // Frames of the wrong size end up here, they produce no output
            Err(e) => {
                warn!("Error during Perception processing: {}", e);
                continue
            }
        };

        num_frames += 1;

        // ---- WRITE ARCHIVES ----

        if let Err(e) = perception.write() {
            warn!("Could not archive the Perception status report: {}", e);
        }

        // ---- OUTPUT ----

        if let Err(e) = nav_server.send(&detection.nav) {
            warn!("NavServer error: {}", e);
        }

        if opts.verbose {
            info!("{:?}", detection.nav);

            if num_frames % debug_image_period == 0 {
                let img = debug_img::render(&input.frame, &geom, &detection);
                match debug_img::save(&session, num_frames, &img) {
                    Ok(p) => debug!("Debug image written to {:?}", p),
                    Err(e) => warn!("{}", e)
                }
            }
        }
    }

    // ---- SHUTDOWN ----

    info!("Processed {} frames", num_frames);
    info!("End of execution");

    Ok(())
}

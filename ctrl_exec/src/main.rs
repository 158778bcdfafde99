//! Main control executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logger, parameters and navigation control
//!     - Start listening for navigation points and obstacle boxes
//!     - Wait for the startup grace period so the other executables are up
//!     - Main loop at the requested frequency, until the session stops running:
//!         - Snapshot the latest navigation points and obstacle box
//!         - Navigation control processing
//!         - Publish the demands

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::{eyre, WrapErr}, Report};
use log::{debug, info, warn};
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use comms_if::net::NetParams;
use ctrl_lib::{
    dems_server::DemsServer,
    nav_client::NavClient,
    nav_ctrl::{InputData, NavCtrl, ObstacleAction}
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

/// Sender stamp of the demands published by this exec.
const DEMS_SENDER_STAMP: u32 = 0;

/// Longest sleep while waiting out the grace period, so that a stop request is noticed.
const GRACE_POLL_PERIOD_S: f64 = 0.1;

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Command line options
#[derive(Debug, StructOpt)]
#[structopt(name = "ctrl_exec", about = "The control program for the kiwi car")]
struct Opts {
    /// Session id, messages from other sessions are ignored
    #[structopt(long)]
    cid: u16,

    /// Control frequency in Hz
    #[structopt(long)]
    freq: f64,

    /// Log the demands of every tick
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

    if !(opts.freq.is_finite() && opts.freq > 0.0) {
        return Err(eyre!("Expected a positive control frequency, found {}", opts.freq));
    }
    let cycle_period = Duration::from_secs_f64(1.0 / opts.freq);

    // ---- EARLY INITIALISATION ----

    let session = Session::new("ctrl_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    logger_init(level_from_verbose(opts.verbose), &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Kiwi Control Executable\n");
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

    let mut nav_ctrl = NavCtrl::default();
    nav_ctrl.init("ctrl_exec.toml", &session)
        .wrap_err("Failed to initialise NavCtrl")?;
    info!("NavCtrl init complete");

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = comms_if::net::zmq::Context::new();

    let nav_client = NavClient::new(&zmq_ctx, &net_params, opts.cid, session.run_flag())
        .wrap_err("Failed to initialise NavClient")?;
    info!("NavClient initialised");

    let mut dems_server = DemsServer::new(&zmq_ctx, &net_params, opts.cid, DEMS_SENDER_STAMP)
        .wrap_err("Failed to initialise DemsServer")?;
    info!("DemsServer initialised");

    info!("Network initialisation complete");

    // ---- STARTUP GRACE PERIOD ----

    let grace = Duration::from_secs_f64(nav_ctrl.params().startup_grace_s.max(0.0));
    info!("Waiting {:.1} s for the other executables", grace.as_secs_f64());

    let grace_start = Instant::now();
    while session.is_running() {
        match grace.checked_sub(grace_start.elapsed()) {
            Some(d) => thread::sleep(d.min(Duration::from_secs_f64(GRACE_POLL_PERIOD_S))),
            None => break
        }
    }

    // ---- MAIN LOOP ----

    info!("Begining main loop at {} Hz\n", opts.freq);

    let mut num_overruns: u64 = 0;

    while session.is_running() {

        let cycle_start_instant = Instant::now();

        // ---- DATA INPUT ----

        let input = InputData {
            nav: nav_client.nav(),
            obstacle: nav_client.obstacle()
        };

        // ---- CONTROL PROCESSING ----

        match nav_ctrl.proc(&input) {
            Ok((dems, report)) => {
                if report.obstacle_action == ObstacleAction::SpeedControl {
                    info!("Obstacle speed control activated");
                }
                debug!("NavCtrl status: {:?}", report);

                if opts.verbose {
                    info!(
                        "Ground steering is {} and pedal position is {}",
                        dems.ground_steering.ground_steering,
                        dems.pedal_position.position
                    );
                }

                // ---- WRITE ARCHIVES ----

                if let Err(e) = nav_ctrl.write() {
                    warn!("Could not archive the NavCtrl status report: {}", e);
                }

                // ---- OUTPUT ----

                if let Err(e) = dems_server.send(&dems) {
                    warn!("DemsServer error: {}", e);
                }
            },
            // No demands are sent this cycle, the period is still respected
            Err(e) => warn!("Error during NavCtrl processing: {}", e)
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => {
                num_overruns += 1;
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                );
            }
        }
    }

    // ---- SHUTDOWN ----

    info!("{} cycle overruns", num_overruns);
    info!("End of execution");

    Ok(())
}

//! Navigation control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use super::*;
use comms_if::eqpt::{
    drive::{GroundSteeringRequest, PedalPositionRequest},
    nav::{NearFarPoints, ObstacleBox}
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::Session
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Navigation control module state
pub struct NavCtrl {
    params: Params,

    state: ControlState,

    steering_ctrl: SteeringController,

    report: StatusReport,

    arch_report: Option<Archiver>
}

/// Values carried from one tick to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ControlState {
    /// Blended near point of the previous tick
    pub prev_near_x: i32,
    pub prev_near_y: i32,

    pub prev_steering: f64,
    pub prev_pedal: f64
}

/// Input data to navigation control, a snapshot of the latest messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputData {
    pub nav: NearFarPoints,

    /// Latest obstacle box, `None` if none has been received yet
    pub obstacle: Option<ObstacleBox>
}

/// Demands produced by one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Demands {
    pub ground_steering: GroundSteeringRequest,
    pub pedal_position: PedalPositionRequest
}

/// Status report for navigation control processing.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    pub tick: u64,

    pub near_x: i32,
    pub near_y: i32,
    pub far_x: i32,
    pub far_y: i32,
    pub reach_cross_road: bool,

    pub desired_x: f64,
    pub desired_y: f64,
    pub cross: f64,
    pub dot: f64,

    pub steering: f64,
    pub pedal: f64,

    pub obstacle_action: ObstacleAction
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Potential errors that can occur during processing of the module.
#[derive(Debug, thiserror::Error)]
pub enum NavCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(params::LoadError),

    #[error("Could not create the archive: {0}")]
    ArchiveError(ArchiveError)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl NavCtrl {
    /// Create a new instance with the given parameters and no archiving.
    pub fn new(params: Params) -> Self {
        Self {
            steering_ctrl: SteeringController::new(&params),
            params,
            state: ControlState::default(),
            report: StatusReport::default(),
            arch_report: None
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// State carried over to the next tick.
    pub fn state(&self) -> &ControlState {
        &self.state
    }

    /// Run one control tick.
    pub fn tick(&mut self, input: &InputData) -> (Demands, StatusReport) {
        let params = &self.params;
        let nav = &input.nav;

        // ---- NEAR POINT PREDICTION ----

        let predicted = predict_near(
            Vector2::new(self.state.prev_near_x, self.state.prev_near_y),
            self.state.prev_steering,
            self.state.prev_pedal,
            params
        );
        let measured_near = Vector2::new(nav.near_x, nav.near_y);
        let near = blend_near(measured_near, predicted, params);
        let far = Vector2::new(nav.far_x, nav.far_y);

        trace!("Near point predicted {:?}, blended {:?}", predicted, near);

        // ---- STEERING ----

        let heading = Heading::from_points(near, far, params);
        // Whether there is a target at all is decided on what perception saw,
        // the prediction alone never steers
        let steering = self.steering_ctrl.get(&heading, measured_near, far);

        // ---- PEDAL ----

        let mut pedal = base_pedal(steering, params);
        let mut obstacle_action = ObstacleAction::None;

        if let Some(ref obstacle) = input.obstacle {
            let (p, a) = obstacle_pedal(
                pedal, heading.cross, nav.reach_cross_road, obstacle, params
            );
            pedal = p;
            obstacle_action = a;
        }

        if obstacle_action == ObstacleAction::SpeedControl {
            debug!("Obstacle speed control activated, pedal {:.3}", pedal);
        }

        // ---- STATE UPDATE ----

        self.state = ControlState {
            prev_near_x: near.x,
            prev_near_y: near.y,
            prev_steering: steering,
            prev_pedal: pedal
        };

        let report = StatusReport {
            tick: self.report.tick + 1,
            near_x: near.x,
            near_y: near.y,
            far_x: far.x,
            far_y: far.y,
            reach_cross_road: nav.reach_cross_road,
            desired_x: heading.desired_x,
            desired_y: heading.desired_y,
            cross: heading.cross,
            dot: heading.dot,
            steering,
            pedal,
            obstacle_action
        };
        self.report = report;

        let dems = Demands {
            ground_steering: GroundSteeringRequest { ground_steering: steering as f32 },
            pedal_position: PedalPositionRequest { position: pedal as f32 }
        };

        (dems, report)
    }
}

impl Default for NavCtrl {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

impl State for NavCtrl {
    type InitData = &'static str;
    type InitError = NavCtrlError;

    type InputData = InputData;
    type OutputData = Demands;
    type StatusReport = StatusReport;
    type ProcError = NavCtrlError;

    /// Initialise the NavCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        let params = params::load(init_data)
            .map_err(NavCtrlError::ParamLoadError)?;
        *self = Self::new(params);

        self.arch_report = Some(
            Archiver::from_path(session, "ctrl/status_report.csv")
                .map_err(NavCtrlError::ArchiveError)?
        );

        Ok(())
    }

    /// Perform one control tick.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let (dems, report) = self.tick(input_data);

        Ok((dems, report))
    }
}

impl Archived for NavCtrl {
    /// Write the status report of the last tick to the archive, if archiving
    /// was set up by `init`.
    fn write(&mut self) -> Result<(), ArchiveError> {
        match self.arch_report {
            Some(ref mut arch) => arch.serialise(self.report),
            None => Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_state_carried() {
        let mut ctrl = NavCtrl::default();
        let input = InputData {
            nav: NearFarPoints { near_x: 80, near_y: 40, far_x: 80, far_y: 40, reach_cross_road: false },
            obstacle: None
        };

        let (dems, report) = ctrl.tick(&input);

        assert_eq!((report.near_x, report.near_y), (52, 26));
        assert_eq!(ctrl.state().prev_near_x, 52);
        assert_eq!(ctrl.state().prev_steering as f32, dems.ground_steering.ground_steering);
        assert_eq!(ctrl.state().prev_pedal as f32, dems.pedal_position.position);
        assert_eq!(report.tick, 1);

        let (_, report) = ctrl.tick(&input);
        assert_eq!(report.tick, 2);
    }
}

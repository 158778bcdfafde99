//! Implementations for the Perception state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use comms_if::eqpt::{cam::Frame, nav::{NearFarPoints, ObstacleBox}};
use imageproc::{point::Point, rect::Rect};
use log::trace;
use serde::Serialize;
use std::time::Instant;

// Internal
use super::{
    detect_crossing, extract_blobs, pair_tracks,
    roi::{self, FrameGeometry},
    segment::{self, obstacle_zone},
    Centerline, Crossing, MarkerBlob, MarkerClass, MarkerTrack, NavStabiliser, Params,
    PerceptionError
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

/// Perception module state
pub struct Perception {
    params: Params,
    geom: FrameGeometry,
    stabiliser: NavStabiliser,

    num_frames: u64,

    report: StatusReport,
    arch_report: Option<Archiver>
}

/// Input data to perception.
#[derive(Debug, Clone)]
pub struct InputData {
    /// The frame to process
    pub frame: Frame,

    /// Latest obstacle box, if one has been received
    pub obstacle: Option<ObstacleBox>
}

/// Everything found in one frame.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Navigation points to be published
    pub nav: NearFarPoints,

    /// Accepted blobs of every class
    pub blobs: Vec<(MarkerClass, MarkerBlob)>,

    pub left: MarkerTrack,
    pub right: MarkerTrack,
    pub stop: MarkerTrack,

    pub crossing: Crossing,
    pub centerline: Centerline,

    /// Damped near point in ROI pixels
    pub near_px: Option<Point<i32>>,

    /// Part of the ROI hidden by the obstacle
    pub obstacle_zone: Option<Rect>
}

/// Status report for perception processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    pub frame_num: u64,
    pub proc_time_s: f64,

    pub left_sat_lower: u8,
    pub right_sat_lower: u8,
    pub obstacle_masked: bool,

    pub num_left_blobs: usize,
    pub num_right_blobs: usize,
    pub num_stop_blobs: usize,

    pub left_track_len: usize,
    pub right_track_len: usize,
    pub stop_track_len: usize,

    pub crossing_found: bool,
    pub reach_cross_road: bool,
    pub near_damped: bool,
    pub no_centerline: bool
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Perception {
    /// Create a new perception module for frames of the given geometry, with
    /// default parameters and no archiving.
    pub fn new(geom: FrameGeometry) -> Self {
        Self::with_params(geom, Params::default())
    }

    /// Create a new perception module with the given parameters.
    pub fn with_params(geom: FrameGeometry, params: Params) -> Self {
        Self {
            stabiliser: NavStabiliser::new(geom, &params),
            params,
            geom,
            num_frames: 0,
            report: StatusReport::default(),
            arch_report: None
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn geom(&self) -> &FrameGeometry {
        &self.geom
    }

    /// Status report of the last processed frame.
    pub fn report(&self) -> &StatusReport {
        &self.report
    }

    /// Run the detection pipeline on one frame.
    pub fn detect(
        &mut self,
        frame: &Frame,
        obstacle: Option<&ObstacleBox>
    ) -> Result<(Detection, StatusReport), PerceptionError> {
        if !self.geom.matches(frame) {
            return Err(PerceptionError::FrameSizeMismatch {
                expected_w: self.geom.width,
                expected_h: self.geom.height,
                found_w: frame.width(),
                found_h: frame.height()
            })
        }

        let start = Instant::now();
        let geom = &self.geom;
        let params = &self.params;

        let mut hsv = roi::extract_hsv_roi(frame, geom);
        let (masks, seg_report) = segment::segment(&mut hsv, obstacle, geom, params);

        // The stop track bounds how far the boundary markers are searched
        let stop_blobs = extract_blobs(&masks.stop, MarkerClass::Stop, geom, params, 0);
        let stop = MarkerTrack::from_blobs(MarkerClass::Stop, &stop_blobs, params.merge_dist_px);
        let max_stop_y = stop.first().map(|p| p.y).unwrap_or(0);

        let left_blobs = extract_blobs(&masks.left, MarkerClass::Left, geom, params, max_stop_y);
        let left = MarkerTrack::from_blobs(MarkerClass::Left, &left_blobs, params.merge_dist_px);

        let right_blobs = extract_blobs(&masks.right, MarkerClass::Right, geom, params, max_stop_y);
        let right = MarkerTrack::from_blobs(MarkerClass::Right, &right_blobs, params.merge_dist_px);

        let crossing = detect_crossing(&stop, geom, params);
        let centerline = pair_tracks(&left, &right, crossing.point(), geom, params);
        let stabilised = self.stabiliser.update(&centerline, crossing.reach);

        self.num_frames += 1;

        let report = StatusReport {
            frame_num: self.num_frames,
            proc_time_s: start.elapsed().as_secs_f64(),
            left_sat_lower: seg_report.left_sat_lower,
            right_sat_lower: seg_report.right_sat_lower,
            obstacle_masked: seg_report.obstacle_masked,
            num_left_blobs: left_blobs.len(),
            num_right_blobs: right_blobs.len(),
            num_stop_blobs: stop_blobs.len(),
            left_track_len: left.len(),
            right_track_len: right.len(),
            stop_track_len: stop.len(),
            crossing_found: crossing.pair.is_some(),
            reach_cross_road: stabilised.nav.reach_cross_road,
            near_damped: stabilised.damped,
            no_centerline: centerline.is_empty()
        };

        trace!("Perception: {:?}", stabilised.nav);

        let blobs = stop_blobs.into_iter().map(|b| (MarkerClass::Stop, b))
            .chain(left_blobs.into_iter().map(|b| (MarkerClass::Left, b)))
            .chain(right_blobs.into_iter().map(|b| (MarkerClass::Right, b)))
            .collect();

        let detection = Detection {
            nav: stabilised.nav,
            blobs,
            left,
            right,
            stop,
            crossing,
            centerline,
            near_px: stabilised.near_px,
            obstacle_zone: obstacle.and_then(|b| obstacle_zone(b, geom, params))
        };

        Ok((detection, report))
    }
}

impl State for Perception {
    type InitData = &'static str;
    type InitError = PerceptionError;

    type InputData = InputData;
    type OutputData = Detection;
    type StatusReport = StatusReport;
    type ProcError = PerceptionError;

    /// Initialise the Perception module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        self.params = params::load(init_data)
            .map_err(PerceptionError::ParamsError)?;
        self.stabiliser = NavStabiliser::new(self.geom, &self.params);

        self.arch_report = Some(
            Archiver::from_path(session, "per/status_report.csv")
                .map_err(PerceptionError::ArchiveError)?
        );

        Ok(())
    }

    /// Perform cyclic processing of Perception.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let (detection, report) = self.detect(&input_data.frame, input_data.obstacle.as_ref())?;
        self.report = report;

        Ok((detection, report))
    }
}

impl Archived for Perception {
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
    use chrono::Utc;

    #[test]
    fn test_blank_frame() {
        let geom = FrameGeometry::new(320, 240);
        let mut per = Perception::new(geom);
        let frame = Frame::filled(Utc::now(), 320, 240, [60, 60, 60, 255]).unwrap();

        let (det, report) = per.detect(&frame, None).unwrap();

        assert!(det.nav.is_empty());
        assert!(det.blobs.is_empty());
        assert!(report.no_centerline);
        assert_eq!(report.frame_num, 1);
    }

    #[test]
    fn test_wrong_frame_size() {
        let mut per = Perception::new(FrameGeometry::new(320, 240));
        let frame = Frame::filled(Utc::now(), 640, 480, [0, 0, 0, 255]).unwrap();

        let input = InputData { frame, obstacle: None };
        match per.proc(&input) {
            Err(PerceptionError::FrameSizeMismatch { found_w: 640, found_h: 480, .. }) => (),
            r => panic!("Expected a frame size error, got {:?}", r.map(|(_, r)| r))
        }
    }
}

//! # Navigation controllers
//!
//! Motion prediction of the near point, the heading and steering controller,
//! and the pedal position logic.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Vector2, Vector3};
use serde::Serialize;

// Internal
use comms_if::eqpt::nav::ObstacleBox;
use util::maths::{lin_map, sign_pos_zero};

use super::Params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Direction the vehicle should head in, relative to its forward axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Heading {
    /// Desired heading vector before normalisation
    pub desired_x: f64,
    pub desired_y: f64,

    /// Z of the unit heading crossed with the forward axis. Positive when the
    /// target is to the left.
    pub cross: f64,

    /// Projection of the unit heading on the forward axis. Negative when the
    /// target is behind.
    pub dot: f64
}

/// Proportional-derivative steering controller acting on the cross product.
#[derive(Debug, Clone, Serialize)]
pub struct SteeringController {
    k_p: f64,

    k_d: f64,

    /// Cross product of the previous tick
    prev_cross: f64
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// What the obstacle logic did to the pedal position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ObstacleAction {
    /// No obstacle, or one which doesn't affect the pedal
    None,

    /// Slowing down behind an obstacle
    SpeedControl,

    /// Pedal limited while approaching a crossing
    CrossingLimit,

    /// Stopped at a crossing to give way
    CrossingStop
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ObstacleAction {
    fn default() -> Self {
        ObstacleAction::None
    }
}

impl Heading {
    /// Compute the heading from the near and far points.
    ///
    /// The desired vector is `(far + 2 * near) / 2`, weighting the near point
    /// more heavily.
    pub fn from_points(near: Vector2<i32>, far: Vector2<i32>, params: &Params) -> Self {
        let desired = (far + near * 2) / 2;
        let desired = Vector2::new(desired.x as f64, desired.y as f64);

        let mut length = desired.norm();
        if length < params.min_heading_length {
            length = 1.0;
        }
        let unit = desired / length;

        let forward = Vector3::new(0.0, 1.0, 0.0);
        let cross = Vector3::new(unit.x, unit.y, 0.0).cross(&forward);

        Self {
            desired_x: desired.x,
            desired_y: desired.y,
            cross: cross[2],
            dot: unit.dot(&Vector2::new(0.0, 1.0))
        }
    }
}

impl SteeringController {
    pub fn new(params: &Params) -> Self {
        Self {
            k_p: params.k_p,
            k_d: params.k_d,
            prev_cross: 0.0
        }
    }

    /// Cross product remembered from the last call to `get`.
    pub fn prev_cross(&self) -> f64 {
        self.prev_cross
    }

    /// Get the steering request for this tick.
    ///
    /// `near` and `far` are the points as measured by perception. If neither
    /// has a lateral offset there is nothing to steer towards. When the
    /// target is behind the vehicle a full proportional turn is made towards
    /// its side.
    pub fn get(&mut self, heading: &Heading, near: Vector2<i32>, far: Vector2<i32>) -> f64 {
        let deriv = heading.cross - self.prev_cross;

        let steering = if near.x == 0 && far.x == 0 {
            0.0
        }
        else if heading.dot < 0.0 {
            self.k_p * sign_pos_zero(heading.cross) + self.k_d * deriv
        }
        else {
            self.k_p * heading.cross + self.k_d * deriv
        };

        self.prev_cross = heading.cross;

        steering
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Predict where the near point is now given where it was and the previous
/// demands.
///
/// The vehicle is assumed to have moved `k_s * pedal` along the direction
/// `k_a * steering`, so the point moves the opposite way.
pub fn predict_near(
    prev_near: Vector2<i32>,
    prev_steering: f64,
    prev_pedal: f64,
    params: &Params
) -> Vector2<i32> {
    let length = params.k_s * prev_pedal;
    let angle = params.k_a * prev_steering;

    Vector2::new(
        prev_near.x - (length * angle.sin()) as i32,
        prev_near.y - (length * angle.cos()) as i32
    )
}

/// Blend the measured near point with the predicted one.
pub fn blend_near(measured: Vector2<i32>, predicted: Vector2<i32>, params: &Params) -> Vector2<i32> {
    let g = params.blend_gain;

    Vector2::new(
        (g * measured.x as f64 + (1.0 - g) * predicted.x as f64) as i32,
        (g * measured.y as f64 + (1.0 - g) * predicted.y as f64) as i32
    )
}

/// Pedal position before the obstacle logic, slower in tight turns.
pub fn base_pedal(steering: f64, params: &Params) -> f64 {
    params.base_pedal * (1.0 - steering.abs())
}

/// Apply the obstacle and crossing rules to the pedal position.
///
/// Boxes with no obstacle in them leave the pedal untouched. Rules are
/// applied in order, the last one to fire is returned as the action.
pub fn obstacle_pedal(
    pedal: f64,
    cross: f64,
    reach_cross_road: bool,
    obstacle: &ObstacleBox,
    params: &Params
) -> (f64, ObstacleAction) {
    if !obstacle.is_present() {
        return (pedal, ObstacleAction::None)
    }

    let mut pedal = pedal;
    let mut action = ObstacleAction::None;

    let box_area = obstacle.area();
    let img_area = obstacle.image_area();

    // Slow down behind the obstacle, the bigger it is the slower
    if box_area > img_area / params.obstacle_min_area_div
        && cross.abs() < params.obstacle_max_cross
    {
        pedal = lin_map(
            (0.0, img_area / params.obstacle_max_area_div),
            (params.obstacle_pedal, 0.0),
            box_area
        );
        action = ObstacleAction::SpeedControl;
    }

    if reach_cross_road && pedal > params.crossing_max_pedal {
        pedal = params.crossing_max_pedal;
        action = ObstacleAction::CrossingLimit;
    }

    // Give way to an obstacle crossing in front, unless the box touches the
    // bottom of the image
    let box_right = obstacle.x as i64 + obstacle.w as i64;
    if obstacle.y != obstacle.image_height - 1
        && reach_cross_road
        && box_right > (obstacle.image_width / 2 - 1) as i64
        && box_area > img_area / params.crossing_stop_area_div
    {
        pedal = 0.0;
        action = ObstacleAction::CrossingStop;
    }

    (pedal, action)
}

#[cfg(test)]
mod test {
    use super::*;

    fn v(x: i32, y: i32) -> Vector2<i32> {
        Vector2::new(x, y)
    }

    #[test]
    fn test_heading() {
        let p = Params::default();

        // Straight ahead
        let h = Heading::from_points(v(0, 40), v(0, 80), &p);
        assert_eq!((h.desired_x, h.desired_y), (0.0, 80.0));
        assert!(h.cross.abs() < 1e-9);
        assert!((h.dot - 1.0).abs() < 1e-9);

        // Integer division on the sum
        let h = Heading::from_points(v(1, 0), v(1, 0), &p);
        assert_eq!(h.desired_x, 1.0);

        // Off to the left and behind
        let h = Heading::from_points(v(30, -40), v(30, -40), &p);
        assert!((h.cross - 0.6).abs() < 1e-9);
        assert!((h.dot + 0.8).abs() < 1e-9);

        // A zero heading doesn't produce NaNs
        let h = Heading::from_points(v(0, 0), v(0, 0), &p);
        assert_eq!((h.cross, h.dot), (0.0, 0.0));
    }

    #[test]
    fn test_steering() {
        let p = Params::default();
        let mut ctrl = SteeringController::new(&p);

        // Target to the left ahead
        let h = Heading { cross: 0.6, dot: 0.8, ..Default::default() };
        let s = ctrl.get(&h, v(30, 40), v(30, 40));
        assert!((s - (0.2 * 0.6 + 0.05 * 0.6)).abs() < 1e-9);
        assert_eq!(ctrl.prev_cross(), 0.6);

        // Same target again, the derivative term is gone
        let s = ctrl.get(&h, v(30, 40), v(30, 40));
        assert!((s - 0.12).abs() < 1e-9);

        // Target behind on the right gets a full turn
        let h = Heading { cross: -0.1, dot: -0.99, ..Default::default() };
        let s = ctrl.get(&h, v(-5, -50), v(-5, -50));
        assert!((s - (-0.2 + 0.05 * -0.7)).abs() < 1e-9);

        // No lateral offset means no steering, the cross is still kept
        let h = Heading { cross: 0.0, dot: -1.0, ..Default::default() };
        assert_eq!(ctrl.get(&h, v(0, -50), v(0, -50)), 0.0);
        assert_eq!(ctrl.prev_cross(), 0.0);
    }

    #[test]
    fn test_prediction() {
        let p = Params::default();

        // Stationary
        assert_eq!(predict_near(v(10, 20), 0.3, 0.0, &p), v(10, 20));

        // Straight at 0.1 pedal moves 60 px
        assert_eq!(predict_near(v(10, 20), 0.0, 0.1, &p), v(10, -40));

        // Blend truncates toward zero
        assert_eq!(blend_near(v(80, 40), v(0, 0), &p), v(52, 26));
        assert_eq!(blend_near(v(0, 0), v(0, -60), &p), v(0, -21));
    }

    #[test]
    fn test_base_pedal() {
        let p = Params::default();

        assert!((base_pedal(0.0, &p) - 0.1).abs() < 1e-9);
        assert!((base_pedal(-0.5, &p) - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_obstacle_pedal() {
        let p = Params::default();
        let bx = ObstacleBox {
            x: 100, y: 100, w: 64, h: 48, image_width: 640, image_height: 480, count: 1
        };

        // No obstacle
        let none = ObstacleBox { count: 0, ..bx };
        assert_eq!(obstacle_pedal(0.1, 0.0, true, &none, &p), (0.1, ObstacleAction::None));

        // Box covers 1% of the image, speed control needs more
        assert_eq!(obstacle_pedal(0.1, 0.0, false, &bx, &p), (0.1, ObstacleAction::None));

        // 4% of the image gives 0.2 * (1 - 0.4)
        let big = ObstacleBox { w: 128, h: 96, ..bx };
        let (pedal, action) = obstacle_pedal(0.1, 0.0, false, &big, &p);
        assert!((pedal - 0.12).abs() < 1e-9);
        assert_eq!(action, ObstacleAction::SpeedControl);

        // Not on a straight
        assert_eq!(obstacle_pedal(0.1, 0.3, false, &big, &p), (0.1, ObstacleAction::None));

        // Approaching a crossing
        assert_eq!(
            obstacle_pedal(0.1, 0.3, true, &big, &p),
            (0.04, ObstacleAction::CrossingLimit)
        );

        // Large box on the right at a crossing
        let right = ObstacleBox { x: 300, w: 160, h: 120, ..bx };
        assert_eq!(
            obstacle_pedal(0.1, 0.3, true, &right, &p),
            (0.0, ObstacleAction::CrossingStop)
        );

        // Unless it touches the bottom of the image
        let bottom = ObstacleBox { y: 479, ..right };
        assert_eq!(
            obstacle_pedal(0.1, 0.3, true, &bottom, &p),
            (0.04, ObstacleAction::CrossingLimit)
        );
    }
}

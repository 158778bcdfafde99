//! Control loop behaviour across several ticks

use comms_if::eqpt::nav::{NearFarPoints, ObstacleBox};
use ctrl_lib::nav_ctrl::{base_pedal, InputData, NavCtrl, ObstacleAction, Params};

fn points(near: (i32, i32), far: (i32, i32), reach_cross_road: bool) -> NearFarPoints {
    NearFarPoints {
        near_x: near.0,
        near_y: near.1,
        far_x: far.0,
        far_y: far.1,
        reach_cross_road
    }
}

fn input(nav: NearFarPoints, obstacle: Option<ObstacleBox>) -> InputData {
    InputData { nav, obstacle }
}

#[test]
fn test_no_target() {
    let mut ctrl = NavCtrl::new(Params::default());

    for _ in 0..5 {
        let (dems, report) = ctrl.tick(&input(NearFarPoints::default(), None));

        assert_eq!(dems.ground_steering.ground_steering, 0.0);
        assert!((dems.pedal_position.position - 0.1).abs() < 1e-6);

        // Prediction only moves the near point along the forward axis
        assert_eq!(report.near_x, 0);
        assert!(report.near_y <= 0);
    }
}

#[test]
fn test_target_lost_mid_turn() {
    let params = Params::default();
    let mut ctrl = NavCtrl::new(params.clone());

    // Turn towards a target on the left
    for _ in 0..8 {
        let (dems, _) = ctrl.tick(&input(points((60, 40), (60, 80), false), None));
        assert!(dems.ground_steering.ground_steering > 0.0);
    }

    // Markers lost, the vehicle holds straight at the no target speed
    for _ in 0..10 {
        let (dems, _) = ctrl.tick(&input(NearFarPoints::default(), None));

        assert_eq!(dems.ground_steering.ground_steering, 0.0);
        assert!(
            (dems.pedal_position.position as f64 - base_pedal(0.0, &params)).abs() < 1e-6
        );
    }
}

#[test]
fn test_steering_sign() {
    // Target to the left
    let mut ctrl = NavCtrl::default();
    let nav = points((80, 40), (80, 40), false);
    for _ in 0..5 {
        let (dems, _) = ctrl.tick(&input(nav, None));
        assert!(dems.ground_steering.ground_steering > 0.0);
        assert!(dems.pedal_position.position < 0.1);
    }

    // Target to the right
    let mut ctrl = NavCtrl::default();
    let nav = points((-80, 40), (-80, 40), false);
    for _ in 0..5 {
        let (dems, _) = ctrl.tick(&input(nav, None));
        assert!(dems.ground_steering.ground_steering < 0.0);
    }
}

#[test]
fn test_target_behind_centreline() {
    let mut ctrl = NavCtrl::default();
    let nav = points((0, -50), (0, -50), false);

    for _ in 0..5 {
        let (dems, report) = ctrl.tick(&input(nav, None));
        assert!(dems.ground_steering.ground_steering.abs() < 1e-6);
        assert!(report.dot <= 0.0);
    }
}

#[test]
fn test_steering_bounded() {
    // Target jumping from side to side never makes the steering diverge
    let mut ctrl = NavCtrl::default();

    for i in 0..50 {
        let x = if i % 2 == 0 { 100 } else { -100 };
        let (dems, _) = ctrl.tick(&input(points((x, 30), (x, 60), false), None));

        assert!(dems.ground_steering.ground_steering.abs() <= 0.2 + 0.05 * 2.0 + 1e-6);
        assert!(dems.pedal_position.position >= 0.0);
    }
}

#[test]
fn test_obstacle_slows_down() {
    let mut ctrl = NavCtrl::default();
    let nav = points((0, 40), (0, 80), false);

    // 4% of the image, straight ahead
    let obstacle = ObstacleBox {
        x: 256, y: 300, w: 128, h: 96, image_width: 640, image_height: 480, count: 1
    };

    let (dems, report) = ctrl.tick(&input(nav, Some(obstacle)));
    assert_eq!(report.obstacle_action, ObstacleAction::SpeedControl);
    assert!((dems.pedal_position.position - 0.12).abs() < 1e-6);

    // A box with no obstacle is ignored
    let (dems, report) = ctrl.tick(&input(nav, Some(ObstacleBox { count: 0, ..obstacle })));
    assert_eq!(report.obstacle_action, ObstacleAction::None);
    assert!((dems.pedal_position.position - 0.1).abs() < 1e-6);
}

#[test]
fn test_stop_at_crossing() {
    let mut ctrl = NavCtrl::default();
    let nav = points((0, 40), (0, 80), true);

    // Large obstacle reaching the right half of the image
    let obstacle = ObstacleBox {
        x: 300, y: 200, w: 160, h: 120, image_width: 640, image_height: 480, count: 1
    };

    let (dems, report) = ctrl.tick(&input(nav, Some(obstacle)));
    assert_eq!(report.obstacle_action, ObstacleAction::CrossingStop);
    assert_eq!(dems.pedal_position.position, 0.0);

    // Once stopped the prediction no longer moves the near point
    let near_y = report.near_y;
    let (_, report) = ctrl.tick(&input(nav, Some(obstacle)));
    assert_eq!(report.near_y, (0.65 * 40.0 + 0.35 * near_y as f64) as i32);

    // A small obstacle only limits the speed
    let small = ObstacleBox { x: 10, w: 20, h: 20, ..obstacle };
    let (dems, report) = ctrl.tick(&input(nav, Some(small)));
    assert_eq!(report.obstacle_action, ObstacleAction::CrossingLimit);
    assert!((dems.pedal_position.position - 0.04).abs() < 1e-6);
}

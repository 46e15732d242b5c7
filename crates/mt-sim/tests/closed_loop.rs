//! Closed-loop step responses of the reference motor.

use mt_controls::{
    DerivativeFilter, MotorConstants, PidGains, PlantParameters, build_controller, build_plant,
};
use mt_sim::{SimOptions, evaluate_step_response};

fn plant(include_inductance: bool) -> PlantParameters {
    PlantParameters::new(MotorConstants::default(), 0.01, 0.1, include_inductance)
}

#[test]
fn p_control_leaves_analytic_dc_error() {
    let g = build_plant(&plant(true)).unwrap();
    let kp = 10.0;
    let c = build_controller(&PidGains::new(kp, 0.0, 0.0, DerivativeFilter::default())).unwrap();
    let cl = c.series(&g).unwrap().unity_feedback().unwrap();

    let r = evaluate_step_response(&cl, &SimOptions::default()).unwrap();
    let g0 = 0.01 / 0.1001;
    let expected_ess = 1.0 / (1.0 + kp * g0);
    assert!(
        (r.metrics.steady_state_error - expected_ess).abs() < 1e-6,
        "ess = {}",
        r.metrics.steady_state_error
    );
}

#[test]
fn first_order_p_loop_is_monotonic() {
    let g = build_plant(&plant(false)).unwrap();
    let c = build_controller(&PidGains::new(50.0, 0.0, 0.0, DerivativeFilter::default())).unwrap();
    let cl = c.series(&g).unwrap().unity_feedback().unwrap();

    let r = evaluate_step_response(&cl, &SimOptions::default()).unwrap();
    assert!(r.trajectory.y.windows(2).all(|w| w[1] >= w[0] - 1e-12));
    assert_eq!(r.metrics.percent_overshoot, 0.0);
}

#[test]
fn integral_action_removes_steady_state_error() {
    let g = build_plant(&plant(true)).unwrap();
    let c = build_controller(&PidGains::new(100.0, 200.0, 5.0, DerivativeFilter::default()))
        .unwrap();
    let cl = c.series(&g).unwrap().unity_feedback().unwrap();

    let opts = SimOptions {
        t_end: 20.0,
        n_points: 4000,
        step_magnitude: 1.0,
    };
    let r = evaluate_step_response(&cl, &opts).unwrap();
    assert!(r.metrics.steady_state_error < 1e-3);
    assert!(r.metrics.is_finite());
}

#[test]
fn unstable_loop_reports_non_finite_or_huge_metrics() {
    // Positive feedback through a negative gain destabilizes the loop.
    let g = build_plant(&plant(true)).unwrap();
    let c = build_controller(&PidGains::new(-500.0, 0.0, 0.0, DerivativeFilter::default()))
        .unwrap();
    let cl = c.series(&g).unwrap().unity_feedback().unwrap();

    let opts = SimOptions {
        t_end: 200.0,
        ..SimOptions::default()
    };
    let r = evaluate_step_response(&cl, &opts).unwrap();
    assert!(r.metrics.steady_state_error > 1e6 || !r.metrics.is_finite());
}

//! End-to-end behaviour of the performance model and schedule search.

use caffeine_core::optimizer::candidate_instants;
use caffeine_core::*;
use chrono::{Duration, NaiveDate};

fn at(day: u32, h: u32, m: u32) -> Timestamp {
    NaiveDate::from_ymd_opt(2024, 5, day)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

/// Slept 23:00 on the 9th until 07:00 on the 10th
fn regular_night() -> Vec<SleepPeriod> {
    vec![SleepPeriod::new(at(9, 23, 0), at(10, 7, 0))]
}

fn morning_params(target: f64, dose_options: Vec<f64>) -> OptimizationParams {
    OptimizationParams {
        time_windows: vec![TimeWindow::new(at(10, 9, 0), at(10, 11, 0))],
        target_performance: target,
        max_dose_per_intake: 400.0,
        min_time_between_doses_hours: 4.0,
        dose_options,
        fallback_dose: Some(100.0),
    }
}

#[test]
fn test_single_morning_dose_covers_focus_window() {
    let params = morning_params(0.5, vec![100.0]);

    let schedule = find_optimal_schedule(&regular_night(), &params).expect("a schedule");

    assert_eq!(schedule.len(), 1);
    assert!(schedule.doses()[0].instant <= at(10, 9, 0));
    assert_eq!(schedule.total_mg(), 100.0);
}

#[test]
fn test_caffeine_raises_performance_at_wake() {
    let sleep = regular_night();
    let wake = at(10, 7, 0);

    let without = predict(wake, &sleep, &[]);
    let with = predict(wake, &sleep, &[CaffeineDose::new(at(10, 6, 30), 150.0)]);

    assert!(without < with, "{} should be below {}", without, with);
}

#[test]
fn test_unreachable_target_yields_no_schedule() {
    let params = morning_params(1.0, vec![50.0, 100.0, 200.0, 400.0]);
    assert!(find_optimal_schedule(&regular_night(), &params).is_none());

    let mut tight = params.clone();
    tight.min_time_between_doses_hours = 0.5;
    assert!(find_optimal_schedule(&regular_night(), &tight).is_none());
}

#[test]
fn test_smaller_dose_wins_when_both_succeed() {
    let params = morning_params(0.5, vec![150.0, 100.0]);
    let sleep = regular_night();

    // Both sizes reach the window on their own
    for mg in [150.0, 100.0] {
        let single = Schedule::new(vec![CaffeineDose::new(at(10, 8, 30), mg)]);
        assert_eq!(evaluate(&sleep, &params, &single).successful_windows, 1);
    }

    let schedule = find_optimal_schedule(&sleep, &params).unwrap();
    assert_eq!(schedule.total_mg(), 100.0);
}

#[test]
fn test_empty_options_or_windows_yield_no_schedule() {
    let sleep = regular_night();
    assert!(find_optimal_schedule(&sleep, &morning_params(0.5, vec![])).is_none());

    let mut no_windows = morning_params(0.5, vec![100.0]);
    no_windows.time_windows.clear();
    assert!(find_optimal_schedule(&sleep, &no_windows).is_none());
}

#[test]
fn test_schedule_only_uses_candidate_instants() {
    let sleep = regular_night();
    let params = OptimizationParams {
        time_windows: vec![
            TimeWindow::new(at(10, 9, 0), at(10, 11, 0)),
            TimeWindow::new(at(10, 14, 0), at(10, 16, 0)),
        ],
        target_performance: 0.5,
        max_dose_per_intake: 200.0,
        min_time_between_doses_hours: 1.5,
        dose_options: vec![50.0, 100.0],
        fallback_dose: None,
    };

    let candidates = candidate_instants(&params, SearchLimits::default());
    assert_eq!(
        candidates,
        vec![at(10, 8, 30), at(10, 10, 0), at(10, 13, 30), at(10, 15, 0)]
    );

    // 100 mg at 08:30 alone keeps the morning window above 0.5
    let schedule = find_optimal_schedule(&sleep, &params).expect("a schedule");
    assert!(!schedule.is_empty() && schedule.len() <= 2);
    for dose in &schedule {
        assert!(candidates.contains(&dose.instant));
        assert!(params.dose_options.contains(&dose.milligrams));
    }
    assert!(evaluate(&sleep, &params, &schedule).successful_windows >= 1);
}

#[test]
fn test_prediction_bounded_and_repeatable() {
    let sleep = vec![
        SleepPeriod::new(at(8, 22, 30), at(9, 6, 0)),
        SleepPeriod::new(at(9, 23, 0), at(10, 7, 0)),
    ];
    let doses = vec![
        CaffeineDose::new(at(9, 7, 0), 200.0),
        CaffeineDose::new(at(10, 7, 15), 300.0),
        CaffeineDose::new(at(10, 13, 0), 150.0),
    ];

    let mut t = at(8, 0, 0);
    while t < at(11, 0, 0) {
        let first = predict(t, &sleep, &doses);
        let second = predict(t, &sleep, &doses);
        assert!((0.0..=1.0).contains(&first));
        assert_eq!(first.to_bits(), second.to_bits());
        t += Duration::minutes(45);
    }
}

#[test]
fn test_bigger_dose_never_predicts_lower() {
    let sleep = regular_night();
    for minutes in [0, 30, 90, 240, 600] {
        let t = at(10, 8, 0) + Duration::minutes(minutes);
        let small = predict(t, &sleep, &[CaffeineDose::new(at(10, 8, 0), 50.0)]);
        let large = predict(t, &sleep, &[CaffeineDose::new(at(10, 8, 0), 250.0)]);
        assert!(large >= small, "at {}: {} < {}", t, large, small);
    }
}

#[test]
fn test_zero_length_window_resolves() {
    let mut params = morning_params(0.5, vec![100.0]);
    params.time_windows = vec![TimeWindow::new(at(10, 10, 0), at(10, 10, 0))];

    let schedule = find_optimal_schedule(&regular_night(), &params).expect("a schedule");
    assert_eq!(schedule.len(), 1);
    assert_eq!(schedule.doses()[0].instant, at(10, 9, 30));
    assert_eq!(evaluate(&regular_night(), &params, &schedule).successful_windows, 1);
}

#[test]
fn test_no_caffeine_is_never_proposed() {
    // Every window is already on target without caffeine, yet the search
    // still returns its lightest dose
    let params = morning_params(0.0, vec![100.0, 50.0]);
    let schedule = find_optimal_schedule(&regular_night(), &params).unwrap();
    assert_eq!(schedule.len(), 1);
    assert_eq!(schedule.total_mg(), 50.0);
}

#[test]
fn test_empty_history_still_predicts() {
    let p = predict(at(10, 12, 0), &[], &[]);
    assert!((0.0..=1.0).contains(&p));

    // The fallback baseline is too tired for 0.5 even with the largest dose
    let params = morning_params(0.5, vec![100.0, 200.0]);
    assert!(find_optimal_schedule(&[], &params).is_none());

    let params = morning_params(0.1, vec![100.0]);
    let schedule = find_optimal_schedule(&[], &params).expect("a schedule");
    assert_eq!(schedule.doses()[0].instant, at(10, 8, 30));
    assert_eq!(schedule.total_mg(), 100.0);
}

#[test]
fn test_comparison_curve_spans_day() {
    let sleep = regular_night();
    let params = morning_params(0.5, vec![100.0]);
    let schedule = find_optimal_schedule(&sleep, &params).unwrap();

    let sampling = CurveSampling::from_wake(&sleep, at(10, 12, 0));
    let curve = comparison_curve(&sleep, &[], &schedule, &sampling);

    assert_eq!(curve.len(), 73);
    assert_eq!(curve[0].instant, at(10, 7, 0));
    let nine = curve.iter().find(|p| p.instant == at(10, 9, 0)).unwrap();
    assert!(nine.baseline < 0.5);
    assert!(nine.with_schedule >= 0.5);
}

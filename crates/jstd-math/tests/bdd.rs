use jstd_math::{round_f64, seconds_to_millis, success_density};

#[test]
fn given_no_tests_when_density_is_computed_then_run_is_fully_successful() {
    let got = success_density(0, 0, 0);
    assert_eq!(got, 100.0);
}

#[test]
fn given_all_tests_pass_when_density_is_computed_then_result_is_hundred() {
    let got = success_density(10, 0, 0);
    assert_eq!(got, 100.0);
}

#[test]
fn given_one_error_in_four_when_density_is_computed_then_result_is_seventy_five() {
    let got = success_density(4, 1, 0);
    assert_eq!(got, 75.0);
}

#[test]
fn given_one_failure_in_four_when_density_is_computed_then_result_matches_error_case() {
    assert_eq!(success_density(4, 0, 1), success_density(4, 1, 0));
}

#[test]
fn given_two_case_durations_when_converted_then_sum_is_exact() {
    let total = seconds_to_millis(0.3) + seconds_to_millis(0.4);
    assert_eq!(total, 700);
}

#[test]
fn given_fraction_when_rounding_then_requested_precision_is_applied() {
    let got = round_f64(12.34567, 3);
    assert_eq!(got, 12.346);
}

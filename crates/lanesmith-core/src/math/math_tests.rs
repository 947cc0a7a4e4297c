//! Accuracy and special-value tests for the transcendental functions.

use super::*;

/// Deterministic sweep of `n` points over `[lo, hi]`.
fn sweep(lo: f64, hi: f64, n: usize) -> impl Iterator<Item = f64> {
    (0..n).map(move |i| lo + (hi - lo) * (i as f64 + 0.5) / n as f64)
}

fn assert_within(name: &str, x: f64, got: f64, want: f64, bound: u64) {
    // The reference itself is within one ulp of the true value.
    let d = ulp_distance(got, want);
    assert!(d <= bound, "{name}({x:e}) = {got:e}, reference {want:e}, {d} ulp apart");
}

// =========================================================================
// log
// =========================================================================

#[test]
fn test_log_exact_points() {
    assert_eq!(log(1.0), 0.0);
    assert!(log(1.0).is_sign_positive());
    assert_within("log", 2.0, log(2.0), std::f64::consts::LN_2, LOG_MAX_ULP);
    assert_within("log", std::f64::consts::E, log(std::f64::consts::E), 1.0, LOG_MAX_ULP);
}

#[test]
fn test_log_special_values() {
    assert_eq!(log(0.0), f64::NEG_INFINITY);
    assert_eq!(log(-0.0), f64::NEG_INFINITY);
    assert!(log(-1.0).is_nan());
    assert!(log(f64::NEG_INFINITY).is_nan());
    assert_eq!(log(f64::INFINITY), f64::INFINITY);
    assert!(log(f64::NAN).is_nan());
}

#[test]
fn test_log_accuracy() {
    for x in sweep(0.25, 4.0, 20_000) {
        assert_within("log", x, log(x), x.ln(), LOG_MAX_ULP);
    }
    for e in -1020..1020 {
        let x = 1.337 * 2f64.powi(e);
        assert_within("log", x, log(x), x.ln(), LOG_MAX_ULP);
    }
}

#[test]
fn test_log_subnormal_inputs() {
    for x in [f64::MIN_POSITIVE / 3.0, 5e-324, 1e-310] {
        assert_within("log", x, log(x), x.ln(), LOG_MAX_ULP);
    }
}

// =========================================================================
// exp
// =========================================================================

#[test]
fn test_exp_exact_points() {
    assert_eq!(exp(0.0), 1.0);
    assert_eq!(exp(-0.0), 1.0);
    assert_within("exp", 1.0, exp(1.0), std::f64::consts::E, EXP_MAX_ULP);
}

#[test]
fn test_exp_special_values() {
    assert_eq!(exp(f64::INFINITY), f64::INFINITY);
    assert_eq!(exp(f64::NEG_INFINITY), 0.0);
    assert_eq!(exp(710.0), f64::INFINITY);
    assert_eq!(exp(-746.0), 0.0);
    assert!(exp(f64::NAN).is_nan());
    assert!(exp(EXP_OVERFLOW_THRESHOLD).is_finite());
}

#[test]
fn test_exp_accuracy() {
    for x in sweep(-700.0, 700.0, 40_000) {
        assert_within("exp", x, exp(x), x.exp(), EXP_MAX_ULP);
    }
    for x in sweep(-1.0, 1.0, 10_000) {
        assert_within("exp", x, exp(x), x.exp(), EXP_MAX_ULP);
    }
}

// =========================================================================
// sin, cos, tan
// =========================================================================

#[test]
fn test_trig_exact_points() {
    assert_eq!(sin(0.0), 0.0);
    assert_eq!(cos(0.0), 1.0);
    assert_eq!(tan(0.0), 0.0);
}

#[test]
fn test_trig_special_values() {
    for x in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
        assert!(sin(x).is_nan());
        assert!(cos(x).is_nan());
        assert!(tan(x).is_nan());
    }
}

#[test]
fn test_sin_cos_accuracy() {
    for x in sweep(-10.0, 10.0, 40_000) {
        assert_within("sin", x, sin(x), x.sin(), SIN_MAX_ULP);
        assert_within("cos", x, cos(x), x.cos(), COS_MAX_ULP);
    }
    for x in sweep(1000.0, 100_000.0, 10_000) {
        assert_within("sin", x, sin(x), x.sin(), SIN_MAX_ULP);
        assert_within("cos", x, cos(x), x.cos(), COS_MAX_ULP);
    }
}

#[test]
fn test_tan_accuracy() {
    for x in sweep(-1.5, 1.5, 20_000) {
        assert_within("tan", x, tan(x), x.tan(), TAN_MAX_ULP);
    }
}

#[test]
fn test_quadrant_symmetry() {
    for x in sweep(0.1, 3.0, 500) {
        assert_eq!(sin(-x), -sin(x));
        assert_eq!(cos(-x), cos(x));
    }
}

#[test]
fn test_quadrant_selects_follow_the_rotation() {
    for x in sweep(-12.0, 12.0, 999) {
        let (s, c, quadrant) = trig_parts(x);
        let (want_sin, want_cos) = match quadrant {
            0 => (s, c),
            1 => (c, -s),
            2 => (-s, -c),
            _ => (-c, s),
        };
        assert_eq!(sin(x).to_bits(), want_sin.to_bits(), "sin({x}) in quadrant {quadrant}");
        assert_eq!(cos(x).to_bits(), want_cos.to_bits(), "cos({x}) in quadrant {quadrant}");
    }
}

#[test]
fn test_select_keeps_payload_bits() {
    let payload = f64::from_bits(0x7FF8_0000_0000_1234);
    assert_eq!(select(mask(true), payload, 1.0).to_bits(), payload.to_bits());
    assert_eq!(select(mask(false), payload, -0.0).to_bits(), (-0.0f64).to_bits());
    assert_eq!(log(payload).to_bits(), payload.to_bits());
    assert_eq!(exp(payload).to_bits(), payload.to_bits());
}

// =========================================================================
// Lane forms
// =========================================================================

#[test]
fn test_lanes_match_scalar_bitwise() {
    let x: Vec<f64> = sweep(-20.0, 20.0, 257).chain([0.0, f64::NAN, f64::INFINITY, -1.0]).collect();
    let mut out = vec![0.0; x.len()];
    type Pair = (fn(f64) -> f64, fn(&[f64], &mut [f64]));
    let pairs: [Pair; 5] = [
        (log, log_lanes),
        (exp, exp_lanes),
        (sin, sin_lanes),
        (cos, cos_lanes),
        (tan, tan_lanes),
    ];
    for (scalar, lanes) in pairs {
        lanes(&x, &mut out);
        for (&v, &o) in x.iter().zip(&out) {
            assert_eq!(scalar(v).to_bits(), o.to_bits());
        }
    }
}

#[test]
fn test_ulp_distance() {
    assert_eq!(ulp_distance(1.0, 1.0), 0);
    assert_eq!(ulp_distance(1.0, f64::from_bits(1.0f64.to_bits() + 3)), 3);
    assert_eq!(ulp_distance(0.0, -0.0), 0);
    assert_eq!(ulp_distance(f64::from_bits(1), -f64::from_bits(1)), 2);
    assert_eq!(ulp_distance(f64::NAN, 1.0), u64::MAX);
}

//! Transcendental functions on `f64`.
//!
//! Each function has a scalar form and a lane-batch form (`*_lanes`) that
//! runs the same branch-free core on every lane, so the pipelined kernels
//! and the Default routine agree bit for bit. The core always runs the
//! polynomial path; special inputs are patched in afterwards by selects.
//!
//! | Function | Range reduction | Polynomial | Max error |
//! |----------|-----------------|------------|-----------|
//! | [`log`] | `x = 2^k · m`, `m ∈ [√2/2, √2)` | odd series in `s = f/(2+f)`, 12 terms | [`LOG_MAX_ULP`] |
//! | [`exp`] | `x = k·ln2 + r`, two-term ln2 | degree 13 | [`EXP_MAX_ULP`] |
//! | [`sin`], [`cos`] | three-term π/2 | degree 17 / 18 on `[−π/4, π/4]` | [`SIN_MAX_ULP`], [`COS_MAX_ULP`] |
//! | [`tan`] | as sin/cos | quotient | [`TAN_MAX_ULP`] |
//!
//! Trigonometric bounds hold for `|x| ≤ TRIG_ACCURATE_RANGE`; beyond it the
//! reduction loses bits and results are finite but inaccurate.

#[cfg(test)]
mod math_tests;

/// Max error of [`log`] in units in the last place.
pub const LOG_MAX_ULP: u64 = 4;
/// Max error of [`exp`] for normal results.
pub const EXP_MAX_ULP: u64 = 4;
/// Max error of [`sin`] on the accurate range.
pub const SIN_MAX_ULP: u64 = 4;
/// Max error of [`cos`] on the accurate range.
pub const COS_MAX_ULP: u64 = 4;
/// Max error of [`tan`] on the accurate range.
pub const TAN_MAX_ULP: u64 = 8;

/// Largest `|x|` for which the trigonometric bounds hold.
pub const TRIG_ACCURATE_RANGE: f64 = 1_048_576.0;

// =========================================================================
// Shared constants
// =========================================================================

const SIGN_MASK: u64 = 0x8000_0000_0000_0000;
const EXPONENT_MASK: u64 = 0x7FF0_0000_0000_0000;
const FRACTION_MASK: u64 = 0x000F_FFFF_FFFF_FFFF;
const ONE_BITS: u64 = 0x3FF0_0000_0000_0000;
const EXPONENT_BIAS: i64 = 1023;

/// ln2 split so that `k · LN2_HI` is exact for `|k| < 2^11`.
const LN2_HI: f64 = f64::from_bits(0x3FE6_2E42_FEE0_0000);
const LN2_LO: f64 = f64::from_bits(0x3DEA_39EF_3579_3C76);

/// All ones when `condition` holds, zero otherwise.
#[inline(always)]
fn mask(condition: bool) -> u64 {
    u64::from(condition).wrapping_neg()
}

/// Lanewise `if mask { a } else { b }` on the bit patterns.
#[inline(always)]
fn select(mask: u64, a: f64, b: f64) -> f64 {
    f64::from_bits((a.to_bits() & mask) | (b.to_bits() & !mask))
}

/// `2^k` for `k` in the normal exponent range.
#[inline(always)]
#[allow(clippy::cast_sign_loss)]
fn pow2(k: i64) -> f64 {
    f64::from_bits(((k + EXPONENT_BIAS) as u64) << 52)
}

// =========================================================================
// log
// =========================================================================

const SQRT_2: f64 = std::f64::consts::SQRT_2;
const TWO_POW_54: f64 = 18_014_398_509_481_984.0;

/// `2/(2k+1)` for `k = 1..=12`, highest degree last.
const LOG_SERIES: [f64; 12] = [
    2.0 / 3.0,
    2.0 / 5.0,
    2.0 / 7.0,
    2.0 / 9.0,
    2.0 / 11.0,
    2.0 / 13.0,
    2.0 / 15.0,
    2.0 / 17.0,
    2.0 / 19.0,
    2.0 / 21.0,
    2.0 / 23.0,
    2.0 / 25.0,
];

#[inline(always)]
#[allow(clippy::cast_possible_wrap, clippy::cast_precision_loss)]
fn log_lane(x: f64) -> f64 {
    // Subnormals are scaled into the normal range first.
    let subnormal = mask(x < f64::MIN_POSITIVE);
    let bits = select(subnormal, x * TWO_POW_54, x).to_bits();
    let mut k = ((bits & EXPONENT_MASK) >> 52) as i64 - EXPONENT_BIAS - (subnormal & 54) as i64;
    let m = f64::from_bits((bits & FRACTION_MASK) | ONE_BITS);
    let high = m > SQRT_2;
    let m = select(mask(high), m * 0.5, m);
    k += i64::from(high);

    let f = m - 1.0;
    let s = f / (2.0 + f);
    let z = s * s;
    let mut r = LOG_SERIES[LOG_SERIES.len() - 1];
    for &c in LOG_SERIES[..LOG_SERIES.len() - 1].iter().rev() {
        r = r * z + c;
    }
    let r = r * z;
    let hfsq = 0.5 * f * f;
    let dk = k as f64;
    let y = dk * LN2_HI - ((hfsq - (s * (hfsq + r) + dk * LN2_LO)) - f);

    // Special values, in increasing priority.
    let y = select(mask(x == f64::INFINITY), f64::INFINITY, y);
    let y = select(mask(x < 0.0), f64::NAN, y);
    let y = select(mask(x == 0.0), f64::NEG_INFINITY, y);
    select(mask(x.is_nan()), x, y)
}

/// Natural logarithm.
///
/// `log(±0) = −∞`, `log(x < 0) = NaN`, `log(+∞) = +∞`, NaN propagates.
#[must_use]
pub fn log(x: f64) -> f64 {
    log_lane(x)
}

/// [`log`] over a batch of lanes.
#[inline(always)]
pub fn log_lanes(x: &[f64], out: &mut [f64]) {
    for (o, &v) in out.iter_mut().zip(x) {
        *o = log_lane(v);
    }
}

// =========================================================================
// exp
// =========================================================================

/// Above this, `exp` overflows.
pub const EXP_OVERFLOW_THRESHOLD: f64 = f64::from_bits(0x4086_2E42_FEFA_39EF);
/// Below this, `exp` rounds to zero.
pub const EXP_UNDERFLOW_THRESHOLD: f64 = f64::from_bits(0xC087_4910_D52D_3051);

/// `1/n!` for `n = 2..=13`, highest degree last.
const EXP_SERIES: [f64; 12] = [
    1.0 / 2.0,
    1.0 / 6.0,
    1.0 / 24.0,
    1.0 / 120.0,
    1.0 / 720.0,
    1.0 / 5_040.0,
    1.0 / 40_320.0,
    1.0 / 362_880.0,
    1.0 / 3_628_800.0,
    1.0 / 39_916_800.0,
    1.0 / 479_001_600.0,
    1.0 / 6_227_020_800.0,
];

#[inline(always)]
#[allow(clippy::cast_possible_truncation)]
fn exp_lane(x: f64) -> f64 {
    let clamped = x.clamp(EXP_UNDERFLOW_THRESHOLD, EXP_OVERFLOW_THRESHOLD);
    let kf = (clamped * std::f64::consts::LOG2_E).round();
    let hi = clamped - kf * LN2_HI;
    let lo = kf * LN2_LO;
    let r = hi - lo;

    let mut q = EXP_SERIES[EXP_SERIES.len() - 1];
    for &c in EXP_SERIES[..EXP_SERIES.len() - 1].iter().rev() {
        q = q * r + c;
    }
    let p = 1.0 + (r + r * r * q);

    // Two factors keep both halves of 2^k representable at the range ends.
    let k = kf as i64;
    let half = k / 2;
    let y = p * pow2(half) * pow2(k - half);

    let y = select(mask(x > EXP_OVERFLOW_THRESHOLD), f64::INFINITY, y);
    let y = select(mask(x < EXP_UNDERFLOW_THRESHOLD), 0.0, y);
    select(mask(x.is_nan()), x, y)
}

/// Base-e exponential.
///
/// Overflows to `+∞` above [`EXP_OVERFLOW_THRESHOLD`] and flushes to `+0`
/// below [`EXP_UNDERFLOW_THRESHOLD`]; NaN propagates.
#[must_use]
pub fn exp(x: f64) -> f64 {
    exp_lane(x)
}

/// [`exp`] over a batch of lanes.
#[inline(always)]
pub fn exp_lanes(x: &[f64], out: &mut [f64]) {
    for (o, &v) in out.iter_mut().zip(x) {
        *o = exp_lane(v);
    }
}

// =========================================================================
// sin, cos, tan
// =========================================================================

// π/2 in three 33-bit pieces plus a tail; `n · PIO2_k` is exact for n < 2^20.
const PIO2_1: f64 = f64::from_bits(0x3FF9_21FB_5440_0000);
const PIO2_2: f64 = f64::from_bits(0x3DD0_B461_1A60_0000);
const PIO2_3: f64 = f64::from_bits(0x3BA3_198A_2E00_0000);
const PIO2_3T: f64 = f64::from_bits(0x397B_839A_2520_49C1);

/// `(-1)^n / (2n+1)!` for `n = 1..=8`.
const SIN_SERIES: [f64; 8] = [
    -1.0 / 6.0,
    1.0 / 120.0,
    -1.0 / 5_040.0,
    1.0 / 362_880.0,
    -1.0 / 39_916_800.0,
    1.0 / 6_227_020_800.0,
    -1.0 / 1_307_674_368_000.0,
    1.0 / 355_687_428_096_000.0,
];

/// `(-1)^n / (2n)!` for `n = 2..=9`.
const COS_SERIES: [f64; 8] = [
    1.0 / 24.0,
    -1.0 / 720.0,
    1.0 / 40_320.0,
    -1.0 / 3_628_800.0,
    1.0 / 479_001_600.0,
    -1.0 / 87_178_291_200.0,
    1.0 / 20_922_789_888_000.0,
    -1.0 / 6_402_373_705_728_000.0,
];

#[inline(always)]
fn horner(coefficients: &[f64], z: f64) -> f64 {
    let mut acc = coefficients[coefficients.len() - 1];
    for &c in coefficients[..coefficients.len() - 1].iter().rev() {
        acc = acc * z + c;
    }
    acc
}

/// Reduced argument and quadrant.
#[inline(always)]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn reduce_pio2(x: f64) -> (f64, u64) {
    let n = (x * std::f64::consts::FRAC_2_PI).round();
    let r1 = x - n * PIO2_1;
    let w = n * PIO2_2;
    let t = r1 - w;
    // Rounding error of `t`, recovered exactly (two-sum).
    let v = t - r1;
    let e = (r1 - (t - v)) + (-w - v);
    let tail = (e - n * PIO2_3) - n * PIO2_3T;
    (t + tail, (n as i64 as u64) & 3)
}

/// `sin(r)` for `|r| ≤ π/4`.
#[inline(always)]
fn sin_kernel(r: f64) -> f64 {
    let z = r * r;
    r + r * z * horner(&SIN_SERIES, z)
}

/// `cos(r)` for `|r| ≤ π/4`.
#[inline(always)]
fn cos_kernel(r: f64) -> f64 {
    let z = r * r;
    let hz = 0.5 * z;
    let w = 1.0 - hz;
    w + (((1.0 - w) - hz) + z * z * horner(&COS_SERIES, z))
}

#[inline(always)]
fn trig_parts(x: f64) -> (f64, f64, u64) {
    let (r, quadrant) = reduce_pio2(x);
    (sin_kernel(r), cos_kernel(r), quadrant)
}

/// `y` with its sign flipped where bit 1 of `quadrant` is set.
#[inline(always)]
fn flip_sign(y: f64, quadrant: u64) -> f64 {
    f64::from_bits(y.to_bits() ^ ((quadrant & 2) << 62))
}

#[inline(always)]
fn sin_lane(x: f64) -> f64 {
    let (s, c, quadrant) = trig_parts(x);
    // s, c, -s, -c
    let y = flip_sign(select(mask(quadrant & 1 != 0), c, s), quadrant);
    select(mask(x.is_finite()), y, f64::NAN)
}

#[inline(always)]
fn cos_lane(x: f64) -> f64 {
    let (s, c, quadrant) = trig_parts(x);
    // c, -s, -c, s
    let y = flip_sign(select(mask(quadrant & 1 != 0), s, c), quadrant + 1);
    select(mask(x.is_finite()), y, f64::NAN)
}

#[inline(always)]
fn tan_lane(x: f64) -> f64 {
    let (s, c, quadrant) = trig_parts(x);
    let y = select(mask(quadrant & 1 != 0), -c / s, s / c);
    select(mask(x.is_finite()), y, f64::NAN)
}

/// Sine; `±∞` and NaN give NaN.
#[must_use]
pub fn sin(x: f64) -> f64 {
    sin_lane(x)
}

/// Cosine; `±∞` and NaN give NaN.
#[must_use]
pub fn cos(x: f64) -> f64 {
    cos_lane(x)
}

/// Tangent; `±∞` and NaN give NaN.
#[must_use]
pub fn tan(x: f64) -> f64 {
    tan_lane(x)
}

/// [`sin`] over a batch of lanes.
#[inline(always)]
pub fn sin_lanes(x: &[f64], out: &mut [f64]) {
    for (o, &v) in out.iter_mut().zip(x) {
        *o = sin_lane(v);
    }
}

/// [`cos`] over a batch of lanes.
#[inline(always)]
pub fn cos_lanes(x: &[f64], out: &mut [f64]) {
    for (o, &v) in out.iter_mut().zip(x) {
        *o = cos_lane(v);
    }
}

/// [`tan`] over a batch of lanes.
#[inline(always)]
pub fn tan_lanes(x: &[f64], out: &mut [f64]) {
    for (o, &v) in out.iter_mut().zip(x) {
        *o = tan_lane(v);
    }
}

/// Distance between two finite doubles in units in the last place.
///
/// Values of opposite sign count the distance through zero. Returns
/// `u64::MAX` if either value is NaN.
#[must_use]
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub fn ulp_distance(a: f64, b: f64) -> u64 {
    if a.is_nan() || b.is_nan() {
        return u64::MAX;
    }
    let ordered = |v: f64| {
        let bits = v.to_bits();
        if bits & SIGN_MASK != 0 {
            -((bits & !SIGN_MASK) as i64)
        } else {
            bits as i64
        }
    };
    ordered(a).abs_diff(ordered(b))
}

//! AVX2+FMA reductions for x86_64.
//!
//! Four 256-bit accumulators per kernel hide the add/FMA latency; a
//! single-register loop and the unrolled scalar remainder finish the
//! array. Loads are unaligned, so only element alignment is required.
//!
//! Every function needs AVX2 and FMA at runtime; the descriptor tables
//! guarantee that before any of them is reached.

#![allow(clippy::similar_names)]

use std::arch::x86_64::*;

/// Generates one 4-accumulator kernel over `a` (and `b`).
///
/// `step` folds the register at element offset `off` into `acc`; `tail`
/// is the scalar term of element `i` for the remainder.
macro_rules! avx_4acc {
    (
        $(#[$meta:meta])*
        fn $name:ident($a:ident, $b:ident: &[$t:ty]) lanes $lanes:literal;
        zero $zero:ident; add $add:ident; hsum $hsum:ident;
        step |$acc:ident, $off:ident| $step:expr;
        tail |$i:ident| $term:expr
    ) => {
        $(#[$meta])*
        #[target_feature(enable = "avx2", enable = "fma")]
        #[inline]
        unsafe fn $name($a: &[$t], $b: &[$t]) -> $t {
            debug_assert_eq!($a.len(), $b.len());
            let len = $a.len();
            let block = 4 * $lanes;
            let blocks = len / block;

            // SAFETY: offsets stay below `blocks * block <= len`, then below
            // `len` in the single-register loop; loads are unaligned.
            unsafe {
                let mut sum0 = $zero();
                let mut sum1 = $zero();
                let mut sum2 = $zero();
                let mut sum3 = $zero();

                for i in 0..blocks {
                    let base = i * block;
                    sum0 = { let $acc = sum0; let $off = base; $step };
                    sum1 = { let $acc = sum1; let $off = base + $lanes; $step };
                    sum2 = { let $acc = sum2; let $off = base + 2 * $lanes; $step };
                    sum3 = { let $acc = sum3; let $off = base + 3 * $lanes; $step };
                }

                let mut offset = blocks * block;
                while offset + $lanes <= len {
                    sum0 = { let $acc = sum0; let $off = offset; $step };
                    offset += $lanes;
                }

                let combined = $add($add(sum0, sum1), $add(sum2, sum3));
                $hsum(combined) + tail!(offset, len, $t, |$i| $term)
            }
        }
    };
}

#[target_feature(enable = "avx2")]
#[inline]
unsafe fn hsum_ps(v: __m256) -> f32 {
    // SAFETY: register-only intrinsics, AVX enabled on this function.
    unsafe {
        let hi = _mm256_extractf128_ps(v, 1);
        let lo = _mm256_castps256_ps128(v);
        let sum128 = _mm_add_ps(lo, hi);
        let shuf = _mm_movehdup_ps(sum128);
        let sums = _mm_add_ps(sum128, shuf);
        let shuf2 = _mm_movehl_ps(sums, sums);
        _mm_cvtss_f32(_mm_add_ss(sums, shuf2))
    }
}

#[target_feature(enable = "avx2")]
#[inline]
unsafe fn hsum_pd(v: __m256d) -> f64 {
    // SAFETY: register-only intrinsics, AVX enabled on this function.
    unsafe {
        let hi = _mm256_extractf128_pd(v, 1);
        let lo = _mm256_castpd256_pd128(v);
        let sum128 = _mm_add_pd(lo, hi);
        let shuf = _mm_unpackhi_pd(sum128, sum128);
        _mm_cvtsd_f64(_mm_add_sd(sum128, shuf))
    }
}

// =============================================================================
// Sum
// =============================================================================

avx_4acc! {
    fn sum_4acc_f32(a, _b: &[f32]) lanes 8;
    zero _mm256_setzero_ps; add _mm256_add_ps; hsum hsum_ps;
    step |acc, off| _mm256_add_ps(acc, _mm256_loadu_ps(a.as_ptr().add(off)));
    tail |i| a[i]
}

avx_4acc! {
    fn sum_4acc_f64(a, _b: &[f64]) lanes 4;
    zero _mm256_setzero_pd; add _mm256_add_pd; hsum hsum_pd;
    step |acc, off| _mm256_add_pd(acc, _mm256_loadu_pd(a.as_ptr().add(off)));
    tail |i| a[i]
}

reduce_routine!(
    /// AVX2 `Sum_V32f_S32f`.
    sum_f32, f32, sum_4acc_f32
);
reduce_routine!(
    /// AVX2 `Sum_V64f_S64f`.
    sum_f64, f64, sum_4acc_f64
);

// =============================================================================
// Sum of squares
// =============================================================================

avx_4acc! {
    fn sum_squares_4acc_f32(a, _b: &[f32]) lanes 8;
    zero _mm256_setzero_ps; add _mm256_add_ps; hsum hsum_ps;
    step |acc, off| {
        let v = _mm256_loadu_ps(a.as_ptr().add(off));
        _mm256_fmadd_ps(v, v, acc)
    };
    tail |i| a[i] * a[i]
}

avx_4acc! {
    fn sum_squares_4acc_f64(a, _b: &[f64]) lanes 4;
    zero _mm256_setzero_pd; add _mm256_add_pd; hsum hsum_pd;
    step |acc, off| {
        let v = _mm256_loadu_pd(a.as_ptr().add(off));
        _mm256_fmadd_pd(v, v, acc)
    };
    tail |i| a[i] * a[i]
}

reduce_routine!(
    /// AVX2 `SumSquares_V32f_S32f`.
    sum_squares_f32, f32, sum_squares_4acc_f32
);
reduce_routine!(
    /// AVX2 `SumSquares_V64f_S64f`.
    sum_squares_f64, f64, sum_squares_4acc_f64
);

// =============================================================================
// Dot product
// =============================================================================

avx_4acc! {
    fn dot_4acc_f32(a, b: &[f32]) lanes 8;
    zero _mm256_setzero_ps; add _mm256_add_ps; hsum hsum_ps;
    step |acc, off| {
        let va = _mm256_loadu_ps(a.as_ptr().add(off));
        let vb = _mm256_loadu_ps(b.as_ptr().add(off));
        _mm256_fmadd_ps(va, vb, acc)
    };
    tail |i| a[i] * b[i]
}

avx_4acc! {
    fn dot_4acc_f64(a, b: &[f64]) lanes 4;
    zero _mm256_setzero_pd; add _mm256_add_pd; hsum hsum_pd;
    step |acc, off| {
        let va = _mm256_loadu_pd(a.as_ptr().add(off));
        let vb = _mm256_loadu_pd(b.as_ptr().add(off));
        _mm256_fmadd_pd(va, vb, acc)
    };
    tail |i| a[i] * b[i]
}

dot_routine!(
    /// AVX2 `DotProduct_V32fV32f_S32f`.
    dot_f32, f32, dot_4acc_f32
);
dot_routine!(
    /// AVX2 `DotProduct_V64fV64f_S64f`.
    dot_f64, f64, dot_4acc_f64
);

//! NEON reductions for aarch64.
//!
//! Same layout as the AVX2 kernels with 128-bit registers: four
//! accumulators, a single-register loop, then the scalar remainder.
//! NEON is part of the aarch64 baseline.

#![allow(clippy::similar_names)]

use std::arch::aarch64::*;


macro_rules! neon_4acc {
    (
        fn $name:ident($a:ident, $b:ident: &[$t:ty]) lanes $lanes:literal;
        zero $zero:expr; add $add:ident; hsum $hsum:ident;
        step |$acc:ident, $off:ident| $step:expr;
        tail |$i:ident| $term:expr
    ) => {
        #[target_feature(enable = "neon")]
        #[inline]
        unsafe fn $name($a: &[$t], $b: &[$t]) -> $t {
            debug_assert_eq!($a.len(), $b.len());
            let len = $a.len();
            let block = 4 * $lanes;
            let blocks = len / block;

            // SAFETY: offset + lanes <= len for every load; vld1q handles
            // unaligned addresses.
            unsafe {
                let mut sum0 = $zero;
                let mut sum1 = $zero;
                let mut sum2 = $zero;
                let mut sum3 = $zero;

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

                $hsum($add($add(sum0, sum1), $add(sum2, sum3))) + tail!(offset, len, $t, |$i| $term)
            }
        }
    };
}

// =============================================================================
// Sum
// =============================================================================

neon_4acc! {
    fn sum_4acc_f32(a, _b: &[f32]) lanes 4;
    zero vdupq_n_f32(0.0); add vaddq_f32; hsum vaddvq_f32;
    step |acc, off| vaddq_f32(acc, vld1q_f32(a.as_ptr().add(off)));
    tail |i| a[i]
}

neon_4acc! {
    fn sum_4acc_f64(a, _b: &[f64]) lanes 2;
    zero vdupq_n_f64(0.0); add vaddq_f64; hsum vaddvq_f64;
    step |acc, off| vaddq_f64(acc, vld1q_f64(a.as_ptr().add(off)));
    tail |i| a[i]
}

reduce_routine!(
    /// NEON `Sum_V32f_S32f`.
    sum_f32, f32, sum_4acc_f32
);
reduce_routine!(
    /// NEON `Sum_V64f_S64f`.
    sum_f64, f64, sum_4acc_f64
);

// =============================================================================
// Sum of squares
// =============================================================================

neon_4acc! {
    fn sum_squares_4acc_f32(a, _b: &[f32]) lanes 4;
    zero vdupq_n_f32(0.0); add vaddq_f32; hsum vaddvq_f32;
    step |acc, off| {
        let v = vld1q_f32(a.as_ptr().add(off));
        vfmaq_f32(acc, v, v)
    };
    tail |i| a[i] * a[i]
}

neon_4acc! {
    fn sum_squares_4acc_f64(a, _b: &[f64]) lanes 2;
    zero vdupq_n_f64(0.0); add vaddq_f64; hsum vaddvq_f64;
    step |acc, off| {
        let v = vld1q_f64(a.as_ptr().add(off));
        vfmaq_f64(acc, v, v)
    };
    tail |i| a[i] * a[i]
}

reduce_routine!(
    /// NEON `SumSquares_V32f_S32f`.
    sum_squares_f32, f32, sum_squares_4acc_f32
);
reduce_routine!(
    /// NEON `SumSquares_V64f_S64f`.
    sum_squares_f64, f64, sum_squares_4acc_f64
);

// =============================================================================
// Dot product
// =============================================================================

neon_4acc! {
    fn dot_4acc_f32(a, b: &[f32]) lanes 4;
    zero vdupq_n_f32(0.0); add vaddq_f32; hsum vaddvq_f32;
    step |acc, off| {
        let va = vld1q_f32(a.as_ptr().add(off));
        let vb = vld1q_f32(b.as_ptr().add(off));
        vfmaq_f32(acc, va, vb)
    };
    tail |i| a[i] * b[i]
}

neon_4acc! {
    fn dot_4acc_f64(a, b: &[f64]) lanes 2;
    zero vdupq_n_f64(0.0); add vaddq_f64; hsum vaddvq_f64;
    step |acc, off| {
        let va = vld1q_f64(a.as_ptr().add(off));
        let vb = vld1q_f64(b.as_ptr().add(off));
        vfmaq_f64(acc, va, vb)
    };
    tail |i| a[i] * b[i]
}

dot_routine!(
    /// NEON `DotProduct_V32fV32f_S32f`.
    dot_f32, f32, dot_4acc_f32
);
dot_routine!(
    /// NEON `DotProduct_V64fV64f_S64f`.
    dot_f64, f64, dot_4acc_f64
);

//! Hand-written intrinsic reductions.
//!
//! The pipelined routines cover every kernel on every target; these are a
//! second opinion for the hot floating-point reductions (sum, sum of squares,
//! dot product) written directly against `std::arch` with four independent
//! accumulators. They are listed ahead of the pipelined entries in the
//! Haswell and Cortex-A15 rows, so the tables prefer them when the CPU
//! qualifies.
//!
//! Rounding differs from the Default routine: lanes are summed in a
//! different order and the multiply-add is fused.

use crate::dispatch::ImplementationDescriptor;
use crate::routine::{DotFn, ReduceFn};

/// Variant label of the AVX2+FMA entries.
#[cfg(target_arch = "x86_64")]
pub const AVX2_VARIANT: &str = "avx2-fma-4acc";

/// Variant label of the NEON entries.
#[cfg(target_arch = "aarch64")]
pub const NEON_VARIANT: &str = "neon-4acc";

/// Wraps a slice kernel as a reduce routine: validate, fold, write back.
macro_rules! reduce_routine {
    ($(#[$meta:meta])* $name:ident, $t:ty, $kernel:ident) => {
        $(#[$meta])*
        pub(crate) unsafe fn $name(
            v: *const $t,
            result: *mut $t,
            len: usize,
        ) -> $crate::error::Result<()> {
            $crate::pipeline::check_pointer(v, "v")?;
            $crate::pipeline::check_pointer(result.cast_const(), "result")?;
            // SAFETY: `v` is non-null and aligned; the caller guarantees
            // `len` readable elements.
            let a = unsafe { std::slice::from_raw_parts(v, len) };
            // SAFETY: only reachable through a table entry whose feature
            // requirement the running CPU satisfies.
            let total = unsafe { $kernel(a, a) };
            // SAFETY: `result` is non-null and aligned.
            unsafe { result.write(total) };
            Ok(())
        }
    };
}

/// Wraps a slice kernel as a dot-product routine.
macro_rules! dot_routine {
    ($(#[$meta:meta])* $name:ident, $t:ty, $kernel:ident) => {
        $(#[$meta])*
        pub(crate) unsafe fn $name(
            x: *const $t,
            y: *const $t,
            result: *mut $t,
            len: usize,
        ) -> $crate::error::Result<()> {
            $crate::pipeline::check_pointer(x, "x")?;
            $crate::pipeline::check_pointer(y, "y")?;
            $crate::pipeline::check_pointer(result.cast_const(), "result")?;
            // SAFETY: both inputs are non-null and aligned; the caller
            // guarantees `len` readable elements in each.
            let (a, b) = unsafe {
                (
                    std::slice::from_raw_parts(x, len),
                    std::slice::from_raw_parts(y, len),
                )
            };
            // SAFETY: only reachable through a table entry whose feature
            // requirement the running CPU satisfies.
            let total = unsafe { $kernel(a, b) };
            // SAFETY: `result` is non-null and aligned.
            unsafe { result.write(total) };
            Ok(())
        }
    };
}

/// Sums `term` over `start..end`, the elements past the last full
/// register, into two interleaved partial sums added once at the end.
#[allow(unused_macros)]
macro_rules! tail {
    ($start:expr, $end:expr, $t:ty, |$i:ident| $term:expr) => {{
        let end: usize = $end;
        let (mut even, mut odd): ($t, $t) = (0.0, 0.0);
        let mut next: usize = $start;
        while next + 2 <= end {
            even += { let $i = next; $term };
            odd += { let $i = next + 1; $term };
            next += 2;
        }
        if next < end {
            even += { let $i = next; $term };
        }
        even + odd
    }};
}

#[cfg(target_arch = "x86_64")]
mod x86_avx2;

#[cfg(target_arch = "aarch64")]
mod neon;

#[cfg(test)]
mod native_tests;

/// Native entries of one reduction, in table order.
macro_rules! native_entries {
    ($(#[$meta:meta])* $name:ident, $fn_type:ty, $routine:ident) => {
        $(#[$meta])*
        #[must_use]
        pub fn $name() -> Vec<ImplementationDescriptor<$fn_type>> {
            #[allow(unused_mut)]
            let mut entries = Vec::new();
            #[cfg(target_arch = "x86_64")]
            entries.push(ImplementationDescriptor::specialized(
                x86_avx2::$routine as $fn_type,
                crate::targets::requirements::HASWELL,
                crate::cpu::Microarchitecture::Haswell,
                AVX2_VARIANT,
            ));
            #[cfg(target_arch = "aarch64")]
            entries.push(ImplementationDescriptor::specialized(
                neon::$routine as $fn_type,
                crate::targets::requirements::CORTEX_A15,
                crate::cpu::Microarchitecture::CortexA15,
                NEON_VARIANT,
            ));
            entries
        }
    };
}

native_entries!(
    /// Native `Sum_V32f_S32f` entries.
    sum_f32, ReduceFn<f32>, sum_f32
);
native_entries!(
    /// Native `Sum_V64f_S64f` entries.
    sum_f64, ReduceFn<f64>, sum_f64
);
native_entries!(
    /// Native `SumSquares_V32f_S32f` entries.
    sum_squares_f32, ReduceFn<f32>, sum_squares_f32
);
native_entries!(
    /// Native `SumSquares_V64f_S64f` entries.
    sum_squares_f64, ReduceFn<f64>, sum_squares_f64
);
native_entries!(
    /// Native `DotProduct_V32fV32f_S32f` entries.
    dot_f32, DotFn<f32>, dot_f32
);
native_entries!(
    /// Native `DotProduct_V64fV64f_S64f` entries.
    dot_f64, DotFn<f64>, dot_f64
);

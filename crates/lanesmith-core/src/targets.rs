//! Per-microarchitecture routines.
//!
//! Each target module instantiates the pipelined kernel bodies under the
//! target's `#[target_feature]` set, with the schedule rows of that target.
//! The `*_entries` functions list one descriptor per target in declared
//! table order (Haswell, Bulldozer, SandyBridge, Nehalem, K10 on x86-64;
//! Cortex-A15, Cortex-A9 on AArch64), and the `*_table` functions close the
//! table with the Default routine.

use crate::cpu::{FeatureSet, Microarchitecture};
use crate::dispatch::{DispatchTable, ImplementationDescriptor};
use crate::element::{Element, Narrow};
use crate::error::Result;
use crate::pipeline::ops::{MapOp, ReduceOp};
use crate::routine::{
    BinaryFn, DotFn, InPlaceFn, InPlaceScalarFn, InPlaceUnaryFn, MinMaxFn, MixedBinaryFn,
    MixedInPlaceFn, PolynomialFn, ReduceFn, ScalarIntoFn, ScalarVectorFn, UnaryFn, VectorIntoFn,
    VectorScalarFn,
};
use crate::scalar;

/// Variant label of the pipelined entries.
pub const PIPELINED_VARIANT: &str = "pipelined";

/// Capabilities each target's routines are compiled for.
pub mod requirements {
    use super::FeatureSet;
    use crate::cpu::{arm_bits as arm, x86_bits as x86};

    /// AVX2 and FMA3 with OS-saved YMM state.
    pub const HASWELL: FeatureSet = FeatureSet::new(
        0,
        x86::SIMD_AVX | x86::SIMD_AVX2 | x86::SIMD_FMA3,
        x86::SYSTEM_XMM | x86::SYSTEM_YMM,
    );

    /// AVX with OS-saved YMM state.
    pub const SANDYBRIDGE: FeatureSet =
        FeatureSet::new(0, x86::SIMD_AVX, x86::SYSTEM_XMM | x86::SYSTEM_YMM);

    /// AVX and FMA4 with OS-saved YMM state.
    pub const BULLDOZER: FeatureSet = FeatureSet::new(
        0,
        x86::SIMD_AVX | x86::SIMD_FMA4,
        x86::SYSTEM_XMM | x86::SYSTEM_YMM,
    );

    /// SSE2 through SSE4.2 plus POPCNT.
    pub const NEHALEM: FeatureSet = FeatureSet::new(
        x86::ISA_POPCNT,
        x86::SIMD_SSE2 | x86::SIMD_SSE3 | x86::SIMD_SSSE3 | x86::SIMD_SSE4_1 | x86::SIMD_SSE4_2,
        x86::SYSTEM_XMM,
    );

    /// SSE2, SSE3 and SSE4A.
    pub const K10: FeatureSet = FeatureSet::new(
        0,
        x86::SIMD_SSE2 | x86::SIMD_SSE3 | x86::SIMD_SSE4A,
        x86::SYSTEM_XMM,
    );

    /// NEON with fused multiply-add (VFPv4, which implies VFPv3).
    pub const CORTEX_A15: FeatureSet =
        FeatureSet::new(arm::ISA_VFP3 | arm::ISA_VFP4, arm::SIMD_NEON | arm::SIMD_NEON2, 0);

    /// NEON with VFPv3.
    pub const CORTEX_A9: FeatureSet = FeatureSet::new(arm::ISA_VFP3, arm::SIMD_NEON, 0);

    /// Requirement of the routines tuned for `microarch`, if it is a target.
    #[must_use]
    pub const fn for_target(microarch: crate::cpu::Microarchitecture) -> Option<FeatureSet> {
        use crate::cpu::Microarchitecture as M;
        match microarch {
            M::Haswell => Some(HASWELL),
            M::SandyBridge => Some(SANDYBRIDGE),
            M::Bulldozer => Some(BULLDOZER),
            M::Nehalem => Some(NEHALEM),
            M::K10 => Some(K10),
            M::CortexA15 => Some(CORTEX_A15),
            M::CortexA9 => Some(CORTEX_A9),
            _ => None,
        }
    }
}

/// Pipelined kernel bodies, parameterized by the schedule target.
mod body {
    use super::*;
    use crate::pipeline::ops::{MinMaxReduce, Polynomial};
    use crate::pipeline::{
        check_pointer, run_map, run_map_sequential, run_reduce, run_reduce_sequential, Anchor,
        Source,
    };
    use crate::schedule::{cached, KernelShape, LoadBinding};

    /// Two-operand map: same-type kernels anchor on the output, widening
    /// ones on the narrow input.
    #[inline(always)]
    fn map_shape<K: MapOp>() -> (KernelShape, Anchor) {
        if <K::In as Element>::TYPE == <K::Out as Element>::TYPE {
            (KernelShape::Binary, Anchor::Output)
        } else {
            (KernelShape::Widening, Anchor::Input)
        }
    }

    /// One-operand map: transcendental kernels take the long-latency row.
    #[inline(always)]
    fn unary_shape<K: MapOp>() -> (KernelShape, Anchor) {
        let shape = if K::TRANSCENDENTAL {
            KernelShape::Transcendental
        } else {
            KernelShape::Unary
        };
        let anchor = if <K::In as Element>::TYPE == <K::Out as Element>::TYPE {
            Anchor::Output
        } else {
            Anchor::Input
        };
        (shape, anchor)
    }

    #[inline(always)]
    #[allow(clippy::too_many_arguments)]
    unsafe fn map<K: MapOp>(
        microarch: Microarchitecture,
        op: &K,
        (shape, anchor): (KernelShape, Anchor),
        loads: LoadBinding,
        x: Source<K::In>,
        y: Source<K::In>,
        z: *mut K::Out,
        len: usize,
    ) -> Result<()> {
        if len == 0 {
            return Ok(());
        }
        // SAFETY (both arms): forwarded from the routine's caller; pointers validated.
        match cached(microarch, shape, <K::Out as Element>::TYPE, loads) {
            Some(schedule) => unsafe { run_map(op, schedule, x, y, z, len, anchor) },
            None => {
                unsafe { run_map_sequential(op, x, y, z, len) };
                Ok(())
            }
        }
    }

    #[inline(always)]
    unsafe fn fold<K: ReduceOp>(
        microarch: Microarchitecture,
        op: &K,
        shape: KernelShape,
        x: *const K::In,
        y: Source<K::In>,
        len: usize,
    ) -> Result<K::Acc> {
        let loads = match shape {
            KernelShape::DotReduce => LoadBinding::XY,
            _ => LoadBinding::X,
        };
        // SAFETY (both arms): forwarded from the routine's caller; pointers validated.
        match cached(microarch, shape, <K::In as Element>::TYPE, loads) {
            Some(schedule) => unsafe { run_reduce(op, schedule, x, y, len) },
            None => unsafe { run_reduce_sequential(op, x, y, len) },
        }
    }

    #[inline(always)]
    pub(super) unsafe fn binary<K: MapOp + Default>(
        microarch: Microarchitecture,
        x: *const K::In,
        y: *const K::In,
        z: *mut K::Out,
        len: usize,
    ) -> Result<()> {
        check_pointer(x, "x")?;
        check_pointer(y, "y")?;
        check_pointer(z.cast_const(), "z")?;
        // SAFETY: caller contract.
        unsafe {
            map(microarch, &K::default(), map_shape::<K>(), LoadBinding::XY, Source::Vector(x), Source::Vector(y), z, len)
        }
    }

    #[inline(always)]
    pub(super) unsafe fn vector_scalar<K: MapOp + Default>(
        microarch: Microarchitecture,
        x: *const K::In,
        y: K::In,
        z: *mut K::Out,
        len: usize,
    ) -> Result<()> {
        check_pointer(x, "x")?;
        check_pointer(z.cast_const(), "z")?;
        let (_, anchor) = map_shape::<K>();
        // SAFETY: caller contract.
        unsafe {
            map(
                microarch,
                &K::default(),
                (KernelShape::Unary, anchor),
                LoadBinding::X,
                Source::Vector(x),
                Source::Broadcast(y),
                z,
                len,
            )
        }
    }

    #[inline(always)]
    pub(super) unsafe fn scalar_vector<K: MapOp + Default>(
        microarch: Microarchitecture,
        x: K::In,
        y: *const K::In,
        z: *mut K::Out,
        len: usize,
    ) -> Result<()> {
        check_pointer(y, "y")?;
        check_pointer(z.cast_const(), "z")?;
        // The only vector input is `y`; the prologue aligns the output.
        // SAFETY: caller contract.
        unsafe {
            map(
                microarch,
                &K::default(),
                (KernelShape::Unary, Anchor::Output),
                LoadBinding::Y,
                Source::Broadcast(x),
                Source::Vector(y),
                z,
                len,
            )
        }
    }

    #[inline(always)]
    pub(super) unsafe fn in_place<T: Element, K: MapOp<In = T, Out = T> + Default>(
        microarch: Microarchitecture,
        x: *mut T,
        y: *const T,
        len: usize,
    ) -> Result<()> {
        check_pointer(x.cast_const(), "x")?;
        check_pointer(y, "y")?;
        // SAFETY: caller contract; `run_map` loads a batch before storing it.
        unsafe {
            map(
                microarch,
                &K::default(),
                (KernelShape::Binary, Anchor::Output),
                LoadBinding::XY,
                Source::Vector(x.cast_const()),
                Source::Vector(y),
                x,
                len,
            )
        }
    }

    #[inline(always)]
    pub(super) unsafe fn in_place_scalar<T: Element, K: MapOp<In = T, Out = T> + Default>(
        microarch: Microarchitecture,
        x: *mut T,
        y: T,
        len: usize,
    ) -> Result<()> {
        check_pointer(x.cast_const(), "x")?;
        // SAFETY: caller contract.
        unsafe {
            map(
                microarch,
                &K::default(),
                (KernelShape::Unary, Anchor::Output),
                LoadBinding::X,
                Source::Vector(x.cast_const()),
                Source::Broadcast(y),
                x,
                len,
            )
        }
    }

    #[inline(always)]
    pub(super) unsafe fn vector_into<T: Element, K: MapOp<In = T, Out = T> + Default>(
        microarch: Microarchitecture,
        x: *const T,
        y: *mut T,
        len: usize,
    ) -> Result<()> {
        check_pointer(x, "x")?;
        check_pointer(y.cast_const(), "y")?;
        // SAFETY: caller contract; `run_map` loads a batch before storing it.
        unsafe {
            map(
                microarch,
                &K::default(),
                (KernelShape::Binary, Anchor::Output),
                LoadBinding::XY,
                Source::Vector(x),
                Source::Vector(y.cast_const()),
                y,
                len,
            )
        }
    }

    #[inline(always)]
    pub(super) unsafe fn scalar_into<T: Element, K: MapOp<In = T, Out = T> + Default>(
        microarch: Microarchitecture,
        x: T,
        y: *mut T,
        len: usize,
    ) -> Result<()> {
        check_pointer(y.cast_const(), "y")?;
        // SAFETY: caller contract.
        unsafe {
            map(
                microarch,
                &K::default(),
                (KernelShape::Unary, Anchor::Output),
                LoadBinding::Y,
                Source::Broadcast(x),
                Source::Vector(y.cast_const()),
                y,
                len,
            )
        }
    }

    /// Narrow elements widened per pass of the mixed-width bodies.
    const STAGE: usize = 256;

    /// Widens `y` one stage at a time and runs the binary schedule on each
    /// stage. `z` may equal `x`.
    #[inline(always)]
    unsafe fn staged<T: Element, N: Narrow<T>, K: MapOp<In = T, Out = T>>(
        microarch: Microarchitecture,
        op: &K,
        x: *const T,
        y: *const N,
        z: *mut T,
        len: usize,
    ) -> Result<()> {
        let mut stage = [T::ZERO; STAGE];
        let mut done = 0;
        while done < len {
            let count = STAGE.min(len - done);
            for (i, slot) in stage[..count].iter_mut().enumerate() {
                // SAFETY: done + i < len.
                *slot = unsafe { y.add(done + i).read() }.into();
            }
            // SAFETY: caller contract; `stage` holds `count` widened elements.
            unsafe {
                map(
                    microarch,
                    op,
                    (KernelShape::Binary, Anchor::Output),
                    LoadBinding::XY,
                    Source::Vector(x.add(done)),
                    Source::Vector(stage.as_ptr()),
                    z.add(done),
                    count,
                )?;
            }
            done += count;
        }
        Ok(())
    }

    #[inline(always)]
    pub(super) unsafe fn mixed_binary<T: Element, N: Narrow<T>, K: MapOp<In = T, Out = T> + Default>(
        microarch: Microarchitecture,
        x: *const T,
        y: *const N,
        z: *mut T,
        len: usize,
    ) -> Result<()> {
        check_pointer(x, "x")?;
        check_pointer(y, "y")?;
        check_pointer(z.cast_const(), "z")?;
        // SAFETY: caller contract.
        unsafe { staged(microarch, &K::default(), x, y, z, len) }
    }

    #[inline(always)]
    pub(super) unsafe fn mixed_in_place<T: Element, N: Narrow<T>, K: MapOp<In = T, Out = T> + Default>(
        microarch: Microarchitecture,
        x: *mut T,
        y: *const N,
        len: usize,
    ) -> Result<()> {
        check_pointer(x.cast_const(), "x")?;
        check_pointer(y, "y")?;
        // SAFETY: caller contract.
        unsafe { staged(microarch, &K::default(), x.cast_const(), y, x, len) }
    }

    #[inline(always)]
    pub(super) unsafe fn in_place_unary<T: Element, K: MapOp<In = T, Out = T> + Default>(
        microarch: Microarchitecture,
        v: *mut T,
        len: usize,
    ) -> Result<()> {
        check_pointer(v.cast_const(), "v")?;
        // SAFETY: caller contract.
        unsafe {
            map(
                microarch,
                &K::default(),
                unary_shape::<K>(),
                LoadBinding::X,
                Source::Vector(v.cast_const()),
                Source::Broadcast(T::ZERO),
                v,
                len,
            )
        }
    }

    #[inline(always)]
    pub(super) unsafe fn unary<T: Element, K: MapOp<In = T, Out = T> + Default>(
        microarch: Microarchitecture,
        x: *const T,
        y: *mut T,
        len: usize,
    ) -> Result<()> {
        check_pointer(x, "x")?;
        check_pointer(y.cast_const(), "y")?;
        // SAFETY: caller contract.
        unsafe {
            map(
                microarch,
                &K::default(),
                unary_shape::<K>(),
                LoadBinding::X,
                Source::Vector(x),
                Source::Broadcast(T::ZERO),
                y,
                len,
            )
        }
    }

    #[inline(always)]
    pub(super) unsafe fn reduce<T: Element, K: ReduceOp<In = T, Acc = T> + Default>(
        microarch: Microarchitecture,
        v: *const T,
        result: *mut T,
        len: usize,
    ) -> Result<()> {
        check_pointer(v, "v")?;
        check_pointer(result.cast_const(), "result")?;
        // SAFETY: caller contract.
        let acc = unsafe {
            fold(microarch, &K::default(), KernelShape::Reduce, v, Source::Broadcast(T::ZERO), len)?
        };
        // SAFETY: `result` validated above.
        unsafe { result.write(acc) };
        Ok(())
    }

    #[inline(always)]
    pub(super) unsafe fn min_max<T: Element>(
        microarch: Microarchitecture,
        v: *const T,
        minimum: *mut T,
        maximum: *mut T,
        len: usize,
    ) -> Result<()> {
        check_pointer(v, "v")?;
        check_pointer(minimum.cast_const(), "minimum")?;
        check_pointer(maximum.cast_const(), "maximum")?;
        let op = MinMaxReduce::<T>::default();
        // SAFETY: caller contract.
        let (lo, hi) =
            unsafe { fold(microarch, &op, KernelShape::Reduce, v, Source::Broadcast(T::ZERO), len)? };
        // SAFETY: outputs validated above.
        unsafe {
            minimum.write(lo);
            maximum.write(hi);
        }
        Ok(())
    }

    #[inline(always)]
    pub(super) unsafe fn dot<T: Element, K: ReduceOp<In = T, Acc = T> + Default>(
        microarch: Microarchitecture,
        x: *const T,
        y: *const T,
        result: *mut T,
        len: usize,
    ) -> Result<()> {
        check_pointer(x, "x")?;
        check_pointer(y, "y")?;
        check_pointer(result.cast_const(), "result")?;
        // SAFETY: caller contract.
        let acc =
            unsafe { fold(microarch, &K::default(), KernelShape::DotReduce, x, Source::Vector(y), len)? };
        // SAFETY: `result` validated above.
        unsafe { result.write(acc) };
        Ok(())
    }

    #[inline(always)]
    pub(super) unsafe fn polynomial<T: Element>(
        microarch: Microarchitecture,
        coef: *const T,
        x: *const T,
        y: *mut T,
        coef_count: usize,
        len: usize,
    ) -> Result<()> {
        scalar::check_polynomial(coef, x, y, coef_count)?;
        // SAFETY: caller contract, count checked non-zero.
        unsafe {
            let op = Polynomial::from_raw(coef, coef_count);
            map(
                microarch,
                &op,
                unary_shape::<Polynomial<T>>(),
                LoadBinding::X,
                Source::Vector(x),
                Source::Broadcast(T::ZERO),
                y,
                len,
            )
        }
    }
}

/// Instantiates every routine family for one target.
macro_rules! target_module {
    ($(#[$meta:meta])* $name:ident, $microarch:ident, $features:tt) => {
        $(#[$meta])*
        pub mod $name {
            use super::*;

            /// Schedule target of this module.
            pub const MICROARCH: Microarchitecture = Microarchitecture::$microarch;

            /// # Safety
            ///
            /// The CPU must support this target's features; pointers as for
            /// [`scalar::binary`].
            #[target_feature(enable = $features)]
            pub unsafe fn binary<K: MapOp + Default>(
                x: *const K::In,
                y: *const K::In,
                z: *mut K::Out,
                len: usize,
            ) -> Result<()> {
                // SAFETY: forwarded caller contract.
                unsafe { body::binary::<K>(MICROARCH, x, y, z, len) }
            }

            /// # Safety
            ///
            /// See [`binary`].
            #[target_feature(enable = $features)]
            pub unsafe fn vector_scalar<K: MapOp + Default>(
                x: *const K::In,
                y: K::In,
                z: *mut K::Out,
                len: usize,
            ) -> Result<()> {
                // SAFETY: forwarded caller contract.
                unsafe { body::vector_scalar::<K>(MICROARCH, x, y, z, len) }
            }

            /// # Safety
            ///
            /// See [`binary`].
            #[target_feature(enable = $features)]
            pub unsafe fn scalar_vector<K: MapOp + Default>(
                x: K::In,
                y: *const K::In,
                z: *mut K::Out,
                len: usize,
            ) -> Result<()> {
                // SAFETY: forwarded caller contract.
                unsafe { body::scalar_vector::<K>(MICROARCH, x, y, z, len) }
            }

            /// # Safety
            ///
            /// See [`binary`].
            #[target_feature(enable = $features)]
            pub unsafe fn in_place<T: Element, K: MapOp<In = T, Out = T> + Default>(
                x: *mut T,
                y: *const T,
                len: usize,
            ) -> Result<()> {
                // SAFETY: forwarded caller contract.
                unsafe { body::in_place::<T, K>(MICROARCH, x, y, len) }
            }

            /// # Safety
            ///
            /// See [`binary`].
            #[target_feature(enable = $features)]
            pub unsafe fn in_place_scalar<T: Element, K: MapOp<In = T, Out = T> + Default>(
                x: *mut T,
                y: T,
                len: usize,
            ) -> Result<()> {
                // SAFETY: forwarded caller contract.
                unsafe { body::in_place_scalar::<T, K>(MICROARCH, x, y, len) }
            }

            /// # Safety
            ///
            /// See [`binary`].
            #[target_feature(enable = $features)]
            pub unsafe fn vector_into<T: Element, K: MapOp<In = T, Out = T> + Default>(
                x: *const T,
                y: *mut T,
                len: usize,
            ) -> Result<()> {
                // SAFETY: forwarded caller contract.
                unsafe { body::vector_into::<T, K>(MICROARCH, x, y, len) }
            }

            /// # Safety
            ///
            /// See [`binary`].
            #[target_feature(enable = $features)]
            pub unsafe fn scalar_into<T: Element, K: MapOp<In = T, Out = T> + Default>(
                x: T,
                y: *mut T,
                len: usize,
            ) -> Result<()> {
                // SAFETY: forwarded caller contract.
                unsafe { body::scalar_into::<T, K>(MICROARCH, x, y, len) }
            }

            /// # Safety
            ///
            /// See [`binary`].
            #[target_feature(enable = $features)]
            pub unsafe fn mixed_binary<T: Element, N: Narrow<T>, K: MapOp<In = T, Out = T> + Default>(
                x: *const T,
                y: *const N,
                z: *mut T,
                len: usize,
            ) -> Result<()> {
                // SAFETY: forwarded caller contract.
                unsafe { body::mixed_binary::<T, N, K>(MICROARCH, x, y, z, len) }
            }

            /// # Safety
            ///
            /// See [`binary`].
            #[target_feature(enable = $features)]
            pub unsafe fn mixed_in_place<T: Element, N: Narrow<T>, K: MapOp<In = T, Out = T> + Default>(
                x: *mut T,
                y: *const N,
                len: usize,
            ) -> Result<()> {
                // SAFETY: forwarded caller contract.
                unsafe { body::mixed_in_place::<T, N, K>(MICROARCH, x, y, len) }
            }

            /// # Safety
            ///
            /// See [`binary`].
            #[target_feature(enable = $features)]
            pub unsafe fn in_place_unary<T: Element, K: MapOp<In = T, Out = T> + Default>(
                v: *mut T,
                len: usize,
            ) -> Result<()> {
                // SAFETY: forwarded caller contract.
                unsafe { body::in_place_unary::<T, K>(MICROARCH, v, len) }
            }

            /// # Safety
            ///
            /// See [`binary`].
            #[target_feature(enable = $features)]
            pub unsafe fn unary<T: Element, K: MapOp<In = T, Out = T> + Default>(
                x: *const T,
                y: *mut T,
                len: usize,
            ) -> Result<()> {
                // SAFETY: forwarded caller contract.
                unsafe { body::unary::<T, K>(MICROARCH, x, y, len) }
            }

            /// # Safety
            ///
            /// See [`binary`].
            #[target_feature(enable = $features)]
            pub unsafe fn reduce<T: Element, K: ReduceOp<In = T, Acc = T> + Default>(
                v: *const T,
                result: *mut T,
                len: usize,
            ) -> Result<()> {
                // SAFETY: forwarded caller contract.
                unsafe { body::reduce::<T, K>(MICROARCH, v, result, len) }
            }

            /// # Safety
            ///
            /// See [`binary`].
            #[target_feature(enable = $features)]
            pub unsafe fn min_max<T: Element>(
                v: *const T,
                minimum: *mut T,
                maximum: *mut T,
                len: usize,
            ) -> Result<()> {
                // SAFETY: forwarded caller contract.
                unsafe { body::min_max::<T>(MICROARCH, v, minimum, maximum, len) }
            }

            /// # Safety
            ///
            /// See [`binary`].
            #[target_feature(enable = $features)]
            pub unsafe fn dot<T: Element, K: ReduceOp<In = T, Acc = T> + Default>(
                x: *const T,
                y: *const T,
                result: *mut T,
                len: usize,
            ) -> Result<()> {
                // SAFETY: forwarded caller contract.
                unsafe { body::dot::<T, K>(MICROARCH, x, y, result, len) }
            }

            /// # Safety
            ///
            /// See [`binary`].
            #[target_feature(enable = $features)]
            pub unsafe fn polynomial<T: Element>(
                coef: *const T,
                x: *const T,
                y: *mut T,
                coef_count: usize,
                len: usize,
            ) -> Result<()> {
                // SAFETY: forwarded caller contract.
                unsafe { body::polynomial::<T>(MICROARCH, coef, x, y, coef_count, len) }
            }
        }
    };
}

target_module!(
    /// Intel Haswell: AVX2 + FMA3, 256-bit integer and float registers.
    #[cfg(target_arch = "x86_64")]
    haswell, Haswell, "avx2,fma"
);
target_module!(
    /// AMD Bulldozer: AVX, 128-bit integer pipes.
    #[cfg(target_arch = "x86_64")]
    bulldozer, Bulldozer, "avx"
);
target_module!(
    /// Intel Sandy Bridge: AVX floats, SSE integers.
    #[cfg(target_arch = "x86_64")]
    sandybridge, SandyBridge, "avx"
);
target_module!(
    /// Intel Nehalem: SSE4.2.
    #[cfg(target_arch = "x86_64")]
    nehalem, Nehalem, "sse4.2,popcnt"
);
target_module!(
    /// AMD K10: SSE3 (SSE4A is not a stable target feature).
    #[cfg(target_arch = "x86_64")]
    k10, K10, "sse3"
);
target_module!(
    /// ARM Cortex-A15: NEON with VFPv4.
    #[cfg(target_arch = "aarch64")]
    cortex_a15, CortexA15, "neon"
);
target_module!(
    /// ARM Cortex-A9: NEON.
    #[cfg(target_arch = "aarch64")]
    cortex_a9, CortexA9, "neon"
);

/// Generates the entry list and the full table builder of one family.
macro_rules! family {
    (
        $(#[$meta:meta])*
        $entries:ident, $table:ident, $routine:ident,
        <$($g:ident: $bound:path),*>, [$($arg:ty),*], $fn_type:ty
    ) => {
        $(#[$meta])*
        #[must_use]
        pub fn $entries<$($g: $bound),*>() -> Vec<ImplementationDescriptor<$fn_type>> {
            #[allow(unused_mut)]
            let mut entries = Vec::new();
            #[cfg(target_arch = "x86_64")]
            entries.extend([
                ImplementationDescriptor::specialized(
                    haswell::$routine::<$($arg),*> as $fn_type,
                    requirements::HASWELL,
                    haswell::MICROARCH,
                    PIPELINED_VARIANT,
                ),
                ImplementationDescriptor::specialized(
                    bulldozer::$routine::<$($arg),*> as $fn_type,
                    requirements::BULLDOZER,
                    bulldozer::MICROARCH,
                    PIPELINED_VARIANT,
                ),
                ImplementationDescriptor::specialized(
                    sandybridge::$routine::<$($arg),*> as $fn_type,
                    requirements::SANDYBRIDGE,
                    sandybridge::MICROARCH,
                    PIPELINED_VARIANT,
                ),
                ImplementationDescriptor::specialized(
                    nehalem::$routine::<$($arg),*> as $fn_type,
                    requirements::NEHALEM,
                    nehalem::MICROARCH,
                    PIPELINED_VARIANT,
                ),
                ImplementationDescriptor::specialized(
                    k10::$routine::<$($arg),*> as $fn_type,
                    requirements::K10,
                    k10::MICROARCH,
                    PIPELINED_VARIANT,
                ),
            ]);
            #[cfg(target_arch = "aarch64")]
            entries.extend([
                ImplementationDescriptor::specialized(
                    cortex_a15::$routine::<$($arg),*> as $fn_type,
                    requirements::CORTEX_A15,
                    cortex_a15::MICROARCH,
                    PIPELINED_VARIANT,
                ),
                ImplementationDescriptor::specialized(
                    cortex_a9::$routine::<$($arg),*> as $fn_type,
                    requirements::CORTEX_A9,
                    cortex_a9::MICROARCH,
                    PIPELINED_VARIANT,
                ),
            ]);
            entries
        }

        /// Pipelined entries followed by the Default routine.
        #[must_use]
        pub fn $table<$($g: $bound),*>() -> DispatchTable<$fn_type> {
            DispatchTable::new($entries::<$($arg),*>(), scalar::$routine::<$($arg),*> as $fn_type)
        }
    };
}

/// `MapOp` usable as a table kernel.
pub trait MapKernel: MapOp + Default {}
impl<K: MapOp + Default> MapKernel for K {}

/// Same-type `MapOp` for in-place and unary tables.
pub trait SameTypeMap<T>: MapOp<In = T, Out = T> + Default {}
impl<T, K: MapOp<In = T, Out = T> + Default> SameTypeMap<T> for K {}

/// Same-type `ReduceOp` for reduction tables.
pub trait SameTypeReduce<T>: ReduceOp<In = T, Acc = T> + Default {}
impl<T, K: ReduceOp<In = T, Acc = T> + Default> SameTypeReduce<T> for K {}

family!(
    /// Pipelined `z = f(x, y)` entries.
    binary_entries, binary_table, binary, <K: MapKernel>, [K], BinaryFn<K::In, K::Out>
);
family!(
    /// Pipelined `z = f(x, scalar)` entries.
    vector_scalar_entries, vector_scalar_table, vector_scalar,
    <K: MapKernel>, [K], VectorScalarFn<K::In, K::Out>
);
family!(
    /// Pipelined `z = f(scalar, y)` entries.
    scalar_vector_entries, scalar_vector_table, scalar_vector,
    <K: MapKernel>, [K], ScalarVectorFn<K::In, K::Out>
);
family!(
    /// Pipelined `x = f(x, y)` entries.
    in_place_entries, in_place_table, in_place,
    <T: Element, K: SameTypeMap<T>>, [T, K], InPlaceFn<T>
);
family!(
    /// Pipelined `x = f(x, scalar)` entries.
    in_place_scalar_entries, in_place_scalar_table, in_place_scalar,
    <T: Element, K: SameTypeMap<T>>, [T, K], InPlaceScalarFn<T>
);
family!(
    /// Pipelined `y = f(x, y)` entries.
    vector_into_entries, vector_into_table, vector_into,
    <T: Element, K: SameTypeMap<T>>, [T, K], VectorIntoFn<T>
);
family!(
    /// Pipelined `y = f(scalar, y)` entries.
    scalar_into_entries, scalar_into_table, scalar_into,
    <T: Element, K: SameTypeMap<T>>, [T, K], ScalarIntoFn<T>
);
family!(
    /// Pipelined `z = f(x, widen(y))` entries.
    mixed_binary_entries, mixed_binary_table, mixed_binary,
    <T: Element, N: Narrow<T>, K: SameTypeMap<T>>, [T, N, K], MixedBinaryFn<T, N>
);
family!(
    /// Pipelined `x = f(x, widen(y))` entries.
    mixed_in_place_entries, mixed_in_place_table, mixed_in_place,
    <T: Element, N: Narrow<T>, K: SameTypeMap<T>>, [T, N, K], MixedInPlaceFn<T, N>
);
family!(
    /// Pipelined `v = f(v)` entries.
    in_place_unary_entries, in_place_unary_table, in_place_unary,
    <T: Element, K: SameTypeMap<T>>, [T, K], InPlaceUnaryFn<T>
);
family!(
    /// Pipelined `y = f(x)` entries.
    unary_entries, unary_table, unary, <T: Element, K: SameTypeMap<T>>, [T, K], UnaryFn<T>
);
family!(
    /// Pipelined `*result = fold(v)` entries.
    reduce_entries, reduce_table, reduce, <T: Element, K: SameTypeReduce<T>>, [T, K], ReduceFn<T>
);
family!(
    /// Pipelined min/max entries.
    min_max_entries, min_max_table, min_max, <T: Element>, [T], MinMaxFn<T>
);
family!(
    /// Pipelined `*result = fold(x, y)` entries.
    dot_entries, dot_table, dot, <T: Element, K: SameTypeReduce<T>>, [T, K], DotFn<T>
);
family!(
    /// Pipelined polynomial entries.
    polynomial_entries, polynomial_table, polynomial, <T: Element>, [T], PolynomialFn<T>
);

#[cfg(test)]
#[path = "targets_tests.rs"]
mod targets_tests;

//! Public kernels.
//!
//! Every kernel has three faces:
//! - a `'static` [`Dispatcher`](crate::dispatch::Dispatcher) named after its identity (`ADD_V32F_V32F_V32F`),
//!   carrying the [`KernelSpec`](crate::kernel_spec::KernelSpec) and resolving once per process
//! - a safe slice function (`core::add_v32f_v32f_v32f`) that asserts equal
//!   lengths and returns the routine's [`Result`](crate::error::Result)
//! - an `unsafe` raw-pointer function with the same name in [`raw`], with
//!   the full validation contract: null and misaligned pointers are
//!   rejected before any memory is touched
//!
//! [`catalog`] lists every kernel; [`init`] forces all of them to resolve.

use crate::dispatch::{init_entries, InitReport, KernelEntry};

/// Declares a kernel's dispatcher with its spec.
macro_rules! dispatcher {
    (
        $static_:ident: $fn_type:ty = $area:literal $function:literal
        in [$($input:expr),*] out [$($output:expr),*] counts [$($count:expr),*]
        length $length:expr, table $build:expr
    ) => {
        #[doc = concat!("Dispatcher of `", $area, "_", $function, "`.")]
        pub static $static_: Dispatcher<$fn_type> = {
            static SPEC: KernelSpec = KernelSpec {
                area: $area,
                function: $function,
                inputs: &[$($input),*],
                outputs: &[$($output),*],
                counts: &[$($count),*],
                length: $length,
            };
            Dispatcher::new(&SPEC, $build)
        };
    };
}

/// `z = f(x, y)`, same-type or widening.
macro_rules! binary_kernels {
    (raw $raw:ident, entries $entries:ident; $(
        $name:ident, $static_:ident: $function:literal $op:ty, $in:ty => $out:ty;
    )*) => {
        $(
            dispatcher! {
                $static_: BinaryFn<$in, $out> = "Core" $function
                in [
                    Argument::vector("x", <$in as Element>::TYPE),
                    Argument::vector("y", <$in as Element>::TYPE)
                ]
                out [Argument::vector("z", <$out as Element>::TYPE)]
                counts []
                length Count::any("length"), table targets::binary_table::<$op>
            }

            #[doc = concat!("`z[i] = ", $function, "(x[i], y[i])`.")]
            ///
            /// # Panics
            ///
            /// Panics if the slice lengths differ.
            pub fn $name(x: &[$in], y: &[$in], z: &mut [$out]) -> Result<()> {
                assert_eq!(x.len(), y.len(), "Vector dimensions must match");
                assert_eq!(x.len(), z.len(), "Vector dimensions must match");
                // SAFETY: slices give aligned pointers valid for their length.
                unsafe { ($static_.get())(x.as_ptr(), y.as_ptr(), z.as_mut_ptr(), z.len()) }
            }
        )*

        #[doc(hidden)]
        pub mod $raw {
            use super::*;
            $(
                #[doc = concat!("Raw `", $function, "`.")]
                ///
                /// # Safety
                ///
                /// `x` and `y` valid for `length` reads, `z` for `length`
                /// writes. `z` may equal an input but not partially overlap it.
                pub unsafe fn $name(x: *const $in, y: *const $in, z: *mut $out, length: usize) -> Result<()> {
                    // SAFETY: forwarded caller contract.
                    unsafe { ($static_.get())(x, y, z, length) }
                }
            )*
        }

        pub(crate) static $entries: &[&dyn KernelEntry] = &[$(&$static_),*];
    };
}

/// `z = f(x, scalar)`.
macro_rules! vector_scalar_kernels {
    (raw $raw:ident, entries $entries:ident; $(
        $name:ident, $static_:ident: $function:literal $op:ty, $t:ty;
    )*) => {
        $(
            dispatcher! {
                $static_: VectorScalarFn<$t, $t> = "Core" $function
                in [
                    Argument::vector("x", <$t as Element>::TYPE),
                    Argument::scalar("y", <$t as Element>::TYPE)
                ]
                out [Argument::vector("z", <$t as Element>::TYPE)]
                counts []
                length Count::any("length"), table targets::vector_scalar_table::<$op>
            }

            #[doc = concat!("`z[i] = ", $function, "(x[i], y)`.")]
            ///
            /// # Panics
            ///
            /// Panics if the slice lengths differ.
            pub fn $name(x: &[$t], y: $t, z: &mut [$t]) -> Result<()> {
                assert_eq!(x.len(), z.len(), "Vector dimensions must match");
                // SAFETY: slices give aligned pointers valid for their length.
                unsafe { ($static_.get())(x.as_ptr(), y, z.as_mut_ptr(), z.len()) }
            }
        )*

        #[doc(hidden)]
        pub mod $raw {
            use super::*;
            $(
                #[doc = concat!("Raw `", $function, "` with a scalar second operand.")]
                ///
                /// # Safety
                ///
                /// `x` valid for `length` reads, `z` for `length` writes.
                pub unsafe fn $name(x: *const $t, y: $t, z: *mut $t, length: usize) -> Result<()> {
                    // SAFETY: forwarded caller contract.
                    unsafe { ($static_.get())(x, y, z, length) }
                }
            )*
        }

        pub(crate) static $entries: &[&dyn KernelEntry] = &[$(&$static_),*];
    };
}

/// `z = f(scalar, y)`.
macro_rules! scalar_vector_kernels {
    (raw $raw:ident, entries $entries:ident; $(
        $name:ident, $static_:ident: $function:literal $op:ty, $t:ty;
    )*) => {
        $(
            dispatcher! {
                $static_: ScalarVectorFn<$t, $t> = "Core" $function
                in [
                    Argument::scalar("x", <$t as Element>::TYPE),
                    Argument::vector("y", <$t as Element>::TYPE)
                ]
                out [Argument::vector("z", <$t as Element>::TYPE)]
                counts []
                length Count::any("length"), table targets::scalar_vector_table::<$op>
            }

            #[doc = concat!("`z[i] = ", $function, "(x, y[i])`.")]
            ///
            /// # Panics
            ///
            /// Panics if the slice lengths differ.
            pub fn $name(x: $t, y: &[$t], z: &mut [$t]) -> Result<()> {
                assert_eq!(y.len(), z.len(), "Vector dimensions must match");
                // SAFETY: slices give aligned pointers valid for their length.
                unsafe { ($static_.get())(x, y.as_ptr(), z.as_mut_ptr(), z.len()) }
            }
        )*

        #[doc(hidden)]
        pub mod $raw {
            use super::*;
            $(
                #[doc = concat!("Raw `", $function, "` with a scalar first operand.")]
                ///
                /// # Safety
                ///
                /// `y` valid for `length` reads, `z` for `length` writes.
                pub unsafe fn $name(x: $t, y: *const $t, z: *mut $t, length: usize) -> Result<()> {
                    // SAFETY: forwarded caller contract.
                    unsafe { ($static_.get())(x, y, z, length) }
                }
            )*
        }

        pub(crate) static $entries: &[&dyn KernelEntry] = &[$(&$static_),*];
    };
}

/// `x = f(x, y)` and `x = f(x, scalar)`; the `vector_into` and
/// `scalar_into` kinds overwrite the second operand instead: `y = f(x, y)`.
macro_rules! in_place_kernels {
    (raw $raw:ident, entries $entries:ident; $(
        $name:ident, $static_:ident: $function:literal $op:ty, $t:ty, $kind:ident;
    )*) => {
        $(
            in_place_kernels!(@one $name, $static_, $function, $op, $t, $kind);
        )*

        #[doc(hidden)]
        pub mod $raw {
            use super::*;
            $(
                in_place_kernels!(@raw $name, $static_, $function, $t, $kind);
            )*
        }

        pub(crate) static $entries: &[&dyn KernelEntry] = &[$(&$static_),*];
    };

    (@one $name:ident, $static_:ident, $function:literal, $op:ty, $t:ty, vector) => {
        dispatcher! {
            $static_: InPlaceFn<$t> = "Core" $function
            in [
                Argument::vector("x", <$t as Element>::TYPE).in_place(),
                Argument::vector("y", <$t as Element>::TYPE)
            ]
            out [Argument::vector("x", <$t as Element>::TYPE).in_place()]
            counts []
            length Count::any("length"), table targets::in_place_table::<$t, $op>
        }

        #[doc = concat!("`x[i] = ", $function, "(x[i], y[i])` in place.")]
        ///
        /// # Panics
        ///
        /// Panics if the slice lengths differ.
        pub fn $name(x: &mut [$t], y: &[$t]) -> Result<()> {
            assert_eq!(x.len(), y.len(), "Vector dimensions must match");
            // SAFETY: slices give aligned pointers valid for their length.
            unsafe { ($static_.get())(x.as_mut_ptr(), y.as_ptr(), x.len()) }
        }
    };

    (@one $name:ident, $static_:ident, $function:literal, $op:ty, $t:ty, scalar) => {
        dispatcher! {
            $static_: InPlaceScalarFn<$t> = "Core" $function
            in [
                Argument::vector("x", <$t as Element>::TYPE).in_place(),
                Argument::scalar("y", <$t as Element>::TYPE)
            ]
            out [Argument::vector("x", <$t as Element>::TYPE).in_place()]
            counts []
            length Count::any("length"), table targets::in_place_scalar_table::<$t, $op>
        }

        #[doc = concat!("`x[i] = ", $function, "(x[i], y)` in place.")]
        pub fn $name(x: &mut [$t], y: $t) -> Result<()> {
            // SAFETY: the slice gives an aligned pointer valid for its length.
            unsafe { ($static_.get())(x.as_mut_ptr(), y, x.len()) }
        }
    };

    (@one $name:ident, $static_:ident, $function:literal, $op:ty, $t:ty, vector_into) => {
        dispatcher! {
            $static_: VectorIntoFn<$t> = "Core" $function
            in [
                Argument::vector("x", <$t as Element>::TYPE),
                Argument::vector("y", <$t as Element>::TYPE).in_place()
            ]
            out [Argument::vector("y", <$t as Element>::TYPE).in_place()]
            counts []
            length Count::any("length"), table targets::vector_into_table::<$t, $op>
        }

        #[doc = concat!("`y[i] = ", $function, "(x[i], y[i])` in place.")]
        ///
        /// # Panics
        ///
        /// Panics if the slice lengths differ.
        pub fn $name(x: &[$t], y: &mut [$t]) -> Result<()> {
            assert_eq!(x.len(), y.len(), "Vector dimensions must match");
            // SAFETY: slices give aligned pointers valid for their length.
            unsafe { ($static_.get())(x.as_ptr(), y.as_mut_ptr(), y.len()) }
        }
    };

    (@one $name:ident, $static_:ident, $function:literal, $op:ty, $t:ty, scalar_into) => {
        dispatcher! {
            $static_: ScalarIntoFn<$t> = "Core" $function
            in [
                Argument::scalar("x", <$t as Element>::TYPE),
                Argument::vector("y", <$t as Element>::TYPE).in_place()
            ]
            out [Argument::vector("y", <$t as Element>::TYPE).in_place()]
            counts []
            length Count::any("length"), table targets::scalar_into_table::<$t, $op>
        }

        #[doc = concat!("`y[i] = ", $function, "(x, y[i])` in place.")]
        pub fn $name(x: $t, y: &mut [$t]) -> Result<()> {
            // SAFETY: the slice gives an aligned pointer valid for its length.
            unsafe { ($static_.get())(x, y.as_mut_ptr(), y.len()) }
        }
    };

    (@raw $name:ident, $static_:ident, $function:literal, $t:ty, vector_into) => {
        #[doc = concat!("Raw `", $function, "` into the second operand.")]
        ///
        /// # Safety
        ///
        /// `x` valid for `length` reads, `y` for `length` reads and writes.
        pub unsafe fn $name(x: *const $t, y: *mut $t, length: usize) -> Result<()> {
            // SAFETY: forwarded caller contract.
            unsafe { ($static_.get())(x, y, length) }
        }
    };

    (@raw $name:ident, $static_:ident, $function:literal, $t:ty, scalar_into) => {
        #[doc = concat!("Raw `", $function, "` of a scalar into the second operand.")]
        ///
        /// # Safety
        ///
        /// `y` valid for `length` reads and writes.
        pub unsafe fn $name(x: $t, y: *mut $t, length: usize) -> Result<()> {
            // SAFETY: forwarded caller contract.
            unsafe { ($static_.get())(x, y, length) }
        }
    };

    (@raw $name:ident, $static_:ident, $function:literal, $t:ty, vector) => {
        #[doc = concat!("Raw in-place `", $function, "`.")]
        ///
        /// # Safety
        ///
        /// `x` valid for `length` reads and writes, `y` for `length` reads.
        pub unsafe fn $name(x: *mut $t, y: *const $t, length: usize) -> Result<()> {
            // SAFETY: forwarded caller contract.
            unsafe { ($static_.get())(x, y, length) }
        }
    };

    (@raw $name:ident, $static_:ident, $function:literal, $t:ty, scalar) => {
        #[doc = concat!("Raw in-place `", $function, "` with a scalar operand.")]
        ///
        /// # Safety
        ///
        /// `x` valid for `length` reads and writes.
        pub unsafe fn $name(x: *mut $t, y: $t, length: usize) -> Result<()> {
            // SAFETY: forwarded caller contract.
            unsafe { ($static_.get())(x, y, length) }
        }
    };
}

/// Mixed-width `z = f(x, y)` where `y` is narrower than `x` and `z`.
///
/// Vector second operands are widened by the routine; scalar ones are
/// widened at the call and dispatched through the same-type tables.
macro_rules! mixed_kernels {
    (raw $raw:ident, entries $entries:ident; $(
        $name:ident, $static_:ident: $function:literal $op:ty, $t:ty, $n:ty, $kind:ident;
    )*) => {
        $(
            mixed_kernels!(@one $name, $static_, $function, $op, $t, $n, $kind);
        )*

        #[doc(hidden)]
        pub mod $raw {
            use super::*;
            $(
                mixed_kernels!(@raw $name, $static_, $function, $t, $n, $kind);
            )*
        }

        pub(crate) static $entries: &[&dyn KernelEntry] = &[$(&$static_),*];
    };

    (@one $name:ident, $static_:ident, $function:literal, $op:ty, $t:ty, $n:ty, vector) => {
        dispatcher! {
            $static_: MixedBinaryFn<$t, $n> = "Core" $function
            in [
                Argument::vector("x", <$t as Element>::TYPE),
                Argument::vector("y", <$n as Element>::TYPE)
            ]
            out [Argument::vector("z", <$t as Element>::TYPE)]
            counts []
            length Count::any("length"), table targets::mixed_binary_table::<$t, $n, $op>
        }

        #[doc = concat!("`z[i] = ", $function, "(x[i], y[i])` with `y` widened.")]
        ///
        /// # Panics
        ///
        /// Panics if the slice lengths differ.
        pub fn $name(x: &[$t], y: &[$n], z: &mut [$t]) -> Result<()> {
            assert_eq!(x.len(), y.len(), "Vector dimensions must match");
            assert_eq!(x.len(), z.len(), "Vector dimensions must match");
            // SAFETY: slices give aligned pointers valid for their length.
            unsafe { ($static_.get())(x.as_ptr(), y.as_ptr(), z.as_mut_ptr(), z.len()) }
        }
    };

    (@one $name:ident, $static_:ident, $function:literal, $op:ty, $t:ty, $n:ty, scalar) => {
        dispatcher! {
            $static_: VectorScalarFn<$t, $t> = "Core" $function
            in [
                Argument::vector("x", <$t as Element>::TYPE),
                Argument::scalar("y", <$n as Element>::TYPE)
            ]
            out [Argument::vector("z", <$t as Element>::TYPE)]
            counts []
            length Count::any("length"), table targets::vector_scalar_table::<$op>
        }

        #[doc = concat!("`z[i] = ", $function, "(x[i], y)` with `y` widened.")]
        ///
        /// # Panics
        ///
        /// Panics if the slice lengths differ.
        pub fn $name(x: &[$t], y: $n, z: &mut [$t]) -> Result<()> {
            assert_eq!(x.len(), z.len(), "Vector dimensions must match");
            // SAFETY: slices give aligned pointers valid for their length.
            unsafe { ($static_.get())(x.as_ptr(), <$t>::from(y), z.as_mut_ptr(), z.len()) }
        }
    };

    (@one $name:ident, $static_:ident, $function:literal, $op:ty, $t:ty, $n:ty, in_place) => {
        dispatcher! {
            $static_: MixedInPlaceFn<$t, $n> = "Core" $function
            in [
                Argument::vector("x", <$t as Element>::TYPE).in_place(),
                Argument::vector("y", <$n as Element>::TYPE)
            ]
            out [Argument::vector("x", <$t as Element>::TYPE).in_place()]
            counts []
            length Count::any("length"), table targets::mixed_in_place_table::<$t, $n, $op>
        }

        #[doc = concat!("`x[i] = ", $function, "(x[i], y[i])` in place with `y` widened.")]
        ///
        /// # Panics
        ///
        /// Panics if the slice lengths differ.
        pub fn $name(x: &mut [$t], y: &[$n]) -> Result<()> {
            assert_eq!(x.len(), y.len(), "Vector dimensions must match");
            // SAFETY: slices give aligned pointers valid for their length.
            unsafe { ($static_.get())(x.as_mut_ptr(), y.as_ptr(), x.len()) }
        }
    };

    (@one $name:ident, $static_:ident, $function:literal, $op:ty, $t:ty, $n:ty, in_place_scalar) => {
        dispatcher! {
            $static_: InPlaceScalarFn<$t> = "Core" $function
            in [
                Argument::vector("x", <$t as Element>::TYPE).in_place(),
                Argument::scalar("y", <$n as Element>::TYPE)
            ]
            out [Argument::vector("x", <$t as Element>::TYPE).in_place()]
            counts []
            length Count::any("length"), table targets::in_place_scalar_table::<$t, $op>
        }

        #[doc = concat!("`x[i] = ", $function, "(x[i], y)` in place with `y` widened.")]
        pub fn $name(x: &mut [$t], y: $n) -> Result<()> {
            // SAFETY: the slice gives an aligned pointer valid for its length.
            unsafe { ($static_.get())(x.as_mut_ptr(), <$t>::from(y), x.len()) }
        }
    };

    (@raw $name:ident, $static_:ident, $function:literal, $t:ty, $n:ty, vector) => {
        #[doc = concat!("Raw mixed-width `", $function, "`.")]
        ///
        /// # Safety
        ///
        /// `x` and `y` valid for `length` reads, `z` for `length` writes.
        pub unsafe fn $name(x: *const $t, y: *const $n, z: *mut $t, length: usize) -> Result<()> {
            // SAFETY: forwarded caller contract.
            unsafe { ($static_.get())(x, y, z, length) }
        }
    };

    (@raw $name:ident, $static_:ident, $function:literal, $t:ty, $n:ty, scalar) => {
        #[doc = concat!("Raw mixed-width `", $function, "` with a scalar second operand.")]
        ///
        /// # Safety
        ///
        /// `x` valid for `length` reads, `z` for `length` writes.
        pub unsafe fn $name(x: *const $t, y: $n, z: *mut $t, length: usize) -> Result<()> {
            // SAFETY: forwarded caller contract.
            unsafe { ($static_.get())(x, <$t>::from(y), z, length) }
        }
    };

    (@raw $name:ident, $static_:ident, $function:literal, $t:ty, $n:ty, in_place) => {
        #[doc = concat!("Raw mixed-width in-place `", $function, "`.")]
        ///
        /// # Safety
        ///
        /// `x` valid for `length` reads and writes, `y` for `length` reads.
        pub unsafe fn $name(x: *mut $t, y: *const $n, length: usize) -> Result<()> {
            // SAFETY: forwarded caller contract.
            unsafe { ($static_.get())(x, y, length) }
        }
    };

    (@raw $name:ident, $static_:ident, $function:literal, $t:ty, $n:ty, in_place_scalar) => {
        #[doc = concat!("Raw mixed-width in-place `", $function, "` with a scalar operand.")]
        ///
        /// # Safety
        ///
        /// `x` valid for `length` reads and writes.
        pub unsafe fn $name(x: *mut $t, y: $n, length: usize) -> Result<()> {
            // SAFETY: forwarded caller contract.
            unsafe { ($static_.get())(x, <$t>::from(y), length) }
        }
    };
}

/// `*result = fold(v)`; `nonzero` kernels reject an empty array.
macro_rules! reduce_kernels {
    (raw $raw:ident, entries $entries:ident; $(
        $name:ident, $static_:ident: $function:literal $t:ty, $length:ident, table $build:expr;
    )*) => {
        $(
            dispatcher! {
                $static_: ReduceFn<$t> = "Core" $function
                in [Argument::vector("v", <$t as Element>::TYPE)]
                out [Argument::scalar("result", <$t as Element>::TYPE)]
                counts []
                length Count::$length("length"), table $build
            }

            #[doc = concat!("`", $function, "` of `v`.")]
            pub fn $name(v: &[$t]) -> Result<$t> {
                let mut result = <$t as Element>::ZERO;
                // SAFETY: the slice gives an aligned pointer valid for its length.
                unsafe { ($static_.get())(v.as_ptr(), &mut result, v.len())? };
                Ok(result)
            }
        )*

        #[doc(hidden)]
        pub mod $raw {
            use super::*;
            $(
                #[doc = concat!("Raw `", $function, "` reduction.")]
                ///
                /// # Safety
                ///
                /// `v` valid for `length` reads, `result` for one write.
                pub unsafe fn $name(v: *const $t, result: *mut $t, length: usize) -> Result<()> {
                    // SAFETY: forwarded caller contract.
                    unsafe { ($static_.get())(v, result, length) }
                }
            )*
        }

        pub(crate) static $entries: &[&dyn KernelEntry] = &[$(&$static_),*];
    };
}

/// `(*minimum, *maximum) = (min(v), max(v))`.
macro_rules! min_max_kernels {
    (raw $raw:ident, entries $entries:ident; $(
        $name:ident, $static_:ident: $t:ty;
    )*) => {
        $(
            dispatcher! {
                $static_: MinMaxFn<$t> = "Core" "MinMax"
                in [Argument::vector("v", <$t as Element>::TYPE)]
                out [
                    Argument::scalar("minimum", <$t as Element>::TYPE),
                    Argument::scalar("maximum", <$t as Element>::TYPE)
                ]
                counts []
                length Count::non_zero("length"), table targets::min_max_table::<$t>
            }

            /// Smallest and largest element of `v`, in one pass.
            pub fn $name(v: &[$t]) -> Result<($t, $t)> {
                let (mut minimum, mut maximum) = (<$t as Element>::ZERO, <$t as Element>::ZERO);
                // SAFETY: the slice gives an aligned pointer valid for its length.
                unsafe { ($static_.get())(v.as_ptr(), &mut minimum, &mut maximum, v.len())? };
                Ok((minimum, maximum))
            }
        )*

        #[doc(hidden)]
        pub mod $raw {
            use super::*;
            $(
                /// Raw `MinMax`.
                ///
                /// # Safety
                ///
                /// `v` valid for `length` reads, each output for one write.
                pub unsafe fn $name(v: *const $t, minimum: *mut $t, maximum: *mut $t, length: usize) -> Result<()> {
                    // SAFETY: forwarded caller contract.
                    unsafe { ($static_.get())(v, minimum, maximum, length) }
                }
            )*
        }

        pub(crate) static $entries: &[&dyn KernelEntry] = &[$(&$static_),*];
    };
}

/// `*result = sum(x[i] * y[i])`.
macro_rules! dot_kernels {
    (raw $raw:ident, entries $entries:ident; $(
        $name:ident, $static_:ident: $t:ty, table $build:expr;
    )*) => {
        $(
            dispatcher! {
                $static_: DotFn<$t> = "Core" "DotProduct"
                in [
                    Argument::vector("x", <$t as Element>::TYPE),
                    Argument::vector("y", <$t as Element>::TYPE)
                ]
                out [Argument::scalar("result", <$t as Element>::TYPE)]
                counts []
                length Count::any("length"), table $build
            }

            /// Dot product of `x` and `y`.
            ///
            /// # Panics
            ///
            /// Panics if the slice lengths differ.
            pub fn $name(x: &[$t], y: &[$t]) -> Result<$t> {
                assert_eq!(x.len(), y.len(), "Vector dimensions must match");
                let mut result = <$t as Element>::ZERO;
                // SAFETY: slices give aligned pointers valid for their length.
                unsafe { ($static_.get())(x.as_ptr(), y.as_ptr(), &mut result, x.len())? };
                Ok(result)
            }
        )*

        #[doc(hidden)]
        pub mod $raw {
            use super::*;
            $(
                /// Raw `DotProduct`.
                ///
                /// # Safety
                ///
                /// `x` and `y` valid for `length` reads, `result` for one write.
                pub unsafe fn $name(x: *const $t, y: *const $t, result: *mut $t, length: usize) -> Result<()> {
                    // SAFETY: forwarded caller contract.
                    unsafe { ($static_.get())(x, y, result, length) }
                }
            )*
        }

        pub(crate) static $entries: &[&dyn KernelEntry] = &[$(&$static_),*];
    };
}

/// `y = f(x)`, or `v = f(v)` for the `in_place` kind.
macro_rules! unary_kernels {
    (area $area:literal, raw $raw:ident, entries $entries:ident; $(
        $name:ident, $static_:ident: $function:literal $op:ty, $t:ty, $kind:ident;
    )*) => {
        $(
            unary_kernels!(@one $area, $name, $static_, $function, $op, $t, $kind);
        )*

        #[doc(hidden)]
        pub mod $raw {
            use super::*;
            $(
                unary_kernels!(@raw $name, $static_, $function, $t, $kind);
            )*
        }

        pub(crate) static $entries: &[&dyn KernelEntry] = &[$(&$static_),*];
    };

    (@one $area:literal, $name:ident, $static_:ident, $function:literal, $op:ty, $t:ty, vector) => {
        dispatcher! {
            $static_: UnaryFn<$t> = $area $function
            in [Argument::vector("x", <$t as Element>::TYPE)]
            out [Argument::vector("y", <$t as Element>::TYPE)]
            counts []
            length Count::any("length"), table targets::unary_table::<$t, $op>
        }

        #[doc = concat!("`y[i] = ", $function, "(x[i])`.")]
        ///
        /// # Panics
        ///
        /// Panics if the slice lengths differ.
        pub fn $name(x: &[$t], y: &mut [$t]) -> Result<()> {
            assert_eq!(x.len(), y.len(), "Vector dimensions must match");
            // SAFETY: slices give aligned pointers valid for their length.
            unsafe { ($static_.get())(x.as_ptr(), y.as_mut_ptr(), y.len()) }
        }
    };

    (@one $area:literal, $name:ident, $static_:ident, $function:literal, $op:ty, $t:ty, in_place) => {
        dispatcher! {
            $static_: InPlaceUnaryFn<$t> = $area $function
            in [Argument::vector("v", <$t as Element>::TYPE).in_place()]
            out [Argument::vector("v", <$t as Element>::TYPE).in_place()]
            counts []
            length Count::any("length"), table targets::in_place_unary_table::<$t, $op>
        }

        #[doc = concat!("`v[i] = ", $function, "(v[i])` in place.")]
        pub fn $name(v: &mut [$t]) -> Result<()> {
            // SAFETY: the slice gives an aligned pointer valid for its length.
            unsafe { ($static_.get())(v.as_mut_ptr(), v.len()) }
        }
    };

    (@raw $name:ident, $static_:ident, $function:literal, $t:ty, vector) => {
        #[doc = concat!("Raw `", $function, "`.")]
        ///
        /// # Safety
        ///
        /// `x` valid for `length` reads, `y` for `length` writes.
        /// `y` may equal `x`.
        pub unsafe fn $name(x: *const $t, y: *mut $t, length: usize) -> Result<()> {
            // SAFETY: forwarded caller contract.
            unsafe { ($static_.get())(x, y, length) }
        }
    };

    (@raw $name:ident, $static_:ident, $function:literal, $t:ty, in_place) => {
        #[doc = concat!("Raw in-place `", $function, "`.")]
        ///
        /// # Safety
        ///
        /// `v` valid for `length` reads and writes.
        pub unsafe fn $name(v: *mut $t, length: usize) -> Result<()> {
            // SAFETY: forwarded caller contract.
            unsafe { ($static_.get())(v, length) }
        }
    };
}

/// `y = sum(coef[k] * x^k)`.
macro_rules! polynomial_kernels {
    (raw $raw:ident, entries $entries:ident; $(
        $name:ident, $static_:ident: $t:ty;
    )*) => {
        $(
            dispatcher! {
                $static_: PolynomialFn<$t> = "Math" "EvaluatePolynomial"
                in [
                    Argument::vector("coef", <$t as Element>::TYPE),
                    Argument::vector("x", <$t as Element>::TYPE)
                ]
                out [Argument::vector("y", <$t as Element>::TYPE)]
                counts [Count::non_zero("coef_count")]
                length Count::any("length"), table targets::polynomial_table::<$t>
            }

            /// Evaluates the polynomial with coefficients `coef` (lowest
            /// degree first) at every `x[i]`.
            ///
            /// # Errors
            ///
            /// `InvalidArgument("coef_count")` when `coef` is empty.
            ///
            /// # Panics
            ///
            /// Panics if `x` and `y` lengths differ.
            pub fn $name(coef: &[$t], x: &[$t], y: &mut [$t]) -> Result<()> {
                assert_eq!(x.len(), y.len(), "Vector dimensions must match");
                // SAFETY: slices give aligned pointers valid for their length.
                unsafe {
                    ($static_.get())(coef.as_ptr(), x.as_ptr(), y.as_mut_ptr(), coef.len(), y.len())
                }
            }
        )*

        #[doc(hidden)]
        pub mod $raw {
            use super::*;
            $(
                /// Raw `EvaluatePolynomial`.
                ///
                /// # Safety
                ///
                /// `coef` valid for `coef_count` reads, `x` for `length`
                /// reads, `y` for `length` writes. `y` may equal `x`.
                pub unsafe fn $name(
                    coef: *const $t,
                    x: *const $t,
                    y: *mut $t,
                    coef_count: usize,
                    length: usize,
                ) -> Result<()> {
                    // SAFETY: forwarded caller contract.
                    unsafe { ($static_.get())(coef, x, y, coef_count, length) }
                }
            )*
        }

        pub(crate) static $entries: &[&dyn KernelEntry] = &[$(&$static_),*];
    };
}

pub mod core;
pub mod math;

/// Raw-pointer entry points of every kernel.
///
/// These perform the full parameter validation of the exported routines:
/// `NullPointer` and `MisalignedPointer` are returned before any memory
/// access, `InvalidArgument` for an empty array where a non-zero length is
/// required and for a zero coefficient count.
pub mod raw {
    pub use super::core::{
        binary_raw::*, dot_raw::*, in_place_raw::*, mixed_raw::*, min_max_raw::*, negate_raw::*,
        reduce_raw::*, scalar_vector_raw::*, vector_scalar_raw::*,
    };
    pub use super::math::{polynomial_raw::*, unary_raw::*};
}

#[cfg(test)]
mod kernels_tests;

/// Every public kernel, `Core` first, in declaration order.
#[must_use]
pub fn catalog() -> Vec<&'static dyn KernelEntry> {
    self::core::groups()
        .into_iter()
        .chain(math::groups())
        .flat_map(|group| group.iter().copied())
        .collect()
}

/// Finds a kernel by its identity (e.g. `Core_Add_V32fV32f_V32f`).
#[must_use]
pub fn find(identity: &str) -> Option<&'static dyn KernelEntry> {
    catalog().into_iter().find(|k| k.spec().identity() == identity)
}

/// Resolves every kernel now instead of on first call.
///
/// Optional and idempotent; returns which implementation each kernel uses.
pub fn init() -> InitReport {
    init_entries(&catalog())
}

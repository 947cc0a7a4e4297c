//! Scalar operations and their lane-batch counterparts.
//!
//! Every kernel is one [`MapOp`] or one [`ReduceOp`]. The scalar method is
//! the reference computation used by the Default routine, the alignment
//! prologue and the tail; the lane method runs on one register's worth of
//! elements inside the pipelined loop and must produce the same values.

use std::marker::PhantomData;

use crate::element::Element;
use crate::math;

/// Elementwise operation `z = f(x, y)`.
///
/// Unary operations ignore `y`.
pub trait MapOp {
    /// Input element type.
    type In: Element;
    /// Output (computation) element type.
    type Out: Element;

    /// Uses the long-latency schedule row.
    const TRANSCENDENTAL: bool = false;

    /// Reference computation of one element.
    fn scalar(&self, x: Self::In, y: Self::In) -> Self::Out;

    /// Computes one register of lanes.
    #[inline(always)]
    fn lanes(&self, x: &[Self::In], y: &[Self::In], out: &mut [Self::Out]) {
        for ((o, &a), &b) in out.iter_mut().zip(x).zip(y) {
            *o = self.scalar(a, b);
        }
    }
}

/// Fold `acc = g(acc, x, y)` over an array.
pub trait ReduceOp {
    /// Input element type.
    type In: Element;
    /// Accumulator type.
    type Acc: Copy;

    /// Result for an empty array; `None` when the length must be non-zero.
    fn empty(&self) -> Option<Self::Acc>;

    /// Starting accumulator, given the first elements.
    ///
    /// Either the identity of [`ReduceOp::accumulate`] or a value it is
    /// idempotent on, so every partial accumulator can start from it.
    fn init(&self, x: Self::In, y: Self::In) -> Self::Acc;

    /// Folds one element pair.
    fn accumulate(&self, acc: Self::Acc, x: Self::In, y: Self::In) -> Self::Acc;

    /// Merges two partial accumulators.
    fn combine(&self, a: Self::Acc, b: Self::Acc) -> Self::Acc;

    /// Folds one register of lanes into per-lane accumulators.
    #[inline(always)]
    fn accumulate_lanes(&self, acc: &mut [Self::Acc], x: &[Self::In], y: &[Self::In]) {
        for ((a, &u), &v) in acc.iter_mut().zip(x).zip(y) {
            *a = self.accumulate(*a, u, v);
        }
    }
}

macro_rules! binary_op {
    ($(#[$meta:meta])* $name:ident, |$x:ident, $y:ident| $body:expr) => {
        $(#[$meta])*
        pub struct $name<In, Out = In>(PhantomData<fn(In) -> Out>);

        impl<In, Out> Default for $name<In, Out> {
            fn default() -> Self {
                Self(PhantomData)
            }
        }

        impl<In: Element, Out: Element + From<In>> MapOp for $name<In, Out> {
            type In = In;
            type Out = Out;

            #[inline(always)]
            fn scalar(&self, x: In, y: In) -> Out {
                let $x = Out::from(x);
                let $y = Out::from(y);
                $body
            }
        }
    };
}

binary_op!(
    /// `x + y`, wrapping for integers.
    Add, |x, y| x.add_lane(y)
);
binary_op!(
    /// `x - y`, wrapping for integers.
    Subtract, |x, y| x.sub_lane(y)
);
binary_op!(
    /// `x * y`, wrapping for integers.
    Multiply, |x, y| x.mul_lane(y)
);
binary_op!(
    /// Pairwise minimum.
    Min, |x, y| x.min_lane(y)
);
binary_op!(
    /// Pairwise maximum.
    Max, |x, y| x.max_lane(y)
);
binary_op!(
    /// `-x`, wrapping for integers; `y` is ignored.
    Negate, |x, _y| x.neg_lane()
);

macro_rules! unary_math_op {
    ($(#[$meta:meta])* $name:ident, $scalar:path, $lanes:path) => {
        $(#[$meta])*
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $name;

        impl MapOp for $name {
            type In = f64;
            type Out = f64;
            const TRANSCENDENTAL: bool = true;

            #[inline(always)]
            fn scalar(&self, x: f64, _y: f64) -> f64 {
                $scalar(x)
            }

            #[inline(always)]
            fn lanes(&self, x: &[f64], _y: &[f64], out: &mut [f64]) {
                $lanes(x, out);
            }
        }
    };
}

unary_math_op!(
    /// Natural logarithm.
    Log, math::log, math::log_lanes
);
unary_math_op!(
    /// Base-e exponential.
    Exp, math::exp, math::exp_lanes
);
unary_math_op!(
    /// Sine.
    Sin, math::sin, math::sin_lanes
);
unary_math_op!(
    /// Cosine.
    Cos, math::cos, math::cos_lanes
);
unary_math_op!(
    /// Tangent.
    Tan, math::tan, math::tan_lanes
);

/// Horner evaluation of a polynomial with caller-owned coefficients.
///
/// Holds a raw pointer because the output array is written while the
/// coefficients are read and the two may share memory.
#[derive(Debug, Clone, Copy)]
pub struct Polynomial<T> {
    coefficients: *const T,
    count: usize,
}

impl<T: Element> Polynomial<T> {
    /// Wraps `count` coefficients, lowest degree first.
    ///
    /// # Safety
    ///
    /// `coefficients` must be valid for `count` reads, aligned, and stay
    /// unmodified for as long as the operation is used.
    #[must_use]
    pub unsafe fn from_raw(coefficients: *const T, count: usize) -> Self {
        Self {
            coefficients,
            count,
        }
    }

    #[inline(always)]
    fn coefficient(&self, k: usize) -> T {
        debug_assert!(k < self.count);
        // SAFETY: k < count, validity guaranteed by `from_raw`'s contract.
        unsafe { self.coefficients.add(k).read() }
    }
}

impl<T: Element> MapOp for Polynomial<T> {
    type In = T;
    type Out = T;
    const TRANSCENDENTAL: bool = true;

    #[inline(always)]
    fn scalar(&self, x: T, _y: T) -> T {
        let mut k = self.count - 1;
        let mut y = self.coefficient(k);
        while k > 0 {
            k -= 1;
            y = y.mul_lane(x).add_lane(self.coefficient(k));
        }
        y
    }

    #[inline(always)]
    fn lanes(&self, x: &[T], _y: &[T], out: &mut [T]) {
        let top = self.coefficient(self.count - 1);
        out.iter_mut().for_each(|o| *o = top);
        for k in (0..self.count - 1).rev() {
            let c = self.coefficient(k);
            for (o, &v) in out.iter_mut().zip(x) {
                *o = o.mul_lane(v).add_lane(c);
            }
        }
    }
}

macro_rules! sum_op {
    ($(#[$meta:meta])* $name:ident, |$acc:ident, $x:ident, $y:ident| $body:expr) => {
        $(#[$meta])*
        pub struct $name<T>(PhantomData<T>);

        impl<T> Default for $name<T> {
            fn default() -> Self {
                Self(PhantomData)
            }
        }

        impl<T: Element> ReduceOp for $name<T> {
            type In = T;
            type Acc = T;

            fn empty(&self) -> Option<T> {
                Some(T::ZERO)
            }

            #[inline(always)]
            fn init(&self, _x: T, _y: T) -> T {
                T::ZERO
            }

            #[inline(always)]
            fn accumulate(&self, $acc: T, $x: T, $y: T) -> T {
                $body
            }

            #[inline(always)]
            fn combine(&self, a: T, b: T) -> T {
                a.add_lane(b)
            }
        }
    };
}

sum_op!(
    /// Sum of elements.
    Sum, |acc, x, _y| acc.add_lane(x)
);
sum_op!(
    /// Sum of absolute values.
    SumAbs, |acc, x, _y| acc.add_lane(x.abs_lane())
);
sum_op!(
    /// Sum of squares.
    SumSquares, |acc, x, _y| acc.add_lane(x.mul_lane(x))
);
sum_op!(
    /// Sum of pairwise products.
    DotProduct, |acc, x, y| acc.add_lane(x.mul_lane(y))
);

macro_rules! extremum_op {
    ($(#[$meta:meta])* $name:ident, $pick:ident) => {
        $(#[$meta])*
        pub struct $name<T>(PhantomData<T>);

        impl<T> Default for $name<T> {
            fn default() -> Self {
                Self(PhantomData)
            }
        }

        impl<T: Element> ReduceOp for $name<T> {
            type In = T;
            type Acc = T;

            fn empty(&self) -> Option<T> {
                None
            }

            #[inline(always)]
            fn init(&self, x: T, _y: T) -> T {
                x
            }

            #[inline(always)]
            fn accumulate(&self, acc: T, x: T, _y: T) -> T {
                acc.$pick(x)
            }

            #[inline(always)]
            fn combine(&self, a: T, b: T) -> T {
                a.$pick(b)
            }
        }
    };
}

extremum_op!(
    /// Smallest element.
    MinReduce, min_lane
);
extremum_op!(
    /// Largest element.
    MaxReduce, max_lane
);

/// Smallest and largest element in one pass.
pub struct MinMaxReduce<T>(PhantomData<T>);

impl<T> Default for MinMaxReduce<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<T: Element> ReduceOp for MinMaxReduce<T> {
    type In = T;
    type Acc = (T, T);

    fn empty(&self) -> Option<(T, T)> {
        None
    }

    #[inline(always)]
    fn init(&self, x: T, _y: T) -> (T, T) {
        (x, x)
    }

    #[inline(always)]
    fn accumulate(&self, (lo, hi): (T, T), x: T, _y: T) -> (T, T) {
        (lo.min_lane(x), hi.max_lane(x))
    }

    #[inline(always)]
    fn combine(&self, a: (T, T), b: (T, T)) -> (T, T) {
        (a.0.min_lane(b.0), a.1.max_lane(b.1))
    }
}

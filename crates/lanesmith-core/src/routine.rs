//! Routine families.
//!
//! Every implementation of a kernel (Default, pipelined per target, native
//! intrinsics) has the function type of its family, so one descriptor table
//! can hold all of them. Pointer arguments follow the exported prototype
//! order; the length always comes last.

use crate::error::Result;

/// `z[i] = f(x[i], y[i])`.
pub type BinaryFn<In, Out> = unsafe fn(*const In, *const In, *mut Out, usize) -> Result<()>;

/// `z[i] = f(x[i], y)` with a scalar second operand.
pub type VectorScalarFn<In, Out> = unsafe fn(*const In, In, *mut Out, usize) -> Result<()>;

/// `z[i] = f(x, y[i])` with a scalar first operand.
pub type ScalarVectorFn<In, Out> = unsafe fn(In, *const In, *mut Out, usize) -> Result<()>;

/// `x[i] = f(x[i], y[i])`.
pub type InPlaceFn<T> = unsafe fn(*mut T, *const T, usize) -> Result<()>;

/// `x[i] = f(x[i], y)`.
pub type InPlaceScalarFn<T> = unsafe fn(*mut T, T, usize) -> Result<()>;

/// `y[i] = f(x[i], y[i])`: vector first operand, result in the second.
pub type VectorIntoFn<T> = unsafe fn(*const T, *mut T, usize) -> Result<()>;

/// `y[i] = f(x, y[i])`: scalar first operand, result in the second.
pub type ScalarIntoFn<T> = unsafe fn(T, *mut T, usize) -> Result<()>;

/// `z[i] = f(x[i], y[i])` with `y` of a narrower type widened to `T`.
pub type MixedBinaryFn<T, N> = unsafe fn(*const T, *const N, *mut T, usize) -> Result<()>;

/// `x[i] = f(x[i], y[i])` with `y` of a narrower type widened to `T`.
pub type MixedInPlaceFn<T, N> = unsafe fn(*mut T, *const N, usize) -> Result<()>;

/// `y[i] = f(x[i])`.
pub type UnaryFn<T> = unsafe fn(*const T, *mut T, usize) -> Result<()>;

/// `v[i] = f(v[i])`.
pub type InPlaceUnaryFn<T> = unsafe fn(*mut T, usize) -> Result<()>;

/// `*result = fold(v)`.
pub type ReduceFn<T> = unsafe fn(*const T, *mut T, usize) -> Result<()>;

/// `(*minimum, *maximum) = (min(v), max(v))`.
pub type MinMaxFn<T> = unsafe fn(*const T, *mut T, *mut T, usize) -> Result<()>;

/// `*result = sum(x[i] * y[i])`.
pub type DotFn<T> = unsafe fn(*const T, *const T, *mut T, usize) -> Result<()>;

/// `y[i] = sum(coef[k] * x[i]^k)`; arguments are `(coef, x, y, coef_count, length)`.
pub type PolynomialFn<T> = unsafe fn(*const T, *const T, *mut T, usize, usize) -> Result<()>;

//! Default implementations.
//!
//! These functions serve as:
//! - the always-available last entry of every descriptor table
//! - the correctness oracle the pipelined and native routines are tested against
//!
//! Each routine validates its pointers in prototype order, then walks the
//! elements sequentially through the scalar operation.

use crate::element::{Element, Narrow};
use crate::error::{Error, Result};
use crate::pipeline::ops::{MapOp, MinMaxReduce, Polynomial, ReduceOp};
use crate::pipeline::{check_pointer, Source};

/// Sequential map over `len` elements.
///
/// # Safety
///
/// Vector sources valid for `len` reads, `z` valid for `len` writes.
#[inline(always)]
pub(crate) unsafe fn map_sequential<Op: MapOp>(
    op: &Op,
    x: Source<Op::In>,
    y: Source<Op::In>,
    z: *mut Op::Out,
    len: usize,
) {
    for i in 0..len {
        let (a, b) = match (x, y) {
            // SAFETY: i < len.
            (Source::Vector(px), Source::Vector(py)) => unsafe { (px.add(i).read(), py.add(i).read()) },
            (Source::Vector(px), Source::Broadcast(b)) => (unsafe { px.add(i).read() }, b),
            (Source::Broadcast(a), Source::Vector(py)) => (a, unsafe { py.add(i).read() }),
            (Source::Broadcast(a), Source::Broadcast(b)) => (a, b),
        };
        // SAFETY: i < len.
        unsafe { z.add(i).write(op.scalar(a, b)) };
    }
}

/// Sequential fold over `len` elements.
///
/// # Safety
///
/// `x` (and a vector `y`) valid for `len` reads.
#[inline(always)]
pub(crate) unsafe fn fold_sequential<Op: ReduceOp>(
    op: &Op,
    x: *const Op::In,
    y: Source<Op::In>,
    len: usize,
) -> Result<Op::Acc> {
    if len == 0 {
        return op.empty().ok_or(Error::InvalidArgument("length"));
    }
    let second = |i: usize| match y {
        // SAFETY: i < len.
        Source::Vector(py) => unsafe { py.add(i).read() },
        Source::Broadcast(b) => b,
    };
    // SAFETY: len > 0.
    let mut acc = op.init(unsafe { x.read() }, second(0));
    for i in 0..len {
        // SAFETY: i < len.
        acc = op.accumulate(acc, unsafe { x.add(i).read() }, second(i));
    }
    Ok(acc)
}

/// Default `z = f(x, y)`.
///
/// # Safety
///
/// `x`, `y` valid for `len` reads, `z` for `len` writes.
pub unsafe fn binary<K: MapOp + Default>(
    x: *const K::In,
    y: *const K::In,
    z: *mut K::Out,
    len: usize,
) -> Result<()> {
    check_pointer(x, "x")?;
    check_pointer(y, "y")?;
    check_pointer(z.cast_const(), "z")?;
    // SAFETY: caller contract.
    unsafe { map_sequential(&K::default(), Source::Vector(x), Source::Vector(y), z, len) };
    Ok(())
}

/// Default `z = f(x, scalar)`.
///
/// # Safety
///
/// `x` valid for `len` reads, `z` for `len` writes.
pub unsafe fn vector_scalar<K: MapOp + Default>(
    x: *const K::In,
    y: K::In,
    z: *mut K::Out,
    len: usize,
) -> Result<()> {
    check_pointer(x, "x")?;
    check_pointer(z.cast_const(), "z")?;
    // SAFETY: caller contract.
    unsafe { map_sequential(&K::default(), Source::Vector(x), Source::Broadcast(y), z, len) };
    Ok(())
}

/// Default `z = f(scalar, y)`.
///
/// # Safety
///
/// `y` valid for `len` reads, `z` for `len` writes.
pub unsafe fn scalar_vector<K: MapOp + Default>(
    x: K::In,
    y: *const K::In,
    z: *mut K::Out,
    len: usize,
) -> Result<()> {
    check_pointer(y, "y")?;
    check_pointer(z.cast_const(), "z")?;
    // SAFETY: caller contract.
    unsafe { map_sequential(&K::default(), Source::Broadcast(x), Source::Vector(y), z, len) };
    Ok(())
}

/// Default `x = f(x, y)`.
///
/// # Safety
///
/// `x` valid for `len` reads and writes, `y` for `len` reads.
pub unsafe fn in_place<T: Element, K: MapOp<In = T, Out = T> + Default>(
    x: *mut T,
    y: *const T,
    len: usize,
) -> Result<()> {
    check_pointer(x.cast_const(), "x")?;
    check_pointer(y, "y")?;
    // SAFETY: caller contract; element i is read before it is written.
    unsafe { map_sequential(&K::default(), Source::Vector(x.cast_const()), Source::Vector(y), x, len) };
    Ok(())
}

/// Default `x = f(x, scalar)`.
///
/// # Safety
///
/// `x` valid for `len` reads and writes.
pub unsafe fn in_place_scalar<T: Element, K: MapOp<In = T, Out = T> + Default>(
    x: *mut T,
    y: T,
    len: usize,
) -> Result<()> {
    check_pointer(x.cast_const(), "x")?;
    // SAFETY: caller contract.
    unsafe { map_sequential(&K::default(), Source::Vector(x.cast_const()), Source::Broadcast(y), x, len) };
    Ok(())
}

/// Default `y = f(x, y)`.
///
/// # Safety
///
/// `x` valid for `len` reads, `y` for `len` reads and writes.
pub unsafe fn vector_into<T: Element, K: MapOp<In = T, Out = T> + Default>(
    x: *const T,
    y: *mut T,
    len: usize,
) -> Result<()> {
    check_pointer(x, "x")?;
    check_pointer(y.cast_const(), "y")?;
    // SAFETY: caller contract; element i is read before it is written.
    unsafe { map_sequential(&K::default(), Source::Vector(x), Source::Vector(y.cast_const()), y, len) };
    Ok(())
}

/// Default `y = f(scalar, y)`.
///
/// # Safety
///
/// `y` valid for `len` reads and writes.
pub unsafe fn scalar_into<T: Element, K: MapOp<In = T, Out = T> + Default>(
    x: T,
    y: *mut T,
    len: usize,
) -> Result<()> {
    check_pointer(y.cast_const(), "y")?;
    // SAFETY: caller contract.
    unsafe { map_sequential(&K::default(), Source::Broadcast(x), Source::Vector(y.cast_const()), y, len) };
    Ok(())
}

/// Default `z = f(x, widen(y))`.
///
/// # Safety
///
/// `x`, `y` valid for `len` reads, `z` for `len` writes.
pub unsafe fn mixed_binary<T: Element, N: Narrow<T>, K: MapOp<In = T, Out = T> + Default>(
    x: *const T,
    y: *const N,
    z: *mut T,
    len: usize,
) -> Result<()> {
    check_pointer(x, "x")?;
    check_pointer(y, "y")?;
    check_pointer(z.cast_const(), "z")?;
    let op = K::default();
    for i in 0..len {
        // SAFETY: i < len.
        unsafe { z.add(i).write(op.scalar(x.add(i).read(), y.add(i).read().into())) };
    }
    Ok(())
}

/// Default `x = f(x, widen(y))`.
///
/// # Safety
///
/// `x` valid for `len` reads and writes, `y` for `len` reads.
pub unsafe fn mixed_in_place<T: Element, N: Narrow<T>, K: MapOp<In = T, Out = T> + Default>(
    x: *mut T,
    y: *const N,
    len: usize,
) -> Result<()> {
    check_pointer(x.cast_const(), "x")?;
    check_pointer(y, "y")?;
    let op = K::default();
    for i in 0..len {
        // SAFETY: i < len.
        unsafe { x.add(i).write(op.scalar(x.add(i).read(), y.add(i).read().into())) };
    }
    Ok(())
}

/// Default `v = f(v)`.
///
/// # Safety
///
/// `v` valid for `len` reads and writes.
pub unsafe fn in_place_unary<T: Element, K: MapOp<In = T, Out = T> + Default>(
    v: *mut T,
    len: usize,
) -> Result<()> {
    check_pointer(v.cast_const(), "v")?;
    // SAFETY: caller contract.
    unsafe { map_sequential(&K::default(), Source::Vector(v.cast_const()), Source::Broadcast(T::ZERO), v, len) };
    Ok(())
}

/// Default `y = f(x)`.
///
/// # Safety
///
/// `x` valid for `len` reads, `y` for `len` writes.
pub unsafe fn unary<T: Element, K: MapOp<In = T, Out = T> + Default>(
    x: *const T,
    y: *mut T,
    len: usize,
) -> Result<()> {
    check_pointer(x, "x")?;
    check_pointer(y.cast_const(), "y")?;
    // SAFETY: caller contract.
    unsafe { map_sequential(&K::default(), Source::Vector(x), Source::Broadcast(T::ZERO), y, len) };
    Ok(())
}

/// Default `*result = fold(v)`.
///
/// # Safety
///
/// `v` valid for `len` reads, `result` for one write.
pub unsafe fn reduce<T: Element, K: ReduceOp<In = T, Acc = T> + Default>(
    v: *const T,
    result: *mut T,
    len: usize,
) -> Result<()> {
    check_pointer(v, "v")?;
    check_pointer(result.cast_const(), "result")?;
    // SAFETY: caller contract.
    let acc = unsafe { fold_sequential(&K::default(), v, Source::Broadcast(T::ZERO), len)? };
    // SAFETY: `result` validated above.
    unsafe { result.write(acc) };
    Ok(())
}

/// Default min and max in one pass.
///
/// # Safety
///
/// `v` valid for `len` reads, both outputs for one write.
pub unsafe fn min_max<T: Element>(
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
    let (lo, hi) = unsafe { fold_sequential(&op, v, Source::Broadcast(T::ZERO), len)? };
    // SAFETY: outputs validated above.
    unsafe {
        minimum.write(lo);
        maximum.write(hi);
    }
    Ok(())
}

/// Default `*result = fold(x, y)`.
///
/// # Safety
///
/// `x`, `y` valid for `len` reads, `result` for one write.
pub unsafe fn dot<T: Element, K: ReduceOp<In = T, Acc = T> + Default>(
    x: *const T,
    y: *const T,
    result: *mut T,
    len: usize,
) -> Result<()> {
    check_pointer(x, "x")?;
    check_pointer(y, "y")?;
    check_pointer(result.cast_const(), "result")?;
    // SAFETY: caller contract.
    let acc = unsafe { fold_sequential(&K::default(), x, Source::Vector(y), len)? };
    // SAFETY: `result` validated above.
    unsafe { result.write(acc) };
    Ok(())
}

/// Checks the polynomial arguments shared by every implementation.
pub(crate) fn check_polynomial<T>(
    coef: *const T,
    x: *const T,
    y: *mut T,
    coef_count: usize,
) -> Result<()> {
    check_pointer(coef, "coef")?;
    check_pointer(x, "x")?;
    check_pointer(y.cast_const(), "y")?;
    if coef_count == 0 {
        return Err(Error::InvalidArgument("coef_count"));
    }
    Ok(())
}

/// Default polynomial evaluation.
///
/// # Safety
///
/// `coef` valid for `coef_count` reads, `x` for `len` reads, `y` for `len`
/// writes.
pub unsafe fn polynomial<T: Element>(
    coef: *const T,
    x: *const T,
    y: *mut T,
    coef_count: usize,
    len: usize,
) -> Result<()> {
    check_polynomial(coef, x, y, coef_count)?;
    // SAFETY: caller contract, count checked non-zero.
    unsafe {
        let op = Polynomial::from_raw(coef, coef_count);
        map_sequential(&op, Source::Vector(x), Source::Broadcast(T::ZERO), y, len);
    }
    Ok(())
}

//! Kernel body generator, executable form.
//!
//! [`run_map`] and [`run_reduce`] execute one routine body over a
//! [`PipelineSchedule`]: alignment prologue, ramp-up, steady-state passes,
//! ramp-down and the scalar tail. Parameter validation is done by the
//! routine wrappers before either is entered, so nothing here fails after
//! memory has been touched.
//!
//! Inputs are raw pointers and may alias the output (in-place kernels): a
//! batch is always loaded before any of its registers is stored, and every
//! stream keeps its own cursor.

pub mod ops;
mod registers;

#[cfg(test)]
mod pipeline_tests;

use crate::element::Element;
use crate::error::{Error, Result};
use crate::ir::{MicroOp, Operand};
use crate::schedule::PipelineSchedule;

use ops::{MapOp, ReduceOp};
use registers::RegisterBank;

/// Input of a map kernel: an array, or a scalar broadcast to every lane.
#[derive(Debug, Clone, Copy)]
pub enum Source<T> {
    /// Array read at the element index.
    Vector(*const T),
    /// Same value for every index.
    Broadcast(T),
}

impl<T: Element> Source<T> {
    /// Element `index` of the source.
    ///
    /// # Safety
    ///
    /// For vectors, `index` must be in bounds.
    #[inline(always)]
    unsafe fn at(&self, index: usize) -> T {
        match *self {
            // SAFETY: caller keeps `index` in bounds.
            Self::Vector(ptr) => unsafe { ptr.add(index).read() },
            Self::Broadcast(value) => value,
        }
    }

    /// Source shifted by `elements`.
    ///
    /// # Safety
    ///
    /// For vectors, the shifted pointer must stay in bounds.
    #[inline(always)]
    unsafe fn offset(self, elements: usize) -> Self {
        match self {
            // SAFETY: caller keeps the offset in bounds.
            Self::Vector(ptr) => Self::Vector(unsafe { ptr.add(elements) }),
            broadcast @ Self::Broadcast(_) => broadcast,
        }
    }

    #[inline(always)]
    fn address(&self) -> Option<usize> {
        match *self {
            Self::Vector(ptr) => Some(ptr as usize),
            Self::Broadcast(_) => None,
        }
    }

    #[inline(always)]
    fn bank(&self, lanes: usize) -> RegisterBank<T> {
        match *self {
            Self::Vector(_) => RegisterBank::filled(T::ZERO, lanes),
            Self::Broadcast(value) => RegisterBank::filled(value, lanes),
        }
    }
}

/// Pointer the alignment prologue drives to the register boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// The output array.
    Output,
    /// The first vector input (the narrower operand of widening kernels).
    Input,
}

/// Validates one pointer operand.
///
/// Null pointers fail with `NullPointer`; pointers to multi-byte elements
/// that are not aligned to the element size fail with `MisalignedPointer`.
#[inline(always)]
pub fn check_pointer<T>(ptr: *const T, name: &'static str) -> Result<()> {
    if ptr.is_null() {
        return Err(Error::NullPointer(name));
    }
    let size = std::mem::size_of::<T>();
    if size > 1 && (ptr as usize) % size != 0 {
        return Err(Error::MisalignedPointer(name));
    }
    Ok(())
}

/// Elements the prologue must process before `address` is aligned to
/// `boundary`, capped at `len`.
#[inline(always)]
fn prologue_len(address: usize, element_size: usize, boundary: usize, len: usize) -> usize {
    let misalignment = address % boundary;
    if misalignment == 0 {
        return 0;
    }
    ((boundary - misalignment) / element_size).min(len)
}

struct MapPipe<'a, Op: MapOp> {
    op: &'a Op,
    lanes: usize,
    x_src: Source<Op::In>,
    y_src: Source<Op::In>,
    z_dst: *mut Op::Out,
    x: RegisterBank<Op::In>,
    y: RegisterBank<Op::In>,
    z: RegisterBank<Op::Out>,
    cursors: [usize; 3],
}

impl<Op: MapOp> MapPipe<'_, Op> {
    /// # Safety
    ///
    /// Every load and store the schedule issues must be in bounds.
    #[inline(always)]
    unsafe fn issue(&mut self, micro: MicroOp) {
        match micro {
            MicroOp::Load { operand, register } => {
                let base = self.cursors[operand.bank()] + register * self.lanes;
                let (source, bank) = match operand {
                    Operand::Y => (self.y_src, &mut self.y),
                    _ => (self.x_src, &mut self.x),
                };
                if let Source::Vector(ptr) = source {
                    // SAFETY: the caller sized the pipelined region in whole batches.
                    unsafe { bank.load(register, ptr.add(base)) };
                }
            }
            MicroOp::Compute { register } => {
                self.op
                    .lanes(self.x.get(register), self.y.get(register), self.z.get_mut(register));
            }
            MicroOp::Store { operand, register } => {
                let base = self.cursors[operand.bank()] + register * self.lanes;
                // SAFETY: as for loads.
                unsafe { self.z.store(register, self.z_dst.add(base)) };
            }
            MicroOp::Advance { operand, elements } => self.cursors[operand.bank()] += elements,
            // Conversion happens inside the lane operation.
            MicroOp::Widen { .. } | MicroOp::Accumulate { .. } => {}
        }
    }
}

/// Runs a map body: prologue, pipelined batches, scalar tail.
///
/// # Safety
///
/// Vector sources must be valid for `len` reads and `z` for `len` writes.
/// Pointers must already have passed [`check_pointer`]. A vector source may
/// equal `z` but must not partially overlap it.
pub unsafe fn run_map<Op: MapOp>(
    op: &Op,
    schedule: &PipelineSchedule,
    x: Source<Op::In>,
    y: Source<Op::In>,
    z: *mut Op::Out,
    len: usize,
    anchor: Anchor,
) -> Result<()> {
    if len == 0 {
        return Ok(());
    }

    let (address, size) = match anchor {
        Anchor::Input => match x.address() {
            Some(address) => (address, std::mem::size_of::<Op::In>()),
            None => (z as usize, std::mem::size_of::<Op::Out>()),
        },
        Anchor::Output => (z as usize, std::mem::size_of::<Op::Out>()),
    };
    let mut done = prologue_len(address, size, schedule.register_bytes(), len);
    for i in 0..done {
        // SAFETY: i < len.
        unsafe { z.add(i).write(op.scalar(x.at(i), y.at(i))) };
    }

    let batch = schedule.batch();
    let mut remaining = len - done;
    if remaining >= batch {
        let lanes = schedule.lanes();
        // SAFETY: done <= len.
        let (x_src, y_src, z_dst) = unsafe { (x.offset(done), y.offset(done), z.add(done)) };
        let mut pipe = MapPipe {
            op,
            lanes,
            x_src,
            y_src,
            z_dst,
            x: x_src.bank(lanes),
            y: y_src.bank(lanes),
            z: RegisterBank::filled(<Op::Out as Element>::ZERO, lanes),
            cursors: [0; 3],
        };
        remaining -= batch;
        // SAFETY (all three phases): one ramp-up plus one steady pass per
        // further batch touch exactly `len - done - remaining` elements.
        for micro in schedule.ramp_up() {
            unsafe { pipe.issue(micro) };
        }
        while remaining >= batch {
            remaining -= batch;
            for micro in schedule.steady_state() {
                unsafe { pipe.issue(micro) };
            }
        }
        for micro in schedule.ramp_down() {
            unsafe { pipe.issue(micro) };
        }
        done = len - remaining;
    }

    for i in done..len {
        // SAFETY: i < len.
        unsafe { z.add(i).write(op.scalar(x.at(i), y.at(i))) };
    }
    Ok(())
}

/// Runs a map body as a single sequential loop.
///
/// # Safety
///
/// As for [`run_map`].
pub unsafe fn run_map_sequential<Op: MapOp>(
    op: &Op,
    x: Source<Op::In>,
    y: Source<Op::In>,
    z: *mut Op::Out,
    len: usize,
) {
    for i in 0..len {
        // SAFETY: i < len.
        unsafe { z.add(i).write(op.scalar(x.at(i), y.at(i))) };
    }
}

/// Folds `len` elements in index order without a schedule.
///
/// # Safety
///
/// As for [`run_reduce`].
pub unsafe fn run_reduce_sequential<Op: ReduceOp>(
    op: &Op,
    x: *const Op::In,
    y: Source<Op::In>,
    len: usize,
) -> Result<Op::Acc> {
    if len == 0 {
        return op.empty().ok_or(Error::InvalidArgument("length"));
    }
    let x = Source::Vector(x);
    // SAFETY: len > 0, and every index below is < len.
    let mut acc = unsafe { op.init(x.at(0), y.at(0)) };
    for i in 0..len {
        acc = unsafe { op.accumulate(acc, x.at(i), y.at(i)) };
    }
    Ok(acc)
}

/// Runs a reduce body and returns the accumulator.
///
/// Partial accumulators (one per register lane) are combined in the
/// schedule's [`ReductionTree`](crate::schedule::ReductionTree) order, then
/// merged with the prologue's accumulator, then the tail is folded in.
///
/// # Safety
///
/// `x` (and a vector `y`) must be valid for `len` reads and have passed
/// [`check_pointer`].
pub unsafe fn run_reduce<Op: ReduceOp>(
    op: &Op,
    schedule: &PipelineSchedule,
    x: *const Op::In,
    y: Source<Op::In>,
    len: usize,
) -> Result<Op::Acc> {
    if len == 0 {
        return op.empty().ok_or(Error::InvalidArgument("length"));
    }
    let x = Source::Vector(x);

    // SAFETY: len > 0.
    let init = unsafe { op.init(x.at(0), y.at(0)) };
    let mut head = init;

    let size = std::mem::size_of::<Op::In>();
    let x_address = x.address().unwrap_or_default();
    let mut done = prologue_len(x_address, size, schedule.register_bytes(), len);
    for i in 0..done {
        // SAFETY: i < len.
        head = unsafe { op.accumulate(head, x.at(i), y.at(i)) };
    }

    let batch = schedule.batch();
    let mut remaining = len - done;
    if remaining >= batch {
        let lanes = schedule.lanes();
        // SAFETY: done <= len.
        let (x_src, y_src) = unsafe { (x.offset(done), y.offset(done)) };
        let mut xb = x_src.bank(lanes);
        let mut yb = y_src.bank(lanes);
        let mut acc = RegisterBank::filled(init, lanes);
        let mut cursors = [0usize; 3];

        let mut issue = |micro: MicroOp| match micro {
            MicroOp::Load { operand, register } => {
                let base = cursors[operand.bank()] + register * lanes;
                let (source, bank) = match operand {
                    Operand::Y => (y_src, &mut yb),
                    _ => (x_src, &mut xb),
                };
                if let Source::Vector(ptr) = source {
                    // SAFETY: the pipelined region is sized in whole batches.
                    unsafe { bank.load(register, ptr.add(base)) };
                }
            }
            MicroOp::Accumulate { register } => {
                op.accumulate_lanes(acc.get_mut(register), xb.get(register), yb.get(register));
            }
            MicroOp::Advance { operand, elements } => cursors[operand.bank()] += elements,
            MicroOp::Widen { .. } | MicroOp::Compute { .. } | MicroOp::Store { .. } => {}
        };

        remaining -= batch;
        schedule.ramp_up().for_each(&mut issue);
        while remaining >= batch {
            remaining -= batch;
            schedule.steady_state().for_each(&mut issue);
        }
        schedule.ramp_down().for_each(&mut issue);

        let combined = acc.combine(schedule.unroll(), schedule.reduction(), |a, b| {
            op.combine(a, b)
        });
        head = op.combine(head, combined);
        done = len - remaining;
    }

    for i in done..len {
        // SAFETY: i < len.
        head = unsafe { op.accumulate(head, x.at(i), y.at(i)) };
    }
    Ok(head)
}

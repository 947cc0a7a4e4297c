//! Fixed-size register banks for the portable pipeline.

use std::ptr;

use crate::schedule::{ReductionTree, MAX_LANES, MAX_REGISTERS};

/// One bank of `MAX_REGISTERS` registers of `MAX_LANES` lanes, of which the
/// schedule uses `unroll` registers of `lanes` lanes.
pub(crate) struct RegisterBank<T: Copy> {
    regs: [[T; MAX_LANES]; MAX_REGISTERS],
    lanes: usize,
}

impl<T: Copy> RegisterBank<T> {
    /// Bank with every lane set to `value` (broadcast registers and
    /// accumulator initialisation).
    #[inline(always)]
    pub(crate) fn filled(value: T, lanes: usize) -> Self {
        debug_assert!(lanes <= MAX_LANES);
        Self {
            regs: [[value; MAX_LANES]; MAX_REGISTERS],
            lanes,
        }
    }

    #[inline(always)]
    pub(crate) fn get(&self, register: usize) -> &[T] {
        &self.regs[register][..self.lanes]
    }

    #[inline(always)]
    pub(crate) fn get_mut(&mut self, register: usize) -> &mut [T] {
        &mut self.regs[register][..self.lanes]
    }

    /// Loads one register from memory.
    ///
    /// # Safety
    ///
    /// `src` must be valid for `lanes` reads.
    #[inline(always)]
    pub(crate) unsafe fn load(&mut self, register: usize, src: *const T) {
        // SAFETY: caller guarantees `src..src+lanes` is readable; the bank is
        // a distinct local allocation.
        unsafe { ptr::copy_nonoverlapping(src, self.regs[register].as_mut_ptr(), self.lanes) };
    }

    /// Stores one register to memory.
    ///
    /// # Safety
    ///
    /// `dst` must be valid for `lanes` writes.
    #[inline(always)]
    pub(crate) unsafe fn store(&self, register: usize, dst: *mut T) {
        // SAFETY: caller guarantees `dst..dst+lanes` is writable.
        unsafe { ptr::copy_nonoverlapping(self.regs[register].as_ptr(), dst, self.lanes) };
    }

    /// Combines the first `unroll` registers into one value.
    ///
    /// Lanes of each register are combined first, then the per-register
    /// results, both in `tree` order.
    pub(crate) fn combine(
        &mut self,
        unroll: usize,
        tree: ReductionTree,
        f: impl Fn(T, T) -> T + Copy,
    ) -> T {
        let lanes = self.lanes;
        let mut partials = [self.regs[0][0]; MAX_REGISTERS];
        for (r, partial) in partials.iter_mut().enumerate().take(unroll) {
            *partial = fold(&mut self.regs[r][..lanes], tree, f);
        }
        fold(&mut partials[..unroll], tree, f)
    }
}

fn fold<T: Copy>(values: &mut [T], tree: ReductionTree, f: impl Fn(T, T) -> T) -> T {
    match tree {
        ReductionTree::Sequential => {
            let mut acc = values[0];
            for &v in &values[1..] {
                acc = f(acc, v);
            }
            acc
        }
        ReductionTree::Pairwise => {
            let n = values.len();
            let mut step = 1;
            while step < n {
                let mut i = 0;
                while i + step < n {
                    values[i] = f(values[i], values[i + step]);
                    i += 2 * step;
                }
                step *= 2;
            }
            values[0]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairwise_and_sequential_agree_on_integers() {
        for tree in [ReductionTree::Pairwise, ReductionTree::Sequential] {
            let mut bank = RegisterBank::filled(0i64, 5);
            for r in 0..3 {
                for (lane, v) in bank.get_mut(r).iter_mut().enumerate() {
                    *v = (r * 10 + lane) as i64;
                }
            }
            // 0..4 + 10..14 + 20..24
            assert_eq!(bank.combine(3, tree, |a, b| a + b), 10 + 60 + 110);
        }
    }

    #[test]
    fn test_pairwise_grouping() {
        // ((a - b) - (c - d)) differs from (((a - b) - c) - d).
        let mut values = [8, 4, 2, 1];
        assert_eq!(fold(&mut values, ReductionTree::Pairwise, |a, b| a - b), 3);
        let mut values = [8, 4, 2, 1];
        assert_eq!(fold(&mut values, ReductionTree::Sequential, |a, b| a - b), 1);
    }

    #[test]
    fn test_load_and_store_round_trip_lanes_only() {
        let src = [1.0f32, 2.0, 3.0, 4.0, 5.0];
        let mut dst = [0.0f32; 5];
        let mut bank = RegisterBank::filled(0.0f32, 4);
        unsafe {
            bank.load(2, src.as_ptr());
            bank.store(2, dst.as_mut_ptr());
        }
        assert_eq!(dst, [1.0, 2.0, 3.0, 4.0, 0.0]);
    }
}

//! Tests for the intrinsic reductions.
//!
//! Entries are only called when the running CPU satisfies their
//! requirement; elsewhere the tests check table shape alone.

use super::*;
use crate::cpu;
use crate::error::Error;
use crate::pipeline::ops::{DotProduct, Sum, SumSquares};
use crate::scalar;

fn runnable<F: Copy>(entries: &[ImplementationDescriptor<F>]) -> Vec<F> {
    let detected = cpu::probe().features;
    entries
        .iter()
        .filter(|e| e.required.is_satisfied_by(detected))
        .map(|e| e.function)
        .collect()
}

fn data_f64(len: usize, seed: f64) -> Vec<f64> {
    (0..len).map(|i| ((i as f64) * 0.37 + seed).sin()).collect()
}

fn data_f32(len: usize, seed: f32) -> Vec<f32> {
    (0..len).map(|i| ((i as f32) * 0.37 + seed).sin()).collect()
}

const LENGTHS: [usize; 9] = [0, 1, 3, 7, 8, 15, 33, 100, 1027];

// =========================================================================
// Table shape
// =========================================================================

#[test]
fn test_entries_are_specialized_and_labelled() {
    let sums = sum_f32();
    let dots = dot_f64();
    #[cfg(target_arch = "x86_64")]
    let variant = AVX2_VARIANT;
    #[cfg(target_arch = "aarch64")]
    let variant = NEON_VARIANT;
    for info in sums.iter().enumerate().map(|(i, e)| e.info(i)) {
        assert!(!info.required.is_empty());
        #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
        assert_eq!(info.variant, variant);
    }
    assert_eq!(sums.len(), dots.len());
    #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
    assert_eq!(sums.len(), 1);
}

#[test]
fn test_tail_covers_every_remainder() {
    let a: Vec<f64> = (1..=12).map(f64::from).collect();
    let b: Vec<f64> = (1..=12).map(|i| f64::from(i) * 0.5).collect();
    let start = 3;
    for remainder in 0..8usize {
        let end = start + remainder;
        let dot = tail!(start, end, f64, |i| a[i] * b[i]);
        let want: f64 = (start..end).map(|i| a[i] * b[i]).sum();
        assert_eq!(dot, want, "remainder {remainder}");
    }
    let single: f32 = tail!(0, 1, f32, |i| [2.5f32][i]);
    assert_eq!(single, 2.5);
}

// =========================================================================
// Results against the Default routines
// =========================================================================

#[test]
fn test_sum_f64_matches_default() {
    for f in runnable(&sum_f64()) {
        for len in LENGTHS {
            let v = data_f64(len, 0.5);
            let (mut got, mut want) = (f64::NAN, f64::NAN);
            unsafe {
                f(v.as_ptr(), &mut got, len).unwrap();
                scalar::reduce::<f64, Sum<f64>>(v.as_ptr(), &mut want, len).unwrap();
            }
            assert!((got - want).abs() <= 1e-12 * (len as f64 + 1.0), "len {len}: {got} vs {want}");
        }
    }
}

#[test]
fn test_sum_squares_f32_matches_default() {
    for f in runnable(&sum_squares_f32()) {
        for len in LENGTHS {
            let v = data_f32(len, 1.5);
            let (mut got, mut want) = (f32::NAN, f32::NAN);
            unsafe {
                f(v.as_ptr(), &mut got, len).unwrap();
                scalar::reduce::<f32, SumSquares<f32>>(v.as_ptr(), &mut want, len).unwrap();
            }
            assert!((got - want).abs() <= 1e-4 * (want.abs() + 1.0), "len {len}: {got} vs {want}");
        }
    }
}

#[test]
fn test_dot_matches_default() {
    for f in runnable(&dot_f32()) {
        for len in LENGTHS {
            let (x, y) = (data_f32(len, 0.1), data_f32(len, 2.2));
            let (mut got, mut want) = (f32::NAN, f32::NAN);
            unsafe {
                f(x.as_ptr(), y.as_ptr(), &mut got, len).unwrap();
                scalar::dot::<f32, DotProduct<f32>>(x.as_ptr(), y.as_ptr(), &mut want, len).unwrap();
            }
            assert!((got - want).abs() <= 1e-3, "len {len}: {got} vs {want}");
        }
    }
    for f in runnable(&dot_f64()) {
        let x: Vec<f64> = (0..257).map(f64::from).collect();
        let y = vec![2.0; 257];
        let mut got = 0.0;
        unsafe { f(x.as_ptr(), y.as_ptr(), &mut got, x.len()).unwrap() };
        // Small integers: exact in any summation order.
        assert_eq!(got, 256.0 * 257.0);
    }
}

#[test]
fn test_unaligned_start_is_accepted() {
    for f in runnable(&sum_f32()) {
        let v = vec![1.0f32; 40];
        let mut got = 0.0;
        // Element-aligned but not register-aligned.
        unsafe { f(v.as_ptr().add(1), &mut got, 37).unwrap() };
        assert_eq!(got, 37.0);
    }
}

// =========================================================================
// Validation
// =========================================================================

#[test]
fn test_native_routines_validate_pointers() {
    for f in runnable(&sum_f64()) {
        let mut out = 0.0;
        let err = unsafe { f(std::ptr::null(), &mut out, 4) }.unwrap_err();
        assert!(matches!(err, Error::NullPointer("v")));
        let v = [1.0f64; 4];
        let err = unsafe { f(v.as_ptr(), std::ptr::null_mut(), 4) }.unwrap_err();
        assert!(matches!(err, Error::NullPointer("result")));
    }
    for f in runnable(&dot_f32()) {
        let x = [1.0f32; 8];
        let mut out = 0.0;
        let misaligned = x.as_ptr().cast::<u8>().wrapping_add(1).cast::<f32>();
        let err = unsafe { f(x.as_ptr(), misaligned, &mut out, 4) }.unwrap_err();
        assert!(matches!(err, Error::MisalignedPointer("y")));
    }
}

//! The routine status contract, checked on every table entry the host can
//! run: validation happens before any memory access, in prototype order,
//! and every implementation reports the same status.

use std::ptr;

use lanesmith_core::cpu::probe;
use lanesmith_core::dispatch::{DispatchTable, ImplementationDescriptor};
use lanesmith_core::kernels::core::{
    ADD_V8U_V8U_V8U, ADD_V32F_V32F_V32F, DOT_PRODUCT_V64F_V64F_S64F, MAX_V16S_S16S, MIN_MAX_V32F_S32F_S32F,
    MULTIPLY_IV64S_S64S_IV64S, SUBTRACT_S32S_V32S_V32S, SUM_V32F_S32F,
};
use lanesmith_core::kernels::math::{EVALUATE_POLYNOMIAL_V32F_V32F_V32F, EXP_V64F_V64F};
use lanesmith_core::kernels::raw;
use lanesmith_core::{Error, Status};

fn runnable<F: Copy>(table: &DispatchTable<F>) -> Vec<ImplementationDescriptor<F>> {
    let features = probe().features;
    table
        .entries()
        .filter(|e| e.required.is_satisfied_by(features))
        .copied()
        .collect()
}

/// A pointer one byte past an aligned buffer start.
fn misaligned<T>(buffer: &[T]) -> *const T {
    buffer.as_ptr().cast::<u8>().wrapping_add(1).cast()
}

fn misaligned_mut<T>(buffer: &mut [T]) -> *mut T {
    buffer.as_mut_ptr().cast::<u8>().wrapping_add(1).cast()
}

#[test]
fn test_status_codes_are_stable() {
    assert_eq!(Status::Ok.code(), 0);
    assert_eq!(Status::NullPointer.code(), 1);
    assert_eq!(Status::MisalignedPointer.code(), 2);
    assert_eq!(Status::InvalidArgument.code(), 3);
    assert_eq!(Error::NullPointer("x").status(), Status::NullPointer);
    assert_eq!(Status::from(&Ok::<(), Error>(())), Status::Ok);
}

#[test]
fn test_binary_validation_order() {
    let x = [1.0_f32; 8];
    let y = [2.0_f32; 8];
    let mut z = [0.0_f32; 9];
    for entry in runnable(ADD_V32F_V32F_V32F.table()) {
        let f = entry.function;
        // SAFETY: every call fails validation or has length zero.
        unsafe {
            assert!(matches!(f(ptr::null(), ptr::null(), ptr::null_mut(), 8), Err(Error::NullPointer("x"))));
            assert!(matches!(f(x.as_ptr(), ptr::null(), z.as_mut_ptr(), 8), Err(Error::NullPointer("y"))));
            assert!(matches!(f(misaligned(&x), ptr::null(), z.as_mut_ptr(), 8), Err(Error::MisalignedPointer("x"))));
            assert!(matches!(f(x.as_ptr(), y.as_ptr(), misaligned_mut(&mut z), 8), Err(Error::MisalignedPointer("z"))));
            // Null is reported even when nothing would be read.
            assert!(matches!(f(x.as_ptr(), y.as_ptr(), ptr::null_mut(), 0), Err(Error::NullPointer("z"))));
            assert!(f(x.as_ptr(), y.as_ptr(), z.as_mut_ptr(), 0).is_ok());
        }
        assert_eq!(z, [0.0; 9], "{} {} wrote on failure", entry.microarch, entry.variant);
    }
}

#[test]
fn test_byte_elements_never_misaligned() {
    let x = [3_u8; 17];
    let y = [4_u8; 17];
    let mut z = [0_u8; 17];
    for entry in runnable(ADD_V8U_V8U_V8U.table()) {
        // SAFETY: offsets keep 16 elements in bounds.
        unsafe { (entry.function)(x.as_ptr().add(1), y.as_ptr().add(1), z.as_mut_ptr().add(1), 16) }.unwrap();
        assert_eq!(&z[1..], &[7; 16]);
    }
}

#[test]
fn test_scalar_operand_kernels_validate_vectors_only() {
    let y = [5_i32; 4];
    let mut z = [0_i32; 4];
    for entry in runnable(SUBTRACT_S32S_V32S_V32S.table()) {
        // SAFETY: failing calls touch nothing; the last one is in bounds.
        unsafe {
            assert!(matches!((entry.function)(1, ptr::null(), z.as_mut_ptr(), 4), Err(Error::NullPointer("y"))));
            (entry.function)(1, y.as_ptr(), z.as_mut_ptr(), 4).unwrap();
        }
        assert_eq!(z, [-4; 4]);
    }
    let mut acc = [7_i64; 3];
    for entry in runnable(MULTIPLY_IV64S_S64S_IV64S.table()) {
        // SAFETY: as above.
        unsafe {
            assert!(matches!((entry.function)(ptr::null_mut(), 2, 3), Err(Error::NullPointer("x"))));
        }
    }
    // SAFETY: acc holds three elements.
    unsafe { raw::multiply_iv64s_s64s_iv64s(acc.as_mut_ptr(), -2, 3) }.unwrap();
    assert_eq!(acc, [-14; 3]);
}

#[test]
fn test_reductions_report_length_after_pointers() {
    let v = [1_i16, -9, 4];
    let mut result = 0_i16;
    for entry in runnable(MAX_V16S_S16S.table()) {
        // SAFETY: zero-length calls read nothing.
        unsafe {
            assert!(matches!((entry.function)(ptr::null(), &mut result, 0), Err(Error::NullPointer("v"))));
            assert!(matches!((entry.function)(v.as_ptr(), ptr::null_mut(), 0), Err(Error::NullPointer("result"))));
            let err = (entry.function)(v.as_ptr(), &mut result, 0).unwrap_err();
            assert_eq!(err.status(), Status::InvalidArgument);
            (entry.function)(v.as_ptr(), &mut result, 3).unwrap();
        }
        assert_eq!(result, 4);
    }

    let f = [0.5_f32, -2.0, 8.0];
    for entry in runnable(SUM_V32F_S32F.table()) {
        let mut sum = f32::NAN;
        // SAFETY: zero-length call writes only the result.
        unsafe { (entry.function)(f.as_ptr(), &mut sum, 0) }.unwrap();
        assert_eq!(sum, 0.0);
    }

    let (mut lo, mut hi) = (0.0_f32, 0.0_f32);
    for entry in runnable(MIN_MAX_V32F_S32F_S32F.table()) {
        // SAFETY: as above.
        unsafe {
            assert!(matches!((entry.function)(f.as_ptr(), &mut lo, ptr::null_mut(), 3), Err(Error::NullPointer("maximum"))));
            assert!(matches!((entry.function)(f.as_ptr(), &mut lo, &mut hi, 0), Err(Error::InvalidArgument("length"))));
            (entry.function)(f.as_ptr(), &mut lo, &mut hi, 3).unwrap();
        }
        assert_eq!((lo, hi), (-2.0, 8.0));
    }

    let mut dot = 0.0_f64;
    let a = [1.0_f64, 2.0];
    for entry in runnable(DOT_PRODUCT_V64F_V64F_S64F.table()) {
        // SAFETY: as above.
        unsafe {
            assert!(matches!((entry.function)(a.as_ptr(), misaligned(&a), &mut dot, 2), Err(Error::MisalignedPointer("y"))));
        }
    }
}

#[test]
fn test_math_kernels_validate_counts_last() {
    let coef = [1.0_f32, 1.0];
    let x = [2.0_f32; 4];
    let mut y = [0.0_f32; 4];
    for entry in runnable(EVALUATE_POLYNOMIAL_V32F_V32F_V32F.table()) {
        // SAFETY: failing calls touch nothing; the last one is in bounds.
        unsafe {
            assert!(matches!(
                (entry.function)(ptr::null(), x.as_ptr(), y.as_mut_ptr(), 0, 4),
                Err(Error::NullPointer("coef"))
            ));
            assert!(matches!(
                (entry.function)(coef.as_ptr(), x.as_ptr(), y.as_mut_ptr(), 0, 4),
                Err(Error::InvalidArgument("coef_count"))
            ));
            (entry.function)(coef.as_ptr(), x.as_ptr(), y.as_mut_ptr(), 2, 4).unwrap();
        }
        assert_eq!(y, [3.0; 4]);
    }

    let e = [0.0_f64; 2];
    let mut out = [0.0_f64; 3];
    for entry in runnable(EXP_V64F_V64F.table()) {
        // SAFETY: failing call touches nothing.
        unsafe {
            assert!(matches!(
                (entry.function)(e.as_ptr(), misaligned_mut(&mut out), 2),
                Err(Error::MisalignedPointer("y"))
            ));
        }
        assert_eq!(out, [0.0; 3]);
    }
}

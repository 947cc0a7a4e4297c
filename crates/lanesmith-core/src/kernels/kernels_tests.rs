//! Tests for the public kernels.

use std::collections::HashSet;

use super::core::*;
use super::math::*;
use super::*;
use crate::error::{Error, Status};

// =========================================================================
// Catalog
// =========================================================================

#[test]
fn test_catalog_identities_are_unique_and_valid() {
    let all = catalog();
    let mut seen = HashSet::new();
    for entry in &all {
        let spec = entry.spec();
        assert!(spec.validate().is_ok(), "{}", spec.identity());
        assert!(entry.validate().is_ok(), "{}", spec.identity());
        assert!(seen.insert(spec.identity()), "duplicate {}", spec.identity());
    }
    assert_eq!(seen.len(), all.len());
    assert!(all.len() > 150);
}

#[test]
fn test_catalog_contains_expected_identities() {
    for identity in [
        "Core_Add_V32sV32s_V32s",
        "Core_Multiply_V8uV8u_V16u",
        "Core_Subtract_S64fV64f_V64f",
        "Core_Add_IV32fV32f_IV32f",
        "Core_Max_IV64fS64f_IV64f",
        "Core_Min_V16u_S16u",
        "Core_MinMax_V64s_S64sS64s",
        "Core_SumSquares_V64f_S64f",
        "Core_DotProduct_V32fV32f_S32f",
        "Math_Log_V64f_V64f",
        "Math_EvaluatePolynomial_V32fV32f_V32f",
        "Core_Negate_V16s_V16s",
        "Core_Negate_IV64f_IV64f",
        "Core_Subtract_V8sIV8s_IV8s",
        "Core_Subtract_S64fIV64f_IV64f",
        "Core_Add_IV8sS8s_IV8s",
        "Core_Min_IV16uV16u_IV16u",
        "Core_Min_V64sV32s_V64s",
        "Core_Max_V64uS32u_V64u",
        "Core_Max_IV64sV32s_IV64s",
        "Core_Min_IV64uS32u_IV64u",
    ] {
        assert!(find(identity).is_some(), "missing {identity}");
    }
    assert!(find("Core_Add_V32sV32s_V64s").is_some());
    assert!(find("Core_Frobnicate_V32s_V32s").is_none());
}

#[test]
fn test_core_precedes_math() {
    let all = catalog();
    let first_math = all.iter().position(|e| e.spec().area == "Math").unwrap();
    assert!(all[first_math..].iter().all(|e| e.spec().area == "Math"));
    assert_eq!(all.len() - first_math, 7);
}

#[test]
fn test_init_reports_every_kernel_once() {
    let report = init();
    assert_eq!(report.kernels.len(), catalog().len());
    let again = init();
    for (a, b) in report.kernels.iter().zip(&again.kernels) {
        assert_eq!(a.identity, b.identity);
        assert_eq!(a.selected.index, b.selected.index);
        assert!(a.selected.index < a.candidates);
    }
}

#[test]
fn test_selection_is_stable_per_dispatcher() {
    let first = ADD_V32F_V32F_V32F.selected_index();
    let f = ADD_V32F_V32F_V32F.get();
    assert_eq!(ADD_V32F_V32F_V32F.selected_index(), first);
    assert_eq!(ADD_V32F_V32F_V32F.get() as usize, f as usize);
}

// =========================================================================
// Core
// =========================================================================

#[test]
fn test_add_i32_example() {
    let mut z = [0; 5];
    add_v32s_v32s_v32s(&[1, 2, 3, 4, 5], &[10, 20, 30, 40, 50], &mut z).unwrap();
    assert_eq!(z, [11, 22, 33, 44, 55]);
}

#[test]
fn test_integer_arithmetic_wraps() {
    let mut z = [0u8; 2];
    add_v8u_v8u_v8u(&[250, 0], &[10, 0], &mut z).unwrap();
    assert_eq!(z, [4, 0]);
    let mut z = [0i16; 1];
    multiply_v16s_v16s_v16s(&[i16::MAX], &[2], &mut z).unwrap();
    assert_eq!(z, [-2]);
}

#[test]
fn test_widening_multiply_does_not_overflow() {
    let x: Vec<i8> = vec![-128, 127, -1, 100];
    let y: Vec<i8> = vec![-128, 127, 1, -100];
    let mut z = vec![0i16; 4];
    multiply_v8s_v8s_v16s(&x, &y, &mut z).unwrap();
    assert_eq!(z, [16_384, 16_129, -1, -10_000]);

    let mut wide = vec![0u64; 2];
    multiply_v32u_v32u_v64u(&[u32::MAX, 3], &[u32::MAX, 5], &mut wide).unwrap();
    assert_eq!(wide, [u64::from(u32::MAX) * u64::from(u32::MAX), 15]);
}

#[test]
fn test_scalar_operands() {
    let x = [1.0, 2.0, 3.0];
    let mut z = [0.0; 3];
    subtract_v64f_s64f_v64f(&x, 0.5, &mut z).unwrap();
    assert_eq!(z, [0.5, 1.5, 2.5]);
    subtract_s64f_v64f_v64f(10.0, &x, &mut z).unwrap();
    assert_eq!(z, [9.0, 8.0, 7.0]);
    let mut m = [0i32; 3];
    max_v32s_s32s_v32s(&[-5, 0, 5], 1, &mut m).unwrap();
    assert_eq!(m, [1, 1, 5]);
}

#[test]
fn test_in_place_kernels() {
    let mut x = vec![1.0f32; 37];
    let y: Vec<f32> = (0..37).map(|i| i as f32).collect();
    add_iv32f_v32f_iv32f(&mut x, &y).unwrap();
    assert!(x.iter().enumerate().all(|(i, &v)| v == i as f32 + 1.0));
    multiply_iv32f_s32f_iv32f(&mut x, 2.0).unwrap();
    assert_eq!(x[36], 74.0);
    min_iv32u_s32u_iv32u(&mut [], 3).unwrap();
}

#[test]
fn test_narrow_in_place_kernels() {
    let mut x: Vec<i8> = vec![100, -100, 5, 0];
    add_iv8s_v8s_iv8s(&mut x, &[100, -100, 1, 0]).unwrap();
    assert_eq!(x, [-56, 56, 6, 0]);
    multiply_iv16s_s16s_iv16s(&mut [], 3).unwrap();
    let mut h: Vec<u16> = (0..40).collect();
    max_iv16u_s16u_iv16u(&mut h, 20).unwrap();
    assert!(h.iter().enumerate().all(|(i, &v)| v == (i as u16).max(20)));
    let mut b = [3u8, 200, 7];
    min_iv8u_v8u_iv8u(&mut b, &[4, 100, 7]).unwrap();
    assert_eq!(b, [3, 100, 7]);
}

#[test]
fn test_subtract_overwrites_second_operand() {
    let x: Vec<i32> = (0..50).collect();
    let mut y = vec![10i32; 50];
    subtract_v32s_iv32s_iv32s(&x, &mut y).unwrap();
    assert!(y.iter().enumerate().all(|(i, &v)| v == i as i32 - 10));

    let mut f = [1.0f64, 2.5, -4.0];
    subtract_s64f_iv64f_iv64f(10.0, &mut f).unwrap();
    assert_eq!(f, [9.0, 7.5, 14.0]);

    let mut w = [i8::MIN];
    subtract_s8s_iv8s_iv8s(0, &mut w).unwrap();
    assert_eq!(w, [i8::MIN]);
}

#[test]
fn test_negate_kernels() {
    let x: Vec<f32> = vec![0.0, -0.0, 1.5, f32::INFINITY];
    let mut y = vec![9.0f32; 4];
    negate_v32f_v32f(&x, &mut y).unwrap();
    assert_eq!(y[0].to_bits(), (-0.0f32).to_bits());
    assert_eq!(y[1].to_bits(), 0.0f32.to_bits());
    assert_eq!(&y[2..], &[-1.5, f32::NEG_INFINITY]);

    let mut v: Vec<i16> = (-60..60).collect();
    negate_iv16s_iv16s(&mut v).unwrap();
    assert!(v.iter().zip(-60i16..60).all(|(&a, b)| a == -b));

    let mut m = [i64::MIN, 1];
    negate_iv64s_iv64s(&mut m).unwrap();
    assert_eq!(m, [i64::MIN, -1]);
}

#[test]
fn test_mixed_width_min_max() {
    let x: Vec<i64> = vec![i64::MIN, i64::MAX, -5, 5];
    let y: Vec<i32> = vec![0, i32::MIN, -6, 4];
    let mut z = vec![0i64; 4];
    min_v64s_v32s_v64s(&x, &y, &mut z).unwrap();
    assert_eq!(z, [i64::MIN, i64::from(i32::MIN), -6, 4]);
    max_v64s_s32s_v64s(&x, -1, &mut z).unwrap();
    assert_eq!(z, [-1, i64::MAX, -1, 5]);

    let long: Vec<u64> = (0..700).map(|i| i * 1_000_000_000).collect();
    let narrow: Vec<u32> = (0..700).map(|i| u32::MAX - i).collect();
    let mut acc = long.clone();
    max_iv64u_v32u_iv64u(&mut acc, &narrow).unwrap();
    for i in 0..700 {
        assert_eq!(acc[i], long[i].max(u64::from(narrow[i])), "index {i}");
    }
    min_iv64u_s32u_iv64u(&mut acc, 7).unwrap();
    assert!(acc.iter().all(|&v| v <= 7));
}

#[test]
fn test_empty_arrays_succeed_for_maps() {
    let mut z: [f64; 0] = [];
    add_v64f_v64f_v64f(&[], &[], &mut z).unwrap();
    let mut y: [f64; 0] = [];
    log_v64f_v64f(&[], &mut y).unwrap();
}

#[test]
#[should_panic(expected = "Vector dimensions must match")]
fn test_mismatched_lengths_panic() {
    let mut z = [0; 2];
    let _ = add_v32s_v32s_v32s(&[1, 2], &[1, 2, 3], &mut z);
}

// =========================================================================
// Reductions
// =========================================================================

#[test]
fn test_empty_sums_are_zero() {
    assert_eq!(sum_v32f_s32f(&[]).unwrap(), 0.0);
    assert_eq!(sum_abs_v64f_s64f(&[]).unwrap(), 0.0);
    assert_eq!(sum_squares_v64f_s64f(&[]).unwrap(), 0.0);
    assert_eq!(dot_product_v64f_v64f_s64f(&[], &[]).unwrap(), 0.0);
}

#[test]
fn test_dot_product_example() {
    let dot = dot_product_v32f_v32f_s32f(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap();
    assert_eq!(dot, 32.0);
}

#[test]
fn test_sums_on_long_arrays() {
    let v: Vec<f64> = (0..1000).map(|i| f64::from(i) - 500.0).collect();
    assert_eq!(sum_v64f_s64f(&v).unwrap(), -500.0);
    assert_eq!(sum_abs_v64f_s64f(&v).unwrap(), 250_000.0);
    let squares: f64 = v.iter().map(|x| x * x).sum();
    assert_eq!(sum_squares_v64f_s64f(&v).unwrap(), squares);
}

#[test]
fn test_extrema_require_elements() {
    let err = min_v32s_s32s(&[]).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument("length")));
    assert_eq!(err.status(), Status::InvalidArgument);
    assert!(max_v8u_s8u(&[]).is_err());
    assert!(min_max_v64f_s64f_s64f(&[]).is_err());
}

#[test]
fn test_extrema_values() {
    let v: Vec<i16> = (0..300).map(|i| ((i * 37) % 301) as i16 - 150).collect();
    assert_eq!(min_v16s_s16s(&v).unwrap(), *v.iter().min().unwrap());
    assert_eq!(max_v16s_s16s(&v).unwrap(), *v.iter().max().unwrap());
    assert_eq!(
        min_max_v16s_s16s_s16s(&v).unwrap(),
        (*v.iter().min().unwrap(), *v.iter().max().unwrap())
    );
    assert_eq!(min_max_v64u_s64u_s64u(&[7]).unwrap(), (7, 7));
}

// =========================================================================
// Math
// =========================================================================

#[test]
fn test_log_special_values() {
    let x = [0.0, -1.0, f64::INFINITY, 1.0, f64::NAN];
    let mut y = [0.0; 5];
    log_v64f_v64f(&x, &mut y).unwrap();
    assert_eq!(y[0], f64::NEG_INFINITY);
    assert!(y[1].is_nan());
    assert_eq!(y[2], f64::INFINITY);
    assert_eq!(y[3], 0.0);
    assert!(y[4].is_nan());
}

#[test]
fn test_exp_overflow_and_underflow() {
    let mut y = [0.0; 3];
    exp_v64f_v64f(&[1000.0, -1000.0, 0.0], &mut y).unwrap();
    assert_eq!(y, [f64::INFINITY, 0.0, 1.0]);
}

#[test]
fn test_trig_kernels_agree_with_std() {
    let x: Vec<f64> = (0..200).map(|i| f64::from(i) * 0.05 - 5.0).collect();
    let (mut s, mut c, mut t) = (vec![0.0; 200], vec![0.0; 200], vec![0.0; 200]);
    sin_v64f_v64f(&x, &mut s).unwrap();
    cos_v64f_v64f(&x, &mut c).unwrap();
    tan_v64f_v64f(&x, &mut t).unwrap();
    for i in 0..200 {
        assert!((s[i] - x[i].sin()).abs() < 1e-14, "sin {}", x[i]);
        assert!((c[i] - x[i].cos()).abs() < 1e-14, "cos {}", x[i]);
        assert!((t[i] - x[i].tan()).abs() <= 1e-13 * x[i].tan().abs().max(1.0), "tan {}", x[i]);
    }
}

#[test]
fn test_polynomial_kernels() {
    let coef = [1.0f32, 2.0, 3.0];
    let x = [0.0f32, 1.0, 2.0, -1.0];
    let mut y = [0.0f32; 4];
    evaluate_polynomial_v32f_v32f_v32f(&coef, &x, &mut y).unwrap();
    assert_eq!(y, [1.0, 6.0, 17.0, 2.0]);

    let err = evaluate_polynomial_v64f_v64f_v64f(&[], &[1.0], &mut [0.0]).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument("coef_count")));
}

// =========================================================================
// Raw entry points
// =========================================================================

#[test]
fn test_raw_kernels_validate_pointers() {
    let x = [1i32; 4];
    let mut z = [0i32; 4];
    let err = unsafe { raw::add_v32s_v32s_v32s(x.as_ptr(), std::ptr::null(), z.as_mut_ptr(), 4) }
        .unwrap_err();
    assert!(matches!(err, Error::NullPointer("y")));
    assert_eq!(err.status(), Status::NullPointer);

    let misaligned = z.as_mut_ptr().cast::<u8>().wrapping_add(2).cast::<i32>();
    let err = unsafe { raw::add_v32s_v32s_v32s(x.as_ptr(), x.as_ptr(), misaligned, 4) }.unwrap_err();
    assert!(matches!(err, Error::MisalignedPointer("z")));
    assert_eq!(z, [0; 4]);

    let mut out = 0.0f64;
    let err = unsafe { raw::sum_v64f_s64f(std::ptr::null(), &mut out, 0) }.unwrap_err();
    assert!(matches!(err, Error::NullPointer("v")));
}

#[test]
fn test_raw_second_operand_kernels_validate_in_prototype_order() {
    let err = unsafe { raw::subtract_v32s_iv32s_iv32s(std::ptr::null(), std::ptr::null_mut(), 4) }
        .unwrap_err();
    assert!(matches!(err, Error::NullPointer("x")));

    let mut y = [0i64; 2];
    let misaligned = y.as_ptr().cast::<u8>().wrapping_add(2).cast::<i32>();
    let err = unsafe { raw::min_v64s_v32s_v64s(y.as_ptr(), misaligned, y.as_mut_ptr(), 2) }.unwrap_err();
    assert!(matches!(err, Error::MisalignedPointer("y")));

    let err = unsafe { raw::negate_iv32f_iv32f(std::ptr::null_mut(), 0) }.unwrap_err();
    assert!(matches!(err, Error::NullPointer("v")));
}

#[test]
fn test_raw_unary_accepts_aliased_output() {
    let mut v = [1.0, std::f64::consts::E, 0.5];
    let p = v.as_mut_ptr();
    unsafe { raw::log_v64f_v64f(p, p, 3).unwrap() };
    assert_eq!(v[0], 0.0);
    assert!((v[1] - 1.0).abs() < 1e-15);
    assert!((v[2] + std::f64::consts::LN_2).abs() < 1e-15);
}

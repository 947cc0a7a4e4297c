//! Tests for the per-target routines.
//!
//! Bodies are called directly for every target (they are plain Rust and
//! run anywhere); compiled entries only when the CPU qualifies.

use super::*;
use crate::cpu::{self, Microarchitecture as M};
use crate::error::Error;
use crate::pipeline::ops::{
    Add, DotProduct, Log, Max, Min, MinReduce, Multiply, Negate, Subtract, Sum,
};
use crate::schedule::TARGETS;

fn pattern_i32(len: usize, seed: i32) -> Vec<i32> {
    (0..len)
        .map(|i| (i as i32).wrapping_mul(2_654_435).wrapping_add(seed))
        .collect()
}

fn pattern_f64(len: usize, seed: f64) -> Vec<f64> {
    (0..len).map(|i| (i as f64 * 0.71 + seed).cos() * 3.0).collect()
}

const LENGTHS: [usize; 8] = [0, 1, 5, 16, 31, 64, 100, 513];

// =========================================================================
// Requirements
// =========================================================================

#[test]
fn test_every_target_has_a_requirement() {
    for microarch in TARGETS {
        let req = requirements::for_target(microarch).unwrap();
        assert!(!req.is_empty(), "{microarch}");
    }
    assert!(requirements::for_target(M::Unknown).is_none());
    assert!(requirements::for_target(M::Penryn).is_none());
}

#[test]
fn test_haswell_requirement_implies_sandybridge() {
    assert!(requirements::SANDYBRIDGE.is_satisfied_by(requirements::HASWELL));
    assert!(!requirements::HASWELL.is_satisfied_by(requirements::SANDYBRIDGE));
    assert!(requirements::CORTEX_A9.is_satisfied_by(requirements::CORTEX_A15));
}

// =========================================================================
// Bodies on every target
// =========================================================================

#[test]
fn test_binary_body_matches_default_on_every_target() {
    for microarch in TARGETS {
        for len in LENGTHS {
            let (x, y) = (pattern_i32(len, 7), pattern_i32(len, -3));
            let mut got = vec![0; len];
            let mut want = vec![0; len];
            unsafe {
                body::binary::<Add<i32>>(microarch, x.as_ptr(), y.as_ptr(), got.as_mut_ptr(), len).unwrap();
                scalar::binary::<Add<i32>>(x.as_ptr(), y.as_ptr(), want.as_mut_ptr(), len).unwrap();
            }
            assert_eq!(got, want, "{microarch} len {len}");
        }
    }
}

#[test]
fn test_widening_body_on_every_target() {
    for microarch in TARGETS {
        let x: Vec<i8> = (0..200).map(|i| (i % 256) as u8 as i8).collect();
        let y: Vec<i8> = (0..200).map(|i| ((i * 7 + 3) % 256) as u8 as i8).collect();
        let mut z = vec![0i16; 200];
        unsafe {
            body::binary::<Multiply<i8, i16>>(microarch, x.as_ptr(), y.as_ptr(), z.as_mut_ptr(), 200)
                .unwrap();
        }
        for i in 0..200 {
            assert_eq!(z[i], i16::from(x[i]) * i16::from(y[i]), "{microarch} at {i}");
        }
    }
}

#[test]
fn test_broadcast_bodies_on_every_target() {
    for microarch in TARGETS {
        let x = pattern_f64(77, 0.3);
        let mut vs = vec![0.0; 77];
        let mut sv = vec![0.0; 77];
        unsafe {
            body::vector_scalar::<Subtract<f64>>(microarch, x.as_ptr(), 1.5, vs.as_mut_ptr(), 77).unwrap();
            body::scalar_vector::<Subtract<f64>>(microarch, 1.5, x.as_ptr(), sv.as_mut_ptr(), 77).unwrap();
        }
        for i in 0..77 {
            assert_eq!(vs[i], x[i] - 1.5);
            assert_eq!(sv[i], 1.5 - x[i]);
        }
    }
}

#[test]
fn test_in_place_bodies_on_every_target() {
    for microarch in TARGETS {
        let y = pattern_i32(90, 11);
        let mut x = pattern_i32(90, 5);
        let original = x.clone();
        unsafe { body::in_place::<i32, Max<i32>>(microarch, x.as_mut_ptr(), y.as_ptr(), 90).unwrap() };
        for i in 0..90 {
            assert_eq!(x[i], original[i].max(y[i]));
        }
        unsafe { body::in_place_scalar::<i32, Add<i32>>(microarch, x.as_mut_ptr(), 1, 90).unwrap() };
        for i in 0..90 {
            assert_eq!(x[i], original[i].max(y[i]).wrapping_add(1));
        }
    }
}

#[test]
fn test_second_operand_bodies_on_every_target() {
    for microarch in TARGETS {
        for len in LENGTHS {
            let x = pattern_i32(len, 3);
            let original = pattern_i32(len, -9);
            let mut y = original.clone();
            unsafe { body::vector_into::<i32, Subtract<i32>>(microarch, x.as_ptr(), y.as_mut_ptr(), len).unwrap() };
            for i in 0..len {
                assert_eq!(y[i], x[i].wrapping_sub(original[i]), "{microarch} len {len} at {i}");
            }
            let mut f = pattern_f64(len, 0.1);
            let before = f.clone();
            unsafe { body::scalar_into::<f64, Subtract<f64>>(microarch, 2.0, f.as_mut_ptr(), len).unwrap() };
            assert!(f.iter().zip(&before).all(|(&a, &b)| a == 2.0 - b), "{microarch} len {len}");
        }
    }
}

#[test]
fn test_in_place_negate_body_on_every_target() {
    for microarch in TARGETS {
        for len in LENGTHS {
            let original = pattern_f64(len, 0.5);
            let mut v = original.clone();
            unsafe { body::in_place_unary::<f64, Negate<f64>>(microarch, v.as_mut_ptr(), len).unwrap() };
            assert!(v.iter().zip(&original).all(|(&a, &b)| a.to_bits() == (-b).to_bits()), "{microarch}");
        }
    }
}

#[test]
fn test_mixed_width_bodies_span_several_stages() {
    // Lengths around and past the widening stage size.
    for microarch in TARGETS {
        for len in [0, 3, 255, 256, 257, 700] {
            let x: Vec<i64> = (0..len).map(|i| (i as i64 - 300) * 10_000_000_000).collect();
            let y: Vec<i32> = pattern_i32(len, 17);
            let mut z = vec![0i64; len];
            let mut want = vec![0i64; len];
            unsafe {
                body::mixed_binary::<i64, i32, Min<i64>>(microarch, x.as_ptr(), y.as_ptr(), z.as_mut_ptr(), len)
                    .unwrap();
                scalar::mixed_binary::<i64, i32, Min<i64>>(x.as_ptr(), y.as_ptr(), want.as_mut_ptr(), len)
                    .unwrap();
            }
            assert_eq!(z, want, "{microarch} len {len}");

            let mut acc = x.clone();
            unsafe { body::mixed_in_place::<i64, i32, Max<i64>>(microarch, acc.as_mut_ptr(), y.as_ptr(), len).unwrap() };
            for i in 0..len {
                assert_eq!(acc[i], x[i].max(i64::from(y[i])), "{microarch} len {len} at {i}");
            }
        }
    }
}

#[test]
fn test_transcendental_body_is_bit_identical() {
    for microarch in TARGETS {
        let x: Vec<f64> = (1..=150).map(|i| f64::from(i) * 0.25).collect();
        let mut got = vec![0.0; 150];
        let mut want = vec![0.0; 150];
        unsafe {
            body::unary::<f64, Log>(microarch, x.as_ptr(), got.as_mut_ptr(), 150).unwrap();
            scalar::unary::<f64, Log>(x.as_ptr(), want.as_mut_ptr(), 150).unwrap();
        }
        assert!(got.iter().zip(&want).all(|(a, b)| a.to_bits() == b.to_bits()), "{microarch}");
    }
}

#[test]
fn test_reduction_bodies_on_every_target() {
    for microarch in TARGETS {
        for len in LENGTHS {
            let x = pattern_i32(len, 9);
            let y = pattern_i32(len, 4);
            let (mut sum, mut dot) = (0, 0);
            unsafe {
                body::reduce::<i32, Sum<i32>>(microarch, x.as_ptr(), &mut sum, len).unwrap();
                body::dot::<i32, DotProduct<i32>>(microarch, x.as_ptr(), y.as_ptr(), &mut dot, len).unwrap();
            }
            let want_sum = x.iter().fold(0i32, |a, &v| a.wrapping_add(v));
            let want_dot = x.iter().zip(&y).fold(0i32, |a, (&u, &v)| a.wrapping_add(u.wrapping_mul(v)));
            assert_eq!(sum, want_sum, "{microarch} len {len}");
            assert_eq!(dot, want_dot, "{microarch} len {len}");
        }
    }
}

#[test]
fn test_min_max_bodies_on_every_target() {
    for microarch in TARGETS {
        let v = pattern_f64(301, 1.1);
        let (mut lo, mut hi, mut min) = (0.0, 0.0, 0.0);
        unsafe {
            body::min_max::<f64>(microarch, v.as_ptr(), &mut lo, &mut hi, v.len()).unwrap();
            body::reduce::<f64, MinReduce<f64>>(microarch, v.as_ptr(), &mut min, v.len()).unwrap();
        }
        let want_lo = v.iter().copied().fold(f64::INFINITY, f64::min);
        let want_hi = v.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!((lo, hi), (want_lo, want_hi), "{microarch}");
        assert_eq!(min, want_lo);
    }
}

#[test]
fn test_bodies_without_a_plan_row_run_sequentially() {
    for microarch in [M::Penryn, M::Unknown] {
        for len in LENGTHS {
            let (x, y) = (pattern_i32(len, 2), pattern_i32(len, 11));
            let mut got = vec![0; len];
            let mut want = vec![0; len];
            let (mut sum, mut min) = (0, 0);
            unsafe {
                body::binary::<Add<i32>>(microarch, x.as_ptr(), y.as_ptr(), got.as_mut_ptr(), len).unwrap();
                scalar::binary::<Add<i32>>(x.as_ptr(), y.as_ptr(), want.as_mut_ptr(), len).unwrap();
                body::reduce::<i32, Sum<i32>>(microarch, x.as_ptr(), &mut sum, len).unwrap();
            }
            assert_eq!(got, want, "{microarch} len {len}");
            assert_eq!(sum, x.iter().fold(0i32, |a, &v| a.wrapping_add(v)));

            let status = unsafe { body::reduce::<i32, MinReduce<i32>>(microarch, x.as_ptr(), &mut min, len) };
            if len == 0 {
                assert!(matches!(status, Err(Error::InvalidArgument("length"))));
            } else {
                assert_eq!(min, *x.iter().min().unwrap());
            }
        }
    }
}

#[test]
fn test_polynomial_body_on_every_target() {
    let coef = [1.0, -0.5, 0.25, 2.0];
    for microarch in TARGETS {
        let x = pattern_f64(66, 0.0);
        let mut got = vec![0.0; 66];
        let mut want = vec![0.0; 66];
        unsafe {
            body::polynomial::<f64>(microarch, coef.as_ptr(), x.as_ptr(), got.as_mut_ptr(), 4, 66).unwrap();
            scalar::polynomial::<f64>(coef.as_ptr(), x.as_ptr(), want.as_mut_ptr(), 4, 66).unwrap();
        }
        assert!(got.iter().zip(&want).all(|(a, b)| a.to_bits() == b.to_bits()), "{microarch}");
    }
}

// =========================================================================
// Validation
// =========================================================================

#[test]
fn test_bodies_validate_before_touching_memory() {
    let x = [1.0f64; 4];
    let mut z = [0.0f64; 4];
    let err = unsafe {
        body::binary::<Add<f64>>(M::Haswell, x.as_ptr(), std::ptr::null(), z.as_mut_ptr(), 4)
    }
    .unwrap_err();
    assert!(matches!(err, Error::NullPointer("y")));

    let misaligned = z.as_mut_ptr().cast::<u8>().wrapping_add(4).cast::<f64>();
    let err = unsafe { body::unary::<f64, Log>(M::Nehalem, x.as_ptr(), misaligned, 0) }.unwrap_err();
    assert!(matches!(err, Error::MisalignedPointer("y")));
    assert_eq!(z, [0.0; 4]);
}

#[test]
fn test_polynomial_rejects_zero_count_even_for_empty_arrays() {
    let coef = [1.0f32];
    let x = [0.0f32; 1];
    let mut y = [7.0f32; 1];
    let err = unsafe { body::polynomial::<f32>(M::K10, coef.as_ptr(), x.as_ptr(), y.as_mut_ptr(), 0, 0) }
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument("coef_count")));
    unsafe { body::polynomial::<f32>(M::K10, coef.as_ptr(), x.as_ptr(), y.as_mut_ptr(), 1, 0).unwrap() };
    assert_eq!(y, [7.0]);
}

#[test]
fn test_empty_min_is_invalid_argument() {
    let v = [0u16; 1];
    let mut out = 0u16;
    let err = unsafe { body::reduce::<u16, MinReduce<u16>>(M::CortexA9, v.as_ptr(), &mut out, 0) }.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument("length")));
}

// =========================================================================
// Tables
// =========================================================================

#[test]
fn test_tables_are_well_formed() {
    let table = binary_table::<Add<f32>>();
    assert!(table.validate().is_ok());
    let tags: Vec<_> = table.entries().map(|e| e.microarch).collect();
    #[cfg(target_arch = "x86_64")]
    assert_eq!(tags, [M::Haswell, M::Bulldozer, M::SandyBridge, M::Nehalem, M::K10, M::Unknown]);
    #[cfg(target_arch = "aarch64")]
    assert_eq!(tags, [M::CortexA15, M::CortexA9, M::Unknown]);
    assert_eq!(tags.last(), Some(&M::Unknown));
    assert!(table.entries().take(table.len() - 1).all(|e| e.variant == PIPELINED_VARIANT));
}

#[test]
fn test_runnable_entries_match_default() {
    let detected = cpu::probe().features;
    let table = dot_table::<f64, DotProduct<f64>>();
    let x: Vec<f64> = (0..500).map(f64::from).collect();
    let y: Vec<f64> = (0..500).map(|i| f64::from(i % 7)).collect();
    let mut want = 0.0;
    unsafe { scalar::dot::<f64, DotProduct<f64>>(x.as_ptr(), y.as_ptr(), &mut want, 500).unwrap() };
    for entry in table.entries().filter(|e| e.required.is_satisfied_by(detected)) {
        let mut got = f64::NAN;
        unsafe { (entry.function)(x.as_ptr(), y.as_ptr(), &mut got, 500).unwrap() };
        // Integer-valued terms: exact in any order.
        assert_eq!(got, want, "{}", entry.microarch);
    }
}

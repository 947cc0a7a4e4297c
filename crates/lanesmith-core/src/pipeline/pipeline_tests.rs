//! Tests for the pipelined map and reduce bodies.
//!
//! Every run is compared against the sequential loop over the same scalar
//! operation, for every target row, over lengths that hit the prologue,
//! ramp-up only, several steady passes and the tail.

use super::ops::{Add, DotProduct, MaxReduce, MinMaxReduce, MinReduce, Multiply, Polynomial, Subtract, Sum};
use super::*;
use crate::element::ElementType;
use crate::schedule::{KernelShape, TargetPlan, TARGETS};
use crate::scalar::{fold_sequential, map_sequential};

fn schedule(
    microarch: crate::cpu::Microarchitecture,
    shape: KernelShape,
    element: ElementType,
    loads: &[Operand],
) -> PipelineSchedule {
    TargetPlan::find(microarch, shape)
        .and_then(|plan| plan.schedule(element, loads))
        .expect("every target row instantiates")
}

fn lengths(batch: usize) -> Vec<usize> {
    vec![0, 1, 7, batch - 1, batch, batch + 1, 2 * batch, 3 * batch + 5, 5 * batch + 17]
}

fn pattern_i32(n: usize, seed: i32) -> Vec<i32> {
    (0..n)
        .map(|i| (i as i32).wrapping_mul(seed).wrapping_add(i32::MAX.wrapping_sub(3 * seed)))
        .collect()
}

// =========================================================================
// Map bodies
// =========================================================================

#[test]
fn test_binary_add_matches_sequential_on_every_target() {
    for microarch in TARGETS {
        let s = schedule(microarch, KernelShape::Binary, ElementType::I32, &[Operand::X, Operand::Y]);
        for len in lengths(s.batch()) {
            for shift in 0..3 {
                let x = pattern_i32(len + shift, 7);
                let y = pattern_i32(len + shift, -13);
                let mut got = vec![0i32; len + shift];
                let mut want = vec![0i32; len + shift];
                let op = Add::<i32>::default();
                unsafe {
                    run_map(
                        &op,
                        &s,
                        Source::Vector(x[shift..].as_ptr()),
                        Source::Vector(y[shift..].as_ptr()),
                        got[shift..].as_mut_ptr(),
                        len,
                        Anchor::Output,
                    )
                    .unwrap();
                    map_sequential(
                        &op,
                        Source::Vector(x[shift..].as_ptr()),
                        Source::Vector(y[shift..].as_ptr()),
                        want[shift..].as_mut_ptr(),
                        len,
                    );
                }
                assert_eq!(got, want, "{microarch} len={len} shift={shift}");
            }
        }
    }
}

#[test]
fn test_widening_add_computes_in_output_type() {
    for microarch in TARGETS {
        let s = schedule(microarch, KernelShape::Widening, ElementType::I16, &[Operand::X, Operand::Y]);
        for len in lengths(s.batch()) {
            let x: Vec<i8> = (0..=len).map(|i| (i % 256) as u8 as i8).collect();
            let y: Vec<i8> = (0..=len).map(|i| ((i * 3 + 128) % 256) as u8 as i8).collect();
            let mut got = vec![0i16; len + 1];
            let op = Add::<i8, i16>::default();
            unsafe {
                run_map(
                    &op,
                    &s,
                    Source::Vector(x[1..].as_ptr()),
                    Source::Vector(y[1..].as_ptr()),
                    got[1..].as_mut_ptr(),
                    len,
                    Anchor::Input,
                )
                .unwrap();
            }
            for i in 0..len {
                assert_eq!(got[i + 1], i16::from(x[i + 1]) + i16::from(y[i + 1]), "{microarch} i={i}");
            }
        }
    }
}

#[test]
fn test_vector_scalar_broadcast() {
    for microarch in TARGETS {
        let s = schedule(microarch, KernelShape::Unary, ElementType::F64, &[Operand::X]);
        for len in lengths(s.batch()) {
            let x: Vec<f64> = (0..len).map(|i| i as f64 * 0.5).collect();
            let mut got = vec![0.0f64; len];
            unsafe {
                run_map(
                    &Subtract::<f64>::default(),
                    &s,
                    Source::Vector(x.as_ptr()),
                    Source::Broadcast(2.0),
                    got.as_mut_ptr(),
                    len,
                    Anchor::Output,
                )
                .unwrap();
            }
            for (i, v) in got.iter().enumerate() {
                assert_eq!(*v, i as f64 * 0.5 - 2.0);
            }
        }
    }
}

#[test]
fn test_scalar_vector_broadcast_binds_y() {
    let s = schedule(crate::cpu::Microarchitecture::Nehalem, KernelShape::Unary, ElementType::F32, &[Operand::Y]);
    let y: Vec<f32> = (0..100).map(|i| i as f32).collect();
    let mut got = vec![0.0f32; 100];
    unsafe {
        run_map(
            &Subtract::<f32>::default(),
            &s,
            Source::Broadcast(1000.0),
            Source::Vector(y.as_ptr()),
            got.as_mut_ptr(),
            100,
            Anchor::Output,
        )
        .unwrap();
    }
    for (i, v) in got.iter().enumerate() {
        assert_eq!(*v, 1000.0 - i as f32);
    }
}

#[test]
fn test_in_place_multiply_aliases_output() {
    for microarch in TARGETS {
        let s = schedule(microarch, KernelShape::Binary, ElementType::F32, &[Operand::X, Operand::Y]);
        let len = 4 * s.batch() + 3;
        let mut x: Vec<f32> = (0..len).map(|i| (i % 17) as f32).collect();
        let y: Vec<f32> = (0..len).map(|i| (i % 5) as f32 - 2.0).collect();
        let want: Vec<f32> = x.iter().zip(&y).map(|(a, b)| a * b).collect();
        let ptr = x.as_mut_ptr();
        unsafe {
            run_map(
                &Multiply::<f32>::default(),
                &s,
                Source::Vector(ptr.cast_const()),
                Source::Vector(y.as_ptr()),
                ptr,
                len,
                Anchor::Output,
            )
            .unwrap();
        }
        assert_eq!(x, want, "{microarch}");
    }
}

#[test]
fn test_zero_length_map_touches_nothing() {
    let s = schedule(crate::cpu::Microarchitecture::Haswell, KernelShape::Binary, ElementType::F32, &[Operand::X, Operand::Y]);
    let dangling = std::ptr::NonNull::<f32>::dangling().as_ptr();
    let result = unsafe {
        run_map(
            &Add::<f32>::default(),
            &s,
            Source::Vector(dangling.cast_const()),
            Source::Vector(dangling.cast_const()),
            dangling,
            0,
            Anchor::Output,
        )
    };
    assert!(result.is_ok());
}

#[test]
fn test_polynomial_pipeline_is_bit_identical() {
    let coef = [1.0f64, -0.5, 0.25, 0.125, -1.0 / 3.0];
    let op = unsafe { Polynomial::from_raw(coef.as_ptr(), coef.len()) };
    for microarch in TARGETS {
        let s = schedule(microarch, KernelShape::Transcendental, ElementType::F64, &[Operand::X]);
        let len = 3 * s.batch() + 1;
        let x: Vec<f64> = (0..len).map(|i| (i as f64 - 20.0) / 7.0).collect();
        let mut got = vec![0.0; len];
        let mut want = vec![0.0; len];
        unsafe {
            run_map(&op, &s, Source::Vector(x.as_ptr()), Source::Broadcast(0.0), got.as_mut_ptr(), len, Anchor::Output)
                .unwrap();
            map_sequential(&op, Source::Vector(x.as_ptr()), Source::Broadcast(0.0), want.as_mut_ptr(), len);
        }
        assert_eq!(got, want, "{microarch}");
    }
}

// =========================================================================
// Reduce bodies
// =========================================================================

#[test]
fn test_integer_sum_is_exact_on_every_target() {
    for microarch in TARGETS {
        let s = schedule(microarch, KernelShape::Reduce, ElementType::I32, &[Operand::X]);
        for len in lengths(s.batch()) {
            let x = pattern_i32(len + 1, 31);
            let op = Sum::<i32>::default();
            let got = unsafe { run_reduce(&op, &s, x[1..].as_ptr(), Source::Broadcast(0), len) };
            let want = unsafe { fold_sequential(&op, x[1..].as_ptr(), Source::Broadcast(0), len) };
            assert_eq!(got.unwrap(), want.unwrap(), "{microarch} len={len}");
        }
    }
}

#[test]
fn test_min_max_reductions_are_exact() {
    for microarch in TARGETS {
        let s = schedule(microarch, KernelShape::Reduce, ElementType::U16, &[Operand::X]);
        let len = 2 * s.batch() + 9;
        let x: Vec<u16> = (0..len).map(|i| ((i * 7919) % 65_521) as u16).collect();
        let lo = unsafe { run_reduce(&MinReduce::<u16>::default(), &s, x.as_ptr(), Source::Broadcast(0), len) };
        let hi = unsafe { run_reduce(&MaxReduce::<u16>::default(), &s, x.as_ptr(), Source::Broadcast(0), len) };
        let both = unsafe { run_reduce(&MinMaxReduce::<u16>::default(), &s, x.as_ptr(), Source::Broadcast(0), len) };
        let (want_lo, want_hi) = (*x.iter().min().unwrap(), *x.iter().max().unwrap());
        assert_eq!(lo.unwrap(), want_lo);
        assert_eq!(hi.unwrap(), want_hi);
        assert_eq!(both.unwrap(), (want_lo, want_hi));
    }
}

#[test]
fn test_dot_product_on_exact_values() {
    for microarch in TARGETS {
        let s = schedule(microarch, KernelShape::DotReduce, ElementType::F64, &[Operand::X, Operand::Y]);
        let len = 3 * s.batch() + 2;
        let x: Vec<f64> = (0..len).map(|i| (i % 8) as f64).collect();
        let y: Vec<f64> = (0..len).map(|i| (i % 3) as f64 - 1.0).collect();
        let want: f64 = x.iter().zip(&y).map(|(a, b)| a * b).sum();
        let got = unsafe {
            run_reduce(&DotProduct::<f64>::default(), &s, x.as_ptr(), Source::Vector(y.as_ptr()), len)
        };
        assert_eq!(got.unwrap(), want, "{microarch}");
    }
}

#[test]
fn test_float_sum_within_tolerance() {
    let s = schedule(crate::cpu::Microarchitecture::Haswell, KernelShape::Reduce, ElementType::F32, &[Operand::X]);
    let len = 1000;
    let x: Vec<f32> = (0..len).map(|i| ((i * 37) % 101) as f32 * 0.01).collect();
    let want: f64 = x.iter().map(|&v| f64::from(v)).sum();
    let got = unsafe { run_reduce(&Sum::<f32>::default(), &s, x.as_ptr(), Source::Broadcast(0.0), len) }.unwrap();
    assert!((f64::from(got) - want).abs() < 1e-2, "got {got}, want {want}");
}

#[test]
fn test_empty_reductions() {
    let s = schedule(crate::cpu::Microarchitecture::K10, KernelShape::Reduce, ElementType::F64, &[Operand::X]);
    let dangling = std::ptr::NonNull::<f64>::dangling().as_ptr().cast_const();
    let sum = unsafe { run_reduce(&Sum::<f64>::default(), &s, dangling, Source::Broadcast(0.0), 0) };
    assert_eq!(sum.unwrap(), 0.0);
    let min = unsafe { run_reduce(&MinReduce::<f64>::default(), &s, dangling, Source::Broadcast(0.0), 0) };
    assert!(matches!(min, Err(Error::InvalidArgument("length"))));
}

// =========================================================================
// Helpers
// =========================================================================

#[test]
fn test_check_pointer() {
    let v = [0u32; 4];
    assert!(check_pointer(v.as_ptr(), "x").is_ok());
    assert!(matches!(check_pointer(std::ptr::null::<u32>(), "x"), Err(Error::NullPointer("x"))));
    let odd = (v.as_ptr() as usize + 1) as *const u32;
    assert!(matches!(check_pointer(odd, "y"), Err(Error::MisalignedPointer("y"))));
    let bytes = [0u8; 4];
    assert!(check_pointer(bytes[1..].as_ptr(), "z").is_ok());
}

#[test]
fn test_prologue_len() {
    assert_eq!(prologue_len(64, 4, 16, 100), 0);
    assert_eq!(prologue_len(68, 4, 16, 100), 3);
    assert_eq!(prologue_len(68, 4, 16, 2), 2);
    assert_eq!(prologue_len(40, 8, 32, 100), 3);
}

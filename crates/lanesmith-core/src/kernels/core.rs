//! `Core` kernels: elementwise arithmetic, min/max and reductions.
//!
//! Integer arithmetic wraps. Widening variants convert both operands to the
//! output type before the operation. Floating-point sums may reassociate,
//! so specialized and Default results can differ in the last bits.

use crate::dispatch::{DispatchTable, Dispatcher, KernelEntry};
use crate::element::Element;
use crate::error::Result;
use crate::kernel_spec::{Argument, Count, KernelSpec};
use crate::native;
use crate::pipeline::ops::{
    Add, DotProduct, Max, MaxReduce, Min, MinReduce, Multiply, Negate, Subtract, Sum, SumAbs,
    SumSquares,
};
use crate::routine::{
    BinaryFn, DotFn, InPlaceFn, InPlaceScalarFn, InPlaceUnaryFn, MinMaxFn, MixedBinaryFn,
    MixedInPlaceFn, ReduceFn, ScalarIntoFn, ScalarVectorFn, UnaryFn, VectorIntoFn, VectorScalarFn,
};
use crate::scalar;
use crate::targets;

// =============================================================================
// z = f(x, y)
// =============================================================================

binary_kernels! {
    raw binary_raw, entries BINARY_ENTRIES;
    add_v8s_v8s_v8s, ADD_V8S_V8S_V8S: "Add" Add<i8>, i8 => i8;
    add_v8u_v8u_v8u, ADD_V8U_V8U_V8U: "Add" Add<u8>, u8 => u8;
    add_v16s_v16s_v16s, ADD_V16S_V16S_V16S: "Add" Add<i16>, i16 => i16;
    add_v16u_v16u_v16u, ADD_V16U_V16U_V16U: "Add" Add<u16>, u16 => u16;
    add_v32s_v32s_v32s, ADD_V32S_V32S_V32S: "Add" Add<i32>, i32 => i32;
    add_v32u_v32u_v32u, ADD_V32U_V32U_V32U: "Add" Add<u32>, u32 => u32;
    add_v64s_v64s_v64s, ADD_V64S_V64S_V64S: "Add" Add<i64>, i64 => i64;
    add_v64u_v64u_v64u, ADD_V64U_V64U_V64U: "Add" Add<u64>, u64 => u64;
    add_v32f_v32f_v32f, ADD_V32F_V32F_V32F: "Add" Add<f32>, f32 => f32;
    add_v64f_v64f_v64f, ADD_V64F_V64F_V64F: "Add" Add<f64>, f64 => f64;
    subtract_v8s_v8s_v8s, SUBTRACT_V8S_V8S_V8S: "Subtract" Subtract<i8>, i8 => i8;
    subtract_v8u_v8u_v8u, SUBTRACT_V8U_V8U_V8U: "Subtract" Subtract<u8>, u8 => u8;
    subtract_v16s_v16s_v16s, SUBTRACT_V16S_V16S_V16S: "Subtract" Subtract<i16>, i16 => i16;
    subtract_v16u_v16u_v16u, SUBTRACT_V16U_V16U_V16U: "Subtract" Subtract<u16>, u16 => u16;
    subtract_v32s_v32s_v32s, SUBTRACT_V32S_V32S_V32S: "Subtract" Subtract<i32>, i32 => i32;
    subtract_v32u_v32u_v32u, SUBTRACT_V32U_V32U_V32U: "Subtract" Subtract<u32>, u32 => u32;
    subtract_v64s_v64s_v64s, SUBTRACT_V64S_V64S_V64S: "Subtract" Subtract<i64>, i64 => i64;
    subtract_v64u_v64u_v64u, SUBTRACT_V64U_V64U_V64U: "Subtract" Subtract<u64>, u64 => u64;
    subtract_v32f_v32f_v32f, SUBTRACT_V32F_V32F_V32F: "Subtract" Subtract<f32>, f32 => f32;
    subtract_v64f_v64f_v64f, SUBTRACT_V64F_V64F_V64F: "Subtract" Subtract<f64>, f64 => f64;
    multiply_v8s_v8s_v8s, MULTIPLY_V8S_V8S_V8S: "Multiply" Multiply<i8>, i8 => i8;
    multiply_v8u_v8u_v8u, MULTIPLY_V8U_V8U_V8U: "Multiply" Multiply<u8>, u8 => u8;
    multiply_v16s_v16s_v16s, MULTIPLY_V16S_V16S_V16S: "Multiply" Multiply<i16>, i16 => i16;
    multiply_v16u_v16u_v16u, MULTIPLY_V16U_V16U_V16U: "Multiply" Multiply<u16>, u16 => u16;
    multiply_v32s_v32s_v32s, MULTIPLY_V32S_V32S_V32S: "Multiply" Multiply<i32>, i32 => i32;
    multiply_v32u_v32u_v32u, MULTIPLY_V32U_V32U_V32U: "Multiply" Multiply<u32>, u32 => u32;
    multiply_v64s_v64s_v64s, MULTIPLY_V64S_V64S_V64S: "Multiply" Multiply<i64>, i64 => i64;
    multiply_v64u_v64u_v64u, MULTIPLY_V64U_V64U_V64U: "Multiply" Multiply<u64>, u64 => u64;
    multiply_v32f_v32f_v32f, MULTIPLY_V32F_V32F_V32F: "Multiply" Multiply<f32>, f32 => f32;
    multiply_v64f_v64f_v64f, MULTIPLY_V64F_V64F_V64F: "Multiply" Multiply<f64>, f64 => f64;
    add_v8s_v8s_v16s, ADD_V8S_V8S_V16S: "Add" Add<i8, i16>, i8 => i16;
    add_v8u_v8u_v16u, ADD_V8U_V8U_V16U: "Add" Add<u8, u16>, u8 => u16;
    add_v16s_v16s_v32s, ADD_V16S_V16S_V32S: "Add" Add<i16, i32>, i16 => i32;
    add_v16u_v16u_v32u, ADD_V16U_V16U_V32U: "Add" Add<u16, u32>, u16 => u32;
    add_v32s_v32s_v64s, ADD_V32S_V32S_V64S: "Add" Add<i32, i64>, i32 => i64;
    add_v32u_v32u_v64u, ADD_V32U_V32U_V64U: "Add" Add<u32, u64>, u32 => u64;
    subtract_v8s_v8s_v16s, SUBTRACT_V8S_V8S_V16S: "Subtract" Subtract<i8, i16>, i8 => i16;
    subtract_v8u_v8u_v16u, SUBTRACT_V8U_V8U_V16U: "Subtract" Subtract<u8, u16>, u8 => u16;
    subtract_v16s_v16s_v32s, SUBTRACT_V16S_V16S_V32S: "Subtract" Subtract<i16, i32>, i16 => i32;
    subtract_v16u_v16u_v32u, SUBTRACT_V16U_V16U_V32U: "Subtract" Subtract<u16, u32>, u16 => u32;
    subtract_v32s_v32s_v64s, SUBTRACT_V32S_V32S_V64S: "Subtract" Subtract<i32, i64>, i32 => i64;
    subtract_v32u_v32u_v64u, SUBTRACT_V32U_V32U_V64U: "Subtract" Subtract<u32, u64>, u32 => u64;
    multiply_v8s_v8s_v16s, MULTIPLY_V8S_V8S_V16S: "Multiply" Multiply<i8, i16>, i8 => i16;
    multiply_v8u_v8u_v16u, MULTIPLY_V8U_V8U_V16U: "Multiply" Multiply<u8, u16>, u8 => u16;
    multiply_v16s_v16s_v32s, MULTIPLY_V16S_V16S_V32S: "Multiply" Multiply<i16, i32>, i16 => i32;
    multiply_v16u_v16u_v32u, MULTIPLY_V16U_V16U_V32U: "Multiply" Multiply<u16, u32>, u16 => u32;
    multiply_v32s_v32s_v64s, MULTIPLY_V32S_V32S_V64S: "Multiply" Multiply<i32, i64>, i32 => i64;
    multiply_v32u_v32u_v64u, MULTIPLY_V32U_V32U_V64U: "Multiply" Multiply<u32, u64>, u32 => u64;
    min_v8s_v8s_v8s, MIN_V8S_V8S_V8S: "Min" Min<i8>, i8 => i8;
    min_v8u_v8u_v8u, MIN_V8U_V8U_V8U: "Min" Min<u8>, u8 => u8;
    min_v16s_v16s_v16s, MIN_V16S_V16S_V16S: "Min" Min<i16>, i16 => i16;
    min_v16u_v16u_v16u, MIN_V16U_V16U_V16U: "Min" Min<u16>, u16 => u16;
    min_v32s_v32s_v32s, MIN_V32S_V32S_V32S: "Min" Min<i32>, i32 => i32;
    min_v32u_v32u_v32u, MIN_V32U_V32U_V32U: "Min" Min<u32>, u32 => u32;
    min_v32f_v32f_v32f, MIN_V32F_V32F_V32F: "Min" Min<f32>, f32 => f32;
    min_v64f_v64f_v64f, MIN_V64F_V64F_V64F: "Min" Min<f64>, f64 => f64;
    max_v8s_v8s_v8s, MAX_V8S_V8S_V8S: "Max" Max<i8>, i8 => i8;
    max_v8u_v8u_v8u, MAX_V8U_V8U_V8U: "Max" Max<u8>, u8 => u8;
    max_v16s_v16s_v16s, MAX_V16S_V16S_V16S: "Max" Max<i16>, i16 => i16;
    max_v16u_v16u_v16u, MAX_V16U_V16U_V16U: "Max" Max<u16>, u16 => u16;
    max_v32s_v32s_v32s, MAX_V32S_V32S_V32S: "Max" Max<i32>, i32 => i32;
    max_v32u_v32u_v32u, MAX_V32U_V32U_V32U: "Max" Max<u32>, u32 => u32;
    max_v32f_v32f_v32f, MAX_V32F_V32F_V32F: "Max" Max<f32>, f32 => f32;
    max_v64f_v64f_v64f, MAX_V64F_V64F_V64F: "Max" Max<f64>, f64 => f64;
}

// =============================================================================
// z = f(x, scalar) and z = f(scalar, y)
// =============================================================================

vector_scalar_kernels! {
    raw vector_scalar_raw, entries VECTOR_SCALAR_ENTRIES;
    add_v32s_s32s_v32s, ADD_V32S_S32S_V32S: "Add" Add<i32>, i32;
    add_v64s_s64s_v64s, ADD_V64S_S64S_V64S: "Add" Add<i64>, i64;
    add_v32f_s32f_v32f, ADD_V32F_S32F_V32F: "Add" Add<f32>, f32;
    add_v64f_s64f_v64f, ADD_V64F_S64F_V64F: "Add" Add<f64>, f64;
    subtract_v32s_s32s_v32s, SUBTRACT_V32S_S32S_V32S: "Subtract" Subtract<i32>, i32;
    subtract_v64s_s64s_v64s, SUBTRACT_V64S_S64S_V64S: "Subtract" Subtract<i64>, i64;
    subtract_v32f_s32f_v32f, SUBTRACT_V32F_S32F_V32F: "Subtract" Subtract<f32>, f32;
    subtract_v64f_s64f_v64f, SUBTRACT_V64F_S64F_V64F: "Subtract" Subtract<f64>, f64;
    multiply_v32s_s32s_v32s, MULTIPLY_V32S_S32S_V32S: "Multiply" Multiply<i32>, i32;
    multiply_v64s_s64s_v64s, MULTIPLY_V64S_S64S_V64S: "Multiply" Multiply<i64>, i64;
    multiply_v32f_s32f_v32f, MULTIPLY_V32F_S32F_V32F: "Multiply" Multiply<f32>, f32;
    multiply_v64f_s64f_v64f, MULTIPLY_V64F_S64F_V64F: "Multiply" Multiply<f64>, f64;
    min_v32s_s32s_v32s, MIN_V32S_S32S_V32S: "Min" Min<i32>, i32;
    min_v32u_s32u_v32u, MIN_V32U_S32U_V32U: "Min" Min<u32>, u32;
    min_v32f_s32f_v32f, MIN_V32F_S32F_V32F: "Min" Min<f32>, f32;
    min_v64f_s64f_v64f, MIN_V64F_S64F_V64F: "Min" Min<f64>, f64;
    max_v32s_s32s_v32s, MAX_V32S_S32S_V32S: "Max" Max<i32>, i32;
    max_v32u_s32u_v32u, MAX_V32U_S32U_V32U: "Max" Max<u32>, u32;
    max_v32f_s32f_v32f, MAX_V32F_S32F_V32F: "Max" Max<f32>, f32;
    max_v64f_s64f_v64f, MAX_V64F_S64F_V64F: "Max" Max<f64>, f64;
}

scalar_vector_kernels! {
    raw scalar_vector_raw, entries SCALAR_VECTOR_ENTRIES;
    subtract_s32s_v32s_v32s, SUBTRACT_S32S_V32S_V32S: "Subtract" Subtract<i32>, i32;
    subtract_s64s_v64s_v64s, SUBTRACT_S64S_V64S_V64S: "Subtract" Subtract<i64>, i64;
    subtract_s32f_v32f_v32f, SUBTRACT_S32F_V32F_V32F: "Subtract" Subtract<f32>, f32;
    subtract_s64f_v64f_v64f, SUBTRACT_S64F_V64F_V64F: "Subtract" Subtract<f64>, f64;
}

// =============================================================================
// In place
// =============================================================================

in_place_kernels! {
    raw in_place_raw, entries IN_PLACE_ENTRIES;
    add_iv32s_v32s_iv32s, ADD_IV32S_V32S_IV32S: "Add" Add<i32>, i32, vector;
    add_iv32s_s32s_iv32s, ADD_IV32S_S32S_IV32S: "Add" Add<i32>, i32, scalar;
    add_iv64s_v64s_iv64s, ADD_IV64S_V64S_IV64S: "Add" Add<i64>, i64, vector;
    add_iv64s_s64s_iv64s, ADD_IV64S_S64S_IV64S: "Add" Add<i64>, i64, scalar;
    add_iv32f_v32f_iv32f, ADD_IV32F_V32F_IV32F: "Add" Add<f32>, f32, vector;
    add_iv32f_s32f_iv32f, ADD_IV32F_S32F_IV32F: "Add" Add<f32>, f32, scalar;
    add_iv64f_v64f_iv64f, ADD_IV64F_V64F_IV64F: "Add" Add<f64>, f64, vector;
    add_iv64f_s64f_iv64f, ADD_IV64F_S64F_IV64F: "Add" Add<f64>, f64, scalar;
    subtract_iv32s_v32s_iv32s, SUBTRACT_IV32S_V32S_IV32S: "Subtract" Subtract<i32>, i32, vector;
    subtract_iv32s_s32s_iv32s, SUBTRACT_IV32S_S32S_IV32S: "Subtract" Subtract<i32>, i32, scalar;
    subtract_iv64s_v64s_iv64s, SUBTRACT_IV64S_V64S_IV64S: "Subtract" Subtract<i64>, i64, vector;
    subtract_iv64s_s64s_iv64s, SUBTRACT_IV64S_S64S_IV64S: "Subtract" Subtract<i64>, i64, scalar;
    subtract_iv32f_v32f_iv32f, SUBTRACT_IV32F_V32F_IV32F: "Subtract" Subtract<f32>, f32, vector;
    subtract_iv32f_s32f_iv32f, SUBTRACT_IV32F_S32F_IV32F: "Subtract" Subtract<f32>, f32, scalar;
    subtract_iv64f_v64f_iv64f, SUBTRACT_IV64F_V64F_IV64F: "Subtract" Subtract<f64>, f64, vector;
    subtract_iv64f_s64f_iv64f, SUBTRACT_IV64F_S64F_IV64F: "Subtract" Subtract<f64>, f64, scalar;
    multiply_iv32s_v32s_iv32s, MULTIPLY_IV32S_V32S_IV32S: "Multiply" Multiply<i32>, i32, vector;
    multiply_iv32s_s32s_iv32s, MULTIPLY_IV32S_S32S_IV32S: "Multiply" Multiply<i32>, i32, scalar;
    multiply_iv64s_v64s_iv64s, MULTIPLY_IV64S_V64S_IV64S: "Multiply" Multiply<i64>, i64, vector;
    multiply_iv64s_s64s_iv64s, MULTIPLY_IV64S_S64S_IV64S: "Multiply" Multiply<i64>, i64, scalar;
    multiply_iv32f_v32f_iv32f, MULTIPLY_IV32F_V32F_IV32F: "Multiply" Multiply<f32>, f32, vector;
    multiply_iv32f_s32f_iv32f, MULTIPLY_IV32F_S32F_IV32F: "Multiply" Multiply<f32>, f32, scalar;
    multiply_iv64f_v64f_iv64f, MULTIPLY_IV64F_V64F_IV64F: "Multiply" Multiply<f64>, f64, vector;
    multiply_iv64f_s64f_iv64f, MULTIPLY_IV64F_S64F_IV64F: "Multiply" Multiply<f64>, f64, scalar;
    min_iv32s_v32s_iv32s, MIN_IV32S_V32S_IV32S: "Min" Min<i32>, i32, vector;
    min_iv32s_s32s_iv32s, MIN_IV32S_S32S_IV32S: "Min" Min<i32>, i32, scalar;
    min_iv32u_v32u_iv32u, MIN_IV32U_V32U_IV32U: "Min" Min<u32>, u32, vector;
    min_iv32u_s32u_iv32u, MIN_IV32U_S32U_IV32U: "Min" Min<u32>, u32, scalar;
    min_iv32f_v32f_iv32f, MIN_IV32F_V32F_IV32F: "Min" Min<f32>, f32, vector;
    min_iv32f_s32f_iv32f, MIN_IV32F_S32F_IV32F: "Min" Min<f32>, f32, scalar;
    min_iv64f_v64f_iv64f, MIN_IV64F_V64F_IV64F: "Min" Min<f64>, f64, vector;
    min_iv64f_s64f_iv64f, MIN_IV64F_S64F_IV64F: "Min" Min<f64>, f64, scalar;
    max_iv32s_v32s_iv32s, MAX_IV32S_V32S_IV32S: "Max" Max<i32>, i32, vector;
    max_iv32s_s32s_iv32s, MAX_IV32S_S32S_IV32S: "Max" Max<i32>, i32, scalar;
    max_iv32u_v32u_iv32u, MAX_IV32U_V32U_IV32U: "Max" Max<u32>, u32, vector;
    max_iv32u_s32u_iv32u, MAX_IV32U_S32U_IV32U: "Max" Max<u32>, u32, scalar;
    max_iv32f_v32f_iv32f, MAX_IV32F_V32F_IV32F: "Max" Max<f32>, f32, vector;
    max_iv32f_s32f_iv32f, MAX_IV32F_S32F_IV32F: "Max" Max<f32>, f32, scalar;
    max_iv64f_v64f_iv64f, MAX_IV64F_V64F_IV64F: "Max" Max<f64>, f64, vector;
    max_iv64f_s64f_iv64f, MAX_IV64F_S64F_IV64F: "Max" Max<f64>, f64, scalar;
    add_iv8s_v8s_iv8s, ADD_IV8S_V8S_IV8S: "Add" Add<i8>, i8, vector;
    add_iv8s_s8s_iv8s, ADD_IV8S_S8S_IV8S: "Add" Add<i8>, i8, scalar;
    add_iv16s_v16s_iv16s, ADD_IV16S_V16S_IV16S: "Add" Add<i16>, i16, vector;
    add_iv16s_s16s_iv16s, ADD_IV16S_S16S_IV16S: "Add" Add<i16>, i16, scalar;
    subtract_iv8s_v8s_iv8s, SUBTRACT_IV8S_V8S_IV8S: "Subtract" Subtract<i8>, i8, vector;
    subtract_iv8s_s8s_iv8s, SUBTRACT_IV8S_S8S_IV8S: "Subtract" Subtract<i8>, i8, scalar;
    subtract_iv16s_v16s_iv16s, SUBTRACT_IV16S_V16S_IV16S: "Subtract" Subtract<i16>, i16, vector;
    subtract_iv16s_s16s_iv16s, SUBTRACT_IV16S_S16S_IV16S: "Subtract" Subtract<i16>, i16, scalar;
    multiply_iv8s_v8s_iv8s, MULTIPLY_IV8S_V8S_IV8S: "Multiply" Multiply<i8>, i8, vector;
    multiply_iv8s_s8s_iv8s, MULTIPLY_IV8S_S8S_IV8S: "Multiply" Multiply<i8>, i8, scalar;
    multiply_iv16s_v16s_iv16s, MULTIPLY_IV16S_V16S_IV16S: "Multiply" Multiply<i16>, i16, vector;
    multiply_iv16s_s16s_iv16s, MULTIPLY_IV16S_S16S_IV16S: "Multiply" Multiply<i16>, i16, scalar;
    min_iv8s_v8s_iv8s, MIN_IV8S_V8S_IV8S: "Min" Min<i8>, i8, vector;
    min_iv8s_s8s_iv8s, MIN_IV8S_S8S_IV8S: "Min" Min<i8>, i8, scalar;
    min_iv8u_v8u_iv8u, MIN_IV8U_V8U_IV8U: "Min" Min<u8>, u8, vector;
    min_iv8u_s8u_iv8u, MIN_IV8U_S8U_IV8U: "Min" Min<u8>, u8, scalar;
    min_iv16s_v16s_iv16s, MIN_IV16S_V16S_IV16S: "Min" Min<i16>, i16, vector;
    min_iv16s_s16s_iv16s, MIN_IV16S_S16S_IV16S: "Min" Min<i16>, i16, scalar;
    min_iv16u_v16u_iv16u, MIN_IV16U_V16U_IV16U: "Min" Min<u16>, u16, vector;
    min_iv16u_s16u_iv16u, MIN_IV16U_S16U_IV16U: "Min" Min<u16>, u16, scalar;
    max_iv8s_v8s_iv8s, MAX_IV8S_V8S_IV8S: "Max" Max<i8>, i8, vector;
    max_iv8s_s8s_iv8s, MAX_IV8S_S8S_IV8S: "Max" Max<i8>, i8, scalar;
    max_iv8u_v8u_iv8u, MAX_IV8U_V8U_IV8U: "Max" Max<u8>, u8, vector;
    max_iv8u_s8u_iv8u, MAX_IV8U_S8U_IV8U: "Max" Max<u8>, u8, scalar;
    max_iv16s_v16s_iv16s, MAX_IV16S_V16S_IV16S: "Max" Max<i16>, i16, vector;
    max_iv16s_s16s_iv16s, MAX_IV16S_S16S_IV16S: "Max" Max<i16>, i16, scalar;
    max_iv16u_v16u_iv16u, MAX_IV16U_V16U_IV16U: "Max" Max<u16>, u16, vector;
    max_iv16u_s16u_iv16u, MAX_IV16U_S16U_IV16U: "Max" Max<u16>, u16, scalar;
    subtract_v8s_iv8s_iv8s, SUBTRACT_V8S_IV8S_IV8S: "Subtract" Subtract<i8>, i8, vector_into;
    subtract_v16s_iv16s_iv16s, SUBTRACT_V16S_IV16S_IV16S: "Subtract" Subtract<i16>, i16, vector_into;
    subtract_v32s_iv32s_iv32s, SUBTRACT_V32S_IV32S_IV32S: "Subtract" Subtract<i32>, i32, vector_into;
    subtract_v64s_iv64s_iv64s, SUBTRACT_V64S_IV64S_IV64S: "Subtract" Subtract<i64>, i64, vector_into;
    subtract_v32f_iv32f_iv32f, SUBTRACT_V32F_IV32F_IV32F: "Subtract" Subtract<f32>, f32, vector_into;
    subtract_v64f_iv64f_iv64f, SUBTRACT_V64F_IV64F_IV64F: "Subtract" Subtract<f64>, f64, vector_into;
    subtract_s8s_iv8s_iv8s, SUBTRACT_S8S_IV8S_IV8S: "Subtract" Subtract<i8>, i8, scalar_into;
    subtract_s16s_iv16s_iv16s, SUBTRACT_S16S_IV16S_IV16S: "Subtract" Subtract<i16>, i16, scalar_into;
    subtract_s32s_iv32s_iv32s, SUBTRACT_S32S_IV32S_IV32S: "Subtract" Subtract<i32>, i32, scalar_into;
    subtract_s64s_iv64s_iv64s, SUBTRACT_S64S_IV64S_IV64S: "Subtract" Subtract<i64>, i64, scalar_into;
    subtract_s32f_iv32f_iv32f, SUBTRACT_S32F_IV32F_IV32F: "Subtract" Subtract<f32>, f32, scalar_into;
    subtract_s64f_iv64f_iv64f, SUBTRACT_S64F_IV64F_IV64F: "Subtract" Subtract<f64>, f64, scalar_into;
}

// =============================================================================
// Negation
// =============================================================================

unary_kernels! {
    area "Core", raw negate_raw, entries NEGATE_ENTRIES;
    negate_v8s_v8s, NEGATE_V8S_V8S: "Negate" Negate<i8>, i8, vector;
    negate_v16s_v16s, NEGATE_V16S_V16S: "Negate" Negate<i16>, i16, vector;
    negate_v32s_v32s, NEGATE_V32S_V32S: "Negate" Negate<i32>, i32, vector;
    negate_v64s_v64s, NEGATE_V64S_V64S: "Negate" Negate<i64>, i64, vector;
    negate_v32f_v32f, NEGATE_V32F_V32F: "Negate" Negate<f32>, f32, vector;
    negate_v64f_v64f, NEGATE_V64F_V64F: "Negate" Negate<f64>, f64, vector;
    negate_iv8s_iv8s, NEGATE_IV8S_IV8S: "Negate" Negate<i8>, i8, in_place;
    negate_iv16s_iv16s, NEGATE_IV16S_IV16S: "Negate" Negate<i16>, i16, in_place;
    negate_iv32s_iv32s, NEGATE_IV32S_IV32S: "Negate" Negate<i32>, i32, in_place;
    negate_iv64s_iv64s, NEGATE_IV64S_IV64S: "Negate" Negate<i64>, i64, in_place;
    negate_iv32f_iv32f, NEGATE_IV32F_IV32F: "Negate" Negate<f32>, f32, in_place;
    negate_iv64f_iv64f, NEGATE_IV64F_IV64F: "Negate" Negate<f64>, f64, in_place;
}

// =============================================================================
// Mixed width: 64-bit x with a 32-bit y
// =============================================================================

mixed_kernels! {
    raw mixed_raw, entries MIXED_ENTRIES;
    min_v64s_v32s_v64s, MIN_V64S_V32S_V64S: "Min" Min<i64>, i64, i32, vector;
    min_v64s_s32s_v64s, MIN_V64S_S32S_V64S: "Min" Min<i64>, i64, i32, scalar;
    min_iv64s_v32s_iv64s, MIN_IV64S_V32S_IV64S: "Min" Min<i64>, i64, i32, in_place;
    min_iv64s_s32s_iv64s, MIN_IV64S_S32S_IV64S: "Min" Min<i64>, i64, i32, in_place_scalar;
    min_v64u_v32u_v64u, MIN_V64U_V32U_V64U: "Min" Min<u64>, u64, u32, vector;
    min_v64u_s32u_v64u, MIN_V64U_S32U_V64U: "Min" Min<u64>, u64, u32, scalar;
    min_iv64u_v32u_iv64u, MIN_IV64U_V32U_IV64U: "Min" Min<u64>, u64, u32, in_place;
    min_iv64u_s32u_iv64u, MIN_IV64U_S32U_IV64U: "Min" Min<u64>, u64, u32, in_place_scalar;
    max_v64s_v32s_v64s, MAX_V64S_V32S_V64S: "Max" Max<i64>, i64, i32, vector;
    max_v64s_s32s_v64s, MAX_V64S_S32S_V64S: "Max" Max<i64>, i64, i32, scalar;
    max_iv64s_v32s_iv64s, MAX_IV64S_V32S_IV64S: "Max" Max<i64>, i64, i32, in_place;
    max_iv64s_s32s_iv64s, MAX_IV64S_S32S_IV64S: "Max" Max<i64>, i64, i32, in_place_scalar;
    max_v64u_v32u_v64u, MAX_V64U_V32U_V64U: "Max" Max<u64>, u64, u32, vector;
    max_v64u_s32u_v64u, MAX_V64U_S32U_V64U: "Max" Max<u64>, u64, u32, scalar;
    max_iv64u_v32u_iv64u, MAX_IV64U_V32U_IV64U: "Max" Max<u64>, u64, u32, in_place;
    max_iv64u_s32u_iv64u, MAX_IV64U_S32U_IV64U: "Max" Max<u64>, u64, u32, in_place_scalar;
}

// =============================================================================
// Reductions
// =============================================================================

fn sum_f32_table() -> DispatchTable<ReduceFn<f32>> {
    let mut entries = native::sum_f32();
    entries.extend(targets::reduce_entries::<f32, Sum<f32>>());
    DispatchTable::new(entries, scalar::reduce::<f32, Sum<f32>> as ReduceFn<f32>)
}

fn sum_f64_table() -> DispatchTable<ReduceFn<f64>> {
    let mut entries = native::sum_f64();
    entries.extend(targets::reduce_entries::<f64, Sum<f64>>());
    DispatchTable::new(entries, scalar::reduce::<f64, Sum<f64>> as ReduceFn<f64>)
}

fn sum_squares_f32_table() -> DispatchTable<ReduceFn<f32>> {
    let mut entries = native::sum_squares_f32();
    entries.extend(targets::reduce_entries::<f32, SumSquares<f32>>());
    DispatchTable::new(entries, scalar::reduce::<f32, SumSquares<f32>> as ReduceFn<f32>)
}

fn sum_squares_f64_table() -> DispatchTable<ReduceFn<f64>> {
    let mut entries = native::sum_squares_f64();
    entries.extend(targets::reduce_entries::<f64, SumSquares<f64>>());
    DispatchTable::new(entries, scalar::reduce::<f64, SumSquares<f64>> as ReduceFn<f64>)
}

fn dot_f32_table() -> DispatchTable<DotFn<f32>> {
    let mut entries = native::dot_f32();
    entries.extend(targets::dot_entries::<f32, DotProduct<f32>>());
    DispatchTable::new(entries, scalar::dot::<f32, DotProduct<f32>> as DotFn<f32>)
}

fn dot_f64_table() -> DispatchTable<DotFn<f64>> {
    let mut entries = native::dot_f64();
    entries.extend(targets::dot_entries::<f64, DotProduct<f64>>());
    DispatchTable::new(entries, scalar::dot::<f64, DotProduct<f64>> as DotFn<f64>)
}

reduce_kernels! {
    raw reduce_raw, entries REDUCE_ENTRIES;
    min_v8s_s8s, MIN_V8S_S8S: "Min" i8, non_zero, table targets::reduce_table::<i8, MinReduce<i8>>;
    min_v8u_s8u, MIN_V8U_S8U: "Min" u8, non_zero, table targets::reduce_table::<u8, MinReduce<u8>>;
    min_v16s_s16s, MIN_V16S_S16S: "Min" i16, non_zero, table targets::reduce_table::<i16, MinReduce<i16>>;
    min_v16u_s16u, MIN_V16U_S16U: "Min" u16, non_zero, table targets::reduce_table::<u16, MinReduce<u16>>;
    min_v32s_s32s, MIN_V32S_S32S: "Min" i32, non_zero, table targets::reduce_table::<i32, MinReduce<i32>>;
    min_v32u_s32u, MIN_V32U_S32U: "Min" u32, non_zero, table targets::reduce_table::<u32, MinReduce<u32>>;
    min_v64s_s64s, MIN_V64S_S64S: "Min" i64, non_zero, table targets::reduce_table::<i64, MinReduce<i64>>;
    min_v64u_s64u, MIN_V64U_S64U: "Min" u64, non_zero, table targets::reduce_table::<u64, MinReduce<u64>>;
    min_v32f_s32f, MIN_V32F_S32F: "Min" f32, non_zero, table targets::reduce_table::<f32, MinReduce<f32>>;
    min_v64f_s64f, MIN_V64F_S64F: "Min" f64, non_zero, table targets::reduce_table::<f64, MinReduce<f64>>;
    max_v8s_s8s, MAX_V8S_S8S: "Max" i8, non_zero, table targets::reduce_table::<i8, MaxReduce<i8>>;
    max_v8u_s8u, MAX_V8U_S8U: "Max" u8, non_zero, table targets::reduce_table::<u8, MaxReduce<u8>>;
    max_v16s_s16s, MAX_V16S_S16S: "Max" i16, non_zero, table targets::reduce_table::<i16, MaxReduce<i16>>;
    max_v16u_s16u, MAX_V16U_S16U: "Max" u16, non_zero, table targets::reduce_table::<u16, MaxReduce<u16>>;
    max_v32s_s32s, MAX_V32S_S32S: "Max" i32, non_zero, table targets::reduce_table::<i32, MaxReduce<i32>>;
    max_v32u_s32u, MAX_V32U_S32U: "Max" u32, non_zero, table targets::reduce_table::<u32, MaxReduce<u32>>;
    max_v64s_s64s, MAX_V64S_S64S: "Max" i64, non_zero, table targets::reduce_table::<i64, MaxReduce<i64>>;
    max_v64u_s64u, MAX_V64U_S64U: "Max" u64, non_zero, table targets::reduce_table::<u64, MaxReduce<u64>>;
    max_v32f_s32f, MAX_V32F_S32F: "Max" f32, non_zero, table targets::reduce_table::<f32, MaxReduce<f32>>;
    max_v64f_s64f, MAX_V64F_S64F: "Max" f64, non_zero, table targets::reduce_table::<f64, MaxReduce<f64>>;
    sum_v32f_s32f, SUM_V32F_S32F: "Sum" f32, any, table sum_f32_table;
    sum_v64f_s64f, SUM_V64F_S64F: "Sum" f64, any, table sum_f64_table;
    sum_abs_v32f_s32f, SUM_ABS_V32F_S32F: "SumAbs" f32, any, table targets::reduce_table::<f32, SumAbs<f32>>;
    sum_abs_v64f_s64f, SUM_ABS_V64F_S64F: "SumAbs" f64, any, table targets::reduce_table::<f64, SumAbs<f64>>;
    sum_squares_v32f_s32f, SUM_SQUARES_V32F_S32F: "SumSquares" f32, any, table sum_squares_f32_table;
    sum_squares_v64f_s64f, SUM_SQUARES_V64F_S64F: "SumSquares" f64, any, table sum_squares_f64_table;
}

min_max_kernels! {
    raw min_max_raw, entries MIN_MAX_ENTRIES;
    min_max_v8s_s8s_s8s, MIN_MAX_V8S_S8S_S8S: i8;
    min_max_v8u_s8u_s8u, MIN_MAX_V8U_S8U_S8U: u8;
    min_max_v16s_s16s_s16s, MIN_MAX_V16S_S16S_S16S: i16;
    min_max_v16u_s16u_s16u, MIN_MAX_V16U_S16U_S16U: u16;
    min_max_v32s_s32s_s32s, MIN_MAX_V32S_S32S_S32S: i32;
    min_max_v32u_s32u_s32u, MIN_MAX_V32U_S32U_S32U: u32;
    min_max_v64s_s64s_s64s, MIN_MAX_V64S_S64S_S64S: i64;
    min_max_v64u_s64u_s64u, MIN_MAX_V64U_S64U_S64U: u64;
    min_max_v32f_s32f_s32f, MIN_MAX_V32F_S32F_S32F: f32;
    min_max_v64f_s64f_s64f, MIN_MAX_V64F_S64F_S64F: f64;
}

dot_kernels! {
    raw dot_raw, entries DOT_ENTRIES;
    dot_product_v32f_v32f_s32f, DOT_PRODUCT_V32F_V32F_S32F: f32, table dot_f32_table;
    dot_product_v64f_v64f_s64f, DOT_PRODUCT_V64F_V64F_S64F: f64, table dot_f64_table;
}

pub(crate) fn groups() -> [&'static [&'static dyn KernelEntry]; 9] {
    [
        BINARY_ENTRIES,
        VECTOR_SCALAR_ENTRIES,
        SCALAR_VECTOR_ENTRIES,
        IN_PLACE_ENTRIES,
        NEGATE_ENTRIES,
        MIXED_ENTRIES,
        REDUCE_ENTRIES,
        MIN_MAX_ENTRIES,
        DOT_ENTRIES,
    ]
}

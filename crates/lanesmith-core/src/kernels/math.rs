//! `Math` kernels over `f64` arrays, plus polynomial evaluation.
//!
//! Log, Exp, Sin, Cos and Tan share one scalar implementation between the
//! Default and every target, so results are identical whichever entry is
//! selected. Special values follow IEEE-754: `log(0) = -inf`,
//! `log(x < 0) = NaN`, `exp` overflows to `+inf` and underflows to `0`.

use crate::dispatch::{Dispatcher, KernelEntry};
use crate::element::Element;
use crate::error::Result;
use crate::kernel_spec::{Argument, Count, KernelSpec};
use crate::pipeline::ops::{Cos, Exp, Log, Sin, Tan};
use crate::routine::{PolynomialFn, UnaryFn};
use crate::targets;

unary_kernels! {
    area "Math", raw unary_raw, entries UNARY_ENTRIES;
    log_v64f_v64f, LOG_V64F_V64F: "Log" Log, f64, vector;
    exp_v64f_v64f, EXP_V64F_V64F: "Exp" Exp, f64, vector;
    sin_v64f_v64f, SIN_V64F_V64F: "Sin" Sin, f64, vector;
    cos_v64f_v64f, COS_V64F_V64F: "Cos" Cos, f64, vector;
    tan_v64f_v64f, TAN_V64F_V64F: "Tan" Tan, f64, vector;
}

polynomial_kernels! {
    raw polynomial_raw, entries POLYNOMIAL_ENTRIES;
    evaluate_polynomial_v32f_v32f_v32f, EVALUATE_POLYNOMIAL_V32F_V32F_V32F: f32;
    evaluate_polynomial_v64f_v64f_v64f, EVALUATE_POLYNOMIAL_V64F_V64F_V64F: f64;
}

pub(crate) fn groups() -> [&'static [&'static dyn KernelEntry]; 2] {
    [UNARY_ENTRIES, POLYNOMIAL_ENTRIES]
}

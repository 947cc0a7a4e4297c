//! # Lanesmith Core
//!
//! Software-pipelined SIMD kernels, one schedule per CPU microarchitecture,
//! selected at run time by the capabilities of the host.
//!
//! ## Features
//!
//! - **Core kernels**: element-wise add/subtract/multiply/min/max (same-type,
//!   widening, vector-scalar, in-place) and sum/min/max/dot-product reductions
//!   over all ten integer and floating-point element types
//! - **Math kernels**: `log`, `exp`, `sin`, `cos`, `tan` on `f64` arrays and
//!   polynomial evaluation on `f32`/`f64`
//! - **Runtime dispatch**: a descriptor table per kernel, resolved once per
//!   process against the detected [`cpu::FeatureSet`]; the portable Default
//!   entry is always last and always eligible
//! - **Generator**: renders every kernel's schedule as x86, NEON or portable
//!   listings and writes a JSON manifest of the descriptor tables
//!
//! ## Quick Start
//!
//! ```rust
//! use lanesmith_core::kernels::core::{add_v32s_v32s_v32s, sum_v64f_s64f};
//!
//! fn main() -> lanesmith_core::Result<()> {
//!     let x = [1, 2, 3, 4, 5];
//!     let y = [10, 20, 30, 40, 50];
//!     let mut z = [0; 5];
//!     add_v32s_v32s_v32s(&x, &y, &mut z)?;
//!     assert_eq!(z, [11, 22, 33, 44, 55]);
//!
//!     assert_eq!(sum_v64f_s64f(&[0.5, 1.5, 2.0])?, 4.0);
//!
//!     // Optional: resolve every kernel up front and see what was picked.
//!     let report = lanesmith_core::init();
//!     println!("{} kernels on {}", report.kernels.len(), report.cpu.microarchitecture);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(
    test,
    allow(
        clippy::float_cmp,
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        clippy::cast_possible_wrap
    )
)]

pub mod codegen;
pub mod config;
pub mod cpu;
pub mod dispatch;
pub mod element;
pub mod error;
pub mod ir;
pub mod kernel_spec;
pub mod kernels;
pub mod math;
mod native;
pub mod pipeline;
pub mod routine;
pub mod scalar;
pub mod schedule;
pub mod targets;

pub use codegen::{BackendKind, GenerationReport, Generator};
pub use config::GeneratorConfig;
pub use cpu::{probe, CpuInfo, FeatureSet, Microarchitecture};
pub use dispatch::{DispatchTable, Dispatcher, InitReport, KernelEntry};
pub use element::{Element, ElementType};
pub use error::{Error, Result, Status};
pub use kernel_spec::KernelSpec;
pub use kernels::{catalog, find, init};

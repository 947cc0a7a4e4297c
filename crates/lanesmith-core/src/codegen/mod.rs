//! Emitted form of the kernel body generator.
//!
//! [`RoutineBody`] is the same structure the executable pipeline runs
//! (validation, zero-length exit, alignment prologue, the three pipeline
//! passes, accumulator combine, scalar tail), captured as data for one
//! kernel on one microarchitecture. A [`Backend`] turns it into a textual
//! listing; [`Generator`] renders the whole catalog and writes the
//! descriptor-table manifest.

mod backend;
mod generator;
mod neon;
mod portable;
mod x86;

use serde::Serialize;

use crate::cpu::Microarchitecture;
use crate::element::ElementType;
use crate::error::Result;
use crate::ir::{MicroOp, Operand};
use crate::kernel_spec::{ArgumentKind, KernelSpec, Parameter};
use crate::schedule::{KernelShape, PipelineSchedule, ReductionTree, TargetPlan};

pub use backend::{Backend, BackendKind, Listing, ScalarPhase};
pub use generator::{GenerationReport, Generator, Manifest, ManifestKernel, ManifestSchedule};
pub use neon::NeonBackend;
pub use portable::PortableBackend;
pub use x86::X86Backend;

/// Parameter check performed before any memory access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum Check {
    /// Pointer must not be null, else `NullPointer`.
    NonNull {
        /// Parameter name.
        name: String,
    },
    /// Pointer must be aligned to `bytes`, else `MisalignedPointer`.
    Aligned {
        /// Parameter name.
        name: String,
        /// Required alignment.
        bytes: usize,
    },
    /// Count must not be zero, else `InvalidArgument`.
    NonZero {
        /// Parameter name.
        name: String,
    },
}

/// Where each IR operand lives in the exported prototype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bindings {
    /// Parameter loaded or broadcast as `X`.
    pub x: Option<String>,
    /// Parameter loaded or broadcast as `Y`.
    pub y: Option<String>,
    /// Parameter stored as `Z`, or the reduction result(s).
    pub z: Vec<String>,
    /// Scalar inputs broadcast to every lane.
    pub broadcast: Vec<Operand>,
}

impl Bindings {
    /// Parameter bound to `operand`.
    #[must_use]
    pub fn name(&self, operand: Operand) -> &str {
        let bound = match operand {
            Operand::X => self.x.as_deref(),
            Operand::Y => self.y.as_deref(),
            Operand::Z => self.z.first().map(String::as_str),
        };
        bound.unwrap_or(operand.name())
    }
}

/// One kernel's body on one target, ready for a backend.
#[derive(Debug, Clone, Serialize)]
pub struct RoutineBody {
    /// `Area_Function_Signature`.
    pub identity: String,
    /// Operation name, e.g. `Add`.
    pub function: &'static str,
    /// Target.
    pub microarch: Microarchitecture,
    /// Plan row used.
    pub shape: KernelShape,
    /// Type of the loaded elements.
    pub input_element: ElementType,
    /// Computation (and output) type.
    pub element: ElementType,
    /// Prototype parameters.
    pub parameters: Vec<Parameter>,
    /// Checks, in the order they are performed.
    pub checks: Vec<Check>,
    /// Operand bindings.
    pub bindings: Bindings,
    /// Pointer the alignment prologue aligns to a register boundary.
    pub anchor: String,
    /// Software pipeline.
    pub schedule: PipelineSchedule,
    /// Accumulator combination, for reductions.
    pub combine: Option<ReductionTree>,
    /// The kernel reads a coefficient table (`EvaluatePolynomial`).
    pub coefficients: Option<String>,
}

impl RoutineBody {
    /// Builds the body of `spec` for `microarch`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Schedule` when the target has no plan row for the
    /// kernel's shape or the row does not validate for its element type.
    pub fn build(spec: &KernelSpec, microarch: Microarchitecture) -> Result<Self> {
        let layout = Layout::of(spec);
        let input_element = spec.inputs.first().map_or(spec.widest_element(), |a| a.element);
        let element = spec.widest_element();
        let schedule = TargetPlan::find(microarch, layout.shape)?.schedule(element, &layout.loads)?;
        let combine = layout.shape.is_reduction().then(|| schedule.reduction());

        Ok(Self {
            identity: spec.identity(),
            function: spec.function,
            microarch,
            shape: layout.shape,
            input_element,
            element,
            parameters: spec.parameters(),
            checks: checks(spec),
            anchor: layout.anchor,
            bindings: layout.bindings,
            schedule,
            combine,
            coefficients: layout.coefficients,
        })
    }

    /// Elements consumed by one steady-state pass.
    #[must_use]
    pub fn batch(&self) -> usize {
        self.schedule.batch()
    }

    /// Ramp-up ops.
    pub fn ramp_up(&self) -> impl Iterator<Item = MicroOp> + '_ {
        self.schedule.ramp_up()
    }

    /// Ops of one steady-state pass.
    pub fn steady_state(&self) -> impl Iterator<Item = MicroOp> + '_ {
        self.schedule.steady_state()
    }

    /// Ramp-down ops.
    pub fn ramp_down(&self) -> impl Iterator<Item = MicroOp> + '_ {
        self.schedule.ramp_down()
    }

    /// The length operand must be non-zero.
    #[must_use]
    pub fn requires_elements(&self) -> bool {
        self.checks
            .iter()
            .any(|c| matches!(c, Check::NonZero { name } if name == "length"))
    }
}

/// Checks in prototype order: each pointer's null test followed by its
/// alignment test, then the non-zero counts.
fn checks(spec: &KernelSpec) -> Vec<Check> {
    let params = spec.parameters();
    let mut out = Vec::with_capacity(params.len() * 2);
    for param in &params {
        if param.non_null {
            out.push(Check::NonNull { name: param.name.clone() });
        }
        if param.alignment > 1 {
            out.push(Check::Aligned {
                name: param.name.clone(),
                bytes: param.alignment,
            });
        }
    }
    out.extend(
        params
            .iter()
            .filter(|p| p.non_zero)
            .map(|p| Check::NonZero { name: p.name.clone() }),
    );
    out
}

/// Shape, loaded operands and bindings derived from a spec.
struct Layout {
    shape: KernelShape,
    loads: Vec<Operand>,
    bindings: Bindings,
    anchor: String,
    coefficients: Option<String>,
}

impl Layout {
    fn of(spec: &KernelSpec) -> Self {
        let vector_inputs: Vec<&str> = spec
            .inputs
            .iter()
            .filter(|a| a.kind == ArgumentKind::Vector)
            .map(|a| a.name)
            .collect();
        let outputs: Vec<String> = spec.outputs.iter().map(|a| a.name.to_string()).collect();
        let scalar_output = spec.outputs.iter().all(|a| a.kind == ArgumentKind::Scalar);

        if scalar_output {
            let dot = vector_inputs.len() == 2;
            return Self {
                shape: if dot { KernelShape::DotReduce } else { KernelShape::Reduce },
                loads: if dot { vec![Operand::X, Operand::Y] } else { vec![Operand::X] },
                bindings: Bindings {
                    x: vector_inputs.first().map(ToString::to_string),
                    y: vector_inputs.get(1).map(ToString::to_string),
                    z: outputs,
                    broadcast: Vec::new(),
                },
                anchor: vector_inputs.first().map_or_else(String::new, ToString::to_string),
                coefficients: None,
            };
        }

        let output = outputs.first().cloned().unwrap_or_default();
        let widening = spec
            .inputs
            .first()
            .is_some_and(|a| a.element != spec.widest_element());

        // A count besides the length indexes a coefficient table.
        if !spec.counts.is_empty() {
            let table = vector_inputs.first().map(ToString::to_string);
            return Self {
                shape: KernelShape::Transcendental,
                loads: vec![Operand::X],
                bindings: Bindings {
                    x: vector_inputs.get(1).map(ToString::to_string),
                    y: None,
                    z: outputs,
                    broadcast: Vec::new(),
                },
                anchor: output,
                coefficients: table,
            };
        }

        if spec.area == "Math" {
            return Self {
                shape: KernelShape::Transcendental,
                loads: vec![Operand::X],
                bindings: Bindings {
                    x: vector_inputs.first().map(ToString::to_string),
                    y: None,
                    z: outputs,
                    broadcast: Vec::new(),
                },
                anchor: output,
                coefficients: None,
            };
        }

        let names: Vec<&str> = spec.inputs.iter().map(|a| a.name).collect();
        let kinds: Vec<ArgumentKind> = spec.inputs.iter().map(|a| a.kind).collect();
        let (shape, loads, broadcast) = match kinds.as_slice() {
            [ArgumentKind::Vector, ArgumentKind::Vector] if widening => {
                (KernelShape::Widening, vec![Operand::X, Operand::Y], Vec::new())
            }
            [ArgumentKind::Vector, ArgumentKind::Vector] => {
                (KernelShape::Binary, vec![Operand::X, Operand::Y], Vec::new())
            }
            [ArgumentKind::Vector, ArgumentKind::Scalar] => {
                (KernelShape::Unary, vec![Operand::X], vec![Operand::Y])
            }
            [ArgumentKind::Scalar, ArgumentKind::Vector] => {
                (KernelShape::Unary, vec![Operand::Y], vec![Operand::X])
            }
            _ => (KernelShape::Unary, vec![Operand::X], Vec::new()),
        };
        let anchor = if widening {
            vector_inputs.first().map_or_else(String::new, ToString::to_string)
        } else {
            output
        };
        Self {
            shape,
            loads,
            bindings: Bindings {
                x: names.first().map(ToString::to_string),
                y: names.get(1).map(ToString::to_string),
                z: outputs,
                broadcast,
            },
            anchor,
            coefficients: None,
        }
    }
}

#[cfg(test)]
mod codegen_tests;

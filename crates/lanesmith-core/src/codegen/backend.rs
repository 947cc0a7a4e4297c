//! Listing backends.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Check, RoutineBody};
use crate::cpu::Microarchitecture;
use crate::ir::{MicroOp, Operand};
use crate::kernel_spec::{Direction, Parameter};
use crate::schedule::ReductionTree;

/// Available backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// SSE/AVX mnemonics.
    X86,
    /// ARMv7 NEON/VFP mnemonics.
    Neon,
    /// Target-independent lane pseudocode.
    Portable,
}

impl BackendKind {
    /// Every backend.
    pub const ALL: [Self; 3] = [Self::X86, Self::Neon, Self::Portable];

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::X86 => "x86",
            Self::Neon => "neon",
            Self::Portable => "portable",
        }
    }

    /// Backend instance.
    #[must_use]
    pub fn instance(self) -> Box<dyn Backend> {
        match self {
            Self::X86 => Box::new(super::X86Backend),
            Self::Neon => Box::new(super::NeonBackend),
            Self::Portable => Box::new(super::PortableBackend),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown backend '{s}' (expected x86, neon or portable)"))
    }
}

/// Scalar loop position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarPhase {
    /// Elements before the anchor pointer reaches a register boundary.
    Align,
    /// Elements after the last full batch.
    Tail,
}

/// Rendered routines of one backend for one target.
#[derive(Debug, Clone)]
pub struct Listing {
    /// Backend that produced the text.
    pub backend: BackendKind,
    /// Target.
    pub microarch: Microarchitecture,
    /// Routines in the listing.
    pub routines: usize,
    /// Listing text.
    pub text: String,
}

impl Listing {
    /// File name relative to the backend's output directory.
    #[must_use]
    pub fn file_name(&self) -> String {
        let ext = match self.backend {
            BackendKind::X86 | BackendKind::Neon => "s",
            BackendKind::Portable => "txt",
        };
        format!("{}.{ext}", self.microarch.name().to_ascii_lowercase())
    }
}

/// Renders [`RoutineBody`] values into text.
///
/// Implementors provide the instruction-level pieces; [`Backend::render`]
/// lays the sections out in execution order. Registers are named by bank
/// (`x`, `y`, `z`, `acc`, `b` for broadcasts) and index, not allocated.
pub trait Backend: Send + Sync {
    /// Backend identity.
    fn kind(&self) -> BackendKind;

    /// True when the backend emits code for `microarch`.
    fn supports(&self, microarch: Microarchitecture) -> bool;

    /// Line comment prefix.
    fn comment(&self) -> &'static str {
        "//"
    }

    /// Routine entry (symbol, directives).
    fn entry(&self, body: &RoutineBody) -> Vec<String>;

    /// One parameter check.
    fn check(&self, body: &RoutineBody, check: &Check) -> Vec<String>;

    /// Successful exit when the length is zero.
    fn zero_length(&self, body: &RoutineBody) -> Vec<String>;

    /// Element-at-a-time loop.
    fn scalar_loop(&self, body: &RoutineBody, phase: ScalarPhase) -> Vec<String>;

    /// Skips the pipeline when fewer than two batches remain.
    fn pipeline_guard(&self, body: &RoutineBody) -> Vec<String>;

    /// Accumulator initialization, reductions only.
    fn init_accumulators(&self, body: &RoutineBody) -> Vec<String>;

    /// One micro-op.
    fn instruction(&self, body: &RoutineBody, op: MicroOp) -> String;

    /// Repeats the steady state while a full batch remains.
    fn loop_back(&self, body: &RoutineBody) -> Vec<String>;

    /// Folds the partial accumulators into the result.
    fn combine(&self, body: &RoutineBody, tree: ReductionTree) -> Vec<String>;

    /// Stores results and returns `Ok`.
    fn exit(&self, body: &RoutineBody) -> Vec<String>;

    /// Local label.
    fn label(&self, body: &RoutineBody, name: &str) -> String {
        format!(".L{}_{name}:", body.identity)
    }

    /// File preamble.
    fn preamble(&self, microarch: Microarchitecture) -> Vec<String> {
        vec![format!(
            "{} lanesmith {} listing for {microarch}",
            self.comment(),
            self.kind()
        )]
    }

    /// Full routine text.
    fn render(&self, body: &RoutineBody) -> String {
        let c = self.comment();
        let schedule = &body.schedule;
        let mut out = String::new();
        let _ = writeln!(out, "{c} {} ({})", body.identity, body.microarch);
        let _ = writeln!(
            out,
            "{c} {} shape, {} x {} lanes of {}, batch {}",
            body.shape,
            schedule.unroll(),
            schedule.lanes(),
            body.element,
            body.batch()
        );
        for param in &body.parameters {
            let _ = writeln!(out, "{c}   {}", describe(param));
        }
        push(&mut out, self.entry(body));
        for check in &body.checks {
            push(&mut out, self.check(body, check));
        }
        if !body.requires_elements() {
            push(&mut out, self.zero_length(body));
        }
        if body.combine.is_some() {
            push(&mut out, self.init_accumulators(body));
        }
        push(&mut out, vec![self.label(body, "align")]);
        push(&mut out, self.scalar_loop(body, ScalarPhase::Align));
        push(&mut out, self.pipeline_guard(body));

        push(&mut out, vec![self.label(body, "ramp_up")]);
        push(&mut out, body.ramp_up().map(|op| self.instruction(body, op)).collect());
        push(&mut out, vec![self.label(body, "steady")]);
        push(&mut out, body.steady_state().map(|op| self.instruction(body, op)).collect());
        push(&mut out, self.loop_back(body));
        push(&mut out, vec![self.label(body, "ramp_down")]);
        push(&mut out, body.ramp_down().map(|op| self.instruction(body, op)).collect());

        if let Some(tree) = body.combine {
            push(&mut out, vec![self.label(body, "combine")]);
            push(&mut out, self.combine(body, tree));
        }
        push(&mut out, vec![self.label(body, "tail")]);
        push(&mut out, self.scalar_loop(body, ScalarPhase::Tail));
        push(&mut out, self.exit(body));
        out
    }
}

fn push(out: &mut String, lines: Vec<String>) {
    for line in lines {
        if line.ends_with(':') {
            out.push_str(&line);
        } else {
            out.push_str("    ");
            out.push_str(&line);
        }
        out.push('\n');
    }
}

/// `name: direction type [constraints]`.
pub(crate) fn describe(param: &Parameter) -> String {
    let direction = match param.direction {
        Direction::In => "in",
        Direction::Out => "out",
        Direction::InOut => "inout",
    };
    let ty = match (param.element, param.pointer) {
        (Some(e), true) => format!("*{e}"),
        (Some(e), false) => e.to_string(),
        (None, _) => "usize".to_string(),
    };
    let mut constraints = Vec::new();
    if param.non_null {
        constraints.push("non-null".to_string());
    }
    if param.alignment > 1 {
        constraints.push(format!("align {}", param.alignment));
    }
    if param.non_zero {
        constraints.push("non-zero".to_string());
    }
    if constraints.is_empty() {
        format!("{}: {direction} {ty}", param.name)
    } else {
        format!("{}: {direction} {ty} [{}]", param.name, constraints.join(", "))
    }
}

/// Register bank of an operand inside `body`: broadcast scalars live in `b`.
pub(crate) fn bank(body: &RoutineBody, operand: Operand) -> &'static str {
    if body.bindings.broadcast.contains(&operand) {
        return "b";
    }
    operand.name()
}

/// Input registers a compute or accumulate op reads, in operand order.
pub(crate) fn sources(body: &RoutineBody, register: usize) -> Vec<(&'static str, usize)> {
    let mut regs = Vec::with_capacity(2);
    for operand in [Operand::X, Operand::Y] {
        if body.bindings.broadcast.contains(&operand) {
            regs.push(("b", 0));
        } else if body.schedule.streams().iter().any(|s| s.kind.cursor() == Some(operand)) {
            regs.push((operand.name(), register));
        }
    }
    regs
}

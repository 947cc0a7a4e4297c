//! SSE/AVX listings.
//!
//! 32-byte plans use `ymm` registers, 16-byte plans `xmm`; targets with AVX
//! use the VEX (`v`-prefixed, three-operand) forms throughout. Operations
//! with no single instruction (64-bit multiply and min/max before AVX-512,
//! byte multiply, the transcendental functions) call a lane helper.

use super::backend::{bank, sources, Backend, BackendKind, ScalarPhase};
use super::{Check, RoutineBody};
use crate::cpu::{Architecture, Microarchitecture};
use crate::element::ElementType;
use crate::ir::MicroOp;
use crate::schedule::ReductionTree;

/// x86 backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct X86Backend;

fn vex(microarch: Microarchitecture) -> bool {
    matches!(
        microarch,
        Microarchitecture::Haswell | Microarchitecture::SandyBridge | Microarchitecture::Bulldozer
    )
}

fn fused(microarch: Microarchitecture) -> Option<&'static str> {
    match microarch {
        Microarchitecture::Haswell => Some("vfmadd231"),
        Microarchitecture::Bulldozer => Some("vfmadd"),
        _ => None,
    }
}

fn width(body: &RoutineBody) -> &'static str {
    if body.schedule.register_bytes() == 32 {
        "ymm"
    } else {
        "xmm"
    }
}

fn reg(body: &RoutineBody, bank: &str, index: usize) -> String {
    format!("%{}_{bank}{index}", width(body))
}

fn int_suffix(element: ElementType) -> &'static str {
    match element.size() {
        1 => "b",
        2 => "w",
        4 => "d",
        _ => "q",
    }
}

fn float_suffix(element: ElementType) -> &'static str {
    if element == ElementType::F32 {
        "ps"
    } else {
        "pd"
    }
}

/// Packed mnemonic for `function` on `element`, or the helper to call.
fn arithmetic(function: &str, element: ElementType) -> Result<String, String> {
    if element.is_float() {
        let root = match function {
            "Add" | "Sum" | "SumAbs" | "SumSquares" | "DotProduct" => "add",
            "Subtract" => "sub",
            "Multiply" => "mul",
            "Min" | "MinMax" => "min",
            "Max" => "max",
            other => return Err(format!("lanesmith_{}_{}", other.to_ascii_lowercase(), float_suffix(element))),
        };
        return Ok(format!("{root}{}", float_suffix(element)));
    }
    let sign = if element.is_signed() { "s" } else { "u" };
    let suffix = int_suffix(element);
    match (function, element.size()) {
        ("Add", _) => Ok(format!("padd{suffix}")),
        ("Subtract", _) => Ok(format!("psub{suffix}")),
        ("Multiply", 2) => Ok("pmullw".to_string()),
        ("Multiply", 4) => Ok("pmulld".to_string()),
        ("Min" | "MinMax", 1..=4) => Ok(format!("pmin{sign}{suffix}")),
        ("Max", 1..=4) => Ok(format!("pmax{sign}{suffix}")),
        (other, _) => Err(format!("lanesmith_{}_epi{}", other.to_ascii_lowercase(), element.bits())),
    }
}

impl X86Backend {
    fn op3(body: &RoutineBody, mnemonic: &str, dst: &str, a: &str, b: &str) -> String {
        if vex(body.microarch) {
            format!("v{mnemonic} {b}, {a}, {dst}")
        } else if dst == a {
            format!("{mnemonic} {b}, {dst}")
        } else {
            format!("movdqa {a}, {dst}; {mnemonic} {b}, {dst}")
        }
    }

    fn mov(body: &RoutineBody, element: ElementType) -> &'static str {
        match (vex(body.microarch), element.is_float(), element == ElementType::F32) {
            (true, true, true) => "vmovups",
            (true, true, false) => "vmovupd",
            (true, false, _) => "vmovdqu",
            (false, true, true) => "movups",
            (false, true, false) => "movupd",
            (false, false, _) => "movdqu",
        }
    }

    fn compute(body: &RoutineBody, register: usize) -> String {
        let dst = reg(body, "z", register);
        let srcs: Vec<String> = sources(body, register)
            .into_iter()
            .map(|(b, i)| reg(body, b, i))
            .collect();
        if let Some(table) = &body.coefficients {
            let x = srcs.first().cloned().unwrap_or_default();
            return match fused(body.microarch) {
                Some(fma) => format!(
                    "horner {table}: {fma}{} {x}, %coef_k, {dst}",
                    float_suffix(body.element)
                ),
                None => format!("horner {table}: mul{0} {x}, {dst}; add{0} %coef_k, {dst}", float_suffix(body.element)),
            };
        }
        if body.function == "Negate" {
            let x = srcs.first().cloned().unwrap_or_default();
            return if body.element.is_float() {
                Self::op3(body, &format!("xor{}", float_suffix(body.element)), &dst, &x, "%sign_mask")
            } else {
                Self::op3(body, &format!("psub{}", int_suffix(body.element)), &dst, "%zero", &x)
            };
        }
        match arithmetic(body.function, body.element) {
            Ok(mnemonic) => match srcs.as_slice() {
                [a, b] => Self::op3(body, &mnemonic, &dst, a, b),
                [a] => Self::op3(body, &mnemonic, &dst, a, a),
                _ => format!("{mnemonic} {dst}"),
            },
            Err(helper) => format!("call {helper} ; {} -> {dst}", srcs.join(", ")),
        }
    }

    fn accumulate(body: &RoutineBody, register: usize) -> String {
        let acc = reg(body, "acc", register);
        let x = reg(body, "x", register);
        let suffix = float_suffix(body.element);
        match body.function {
            "DotProduct" | "SumSquares" => {
                let y = if body.function == "DotProduct" { reg(body, "y", register) } else { x.clone() };
                match fused(body.microarch) {
                    Some(fma) => format!("{fma}{suffix} {y}, {x}, {acc}"),
                    None => format!(
                        "{}; {}",
                        Self::op3(body, &format!("mul{suffix}"), &x, &x, &y),
                        Self::op3(body, &format!("add{suffix}"), &acc, &acc, &x)
                    ),
                }
            }
            "SumAbs" => format!(
                "{}; {}",
                Self::op3(body, &format!("and{suffix}"), &x, &x, "%abs_mask"),
                Self::op3(body, &format!("add{suffix}"), &acc, &acc, &x)
            ),
            "MinMax" => {
                let hi = reg(body, "acc_hi", register);
                let (min, max) = match (arithmetic("Min", body.element), arithmetic("Max", body.element)) {
                    (Ok(min), Ok(max)) => (min, max),
                    _ => ("lanesmith_min".to_string(), "lanesmith_max".to_string()),
                };
                format!("{}; {}", Self::op3(body, &min, &acc, &acc, &x), Self::op3(body, &max, &hi, &hi, &x))
            }
            function => match arithmetic(function, body.element) {
                Ok(mnemonic) => Self::op3(body, &mnemonic, &acc, &acc, &x),
                Err(helper) => format!("call {helper} ; {acc}, {x} -> {acc}"),
            },
        }
    }
}

impl Backend for X86Backend {
    fn kind(&self) -> BackendKind {
        BackendKind::X86
    }

    fn supports(&self, microarch: Microarchitecture) -> bool {
        microarch.architecture() == Architecture::X86
    }

    fn comment(&self) -> &'static str {
        "#"
    }

    fn entry(&self, body: &RoutineBody) -> Vec<String> {
        let symbol = format!("_{}_{}", body.identity, body.microarch);
        vec![
            format!(".globl {symbol}"),
            ".p2align 4".to_string(),
            format!("{symbol}:"),
        ]
    }

    fn check(&self, body: &RoutineBody, check: &Check) -> Vec<String> {
        match check {
            Check::NonNull { name } => vec![
                format!("test %{name}, %{name}"),
                format!("jz .L{}_null_pointer", body.identity),
            ],
            Check::Aligned { name, bytes } => vec![
                format!("test ${}, %{name}", bytes - 1),
                format!("jnz .L{}_misaligned_pointer", body.identity),
            ],
            Check::NonZero { name } => vec![
                format!("test %{name}, %{name}"),
                format!("jz .L{}_invalid_argument", body.identity),
            ],
        }
    }

    fn zero_length(&self, body: &RoutineBody) -> Vec<String> {
        vec![
            "test %length, %length".to_string(),
            format!("jz .L{}_return_ok", body.identity),
        ]
    }

    fn scalar_loop(&self, body: &RoutineBody, phase: ScalarPhase) -> Vec<String> {
        let step = format!("{} one {} element", body.function, body.element);
        match phase {
            ScalarPhase::Align => vec![
                format!(
                    "# until %{} is {}-byte aligned: {step}",
                    body.anchor,
                    body.schedule.register_bytes()
                ),
                format!("test ${}, %{}", body.schedule.register_bytes() - 1, body.anchor),
                format!("jnz .L{}_align", body.identity),
            ],
            ScalarPhase::Tail => vec![
                format!("# remaining elements in order: {step}"),
                "sub $1, %length".to_string(),
                format!("jnz .L{}_tail", body.identity),
            ],
        }
    }

    fn pipeline_guard(&self, body: &RoutineBody) -> Vec<String> {
        vec![
            format!("cmp ${}, %length", 2 * body.batch()),
            format!("jb .L{}_tail", body.identity),
        ]
    }

    fn init_accumulators(&self, body: &RoutineBody) -> Vec<String> {
        let unroll = body.schedule.unroll();
        let identity = match body.function {
            "Min" | "Max" | "MinMax" => "broadcast v[0]",
            _ => "zero",
        };
        (0..unroll)
            .map(|r| format!("# {} := {identity}", reg(body, "acc", r)))
            .collect()
    }

    fn instruction(&self, body: &RoutineBody, op: MicroOp) -> String {
        match op {
            MicroOp::Load { operand, register } => {
                let offset = register * body.schedule.lanes() * body.input_element.size();
                format!(
                    "{} {offset}(%{}), {}",
                    Self::mov(body, body.input_element),
                    body.bindings.name(operand),
                    reg(body, bank(body, operand), register)
                )
            }
            MicroOp::Widen { operand, register } => {
                let r = reg(body, operand.name(), register);
                let kind = if body.input_element.is_signed() { "sx" } else { "zx" };
                let prefix = if vex(body.microarch) { "v" } else { "" };
                format!(
                    "{prefix}pmov{kind}{}{} {r}, {r}",
                    int_suffix(body.input_element),
                    int_suffix(body.element)
                )
            }
            MicroOp::Compute { register } => Self::compute(body, register),
            MicroOp::Accumulate { register } => Self::accumulate(body, register),
            MicroOp::Store { operand, register } => {
                let offset = register * body.schedule.lanes() * body.element.size();
                format!(
                    "{} {}, {offset}(%{})",
                    Self::mov(body, body.element),
                    reg(body, "z", register),
                    body.bindings.name(operand)
                )
            }
            MicroOp::Advance { operand, elements } => {
                let size = if operand == crate::ir::Operand::Z {
                    body.element.size()
                } else {
                    body.input_element.size()
                };
                format!("add ${}, %{}", elements * size, body.bindings.name(operand))
            }
        }
    }

    fn loop_back(&self, body: &RoutineBody) -> Vec<String> {
        vec![
            format!("sub ${}, %length", body.batch()),
            format!("cmp ${}, %length", 2 * body.batch()),
            format!("jae .L{}_steady", body.identity),
        ]
    }

    fn combine(&self, body: &RoutineBody, tree: ReductionTree) -> Vec<String> {
        let unroll = body.schedule.unroll();
        let mnemonic = arithmetic(body.function, body.element)
            .unwrap_or_else(|_| format!("add{}", float_suffix(body.element)));
        let mut lines = Vec::new();
        match tree {
            ReductionTree::Pairwise => {
                let mut step = 1;
                while step < unroll {
                    for r in (0..unroll).step_by(2 * step).filter(|r| r + step < unroll) {
                        let dst = reg(body, "acc", r);
                        let src = reg(body, "acc", r + step);
                        lines.push(Self::op3(body, &mnemonic, &dst, &dst, &src));
                    }
                    step *= 2;
                }
            }
            ReductionTree::Sequential => {
                let dst = reg(body, "acc", 0);
                for r in 1..unroll {
                    let src = reg(body, "acc", r);
                    lines.push(Self::op3(body, &mnemonic, &dst, &dst, &src));
                }
            }
        }
        lines.push(format!("# horizontal {mnemonic} over {} lanes of {}", body.schedule.lanes(), reg(body, "acc", 0)));
        lines
    }

    fn exit(&self, body: &RoutineBody) -> Vec<String> {
        let id = &body.identity;
        let mut lines = Vec::new();
        if body.combine.is_some() {
            let mov = match body.element {
                ElementType::F32 => "movss",
                ElementType::F64 => "movsd",
                _ => "movq",
            };
            for (i, out) in body.bindings.z.iter().enumerate() {
                let bank = if i == 0 { "acc" } else { "acc_hi" };
                lines.push(format!("{mov} {}, (%{out})", reg(body, bank, 0)));
            }
        }
        if vex(body.microarch) {
            lines.push("vzeroupper".to_string());
        }
        lines.extend([
            format!(".L{id}_return_ok:"),
            "xor %eax, %eax".to_string(),
            "ret".to_string(),
            format!(".L{id}_null_pointer:"),
            "mov $1, %eax".to_string(),
            "ret".to_string(),
            format!(".L{id}_misaligned_pointer:"),
            "mov $2, %eax".to_string(),
            "ret".to_string(),
            format!(".L{id}_invalid_argument:"),
            "mov $3, %eax".to_string(),
            "ret".to_string(),
        ]);
        lines
    }
}

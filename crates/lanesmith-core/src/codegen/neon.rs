//! ARMv7 NEON listings.
//!
//! Quad registers throughout. NEON has no `f64` lanes: those kernels fall
//! back to VFP double-precision ops on `d` registers, one lane at a time.

use super::backend::{bank, sources, Backend, BackendKind, ScalarPhase};
use super::{Check, RoutineBody};
use crate::cpu::{Architecture, Microarchitecture};
use crate::element::ElementType;
use crate::ir::{MicroOp, Operand};
use crate::schedule::ReductionTree;

/// NEON backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeonBackend;

fn reg(body: &RoutineBody, bank: &str, index: usize) -> String {
    let file = if body.element == ElementType::F64 { "d" } else { "q" };
    format!("{file}_{bank}{index}")
}

fn data_type(element: ElementType) -> String {
    let kind = match (element.is_float(), element.is_signed()) {
        (true, _) => "f",
        (false, true) => "s",
        (false, false) => "u",
    };
    format!("{kind}{}", element.bits())
}

fn int_type(element: ElementType) -> String {
    if element.is_float() {
        data_type(element)
    } else {
        format!("i{}", element.bits())
    }
}

/// Mnemonic with data type, or the helper to call.
fn arithmetic(function: &str, element: ElementType) -> Result<String, String> {
    match function {
        "Add" | "Sum" | "SumAbs" | "SumSquares" | "DotProduct" => Ok(format!("vadd.{}", int_type(element))),
        "Subtract" => Ok(format!("vsub.{}", int_type(element))),
        "Multiply" if element.size() < 8 => Ok(format!("vmul.{}", int_type(element))),
        "Multiply" if element.is_float() => Ok("vmul.f64".to_string()),
        "Min" | "MinMax" if element.size() < 8 || element.is_float() => Ok(format!("vmin.{}", data_type(element))),
        "Max" if element.size() < 8 || element.is_float() => Ok(format!("vmax.{}", data_type(element))),
        "Negate" if element.size() < 8 => Ok(format!("vneg.{}", data_type(element))),
        other => Err(format!("lanesmith_{}_{}", other.to_ascii_lowercase(), data_type(element))),
    }
}

fn fused(body: &RoutineBody) -> &'static str {
    if body.microarch == Microarchitecture::CortexA15 {
        "vfma"
    } else {
        "vmla"
    }
}

impl NeonBackend {
    fn compute(body: &RoutineBody, register: usize) -> String {
        let dst = reg(body, "z", register);
        let srcs: Vec<String> = sources(body, register)
            .into_iter()
            .map(|(b, i)| reg(body, b, i))
            .collect();
        if let Some(table) = &body.coefficients {
            let x = srcs.first().cloned().unwrap_or_default();
            return format!(
                "horner {table}: {}.{} {dst}, {x}, coef_k",
                fused(body),
                data_type(body.element)
            );
        }
        match arithmetic(body.function, body.element) {
            Ok(mnemonic) => format!("{mnemonic} {dst}, {}", srcs.join(", ")),
            Err(helper) => format!("bl {helper} @ {} -> {dst}", srcs.join(", ")),
        }
    }

    fn accumulate(body: &RoutineBody, register: usize) -> String {
        let acc = reg(body, "acc", register);
        let x = reg(body, "x", register);
        let ty = data_type(body.element);
        match body.function {
            "DotProduct" => format!("{}.{ty} {acc}, {x}, {}", fused(body), reg(body, "y", register)),
            "SumSquares" => format!("{}.{ty} {acc}, {x}, {x}", fused(body)),
            "SumAbs" => format!("vabs.{ty} {x}, {x}; vadd.{ty} {acc}, {acc}, {x}"),
            "MinMax" => {
                let hi = reg(body, "acc_hi", register);
                format!("vmin.{ty} {acc}, {acc}, {x}; vmax.{ty} {hi}, {hi}, {x}")
            }
            function => match arithmetic(function, body.element) {
                Ok(mnemonic) => format!("{mnemonic} {acc}, {acc}, {x}"),
                Err(helper) => format!("bl {helper} @ {acc}, {x} -> {acc}"),
            },
        }
    }
}

impl Backend for NeonBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Neon
    }

    fn supports(&self, microarch: Microarchitecture) -> bool {
        microarch.architecture() == Architecture::Arm
    }

    fn comment(&self) -> &'static str {
        "@"
    }

    fn entry(&self, body: &RoutineBody) -> Vec<String> {
        let symbol = format!("{}_{}", body.identity, body.microarch);
        vec![
            ".fpu neon-vfpv4".to_string(),
            format!(".global {symbol}"),
            format!("{symbol}:"),
            "push {r4-r7, lr}".to_string(),
        ]
    }

    fn check(&self, body: &RoutineBody, check: &Check) -> Vec<String> {
        let id = &body.identity;
        match check {
            Check::NonNull { name } => vec![format!("cmp {name}, #0"), format!("beq .L{id}_null_pointer")],
            Check::Aligned { name, bytes } => vec![
                format!("tst {name}, #{}", bytes - 1),
                format!("bne .L{id}_misaligned_pointer"),
            ],
            Check::NonZero { name } => vec![format!("cmp {name}, #0"), format!("beq .L{id}_invalid_argument")],
        }
    }

    fn zero_length(&self, body: &RoutineBody) -> Vec<String> {
        vec!["cmp length, #0".to_string(), format!("beq .L{}_return_ok", body.identity)]
    }

    fn scalar_loop(&self, body: &RoutineBody, phase: ScalarPhase) -> Vec<String> {
        let id = &body.identity;
        let step = format!("@ {} one {} element", body.function, body.element);
        match phase {
            ScalarPhase::Align => vec![
                step,
                format!("tst {}, #{}", body.anchor, body.schedule.register_bytes() - 1),
                format!("bne .L{id}_align"),
            ],
            ScalarPhase::Tail => vec![step, "subs length, length, #1".to_string(), format!("bne .L{id}_tail")],
        }
    }

    fn pipeline_guard(&self, body: &RoutineBody) -> Vec<String> {
        vec![
            format!("cmp length, #{}", 2 * body.batch()),
            format!("blo .L{}_tail", body.identity),
        ]
    }

    fn init_accumulators(&self, body: &RoutineBody) -> Vec<String> {
        let value = match body.function {
            "Min" | "Max" | "MinMax" => "v[0]",
            _ => "#0",
        };
        (0..body.schedule.unroll())
            .map(|r| format!("vdup.{} {}, {value}", body.element.bits(), reg(body, "acc", r)))
            .collect()
    }

    fn instruction(&self, body: &RoutineBody, op: MicroOp) -> String {
        match op {
            MicroOp::Load { operand, register } => format!(
                "vld1.{} {{{}}}, [{}]",
                body.input_element.bits(),
                reg(body, bank(body, operand), register),
                body.bindings.name(operand)
            ),
            MicroOp::Widen { operand, register } => {
                let r = reg(body, operand.name(), register);
                format!("vmovl.{} {r}, {r}", data_type(body.input_element))
            }
            MicroOp::Compute { register } => Self::compute(body, register),
            MicroOp::Accumulate { register } => Self::accumulate(body, register),
            MicroOp::Store { operand, register } => format!(
                "vst1.{} {{{}}}, [{}]",
                body.element.bits(),
                reg(body, "z", register),
                body.bindings.name(operand)
            ),
            MicroOp::Advance { operand, elements } => {
                let size = if operand == Operand::Z {
                    body.element.size()
                } else {
                    body.input_element.size()
                };
                let name = body.bindings.name(operand);
                format!("add {name}, {name}, #{}", elements * size)
            }
        }
    }

    fn loop_back(&self, body: &RoutineBody) -> Vec<String> {
        vec![
            format!("sub length, length, #{}", body.batch()),
            format!("cmp length, #{}", 2 * body.batch()),
            format!("bhs .L{}_steady", body.identity),
        ]
    }

    fn combine(&self, body: &RoutineBody, tree: ReductionTree) -> Vec<String> {
        let unroll = body.schedule.unroll();
        let mnemonic = arithmetic(body.function, body.element)
            .unwrap_or_else(|_| format!("vadd.{}", int_type(body.element)));
        let mut lines = Vec::new();
        let mut fold = |dst: usize, src: usize| {
            let d = reg(body, "acc", dst);
            lines.push(format!("{mnemonic} {d}, {d}, {}", reg(body, "acc", src)));
        };
        match tree {
            ReductionTree::Pairwise => {
                let mut step = 1;
                while step < unroll {
                    for r in (0..unroll).step_by(2 * step).filter(|r| r + step < unroll) {
                        fold(r, r + step);
                    }
                    step *= 2;
                }
            }
            ReductionTree::Sequential => (1..unroll).for_each(|r| fold(0, r)),
        }
        lines.push(format!("vpadd.{} lanes of {}", int_type(body.element), reg(body, "acc", 0)));
        lines
    }

    fn exit(&self, body: &RoutineBody) -> Vec<String> {
        let id = &body.identity;
        let mut lines = Vec::new();
        if body.combine.is_some() {
            for (i, out) in body.bindings.z.iter().enumerate() {
                let bank = if i == 0 { "acc" } else { "acc_hi" };
                lines.push(format!("vst1.{} {{{}[0]}}, [{out}]", body.element.bits(), reg(body, bank, 0)));
            }
        }
        for (label, code) in [("return_ok", 0), ("null_pointer", 1), ("misaligned_pointer", 2), ("invalid_argument", 3)] {
            lines.push(format!(".L{id}_{label}:"));
            lines.push(format!("mov r0, #{code}"));
            lines.push("pop {r4-r7, pc}".to_string());
        }
        lines
    }
}

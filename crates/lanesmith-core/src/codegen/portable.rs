//! Target-independent lane pseudocode.
//!
//! Shows the schedule exactly as the executable pipeline runs it, with
//! `[T; N]` lane arrays in place of machine registers. Useful for reviewing
//! a plan row without reading assembly.

use super::backend::{bank, sources, Backend, BackendKind, ScalarPhase};
use super::{Check, RoutineBody};
use crate::cpu::Microarchitecture;
use crate::element::ElementType;
use crate::ir::MicroOp;
use crate::schedule::ReductionTree;

/// Portable backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortableBackend;

fn rust_type(element: ElementType) -> &'static str {
    match element {
        ElementType::I8 => "i8",
        ElementType::U8 => "u8",
        ElementType::I16 => "i16",
        ElementType::U16 => "u16",
        ElementType::I32 => "i32",
        ElementType::U32 => "u32",
        ElementType::I64 => "i64",
        ElementType::U64 => "u64",
        ElementType::F32 => "f32",
        ElementType::F64 => "f64",
    }
}

fn lane_op(function: &str) -> String {
    match function {
        "Add" => "add".to_string(),
        "Subtract" => "sub".to_string(),
        "Multiply" => "mul".to_string(),
        "Min" => "min".to_string(),
        "Max" => "max".to_string(),
        "Negate" => "neg".to_string(),
        other => other.to_ascii_lowercase(),
    }
}

fn reg(bank: &str, index: usize) -> String {
    format!("{bank}{index}")
}

impl Backend for PortableBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Portable
    }

    fn supports(&self, microarch: Microarchitecture) -> bool {
        microarch != Microarchitecture::Unknown
    }

    fn entry(&self, body: &RoutineBody) -> Vec<String> {
        let params: Vec<String> = body.parameters.iter().map(super::backend::describe).collect();
        vec![format!("fn {}({}) -> Status", body.identity, params.join(", "))]
    }

    fn check(&self, _body: &RoutineBody, check: &Check) -> Vec<String> {
        vec![match check {
            Check::NonNull { name } => format!("if {name}.is_null() {{ return NullPointer }}"),
            Check::Aligned { name, bytes } => {
                format!("if {name} as usize % {bytes} != 0 {{ return MisalignedPointer }}")
            }
            Check::NonZero { name } => format!("if {name} == 0 {{ return InvalidArgument }}"),
        }]
    }

    fn zero_length(&self, _body: &RoutineBody) -> Vec<String> {
        vec!["if length == 0 { return Ok }".to_string()]
    }

    fn scalar_loop(&self, body: &RoutineBody, phase: ScalarPhase) -> Vec<String> {
        let step = lane_op(body.function);
        match phase {
            ScalarPhase::Align => vec![format!(
                "while length > 0 && {} as usize % {} != 0 {{ {step}(one element) }}",
                body.anchor,
                body.schedule.register_bytes()
            )],
            ScalarPhase::Tail => vec![format!("while length > 0 {{ {step}(one element) }}")],
        }
    }

    fn pipeline_guard(&self, body: &RoutineBody) -> Vec<String> {
        vec![format!("if length < {} {{ goto tail }}", 2 * body.batch())]
    }

    fn init_accumulators(&self, body: &RoutineBody) -> Vec<String> {
        let ty = rust_type(body.element);
        let lanes = body.schedule.lanes();
        let init = match body.function {
            "Min" | "Max" | "MinMax" => format!("[v[0]; {lanes}]"),
            _ => format!("[0 as {ty}; {lanes}]"),
        };
        let mut lines: Vec<String> = (0..body.schedule.unroll())
            .map(|r| format!("let mut {}: [{ty}; {lanes}] = {init};", reg("acc", r)))
            .collect();
        if body.function == "MinMax" {
            lines.extend((0..body.schedule.unroll()).map(|r| format!("let mut {} = {init};", reg("acc_hi", r))));
        }
        lines
    }

    fn instruction(&self, body: &RoutineBody, op: MicroOp) -> String {
        let lanes = body.schedule.lanes();
        match op {
            MicroOp::Load { operand, register } => format!(
                "{} = load::<{}, {lanes}>({}, {})",
                reg(bank(body, operand), register),
                rust_type(body.input_element),
                body.bindings.name(operand),
                register * lanes
            ),
            MicroOp::Widen { operand, register } => {
                let r = reg(operand.name(), register);
                format!("{r} = {r}.map(|e| e as {})", rust_type(body.element))
            }
            MicroOp::Compute { register } => {
                let args: Vec<String> = sources(body, register)
                    .into_iter()
                    .map(|(b, i)| reg(b, i))
                    .collect();
                match &body.coefficients {
                    Some(table) => format!("{} = horner({table}, {})", reg("z", register), args.join(", ")),
                    None => format!(
                        "{} = {}({})",
                        reg("z", register),
                        lane_op(body.function),
                        args.join(", ")
                    ),
                }
            }
            MicroOp::Accumulate { register } => {
                let acc = reg("acc", register);
                let args: Vec<String> = sources(body, register)
                    .into_iter()
                    .map(|(b, i)| reg(b, i))
                    .collect();
                if body.function == "MinMax" {
                    let hi = reg("acc_hi", register);
                    format!("{acc} = min({acc}, {0}); {hi} = max({hi}, {0})", args.join(", "))
                } else {
                    format!("{acc} = {}({acc}, {})", lane_op(body.function), args.join(", "))
                }
            }
            MicroOp::Store { operand, register } => format!(
                "store({}, {}, {})",
                body.bindings.name(operand),
                register * lanes,
                reg("z", register)
            ),
            MicroOp::Advance { operand, elements } => {
                let name = body.bindings.name(operand);
                if name == body.anchor {
                    format!("{name} = {name}.add({elements}); length -= {elements}")
                } else {
                    format!("{name} = {name}.add({elements})")
                }
            }
        }
    }

    fn loop_back(&self, body: &RoutineBody) -> Vec<String> {
        vec![format!("if length >= {} {{ goto steady }}", 2 * body.batch())]
    }

    fn combine(&self, body: &RoutineBody, tree: ReductionTree) -> Vec<String> {
        let unroll = body.schedule.unroll();
        let regs: Vec<String> = (0..unroll).map(|r| reg("acc", r)).collect();
        let order = match tree {
            ReductionTree::Pairwise => "pairwise",
            ReductionTree::Sequential => "sequential",
        };
        vec![format!("acc = combine_{order}([{}]) then over lanes", regs.join(", "))]
    }

    fn exit(&self, body: &RoutineBody) -> Vec<String> {
        let mut lines = Vec::new();
        if body.combine.is_some() {
            for (i, out) in body.bindings.z.iter().enumerate() {
                let src = if i == 0 { "acc" } else { "acc_hi" };
                lines.push(format!("*{out} = {src}"));
            }
        }
        lines.push("return Ok".to_string());
        lines
    }

    fn label(&self, _body: &RoutineBody, name: &str) -> String {
        format!("{name}:")
    }
}

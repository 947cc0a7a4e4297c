//! Tests for the pipeline schedule builder and the per-target table.

use super::*;
use crate::element::ALL_ELEMENT_TYPES;

const UNUSED: usize = usize::MAX;

fn loads_for(shape: KernelShape) -> &'static [Operand] {
    match shape.load_count() {
        1 => &[Operand::X],
        _ => &[Operand::X, Operand::Y],
    }
}

/// Symbolic register file: every register holds the batch index it was
/// loaded from, so a misordered op is caught as a mismatched index.
struct Trace {
    x: [usize; MAX_REGISTERS],
    y: [usize; MAX_REGISTERS],
    wx: [usize; MAX_REGISTERS],
    wy: [usize; MAX_REGISTERS],
    z: [usize; MAX_REGISTERS],
    acc: [Vec<usize>; MAX_REGISTERS],
    cursor_x: usize,
    cursor_y: usize,
    cursor_z: usize,
    stored: Vec<(usize, usize, usize)>,
}

impl Trace {
    fn new() -> Self {
        Self {
            x: [UNUSED; MAX_REGISTERS],
            y: [UNUSED; MAX_REGISTERS],
            wx: [UNUSED; MAX_REGISTERS],
            wy: [UNUSED; MAX_REGISTERS],
            z: [UNUSED; MAX_REGISTERS],
            acc: Default::default(),
            cursor_x: 0,
            cursor_y: 0,
            cursor_z: 0,
            stored: Vec::new(),
        }
    }

    fn inputs(&self, shape: KernelShape, r: usize) -> usize {
        let (a, b) = if shape == KernelShape::Widening {
            (self.wx[r], self.wy[r])
        } else {
            (self.x[r], self.y[r])
        };
        if shape.load_count() == 2 {
            assert_eq!(a, b, "register {r} mixes batches {a} and {b}");
        }
        assert_ne!(a, UNUSED, "register {r} read before load");
        a
    }

    fn issue(&mut self, shape: KernelShape, op: MicroOp, batch: usize) {
        match op {
            MicroOp::Load { operand, register } => match operand {
                Operand::X => self.x[register] = self.cursor_x,
                Operand::Y => self.y[register] = self.cursor_y,
                Operand::Z => panic!("load from output"),
            },
            MicroOp::Widen { operand, register } => match operand {
                Operand::X => self.wx[register] = self.x[register],
                Operand::Y => self.wy[register] = self.y[register],
                Operand::Z => panic!("widen of output"),
            },
            MicroOp::Compute { register } => self.z[register] = self.inputs(shape, register),
            MicroOp::Accumulate { register } => {
                let value = self.inputs(shape, register);
                self.acc[register].push(value);
            }
            MicroOp::Store { register, .. } => {
                self.stored.push((self.cursor_z, register, self.z[register]));
            }
            MicroOp::Advance { operand, elements } => {
                assert_eq!(elements, batch);
                match operand {
                    Operand::X => self.cursor_x += 1,
                    Operand::Y => self.cursor_y += 1,
                    Operand::Z => self.cursor_z += 1,
                }
            }
        }
    }
}

fn run(schedule: &PipelineSchedule, batches: usize) -> Trace {
    let mut trace = Trace::new();
    let shape = schedule.shape();
    let batch = schedule.batch();
    for op in schedule.ramp_up() {
        trace.issue(shape, op, batch);
    }
    for _ in 1..batches {
        for op in schedule.steady_state() {
            trace.issue(shape, op, batch);
        }
    }
    for op in schedule.ramp_down() {
        trace.issue(shape, op, batch);
    }
    trace
}

fn check_trace(schedule: &PipelineSchedule, batches: usize) {
    let trace = run(schedule, batches);
    let unroll = schedule.unroll();
    if schedule.shape().is_reduction() {
        for r in 0..unroll {
            let expected: Vec<usize> = (0..batches).collect();
            assert_eq!(trace.acc[r], expected, "accumulator {r}");
        }
        assert_eq!(trace.cursor_x, batches);
        assert!(trace.stored.is_empty());
    } else {
        assert_eq!(trace.stored.len(), batches * unroll);
        for (cursor, register, value) in &trace.stored {
            assert_eq!(cursor, value, "register {register} stored to the wrong batch");
        }
        assert_eq!(trace.cursor_z, batches);
    }
}

// ============================================================================
// Table validation
// ============================================================================

#[test]
fn test_every_plan_row_validates_for_every_element_type() {
    for plan in PLANS {
        for element in ALL_ELEMENT_TYPES {
            let schedule = plan
                .schedule(element, loads_for(plan.shape))
                .unwrap_or_else(|e| panic!("{} {} {element}: {e}", plan.microarch, plan.shape));
            assert_eq!(schedule.batch(), schedule.unroll() * schedule.lanes());
            assert!(schedule.lanes() <= MAX_LANES);
        }
    }
}

#[test]
fn test_every_target_has_every_shape() {
    for microarch in TARGETS {
        for shape in KernelShape::ALL {
            let plan = TargetPlan::find(microarch, shape).expect("row present");
            assert_eq!(plan.offsets.len(), shape.streams(loads_for(shape)).unwrap().len());
        }
    }
    assert!(matches!(
        TargetPlan::find(Microarchitecture::P5, KernelShape::Binary),
        Err(ScheduleError::MissingPlan { .. })
    ));
}

#[test]
fn test_nehalem_binary_row() {
    let plan = TargetPlan::find(Microarchitecture::Nehalem, KernelShape::Binary).unwrap();
    assert_eq!(plan.unroll, 8);
    assert_eq!(plan.offsets, &[0, 1, 6, 7]);
    let schedule = plan
        .schedule(ElementType::F32, &[Operand::X, Operand::Y])
        .unwrap();
    assert_eq!(schedule.lanes(), 4);
    assert_eq!(schedule.batch(), 32);
    assert_eq!(schedule.depth(), 9);
}

#[test]
fn test_sandy_bridge_uses_narrow_integer_registers() {
    let plan = TargetPlan::find(Microarchitecture::SandyBridge, KernelShape::Binary).unwrap();
    assert_eq!(plan.register_bytes_for(ElementType::F64), 32);
    assert_eq!(plan.register_bytes_for(ElementType::I32), 16);
}

// ============================================================================
// Pipeline phases
// ============================================================================

#[test]
fn test_phases_preserve_dependencies_for_all_rows() {
    for plan in PLANS {
        let schedule = plan
            .schedule(ElementType::F32, loads_for(plan.shape))
            .unwrap();
        for batches in [1, 2, 3, 7] {
            check_trace(&schedule, batches);
        }
    }
}

#[test]
fn test_ramp_up_issues_only_ready_ops() {
    let plan = TargetPlan::find(Microarchitecture::Nehalem, KernelShape::Binary).unwrap();
    let schedule = plan
        .schedule(ElementType::F32, &[Operand::X, Operand::Y])
        .unwrap();
    let ops: Vec<MicroOp> = schedule.ramp_up().collect();
    // Stores lag by 7 slots: only registers 0 and 1 are stored during ramp-up.
    let stores = ops
        .iter()
        .filter(|op| matches!(op, MicroOp::Store { .. }))
        .count();
    assert_eq!(stores, 2);
    assert_eq!(
        ops[0],
        MicroOp::Load {
            operand: Operand::X,
            register: 0
        }
    );
}

#[test]
fn test_steady_state_issues_one_full_column_per_stream() {
    for plan in PLANS {
        let schedule = plan
            .schedule(ElementType::F64, loads_for(plan.shape))
            .unwrap();
        let streams = schedule.streams().len();
        let memory = schedule
            .streams()
            .iter()
            .filter(|s| s.kind.cursor().is_some())
            .count();
        let expected = streams * schedule.unroll() + memory;
        assert_eq!(schedule.steady_state().count(), expected);
        assert_eq!(
            schedule.ramp_up().count() + schedule.ramp_down().count(),
            expected
        );
    }
}

#[test]
fn test_op_at_bounds() {
    let plan = TargetPlan::find(Microarchitecture::Haswell, KernelShape::Reduce).unwrap();
    let schedule = plan.schedule(ElementType::F32, &[Operand::X]).unwrap();
    assert_eq!(
        schedule.op_at(0, 8),
        Some(MicroOp::Advance {
            operand: Operand::X,
            elements: 64
        })
    );
    // Accumulators never advance a cursor.
    assert_eq!(schedule.op_at(1, 8), None);
    assert_eq!(schedule.op_at(0, 9), None);
    assert_eq!(schedule.op_at(5, 0), None);
}

// ============================================================================
// Validation errors
// ============================================================================

fn build(offsets: &[usize], unroll: usize, register_bytes: usize) -> Result<PipelineSchedule, ScheduleError> {
    let kinds = KernelShape::Binary
        .streams(&[Operand::X, Operand::Y])
        .unwrap();
    PipelineSchedule::new(
        Microarchitecture::Nehalem,
        KernelShape::Binary,
        ElementType::F32,
        &kinds,
        offsets,
        unroll,
        register_bytes,
        TargetPlan::find(Microarchitecture::Nehalem, KernelShape::Binary)
            .unwrap()
            .latency,
        ReductionTree::Pairwise,
    )
}

#[test]
fn test_validation_rejects_bad_offsets() {
    assert_eq!(build(&[1, 1, 2, 3], 4, 16), Err(ScheduleError::FirstOffset(1)));
    assert!(matches!(
        build(&[0, 2, 1, 3], 4, 16),
        Err(ScheduleError::DecreasingOffset { stream: 2, .. })
    ));
    assert!(matches!(
        build(&[0, 1, 2, 5], 4, 16),
        Err(ScheduleError::OffsetTooLarge {
            stream: 3,
            depth: 5,
            ..
        })
    ));
    assert!(matches!(
        build(&[0, 1, 2], 4, 16),
        Err(ScheduleError::OffsetCount { .. })
    ));
}

#[test]
fn test_validation_rejects_bad_registers() {
    assert!(matches!(
        build(&[0, 1, 2, 3], 4, 18),
        Err(ScheduleError::RegisterWidth { .. })
    ));
    assert!(matches!(
        build(&[0, 1, 2, 3], 17, 16),
        Err(ScheduleError::RegisterFile { .. })
    ));
    assert!(matches!(
        build(&[0, 1, 2, 3], 4, 256),
        Err(ScheduleError::RegisterFile { .. })
    ));
    assert!(matches!(
        KernelShape::Reduce.streams(&[Operand::X, Operand::Y]),
        Err(ScheduleError::LoadCount { .. })
    ));
}

// ============================================================================
// Latency report
// ============================================================================

#[test]
fn test_latency_report_counts_slack() {
    let plan = TargetPlan::find(Microarchitecture::Nehalem, KernelShape::Binary).unwrap();
    let schedule = plan
        .schedule(ElementType::F32, &[Operand::X, Operand::Y])
        .unwrap();
    let report = schedule.latency_report();
    // 4 streams, 2 ops per cycle.
    assert_eq!(report.cycles_per_step, 2);
    // compute <- load x, compute <- load y, store <- compute
    assert_eq!(report.dependencies.len(), 3);
    let store = report
        .dependencies
        .iter()
        .find(|d| d.consumer == StreamKind::Store(Operand::Z))
        .unwrap();
    assert_eq!(store.slack, 2);
    assert_eq!(store.exposed, 1);
    assert_eq!(report.total_exposed(), 1);
}

// ============================================================================
// Schedule cache
// ============================================================================

fn bindings_for(shape: KernelShape) -> &'static [LoadBinding] {
    match shape {
        KernelShape::Unary | KernelShape::Transcendental => &[LoadBinding::X, LoadBinding::Y],
        KernelShape::Reduce => &[LoadBinding::X],
        _ => &[LoadBinding::XY],
    }
}

#[test]
fn test_cache_covers_every_routine_binding() {
    for microarch in TARGETS {
        for shape in KernelShape::ALL {
            for &binding in bindings_for(shape) {
                for element in ALL_ELEMENT_TYPES {
                    let cached = cached(microarch, shape, element, binding)
                        .unwrap_or_else(|| panic!("{microarch} {shape} {element} {binding:?}"));
                    let fresh = TargetPlan::find(microarch, shape)
                        .unwrap()
                        .schedule(element, binding.operands())
                        .unwrap();
                    assert_eq!(*cached, fresh);
                }
            }
        }
    }
}

#[test]
fn test_cache_returns_the_same_instance() {
    let first = cached(Microarchitecture::Haswell, KernelShape::Binary, ElementType::F32, LoadBinding::XY);
    let again = cached(Microarchitecture::Haswell, KernelShape::Binary, ElementType::F32, LoadBinding::XY);
    assert!(std::ptr::eq(first.unwrap(), again.unwrap()));
}

#[test]
fn test_cache_misses_outside_the_table() {
    assert!(cached(Microarchitecture::Penryn, KernelShape::Binary, ElementType::F32, LoadBinding::XY).is_none());
    assert!(cached(Microarchitecture::Unknown, KernelShape::Reduce, ElementType::I8, LoadBinding::X).is_none());
    // Reductions read exactly one operand.
    assert!(cached(Microarchitecture::Nehalem, KernelShape::Reduce, ElementType::F64, LoadBinding::XY).is_none());
}

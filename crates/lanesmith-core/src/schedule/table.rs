//! Declarative per-target scheduling table.
//!
//! One row per (microarchitecture, kernel shape). Offsets list one entry per
//! stream of the shape, in the order [`KernelShape::streams`] produces them.

use serde::Serialize;

use super::{KernelShape, PipelineSchedule, ReductionTree, ScheduleError};
use crate::cpu::Microarchitecture;
use crate::element::ElementType;
use crate::ir::{LatencyModel, Operand};

/// Scheduling parameters for one kernel shape on one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TargetPlan {
    /// Target microarchitecture.
    pub microarch: Microarchitecture,
    /// Kernel shape the row applies to.
    pub shape: KernelShape,
    /// Floating-point register width in bytes.
    pub register_bytes: usize,
    /// Integer register width in bytes.
    pub integer_register_bytes: usize,
    /// Registers per batch.
    pub unroll: usize,
    /// Stage offset of each stream.
    pub offsets: &'static [usize],
    /// Declared latencies.
    pub latency: LatencyModel,
    /// Accumulator combination order.
    pub reduction: ReductionTree,
}

impl TargetPlan {
    /// Looks up the row for `microarch` and `shape`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::MissingPlan`] for targets without a row.
    pub fn find(microarch: Microarchitecture, shape: KernelShape) -> Result<&'static Self, ScheduleError> {
        PLANS
            .iter()
            .find(|p| p.microarch == microarch && p.shape == shape)
            .ok_or(ScheduleError::MissingPlan { microarch, shape })
    }

    /// Register width used for `element`.
    #[must_use]
    pub const fn register_bytes_for(&self, element: ElementType) -> usize {
        if element.is_float() {
            self.register_bytes
        } else {
            self.integer_register_bytes
        }
    }

    /// Instantiates the row for a computation type and bound load operands.
    ///
    /// # Errors
    ///
    /// Returns a [`ScheduleError`] when the operands do not match the shape
    /// or the resulting schedule is invalid.
    pub fn schedule(
        &self,
        element: ElementType,
        loads: &[Operand],
    ) -> Result<PipelineSchedule, ScheduleError> {
        let kinds = self.shape.streams(loads)?;
        PipelineSchedule::new(
            self.microarch,
            self.shape,
            element,
            &kinds,
            self.offsets,
            self.unroll,
            self.register_bytes_for(element),
            self.latency,
            self.reduction,
        )
    }
}

/// Target microarchitectures with generated routines.
pub const TARGETS: [Microarchitecture; 7] = [
    Microarchitecture::Haswell,
    Microarchitecture::SandyBridge,
    Microarchitecture::Bulldozer,
    Microarchitecture::Nehalem,
    Microarchitecture::K10,
    Microarchitecture::CortexA15,
    Microarchitecture::CortexA9,
];

struct Core {
    microarch: Microarchitecture,
    register_bytes: usize,
    integer_register_bytes: usize,
    latency: LatencyModel,
    reduction: ReductionTree,
}

const fn row(core: &Core, shape: KernelShape, unroll: usize, offsets: &'static [usize]) -> TargetPlan {
    TargetPlan {
        microarch: core.microarch,
        shape,
        register_bytes: core.register_bytes,
        integer_register_bytes: core.integer_register_bytes,
        unroll,
        offsets,
        latency: core.latency,
        reduction: core.reduction,
    }
}

const HASWELL: Core = Core {
    microarch: Microarchitecture::Haswell,
    register_bytes: 32,
    integer_register_bytes: 32,
    latency: LatencyModel {
        load: 4,
        convert: 1,
        integer: 1,
        float: 3,
        store: 4,
        issue_width: 2,
    },
    reduction: ReductionTree::Pairwise,
};

// AVX1 has no 256-bit integer ops.
const SANDY_BRIDGE: Core = Core {
    microarch: Microarchitecture::SandyBridge,
    register_bytes: 32,
    integer_register_bytes: 16,
    latency: LatencyModel {
        load: 6,
        convert: 1,
        integer: 1,
        float: 3,
        store: 5,
        issue_width: 2,
    },
    reduction: ReductionTree::Pairwise,
};

const BULLDOZER: Core = Core {
    microarch: Microarchitecture::Bulldozer,
    register_bytes: 32,
    integer_register_bytes: 16,
    latency: LatencyModel {
        load: 6,
        convert: 2,
        integer: 2,
        float: 5,
        store: 6,
        issue_width: 2,
    },
    reduction: ReductionTree::Sequential,
};

const NEHALEM: Core = Core {
    microarch: Microarchitecture::Nehalem,
    register_bytes: 16,
    integer_register_bytes: 16,
    latency: LatencyModel {
        load: 4,
        convert: 1,
        integer: 1,
        float: 3,
        store: 5,
        issue_width: 2,
    },
    reduction: ReductionTree::Pairwise,
};

const K10: Core = Core {
    microarch: Microarchitecture::K10,
    register_bytes: 16,
    integer_register_bytes: 16,
    latency: LatencyModel {
        load: 3,
        convert: 2,
        integer: 2,
        float: 4,
        store: 4,
        issue_width: 2,
    },
    reduction: ReductionTree::Sequential,
};

const CORTEX_A15: Core = Core {
    microarch: Microarchitecture::CortexA15,
    register_bytes: 16,
    integer_register_bytes: 16,
    latency: LatencyModel {
        load: 5,
        convert: 3,
        integer: 3,
        float: 5,
        store: 3,
        issue_width: 2,
    },
    reduction: ReductionTree::Pairwise,
};

const CORTEX_A9: Core = Core {
    microarch: Microarchitecture::CortexA9,
    register_bytes: 16,
    integer_register_bytes: 16,
    latency: LatencyModel {
        load: 4,
        convert: 3,
        integer: 3,
        float: 5,
        store: 2,
        issue_width: 1,
    },
    reduction: ReductionTree::Sequential,
};

/// Every scheduling row.
pub const PLANS: &[TargetPlan] = &[
    row(&HASWELL, KernelShape::Binary, 8, &[0, 0, 3, 5]),
    row(&HASWELL, KernelShape::Widening, 6, &[0, 0, 2, 2, 4, 5]),
    row(&HASWELL, KernelShape::Unary, 8, &[0, 3, 5]),
    row(&HASWELL, KernelShape::Transcendental, 4, &[0, 1, 4]),
    row(&HASWELL, KernelShape::Reduce, 8, &[0, 4]),
    row(&HASWELL, KernelShape::DotReduce, 8, &[0, 0, 4]),
    row(&SANDY_BRIDGE, KernelShape::Binary, 8, &[0, 1, 4, 6]),
    row(&SANDY_BRIDGE, KernelShape::Widening, 6, &[0, 0, 2, 3, 4, 5]),
    row(&SANDY_BRIDGE, KernelShape::Unary, 8, &[0, 4, 6]),
    row(&SANDY_BRIDGE, KernelShape::Transcendental, 4, &[0, 1, 4]),
    row(&SANDY_BRIDGE, KernelShape::Reduce, 6, &[0, 3]),
    row(&SANDY_BRIDGE, KernelShape::DotReduce, 6, &[0, 0, 3]),
    row(&BULLDOZER, KernelShape::Binary, 8, &[0, 1, 5, 7]),
    row(&BULLDOZER, KernelShape::Widening, 6, &[0, 0, 3, 3, 5, 6]),
    row(&BULLDOZER, KernelShape::Unary, 8, &[0, 5, 7]),
    row(&BULLDOZER, KernelShape::Transcendental, 4, &[0, 2, 4]),
    row(&BULLDOZER, KernelShape::Reduce, 8, &[0, 5]),
    row(&BULLDOZER, KernelShape::DotReduce, 8, &[0, 0, 5]),
    row(&NEHALEM, KernelShape::Binary, 8, &[0, 1, 6, 7]),
    row(&NEHALEM, KernelShape::Widening, 6, &[0, 0, 2, 3, 4, 5]),
    row(&NEHALEM, KernelShape::Unary, 8, &[0, 3, 6]),
    row(&NEHALEM, KernelShape::Transcendental, 4, &[0, 1, 4]),
    row(&NEHALEM, KernelShape::Reduce, 8, &[0, 3]),
    row(&NEHALEM, KernelShape::DotReduce, 8, &[0, 0, 3]),
    row(&K10, KernelShape::Binary, 8, &[0, 1, 5, 7]),
    row(&K10, KernelShape::Widening, 7, &[0, 0, 3, 4, 5, 6]),
    row(&K10, KernelShape::Unary, 8, &[0, 3, 6]),
    row(&K10, KernelShape::Transcendental, 4, &[0, 1, 4]),
    row(&K10, KernelShape::Reduce, 6, &[0, 3]),
    row(&K10, KernelShape::DotReduce, 6, &[0, 1, 4]),
    row(&CORTEX_A15, KernelShape::Binary, 8, &[0, 0, 4, 6]),
    row(&CORTEX_A15, KernelShape::Widening, 6, &[0, 0, 2, 2, 4, 6]),
    row(&CORTEX_A15, KernelShape::Unary, 8, &[0, 4, 6]),
    row(&CORTEX_A15, KernelShape::Transcendental, 4, &[0, 1, 4]),
    row(&CORTEX_A15, KernelShape::Reduce, 8, &[0, 4]),
    row(&CORTEX_A15, KernelShape::DotReduce, 8, &[0, 0, 4]),
    row(&CORTEX_A9, KernelShape::Binary, 6, &[0, 1, 4, 6]),
    row(&CORTEX_A9, KernelShape::Widening, 4, &[0, 0, 2, 2, 3, 4]),
    row(&CORTEX_A9, KernelShape::Unary, 6, &[0, 3, 5]),
    row(&CORTEX_A9, KernelShape::Transcendental, 2, &[0, 1, 2]),
    row(&CORTEX_A9, KernelShape::Reduce, 4, &[0, 3]),
    row(&CORTEX_A9, KernelShape::DotReduce, 4, &[0, 1, 3]),
];

//! Process-wide schedule cache.
//!
//! Routine bodies look their schedule up here instead of instantiating a
//! plan row per call. Each (target, shape, element, binding) slot is built
//! and validated on first use and then only read.

use std::sync::OnceLock;

use super::{KernelShape, PipelineSchedule, TargetPlan, TARGETS};
use crate::cpu::Microarchitecture;
use crate::element::{ElementType, ALL_ELEMENT_TYPES};
use crate::ir::Operand;

/// Operands a routine binds to its shape's load streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadBinding {
    /// Only `x` is loaded.
    X,
    /// Only `y` is loaded (scalar first operand).
    Y,
    /// `x` then `y`.
    XY,
}

impl LoadBinding {
    /// Every binding.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::XY];

    /// Load operands in stream order.
    #[must_use]
    pub const fn operands(self) -> &'static [Operand] {
        match self {
            Self::X => &[Operand::X],
            Self::Y => &[Operand::Y],
            Self::XY => &[Operand::X, Operand::Y],
        }
    }
}

const SLOTS: usize =
    TARGETS.len() * KernelShape::ALL.len() * ALL_ELEMENT_TYPES.len() * LoadBinding::ALL.len();

static SCHEDULES: [OnceLock<Option<PipelineSchedule>>; SLOTS] = [const { OnceLock::new() }; SLOTS];

fn slot(
    microarch: Microarchitecture,
    shape: KernelShape,
    element: ElementType,
    binding: LoadBinding,
) -> Option<usize> {
    let target = TARGETS.iter().position(|&t| t == microarch)?;
    let index = ((target * KernelShape::ALL.len() + shape as usize) * ALL_ELEMENT_TYPES.len()
        + element as usize)
        * LoadBinding::ALL.len()
        + binding as usize;
    Some(index)
}

fn build(
    microarch: Microarchitecture,
    shape: KernelShape,
    element: ElementType,
    binding: LoadBinding,
) -> Option<PipelineSchedule> {
    let built = TargetPlan::find(microarch, shape)
        .and_then(|plan| plan.schedule(element, binding.operands()));
    match built {
        Ok(schedule) => {
            tracing::debug!(
                %microarch,
                %shape,
                element = element.code(),
                batch = schedule.batch(),
                "schedule instantiated"
            );
            Some(schedule)
        }
        Err(error) => {
            tracing::error!(%microarch, %shape, element = element.code(), %error, "no schedule");
            None
        }
    }
}

/// Validated schedule for a routine, built once per process.
///
/// `None` for microarchitectures outside [`TARGETS`] and for bindings the
/// shape does not read; routine bodies then run the sequential loop.
#[must_use]
pub fn cached(
    microarch: Microarchitecture,
    shape: KernelShape,
    element: ElementType,
    binding: LoadBinding,
) -> Option<&'static PipelineSchedule> {
    let index = slot(microarch, shape, element, binding)?;
    SCHEDULES[index]
        .get_or_init(|| build(microarch, shape, element, binding))
        .as_ref()
}

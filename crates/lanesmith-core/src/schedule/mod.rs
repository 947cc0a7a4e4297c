//! Pipeline schedule builder.
//!
//! A [`PipelineSchedule`] is a set of instruction streams (columns), each
//! repeating one op family over the `unroll` registers of a batch and, for
//! memory streams, advancing its cursor once per batch. Every stream lags
//! stream 0 by a stage offset. With pass depth `M = unroll + 1`:
//!
//! - ramp-up issues `column[i - off]` for `i >= off`,
//! - each steady-state pass issues `column[(i - off) mod M]`,
//! - ramp-down issues `column[i + M - off]` for `i < off`.
//!
//! Ramp-up starts the first batch, every steady pass starts one more and
//! ramp-down only drains, so a run over `k` batches is one ramp-up, `k - 1`
//! steady passes and one ramp-down.

mod cache;
mod table;

#[cfg(test)]
mod schedule_tests;

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::cpu::Microarchitecture;
use crate::element::ElementType;
use crate::ir::{LatencyModel, MicroOp, Operand, StreamKind};

pub use cache::{cached, LoadBinding};
pub use table::{TargetPlan, PLANS, TARGETS};

/// Registers per bank in the portable register file.
pub const MAX_REGISTERS: usize = 16;

/// Lanes per register in the portable register file.
pub const MAX_LANES: usize = 32;

/// Kernel structure a plan row applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KernelShape {
    /// `z = f(x, y)` with equal element types.
    Binary,
    /// `z = f(x, y)` computed in a wider output type.
    Widening,
    /// `z = f(x)`, or `f(x, s)` with a broadcast scalar.
    Unary,
    /// Long-latency per-element math (log, exp, trig, polynomials).
    Transcendental,
    /// Fold of one array.
    Reduce,
    /// Fold of the products of two arrays.
    DotReduce,
}

impl KernelShape {
    /// Every shape.
    pub const ALL: [Self; 6] = [
        Self::Binary,
        Self::Widening,
        Self::Unary,
        Self::Transcendental,
        Self::Reduce,
        Self::DotReduce,
    ];

    /// Number of loaded operands the shape expects.
    #[must_use]
    pub const fn load_count(self) -> usize {
        match self {
            Self::Binary | Self::Widening | Self::DotReduce => 2,
            Self::Unary | Self::Transcendental | Self::Reduce => 1,
        }
    }

    /// True for shapes that fold into accumulators.
    #[must_use]
    pub const fn is_reduction(self) -> bool {
        matches!(self, Self::Reduce | Self::DotReduce)
    }

    /// Dependent arithmetic ops behind one compute op.
    #[must_use]
    pub const fn compute_chain(self) -> u32 {
        match self {
            Self::Transcendental => 16,
            _ => 1,
        }
    }

    /// Streams of the shape, in dependency order.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::LoadCount`] when `loads` does not bind
    /// exactly the operands the shape reads.
    pub fn streams(self, loads: &[Operand]) -> Result<SmallVec<[StreamKind; 8]>, ScheduleError> {
        if loads.len() != self.load_count() {
            return Err(ScheduleError::LoadCount {
                shape: self,
                expected: self.load_count(),
                found: loads.len(),
            });
        }
        let mut streams: SmallVec<[StreamKind; 8]> =
            loads.iter().map(|&op| StreamKind::Load(op)).collect();
        match self {
            Self::Binary | Self::Unary | Self::Transcendental => {
                streams.push(StreamKind::Compute);
                streams.push(StreamKind::Store(Operand::Z));
            }
            Self::Widening => {
                streams.extend(loads.iter().map(|&op| StreamKind::Widen(op)));
                streams.push(StreamKind::Compute);
                streams.push(StreamKind::Store(Operand::Z));
            }
            Self::Reduce | Self::DotReduce => streams.push(StreamKind::Accumulate),
        }
        Ok(streams)
    }
}

impl fmt::Display for KernelShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Order in which partial accumulators are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReductionTree {
    /// Balanced pairwise tree over lanes, then over registers.
    Pairwise,
    /// Left fold over lanes, then over registers.
    Sequential,
}

/// Schedule construction or validation failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// No plan row for the requested target and shape.
    #[error("no plan for {microarch} {shape}")]
    MissingPlan {
        /// Target microarchitecture.
        microarch: Microarchitecture,
        /// Kernel shape.
        shape: KernelShape,
    },

    /// Wrong number of loaded operands for the shape.
    #[error("{shape} loads {expected} operands, {found} bound")]
    LoadCount {
        /// Kernel shape.
        shape: KernelShape,
        /// Operands the shape reads.
        expected: usize,
        /// Operands bound.
        found: usize,
    },

    /// The schedule has no streams.
    #[error("schedule has no streams")]
    NoStreams,

    /// One offset per stream is required.
    #[error("{streams} streams but {offsets} offsets")]
    OffsetCount {
        /// Stream count.
        streams: usize,
        /// Offset count.
        offsets: usize,
    },

    /// Stream 0 is the reference and must not lag.
    #[error("stream 0 has offset {0}, expected 0")]
    FirstOffset(usize),

    /// A consumer may not run ahead of the stream feeding it.
    #[error("stream {stream} offset {offset} is below the previous offset {previous}")]
    DecreasingOffset {
        /// Stream index.
        stream: usize,
        /// Its offset.
        offset: usize,
        /// Offset of the stream before it.
        previous: usize,
    },

    /// A stream may lag by less than one full pass.
    #[error("stream {stream} offset {offset} is not below the pass depth {depth}")]
    OffsetTooLarge {
        /// Stream index.
        stream: usize,
        /// Its offset.
        offset: usize,
        /// Pass depth `unroll + 1`.
        depth: usize,
    },

    /// Register width must hold a whole number of elements.
    #[error("{register_bytes}-byte registers cannot hold {element_bytes}-byte elements")]
    RegisterWidth {
        /// Register width in bytes.
        register_bytes: usize,
        /// Element size in bytes.
        element_bytes: usize,
    },

    /// The plan does not fit the register file.
    #[error("{unroll} registers of {lanes} lanes exceed the register file")]
    RegisterFile {
        /// Registers per batch.
        unroll: usize,
        /// Lanes per register.
        lanes: usize,
    },

    /// One pass must consume exactly one batch per loaded operand.
    #[error("stream {stream} moves {elements} elements per pass, batch is {batch}")]
    BatchMismatch {
        /// Stream index.
        stream: usize,
        /// Elements loaded or stored per pass.
        elements: usize,
        /// Batch size.
        batch: usize,
    },
}

/// One stream and its stage offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSpec {
    /// Op family.
    pub kind: StreamKind,
    /// Virtual iterations behind stream 0.
    pub offset: usize,
}

/// Latency left uncovered between a producer and a consumer stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposedLatency {
    /// Producing stream.
    pub producer: StreamKind,
    /// Consuming stream.
    pub consumer: StreamKind,
    /// Producer latency in cycles.
    pub latency: u32,
    /// Cycles the offsets put between them.
    pub slack: u32,
    /// `latency - slack`, saturating.
    pub exposed: u32,
}

/// Per-dependency latency accounting of one schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyReport {
    /// Cycles to issue one op of every stream.
    pub cycles_per_step: u32,
    /// One entry per producer/consumer pair.
    pub dependencies: Vec<ExposedLatency>,
}

impl LatencyReport {
    /// Sum of exposed cycles per register.
    #[must_use]
    pub fn total_exposed(&self) -> u32 {
        self.dependencies.iter().map(|d| d.exposed).sum()
    }
}

/// Software pipeline for one kernel on one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSchedule {
    microarch: Microarchitecture,
    shape: KernelShape,
    element: ElementType,
    streams: SmallVec<[StreamSpec; 8]>,
    unroll: usize,
    lanes: usize,
    register_bytes: usize,
    latency: LatencyModel,
    reduction: ReductionTree,
}

impl PipelineSchedule {
    /// Builds and validates a schedule.
    ///
    /// `element` is the computation type (the widest operand type), which
    /// fixes the number of lanes per register.
    ///
    /// # Errors
    ///
    /// Returns a [`ScheduleError`] describing the first violated rule.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        microarch: Microarchitecture,
        shape: KernelShape,
        element: ElementType,
        kinds: &[StreamKind],
        offsets: &[usize],
        unroll: usize,
        register_bytes: usize,
        latency: LatencyModel,
        reduction: ReductionTree,
    ) -> Result<Self, ScheduleError> {
        if kinds.len() != offsets.len() {
            return Err(ScheduleError::OffsetCount {
                streams: kinds.len(),
                offsets: offsets.len(),
            });
        }
        let element_bytes = element.size();
        if register_bytes == 0 || register_bytes % element_bytes != 0 {
            return Err(ScheduleError::RegisterWidth {
                register_bytes,
                element_bytes,
            });
        }
        let schedule = Self {
            microarch,
            shape,
            element,
            streams: kinds
                .iter()
                .zip(offsets)
                .map(|(&kind, &offset)| StreamSpec { kind, offset })
                .collect(),
            unroll,
            lanes: register_bytes / element_bytes,
            register_bytes,
            latency,
            reduction,
        };
        schedule.validate()?;
        Ok(schedule)
    }

    /// Checks the structural invariants.
    ///
    /// # Errors
    ///
    /// Returns a [`ScheduleError`] describing the first violated rule.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        let Some(first) = self.streams.first() else {
            return Err(ScheduleError::NoStreams);
        };
        if first.offset != 0 {
            return Err(ScheduleError::FirstOffset(first.offset));
        }
        if self.unroll == 0 || self.unroll > MAX_REGISTERS || self.lanes > MAX_LANES {
            return Err(ScheduleError::RegisterFile {
                unroll: self.unroll,
                lanes: self.lanes,
            });
        }
        let depth = self.depth();
        let mut previous = 0;
        for (stream, spec) in self.streams.iter().enumerate() {
            if spec.offset < previous {
                return Err(ScheduleError::DecreasingOffset {
                    stream,
                    offset: spec.offset,
                    previous,
                });
            }
            if spec.offset >= depth {
                return Err(ScheduleError::OffsetTooLarge {
                    stream,
                    offset: spec.offset,
                    depth,
                });
            }
            previous = spec.offset;
        }
        let batch = self.batch();
        for stream in 0..self.streams.len() {
            if self.streams[stream].kind.cursor().is_none() {
                continue;
            }
            let mut moved = 0;
            let mut advanced = 0;
            for idx in 0..depth {
                match self.op_at(stream, idx) {
                    Some(MicroOp::Load { .. } | MicroOp::Store { .. }) => moved += self.lanes,
                    Some(MicroOp::Advance { elements, .. }) => advanced += elements,
                    _ => {}
                }
            }
            if moved != batch || advanced != batch {
                return Err(ScheduleError::BatchMismatch {
                    stream,
                    elements: moved,
                    batch,
                });
            }
        }
        Ok(())
    }

    /// Target microarchitecture.
    #[must_use]
    pub fn microarch(&self) -> Microarchitecture {
        self.microarch
    }

    /// Kernel shape.
    #[must_use]
    pub fn shape(&self) -> KernelShape {
        self.shape
    }

    /// Computation element type.
    #[must_use]
    pub fn element(&self) -> ElementType {
        self.element
    }

    /// Streams in dependency order.
    #[must_use]
    pub fn streams(&self) -> &[StreamSpec] {
        &self.streams
    }

    /// Registers per batch.
    #[must_use]
    pub fn unroll(&self) -> usize {
        self.unroll
    }

    /// Elements per register.
    #[must_use]
    pub fn lanes(&self) -> usize {
        self.lanes
    }

    /// Register width in bytes; also the alignment the prologue aims for.
    #[must_use]
    pub fn register_bytes(&self) -> usize {
        self.register_bytes
    }

    /// Accumulator combination order.
    #[must_use]
    pub fn reduction(&self) -> ReductionTree {
        self.reduction
    }

    /// Declared latencies.
    #[must_use]
    pub fn latency(&self) -> &LatencyModel {
        &self.latency
    }

    /// Elements per pass: `unroll * lanes`.
    #[must_use]
    pub fn batch(&self) -> usize {
        self.unroll * self.lanes
    }

    /// Virtual iteration length `M = unroll + 1` (one slot per register plus
    /// the cursor advance).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.unroll + 1
    }

    /// Op of `stream` at column position `idx`, if any.
    #[must_use]
    pub fn op_at(&self, stream: usize, idx: usize) -> Option<MicroOp> {
        let kind = self.streams.get(stream)?.kind;
        if idx < self.unroll {
            Some(kind.op(idx))
        } else if idx == self.unroll {
            kind.cursor().map(|operand| MicroOp::Advance {
                operand,
                elements: self.batch(),
            })
        } else {
            None
        }
    }

    /// Ops of the ramp-up pass.
    pub fn ramp_up(&self) -> impl Iterator<Item = MicroOp> + '_ {
        (0..self.depth()).flat_map(move |i| {
            self.streams
                .iter()
                .enumerate()
                .filter(move |(_, spec)| i >= spec.offset)
                .filter_map(move |(s, spec)| self.op_at(s, i - spec.offset))
        })
    }

    /// Ops of one steady-state pass.
    pub fn steady_state(&self) -> impl Iterator<Item = MicroOp> + '_ {
        let depth = self.depth();
        (0..depth).flat_map(move |i| {
            self.streams
                .iter()
                .enumerate()
                .filter_map(move |(s, spec)| self.op_at(s, (i + depth - spec.offset) % depth))
        })
    }

    /// Ops of the ramp-down pass.
    pub fn ramp_down(&self) -> impl Iterator<Item = MicroOp> + '_ {
        let depth = self.depth();
        (0..depth).flat_map(move |i| {
            self.streams
                .iter()
                .enumerate()
                .filter(move |(_, spec)| i < spec.offset)
                .filter_map(move |(s, spec)| self.op_at(s, i + depth - spec.offset))
        })
    }

    /// Latency each dependency leaves exposed under the declared model.
    #[must_use]
    pub fn latency_report(&self) -> LatencyReport {
        let issue = self.latency.issue_width.max(1);
        let streams = u32::try_from(self.streams.len()).unwrap_or(u32::MAX);
        let cycles_per_step = streams.div_ceil(issue);
        let float = self.element.is_float();

        let mut dependencies = Vec::new();
        for (c, consumer) in self.streams.iter().enumerate() {
            for producer in &self.streams[..c] {
                if !consumer.kind.consumes(producer.kind) {
                    continue;
                }
                let mut latency = self.latency.latency(producer.kind.class(), float);
                if producer.kind == StreamKind::Compute {
                    latency *= self.shape.compute_chain();
                }
                let distance = u32::try_from(consumer.offset - producer.offset).unwrap_or(u32::MAX);
                let slack = distance.saturating_mul(cycles_per_step);
                dependencies.push(ExposedLatency {
                    producer: producer.kind,
                    consumer: consumer.kind,
                    latency,
                    slack,
                    exposed: latency.saturating_sub(slack),
                });
            }
        }
        LatencyReport {
            cycles_per_step,
            dependencies,
        }
    }
}

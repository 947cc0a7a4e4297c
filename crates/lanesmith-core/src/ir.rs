//! Target-independent operation IR.
//!
//! A pipelined kernel body is a sequence of [`MicroOp`]s. Each op names a
//! register by its index inside the unrolled batch; banks (one per operand)
//! are resolved by the executor or by a listing backend. Stream offsetting
//! happens entirely on this IR, so backends never see the pipeline structure.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Memory operand of a kernel.
///
/// `X` and `Y` are the inputs, `Z` the output. Scalar inputs are bound to
/// `X` or `Y` as broadcast registers and never appear in a load stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    /// First input.
    X,
    /// Second input.
    Y,
    /// Output.
    Z,
}

impl Operand {
    /// Index of the operand's register bank.
    #[must_use]
    pub const fn bank(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Lowercase operand name used in listings.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One instruction of a pipelined body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum MicroOp {
    /// Load one register of `operand` from its stream cursor.
    Load {
        /// Source operand.
        operand: Operand,
        /// Register index within the batch.
        register: usize,
    },
    /// Convert a loaded register of `operand` to the wider output type.
    Widen {
        /// Operand whose register is converted.
        operand: Operand,
        /// Register index within the batch.
        register: usize,
    },
    /// Apply the lane operation to the input registers, producing `Z`.
    Compute {
        /// Register index within the batch.
        register: usize,
    },
    /// Fold the input registers into the partial accumulator.
    Accumulate {
        /// Register index within the batch.
        register: usize,
    },
    /// Store one `Z` register to the output cursor.
    Store {
        /// Destination operand.
        operand: Operand,
        /// Register index within the batch.
        register: usize,
    },
    /// Advance `operand`'s cursor past one batch.
    Advance {
        /// Operand whose cursor moves.
        operand: Operand,
        /// Elements skipped.
        elements: usize,
    },
}

impl MicroOp {
    /// Latency class of the op.
    #[must_use]
    pub const fn class(self) -> OpClass {
        match self {
            Self::Load { .. } => OpClass::Load,
            Self::Widen { .. } => OpClass::Convert,
            Self::Compute { .. } | Self::Accumulate { .. } => OpClass::Arithmetic,
            Self::Store { .. } => OpClass::Store,
            Self::Advance { .. } => OpClass::Address,
        }
    }
}

/// One column of the pipeline: the op family a stream repeats for every
/// register of the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamKind {
    /// Loads of one input.
    Load(Operand),
    /// Conversions of one input to the wider type.
    Widen(Operand),
    /// Lane operation producing output registers.
    Compute,
    /// Accumulation into partial sums.
    Accumulate,
    /// Stores of the output.
    Store(Operand),
}

impl StreamKind {
    /// Op issued by this stream for `register`.
    #[must_use]
    pub const fn op(self, register: usize) -> MicroOp {
        match self {
            Self::Load(operand) => MicroOp::Load { operand, register },
            Self::Widen(operand) => MicroOp::Widen { operand, register },
            Self::Compute => MicroOp::Compute { register },
            Self::Accumulate => MicroOp::Accumulate { register },
            Self::Store(operand) => MicroOp::Store { operand, register },
        }
    }

    /// Operand whose cursor this stream advances, if it touches memory.
    #[must_use]
    pub const fn cursor(self) -> Option<Operand> {
        match self {
            Self::Load(operand) | Self::Store(operand) => Some(operand),
            _ => None,
        }
    }

    /// Dependency stage: a stream consumes what earlier stages produce.
    #[must_use]
    pub const fn stage(self) -> u8 {
        match self {
            Self::Load(_) => 0,
            Self::Widen(_) => 1,
            Self::Compute | Self::Accumulate => 2,
            Self::Store(_) => 3,
        }
    }

    /// True when `self` reads what `producer` writes.
    #[must_use]
    pub fn consumes(self, producer: Self) -> bool {
        match (self, producer) {
            (Self::Widen(a), Self::Load(b)) => a == b,
            (Self::Compute | Self::Accumulate, Self::Load(_) | Self::Widen(_))
            | (Self::Store(_), Self::Compute) => true,
            _ => false,
        }
    }

    /// Latency class of the stream's ops.
    #[must_use]
    pub const fn class(self) -> OpClass {
        self.op(0).class()
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(op) => write!(f, "load {op}"),
            Self::Widen(op) => write!(f, "widen {op}"),
            Self::Compute => f.write_str("compute"),
            Self::Accumulate => f.write_str("accumulate"),
            Self::Store(op) => write!(f, "store {op}"),
        }
    }
}

/// Latency class of a micro-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpClass {
    /// Memory load.
    Load,
    /// Type conversion (unpack).
    Convert,
    /// Lane arithmetic.
    Arithmetic,
    /// Memory store.
    Store,
    /// Pointer arithmetic.
    Address,
}

/// Declared per-target latencies, in cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyModel {
    /// Vector load to use.
    pub load: u32,
    /// Integer unpack/convert.
    pub convert: u32,
    /// Integer lane arithmetic.
    pub integer: u32,
    /// Floating-point lane arithmetic.
    pub float: u32,
    /// Store to the next load of the same line.
    pub store: u32,
    /// Vector ops issued per cycle.
    pub issue_width: u32,
}

impl LatencyModel {
    /// Latency of one op of `class`.
    #[must_use]
    pub const fn latency(&self, class: OpClass, float: bool) -> u32 {
        match class {
            OpClass::Load => self.load,
            OpClass::Convert => self.convert,
            OpClass::Arithmetic if float => self.float,
            OpClass::Arithmetic => self.integer,
            OpClass::Store => self.store,
            OpClass::Address => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_ops_carry_register_index() {
        assert_eq!(
            StreamKind::Load(Operand::Y).op(3),
            MicroOp::Load {
                operand: Operand::Y,
                register: 3
            }
        );
        assert_eq!(StreamKind::Compute.op(0), MicroOp::Compute { register: 0 });
        assert_eq!(StreamKind::Store(Operand::Z).cursor(), Some(Operand::Z));
        assert_eq!(StreamKind::Widen(Operand::X).cursor(), None);
    }

    #[test]
    fn test_consumers() {
        assert!(StreamKind::Widen(Operand::X).consumes(StreamKind::Load(Operand::X)));
        assert!(!StreamKind::Widen(Operand::X).consumes(StreamKind::Load(Operand::Y)));
        assert!(StreamKind::Store(Operand::Z).consumes(StreamKind::Compute));
        assert!(!StreamKind::Compute.consumes(StreamKind::Store(Operand::Z)));
    }

    #[test]
    fn test_latency_model() {
        let model = LatencyModel {
            load: 5,
            convert: 1,
            integer: 1,
            float: 3,
            store: 1,
            issue_width: 2,
        };
        assert_eq!(model.latency(OpClass::Arithmetic, true), 3);
        assert_eq!(model.latency(OpClass::Arithmetic, false), 1);
        assert_eq!(StreamKind::Load(Operand::X).class(), OpClass::Load);
    }
}

//! Kernel descriptions.
//!
//! A [`KernelSpec`] is the operand-level contract of one exported routine:
//! element types, vector/scalar roles, in-place flags and the designated
//! length operand. The identity string, the parameter list handed to header
//! and documentation emitters and the listing headers are all derived from it.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::element::ElementType;

/// Vector (pointer to `length` elements) or scalar (single value) operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentKind {
    /// Array of `length` elements.
    Vector,
    /// One element.
    Scalar,
}

impl ArgumentKind {
    const fn code(self) -> char {
        match self {
            Self::Vector => 'V',
            Self::Scalar => 'S',
        }
    }
}

/// One input or output operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Argument {
    /// Parameter name in the exported prototype.
    pub name: &'static str,
    /// Vector or scalar role.
    pub kind: ArgumentKind,
    /// Element type.
    pub element: ElementType,
    /// Operand is read and overwritten by the same routine.
    pub in_place: bool,
}

impl Argument {
    /// Vector operand.
    #[must_use]
    pub const fn vector(name: &'static str, element: ElementType) -> Self {
        Self {
            name,
            kind: ArgumentKind::Vector,
            element,
            in_place: false,
        }
    }

    /// Scalar operand.
    #[must_use]
    pub const fn scalar(name: &'static str, element: ElementType) -> Self {
        Self {
            name,
            kind: ArgumentKind::Scalar,
            element,
            in_place: false,
        }
    }

    /// Marks the operand as in-place.
    #[must_use]
    pub const fn in_place(mut self) -> Self {
        self.in_place = true;
        self
    }

    fn push_code(&self, out: &mut String) {
        if self.in_place {
            out.push('I');
        }
        out.push(self.kind.code());
        out.push_str(self.element.code());
    }
}

/// A size operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Count {
    /// Parameter name.
    pub name: &'static str,
    /// Zero is rejected with `InvalidArgument`.
    pub non_zero: bool,
}

impl Count {
    /// Count that may be zero.
    #[must_use]
    pub const fn any(name: &'static str) -> Self {
        Self {
            name,
            non_zero: false,
        }
    }

    /// Count that must be non-zero.
    #[must_use]
    pub const fn non_zero(name: &'static str) -> Self {
        Self {
            name,
            non_zero: true,
        }
    }
}

/// Operand-level description of one exported routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KernelSpec {
    /// Library area, e.g. `Core` or `Math`.
    pub area: &'static str,
    /// Operation name, e.g. `Add`.
    pub function: &'static str,
    /// Input operands, in prototype order.
    pub inputs: &'static [Argument],
    /// Output operands, in prototype order.
    pub outputs: &'static [Argument],
    /// Auxiliary counts that precede the length (e.g. coefficient count).
    pub counts: &'static [Count],
    /// Designated length operand.
    pub length: Count,
}

/// Inconsistent kernel description.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// A kernel must produce something.
    #[error("{0} has no outputs")]
    NoOutputs(String),

    /// In-place input and output roles must pair up.
    #[error("{identity}: {inputs} in-place inputs but {outputs} in-place outputs")]
    InPlaceMismatch {
        /// Kernel identity.
        identity: String,
        /// In-place inputs.
        inputs: usize,
        /// In-place outputs.
        outputs: usize,
    },

    /// An in-place input has no output with the same name and type.
    #[error("{identity}: in-place operand {name} has no matching output")]
    UnpairedInPlace {
        /// Kernel identity.
        identity: String,
        /// Operand name.
        name: &'static str,
    },
}

impl KernelSpec {
    /// Compact operand signature, e.g. `V32sV32s_V32s` or `IV64fV64f_IV64f`.
    #[must_use]
    pub fn signature(&self) -> String {
        let mut out = String::with_capacity(4 * (self.inputs.len() + self.outputs.len()) + 1);
        for arg in self.inputs {
            arg.push_code(&mut out);
        }
        out.push('_');
        for arg in self.outputs {
            arg.push_code(&mut out);
        }
        out
    }

    /// Exported routine identity: `Area_Function_Signature`.
    #[must_use]
    pub fn identity(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "{}_{}_{}", self.area, self.function, self.signature());
        out
    }

    /// Checks the in-place pairing rules.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError`] when the kernel has no outputs, or when in-place
    /// inputs and outputs do not pair up by name and element type.
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.outputs.is_empty() {
            return Err(SpecError::NoOutputs(self.identity()));
        }
        let inputs = self.inputs.iter().filter(|a| a.in_place).count();
        let outputs = self.outputs.iter().filter(|a| a.in_place).count();
        if inputs != outputs {
            return Err(SpecError::InPlaceMismatch {
                identity: self.identity(),
                inputs,
                outputs,
            });
        }
        for input in self.inputs.iter().filter(|a| a.in_place) {
            let paired = self.outputs.iter().any(|out| {
                out.in_place
                    && out.name == input.name
                    && out.element == input.element
                    && out.kind == input.kind
            });
            if !paired {
                return Err(SpecError::UnpairedInPlace {
                    identity: self.identity(),
                    name: input.name,
                });
            }
        }
        Ok(())
    }

    /// Widest element type among the operands.
    #[must_use]
    pub fn widest_element(&self) -> ElementType {
        self.inputs
            .iter()
            .chain(self.outputs)
            .map(|a| a.element)
            .max_by_key(|e| e.size())
            .unwrap_or(ElementType::U8)
    }

    /// Public parameter list in prototype order.
    ///
    /// In-place operands appear once, with [`Direction::InOut`]. Scalar
    /// inputs are passed by value; scalar outputs by pointer.
    #[must_use]
    pub fn parameters(&self) -> Vec<Parameter> {
        let mut params = Vec::with_capacity(self.inputs.len() + self.outputs.len() + 2);
        for arg in self.inputs {
            let direction = if arg.in_place {
                Direction::InOut
            } else {
                Direction::In
            };
            params.push(Parameter::operand(arg, direction));
        }
        for arg in self.outputs.iter().filter(|a| !a.in_place) {
            params.push(Parameter::operand(arg, Direction::Out));
        }
        for count in self.counts.iter().chain(std::iter::once(&self.length)) {
            params.push(Parameter::count(count));
        }
        params
    }
}

/// Data flow direction of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Read only.
    In,
    /// Written only.
    Out,
    /// Read and overwritten.
    InOut,
}

/// One prototype parameter with its documented constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Data flow direction.
    pub direction: Direction,
    /// Passed as a pointer.
    pub pointer: bool,
    /// Element type, `None` for counts.
    pub element: Option<ElementType>,
    /// Null is rejected with `NullPointer`.
    pub non_null: bool,
    /// Required pointer alignment in bytes (0 when not a pointer).
    pub alignment: usize,
    /// Zero is rejected with `InvalidArgument`.
    pub non_zero: bool,
}

impl Parameter {
    fn operand(arg: &Argument, direction: Direction) -> Self {
        let pointer = arg.kind == ArgumentKind::Vector || direction != Direction::In;
        Self {
            name: arg.name.to_string(),
            direction,
            pointer,
            element: Some(arg.element),
            non_null: pointer,
            alignment: if pointer { arg.element.size() } else { 0 },
            non_zero: false,
        }
    }

    fn count(count: &Count) -> Self {
        Self {
            name: count.name.to_string(),
            direction: Direction::In,
            pointer: false,
            element: None,
            non_null: false,
            alignment: 0,
            non_zero: count.non_zero,
        }
    }
}

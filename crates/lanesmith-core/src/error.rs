//! Error types for lanesmith-core.
//!
//! Kernels fail only with [`Error::NullPointer`], [`Error::MisalignedPointer`]
//! or [`Error::InvalidArgument`], always before touching memory. The remaining
//! variants belong to the generator side (configuration, schedule tables, I/O).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::kernel_spec::SpecError;
use crate::schedule::ScheduleError;

/// Lanesmith error types.
#[derive(Error, Debug)]
pub enum Error {
    /// A required pointer operand is null.
    #[error("null pointer operand: {0}")]
    NullPointer(&'static str),

    /// A multi-byte element pointer violates its natural alignment.
    #[error("misaligned pointer operand: {0}")]
    MisalignedPointer(&'static str),

    /// A documented non-zero scalar argument is zero.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A per-target scheduling plan failed validation.
    #[error("schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    /// A kernel description is inconsistent.
    #[error("kernel spec error: {0}")]
    Spec(#[from] SpecError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns the routine status code for this error.
    ///
    /// Generator-side errors never escape a kernel, they map to `InvalidArgument`
    /// only so that the mapping stays total.
    #[must_use]
    pub fn status(&self) -> Status {
        match self {
            Self::NullPointer(_) => Status::NullPointer,
            Self::MisalignedPointer(_) => Status::MisalignedPointer,
            _ => Status::InvalidArgument,
        }
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for lanesmith operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric status returned by every exported routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum Status {
    /// Operation finished successfully.
    Ok = 0,
    /// One of the pointer arguments is null.
    NullPointer = 1,
    /// One of the pointer arguments is not properly aligned.
    MisalignedPointer = 2,
    /// One of the integer arguments has an unsupported value.
    InvalidArgument = 3,
}

impl Status {
    /// Stable numeric code.
    #[must_use]
    pub const fn code(self) -> u32 {
        self as u32
    }
}

impl<T> From<&Result<T>> for Status {
    fn from(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Self::Ok,
            Err(err) => err.status(),
        }
    }
}

//! Element types understood by the kernel generator.
//!
//! [`ElementType`] is the runtime description used in signatures, plans and
//! listings. [`Element`] is the compile-time side: the per-element arithmetic
//! every scalar operation and every pipelined lane batch is built from.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Element type of a kernel operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// Signed 8-bit integer.
    I8,
    /// Unsigned 8-bit integer.
    U8,
    /// Signed 16-bit integer.
    I16,
    /// Unsigned 16-bit integer.
    U16,
    /// Signed 32-bit integer.
    I32,
    /// Unsigned 32-bit integer.
    U32,
    /// Signed 64-bit integer.
    I64,
    /// Unsigned 64-bit integer.
    U64,
    /// IEEE-754 binary32.
    F32,
    /// IEEE-754 binary64.
    F64,
}

impl ElementType {
    /// Size of one element in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
        }
    }

    /// Width in bits.
    #[must_use]
    pub const fn bits(self) -> usize {
        self.size() * 8
    }

    /// True for IEEE-754 types.
    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// True for signed integers and floats.
    #[must_use]
    pub const fn is_signed(self) -> bool {
        !matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64)
    }

    /// Compact signature code: width followed by `s`, `u` or `f`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::I8 => "8s",
            Self::U8 => "8u",
            Self::I16 => "16s",
            Self::U16 => "16u",
            Self::I32 => "32s",
            Self::U32 => "32u",
            Self::I64 => "64s",
            Self::U64 => "64u",
            Self::F32 => "32f",
            Self::F64 => "64f",
        }
    }

    /// Parses a signature code produced by [`ElementType::code`].
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        ALL_ELEMENT_TYPES.iter().copied().find(|t| t.code() == code)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Every element type, narrowest first.
pub const ALL_ELEMENT_TYPES: [ElementType; 10] = [
    ElementType::I8,
    ElementType::U8,
    ElementType::I16,
    ElementType::U16,
    ElementType::I32,
    ElementType::U32,
    ElementType::I64,
    ElementType::U64,
    ElementType::F32,
    ElementType::F64,
];

/// Per-element arithmetic shared by scalar operations and lane batches.
///
/// Integer arithmetic wraps around; float arithmetic is plain IEEE-754 for
/// the element width. Min/max pick the right-hand operand only when it is
/// strictly smaller (larger), so NaN handling is identical in every
/// implementation that goes through this trait.
pub trait Element:
    Copy + Default + PartialEq + PartialOrd + fmt::Debug + Send + Sync + 'static
{
    /// Runtime description of the type.
    const TYPE: ElementType;

    /// Additive identity.
    const ZERO: Self;

    /// Wrapping or IEEE addition.
    fn add_lane(self, rhs: Self) -> Self;
    /// Wrapping or IEEE subtraction.
    fn sub_lane(self, rhs: Self) -> Self;
    /// Wrapping or IEEE multiplication.
    fn mul_lane(self, rhs: Self) -> Self;
    /// Absolute value (wrapping for the most negative integer).
    fn abs_lane(self) -> Self;
    /// Wrapping or IEEE negation; floats flip the sign bit, so `-0.0` is
    /// produced from `0.0`.
    fn neg_lane(self) -> Self;

    /// Minimum of two elements.
    #[inline(always)]
    fn min_lane(self, rhs: Self) -> Self {
        if rhs < self {
            rhs
        } else {
            self
        }
    }

    /// Maximum of two elements.
    #[inline(always)]
    fn max_lane(self, rhs: Self) -> Self {
        if rhs > self {
            rhs
        } else {
            self
        }
    }
}

/// Element type that converts losslessly into `T`: the narrow second
/// operand of mixed-width kernels.
pub trait Narrow<T: Element>: Element + Into<T> {}
impl<T: Element, N: Element + Into<T>> Narrow<T> for N {}

macro_rules! impl_signed_element {
    ($($t:ty => $variant:ident),* $(,)?) => {$(
        impl Element for $t {
            const TYPE: ElementType = ElementType::$variant;
            const ZERO: Self = 0;

            #[inline(always)]
            fn add_lane(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }
            #[inline(always)]
            fn sub_lane(self, rhs: Self) -> Self {
                self.wrapping_sub(rhs)
            }
            #[inline(always)]
            fn mul_lane(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }
            #[inline(always)]
            fn abs_lane(self) -> Self {
                self.wrapping_abs()
            }
            #[inline(always)]
            fn neg_lane(self) -> Self {
                self.wrapping_neg()
            }
        }
    )*};
}

macro_rules! impl_unsigned_element {
    ($($t:ty => $variant:ident),* $(,)?) => {$(
        impl Element for $t {
            const TYPE: ElementType = ElementType::$variant;
            const ZERO: Self = 0;

            #[inline(always)]
            fn add_lane(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }
            #[inline(always)]
            fn sub_lane(self, rhs: Self) -> Self {
                self.wrapping_sub(rhs)
            }
            #[inline(always)]
            fn mul_lane(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }
            #[inline(always)]
            fn abs_lane(self) -> Self {
                self
            }
            #[inline(always)]
            fn neg_lane(self) -> Self {
                self.wrapping_neg()
            }
        }
    )*};
}

macro_rules! impl_float_element {
    ($($t:ty => $variant:ident),* $(,)?) => {$(
        impl Element for $t {
            const TYPE: ElementType = ElementType::$variant;
            const ZERO: Self = 0.0;

            #[inline(always)]
            fn add_lane(self, rhs: Self) -> Self {
                self + rhs
            }
            #[inline(always)]
            fn sub_lane(self, rhs: Self) -> Self {
                self - rhs
            }
            #[inline(always)]
            fn mul_lane(self, rhs: Self) -> Self {
                self * rhs
            }
            #[inline(always)]
            fn abs_lane(self) -> Self {
                self.abs()
            }
            #[inline(always)]
            fn neg_lane(self) -> Self {
                -self
            }
        }
    )*};
}

impl_signed_element!(i8 => I8, i16 => I16, i32 => I32, i64 => I64);
impl_unsigned_element!(u8 => U8, u16 => U16, u32 => U32, u64 => U64);
impl_float_element!(f32 => F32, f64 => F64);

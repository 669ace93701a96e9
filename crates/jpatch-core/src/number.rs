use std::fmt;

use serde_json::Number as JsonNumber;

use crate::CanonicalizeError;

/// A JSON number, kept exactly as it was read.
///
/// Integers stay integers over the whole `u64`/`i64` range and floats stay
/// finite doubles, so numbers a patch does not touch are written back
/// unchanged. Two numbers are equal when they denote the same mathematical
/// value: integers compare exactly, and a float equals an integer only when
/// it is integral and has exactly that value (`1 == 1.0`, but
/// `9007199254740993 != 9007199254740992.0`).
#[derive(Clone, Copy, Debug)]
pub struct Number(Repr);

#[derive(Clone, Copy, Debug)]
enum Repr {
    PosInt(u64),
    /// Always negative.
    NegInt(i64),
    /// Always finite.
    Float(f64),
}

impl Number {
    /// Creates a floating-point [`Number`] after validating finiteness.
    ///
    /// ```
    /// # use jpatch_core::Number;
    /// let num = Number::new(42.5)?;
    /// assert_eq!(num.as_f64(), 42.5);
    /// assert!(Number::new(f64::NAN).is_err());
    /// # Ok::<(), jpatch_core::CanonicalizeError>(())
    /// ```
    pub fn new(value: f64) -> Result<Self, CanonicalizeError> {
        if value.is_finite() {
            Ok(Self(Repr::Float(value)))
        } else {
            Err(CanonicalizeError::NotFinite { value })
        }
    }

    /// Converts a `serde_json::Number` without losing precision.
    pub fn from_json_number(number: &JsonNumber) -> Result<Self, CanonicalizeError> {
        if let Some(u) = number.as_u64() {
            return Ok(Self::from(u));
        }
        if let Some(i) = number.as_i64() {
            return Ok(Self::from(i));
        }
        match number.as_f64() {
            Some(f) => Self::new(f),
            None => Err(CanonicalizeError::NumberOutOfRange { value: number.to_string() }),
        }
    }

    /// Converts a `serde_yaml::Number` without losing precision.
    pub fn from_yaml_number(number: &serde_yaml::Number) -> Result<Self, CanonicalizeError> {
        if let Some(u) = number.as_u64() {
            return Ok(Self::from(u));
        }
        if let Some(i) = number.as_i64() {
            return Ok(Self::from(i));
        }
        match number.as_f64() {
            Some(f) => Self::new(f),
            None => Err(CanonicalizeError::NumberOutOfRange { value: number.to_string() }),
        }
    }

    /// Indicates whether the number was read or built as an integer.
    #[must_use]
    pub fn is_integer(self) -> bool {
        !matches!(self.0, Repr::Float(_))
    }

    /// Returns the value as `i64` if it is an integer in range.
    #[must_use]
    pub fn as_i64(self) -> Option<i64> {
        match self.0 {
            Repr::PosInt(u) => i64::try_from(u).ok(),
            Repr::NegInt(i) => Some(i),
            Repr::Float(_) => None,
        }
    }

    /// Returns the value as `u64` if it is a non-negative integer.
    #[must_use]
    pub fn as_u64(self) -> Option<u64> {
        match self.0 {
            Repr::PosInt(u) => Some(u),
            _ => None,
        }
    }

    /// Returns the nearest double. Lossy for integers above 2^53.
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self.0 {
            Repr::PosInt(u) => u as f64,
            Repr::NegInt(i) => i as f64,
            Repr::Float(f) => f,
        }
    }

    /// Converts the number into a `serde_json::Number` of the same kind.
    #[must_use]
    pub fn to_json_number(self) -> JsonNumber {
        match self.0 {
            Repr::PosInt(u) => JsonNumber::from(u),
            Repr::NegInt(i) => JsonNumber::from(i),
            // Finite by construction, so `from_f64` cannot fail.
            Repr::Float(f) => JsonNumber::from_f64(f).unwrap_or_else(|| JsonNumber::from(0)),
        }
    }

    fn as_i128(self) -> Option<i128> {
        match self.0 {
            Repr::PosInt(u) => Some(i128::from(u)),
            Repr::NegInt(i) => Some(i128::from(i)),
            Repr::Float(_) => None,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self.0, other.0) {
            (Repr::Float(lhs), Repr::Float(rhs)) => lhs == rhs,
            (Repr::Float(float), _) => float_equals_integer(float, other.as_i128()),
            (_, Repr::Float(float)) => float_equals_integer(float, self.as_i128()),
            _ => self.as_i128() == other.as_i128(),
        }
    }
}

fn float_equals_integer(float: f64, integer: Option<i128>) -> bool {
    // Integral doubles below 2^127 convert to i128 exactly.
    integer.is_some_and(|integer| float.fract() == 0.0 && float as i128 == integer)
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json_number())
    }
}

impl TryFrom<f64> for Number {
    type Error = CanonicalizeError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Self(Repr::PosInt(value))
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        match u64::try_from(value) {
            Ok(u) => Self(Repr::PosInt(u)),
            Err(_) => Self(Repr::NegInt(value)),
        }
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Self::from(i64::from(value))
    }
}

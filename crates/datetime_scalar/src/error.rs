// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Display, Formatter};

use crate::canonical::CANONICAL_FORMAT;
use crate::input::{LiteralKind, SourceLocation};

/// Either category of coercion failure.
///
/// Engines that handle scalar failures in a single place can convert both
/// [`FieldError`] and [`QueryError`] into this type with `?`. Engines that treat
/// the categories differently (for example, nulling a field on a [`FieldError`]
/// but rejecting the whole request on a [`QueryError`]) match on the variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoercionError {
    /// An output coercion failure.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// An input coercion failure.
    #[error(transparent)]
    Query(#[from] QueryError),
}

impl CoercionError {
    /// Low-cardinality label of the underlying error kind.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Field(err) => err.kind().label(),
            Self::Query(err) => err.kind().label(),
        }
    }
}

/// A resolved value could not be serialized as a `DateTime`.
///
/// Raised by output coercion. The engine decides how the failure propagates; the
/// codec never turns it into a `null` on its own.
///
/// # Examples
///
/// ```
/// use datetime_scalar::{DateTimeScalar, FieldErrorKind, Scalar};
///
/// let err = DateTimeScalar.serialize(&"invalid date").unwrap_err();
///
/// assert_eq!(err.kind(), &FieldErrorKind::NotAnInstant);
/// assert_eq!(err.to_string(), "Field error: value is not an instance of Date");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Field error: {kind}")]
pub struct FieldError {
    kind: FieldErrorKind,
}

impl FieldError {
    pub(crate) const fn new(kind: FieldErrorKind) -> Self {
        Self { kind }
    }

    /// Which precondition of output coercion failed.
    #[must_use]
    pub const fn kind(&self) -> &FieldErrorKind {
        &self.kind
    }
}

/// The precondition of output coercion that was not met.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum FieldErrorKind {
    /// The value is not a native date/time value.
    #[error("value is not an instance of Date")]
    NotAnInstant,

    /// The value is a date/time value, but not one that has a canonical form.
    #[error("time value is invalid: {0}")]
    InvalidTime(RangeError),
}

impl FieldErrorKind {
    /// Low-cardinality label for telemetry and engine error extensions.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NotAnInstant => "datetime.not_an_instant",
            Self::InvalidTime(_) => "datetime.invalid_time",
        }
    }
}

/// Caller-supplied input could not be coerced into a `DateTime`.
///
/// Raised by input coercion. Errors for inline literals are prefixed with `Query error: `
/// and carry the literal's location when the engine knows it. Errors for variables
/// carry the bare message and no locations.
///
/// # Examples
///
/// ```
/// use datetime_scalar::{DateTimeScalar, QueryErrorKind, Scalar};
///
/// let err = DateTimeScalar.parse_variable(&"apa".into()).unwrap_err();
///
/// assert_eq!(err.kind(), &QueryErrorKind::InvalidDate("apa".to_string()));
/// assert_eq!(err.to_string(), "Invalid date: apa");
/// assert!(err.locations().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}{}", .origin.prefix(), .kind)]
pub struct QueryError {
    kind: QueryErrorKind,
    origin: InputOrigin,
    locations: Vec<SourceLocation>,
}

impl QueryError {
    pub(crate) fn literal(kind: QueryErrorKind, location: Option<SourceLocation>) -> Self {
        Self {
            kind,
            origin: InputOrigin::Literal,
            locations: location.into_iter().collect(),
        }
    }

    pub(crate) const fn variable(kind: QueryErrorKind) -> Self {
        Self {
            kind,
            origin: InputOrigin::Variable,
            locations: Vec::new(),
        }
    }

    /// Which step of input coercion rejected the input.
    #[must_use]
    pub const fn kind(&self) -> &QueryErrorKind {
        &self.kind
    }

    /// Whether the input was an inline literal or a variable.
    #[must_use]
    pub const fn origin(&self) -> InputOrigin {
        self.origin
    }

    /// Source locations of the offending literal, if known.
    #[must_use]
    pub fn locations(&self) -> &[SourceLocation] {
        &self.locations
    }
}

/// The step of input coercion that rejected the input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum QueryErrorKind {
    /// The input was not a string.
    #[error("Expected a string in {fmt} format but got a: {0}", fmt = CANONICAL_FORMAT)]
    UnexpectedKind(LiteralKind),

    /// The input is a string, but not one that describes a point in time.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// The input describes a point in time, but is not written in the canonical format.
    #[error("Invalid date format, only accepts: {fmt}: {0}", fmt = CANONICAL_FORMAT)]
    InvalidFormat(String),
}

impl QueryErrorKind {
    /// Low-cardinality label for telemetry and engine error extensions.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::UnexpectedKind(_) => "datetime.unexpected_kind",
            Self::InvalidDate(_) => "datetime.invalid_date",
            Self::InvalidFormat(_) => "datetime.invalid_format",
        }
    }
}

/// Where rejected input came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum InputOrigin {
    /// An inline literal in the query document.
    Literal,

    /// A variable bound alongside the query document.
    Variable,
}

impl InputOrigin {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Literal => "Query error: ",
            Self::Variable => "",
        }
    }
}

impl Display for InputOrigin {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal => f.write_str("literal"),
            Self::Variable => f.write_str("variable"),
        }
    }
}

/// A time value falls outside the range that has a canonical form.
///
/// The supported range is `0000-01-01T00:00:00.000Z` to `9999-12-31T23:59:59.999Z`,
/// inclusive.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{value} is outside the supported range")]
pub struct RangeError {
    value: String,
}

impl RangeError {
    pub(crate) fn new(value: impl Display) -> Self {
        Self {
            value: value.to_string(),
        }
    }
}

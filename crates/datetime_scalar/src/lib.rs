// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(
    test,
    allow(
        clippy::arithmetic_side_effects,
        clippy::unchecked_time_subtraction,
        clippy::unwrap_used,
        reason = "allow these lints in tests to improve the readability of the tests"
    )
)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A strict, round-trip-safe `DateTime` scalar for query engines.
//!
//! The scalar has exactly one textual form, `YYYY-MM-DDTHH:MM:SS.SSSZ`: UTC, four-digit year
//! and exactly three millisecond digits. Resolved values are written in that form, and
//! caller-supplied input is accepted only in that form.
//!
//! # Quick Start
//!
//! ```
//! use datetime_scalar::{DateTimeScalar, Instant, Scalar};
//! use jiff::SignedDuration;
//!
//! // Input coercion of a variable value.
//! let someday: Instant = DateTimeScalar.parse_variable(&"2015-07-24T10:56:42.744Z".into())?;
//!
//! // A resolver works with the value.
//! let next_day = someday.checked_add(SignedDuration::from_hours(24)).unwrap();
//!
//! // Output coercion of the resolved value.
//! assert_eq!(DateTimeScalar.serialize(&next_day)?, "2015-07-25T10:56:42.744Z");
//!
//! # Ok::<(), datetime_scalar::CoercionError>(())
//! ```
//!
//! # Why?
//!
//! Date strings are notoriously ambiguous. `07/08/2015` and `Fri Jul 24 2015 12:56:42 GMT+0200`
//! parse to *something* in most date libraries, but what they parse to depends on locale,
//! host time zone and library version. A schema that silently accepts them lets callers
//! send values that get reinterpreted on the way in.
//!
//! This crate validates input in two phases:
//!
//! 1. A permissive parser decides whether the text describes a point in time at all. If
//!    not, the input is rejected as an invalid date.
//! 2. The resulting point in time is written back in the canonical format. If that text is
//!    not byte-for-byte equal to the input, the input is rejected as an invalid format.
//!
//! The two failure modes are reported separately, so callers learn whether they sent
//! garbage or a real date in the wrong shape.
//!
//! # Overview
//!
//! - [`DateTimeScalar`] - The codec. Implements [`Scalar`], the contract through which an
//!   engine registers a custom scalar, and can be turned into a [`ScalarDefinition`] record.
//! - [`Instant`] - The in-memory value: a UTC point in time with millisecond precision.
//! - [`Input`], [`Literal`], [`LiteralKind`], [`SourceLocation`] - How an engine hands input
//!   to a scalar.
//! - [`FieldError`] - Output coercion failures.
//! - [`QueryError`] - Input coercion failures.
//! - [`CoercionError`] - Either of the above.
//!
//! # Null handling
//!
//! `null` never reaches the codec. Engines propagate `null` field values and `null` input
//! on their own, so a field resolving to `None` is sent as `null` without calling
//! [`Scalar::serialize`].
//!
//! # Features
//!
//! - `serde` (default) - `Serialize` and `Deserialize` for [`Instant`], using the canonical
//!   format in both directions.
//! - `logs` - Emits `tracing` events when a coercion is rejected, and a trace-level event
//!   naming the parser that recognized accepted input.

mod canonical;
mod error;
mod input;
mod instant;
mod lenient;
mod scalar;

pub use canonical::CANONICAL_FORMAT;
pub use error::{CoercionError, FieldError, FieldErrorKind, InputOrigin, QueryError, QueryErrorKind, RangeError};
pub use input::{Input, Literal, LiteralKind, SourceLocation};
pub use instant::Instant;
pub use scalar::{DateTimeScalar, Scalar, ScalarDefinition};

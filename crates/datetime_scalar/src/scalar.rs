// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::any::Any;
use std::fmt::{self, Debug, Formatter};
use std::time::SystemTime;

use jiff::{Timestamp, Zoned};

use crate::error::{FieldError, FieldErrorKind, QueryError, QueryErrorKind};
use crate::input::{Input, Literal, SourceLocation};
use crate::{Instant, lenient};

/// A custom scalar type, as registered with a query engine.
///
/// The engine calls [`serialize`][Scalar::serialize] when a resolved field value of this
/// type is sent to a caller, and [`parse`][Scalar::parse] for every literal or variable
/// supplied for an argument of this type. The engine remains responsible for `null`
/// handling: neither function is called for a `null` value.
pub trait Scalar {
    /// The name of the type in the schema.
    const NAME: &'static str;

    /// The in-memory value produced by input coercion.
    type Value;

    /// Output coercion: converts a resolved value to its wire text.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] if the value cannot be represented by this scalar.
    fn serialize(&self, value: &dyn Any) -> Result<String, FieldError>;

    /// Input coercion: converts caller-supplied input to an in-memory value.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] if the input is not acceptable for this scalar.
    fn parse(&self, input: Input<'_>) -> Result<Self::Value, QueryError>;

    /// Input coercion of an inline literal.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] carrying `location` if the literal is not acceptable.
    fn parse_literal(&self, value: &Literal, location: Option<SourceLocation>) -> Result<Self::Value, QueryError> {
        self.parse(Input::Literal { value, location })
    }

    /// Input coercion of a variable value.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] if the value is not acceptable.
    fn parse_variable(&self, value: &serde_json::Value) -> Result<Self::Value, QueryError> {
        self.parse(Input::Variable(value))
    }
}

/// Registration record for engines that keep scalars in a table.
///
/// Holds the type name and both coercion functions as plain function pointers.
///
/// # Examples
///
/// ```
/// use datetime_scalar::{DateTimeScalar, ScalarDefinition};
///
/// let definition = ScalarDefinition::of::<DateTimeScalar>();
/// assert_eq!(definition.name(), "DateTime");
///
/// let instant = definition.parse_variable(&"2015-07-24T10:56:42.744Z".into())?;
/// assert_eq!(definition.serialize(&instant)?, "2015-07-24T10:56:42.744Z");
///
/// # Ok::<(), datetime_scalar::CoercionError>(())
/// ```
pub struct ScalarDefinition<V> {
    name: &'static str,
    serialize: fn(&dyn Any) -> Result<String, FieldError>,
    parse: fn(Input<'_>) -> Result<V, QueryError>,
}

impl<V> ScalarDefinition<V> {
    /// Builds the record for a scalar type.
    #[must_use]
    pub fn of<S>() -> Self
    where
        S: Scalar<Value = V> + Default,
    {
        Self {
            name: S::NAME,
            serialize: |value| S::default().serialize(value),
            parse: |input| S::default().parse(input),
        }
    }

    /// The name of the type in the schema.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Output coercion, see [`Scalar::serialize`].
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] if the value cannot be represented by the scalar.
    pub fn serialize(&self, value: &dyn Any) -> Result<String, FieldError> {
        (self.serialize)(value)
    }

    /// Input coercion, see [`Scalar::parse`].
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] if the input is not acceptable for the scalar.
    pub fn parse(&self, input: Input<'_>) -> Result<V, QueryError> {
        (self.parse)(input)
    }

    /// Input coercion of an inline literal, see [`Scalar::parse_literal`].
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] carrying `location` if the literal is not acceptable.
    pub fn parse_literal(&self, value: &Literal, location: Option<SourceLocation>) -> Result<V, QueryError> {
        self.parse(Input::Literal { value, location })
    }

    /// Input coercion of a variable value, see [`Scalar::parse_variable`].
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] if the value is not acceptable.
    pub fn parse_variable(&self, value: &serde_json::Value) -> Result<V, QueryError> {
        self.parse(Input::Variable(value))
    }
}

impl<V> Debug for ScalarDefinition<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarDefinition").field("name", &self.name).finish_non_exhaustive()
    }
}

impl<V> Clone for ScalarDefinition<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for ScalarDefinition<V> {}

/// The `DateTime` scalar.
///
/// Output coercion accepts [`Instant`] as well as [`jiff::Timestamp`], [`jiff::Zoned`] and
/// [`SystemTime`] values, and writes them as `YYYY-MM-DDTHH:MM:SS.SSSZ`.
///
/// Input coercion accepts exactly that format and nothing else. It runs three checks and
/// stops at the first failure:
///
/// 1. The input must be a string. Numbers are rejected even when they would make a valid
///    epoch timestamp.
/// 2. The string must describe a point in time. A permissive parser decides this, so
///    `Fri, 24 Jul 2015 10:56:42 GMT` passes this step.
/// 3. The point in time, written back in the canonical format, must equal the input
///    exactly. This is what rejects every other date format.
///
/// Literals and variables are validated identically.
///
/// # Examples
///
/// ```
/// use datetime_scalar::{DateTimeScalar, Literal, QueryErrorKind, Scalar, SourceLocation};
///
/// let at = SourceLocation::new(1, 15);
///
/// let instant = DateTimeScalar.parse_literal(&"2015-07-24T10:56:42.744Z".into(), Some(at))?;
/// assert_eq!(DateTimeScalar.serialize(&instant)?, "2015-07-24T10:56:42.744Z");
///
/// let err = DateTimeScalar
///     .parse_literal(&"Fri Jul 24 2015 12:56:42 GMT+0200 (CEST)".into(), Some(at))
///     .unwrap_err();
/// assert!(matches!(err.kind(), QueryErrorKind::InvalidFormat(_)));
/// assert_eq!(err.locations(), &[at]);
///
/// let err = DateTimeScalar.parse_literal(&Literal::Int(1_437_735_402_744), Some(at)).unwrap_err();
/// assert!(matches!(err.kind(), QueryErrorKind::UnexpectedKind(_)));
///
/// # Ok::<(), datetime_scalar::CoercionError>(())
/// ```
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DateTimeScalar;

impl Scalar for DateTimeScalar {
    const NAME: &'static str = "DateTime";

    type Value = Instant;

    fn serialize(&self, value: &dyn Any) -> Result<String, FieldError> {
        let result = to_instant(value).map(Instant::to_canonical);

        #[cfg(any(feature = "logs", test))]
        if let Err(error) = &result {
            tracing::event!(
                name: "datetime_scalar.serialize.rejected",
                tracing::Level::DEBUG,
                error.label = error.kind().label(),
                error.message = %error,
            );
        }

        result
    }

    fn parse(&self, input: Input<'_>) -> Result<Instant, QueryError> {
        let result = coerce_input(input);

        #[cfg(any(feature = "logs", test))]
        if let Err(error) = &result {
            tracing::event!(
                name: "datetime_scalar.parse.rejected",
                tracing::Level::DEBUG,
                error.label = error.kind().label(),
                input.origin = %error.origin(),
                error.message = %error,
            );
        }

        result
    }
}

fn to_instant(value: &dyn Any) -> Result<Instant, FieldError> {
    if let Some(instant) = value.downcast_ref::<Instant>() {
        return Ok(*instant);
    }

    let converted = if let Some(timestamp) = value.downcast_ref::<Timestamp>() {
        Instant::try_from(*timestamp)
    } else if let Some(zoned) = value.downcast_ref::<Zoned>() {
        Instant::try_from(zoned)
    } else if let Some(system_time) = value.downcast_ref::<SystemTime>() {
        Instant::try_from(*system_time)
    } else {
        return Err(FieldError::new(FieldErrorKind::NotAnInstant));
    };

    converted.map_err(|error| FieldError::new(FieldErrorKind::InvalidTime(error)))
}

fn coerce_input(input: Input<'_>) -> Result<Instant, QueryError> {
    let reject = |kind| match input {
        Input::Literal { location, .. } => QueryError::literal(kind, location),
        Input::Variable(_) => QueryError::variable(kind),
    };

    let Some(text) = input.as_text() else {
        return Err(reject(QueryErrorKind::UnexpectedKind(input.kind())));
    };

    parse_text(text).map_err(reject)
}

/// Validates string input: permissive parse, then exact canonical round trip.
pub(crate) fn parse_text(text: &str) -> Result<Instant, QueryErrorKind> {
    #[cfg_attr(
        not(any(feature = "logs", test)),
        expect(unused_variables, reason = "the matching strategy is only reported in logs")
    )]
    let Some((datetime, strategy)) = lenient::parse(text) else {
        return Err(QueryErrorKind::InvalidDate(text.to_string()));
    };

    // A real point in time, but one without a four-digit year cannot be written canonically.
    let Ok(instant) = Instant::from_utc_datetime(datetime) else {
        return Err(QueryErrorKind::InvalidFormat(text.to_string()));
    };

    if instant.to_canonical() != text {
        return Err(QueryErrorKind::InvalidFormat(text.to_string()));
    }

    #[cfg(any(feature = "logs", test))]
    tracing::event!(
        name: "datetime_scalar.parse.accepted",
        tracing::Level::TRACE,
        parse.strategy = strategy.name(),
    );

    Ok(instant)
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use std::time::Duration;

    use jiff::SignedDuration;
    use serde_json::json;
    use tracing_test::traced_test;

    use super::*;
    use crate::error::InputOrigin;
    use crate::input::LiteralKind;

    static_assertions::assert_impl_all!(DateTimeScalar: Send, Sync, Copy, Default, Debug);
    static_assertions::assert_impl_all!(ScalarDefinition<Instant>: Send, Sync, Copy, Debug);

    const SOMEDAY: &str = "2015-07-24T10:56:42.744Z";

    fn literal(text: &str) -> Result<Instant, QueryError> {
        DateTimeScalar.parse_literal(&Literal::from(text), Some(SourceLocation::new(1, 17)))
    }

    fn variable(text: &str) -> Result<Instant, QueryError> {
        DateTimeScalar.parse_variable(&json!(text))
    }

    #[test]
    fn name() {
        assert_eq!(DateTimeScalar::NAME, "DateTime");
    }

    #[test]
    fn serialize_instant() {
        let instant = Instant::from_millis(1_437_735_402_744).unwrap();
        assert_eq!(DateTimeScalar.serialize(&instant).unwrap(), SOMEDAY);
    }

    #[test]
    fn serialize_native_time_values() {
        let timestamp: Timestamp = SOMEDAY.parse().unwrap();
        assert_eq!(DateTimeScalar.serialize(&timestamp).unwrap(), SOMEDAY);

        let zoned: Zoned = "2015-07-24T12:56:42.744+02:00[+02:00]".parse().unwrap();
        assert_eq!(DateTimeScalar.serialize(&zoned).unwrap(), SOMEDAY);

        let system_time = SystemTime::UNIX_EPOCH + Duration::from_millis(1_437_735_402_744);
        assert_eq!(DateTimeScalar.serialize(&system_time).unwrap(), SOMEDAY);
    }

    #[test]
    fn serialize_truncates_to_millis() {
        let timestamp: Timestamp = "2015-07-24T10:56:42.744999999Z".parse().unwrap();
        assert_eq!(DateTimeScalar.serialize(&timestamp).unwrap(), SOMEDAY);
    }

    #[test]
    fn serialize_not_an_instant() {
        for value in [&"invalid date" as &dyn Any, &SOMEDAY.to_string(), &1_437_735_402_744_i64, &Some(Instant::MIN)] {
            let err = DateTimeScalar.serialize(value).unwrap_err();
            assert_eq!(err.kind(), &FieldErrorKind::NotAnInstant);
        }
    }

    #[test]
    fn serialize_invalid_time() {
        let err = DateTimeScalar.serialize(&Timestamp::MIN).unwrap_err();
        assert!(matches!(err.kind(), FieldErrorKind::InvalidTime(_)));
        assert!(err.to_string().starts_with("Field error: time value is invalid: "));

        let far = SystemTime::UNIX_EPOCH + Duration::from_secs(3600 * 24 * 365 * 20000);
        let err = DateTimeScalar.serialize(&far).unwrap_err();
        assert!(matches!(err.kind(), FieldErrorKind::InvalidTime(_)));
    }

    #[test]
    fn parse_canonical() {
        assert_eq!(literal(SOMEDAY).unwrap().as_millis(), 1_437_735_402_744);
        assert_eq!(variable(SOMEDAY).unwrap().as_millis(), 1_437_735_402_744);
        assert_eq!(literal("0000-01-01T00:00:00.000Z").unwrap(), Instant::MIN);
        assert_eq!(literal("9999-12-31T23:59:59.999Z").unwrap(), Instant::MAX);
        assert_eq!(literal("1969-12-31T23:59:59.999Z").unwrap().as_millis(), -1);
    }

    #[test]
    fn parse_then_add_a_day() {
        let someday = literal(SOMEDAY).unwrap();
        let next_day = someday.checked_add(SignedDuration::from_millis(86_400_000)).unwrap();

        assert_eq!(DateTimeScalar.serialize(&next_day).unwrap(), "2015-07-25T10:56:42.744Z");
    }

    #[test]
    fn unexpected_kinds() {
        let at = Some(SourceLocation::new(2, 3));
        let literals = [
            Literal::Int(1_437_735_402_744),
            Literal::Float(1.5),
            Literal::Boolean(true),
            Literal::Null,
            Literal::Enum("NOW".to_string()),
            Literal::List(vec![Literal::from(SOMEDAY)]),
            Literal::Object(vec![("at".to_string(), Literal::from(SOMEDAY))]),
        ];

        for value in &literals {
            let err = DateTimeScalar.parse_literal(value, at).unwrap_err();
            assert_eq!(err.kind(), &QueryErrorKind::UnexpectedKind(value.kind()));
            assert_eq!(err.locations(), &[SourceLocation::new(2, 3)]);
        }

        let err = DateTimeScalar.parse_variable(&json!(1_437_735_402_744_i64)).unwrap_err();
        assert_eq!(err.kind(), &QueryErrorKind::UnexpectedKind(LiteralKind::Int));
        assert_eq!(
            err.to_string(),
            "Expected a string in YYYY-MM-DDTHH:MM:SS.SSSZ format but got a: IntValue"
        );

        let err = DateTimeScalar.parse_variable(&json!([SOMEDAY])).unwrap_err();
        assert_eq!(err.kind(), &QueryErrorKind::UnexpectedKind(LiteralKind::List));
    }

    #[test]
    fn invalid_dates() {
        for text in ["invalid date", "invalid data", "apa", "", " ", "2015-13-24T10:56:42.744Z"] {
            let err = literal(text).unwrap_err();
            assert_eq!(err.kind(), &QueryErrorKind::InvalidDate(text.to_string()), "{text:?}");
            assert_eq!(err.to_string(), format!("Query error: Invalid date: {text}"));

            let err = variable(text).unwrap_err();
            assert_eq!(err.to_string(), format!("Invalid date: {text}"));
        }
    }

    #[test]
    fn invalid_formats() {
        let texts = [
            "Fri Jul 24 2015 12:56:42 GMT+0200 (CEST)",
            "Fri, 24 Jul 2015 10:56:42 GMT",
            "2015-07-24T12:56:42.744+02:00",
            "2015-07-24T10:56:42.744+00:00",
            "2015-07-24T10:56:42Z",
            "2015-07-24T10:56:42.74Z",
            "2015-07-24T10:56:42.7440Z",
            "2015-07-24T10:56:42.744",
            "2015-07-24 10:56:42.744Z",
            "2015-07-24",
            " 2015-07-24T10:56:42.744Z",
            "2015-07-24T10:56:42.744Z\n",
            "-000001-01-01T00:00:00.000Z",
        ];

        for text in texts {
            let err = literal(text).unwrap_err();
            assert_eq!(err.kind(), &QueryErrorKind::InvalidFormat(text.to_string()), "{text:?}");
            assert_eq!(
                err.to_string(),
                format!("Query error: Invalid date format, only accepts: YYYY-MM-DDTHH:MM:SS.SSSZ: {text}")
            );

            let err = variable(text).unwrap_err();
            assert_eq!(err.kind(), &QueryErrorKind::InvalidFormat(text.to_string()), "{text:?}");
            assert_eq!(err.origin(), InputOrigin::Variable);
        }
    }

    #[test]
    fn literal_and_variable_agree() {
        let texts = [SOMEDAY, "apa", "2015-07-24", "Fri, 24 Jul 2015 10:56:42 GMT", "1970-01-01T00:00:00.000Z"];

        for text in texts {
            let from_literal = literal(text).map_err(|e| e.kind().clone());
            let from_variable = variable(text).map_err(|e| e.kind().clone());
            assert_eq!(from_literal, from_variable, "{text:?}");
        }
    }

    #[test]
    fn literal_location_is_optional() {
        let err = DateTimeScalar.parse_literal(&Literal::from("apa"), None).unwrap_err();
        assert_eq!(err.origin(), InputOrigin::Literal);
        assert!(err.locations().is_empty());
    }

    #[test]
    fn roundtrip() {
        let millis = [
            0,
            1,
            -1,
            999,
            1_437_735_402_744,
            951_782_400_000, // leap day 2000
            -62_167_219_200_000,
            253_402_207_200_999,
            253_402_207_201_000,
            253_402_300_799_999,
        ];

        for ms in millis {
            let instant = Instant::from_millis(ms).unwrap();
            let text = DateTimeScalar.serialize(&instant).unwrap();
            assert_eq!(variable(&text).unwrap(), instant, "{text}");
        }
    }

    #[test]
    fn largest_instants_roundtrip() {
        let text = DateTimeScalar.serialize(&Instant::MAX).unwrap();
        assert_eq!(text, "9999-12-31T23:59:59.999Z");
        assert_eq!(variable(&text).unwrap(), Instant::MAX);
        assert_eq!(literal(&text).unwrap(), Instant::MAX);

        let text = DateTimeScalar.serialize(&Timestamp::MAX).unwrap();
        assert_eq!(text, "9999-12-30T22:00:00.999Z");
        assert_eq!(variable(&text).unwrap().as_millis(), 253_402_207_200_999);
    }

    #[test]
    fn every_four_digit_year_is_accepted() {
        let texts = [
            "9999-12-30T22:00:01.000Z",
            "9999-12-31T00:00:00.000Z",
            "9999-12-31T23:59:59.999Z",
            "0000-01-01T00:00:00.000Z",
            "0000-02-29T12:00:00.000Z",
        ];

        for text in texts {
            let instant = variable(text).unwrap();
            assert_eq!(instant.to_string(), text);
        }
    }

    #[test]
    fn end_of_year_9999_in_other_formats_is_a_format_error() {
        for text in ["9999-12-31T23:59:59Z", "9999-12-31T23:59:59.999", "9999-12-31T23:59:59.9999Z"] {
            let err = variable(text).unwrap_err();
            assert_eq!(err.kind(), &QueryErrorKind::InvalidFormat(text.to_string()), "{text:?}");
        }
    }

    #[test]
    fn definition_matches_scalar() {
        let definition = ScalarDefinition::of::<DateTimeScalar>();

        assert_eq!(definition.name(), "DateTime");
        assert_eq!(definition.parse_variable(&json!(SOMEDAY)), variable(SOMEDAY));
        assert_eq!(
            definition.parse_literal(&Literal::from("apa"), None),
            DateTimeScalar.parse_literal(&Literal::from("apa"), None)
        );
        assert_eq!(definition.serialize(&"x").unwrap_err().kind(), &FieldErrorKind::NotAnInstant);
        assert_eq!(format!("{definition:?}"), "ScalarDefinition { name: \"DateTime\", .. }");
    }

    #[test]
    #[traced_test]
    fn parse_rejection_is_logged() {
        literal("apa").unwrap_err();

        assert!(logs_contain("datetime.invalid_date"));
        assert!(logs_contain("input.origin=literal"));
    }

    #[test]
    #[traced_test]
    fn serialize_rejection_is_logged() {
        DateTimeScalar.serialize(&"invalid date").unwrap_err();

        assert!(logs_contain("datetime.not_an_instant"));
    }

    #[test]
    #[traced_test]
    fn out_of_range_output_is_logged() {
        let year_20000 = SystemTime::UNIX_EPOCH + Duration::from_secs(18_000 * 365 * 24 * 60 * 60);
        DateTimeScalar.serialize(&year_20000).unwrap_err();

        assert!(logs_contain("datetime.invalid_time"));
    }

    #[test]
    #[traced_test]
    fn accepted_strategy_is_logged() {
        variable(SOMEDAY).unwrap();

        assert!(logs_contain("parse.strategy=\"rfc3339\""));
    }
}

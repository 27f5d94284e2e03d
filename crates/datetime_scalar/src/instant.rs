// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::time::{Duration, SystemTime};

use jiff::civil::DateTime;
use jiff::{SignedDuration, Timestamp, Zoned};

use crate::canonical::{self, UNIX_EPOCH};
use crate::error::{QueryError, RangeError};
use crate::scalar;

const MIN_MILLIS: i64 = -62_167_219_200_000;
const MAX_MILLIS: i64 = 253_402_300_799_999;
const NANOS_PER_MILLI: i128 = 1_000_000;

/// A point in time with millisecond precision, in UTC.
///
/// This is the value produced by input coercion of the `DateTime` scalar and the value
/// that resolvers hand back for output coercion. Every `Instant` has exactly one
/// canonical textual form, `YYYY-MM-DDTHH:MM:SS.SSSZ`, which is what [`Display`] writes.
///
/// # Range
///
/// The representable range is every instant with a four-digit year, from
/// `0000-01-01T00:00:00.000Z` ([`Instant::MIN`]) to `9999-12-31T23:59:59.999Z`
/// ([`Instant::MAX`]). Values outside of it have no canonical form; conversions from other
/// time types fail for them.
///
/// The range reaches slightly past [`jiff::Timestamp::MAX`], so converting the last
/// hours of year 9999 back into a [`Timestamp`] fails.
///
/// # Precision
///
/// Conversions from finer-grained time types round down to the whole millisecond.
///
/// # Examples
///
/// ```
/// use datetime_scalar::Instant;
/// use jiff::SignedDuration;
///
/// let someday: Instant = "2015-07-24T10:56:42.744Z".parse()?;
/// let next_day = someday.checked_add(SignedDuration::from_hours(24)).unwrap();
///
/// assert_eq!(next_day.to_string(), "2015-07-25T10:56:42.744Z");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// Only canonical text parses:
///
/// ```
/// use datetime_scalar::Instant;
///
/// assert!("2015-07-24T10:56:42Z".parse::<Instant>().is_err());
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant(i64);

impl Instant {
    /// The earliest representable instant, `0000-01-01T00:00:00.000Z`.
    pub const MIN: Self = Self(MIN_MILLIS);

    /// The latest representable instant, `9999-12-31T23:59:59.999Z`.
    pub const MAX: Self = Self(MAX_MILLIS);

    /// `1970-01-01T00:00:00.000Z`.
    pub const UNIX_EPOCH: Self = Self(0);

    /// Creates an instant from milliseconds since the Unix epoch.
    ///
    /// # Errors
    ///
    /// Returns an error if the result would lie outside [`Instant::MIN`]..=[`Instant::MAX`].
    pub fn from_millis(millis: i64) -> Result<Self, RangeError> {
        if !(MIN_MILLIS..=MAX_MILLIS).contains(&millis) {
            return Err(RangeError::new(format_args!("{millis} ms since Unix epoch")));
        }

        Ok(Self(millis))
    }

    /// Returns the number of milliseconds since the Unix epoch.
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Returns the current system time, rounded down to the millisecond.
    ///
    /// A system clock outside the representable range saturates to the nearest bound.
    #[must_use]
    pub fn now() -> Self {
        Self::saturating(Timestamp::now().as_nanosecond())
    }

    /// Adds a duration, rounding the result down to the millisecond.
    ///
    /// Returns `None` if the result lies outside the representable range.
    #[must_use]
    pub fn checked_add(self, duration: SignedDuration) -> Option<Self> {
        self.as_nanos().checked_add(duration.as_nanos()).and_then(Self::from_nanos)
    }

    /// Subtracts a duration, rounding the result down to the millisecond.
    ///
    /// Returns `None` if the result lies outside the representable range.
    #[must_use]
    pub fn checked_sub(self, duration: SignedDuration) -> Option<Self> {
        self.as_nanos().checked_sub(duration.as_nanos()).and_then(Self::from_nanos)
    }

    /// Returns the signed duration elapsed from `earlier` to `self`.
    #[must_use]
    pub fn duration_since(self, earlier: Self) -> SignedDuration {
        SignedDuration::from_millis(self.0 - earlier.0)
    }

    /// Returns the canonical text of this instant.
    ///
    /// Equivalent to `to_string()`.
    #[must_use]
    pub fn to_canonical(self) -> String {
        canonical::format(self.to_utc_datetime())
    }

    /// Creates an instant from a civil date-time read as UTC.
    pub(crate) fn from_utc_datetime(datetime: DateTime) -> Result<Self, RangeError> {
        Self::from_nanos(datetime.duration_since(UNIX_EPOCH).as_nanos()).ok_or_else(|| RangeError::new(datetime))
    }

    // Every instant lies well inside the civil range, so nothing saturates here.
    fn to_utc_datetime(self) -> DateTime {
        UNIX_EPOCH.saturating_add(SignedDuration::from_millis(self.0))
    }

    fn as_nanos(self) -> i128 {
        i128::from(self.0) * NANOS_PER_MILLI
    }

    /// Rounds nanoseconds since the Unix epoch down to the millisecond.
    fn from_nanos(nanos: i128) -> Option<Self> {
        i64::try_from(nanos.div_euclid(NANOS_PER_MILLI))
            .ok()
            .filter(|millis| (MIN_MILLIS..=MAX_MILLIS).contains(millis))
            .map(Self)
    }

    fn saturating(nanos: i128) -> Self {
        if nanos.div_euclid(NANOS_PER_MILLI) < i128::from(MIN_MILLIS) {
            return Self::MIN;
        }

        Self::from_nanos(nanos).unwrap_or(Self::MAX)
    }
}

impl Display for Instant {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&self.to_canonical())
    }
}

/// Parses canonical text with the same rules as the `DateTime` scalar applies to
/// variables.
impl FromStr for Instant {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        scalar::parse_text(s).map_err(QueryError::variable)
    }
}

impl TryFrom<Timestamp> for Instant {
    type Error = RangeError;

    fn try_from(value: Timestamp) -> Result<Self, Self::Error> {
        Self::from_nanos(value.as_nanosecond()).ok_or_else(|| RangeError::new(value))
    }
}

impl TryFrom<&Zoned> for Instant {
    type Error = RangeError;

    fn try_from(value: &Zoned) -> Result<Self, Self::Error> {
        Self::try_from(value.timestamp())
    }
}

impl TryFrom<SystemTime> for Instant {
    type Error = RangeError;

    fn try_from(value: SystemTime) -> Result<Self, Self::Error> {
        let nanos = match value.duration_since(SystemTime::UNIX_EPOCH) {
            Ok(after) => i128::try_from(after.as_nanos()),
            Err(before) => i128::try_from(before.duration().as_nanos()).map(|nanos| -nanos),
        };

        nanos
            .ok()
            .and_then(Self::from_nanos)
            .ok_or_else(|| RangeError::new(format_args!("{value:?}")))
    }
}

impl TryFrom<Instant> for Timestamp {
    type Error = RangeError;

    fn try_from(value: Instant) -> Result<Self, Self::Error> {
        Self::from_nanosecond(value.as_nanos())
            .ok()
            .ok_or_else(|| RangeError::new(value))
    }
}

impl TryFrom<Instant> for SystemTime {
    type Error = RangeError;

    fn try_from(value: Instant) -> Result<Self, Self::Error> {
        let magnitude = Duration::from_millis(value.0.unsigned_abs());
        let time = if value.0 >= 0 {
            Self::UNIX_EPOCH.checked_add(magnitude)
        } else {
            Self::UNIX_EPOCH.checked_sub(magnitude)
        };

        time.ok_or_else(|| RangeError::new(value))
    }
}

#[cfg(any(feature = "serde", test))]
impl serde_core::Serialize for Instant {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde_core::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(any(feature = "serde", test))]
impl<'de> serde_core::Deserialize<'de> for Instant {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde_core::Deserializer<'de>,
    {
        <String as serde_core::Deserialize>::deserialize(deserializer)?
            .parse::<Self>()
            .map_err(serde_core::de::Error::custom)
    }
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use jiff::civil::DateTime;
use jiff::fmt::temporal::DateTimePrinter;

/// The only textual form accepted and produced by the codec, as presented to callers.
///
/// The casing follows the convention used in user-facing error messages, where every
/// field is written in upper case. The same shape is sometimes written as
/// `YYYY-MM-DDTHH:mm:ss.sssZ`.
pub const CANONICAL_FORMAT: &str = "YYYY-MM-DDTHH:MM:SS.SSSZ";

/// The Unix epoch as a civil date-time in UTC.
pub(crate) const UNIX_EPOCH: DateTime = DateTime::constant(1970, 1, 1, 0, 0, 0, 0);

/// Formats a UTC civil date-time as canonical text.
///
/// The date-time must already be truncated to whole milliseconds and fall within
/// the four-digit year range, otherwise the output would not be canonical. This is
/// guaranteed for every [`Instant`][crate::Instant].
pub(crate) fn format(datetime: DateTime) -> String {
    let mut text = DateTimePrinter::new().precision(Some(3)).datetime_to_string(&datetime);
    text.push('Z');
    text
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Permissive date parsing.
//!
//! This is the first of the two input validation phases: it only answers whether some text
//! describes a point in time. It accepts far more than the canonical format. Strictness is
//! applied afterwards by comparing the canonical rendering of the result with the input.

use jiff::Timestamp;
use jiff::civil::{DateTime, Time};
use jiff::fmt::{rfc2822, strtime, temporal};
use jiff::tz::TimeZone;

/// Format of the host `toString` rendering, e.g. `Fri Jul 24 2015 12:56:42 GMT+0200`.
const HOST_STRING_FORMAT: &str = "%a %b %d %Y %H:%M:%S GMT%z";

/// One family of date strings understood by the permissive parser.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Strategy {
    /// RFC 3339 and ISO 8601 timestamps with `Z` or a numeric offset.
    Rfc3339,
    /// ISO 8601 dates and date-times without an offset, read as UTC.
    CivilUtc,
    /// RFC 2822 and RFC 9110, as seen in mail and HTTP headers.
    Rfc2822,
    /// The host `toString` rendering, optionally followed by a zone name in parentheses.
    HostString,
}

/// Strategies in the order they are attempted.
const STRATEGIES: [Strategy; 4] = [Strategy::Rfc3339, Strategy::CivilUtc, Strategy::Rfc2822, Strategy::HostString];

impl Strategy {
    #[cfg_attr(
        not(any(feature = "logs", test)),
        expect(dead_code, reason = "strategy names are only reported in logs")
    )]
    pub(crate) const fn name(self) -> &'static str {
        match self {
            Self::Rfc3339 => "rfc3339",
            Self::CivilUtc => "civil_utc",
            Self::Rfc2822 => "rfc2822",
            Self::HostString => "host_string",
        }
    }

    // Parsers are built per attempt, nothing is shared between calls.
    fn parse(self, text: &str) -> Option<DateTime> {
        match self {
            Self::Rfc3339 => parse_rfc3339(text),
            Self::CivilUtc => parse_civil(text),
            Self::Rfc2822 => rfc2822::DateTimeParser::new().parse_timestamp(text).ok().map(to_utc),
            Self::HostString => parse_host_string(text),
        }
    }
}

/// Derives a point in time from `text`, trying every known strategy.
///
/// The result is the civil date-time in UTC, at full parsed precision. Surrounding
/// whitespace is ignored. Returns `None` when no strategy yields a valid time.
pub(crate) fn parse(text: &str) -> Option<(DateTime, Strategy)> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    STRATEGIES
        .into_iter()
        .find_map(|strategy| strategy.parse(text).map(|datetime| (datetime, strategy)))
}

fn to_utc(timestamp: Timestamp) -> DateTime {
    TimeZone::UTC.to_datetime(timestamp)
}

/// Timestamps end on 9999-12-30 at 22:00 UTC, civil date-times run to the end of the year.
/// A `Z` suffixed date-time past that point is read as civil UTC.
fn parse_rfc3339(text: &str) -> Option<DateTime> {
    let parser = temporal::DateTimeParser::new();

    match parser.parse_timestamp(text) {
        Ok(timestamp) => Some(to_utc(timestamp)),
        Err(_) => {
            let civil = text.strip_suffix(['Z', 'z'])?;
            if !civil.contains(['T', 't', ' ']) {
                return None;
            }
            parser.parse_datetime(civil).ok()
        }
    }
}

fn parse_civil(text: &str) -> Option<DateTime> {
    let parser = temporal::DateTimeParser::new();

    match parser.parse_datetime(text) {
        Ok(datetime) => Some(datetime),
        Err(_) => Some(parser.parse_date(text).ok()?.to_datetime(Time::midnight())),
    }
}

fn parse_host_string(text: &str) -> Option<DateTime> {
    let text = strip_zone_name(text);

    strtime::parse(HOST_STRING_FORMAT, text).ok()?.to_timestamp().ok().map(to_utc)
}

/// Removes a trailing ` (Zone Name)` suffix. The name is informational only; the offset
/// before it is authoritative.
fn strip_zone_name(text: &str) -> &str {
    match text.rfind(" (") {
        Some(index) if text.ends_with(')') => text[..index].trim_end(),
        _ => text,
    }
}

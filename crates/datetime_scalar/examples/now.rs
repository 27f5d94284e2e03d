// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! This example demonstrates resolving a `DateTime` field and reading `DateTime` input.

use datetime_scalar::{DateTimeScalar, Instant, Scalar};
use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct Reminder {
    title: String,
    due: Instant,
}

fn main() -> anyhow::Result<()> {
    // Output coercion: a resolver returns the current time.
    let now = Instant::now();
    println!("now: {}", DateTimeScalar.serialize(&now)?);

    // Native date types are accepted too and truncated to milliseconds.
    println!("now (from jiff): {}", DateTimeScalar.serialize(&jiff::Timestamp::now())?);

    // Input coercion: only the canonical format is accepted.
    let someday = DateTimeScalar.parse_variable(&"2015-07-24T10:56:42.744Z".into())?;
    let next_day = someday
        .checked_add(SignedDuration::from_hours(24))
        .ok_or_else(|| anyhow::anyhow!("next day is out of range"))?;
    println!("nextDay: {next_day}");

    for text in ["2015-07-24T10:56:42Z", "Fri Jul 24 2015 12:56:42 GMT+0200 (CEST)", "invalid data"] {
        match DateTimeScalar.parse_variable(&text.into()) {
            Ok(instant) => println!("accepted {text:?} as {instant}"),
            Err(error) => println!("rejected: {error}"),
        }
    }

    // The same canonical text is used by serde.
    let reminder = Reminder {
        title: "ship it".to_string(),
        due: next_day,
    };
    let json = serde_json::to_string(&reminder)?;
    println!("{json}");

    let back: Reminder = serde_json::from_str(&json)?;
    assert_eq!(back.due, reminder.due);

    Ok(())
}

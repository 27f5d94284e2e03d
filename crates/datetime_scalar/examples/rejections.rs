// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! This example demonstrates the events emitted by the `logs` feature.
//!
//! Run with `RUST_LOG` unset; every event at `TRACE` and above is printed.

use std::time::{Duration, SystemTime};

use datetime_scalar::{DateTimeScalar, Literal, Scalar, SourceLocation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .init();

    let location = Some(SourceLocation::new(1, 17));

    // Accepted input, logged at TRACE with the parser that recognized it.
    let _ = DateTimeScalar.parse_literal(&"2015-07-24T10:56:42.744Z".into(), location);

    // Rejected input.
    let _ = DateTimeScalar.parse_literal(&"2015-07-24".into(), location);
    let _ = DateTimeScalar.parse_literal(&"invalid data".into(), location);
    let _ = DateTimeScalar.parse_literal(&Literal::Int(1_437_735_402_744), location);
    let _ = DateTimeScalar.parse_variable(&serde_json::json!("tomorrow"));

    // Rejected output.
    let _ = DateTimeScalar.serialize(&"invalid date");
    let year_20000 = SystemTime::UNIX_EPOCH + Duration::from_secs(18_000 * 365 * 24 * 60 * 60);
    let _ = DateTimeScalar.serialize(&year_20000);
}

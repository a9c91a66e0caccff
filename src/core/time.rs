//! Shared timestamp/id helpers for response envelopes.

use chrono::{SecondsFormat, Utc};
use ulid::Ulid;

/// Current UTC time as RFC 3339 with millisecond precision (e.g. `2026-10-17T08:30:00.123Z`).
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn new_request_id() -> String {
    Ulid::new().to_string()
}

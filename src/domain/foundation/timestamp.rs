//! UTC instants as stored on orders and payments.
//!
//! Postgres keeps microseconds, so instants are cut to that precision when
//! created. An order read back from the database then compares equal to the
//! one that was written, whichever repository produced it.

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        let micros = TimeDelta::microseconds(1);
        Self(dt.duration_trunc(micros).unwrap_or(dt))
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Wire form, e.g. `2026-03-01T19:04:11.120394+00:00`.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

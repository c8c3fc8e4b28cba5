//! # Temporal Types: UTC-Only Timestamps
//!
//! Backend rows carry timestamps in several renderings: the row store emits
//! `2026-02-18T14:30:00.123456+00:00`, the REST API and the sample dataset use
//! `2026-02-18T14:30:00Z`, `timestamp without time zone` columns come back
//! with no offset at all (`2026-02-20T09:00:00`), and some `cases` rows have
//! no timestamp. `Timestamp` normalizes all of them to UTC and keeps their
//! full precision, so two rows updated within the same second still order
//! correctly. Only human-facing rendering drops sub-seconds.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error parsing a timestamp string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid timestamp {input:?}: {reason}")]
pub struct TimestampError {
    /// The rejected input.
    pub input: String,
    /// Parser diagnostic.
    pub reason: String,
}

/// A UTC-only timestamp. Ordering uses full precision.
///
/// # Construction
///
/// - [`Timestamp::now()`]: current UTC time.
/// - [`Timestamp::from_utc()`]: from a `DateTime<Utc>`.
/// - [`Timestamp::parse_lenient()`]: from an RFC 3339 string, or an
///   offset-less `YYYY-MM-DDTHH:MM:SS[.f]` read as UTC.
/// - [`Timestamp::epoch()`]: the Unix epoch, used as the "unknown" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// The Unix epoch. Records with no usable timestamp sort last.
    pub fn epoch() -> Self {
        Self(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Parse an RFC 3339 string, accepting any timezone offset and converting
    /// to UTC. A date-time without an offset (either `T` or space separated)
    /// is taken to be UTC already.
    pub fn parse_lenient(s: &str) -> Result<Self, TimestampError> {
        let trimmed = s.trim();
        match DateTime::parse_from_rfc3339(trimmed) {
            Ok(dt) => Ok(Self(dt.with_timezone(&Utc))),
            Err(rfc_err) => NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|naive| Self(naive.and_utc()))
                .ok_or_else(|| TimestampError {
                    input: s.to_string(),
                    reason: rfc_err.to_string(),
                }),
        }
    }

    /// Parse the first usable timestamp among `candidates`, or `None`.
    ///
    /// Unparseable candidates are skipped, not reported: row timestamps are
    /// display data and must never fail a mapping.
    pub fn first_valid<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<Self> {
        candidates
            .into_iter()
            .flatten()
            .find_map(|s| Self::parse_lenient(s).ok())
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the Unix epoch timestamp in seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Render as RFC 3339 with Z suffix, keeping sub-seconds when present
    /// (e.g., `2026-01-15T12:00:00.250Z`). Used for values written back to a
    /// backend, where ordering must survive the round trip.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    /// Render as ISO8601 with Z suffix at seconds precision
    /// (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    /// Render the calendar date only (e.g., `2026-01-15`).
    pub fn date(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

/// Offset-less layouts accepted after RFC 3339 fails. `%.f` also matches
/// no fraction at all.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

//! Row types for the row store tables.
//!
//! Each row type requires its primary key and nothing else. Optional columns
//! use lenient decoders: a value of the wrong JSON type reads as `None`
//! instead of failing the row.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Table names.
pub mod table {
    pub const DISPUTES: &str = "disputes";
    pub const CASES: &str = "cases";
    pub const MESSAGES: &str = "messages";
    pub const AGENT_RUNS: &str = "agent_runs";
    pub const CASE_EVENTS: &str = "case_events";
    pub const APPROVALS: &str = "approvals";
}

// -- Shape A: `disputes` ------------------------------------------------------

/// Row of the `disputes` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisputeRow {
    #[serde(deserialize_with = "key")]
    pub dispute_id: String,
    #[serde(default, deserialize_with = "opt_string")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub vendor_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub policy_region: Option<String>,
    #[serde(default)]
    pub draft_payload_json: Option<Value>,
    #[serde(default, deserialize_with = "opt_string")]
    pub latest_reason: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub updated_at: Option<String>,
}

// -- Shape B: `cases` ---------------------------------------------------------

/// Row of the `cases` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRow {
    #[serde(deserialize_with = "key")]
    pub id: String,
    #[serde(default, deserialize_with = "opt_string")]
    pub vendor: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "opt_number")]
    pub estimated_value: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub compute_cost: Option<f64>,
    /// Decision metadata from the eligibility agent. Holds
    /// `eligibility.reasons` when the agent produced any.
    #[serde(default)]
    pub decision_json: Option<Value>,
    #[serde(default, deserialize_with = "opt_string")]
    pub draft_email_subject: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub draft_email_body: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub eligibility_result: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub email_subject: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub email_body: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub flight_number: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub booking_reference: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub form_data: Option<Value>,
    #[serde(default, deserialize_with = "opt_string")]
    pub from_email: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub to_email: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub incident_date: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub message_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub updated_at: Option<String>,
}

// -- Auxiliary tables ---------------------------------------------------------

/// Row of the `messages` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRow {
    #[serde(deserialize_with = "key")]
    pub message_id: String,
    #[serde(default, deserialize_with = "opt_string")]
    pub dispute_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub external_message_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub thread_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub direction: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub body_text: Option<String>,
    #[serde(default)]
    pub payload_json: Value,
    #[serde(default, deserialize_with = "opt_string")]
    pub received_at: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub created_at: Option<String>,
}

/// Row of the `agent_runs` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRunRow {
    #[serde(deserialize_with = "key")]
    pub agent_run_id: String,
    #[serde(default, deserialize_with = "opt_string")]
    pub dispute_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub agent_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub step_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub status: Option<String>,
    #[serde(default)]
    pub input_json: Value,
    #[serde(default)]
    pub output_json: Value,
    #[serde(default, deserialize_with = "opt_string")]
    pub error_text: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub created_at: Option<String>,
}

/// Row of the `case_events` table, the audit log of a `cases` record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseEventRow {
    #[serde(deserialize_with = "key")]
    pub id: String,
    #[serde(default, deserialize_with = "opt_string")]
    pub case_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub actor: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub event_type: Option<String>,
    #[serde(default)]
    pub details: Option<Value>,
    #[serde(default, deserialize_with = "opt_string")]
    pub created_at: Option<String>,
}

// -- Decoding -----------------------------------------------------------------

/// Decode raw rows one at a time, skipping (and logging) rows that do not
/// decode.
pub fn decode_rows<T: DeserializeOwned>(table: &str, raw: Vec<Value>) -> Vec<T> {
    let total = raw.len();
    let rows: Vec<T> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value(row) {
            Ok(row) => Some(row),
            Err(e) => {
                tracing::warn!(table, index, error = %e, "skipping undecodable row");
                None
            }
        })
        .collect();
    if rows.len() < total {
        tracing::debug!(table, total, decoded = rows.len(), "decoded rows with skips");
    }
    rows
}

/// Primary key: a string, or a number rendered as one.
pub(crate) fn key<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match Value::deserialize(d)? {
        Value::String(s) if !s.trim().is_empty() => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a non-empty string or number key, got {other}"
        ))),
    }
}

/// Optional string. Numbers and booleans are rendered; other types read as
/// absent.
pub(crate) fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Optional number. Numeric strings are parsed; other types read as absent.
pub(crate) fn opt_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Optional list of strings. Non-string elements are dropped; a non-list
/// reads as absent.
pub(crate) fn opt_strings<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<Vec<String>>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

/// Nested rows, decoded one at a time like a table listing.
pub(crate) fn nested_rows<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => decode_rows("nested", items),
        _ => Vec::new(),
    })
}

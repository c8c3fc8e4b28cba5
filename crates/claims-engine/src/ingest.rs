//! # Record Mapper
//!
//! Every backend record enters the system as a [`SourceRecord`] and leaves as
//! a canonical [`Dispute`]. Each variant has one total mapping function: a
//! missing or mistyped field substitutes its documented default, never an
//! error.
//!
//! | Field | `disputes` row | `cases` row | REST API |
//! |-------|----------------|-------------|----------|
//! | id | `dispute_id` | `id` | `dispute_id`, else `id` |
//! | vendor | `vendor_name` | `vendor` | `vendor_name` |
//! | draft letter | (none) | `draft_email_body` | `draft_claim` |
//! | draft payload | `draft_payload_json` | `decision_json` | `draft_payload_json` |
//! | AI reasons | (none) | `decision_json.eligibility.reasons` | `ai_reasons` |
//! | estimated value | (none) | `estimated_value`, default 0 | `estimated_value` |

use serde_json::{json, Value};

use claims_client::{AgentRunRow, ApiDispute, CaseEventRow, CaseRow, DisputeRow, MessageRow};
use claims_core::dispute::{UNKNOWN_CATEGORY, UNKNOWN_VENDOR};
use claims_core::{
    normalize, AgentRun, Dispute, DisputeContext, DisputeId, Message, RecordOrigin, Timestamp,
};

/// A backend record, tagged by the shape it arrived in.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceRecord {
    /// Shape A: a `disputes` row.
    Disputes(DisputeRow),
    /// Shape B: a `cases` row.
    Cases(CaseRow),
    /// A REST API dispute whose identifier has been checked.
    Api { id: DisputeId, record: ApiDispute },
}

impl SourceRecord {
    /// Tag a REST API dispute. `None` when it carries no identifier.
    pub fn from_api(record: ApiDispute) -> Option<Self> {
        let id = DisputeId::new(record.key()?);
        Some(Self::Api { id, record })
    }

    pub fn into_dispute(self) -> Dispute {
        match self {
            Self::Disputes(row) => map_dispute_row(row),
            Self::Cases(row) => map_case_row(row),
            Self::Api { id, record } => map_api_dispute(id, record),
        }
    }
}

// ─── Shape A ─────────────────────────────────────────────────────────

/// Map a `disputes` row. Messages and agent runs are left empty.
pub fn map_dispute_row(row: DisputeRow) -> Dispute {
    let (created_at, updated_at) = timestamps(row.created_at.as_deref(), row.updated_at.as_deref());
    let mut dispute = Dispute::new(
        row.dispute_id,
        RecordOrigin::Disputes,
        normalize(row.status.as_deref()),
        created_at,
    );
    dispute.updated_at = updated_at;
    dispute.vendor_name = non_blank(row.vendor_name).unwrap_or_else(|| UNKNOWN_VENDOR.into());
    dispute.category = non_blank(row.category).unwrap_or_else(|| UNKNOWN_CATEGORY.into());
    dispute.policy_region = non_blank(row.policy_region);
    dispute.draft_payload = row.draft_payload_json.filter(|v| !v.is_null());
    dispute.latest_reason = non_blank(row.latest_reason);
    dispute
}

// ─── Shape B ─────────────────────────────────────────────────────────

/// Map a `cases` row. Agent runs are left empty until events are attached.
pub fn map_case_row(row: CaseRow) -> Dispute {
    let (created_at, updated_at) = timestamps(row.created_at.as_deref(), row.updated_at.as_deref());
    let mut dispute = Dispute::new(
        row.id,
        RecordOrigin::Cases,
        normalize(row.status.as_deref()),
        created_at,
    );
    dispute.updated_at = updated_at;
    dispute.vendor_name = non_blank(row.vendor).unwrap_or_else(|| UNKNOWN_VENDOR.into());
    dispute.category = non_blank(row.category).unwrap_or_else(|| UNKNOWN_CATEGORY.into());
    dispute.estimated_value = Some(row.estimated_value.unwrap_or(0.0));
    dispute.compute_cost = row.compute_cost;
    dispute.ai_reasons = extract_reasons(row.decision_json.as_ref());
    dispute.draft_payload = row.decision_json.filter(|v| !v.is_null());
    dispute.draft_claim = non_blank(row.draft_email_body);
    dispute.latest_reason = non_blank(row.eligibility_result);
    dispute.context = DisputeContext {
        flight_number: non_blank(row.flight_number),
        booking_ref: non_blank(row.booking_reference),
        email_subject: non_blank(row.email_subject),
        email_body: non_blank(row.email_body),
        thread_id: non_blank(row.thread_id),
    };
    dispute
}

/// `decision.eligibility.reasons`, keeping string elements only. `None` when
/// any level is missing or the leaf is not a list.
pub fn extract_reasons(decision: Option<&Value>) -> Option<Vec<String>> {
    let reasons = decision?.get("eligibility")?.get("reasons")?.as_array()?;
    Some(
        reasons
            .iter()
            .filter_map(|r| r.as_str().map(str::to_string))
            .collect(),
    )
}

// ─── REST API ────────────────────────────────────────────────────────

/// Map a REST API dispute, including its nested messages and agent runs.
pub fn map_api_dispute(id: DisputeId, record: ApiDispute) -> Dispute {
    let (created_at, updated_at) =
        timestamps(record.created_at.as_deref(), record.updated_at.as_deref());
    let mut dispute = Dispute::new(
        id,
        RecordOrigin::Api,
        normalize(record.status.as_deref()),
        created_at,
    );
    dispute.updated_at = updated_at;
    dispute.vendor_name = non_blank(record.vendor_name).unwrap_or_else(|| UNKNOWN_VENDOR.into());
    dispute.category = non_blank(record.category).unwrap_or_else(|| UNKNOWN_CATEGORY.into());
    dispute.policy_region = non_blank(record.policy_region);
    dispute.estimated_value = record.estimated_value;
    dispute.recovered_amount = record.recovered_amount;
    dispute.fee_amount = record.fee_amount;
    dispute.compute_cost = record.compute_cost;
    dispute.draft_payload = record.draft_payload_json.filter(|v| !v.is_null());
    dispute.draft_claim = non_blank(record.draft_claim);
    dispute.ai_reasons = record.ai_reasons;
    dispute.latest_reason = non_blank(record.latest_reason);
    dispute.context = DisputeContext {
        flight_number: non_blank(record.flight_number),
        booking_ref: non_blank(record.booking_ref),
        email_subject: non_blank(record.email_subject),
        email_body: non_blank(record.email_body),
        thread_id: non_blank(record.thread_id),
    };
    dispute.messages = record.messages.into_iter().map(map_message).collect();
    dispute.agent_runs = record.agent_runs.into_iter().map(map_agent_run).collect();
    dispute
}

/// Render a dispute in the REST API's wire shape.
pub fn to_api(dispute: &Dispute) -> ApiDispute {
    let id = dispute.id.to_string();
    ApiDispute {
        dispute_id: Some(id.clone()),
        id: Some(id.clone()),
        user_id: None,
        category: Some(dispute.category.clone()),
        status: Some(dispute.status.as_str().to_string()),
        vendor_name: Some(dispute.vendor_name.clone()),
        policy_region: dispute.policy_region.clone(),
        draft_payload_json: dispute.draft_payload.clone(),
        latest_reason: dispute.latest_reason.clone(),
        created_at: Some(dispute.created_at.to_rfc3339()),
        updated_at: Some(dispute.updated_at.to_rfc3339()),
        estimated_value: dispute.estimated_value,
        recovered_amount: dispute.recovered_amount,
        fee_amount: dispute.fee_amount,
        compute_cost: dispute.compute_cost,
        flight_number: dispute.context.flight_number.clone(),
        booking_ref: dispute.context.booking_ref.clone(),
        email_subject: dispute.context.email_subject.clone(),
        email_body: dispute.context.email_body.clone(),
        thread_id: dispute.context.thread_id.clone(),
        draft_claim: dispute.draft_claim.clone(),
        ai_reasons: dispute.ai_reasons.clone(),
        messages: dispute
            .messages
            .iter()
            .map(|m| MessageRow {
                message_id: m.id.clone(),
                dispute_id: Some(id.clone()),
                user_id: None,
                source: Some(m.source.clone()),
                external_message_id: None,
                thread_id: m.thread_id.clone(),
                direction: Some(m.direction.clone()),
                subject: m.subject.clone(),
                body_text: m.body_text.clone(),
                payload_json: Value::Null,
                received_at: None,
                created_at: Some(m.created_at.to_rfc3339()),
            })
            .collect(),
        agent_runs: dispute
            .agent_runs
            .iter()
            .enumerate()
            .map(|(i, r)| AgentRunRow {
                agent_run_id: format!("{id}-run-{i}"),
                dispute_id: Some(id.clone()),
                agent_name: Some(r.name.clone()),
                step_name: Some(r.step.clone()),
                status: Some(r.status.clone()),
                input_json: Value::Null,
                output_json: r.output.clone(),
                error_text: r.error.clone(),
                created_at: r.created_at.map(|t| t.to_rfc3339()),
            })
            .collect(),
    }
}

// ─── Sub-records ─────────────────────────────────────────────────────

pub fn map_message(row: MessageRow) -> Message {
    Message {
        id: row.message_id,
        direction: non_blank(row.direction).unwrap_or_else(|| "inbound".into()),
        source: non_blank(row.source).unwrap_or_else(|| "email".into()),
        subject: row.subject,
        body_text: row.body_text,
        thread_id: non_blank(row.thread_id),
        created_at: Timestamp::first_valid([row.created_at.as_deref(), row.received_at.as_deref()])
            .unwrap_or_else(Timestamp::epoch),
    }
}

pub fn map_agent_run(row: AgentRunRow) -> AgentRun {
    AgentRun {
        name: non_blank(row.agent_name).unwrap_or_else(|| "agent".into()),
        step: non_blank(row.step_name).unwrap_or_else(|| "unknown".into()),
        status: non_blank(row.status).unwrap_or_else(|| "unknown".into()),
        output: row.output_json,
        error: non_blank(row.error_text),
        created_at: Timestamp::first_valid([row.created_at.as_deref()]),
    }
}

/// Translate a `case_events` row into an agent run so both shapes render the
/// same timeline.
pub fn event_to_agent_run(row: CaseEventRow) -> AgentRun {
    AgentRun {
        name: non_blank(row.actor).unwrap_or_else(|| "system".into()),
        step: non_blank(row.event_type).unwrap_or_else(|| "event".into()),
        status: "completed".into(),
        output: row.details.unwrap_or(Value::Null),
        error: None,
        created_at: Timestamp::first_valid([row.created_at.as_deref()]),
    }
}

/// Audit details recorded with a decision.
pub(crate) fn decision_details(decision: claims_core::Decision, note: Option<&str>) -> Value {
    json!({ "decision": decision, "note": note })
}

fn timestamps(created: Option<&str>, updated: Option<&str>) -> (Timestamp, Timestamp) {
    let created_at = Timestamp::first_valid([created]).unwrap_or_else(Timestamp::epoch);
    let updated_at = Timestamp::first_valid([updated, created]).unwrap_or_else(Timestamp::epoch);
    (created_at, updated_at)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

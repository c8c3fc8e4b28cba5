//! # Decision / Transition Engine
//!
//! Applies a human decision or a vendor reply to a dispute and persists the
//! new status to the source the dispute was read from:
//!
//! | Origin | Status write | Audit write |
//! |--------|--------------|-------------|
//! | `disputes` | PATCH `disputes.status` | decision: `approvals` row; reply: inbound `messages` row |
//! | `cases` | PATCH `cases.status` | `case_events` row |
//! | `api` | `POST /disputes/{id}/approve` | reply: `POST /webhooks/inbound-email` |
//! | `sample` | refused | refused |
//!
//! A transition the lifecycle does not allow writes nothing and returns
//! [`Outcome::Unchanged`]. A write that fails returns
//! `ClaimsError::WriteFailed`; nothing is retried.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use claims_client::{
    ApprovePayload, BackendError, DisputeTables, NewApproval, NewCaseEvent, NewMessage, RestClient,
    WebhookPayload,
};
use claims_core::{
    AgentRun, ClaimsError, Decision, Dispute, Message, RecordOrigin, Timestamp, VendorReply,
    WriteLayer,
};
use claims_state::{Lifecycle, LifecycleError};

use crate::ingest::{decision_details, SourceRecord};

/// Channel recorded with decisions when the caller does not name one.
pub const DEFAULT_CHANNEL: &str = "dashboard";

/// Source tag of simulated vendor replies.
pub const SIMULATION_SOURCE: &str = "simulation";

/// Result of a decision or reply.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The transition was persisted. Carries the updated dispute.
    Applied(Dispute),
    /// The lifecycle refused the transition. Nothing was written.
    Unchanged {
        dispute: Dispute,
        reason: LifecycleError,
    },
}

impl Outcome {
    pub fn dispute(&self) -> &Dispute {
        match self {
            Self::Applied(d) | Self::Unchanged { dispute: d, .. } => d,
        }
    }

    pub fn into_dispute(self) -> Dispute {
        match self {
            Self::Applied(d) | Self::Unchanged { dispute: d, .. } => d,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Persists lifecycle transitions.
#[derive(Clone)]
pub struct DecisionEngine {
    tables: Option<Arc<dyn DisputeTables>>,
    rest: Option<RestClient>,
    channel: String,
}

impl std::fmt::Debug for DecisionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionEngine")
            .field("tables", &self.tables.is_some())
            .field("rest", &self.rest.is_some())
            .field("channel", &self.channel)
            .finish()
    }
}

impl DecisionEngine {
    pub fn new(tables: Option<Arc<dyn DisputeTables>>, rest: Option<RestClient>) -> Self {
        Self {
            tables,
            rest,
            channel: DEFAULT_CHANNEL.to_string(),
        }
    }

    /// Channel recorded with decisions (`dashboard`, `cli`, ...).
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// Approve or reject the draft of `dispute`.
    ///
    /// Requires `AWAITING_USER_APPROVAL` and a draft. Otherwise returns
    /// [`Outcome::Unchanged`] without writing.
    pub async fn decide(
        &self,
        mut dispute: Dispute,
        decision: Decision,
        note: Option<&str>,
    ) -> Result<Outcome, ClaimsError> {
        let mut lifecycle = Lifecycle::of(&dispute);
        let target = match lifecycle.decide(decision, note) {
            Ok(target) => target,
            Err(reason) => return Ok(refused(dispute, reason)),
        };
        let at = Timestamp::now();
        let id = dispute.id.clone();

        match dispute.origin {
            RecordOrigin::Disputes => {
                let tables = self.tables()?;
                tables
                    .update_dispute_status(&id, target, at)
                    .await
                    .map_err(row_store_failed)?;
                tables
                    .insert_approval(NewApproval {
                        dispute_id: id.to_string(),
                        decision,
                        channel: Some(self.channel.clone()),
                        note: note.map(str::to_string),
                    })
                    .await
                    .map_err(row_store_failed)?;
            }
            RecordOrigin::Cases => {
                let tables = self.tables()?;
                let details = decision_details(decision, note);
                tables
                    .update_case_status(&id, target, at)
                    .await
                    .map_err(row_store_failed)?;
                tables
                    .insert_case_event(NewCaseEvent {
                        case_id: id.to_string(),
                        actor: "user".into(),
                        event_type: decision.event_type().into(),
                        details: details.clone(),
                    })
                    .await
                    .map_err(row_store_failed)?;
                dispute.agent_runs.push(AgentRun {
                    name: "user".into(),
                    step: decision.event_type().into(),
                    status: "completed".into(),
                    output: details,
                    error: None,
                    created_at: Some(at),
                });
            }
            RecordOrigin::Api => {
                let rest = self.rest()?;
                let payload = ApprovePayload {
                    decision,
                    channel: Some(self.channel.clone()),
                    note: note.map(str::to_string),
                };
                let updated = rest
                    .submit_decision(&id, &payload)
                    .await
                    .map_err(rest_failed)?;
                tracing::info!(dispute_id = %id, %decision, to = target.as_str(), "decision applied");
                let dispute = match SourceRecord::from_api(updated) {
                    Some(record) => record.into_dispute(),
                    None => {
                        lifecycle.write_to(&mut dispute);
                        dispute
                    }
                };
                return Ok(Outcome::Applied(dispute));
            }
            RecordOrigin::Sample => return Err(sample_read_only()),
        }

        lifecycle.write_to(&mut dispute);
        dispute.updated_at = at;
        if let Some(note) = note {
            dispute.latest_reason = Some(note.to_string());
        }
        tracing::info!(dispute_id = %id, %decision, to = target.as_str(), "decision applied");
        Ok(Outcome::Applied(dispute))
    }

    /// Record a vendor reply to a submitted claim.
    ///
    /// Requires `WAITING_VENDOR_RESPONSE`. Otherwise returns
    /// [`Outcome::Unchanged`] without writing.
    pub async fn vendor_reply(
        &self,
        mut dispute: Dispute,
        reply: VendorReply,
    ) -> Result<Outcome, ClaimsError> {
        let mut lifecycle = Lifecycle::of(&dispute);
        let target = match lifecycle.vendor_reply(reply) {
            Ok(target) => target,
            Err(reason) => return Ok(refused(dispute, reason)),
        };
        let at = Timestamp::now();
        let id = dispute.id.clone();
        let thread_id = dispute.thread_id();
        let subject = format!("Re: Claim {id}");
        let body_text = reply.body_text().to_string();

        match dispute.origin {
            RecordOrigin::Disputes => {
                let tables = self.tables()?;
                tables
                    .update_dispute_status(&id, target, at)
                    .await
                    .map_err(row_store_failed)?;
                let external_id = format!("sim-{}", Uuid::new_v4());
                tables
                    .insert_message(NewMessage {
                        dispute_id: id.to_string(),
                        source: SIMULATION_SOURCE.into(),
                        external_message_id: external_id.clone(),
                        thread_id: thread_id.clone(),
                        direction: "inbound".into(),
                        subject: subject.clone(),
                        body_text: body_text.clone(),
                        payload_json: json!({ "result": reply }),
                        received_at: at.to_rfc3339(),
                    })
                    .await
                    .map_err(row_store_failed)?;
                dispute.messages.push(Message {
                    id: external_id,
                    direction: "inbound".into(),
                    source: SIMULATION_SOURCE.into(),
                    subject: Some(subject),
                    body_text: Some(body_text),
                    thread_id: Some(thread_id),
                    created_at: at,
                });
            }
            RecordOrigin::Cases => {
                let tables = self.tables()?;
                let details = json!({ "result": reply, "body_text": body_text });
                tables
                    .update_case_status(&id, target, at)
                    .await
                    .map_err(row_store_failed)?;
                tables
                    .insert_case_event(NewCaseEvent {
                        case_id: id.to_string(),
                        actor: "vendor".into(),
                        event_type: "vendor_replied".into(),
                        details: details.clone(),
                    })
                    .await
                    .map_err(row_store_failed)?;
                dispute.agent_runs.push(AgentRun {
                    name: "vendor".into(),
                    step: "vendor_replied".into(),
                    status: "completed".into(),
                    output: details,
                    error: None,
                    created_at: Some(at),
                });
            }
            RecordOrigin::Api => {
                let rest = self.rest()?;
                rest.send_webhook(&WebhookPayload {
                    dispute_id: id.to_string(),
                    thread_id,
                    result: reply,
                    subject,
                    body_text,
                    source: SIMULATION_SOURCE.into(),
                })
                .await
                .map_err(rest_failed)?;
            }
            RecordOrigin::Sample => return Err(sample_read_only()),
        }

        lifecycle.write_to(&mut dispute);
        dispute.updated_at = at;
        tracing::info!(dispute_id = %id, %reply, to = target.as_str(), "vendor reply applied");
        Ok(Outcome::Applied(dispute))
    }

    fn tables(&self) -> Result<&Arc<dyn DisputeTables>, ClaimsError> {
        self.tables.as_ref().ok_or_else(|| ClaimsError::WriteFailed {
            layer: WriteLayer::RowStore,
            status: None,
            message: "row store is not configured".into(),
        })
    }

    fn rest(&self) -> Result<&RestClient, ClaimsError> {
        self.rest.as_ref().ok_or_else(|| ClaimsError::WriteFailed {
            layer: WriteLayer::RestApi,
            status: None,
            message: "REST API is not configured".into(),
        })
    }
}

fn refused(dispute: Dispute, reason: LifecycleError) -> Outcome {
    tracing::warn!(
        dispute_id = %dispute.id,
        status = dispute.status.as_str(),
        %reason,
        "transition refused"
    );
    Outcome::Unchanged { dispute, reason }
}

fn row_store_failed(e: BackendError) -> ClaimsError {
    ClaimsError::WriteFailed {
        layer: WriteLayer::RowStore,
        status: e.status(),
        message: e.message(),
    }
}

fn rest_failed(e: BackendError) -> ClaimsError {
    ClaimsError::WriteFailed {
        layer: WriteLayer::RestApi,
        status: e.status(),
        message: e.message(),
    }
}

fn sample_read_only() -> ClaimsError {
    ClaimsError::WriteFailed {
        layer: WriteLayer::Sample,
        status: None,
        message: "sample records are read-only".into(),
    }
}

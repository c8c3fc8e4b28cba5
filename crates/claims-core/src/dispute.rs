//! # Canonical Dispute Entity
//!
//! The single normalized shape consumers render, whichever backend the record
//! came from. Mapping from backend rows into this shape lives in
//! `claims-engine`; this module only defines the target.

use serde::{Deserialize, Serialize};

use crate::identity::DisputeId;
use crate::status::CanonicalStatus;
use crate::temporal::Timestamp;

/// Placeholder vendor name for records that do not carry one.
pub const UNKNOWN_VENDOR: &str = "Unknown Vendor";

/// Placeholder category for records that do not carry one.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Which source a dispute was read from. Selects the write path for
/// decisions and vendor replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOrigin {
    /// The `disputes` table of the row store (Shape A).
    Disputes,
    /// The `cases` table of the row store (Shape B).
    Cases,
    /// The secondary REST API.
    Api,
    /// The bundled sample dataset. Read-only.
    Sample,
}

impl RecordOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disputes => "disputes",
            Self::Cases => "cases",
            Self::Api => "api",
            Self::Sample => "sample",
        }
    }
}

impl std::fmt::Display for RecordOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A human decision on a drafted claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "APPROVE",
            Self::Reject => "REJECT",
        }
    }

    /// Audit event type recorded for this decision.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Approve => "user_approved",
            Self::Reject => "user_rejected",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A vendor's reply to a submitted claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorReply {
    Accepted,
    Rejected,
    NeedsInfo,
}

impl VendorReply {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::NeedsInfo => "needs_info",
        }
    }

    /// Canned reply body used when simulating the vendor.
    pub fn body_text(&self) -> &'static str {
        match self {
            Self::Accepted => {
                "Your claim has been approved. Refund will be processed within 5-7 business days."
            }
            Self::Rejected => "After review, we are unable to approve your claim at this time.",
            Self::NeedsInfo => {
                "We need additional information to process your claim. Please provide further documentation."
            }
        }
    }
}

impl std::fmt::Display for VendorReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inbound or outbound piece of correspondence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    /// `inbound` or `outbound`.
    pub direction: String,
    /// Channel the message travelled over (`email`, `simulation`, ...).
    pub source: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body_text: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
    pub created_at: Timestamp,
}

/// One step of pipeline activity, as rendered on the agent timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRun {
    /// Agent (or actor) that performed the step.
    pub name: String,
    /// Step name (`email_scan`, `draft_generation`, `user_approved`, ...).
    pub step: String,
    pub status: String,
    #[serde(default)]
    pub output: serde_json::Value,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

/// Original-context fields surfaced next to the draft.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisputeContext {
    #[serde(default)]
    pub flight_number: Option<String>,
    #[serde(default)]
    pub booking_ref: Option<String>,
    #[serde(default)]
    pub email_subject: Option<String>,
    #[serde(default)]
    pub email_body: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
}

/// The canonical dispute.
///
/// `id` is always populated and `status` is always canonical. Monetary
/// fields are `None` when unknown: `recovered_amount` and `fee_amount` stay
/// `None` until resolution so "not yet resolved" is distinguishable from
/// "resolved with zero".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dispute {
    pub id: DisputeId,
    pub origin: RecordOrigin,
    pub status: CanonicalStatus,
    pub vendor_name: String,
    pub category: String,
    #[serde(default)]
    pub policy_region: Option<String>,
    #[serde(default)]
    pub estimated_value: Option<f64>,
    #[serde(default)]
    pub recovered_amount: Option<f64>,
    #[serde(default)]
    pub fee_amount: Option<f64>,
    #[serde(default)]
    pub compute_cost: Option<f64>,
    #[serde(default)]
    pub draft_payload: Option<serde_json::Value>,
    #[serde(default)]
    pub draft_claim: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_reasons: Option<Vec<String>>,
    #[serde(default)]
    pub latest_reason: Option<String>,
    #[serde(default)]
    pub context: DisputeContext,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub agent_runs: Vec<AgentRun>,
}

impl Dispute {
    /// A dispute with every optional field empty, placeholder vendor and
    /// category, and both timestamps at `at`.
    pub fn new(
        id: impl Into<DisputeId>,
        origin: RecordOrigin,
        status: CanonicalStatus,
        at: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            origin,
            status,
            vendor_name: UNKNOWN_VENDOR.to_string(),
            category: UNKNOWN_CATEGORY.to_string(),
            policy_region: None,
            estimated_value: None,
            recovered_amount: None,
            fee_amount: None,
            compute_cost: None,
            draft_payload: None,
            draft_claim: None,
            ai_reasons: None,
            latest_reason: None,
            context: DisputeContext::default(),
            created_at: at,
            updated_at: at,
            messages: Vec::new(),
            agent_runs: Vec::new(),
        }
    }

    /// Whether a draft exists for the human to review: either the letter
    /// text or the machine-generated claim parameters.
    pub fn has_draft(&self) -> bool {
        self.draft_claim.as_deref().is_some_and(|d| !d.trim().is_empty())
            || self.draft_payload.as_ref().is_some_and(|p| !p.is_null())
    }

    /// Whether the human-in-the-loop approval action applies right now.
    pub fn awaits_decision(&self) -> bool {
        self.status == CanonicalStatus::AwaitingUserApproval && self.has_draft()
    }

    /// Thread identifier used for vendor correspondence.
    pub fn thread_id(&self) -> String {
        self.context
            .thread_id
            .clone()
            .unwrap_or_else(|| format!("thread-{}", self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at() -> Timestamp {
        Timestamp::parse_lenient("2026-02-18T14:30:00Z").unwrap()
    }

    #[test]
    fn new_uses_placeholders() {
        let d = Dispute::new("disp-1", RecordOrigin::Disputes, CanonicalStatus::ScannedMatch, at());
        assert_eq!(d.vendor_name, UNKNOWN_VENDOR);
        assert_eq!(d.category, UNKNOWN_CATEGORY);
        assert!(d.recovered_amount.is_none());
        assert!(d.messages.is_empty());
        assert_eq!(d.created_at, d.updated_at);
    }

    #[test]
    fn has_draft_accepts_letter_or_payload() {
        let mut d = Dispute::new("d", RecordOrigin::Cases, CanonicalStatus::AwaitingUserApproval, at());
        assert!(!d.has_draft());
        d.draft_claim = Some("   ".into());
        assert!(!d.has_draft());
        d.draft_claim = Some("Dear Ryanair".into());
        assert!(d.has_draft());
        d.draft_claim = None;
        d.draft_payload = Some(serde_json::json!({"flight": "FR4821"}));
        assert!(d.has_draft());
        assert!(d.awaits_decision());
    }

    #[test]
    fn thread_id_defaults_from_id() {
        let mut d = Dispute::new("disp-7", RecordOrigin::Api, CanonicalStatus::WaitingVendorResponse, at());
        assert_eq!(d.thread_id(), "thread-disp-7");
        d.context.thread_id = Some("t-99".into());
        assert_eq!(d.thread_id(), "t-99");
    }

    #[test]
    fn wire_names() {
        assert_eq!(serde_json::to_string(&Decision::Approve).unwrap(), "\"APPROVE\"");
        assert_eq!(serde_json::to_string(&VendorReply::NeedsInfo).unwrap(), "\"needs_info\"");
        assert_eq!(serde_json::to_string(&RecordOrigin::Cases).unwrap(), "\"cases\"");
        assert_eq!(Decision::Reject.event_type(), "user_rejected");
    }

    #[test]
    fn ai_reasons_omitted_when_absent() {
        let d = Dispute::new("d", RecordOrigin::Cases, CanonicalStatus::ScannedMatch, at());
        let json = serde_json::to_value(&d).unwrap();
        assert!(json.get("ai_reasons").is_none());
        let back: Dispute = serde_json::from_value(json).unwrap();
        assert_eq!(back, d);
    }
}

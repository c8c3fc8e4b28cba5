//! # Dispute Lifecycle
//!
//! The transition table is [`transition`], a pure function of the current
//! status and an event. [`Lifecycle`] wraps it with the guards the decision
//! path needs (terminal statuses, draft presence) and keeps an ordered log of
//! applied transitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use claims_core::{CanonicalStatus, Decision, Dispute, DisputeId, Timestamp, VendorReply};

// ─── Events ──────────────────────────────────────────────────────────

/// Something that moves a dispute through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "value", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// The drafting pipeline produced a claim draft.
    DraftGenerated,
    /// A human approved or rejected the draft.
    Decision(Decision),
    /// The vendor answered the submitted claim.
    VendorReply(VendorReply),
    /// The pipeline hit an irrecoverable error.
    ProcessingFailed,
}

impl std::fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DraftGenerated => f.write_str("draft_generated"),
            Self::Decision(d) => write!(f, "decision:{d}"),
            Self::VendorReply(r) => write!(f, "vendor_reply:{r}"),
            Self::ProcessingFailed => f.write_str("processing_failed"),
        }
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Why a lifecycle event was not applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// The dispute is in a terminal status.
    #[error("dispute {dispute_id} is {status}, which is terminal")]
    Terminal {
        dispute_id: DisputeId,
        status: CanonicalStatus,
    },

    /// The event is not accepted from the current status.
    #[error("{event} is not accepted while dispute is {from}")]
    InvalidTransition {
        from: CanonicalStatus,
        event: LifecycleEvent,
    },

    /// A decision was attempted on a dispute with no draft.
    #[error("dispute {dispute_id} has no draft to decide on")]
    MissingDraft { dispute_id: DisputeId },
}

/// Target status for `event` applied in `from`, or `None` when the table has
/// no such edge. Terminal statuses have no outgoing edges.
pub fn transition(from: CanonicalStatus, event: LifecycleEvent) -> Option<CanonicalStatus> {
    use CanonicalStatus as S;

    if from.is_terminal() {
        return None;
    }

    match (from, event) {
        (_, LifecycleEvent::ProcessingFailed) => Some(S::Failed),
        (S::ScannedMatch, LifecycleEvent::DraftGenerated) => Some(S::AwaitingUserApproval),
        (S::AwaitingUserApproval, LifecycleEvent::Decision(Decision::Approve)) => {
            Some(S::WaitingVendorResponse)
        }
        (S::AwaitingUserApproval, LifecycleEvent::Decision(Decision::Reject)) => {
            Some(S::DiscardedByUser)
        }
        (S::WaitingVendorResponse, LifecycleEvent::VendorReply(VendorReply::Accepted)) => {
            Some(S::ResolvedSuccess)
        }
        (S::WaitingVendorResponse, LifecycleEvent::VendorReply(VendorReply::Rejected)) => {
            Some(S::ResolvedRejected)
        }
        (S::WaitingVendorResponse, LifecycleEvent::VendorReply(VendorReply::NeedsInfo)) => {
            Some(S::AwaitingUserApproval)
        }
        _ => None,
    }
}

// ─── Transition log ──────────────────────────────────────────────────

/// Record of an applied transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: CanonicalStatus,
    pub to: CanonicalStatus,
    pub event: LifecycleEvent,
    /// Free-text note attached by the actor (e.g. a rejection reason).
    pub note: Option<String>,
    pub timestamp: Timestamp,
}

// ─── Lifecycle ───────────────────────────────────────────────────────

/// Lifecycle view of one dispute.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    dispute_id: DisputeId,
    state: CanonicalStatus,
    has_draft: bool,
    transitions: Vec<TransitionRecord>,
}

impl Lifecycle {
    /// Start from the current status of `dispute`.
    pub fn of(dispute: &Dispute) -> Self {
        Self {
            dispute_id: dispute.id.clone(),
            state: dispute.status,
            has_draft: dispute.has_draft(),
            transitions: Vec::new(),
        }
    }

    pub fn state(&self) -> CanonicalStatus {
        self.state
    }

    /// Transitions applied through this value, oldest first.
    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    /// SCANNED_MATCH → AWAITING_USER_APPROVAL.
    pub fn draft_generated(&mut self) -> Result<CanonicalStatus, LifecycleError> {
        let to = self.apply(LifecycleEvent::DraftGenerated, None)?;
        self.has_draft = true;
        Ok(to)
    }

    /// Human decision on the draft. Requires AWAITING_USER_APPROVAL and a draft.
    pub fn decide(
        &mut self,
        decision: Decision,
        note: Option<&str>,
    ) -> Result<CanonicalStatus, LifecycleError> {
        self.require_live()?;
        if self.state == CanonicalStatus::AwaitingUserApproval && !self.has_draft {
            return Err(LifecycleError::MissingDraft {
                dispute_id: self.dispute_id.clone(),
            });
        }
        self.apply(LifecycleEvent::Decision(decision), note)
    }

    /// Vendor answer. Requires WAITING_VENDOR_RESPONSE.
    pub fn vendor_reply(&mut self, reply: VendorReply) -> Result<CanonicalStatus, LifecycleError> {
        self.apply(LifecycleEvent::VendorReply(reply), None)
    }

    /// Irrecoverable processing error, from any non-terminal status.
    pub fn fail(&mut self, reason: &str) -> Result<CanonicalStatus, LifecycleError> {
        self.apply(LifecycleEvent::ProcessingFailed, Some(reason))
    }

    /// Apply the updated status to `dispute`, stamping `updated_at`.
    pub fn write_to(&self, dispute: &mut Dispute) {
        if dispute.status != self.state {
            dispute.status = self.state;
            dispute.updated_at = self
                .transitions
                .last()
                .map(|t| t.timestamp)
                .unwrap_or_else(Timestamp::now);
        }
    }

    fn require_live(&self) -> Result<(), LifecycleError> {
        if self.state.is_terminal() {
            return Err(LifecycleError::Terminal {
                dispute_id: self.dispute_id.clone(),
                status: self.state,
            });
        }
        Ok(())
    }

    fn apply(
        &mut self,
        event: LifecycleEvent,
        note: Option<&str>,
    ) -> Result<CanonicalStatus, LifecycleError> {
        self.require_live()?;
        let to = transition(self.state, event).ok_or(LifecycleError::InvalidTransition {
            from: self.state,
            event,
        })?;
        self.transitions.push(TransitionRecord {
            from: self.state,
            to,
            event,
            note: note.map(str::to_string),
            timestamp: Timestamp::now(),
        });
        self.state = to;
        Ok(to)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

//! # Agent Timeline Projection
//!
//! Projects a canonical status onto the five-step pipeline timeline:
//!
//! ```text
//! Email Scanned ─▶ Draft Generated ─▶ Awaiting Approval ─▶ Submitted to Vendor ─▶ Resolved
//! ```
//!
//! Terminal failure statuses replace the step where the pipeline stopped with
//! a failed step carrying its own label.

use serde::{Deserialize, Serialize};

use crate::status::CanonicalStatus;

const STEP_LABELS: [&str; 5] = [
    "Email Scanned",
    "Draft Generated",
    "Awaiting Approval",
    "Submitted to Vendor",
    "Resolved",
];

/// Render state of one timeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Pending,
    Active,
    Completed,
    Failed,
}

/// One step of the timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineStep {
    pub label: String,
    pub state: StepState,
}

/// Build the timeline for `status`.
pub fn timeline(status: CanonicalStatus) -> Vec<TimelineStep> {
    use StepState::{Active, Completed, Failed, Pending};

    let (states, failed_label): ([StepState; 5], Option<(usize, &str)>) = match status {
        CanonicalStatus::ScannedMatch => ([Completed, Active, Pending, Pending, Pending], None),
        CanonicalStatus::AwaitingUserApproval => {
            ([Completed, Completed, Active, Pending, Pending], None)
        }
        CanonicalStatus::WaitingVendorResponse => {
            ([Completed, Completed, Completed, Active, Pending], None)
        }
        CanonicalStatus::ResolvedSuccess => ([Completed; 5], None),
        CanonicalStatus::ResolvedRejected => (
            [Completed, Completed, Completed, Completed, Failed],
            Some((4, "Rejected by Vendor")),
        ),
        CanonicalStatus::DiscardedByUser => (
            [Completed, Completed, Failed, Pending, Pending],
            Some((2, "Discarded by User")),
        ),
        CanonicalStatus::Failed => (
            [Completed, Failed, Pending, Pending, Pending],
            Some((1, "Processing Failed")),
        ),
    };

    STEP_LABELS
        .iter()
        .zip(states)
        .enumerate()
        .map(|(i, (label, state))| TimelineStep {
            label: match failed_label {
                Some((idx, replacement)) if idx == i => replacement.to_string(),
                _ => (*label).to_string(),
            },
            state,
        })
        .collect()
}

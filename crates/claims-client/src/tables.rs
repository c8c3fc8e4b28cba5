//! The row store seen as a set of tables.
//!
//! `DisputeTables` is the seam between the reconciliation logic and the
//! storage backend: [`PostgrestTables`](crate::PostgrestTables) talks HTTP,
//! [`MemoryTables`](crate::MemoryTables) keeps rows in process.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use claims_core::{CanonicalStatus, Decision, DisputeId, Timestamp};

use crate::error::BackendError;
use crate::rows::{AgentRunRow, CaseEventRow, CaseRow, DisputeRow, MessageRow};

/// Insert into `messages`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMessage {
    pub dispute_id: String,
    pub source: String,
    pub external_message_id: String,
    pub thread_id: String,
    pub direction: String,
    pub subject: String,
    pub body_text: String,
    pub payload_json: Value,
    pub received_at: String,
}

/// Insert into `case_events`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCaseEvent {
    pub case_id: String,
    pub actor: String,
    pub event_type: String,
    pub details: Value,
}

/// Insert into `approvals`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewApproval {
    pub dispute_id: String,
    pub decision: Decision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Row-oriented access to the dispute tables.
///
/// Listings of auxiliary tables are ordered by `created_at` ascending;
/// listings of `disputes` and `cases` are ordered by `updated_at` descending
/// where the backend supports it, though callers re-sort.
#[async_trait]
pub trait DisputeTables: Send + Sync {
    async fn list_disputes(&self) -> Result<Vec<DisputeRow>, BackendError>;

    async fn list_cases(&self) -> Result<Vec<CaseRow>, BackendError>;

    async fn find_dispute(&self, id: &DisputeId) -> Result<Option<DisputeRow>, BackendError>;

    async fn find_case(&self, id: &DisputeId) -> Result<Option<CaseRow>, BackendError>;

    async fn messages_for(&self, id: &DisputeId) -> Result<Vec<MessageRow>, BackendError>;

    async fn agent_runs_for(&self, id: &DisputeId) -> Result<Vec<AgentRunRow>, BackendError>;

    async fn case_events_for(&self, id: &DisputeId) -> Result<Vec<CaseEventRow>, BackendError>;

    /// Set `status` and `updated_at` on a `disputes` row. Fails when no row
    /// matched.
    async fn update_dispute_status(
        &self,
        id: &DisputeId,
        status: CanonicalStatus,
        at: Timestamp,
    ) -> Result<(), BackendError>;

    /// Set `status` and `updated_at` on a `cases` row. Fails when no row
    /// matched.
    async fn update_case_status(
        &self,
        id: &DisputeId,
        status: CanonicalStatus,
        at: Timestamp,
    ) -> Result<(), BackendError>;

    async fn insert_message(&self, message: NewMessage) -> Result<(), BackendError>;

    async fn insert_case_event(&self, event: NewCaseEvent) -> Result<(), BackendError>;

    async fn insert_approval(&self, approval: NewApproval) -> Result<(), BackendError>;
}

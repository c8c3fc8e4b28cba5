//! In-process implementation of [`DisputeTables`].
//!
//! Rows live behind a `parking_lot::RwLock`; no lock is held across an await
//! point. Individual tables can be marked unavailable to exercise partial
//! outages.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use uuid::Uuid;

use claims_core::{CanonicalStatus, DisputeId, Timestamp};

use crate::error::BackendError;
use crate::rows::{table, AgentRunRow, CaseEventRow, CaseRow, DisputeRow, MessageRow};
use crate::tables::{DisputeTables, NewApproval, NewCaseEvent, NewMessage};

#[derive(Debug, Default)]
struct Inner {
    disputes: Vec<DisputeRow>,
    cases: Vec<CaseRow>,
    messages: Vec<MessageRow>,
    agent_runs: Vec<AgentRunRow>,
    case_events: Vec<CaseEventRow>,
    approvals: Vec<NewApproval>,
    unavailable: HashSet<&'static str>,
}

/// In-memory row store. Cloning shares the underlying tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryTables {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_disputes(self, rows: impl IntoIterator<Item = DisputeRow>) -> Self {
        self.inner.write().disputes.extend(rows);
        self
    }

    pub fn with_cases(self, rows: impl IntoIterator<Item = CaseRow>) -> Self {
        self.inner.write().cases.extend(rows);
        self
    }

    pub fn with_messages(self, rows: impl IntoIterator<Item = MessageRow>) -> Self {
        self.inner.write().messages.extend(rows);
        self
    }

    pub fn with_agent_runs(self, rows: impl IntoIterator<Item = AgentRunRow>) -> Self {
        self.inner.write().agent_runs.extend(rows);
        self
    }

    pub fn with_case_events(self, rows: impl IntoIterator<Item = CaseEventRow>) -> Self {
        self.inner.write().case_events.extend(rows);
        self
    }

    /// Make every call touching `table` fail with [`BackendError::Unavailable`].
    pub fn set_unavailable(&self, table: &'static str, unavailable: bool) {
        let mut inner = self.inner.write();
        if unavailable {
            inner.unavailable.insert(table);
        } else {
            inner.unavailable.remove(table);
        }
    }

    pub fn dispute_row(&self, id: &str) -> Option<DisputeRow> {
        self.inner
            .read()
            .disputes
            .iter()
            .find(|r| r.dispute_id == id)
            .cloned()
    }

    pub fn case_row(&self, id: &str) -> Option<CaseRow> {
        self.inner.read().cases.iter().find(|r| r.id == id).cloned()
    }

    pub fn messages(&self) -> Vec<MessageRow> {
        self.inner.read().messages.clone()
    }

    pub fn case_events(&self) -> Vec<CaseEventRow> {
        self.inner.read().case_events.clone()
    }

    pub fn approvals(&self) -> Vec<NewApproval> {
        self.inner.read().approvals.clone()
    }

    fn check(&self, table: &'static str) -> Result<(), BackendError> {
        if self.inner.read().unavailable.contains(table) {
            return Err(BackendError::Unavailable {
                table: table.to_string(),
            });
        }
        Ok(())
    }
}

fn no_match(table: &str, id: &DisputeId) -> BackendError {
    BackendError::Api {
        endpoint: format!("PATCH /{table}"),
        status: 404,
        message: format!("no {table} row with id {id}"),
    }
}

fn ascending<T>(mut rows: Vec<T>, created_at: impl Fn(&T) -> Option<Timestamp>) -> Vec<T> {
    rows.sort_by_key(|r| created_at(r).unwrap_or_else(Timestamp::epoch));
    rows
}

fn parse(ts: Option<&String>) -> Option<Timestamp> {
    ts.and_then(|s| Timestamp::parse_lenient(s).ok())
}

#[async_trait]
impl DisputeTables for MemoryTables {
    async fn list_disputes(&self) -> Result<Vec<DisputeRow>, BackendError> {
        self.check(table::DISPUTES)?;
        Ok(self.inner.read().disputes.clone())
    }

    async fn list_cases(&self) -> Result<Vec<CaseRow>, BackendError> {
        self.check(table::CASES)?;
        Ok(self.inner.read().cases.clone())
    }

    async fn find_dispute(&self, id: &DisputeId) -> Result<Option<DisputeRow>, BackendError> {
        self.check(table::DISPUTES)?;
        Ok(self.dispute_row(id.as_str()))
    }

    async fn find_case(&self, id: &DisputeId) -> Result<Option<CaseRow>, BackendError> {
        self.check(table::CASES)?;
        Ok(self.case_row(id.as_str()))
    }

    async fn messages_for(&self, id: &DisputeId) -> Result<Vec<MessageRow>, BackendError> {
        self.check(table::MESSAGES)?;
        let rows = self
            .inner
            .read()
            .messages
            .iter()
            .filter(|m| m.dispute_id.as_deref() == Some(id.as_str()))
            .cloned()
            .collect();
        Ok(ascending(rows, |m: &MessageRow| parse(m.created_at.as_ref())))
    }

    async fn agent_runs_for(&self, id: &DisputeId) -> Result<Vec<AgentRunRow>, BackendError> {
        self.check(table::AGENT_RUNS)?;
        let rows = self
            .inner
            .read()
            .agent_runs
            .iter()
            .filter(|r| r.dispute_id.as_deref() == Some(id.as_str()))
            .cloned()
            .collect();
        Ok(ascending(rows, |r: &AgentRunRow| parse(r.created_at.as_ref())))
    }

    async fn case_events_for(&self, id: &DisputeId) -> Result<Vec<CaseEventRow>, BackendError> {
        self.check(table::CASE_EVENTS)?;
        let rows = self
            .inner
            .read()
            .case_events
            .iter()
            .filter(|e| e.case_id.as_deref() == Some(id.as_str()))
            .cloned()
            .collect();
        Ok(ascending(rows, |e: &CaseEventRow| parse(e.created_at.as_ref())))
    }

    async fn update_dispute_status(
        &self,
        id: &DisputeId,
        status: CanonicalStatus,
        at: Timestamp,
    ) -> Result<(), BackendError> {
        self.check(table::DISPUTES)?;
        let mut inner = self.inner.write();
        let row = inner
            .disputes
            .iter_mut()
            .find(|r| r.dispute_id == id.as_str())
            .ok_or_else(|| no_match(table::DISPUTES, id))?;
        row.status = Some(status.as_str().to_string());
        row.updated_at = Some(at.to_rfc3339());
        Ok(())
    }

    async fn update_case_status(
        &self,
        id: &DisputeId,
        status: CanonicalStatus,
        at: Timestamp,
    ) -> Result<(), BackendError> {
        self.check(table::CASES)?;
        let mut inner = self.inner.write();
        let row = inner
            .cases
            .iter_mut()
            .find(|r| r.id == id.as_str())
            .ok_or_else(|| no_match(table::CASES, id))?;
        row.status = Some(status.as_str().to_string());
        row.updated_at = Some(at.to_rfc3339());
        Ok(())
    }

    async fn insert_message(&self, message: NewMessage) -> Result<(), BackendError> {
        self.check(table::MESSAGES)?;
        let row = MessageRow {
            message_id: Uuid::new_v4().to_string(),
            dispute_id: Some(message.dispute_id),
            user_id: None,
            source: Some(message.source),
            external_message_id: Some(message.external_message_id),
            thread_id: Some(message.thread_id),
            direction: Some(message.direction),
            subject: Some(message.subject),
            body_text: Some(message.body_text),
            payload_json: message.payload_json,
            received_at: Some(message.received_at.clone()),
            created_at: Some(message.received_at),
        };
        self.inner.write().messages.push(row);
        Ok(())
    }

    async fn insert_case_event(&self, event: NewCaseEvent) -> Result<(), BackendError> {
        self.check(table::CASE_EVENTS)?;
        let row = CaseEventRow {
            id: Uuid::new_v4().to_string(),
            case_id: Some(event.case_id),
            actor: Some(event.actor),
            event_type: Some(event.event_type),
            details: match event.details {
                Value::Null => None,
                details => Some(details),
            },
            created_at: Some(Timestamp::now().to_rfc3339()),
        };
        self.inner.write().case_events.push(row);
        Ok(())
    }

    async fn insert_approval(&self, approval: NewApproval) -> Result<(), BackendError> {
        self.check(table::APPROVALS)?;
        self.inner.write().approvals.push(approval);
        Ok(())
    }
}

//! # Source Reconciler
//!
//! Reads both row store tables, maps each through its mapper, and merges the
//! results. A `disputes` record shadows a `cases` record with the same id.
//! Listings are sorted by `updated_at`, newest first.

use std::collections::HashSet;
use std::sync::Arc;

use claims_client::DisputeTables;
use claims_core::{ClaimsError, Dispute, DisputeId};

use crate::ingest::{event_to_agent_run, map_agent_run, map_case_row, map_dispute_row, map_message};

/// Reconciles the `disputes` and `cases` tables into one listing.
#[derive(Clone)]
pub struct Reconciler {
    tables: Arc<dyn DisputeTables>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler").finish_non_exhaustive()
    }
}

impl Reconciler {
    pub fn new(tables: Arc<dyn DisputeTables>) -> Self {
        Self { tables }
    }

    /// All disputes from both tables, newest first.
    ///
    /// One table failing is tolerated; both failing is `SourceUnavailable`.
    pub async fn list_disputes(&self) -> Result<Vec<Dispute>, ClaimsError> {
        let (primary, secondary) =
            tokio::join!(self.tables.list_disputes(), self.tables.list_cases());

        let mut failures = Vec::new();
        let primary: Vec<Dispute> = match primary {
            Ok(rows) => rows.into_iter().map(map_dispute_row).collect(),
            Err(e) => {
                tracing::warn!(source = "disputes", error = %e, "table read failed");
                failures.push(format!("disputes: {e}"));
                Vec::new()
            }
        };
        let secondary: Vec<Dispute> = match secondary {
            Ok(rows) => rows.into_iter().map(map_case_row).collect(),
            Err(e) => {
                tracing::warn!(source = "cases", error = %e, "table read failed");
                failures.push(format!("cases: {e}"));
                Vec::new()
            }
        };

        if failures.len() == 2 {
            return Err(ClaimsError::SourceUnavailable { failures });
        }

        let merged = merge(primary, secondary);
        tracing::debug!(count = merged.len(), "reconciled row store listing");
        Ok(merged)
    }

    /// One dispute with its sub-records attached.
    ///
    /// `NotFound` only when both tables answered without it; if either table
    /// failed the result is `SourceUnavailable`.
    pub async fn get_dispute(&self, id: &DisputeId) -> Result<Dispute, ClaimsError> {
        let mut failures = Vec::new();

        match self.tables.find_dispute(id).await {
            Ok(Some(row)) => {
                let mut dispute = map_dispute_row(row);
                let (messages, runs) =
                    tokio::join!(self.tables.messages_for(id), self.tables.agent_runs_for(id));
                match messages {
                    Ok(rows) => dispute.messages = rows.into_iter().map(map_message).collect(),
                    Err(e) => tracing::warn!(dispute_id = %id, error = %e, "messages unavailable"),
                }
                match runs {
                    Ok(rows) => dispute.agent_runs = rows.into_iter().map(map_agent_run).collect(),
                    Err(e) => tracing::warn!(dispute_id = %id, error = %e, "agent runs unavailable"),
                }
                return Ok(dispute);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(source = "disputes", dispute_id = %id, error = %e, "lookup failed");
                failures.push(format!("disputes: {e}"));
            }
        }

        match self.tables.find_case(id).await {
            Ok(Some(row)) => {
                let mut dispute = map_case_row(row);
                match self.tables.case_events_for(id).await {
                    Ok(events) => {
                        dispute.agent_runs = events.into_iter().map(event_to_agent_run).collect()
                    }
                    Err(e) => tracing::warn!(dispute_id = %id, error = %e, "case events unavailable"),
                }
                return Ok(dispute);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(source = "cases", dispute_id = %id, error = %e, "lookup failed");
                failures.push(format!("cases: {e}"));
            }
        }

        if failures.is_empty() {
            Err(ClaimsError::NotFound(id.clone()))
        } else {
            Err(ClaimsError::SourceUnavailable { failures })
        }
    }
}

/// All of `primary`, then each `secondary` record whose id is not already
/// present, sorted by `updated_at` descending. The sort is stable.
pub fn merge(primary: Vec<Dispute>, secondary: Vec<Dispute>) -> Vec<Dispute> {
    let mut seen: HashSet<DisputeId> = HashSet::new();
    let mut merged: Vec<Dispute> = primary
        .into_iter()
        .chain(secondary)
        .filter(|d| seen.insert(d.id.clone()))
        .collect();
    merged.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    merged
}

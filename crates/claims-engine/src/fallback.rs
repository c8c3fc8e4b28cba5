//! # Fallback Orchestrator
//!
//! An ordered list of read providers. Reads try each in turn and return the
//! first success; failures are collected and surfaced only when every
//! provider has failed.
//!
//! A `NotFound` from an authoritative provider is remembered: if nothing
//! later finds the dispute, the caller sees `NotFound`. If no authoritative
//! provider answered at all, the caller sees `SourceUnavailable`. The sample
//! dataset is not authoritative, so it can never turn an outage into a
//! `NotFound`.

use std::sync::Arc;

use async_trait::async_trait;

use claims_client::RestClient;
use claims_core::{ClaimsError, Dispute, DisputeId};

use crate::ingest::SourceRecord;
use crate::reconciler::Reconciler;
use crate::sample;

/// A source disputes can be read from.
#[async_trait]
pub trait ReadProvider: Send + Sync {
    /// Short name used in logs and failure reports.
    fn name(&self) -> &'static str;

    /// Whether this provider's `NotFound` means the dispute does not exist.
    fn authoritative(&self) -> bool {
        true
    }

    async fn list(&self) -> Result<Vec<Dispute>, ClaimsError>;

    async fn get(&self, id: &DisputeId) -> Result<Dispute, ClaimsError>;
}

#[async_trait]
impl ReadProvider for Reconciler {
    fn name(&self) -> &'static str {
        "row store"
    }

    async fn list(&self) -> Result<Vec<Dispute>, ClaimsError> {
        self.list_disputes().await
    }

    async fn get(&self, id: &DisputeId) -> Result<Dispute, ClaimsError> {
        self.get_dispute(id).await
    }
}

/// Reads from the secondary REST API.
#[derive(Debug, Clone)]
pub struct RestProvider {
    client: RestClient,
}

impl RestProvider {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

fn unavailable(source: &str, e: impl std::fmt::Display) -> ClaimsError {
    ClaimsError::SourceUnavailable {
        failures: vec![format!("{source}: {e}")],
    }
}

#[async_trait]
impl ReadProvider for RestProvider {
    fn name(&self) -> &'static str {
        "REST API"
    }

    async fn list(&self) -> Result<Vec<Dispute>, ClaimsError> {
        let records = self
            .client
            .list_disputes()
            .await
            .map_err(|e| unavailable(self.name(), e))?;
        let mut disputes: Vec<Dispute> = records
            .into_iter()
            .filter_map(SourceRecord::from_api)
            .map(SourceRecord::into_dispute)
            .collect();
        disputes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(disputes)
    }

    async fn get(&self, id: &DisputeId) -> Result<Dispute, ClaimsError> {
        match self.client.get_dispute(id).await {
            Ok(Some(record)) => SourceRecord::from_api(record)
                .map(SourceRecord::into_dispute)
                .ok_or_else(|| ClaimsError::NotFound(id.clone())),
            Ok(None) => Err(ClaimsError::NotFound(id.clone())),
            Err(e) => Err(unavailable(self.name(), e)),
        }
    }
}

/// Serves the bundled sample dataset.
#[derive(Debug, Clone, Default)]
pub struct SampleProvider;

#[async_trait]
impl ReadProvider for SampleProvider {
    fn name(&self) -> &'static str {
        "sample dataset"
    }

    fn authoritative(&self) -> bool {
        false
    }

    async fn list(&self) -> Result<Vec<Dispute>, ClaimsError> {
        Ok(sample::disputes())
    }

    async fn get(&self, id: &DisputeId) -> Result<Dispute, ClaimsError> {
        sample::disputes()
            .into_iter()
            .find(|d| &d.id == id)
            .ok_or_else(|| ClaimsError::NotFound(id.clone()))
    }
}

/// Ordered provider chain.
#[derive(Clone, Default)]
pub struct FallbackChain {
    providers: Vec<Arc<dyn ReadProvider>>,
}

impl std::fmt::Debug for FallbackChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.providers.iter().map(|p| p.name()))
            .finish()
    }
}

impl FallbackChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider. Providers are tried in insertion order.
    pub fn with(mut self, provider: Arc<dyn ReadProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// List from the first provider that answers.
    pub async fn list_disputes(&self) -> Result<Vec<Dispute>, ClaimsError> {
        let mut failures = Vec::new();
        for provider in &self.providers {
            match provider.list().await {
                Ok(disputes) => {
                    tracing::debug!(source = provider.name(), count = disputes.len(), "listed disputes");
                    return Ok(disputes);
                }
                Err(e) => {
                    tracing::warn!(source = provider.name(), error = %e, "source failed, trying next");
                    failures.extend(failure_lines(provider.name(), e));
                }
            }
        }
        if self.providers.is_empty() {
            failures.push("no dispute source configured".to_string());
        }
        Err(ClaimsError::SourceUnavailable { failures })
    }

    /// Get from the first provider that has the dispute.
    pub async fn get_dispute(&self, id: &DisputeId) -> Result<Dispute, ClaimsError> {
        let mut failures = Vec::new();
        let mut absent = false;
        for provider in &self.providers {
            match provider.get(id).await {
                Ok(dispute) => {
                    tracing::debug!(source = provider.name(), dispute_id = %id, "found dispute");
                    return Ok(dispute);
                }
                Err(ClaimsError::NotFound(_)) => {
                    tracing::debug!(source = provider.name(), dispute_id = %id, "dispute not found");
                    absent |= provider.authoritative();
                }
                Err(e) => {
                    tracing::warn!(source = provider.name(), dispute_id = %id, error = %e, "source failed, trying next");
                    failures.extend(failure_lines(provider.name(), e));
                }
            }
        }
        if absent {
            return Err(ClaimsError::NotFound(id.clone()));
        }
        if self.providers.is_empty() {
            failures.push("no dispute source configured".to_string());
        }
        Err(ClaimsError::SourceUnavailable { failures })
    }
}

/// Flatten a provider failure into report lines, keeping nested diagnostics.
fn failure_lines(source: &str, e: ClaimsError) -> Vec<String> {
    match e {
        ClaimsError::SourceUnavailable { failures } if !failures.is_empty() => failures,
        other => vec![format!("{source}: {other}")],
    }
}

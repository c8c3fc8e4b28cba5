//! # Claims Service
//!
//! The operations a front end consumes: list, get, decide, simulate a vendor
//! reply, scan, and the portfolio summary. Reads go through the
//! [`FallbackChain`]; decisions re-read the dispute and hand it to the
//! [`DecisionEngine`], which writes back to the record's origin.

use std::sync::Arc;

use claims_client::{BackendConfig, BackendError, Backends, RestClient, ScanResponse};
use claims_core::{
    ClaimsError, Decision, Dispute, DisputeId, PortfolioSummary, VendorReply, WriteLayer,
};

use crate::decision::{DecisionEngine, Outcome};
use crate::fallback::{FallbackChain, ReadProvider, RestProvider, SampleProvider};
use crate::reconciler::Reconciler;

/// Facade over the read chain and the decision engine.
#[derive(Debug, Clone)]
pub struct ClaimsService {
    chain: FallbackChain,
    engine: DecisionEngine,
    rest: Option<RestClient>,
}

impl ClaimsService {
    /// Assemble a service from explicit parts.
    pub fn new(chain: FallbackChain, engine: DecisionEngine, rest: Option<RestClient>) -> Self {
        Self {
            chain,
            engine,
            rest,
        }
    }

    /// Chain order: row store, REST API, then the sample dataset when
    /// `sample_fallback` is set.
    pub fn from_backends(backends: Backends, sample_fallback: bool) -> Self {
        let mut chain = FallbackChain::new();
        if let Some(tables) = &backends.tables {
            chain = chain.with(Arc::new(Reconciler::new(tables.clone())) as Arc<dyn ReadProvider>);
        }
        if let Some(rest) = &backends.rest {
            chain = chain.with(Arc::new(RestProvider::new(rest.clone())));
        }
        if sample_fallback {
            chain = chain.with(Arc::new(SampleProvider));
        }
        tracing::debug!(providers = ?chain.provider_names(), "read chain assembled");

        let engine = DecisionEngine::new(backends.tables, backends.rest.clone());
        Self::new(chain, engine, backends.rest)
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, BackendError> {
        let backends = Backends::new(config)?;
        Ok(Self::from_backends(backends, config.sample_fallback))
    }

    /// Record decisions under `channel` instead of the default.
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.engine = self.engine.with_channel(channel);
        self
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.chain.provider_names()
    }

    /// All disputes, newest first.
    pub async fn list_disputes(&self) -> Result<Vec<Dispute>, ClaimsError> {
        self.chain.list_disputes().await
    }

    pub async fn get_dispute(&self, id: &DisputeId) -> Result<Dispute, ClaimsError> {
        self.chain.get_dispute(id).await
    }

    /// Approve or reject the draft of dispute `id`.
    pub async fn decide(
        &self,
        id: &DisputeId,
        decision: Decision,
        note: Option<&str>,
    ) -> Result<Outcome, ClaimsError> {
        let dispute = self.chain.get_dispute(id).await?;
        self.engine.decide(dispute, decision, note).await
    }

    /// Apply a simulated vendor reply to dispute `id`.
    pub async fn simulate_vendor_reply(
        &self,
        id: &DisputeId,
        reply: VendorReply,
    ) -> Result<Outcome, ClaimsError> {
        let dispute = self.chain.get_dispute(id).await?;
        self.engine.vendor_reply(dispute, reply).await
    }

    /// Ask the REST API to scan for new disputes.
    pub async fn scan(&self) -> Result<ScanResponse, ClaimsError> {
        let rest = self.rest.as_ref().ok_or_else(|| ClaimsError::SourceUnavailable {
            failures: vec!["REST API: not configured".into()],
        })?;
        match rest.scan().await {
            Ok(response) => {
                tracing::info!(
                    status = %response.status,
                    disputes_found = ?response.disputes_found,
                    "scan triggered"
                );
                Ok(response)
            }
            Err(e @ BackendError::Api { .. }) => Err(ClaimsError::WriteFailed {
                layer: WriteLayer::RestApi,
                status: e.status(),
                message: e.message(),
            }),
            Err(e) => Err(ClaimsError::SourceUnavailable {
                failures: vec![format!("REST API: {e}")],
            }),
        }
    }

    /// Summary figures over the current listing.
    pub async fn summary(&self) -> Result<PortfolioSummary, ClaimsError> {
        let disputes = self.list_disputes().await?;
        Ok(PortfolioSummary::from_disputes(&disputes))
    }
}

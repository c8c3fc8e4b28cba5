//! # Economics Projection
//!
//! Cost/value view of a single dispute: what the pipeline spent on compute,
//! what it recovered, the resulting margin, and the success fee.
//!
//! Compute cost comes from the `billing_stub` agent run when the pipeline
//! recorded one, else from the record's own `compute_cost` column.

use serde::{Deserialize, Serialize};

use crate::dispute::Dispute;
use crate::status::CanonicalStatus;

/// Agent step that records billing figures in its output.
pub const BILLING_STEP: &str = "billing_stub";

/// Success fee charged on recovered value.
pub const FEE_RATE: f64 = 0.25;

/// Economics of one dispute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Economics {
    pub compute_cost_usd: f64,
    pub value_generated_usd: f64,
    /// Percentage of value left after compute cost, one decimal place.
    pub margin_pct: f64,
    pub fee_usd: f64,
}

impl Economics {
    /// Project the economics of `dispute`, or `None` when no cost data exists.
    pub fn for_dispute(dispute: &Dispute) -> Option<Self> {
        let billing = dispute
            .agent_runs
            .iter()
            .rev()
            .find(|run| run.step == BILLING_STEP)
            .map(|run| &run.output);

        let compute_cost = billing
            .and_then(|out| out.get("compute_cost_usd"))
            .and_then(serde_json::Value::as_f64)
            .or(dispute.compute_cost)?;

        let value = dispute.recovered_amount.unwrap_or_else(|| {
            if dispute.status == CanonicalStatus::ResolvedSuccess {
                dispute.estimated_value.unwrap_or(0.0)
            } else {
                0.0
            }
        });

        Some(Self::from_figures(compute_cost, value))
    }

    /// Derive margin and fee from raw cost and value.
    pub fn from_figures(compute_cost_usd: f64, value_generated_usd: f64) -> Self {
        let margin_pct = if value_generated_usd > 0.0 {
            let raw = (value_generated_usd - compute_cost_usd) / value_generated_usd * 100.0;
            (raw * 10.0).round() / 10.0
        } else {
            0.0
        };
        Self {
            compute_cost_usd,
            value_generated_usd,
            margin_pct,
            fee_usd: value_generated_usd * FEE_RATE,
        }
    }
}

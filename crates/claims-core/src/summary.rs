//! Portfolio-level figures shown above the dispute list.

use serde::{Deserialize, Serialize};

use crate::dispute::Dispute;
use crate::status::CanonicalStatus;

/// Aggregate figures over a set of disputes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Sum of estimated value over successfully resolved disputes.
    pub capital_recovered: f64,
    /// Disputes still in flight.
    pub active_count: usize,
    /// Rounded percentage of disputes resolved successfully.
    pub success_rate_pct: u32,
    pub total: usize,
}

impl PortfolioSummary {
    pub fn from_disputes(disputes: &[Dispute]) -> Self {
        let resolved: Vec<&Dispute> = disputes
            .iter()
            .filter(|d| d.status == CanonicalStatus::ResolvedSuccess)
            .collect();

        let capital_recovered = resolved
            .iter()
            .map(|d| d.recovered_amount.or(d.estimated_value).unwrap_or(0.0))
            .sum();

        let success_rate_pct = if disputes.is_empty() {
            0
        } else {
            ((resolved.len() as f64 / disputes.len() as f64) * 100.0).round() as u32
        };

        Self {
            capital_recovered,
            active_count: disputes.iter().filter(|d| d.status.is_active()).count(),
            success_rate_pct,
            total: disputes.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispute::RecordOrigin;
    use crate::temporal::Timestamp;

    fn d(id: &str, status: CanonicalStatus, value: f64) -> Dispute {
        let mut d = Dispute::new(id, RecordOrigin::Sample, status, Timestamp::epoch());
        d.estimated_value = Some(value);
        d
    }

    #[test]
    fn empty_portfolio() {
        let s = PortfolioSummary::from_disputes(&[]);
        assert_eq!(s.total, 0);
        assert_eq!(s.success_rate_pct, 0);
        assert_eq!(s.capital_recovered, 0.0);
    }

    #[test]
    fn mixed_portfolio() {
        let disputes = vec![
            d("1", CanonicalStatus::AwaitingUserApproval, 250.0),
            d("2", CanonicalStatus::WaitingVendorResponse, 85.0),
            d("3", CanonicalStatus::ResolvedSuccess, 30.0),
            d("4", CanonicalStatus::ResolvedRejected, 180.0),
            d("5", CanonicalStatus::DiscardedByUser, 120.0),
            d("6", CanonicalStatus::Failed, 400.0),
        ];
        let s = PortfolioSummary::from_disputes(&disputes);
        assert_eq!(s.capital_recovered, 30.0);
        assert_eq!(s.active_count, 2);
        assert_eq!(s.success_rate_pct, 17);
        assert_eq!(s.total, 6);
    }
}

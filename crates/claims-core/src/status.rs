//! # Canonical Dispute Status and Status Normalizer
//!
//! Defines the closed seven-value `CanonicalStatus` enumeration and the
//! normalizer that maps arbitrary backend status strings onto it.
//!
//! ## Normalization rules
//!
//! 1. Absent or blank input → `SCANNED_MATCH`.
//! 2. Case-insensitive match on a canonical name → that status.
//! 3. Lookup in the synonym table (lowercase, underscore-separated aliases).
//! 4. Anything else → `SCANNED_MATCH`. The normalizer never fails.
//!
//! Because every canonical name maps to itself under rule 2, normalization is
//! idempotent: `normalize(normalize(x).as_str()) == normalize(x)`.
//!
//! ## Synonym table
//!
//! The alias table is append-only data. New backend vocabularies are added as
//! new entries (and a version bump), never as new branches in the lookup code.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle status of a dispute, after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CanonicalStatus {
    /// Detected by the upstream scan; no draft yet. Initial state.
    ScannedMatch,
    /// A draft exists and is waiting for a human decision.
    AwaitingUserApproval,
    /// Approved and submitted; waiting on the vendor.
    WaitingVendorResponse,
    /// Vendor accepted the claim (terminal).
    ResolvedSuccess,
    /// Vendor rejected the claim (terminal).
    ResolvedRejected,
    /// The user rejected the draft (terminal).
    DiscardedByUser,
    /// Irrecoverable processing error (terminal).
    Failed,
}

/// Number of canonical statuses.
pub const CANONICAL_STATUS_COUNT: usize = 7;

impl CanonicalStatus {
    /// All canonical statuses, in lifecycle order.
    pub fn all() -> &'static [CanonicalStatus] {
        &[
            Self::ScannedMatch,
            Self::AwaitingUserApproval,
            Self::WaitingVendorResponse,
            Self::ResolvedSuccess,
            Self::ResolvedRejected,
            Self::DiscardedByUser,
            Self::Failed,
        ]
    }

    /// The canonical wire name (e.g. `AWAITING_USER_APPROVAL`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ScannedMatch => "SCANNED_MATCH",
            Self::AwaitingUserApproval => "AWAITING_USER_APPROVAL",
            Self::WaitingVendorResponse => "WAITING_VENDOR_RESPONSE",
            Self::ResolvedSuccess => "RESOLVED_SUCCESS",
            Self::ResolvedRejected => "RESOLVED_REJECTED",
            Self::DiscardedByUser => "DISCARDED_BY_USER",
            Self::Failed => "FAILED",
        }
    }

    /// Short human label used by badges and listings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ScannedMatch => "Scanned",
            Self::AwaitingUserApproval => "Needs Approval",
            Self::WaitingVendorResponse => "Pending Vendor",
            Self::ResolvedSuccess => "Resolved",
            Self::ResolvedRejected => "Rejected",
            Self::DiscardedByUser => "Discarded",
            Self::Failed => "Failed",
        }
    }

    /// Whether no further decision transition is accepted from this status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::ResolvedSuccess | Self::ResolvedRejected | Self::DiscardedByUser | Self::Failed
        )
    }

    /// Whether the dispute still counts as in flight.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::ScannedMatch | Self::AwaitingUserApproval | Self::WaitingVendorResponse
        )
    }
}

impl std::fmt::Display for CanonicalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanonicalStatus {
    type Err = std::convert::Infallible;

    /// Lenient parse: equivalent to [`normalize`]. Never fails.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(normalize(Some(s)))
    }
}

// ─── Synonym table ───────────────────────────────────────────────────

/// Version of the built-in synonym table. Bump when appending entries.
pub const SYNONYM_TABLE_VERSION: u32 = 2;

/// Built-in aliases, keyed by normalized (lowercase, underscore) spelling.
///
/// Append-only. Entries are grouped by the table version that added them.
const BUILTIN_SYNONYMS: &[(&str, CanonicalStatus)] = &[
    // v1: vocabulary of the `cases` table and the early REST API.
    ("scanned", CanonicalStatus::ScannedMatch),
    ("awaiting_approval", CanonicalStatus::AwaitingUserApproval),
    ("waiting_vendor", CanonicalStatus::WaitingVendorResponse),
    ("resolved", CanonicalStatus::ResolvedSuccess),
    ("rejected", CanonicalStatus::ResolvedRejected),
    ("discarded", CanonicalStatus::DiscardedByUser),
    ("failed", CanonicalStatus::Failed),
    // v2: pipeline worker vocabulary.
    ("new", CanonicalStatus::ScannedMatch),
    ("detected", CanonicalStatus::ScannedMatch),
    ("draft_ready", CanonicalStatus::AwaitingUserApproval),
    ("needs_approval", CanonicalStatus::AwaitingUserApproval),
    ("submitted", CanonicalStatus::WaitingVendorResponse),
    ("pending_vendor", CanonicalStatus::WaitingVendorResponse),
    ("resolved_accepted", CanonicalStatus::ResolvedSuccess),
    ("vendor_rejected", CanonicalStatus::ResolvedRejected),
    ("user_rejected", CanonicalStatus::DiscardedByUser),
    ("error", CanonicalStatus::Failed),
];

/// Lowercase, trim, and fold `-` and spaces to `_`.
fn fold(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

/// Status normalizer backed by a synonym table.
///
/// The default normalizer uses the built-in table. Deployments that talk to a
/// backend with extra vocabulary extend it with [`StatusNormalizer::with_alias`]
/// rather than patching the lookup.
#[derive(Debug, Clone)]
pub struct StatusNormalizer {
    aliases: Vec<(String, CanonicalStatus)>,
}

impl Default for StatusNormalizer {
    fn default() -> Self {
        Self {
            aliases: BUILTIN_SYNONYMS
                .iter()
                .map(|(alias, status)| ((*alias).to_string(), *status))
                .collect(),
        }
    }
}

impl StatusNormalizer {
    /// Append an alias. The alias is folded the same way inputs are.
    ///
    /// Earlier entries win on conflict, so built-in meanings cannot be
    /// silently redefined.
    pub fn with_alias(mut self, alias: &str, status: CanonicalStatus) -> Self {
        self.aliases.push((fold(alias), status));
        self
    }

    /// Number of aliases known to this normalizer.
    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    /// Map a raw backend status onto the canonical enumeration.
    pub fn normalize(&self, raw: Option<&str>) -> CanonicalStatus {
        resolve(
            raw,
            self.aliases.iter().map(|(alias, status)| (alias.as_str(), *status)),
        )
    }
}

/// Normalize with the built-in synonym table.
pub fn normalize(raw: Option<&str>) -> CanonicalStatus {
    resolve(raw, BUILTIN_SYNONYMS.iter().copied())
}

fn resolve<'a>(
    raw: Option<&str>,
    aliases: impl IntoIterator<Item = (&'a str, CanonicalStatus)>,
) -> CanonicalStatus {
    let folded = match raw.map(fold) {
        Some(s) if !s.is_empty() => s,
        _ => return CanonicalStatus::ScannedMatch,
    };

    if let Some(status) = CanonicalStatus::all()
        .iter()
        .find(|s| s.as_str().eq_ignore_ascii_case(&folded))
    {
        return *status;
    }

    aliases
        .into_iter()
        .find(|(alias, _)| *alias == folded)
        .map(|(_, status)| status)
        .unwrap_or(CanonicalStatus::ScannedMatch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_all_count() {
        assert_eq!(CanonicalStatus::all().len(), CANONICAL_STATUS_COUNT);
    }

    #[test]
    fn test_null_and_blank_default_to_scanned() {
        assert_eq!(normalize(None), CanonicalStatus::ScannedMatch);
        assert_eq!(normalize(Some("")), CanonicalStatus::ScannedMatch);
        assert_eq!(normalize(Some("   ")), CanonicalStatus::ScannedMatch);
    }

    #[test]
    fn test_canonical_names_any_case() {
        for status in CanonicalStatus::all() {
            assert_eq!(normalize(Some(status.as_str())), *status);
            assert_eq!(normalize(Some(&status.as_str().to_lowercase())), *status);
        }
        assert_eq!(
            normalize(Some("Waiting_Vendor_Response")),
            CanonicalStatus::WaitingVendorResponse
        );
    }

    #[test]
    fn test_waiting_vendor_alias() {
        assert_eq!(
            normalize(Some("waiting_vendor")),
            CanonicalStatus::WaitingVendorResponse
        );
    }

    #[test]
    fn test_unknown_defaults_to_scanned() {
        assert_eq!(normalize(Some("bogus_value")), CanonicalStatus::ScannedMatch);
    }

    #[test]
    fn test_aliases_fold_case_and_separators() {
        assert_eq!(
            normalize(Some("Awaiting-Approval")),
            CanonicalStatus::AwaitingUserApproval
        );
        assert_eq!(normalize(Some(" DISCARDED ")), CanonicalStatus::DiscardedByUser);
        assert_eq!(normalize(Some("resolved")), CanonicalStatus::ResolvedSuccess);
        assert_eq!(normalize(Some("rejected")), CanonicalStatus::ResolvedRejected);
    }

    #[test]
    fn test_builtin_aliases_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for (alias, _) in BUILTIN_SYNONYMS {
            assert!(seen.insert(*alias), "duplicate alias {alias}");
            assert_eq!(fold(alias), *alias, "alias {alias} is not in folded form");
        }
    }

    #[test]
    fn test_normalizer_matches_free_function() {
        let normalizer = StatusNormalizer::default();
        for (alias, status) in BUILTIN_SYNONYMS {
            assert_eq!(normalizer.normalize(Some(*alias)), *status);
            assert_eq!(normalize(Some(*alias)), *status);
        }
    }

    #[test]
    fn test_with_alias_extends_without_overriding() {
        let normalizer = StatusNormalizer::default()
            .with_alias("Escalated", CanonicalStatus::Failed)
            .with_alias("resolved", CanonicalStatus::Failed);
        assert_eq!(normalizer.normalize(Some("escalated")), CanonicalStatus::Failed);
        assert_eq!(
            normalizer.normalize(Some("resolved")),
            CanonicalStatus::ResolvedSuccess
        );
        assert_eq!(normalizer.alias_count(), BUILTIN_SYNONYMS.len() + 2);
    }

    #[test]
    fn test_terminal_and_active_partition() {
        for status in CanonicalStatus::all() {
            assert_ne!(status.is_terminal(), status.is_active(), "{status}");
        }
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        for status in CanonicalStatus::all() {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_from_str_is_lenient() {
        let parsed: CanonicalStatus = "waiting_vendor".parse().unwrap();
        assert_eq!(parsed, CanonicalStatus::WaitingVendorResponse);
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(raw in ".{0,40}") {
            let once = normalize(Some(&raw));
            let twice = normalize(Some(once.as_str()));
            prop_assert_eq!(once, twice);
            prop_assert!(CanonicalStatus::all().contains(&once));
        }

        #[test]
        fn prop_aliases_idempotent_under_case(idx in 0usize..BUILTIN_SYNONYMS.len(), upper in any::<bool>()) {
            let (alias, expected) = BUILTIN_SYNONYMS[idx];
            let input = if upper { alias.to_uppercase() } else { alias.to_string() };
            let once = normalize(Some(&input));
            prop_assert_eq!(once, expected);
            prop_assert_eq!(normalize(Some(once.as_str())), once);
        }
    }
}

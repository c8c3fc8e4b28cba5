//! # Dispute Identifier
//!
//! The two backend tables key their rows differently (`dispute_id` on the
//! `disputes` table, `id` on the `cases` table, arbitrary strings on the REST
//! API). All of them map onto this one newtype at the ingestion boundary, so
//! nothing downstream has to know which key name a record used.

use serde::{Deserialize, Serialize};

/// Canonical identifier of a dispute.
///
/// Opaque string: UUIDs from the row store, `disp-001` style keys from the
/// sample dataset, whatever the REST API hands out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisputeId(String);

impl DisputeId {
    /// Wrap a raw identifier.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the raw identifier.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for DisputeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DisputeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for DisputeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

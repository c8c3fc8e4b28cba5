//! # Error Types
//!
//! The caller-facing error taxonomy of the claims stack. Callers must be able
//! to tell "the dispute does not exist" apart from "no source could be
//! reached", and must see exactly which layer rejected a write.
//!
//! There is no malformed-record variant: mapping defects degrade
//! to documented defaults instead of failing a listing.

use thiserror::Error;

use crate::identity::DisputeId;

/// Layer that rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteLayer {
    /// The row store (`disputes`, `cases` and their auxiliary tables).
    RowStore,
    /// The secondary REST API.
    RestApi,
    /// The bundled sample dataset, which is read-only.
    Sample,
}

impl std::fmt::Display for WriteLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::RowStore => "row store",
            Self::RestApi => "REST API",
            Self::Sample => "sample dataset",
        })
    }
}

/// Top-level error type for claims operations.
#[derive(Error, Debug)]
pub enum ClaimsError {
    /// Every backing read failed. Recoverable by a user-initiated retry.
    #[error("no dispute source available: {}", .failures.join("; "))]
    SourceUnavailable {
        /// One diagnostic per source that was tried, in order.
        failures: Vec<String>,
    },

    /// The dispute is absent from every source that answered.
    #[error("dispute {0} not found")]
    NotFound(DisputeId),

    /// A decision or transition write did not persist.
    #[error("write to {layer} failed{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    WriteFailed {
        layer: WriteLayer,
        /// HTTP status reported by the failing layer, when there was one.
        status: Option<u16>,
        message: String,
    },
}

impl ClaimsError {
    /// Whether the caller should offer a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. } | Self::WriteFailed { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

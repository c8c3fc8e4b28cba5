//! # claims-core: Foundational Types for the Claims Stack
//!
//! Every other crate in the workspace depends on `claims-core`; it depends on
//! nothing internal. It defines the canonical vocabulary the rest of the
//! stack speaks, regardless of which backend a record was read from.
//!
//! ## Key Design Principles
//!
//! 1. **One canonical status.** `CanonicalStatus` is a closed seven-variant
//!    enum. Raw backend strings only enter the system through
//!    [`status::normalize`], which is total and idempotent.
//!
//! 2. **One canonical entity.** [`Dispute`] is the single shape consumers
//!    render. The `origin` tag records which source produced it so writes can
//!    be routed back to the same source.
//!
//! 3. **UTC-only timestamps.** `Timestamp` normalizes every backend timestamp
//!    to UTC at full precision. Listing order is defined on it.
//!
//! 4. **Projections are pure.** Timeline steps, economics, and portfolio
//!    summaries are computed from a dispute, never stored.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `claims-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod dispute;
pub mod economics;
pub mod error;
pub mod identity;
pub mod status;
pub mod summary;
pub mod temporal;
pub mod timeline;

// Re-export primary types for ergonomic imports.
pub use dispute::{
    AgentRun, Decision, Dispute, DisputeContext, Message, RecordOrigin, VendorReply,
};
pub use economics::Economics;
pub use error::{ClaimsError, WriteLayer};
pub use identity::DisputeId;
pub use status::{normalize, CanonicalStatus, StatusNormalizer, SYNONYM_TABLE_VERSION};
pub use summary::PortfolioSummary;
pub use temporal::Timestamp;
pub use timeline::{timeline, StepState, TimelineStep};

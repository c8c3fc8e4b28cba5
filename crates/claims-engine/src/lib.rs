//! # claims-engine: Dispute Reconciliation and Transitions
//!
//! ```text
//! ClaimsService
//!   ├── FallbackChain ── Reconciler (row store: disputes + cases)
//!   │                 ├─ RestProvider (secondary REST API)
//!   │                 └─ SampleProvider (bundled dataset, opt-in)
//!   └── DecisionEngine ── Lifecycle (claims-state) → write by record origin
//! ```
//!
//! Reads degrade along the chain; writes never do. A decision is routed back
//! to the source its record was read from, and a failed write surfaces as
//! `ClaimsError::WriteFailed` naming the layer that refused it.

pub mod decision;
pub mod fallback;
pub mod ingest;
pub mod reconciler;
pub mod sample;
pub mod service;

pub use decision::{DecisionEngine, Outcome};
pub use fallback::{FallbackChain, ReadProvider, RestProvider, SampleProvider};
pub use ingest::SourceRecord;
pub use reconciler::Reconciler;
pub use service::ClaimsService;

//! # claims-state: Dispute Lifecycle State Machine
//!
//! ```text
//! SCANNED_MATCH ──draft generated──▶ AWAITING_USER_APPROVAL
//!                                        │            │
//!                                     approve       reject
//!                                        ▼            ▼
//!                          WAITING_VENDOR_RESPONSE   DISCARDED_BY_USER
//!                           │        │        │
//!                      accepted  rejected  needs_info ──▶ AWAITING_USER_APPROVAL
//!                           ▼        ▼
//!               RESOLVED_SUCCESS  RESOLVED_REJECTED
//!
//! any non-terminal state ──processing error──▶ FAILED
//! ```
//!
//! Statuses arrive from backends as strings and are normalized into
//! `CanonicalStatus` before they reach this crate, so the machine is an enum
//! with validated transitions rather than typestate: the current state is
//! only known at runtime.

pub mod lifecycle;

pub use lifecycle::{transition, Lifecycle, LifecycleError, LifecycleEvent, TransitionRecord};

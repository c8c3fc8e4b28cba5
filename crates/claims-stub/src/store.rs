//! In-memory dispute store.
//!
//! One `DashMap` keyed by dispute id, plus a scan counter that drives the
//! deterministic vendor rotation of `POST /scan`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use claims_core::{Dispute, DisputeId, RecordOrigin};
use claims_engine::sample;

struct Inner {
    disputes: DashMap<DisputeId, Dispute>,
    scans: AtomicUsize,
}

/// Shared state. Clones share the same store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                disputes: DashMap::new(),
                scans: AtomicUsize::new(0),
            }),
        }
    }

    /// A store holding the sample disputes, tagged as REST API records.
    pub fn seeded() -> Self {
        let state = Self::new();
        for dispute in sample::disputes_with_origin(RecordOrigin::Api) {
            state.insert(dispute);
        }
        state
    }

    pub fn disputes(&self) -> &DashMap<DisputeId, Dispute> {
        &self.inner.disputes
    }

    pub fn insert(&self, dispute: Dispute) {
        self.inner.disputes.insert(dispute.id.clone(), dispute);
    }

    /// Every dispute, newest first.
    pub fn list(&self) -> Vec<Dispute> {
        let mut all: Vec<Dispute> = self
            .inner
            .disputes
            .iter()
            .map(|e| e.value().clone())
            .collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        all
    }

    /// Zero-based index of the next scan.
    pub fn next_scan(&self) -> usize {
        self.inner.scans.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

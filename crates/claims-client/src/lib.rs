//! # claims-client: Typed clients for the claims backends
//!
//! Two backends hold dispute data:
//!
//! - **Row store**: a PostgREST-dialect table API exposed by the
//!   backend-as-a-service. Reached through the [`DisputeTables`] trait, with
//!   [`PostgrestTables`] as the HTTP implementation and [`MemoryTables`] as
//!   the in-process one.
//! - **Secondary REST API**: `scan`, dispute reads, decisions and the inbound
//!   vendor webhook, via [`RestClient`].
//!
//! ## Failure policy
//!
//! Every call is issued exactly once. Non-2xx responses become
//! [`BackendError::Api`] carrying the status and the server's message; the
//! caller decides whether to retry.
//!
//! ## Row decoding
//!
//! Tables are read as raw JSON rows and decoded one at a time. A row that
//! lacks its primary key is skipped with a warning; every other field decodes
//! leniently (wrong-typed values read as absent) so a single bad column never
//! fails a listing.

pub mod config;
pub mod error;
pub mod memory;
pub mod postgrest;
pub mod rest;
pub mod rows;
pub mod tables;

pub use config::{BackendConfig, ConfigError};
pub use error::BackendError;
pub use memory::MemoryTables;
pub use postgrest::PostgrestTables;
pub use rest::{ApiDispute, ApprovePayload, RestClient, ScanResponse, WebhookAck, WebhookPayload};
pub use rows::{AgentRunRow, CaseEventRow, CaseRow, DisputeRow, MessageRow};
pub use tables::{DisputeTables, NewApproval, NewCaseEvent, NewMessage};

use std::sync::Arc;
use std::time::Duration;

/// The configured backends. Either may be absent.
#[derive(Clone)]
pub struct Backends {
    pub tables: Option<Arc<dyn DisputeTables>>,
    pub rest: Option<RestClient>,
}

impl std::fmt::Debug for Backends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backends")
            .field("tables", &self.tables.as_ref().map(|_| "DisputeTables"))
            .field("rest", &self.rest)
            .finish()
    }
}

impl Backends {
    /// Build HTTP clients for every backend the configuration names.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        let tables = config.store_url.clone().map(|url| {
            Arc::new(PostgrestTables::new(http.clone(), url, config.store_key.clone()))
                as Arc<dyn DisputeTables>
        });
        let rest = config
            .api_url
            .clone()
            .map(|url| RestClient::new(http.clone(), url));

        Ok(Self { tables, rest })
    }
}

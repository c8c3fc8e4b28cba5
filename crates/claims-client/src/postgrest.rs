//! Row store client speaking the PostgREST dialect.
//!
//! ## Paths
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/rest/v1/{table}?select=*&order=...` | List rows |
//! | GET    | `/rest/v1/{table}?{key}=eq.{id}&limit=1` | Exact-match lookup |
//! | PATCH  | `/rest/v1/{table}?{key}=eq.{id}` | Update, `Prefer: return=representation` |
//! | POST   | `/rest/v1/{table}` | Insert |
//!
//! Every request carries the store key both as `apikey` and as a bearer token.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde_json::{json, Value};
use zeroize::Zeroizing;

use claims_core::{CanonicalStatus, DisputeId, Timestamp};

use crate::error::BackendError;
use crate::rows::{decode_rows, table, AgentRunRow, CaseEventRow, CaseRow, DisputeRow, MessageRow};
use crate::tables::{DisputeTables, NewApproval, NewCaseEvent, NewMessage};

const API_PREFIX: &str = "rest/v1";

/// HTTP implementation of [`DisputeTables`].
#[derive(Clone)]
pub struct PostgrestTables {
    http: reqwest::Client,
    base_url: url::Url,
    key: Zeroizing<String>,
}

impl std::fmt::Debug for PostgrestTables {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgrestTables")
            .field("base_url", &self.base_url)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl PostgrestTables {
    pub fn new(http: reqwest::Client, base_url: url::Url, key: Zeroizing<String>) -> Self {
        Self {
            http,
            base_url,
            key,
        }
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let url = format!("{}{}/{table}", self.base_url, API_PREFIX);
        self.http
            .request(method, url)
            .header("apikey", self.key.as_str())
            .bearer_auth(self.key.as_str())
    }

    /// Send and decode a JSON array of rows.
    async fn fetch(&self, endpoint: String, req: RequestBuilder) -> Result<Vec<Value>, BackendError> {
        let resp = req.send().await.map_err(|e| BackendError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        if !resp.status().is_success() {
            return Err(api_error(endpoint, resp).await);
        }

        resp.json().await.map_err(|e| BackendError::Deserialization {
            endpoint,
            source: e,
        })
    }

    async fn select<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, BackendError> {
        let endpoint = format!("GET /{table}");
        let req = self
            .request(Method::GET, table)
            .query(&[("select", "*")])
            .query(query);
        let raw = self.fetch(endpoint, req).await?;
        tracing::debug!(table, rows = raw.len(), "selected rows");
        Ok(decode_rows(table, raw))
    }

    async fn find<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        key: &str,
        id: &DisputeId,
    ) -> Result<Option<T>, BackendError> {
        let rows = self
            .select(
                table,
                &[(key, format!("eq.{id}")), ("limit", "1".to_string())],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn patch_status(
        &self,
        table: &str,
        key: &str,
        id: &DisputeId,
        status: CanonicalStatus,
        at: Timestamp,
    ) -> Result<(), BackendError> {
        let endpoint = format!("PATCH /{table}");
        let req = self
            .request(Method::PATCH, table)
            .query(&[(key, format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&json!({
                "status": status.as_str(),
                "updated_at": at.to_rfc3339(),
            }));
        let updated = self.fetch(endpoint.clone(), req).await?;
        if updated.is_empty() {
            return Err(BackendError::Api {
                endpoint,
                status: 404,
                message: format!("no {table} row with {key} = {id}"),
            });
        }
        tracing::debug!(table, %id, status = status.as_str(), "updated status");
        Ok(())
    }

    async fn insert<T: Serialize + Sync>(&self, table: &str, row: &T) -> Result<(), BackendError> {
        let endpoint = format!("POST /{table}");
        let resp = self
            .request(Method::POST, table)
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await
            .map_err(|e| BackendError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        if !resp.status().is_success() {
            return Err(api_error(endpoint, resp).await);
        }
        tracing::debug!(table, "inserted row");
        Ok(())
    }
}

/// Build an `Api` error from a non-2xx response, preferring the body's
/// `message` (or `error`) field over the raw text.
pub(crate) async fn api_error(endpoint: String, resp: reqwest::Response) -> BackendError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| {
            ["message", "error"]
                .iter()
                .find_map(|k| v.get(k).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("Request failed ({status})")
            } else {
                body
            }
        });
    BackendError::Api {
        endpoint,
        status,
        message,
    }
}

#[async_trait]
impl DisputeTables for PostgrestTables {
    async fn list_disputes(&self) -> Result<Vec<DisputeRow>, BackendError> {
        self.select(table::DISPUTES, &[("order", "updated_at.desc".into())])
            .await
    }

    async fn list_cases(&self) -> Result<Vec<CaseRow>, BackendError> {
        self.select(table::CASES, &[("order", "updated_at.desc".into())])
            .await
    }

    async fn find_dispute(&self, id: &DisputeId) -> Result<Option<DisputeRow>, BackendError> {
        self.find(table::DISPUTES, "dispute_id", id).await
    }

    async fn find_case(&self, id: &DisputeId) -> Result<Option<CaseRow>, BackendError> {
        self.find(table::CASES, "id", id).await
    }

    async fn messages_for(&self, id: &DisputeId) -> Result<Vec<MessageRow>, BackendError> {
        self.select(
            table::MESSAGES,
            &[
                ("dispute_id", format!("eq.{id}")),
                ("order", "created_at.asc".into()),
            ],
        )
        .await
    }

    async fn agent_runs_for(&self, id: &DisputeId) -> Result<Vec<AgentRunRow>, BackendError> {
        self.select(
            table::AGENT_RUNS,
            &[
                ("dispute_id", format!("eq.{id}")),
                ("order", "created_at.asc".into()),
            ],
        )
        .await
    }

    async fn case_events_for(&self, id: &DisputeId) -> Result<Vec<CaseEventRow>, BackendError> {
        self.select(
            table::CASE_EVENTS,
            &[
                ("case_id", format!("eq.{id}")),
                ("order", "created_at.asc".into()),
            ],
        )
        .await
    }

    async fn update_dispute_status(
        &self,
        id: &DisputeId,
        status: CanonicalStatus,
        at: Timestamp,
    ) -> Result<(), BackendError> {
        self.patch_status(table::DISPUTES, "dispute_id", id, status, at)
            .await
    }

    async fn update_case_status(
        &self,
        id: &DisputeId,
        status: CanonicalStatus,
        at: Timestamp,
    ) -> Result<(), BackendError> {
        self.patch_status(table::CASES, "id", id, status, at).await
    }

    async fn insert_message(&self, message: NewMessage) -> Result<(), BackendError> {
        self.insert(table::MESSAGES, &message).await
    }

    async fn insert_case_event(&self, event: NewCaseEvent) -> Result<(), BackendError> {
        self.insert(table::CASE_EVENTS, &event).await
    }

    async fn insert_approval(&self, approval: NewApproval) -> Result<(), BackendError> {
        self.insert(table::APPROVALS, &approval).await
    }
}

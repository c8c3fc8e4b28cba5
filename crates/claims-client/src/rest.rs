//! Typed client for the secondary REST API.
//!
//! ## Paths (relative to `{base_url}/api/v1`)
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST   | `/scan` | Trigger an inbox scan |
//! | GET    | `/disputes` | List disputes |
//! | GET    | `/disputes/{id}` | Get one dispute |
//! | POST   | `/disputes/{id}/approve` | Approve or reject the draft |
//! | POST   | `/webhooks/inbound-email` | Deliver a vendor reply |
//!
//! Non-2xx responses carry `{message | error, status}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use claims_core::{Decision, DisputeId, VendorReply};

use crate::config::ConfigError;
use crate::error::BackendError;
use crate::postgrest::api_error;
use crate::rows::{decode_rows, nested_rows, opt_number, opt_string, opt_strings, AgentRunRow, MessageRow};

const API_PREFIX: &str = "api/v1";

// -- Wire types ---------------------------------------------------------------

/// A dispute as the REST API renders it.
///
/// The API emits both `dispute_id` and the older `id` alias; either is
/// accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiDispute {
    #[serde(default, deserialize_with = "opt_string")]
    pub dispute_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub vendor_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub policy_region: Option<String>,
    #[serde(default)]
    pub draft_payload_json: Option<Value>,
    #[serde(default, deserialize_with = "opt_string")]
    pub latest_reason: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub updated_at: Option<String>,
    #[serde(default, deserialize_with = "opt_number")]
    pub estimated_value: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub recovered_amount: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub fee_amount: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub compute_cost: Option<f64>,
    #[serde(default, deserialize_with = "opt_string")]
    pub flight_number: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub booking_ref: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub email_subject: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub email_body: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub thread_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub draft_claim: Option<String>,
    #[serde(default, deserialize_with = "opt_strings", skip_serializing_if = "Option::is_none")]
    pub ai_reasons: Option<Vec<String>>,
    #[serde(default, deserialize_with = "nested_rows")]
    pub messages: Vec<MessageRow>,
    #[serde(default, deserialize_with = "nested_rows")]
    pub agent_runs: Vec<AgentRunRow>,
}

impl ApiDispute {
    /// The dispute's identifier: `dispute_id`, else the `id` alias.
    pub fn key(&self) -> Option<&str> {
        self.dispute_id
            .as_deref()
            .or(self.id.as_deref())
            .filter(|k| !k.trim().is_empty())
    }
}

/// Body of `POST /disputes/{id}/approve`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovePayload {
    pub decision: Decision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Body of `POST /webhooks/inbound-email`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub dispute_id: String,
    pub thread_id: String,
    pub result: VendorReply,
    pub subject: String,
    pub body_text: String,
    pub source: String,
}

/// Response of `POST /webhooks/inbound-email`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookAck {
    pub status: String,
}

/// Response of `POST /scan`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disputes_found: Option<u64>,
}

// -- Client -------------------------------------------------------------------

/// Client for the secondary REST API.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: url::Url,
}

impl RestClient {
    pub fn new(http: reqwest::Client, base_url: url::Url) -> Self {
        Self { http, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{path}", self.base_url, API_PREFIX)
    }

    /// `{base_url}/api/v1/disputes/{id}[/{action}]`, with `id` encoded as a
    /// single path segment.
    fn dispute_url(&self, id: &DisputeId, action: Option<&str>) -> Result<url::Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ConfigError::InvalidUrl("REST API base".into(), self.base_url.to_string())
            })?
            .pop_if_empty()
            .extend(API_PREFIX.split('/'))
            .push("disputes")
            .push(id.as_str())
            .extend(action);
        Ok(url)
    }

    async fn send(
        &self,
        endpoint: &str,
        req: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, BackendError> {
        let resp = req.send().await.map_err(|e| BackendError::Http {
            endpoint: endpoint.to_string(),
            source: e,
        })?;
        if !resp.status().is_success() {
            return Err(api_error(endpoint.to_string(), resp).await);
        }
        Ok(resp)
    }

    async fn json<T: serde::de::DeserializeOwned>(
        endpoint: &str,
        resp: reqwest::Response,
    ) -> Result<T, BackendError> {
        resp.json().await.map_err(|e| BackendError::Deserialization {
            endpoint: endpoint.to_string(),
            source: e,
        })
    }

    /// Trigger an inbox scan.
    ///
    /// Calls `POST {base_url}/api/v1/scan`.
    pub async fn scan(&self) -> Result<ScanResponse, BackendError> {
        let endpoint = "POST /scan";
        let resp = self.send(endpoint, self.http.post(self.url("/scan"))).await?;
        Self::json(endpoint, resp).await
    }

    /// List all disputes. Entries without an identifier are skipped.
    ///
    /// Calls `GET {base_url}/api/v1/disputes`.
    pub async fn list_disputes(&self) -> Result<Vec<ApiDispute>, BackendError> {
        let endpoint = "GET /disputes";
        let resp = self.send(endpoint, self.http.get(self.url("/disputes"))).await?;
        let raw: Vec<Value> = Self::json(endpoint, resp).await?;
        let disputes: Vec<ApiDispute> = decode_rows("api/disputes", raw);
        Ok(disputes.into_iter().filter(|d| d.key().is_some()).collect())
    }

    /// Get one dispute. A 404 is `Ok(None)`.
    ///
    /// Calls `GET {base_url}/api/v1/disputes/{id}`.
    pub async fn get_dispute(&self, id: &DisputeId) -> Result<Option<ApiDispute>, BackendError> {
        let endpoint = format!("GET /disputes/{id}");
        let resp = self
            .http
            .get(self.dispute_url(id, None)?)
            .send()
            .await
            .map_err(|e| BackendError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(api_error(endpoint, resp).await);
        }

        let dispute: ApiDispute = Self::json(&endpoint, resp).await?;
        Ok(dispute.key().is_some().then_some(dispute))
    }

    /// Approve or reject a dispute's draft. Returns the updated dispute.
    ///
    /// Calls `POST {base_url}/api/v1/disputes/{id}/approve`.
    pub async fn submit_decision(
        &self,
        id: &DisputeId,
        payload: &ApprovePayload,
    ) -> Result<ApiDispute, BackendError> {
        let endpoint = format!("POST /disputes/{id}/approve");
        let req = self
            .http
            .post(self.dispute_url(id, Some("approve"))?)
            .json(payload);
        let resp = self.send(&endpoint, req).await?;
        Self::json(&endpoint, resp).await
    }

    /// Deliver a vendor reply.
    ///
    /// Calls `POST {base_url}/api/v1/webhooks/inbound-email`.
    pub async fn send_webhook(&self, payload: &WebhookPayload) -> Result<WebhookAck, BackendError> {
        let endpoint = "POST /webhooks/inbound-email";
        let req = self
            .http
            .post(self.url("/webhooks/inbound-email"))
            .json(payload);
        let resp = self.send(endpoint, req).await?;
        Self::json(endpoint, resp).await
    }
}

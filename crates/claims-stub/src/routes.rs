//! Route definitions for the claims REST API stub.
//!
//! Serves the endpoints `RestClient` calls, under `/api/v1`, with bodies that
//! decode into the client's wire types. Decisions and vendor replies go
//! through the same lifecycle as the engine: a refused transition is a 409.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use claims_client::{ApiDispute, ApprovePayload, ScanResponse, WebhookAck, WebhookPayload};
use claims_core::{AgentRun, CanonicalStatus, Dispute, DisputeId, Message, RecordOrigin, Timestamp};
use claims_engine::ingest::to_api;
use claims_state::{Lifecycle, LifecycleError};

use crate::store::AppState;

/// Vendors `POST /scan` rotates through: name, category, estimated value.
const SCAN_POOL: [(&str, &str, f64); 6] = [
    ("Ryanair", "flight_delay", 250.0),
    ("DHL", "damaged_parcel", 85.0),
    ("Amazon", "late_delivery", 30.0),
    ("EasyJet", "cancellation", 180.0),
    ("FedEx", "damaged_parcel", 120.0),
    ("Hermes", "lost_parcel", 45.0),
];

/// Build the complete router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/scan", post(scan))
        .route("/disputes", get(list_disputes))
        .route("/disputes/{id}", get(get_dispute))
        .route("/disputes/{id}/approve", post(approve))
        .route("/webhooks/inbound-email", post(inbound_email));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ── Errors ──────────────────────────────────────────────────────────

/// Error body `{message, status}`.
#[derive(Debug)]
struct StubError {
    status: StatusCode,
    message: String,
}

impl StubError {
    fn not_found(id: &DisputeId) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: format!("dispute {id} not found"),
        }
    }

    fn conflict(reason: LifecycleError) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: reason.to_string(),
        }
    }
}

impl IntoResponse for StubError {
    fn into_response(self) -> Response {
        let body = json!({ "message": self.message, "status": self.status.as_u16() });
        (self.status, Json(body)).into_response()
    }
}

// ── Handlers ────────────────────────────────────────────────────────

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn scan(State(state): State<AppState>) -> Json<ScanResponse> {
    let n = state.next_scan();
    let (vendor, category, value) = SCAN_POOL[n % SCAN_POOL.len()];
    let now = Timestamp::now();

    let mut dispute = Dispute::new(
        format!("scan-{:03}", n + 1),
        RecordOrigin::Api,
        CanonicalStatus::ScannedMatch,
        now,
    );
    dispute.vendor_name = vendor.into();
    dispute.category = category.into();
    dispute.estimated_value = Some(value);
    dispute.agent_runs.push(AgentRun {
        name: "scanner".into(),
        step: "email_scan".into(),
        status: "completed".into(),
        output: json!({ "emails_found": 1, "vendor": vendor }),
        error: None,
        created_at: Some(now),
    });

    tracing::info!(dispute_id = %dispute.id, vendor, "scan produced dispute");
    state.insert(dispute);
    Json(ScanResponse {
        status: "ok".into(),
        disputes_found: Some(1),
    })
}

async fn list_disputes(State(state): State<AppState>) -> Json<Vec<ApiDispute>> {
    Json(state.list().iter().map(to_api).collect())
}

async fn get_dispute(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiDispute>, StubError> {
    let id = DisputeId::new(id);
    state
        .disputes()
        .get(&id)
        .map(|entry| Json(to_api(entry.value())))
        .ok_or_else(|| StubError::not_found(&id))
}

async fn approve(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ApprovePayload>,
) -> Result<Json<ApiDispute>, StubError> {
    let id = DisputeId::new(id);
    let mut entry = state
        .disputes()
        .get_mut(&id)
        .ok_or_else(|| StubError::not_found(&id))?;
    let dispute = entry.value_mut();

    let mut lifecycle = Lifecycle::of(dispute);
    let to = lifecycle
        .decide(body.decision, body.note.as_deref())
        .map_err(StubError::conflict)?;
    lifecycle.write_to(dispute);
    if let Some(note) = &body.note {
        dispute.latest_reason = Some(note.clone());
    }
    dispute.agent_runs.push(AgentRun {
        name: body.channel.clone().unwrap_or_else(|| "api".into()),
        step: body.decision.event_type().into(),
        status: "completed".into(),
        output: json!({ "decision": body.decision, "note": body.note }),
        error: None,
        created_at: Some(dispute.updated_at),
    });

    tracing::info!(dispute_id = %id, decision = %body.decision, to = to.as_str(), "decision applied");
    Ok(Json(to_api(dispute)))
}

async fn inbound_email(
    State(state): State<AppState>,
    Json(body): Json<WebhookPayload>,
) -> Result<Json<WebhookAck>, StubError> {
    let id = DisputeId::new(body.dispute_id.clone());
    let mut entry = state
        .disputes()
        .get_mut(&id)
        .ok_or_else(|| StubError::not_found(&id))?;
    let dispute = entry.value_mut();

    let mut lifecycle = Lifecycle::of(dispute);
    let to = lifecycle
        .vendor_reply(body.result)
        .map_err(StubError::conflict)?;
    lifecycle.write_to(dispute);
    dispute.messages.push(Message {
        id: Uuid::new_v4().to_string(),
        direction: "inbound".into(),
        source: body.source,
        subject: Some(body.subject),
        body_text: Some(body.body_text),
        thread_id: Some(body.thread_id),
        created_at: dispute.updated_at,
    });

    tracing::info!(dispute_id = %id, result = %body.result, to = to.as_str(), "vendor reply applied");
    Ok(Json(WebhookAck {
        status: "ok".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_app() -> Router {
        router(AppState::seeded())
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get_req(uri: &str) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn post_json(uri: &str, body: Value) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let resp = test_app().oneshot(get_req("/health")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["status"], "ok");
    }

    #[tokio::test]
    async fn list_returns_seeded_disputes_newest_first() {
        let resp = test_app().oneshot(get_req("/api/v1/disputes")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let list = body_json(resp).await;
        let list = list.as_array().unwrap();
        assert_eq!(list.len(), 6);
        assert_eq!(list[0]["dispute_id"], "disp-001");
        assert_eq!(list[0]["status"], "AWAITING_USER_APPROVAL");
        assert_eq!(list[0]["vendor_name"], "Ryanair");
    }

    #[tokio::test]
    async fn get_unknown_dispute_is_404_with_body() {
        let resp = test_app()
            .oneshot(get_req("/api/v1/disputes/ghost"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = body_json(resp).await;
        assert_eq!(body["status"], 404);
        assert_eq!(body["message"], "dispute ghost not found");
    }

    #[tokio::test]
    async fn approve_then_reply_then_conflict() {
        let app = test_app();

        let resp = app
            .clone()
            .oneshot(post_json(
                "/api/v1/disputes/disp-001/approve",
                json!({"decision": "APPROVE", "channel": "dashboard"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let updated = body_json(resp).await;
        assert_eq!(updated["status"], "WAITING_VENDOR_RESPONSE");

        let resp = app
            .clone()
            .oneshot(post_json(
                "/api/v1/webhooks/inbound-email",
                json!({
                    "dispute_id": "disp-001",
                    "thread_id": "thread-disp-001",
                    "result": "accepted",
                    "subject": "Re: Claim disp-001",
                    "body_text": "Approved.",
                    "source": "simulation"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app
            .clone()
            .oneshot(get_req("/api/v1/disputes/disp-001"))
            .await
            .unwrap();
        let fetched = body_json(resp).await;
        assert_eq!(fetched["status"], "RESOLVED_SUCCESS");
        assert_eq!(fetched["messages"].as_array().unwrap().len(), 2);

        let resp = app
            .oneshot(post_json(
                "/api/v1/disputes/disp-001/approve",
                json!({"decision": "REJECT"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(resp).await["status"], 409);
    }

    #[tokio::test]
    async fn reject_records_note() {
        let resp = test_app()
            .oneshot(post_json(
                "/api/v1/disputes/disp-001/approve",
                json!({"decision": "REJECT", "note": "bad draft"}),
            ))
            .await
            .unwrap();
        let updated = body_json(resp).await;
        assert_eq!(updated["status"], "DISCARDED_BY_USER");
        assert_eq!(updated["latest_reason"], "bad draft");
    }

    #[tokio::test]
    async fn webhook_outside_waiting_is_conflict() {
        let resp = test_app()
            .oneshot(post_json(
                "/api/v1/webhooks/inbound-email",
                json!({
                    "dispute_id": "disp-003",
                    "thread_id": "t",
                    "result": "rejected",
                    "subject": "s",
                    "body_text": "b",
                    "source": "simulation"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn scan_rotates_vendors() {
        let state = AppState::new();
        let app = router(state.clone());
        for _ in 0..2 {
            let resp = app
                .clone()
                .oneshot(post_json("/api/v1/scan", json!({})))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
            assert_eq!(body_json(resp).await["disputes_found"], 1);
        }
        let first = state.disputes().get(&DisputeId::new("scan-001")).unwrap().value().clone();
        let second = state.disputes().get(&DisputeId::new("scan-002")).unwrap().value().clone();
        assert_eq!(first.vendor_name, "Ryanair");
        assert_eq!(second.vendor_name, "DHL");
        assert_eq!(first.status, CanonicalStatus::ScannedMatch);
    }
}

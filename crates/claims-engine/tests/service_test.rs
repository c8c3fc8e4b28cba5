//! End-to-end tests of ClaimsService over the in-memory row store and a
//! wiremock REST API.

use std::sync::Arc;

use claims_client::rows::table;
use claims_client::{Backends, CaseRow, DisputeRow, MemoryTables, RestClient};
use claims_core::{
    CanonicalStatus, ClaimsError, Decision, DisputeId, RecordOrigin, VendorReply, WriteLayer,
};
use claims_engine::{ClaimsService, Outcome};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn dispute_row(id: &str, status: &str, updated_at: &str) -> DisputeRow {
    serde_json::from_value(json!({
        "dispute_id": id,
        "status": status,
        "vendor_name": "Ryanair",
        "draft_payload_json": {"flight": "FR4821"},
        "created_at": "2026-02-01T00:00:00Z",
        "updated_at": updated_at,
    }))
    .unwrap()
}

fn case_row(id: &str, status: &str, updated_at: &str) -> CaseRow {
    serde_json::from_value(json!({
        "id": id,
        "status": status,
        "vendor": "DHL",
        "draft_email_body": "Dear DHL Claims Department,",
        "created_at": "2026-02-01T00:00:00Z",
        "updated_at": updated_at,
    }))
    .unwrap()
}

fn seeded() -> MemoryTables {
    MemoryTables::new()
        .with_disputes([
            dispute_row("a-1", "draft_ready", "2026-02-10T00:00:00Z"),
            dispute_row("shared", "WAITING_VENDOR_RESPONSE", "2026-02-05T00:00:00Z"),
        ])
        .with_cases([
            case_row("b-1", "waiting_vendor", "2026-02-12T00:00:00Z"),
            case_row("shared", "FAILED", "2026-02-20T00:00:00Z"),
        ])
}

fn row_store_service(tables: &MemoryTables, sample_fallback: bool) -> ClaimsService {
    ClaimsService::from_backends(
        Backends {
            tables: Some(Arc::new(tables.clone())),
            rest: None,
        },
        sample_fallback,
    )
}

fn rest_client(server: &MockServer) -> RestClient {
    RestClient::new(reqwest::Client::new(), server.uri().parse().unwrap())
}

// ── Reads ────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_merges_both_tables_with_disputes_precedence() {
    let service = row_store_service(&seeded(), false);
    let list = service.list_disputes().await.unwrap();

    let ids: Vec<&str> = list.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["b-1", "a-1", "shared"]);

    let shared = list.iter().find(|d| d.id.as_str() == "shared").unwrap();
    assert_eq!(shared.origin, RecordOrigin::Disputes);
    assert_eq!(shared.status, CanonicalStatus::WaitingVendorResponse);
    assert_eq!(list[1].status, CanonicalStatus::AwaitingUserApproval);
}

#[tokio::test]
async fn list_survives_disputes_table_failure() {
    let tables = seeded();
    tables.set_unavailable(table::DISPUTES, true);
    let list = row_store_service(&tables, false).list_disputes().await.unwrap();
    assert_eq!(list.len(), 2);
    assert!(list.iter().all(|d| d.origin == RecordOrigin::Cases));
}

#[tokio::test]
async fn list_without_any_source_is_unavailable() {
    let tables = seeded();
    tables.set_unavailable(table::DISPUTES, true);
    tables.set_unavailable(table::CASES, true);
    let err = row_store_service(&tables, false)
        .list_disputes()
        .await
        .unwrap_err();
    assert!(matches!(err, ClaimsError::SourceUnavailable { ref failures } if failures.len() == 2));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn sample_fallback_serves_when_row_store_is_down() {
    let tables = seeded();
    tables.set_unavailable(table::DISPUTES, true);
    tables.set_unavailable(table::CASES, true);
    let service = row_store_service(&tables, true);
    assert_eq!(service.provider_names(), vec!["row store", "sample dataset"]);

    let list = service.list_disputes().await.unwrap();
    assert_eq!(list.len(), 6);
    assert!(list.iter().all(|d| d.origin == RecordOrigin::Sample));
}

#[tokio::test]
async fn rest_api_serves_when_row_store_is_down() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/disputes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"dispute_id": "api-1", "status": "resolved", "updated_at": "2026-02-01T00:00:00Z"},
            {"id": "api-2", "status": "scanned", "updated_at": "2026-02-03T00:00:00Z"}
        ])))
        .mount(&server)
        .await;

    let tables = seeded();
    tables.set_unavailable(table::DISPUTES, true);
    tables.set_unavailable(table::CASES, true);
    let service = ClaimsService::from_backends(
        Backends {
            tables: Some(Arc::new(tables)),
            rest: Some(rest_client(&server)),
        },
        false,
    );

    let list = service.list_disputes().await.unwrap();
    let ids: Vec<&str> = list.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["api-2", "api-1"]);
    assert_eq!(list[1].status, CanonicalStatus::ResolvedSuccess);
    assert!(list.iter().all(|d| d.origin == RecordOrigin::Api));
}

#[tokio::test]
async fn get_unknown_id_is_not_found() {
    let err = row_store_service(&seeded(), true)
        .get_dispute(&DisputeId::new("ghost"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

// ── Decisions against the row store ──────────────────────────────────

#[tokio::test]
async fn approve_then_vendor_accepts() {
    let tables = seeded();
    let service = row_store_service(&tables, false);
    let id = DisputeId::new("a-1");

    let outcome = service.decide(&id, Decision::Approve, None).await.unwrap();
    assert_eq!(outcome.dispute().status, CanonicalStatus::WaitingVendorResponse);
    assert_eq!(tables.approvals().len(), 1);

    let outcome = service
        .simulate_vendor_reply(&id, VendorReply::Accepted)
        .await
        .unwrap();
    assert_eq!(outcome.dispute().status, CanonicalStatus::ResolvedSuccess);

    let reread = service.get_dispute(&id).await.unwrap();
    assert_eq!(reread.status, CanonicalStatus::ResolvedSuccess);
    assert_eq!(reread.messages.len(), 1);
    assert_eq!(reread.messages[0].source, "simulation");

    let outcome = service.decide(&id, Decision::Reject, None).await.unwrap();
    assert!(!outcome.is_applied());
    assert_eq!(outcome.dispute().status, CanonicalStatus::ResolvedSuccess);
    assert_eq!(tables.approvals().len(), 1);
}

#[tokio::test]
async fn reject_case_records_note_and_shows_in_timeline() {
    let tables = MemoryTables::new().with_cases([case_row(
        "b-2",
        "AWAITING_USER_APPROVAL",
        "2026-02-12T00:00:00Z",
    )]);
    let service = row_store_service(&tables, false).with_channel("cli");
    let id = DisputeId::new("b-2");

    let outcome = service
        .decide(&id, Decision::Reject, Some("bad draft"))
        .await
        .unwrap();
    assert!(outcome.is_applied());
    assert_eq!(outcome.dispute().status, CanonicalStatus::DiscardedByUser);

    let reread = service.get_dispute(&id).await.unwrap();
    assert_eq!(reread.status, CanonicalStatus::DiscardedByUser);
    let run = reread.agent_runs.last().unwrap();
    assert_eq!(run.step, "user_rejected");
    assert_eq!(run.output["note"], "bad draft");
}

#[tokio::test]
async fn needs_info_returns_to_approval() {
    let tables = MemoryTables::new().with_cases([case_row(
        "b-3",
        "WAITING_VENDOR_RESPONSE",
        "2026-02-12T00:00:00Z",
    )]);
    let outcome = row_store_service(&tables, false)
        .simulate_vendor_reply(&DisputeId::new("b-3"), VendorReply::NeedsInfo)
        .await
        .unwrap();
    assert_eq!(outcome.dispute().status, CanonicalStatus::AwaitingUserApproval);
}

#[tokio::test]
async fn write_failure_names_the_row_store() {
    let tables = MemoryTables::new().with_cases([case_row(
        "b-4",
        "AWAITING_USER_APPROVAL",
        "2026-02-12T00:00:00Z",
    )]);
    tables.set_unavailable(table::CASE_EVENTS, true);
    let err = row_store_service(&tables, false)
        .decide(&DisputeId::new("b-4"), Decision::Approve, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClaimsError::WriteFailed {
            layer: WriteLayer::RowStore,
            ..
        }
    ));
}

#[tokio::test]
async fn sample_disputes_cannot_be_decided() {
    let tables = MemoryTables::new();
    tables.set_unavailable(table::DISPUTES, true);
    tables.set_unavailable(table::CASES, true);
    let err = row_store_service(&tables, true)
        .decide(&DisputeId::new("disp-001"), Decision::Approve, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClaimsError::WriteFailed {
            layer: WriteLayer::Sample,
            ..
        }
    ));
}

// ── Decisions against the REST API ───────────────────────────────────

fn rest_service(server: &MockServer) -> ClaimsService {
    ClaimsService::from_backends(
        Backends {
            tables: None,
            rest: Some(rest_client(server)),
        },
        false,
    )
}

async fn mount_awaiting(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/disputes/api-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dispute_id": "api-7",
            "status": "AWAITING_USER_APPROVAL",
            "draft_claim": "Dear EasyJet,",
            "updated_at": "2026-02-01T00:00:00Z"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn api_decision_posts_approve_and_returns_server_record() {
    let server = MockServer::start().await;
    mount_awaiting(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/disputes/api-7/approve"))
        .and(body_partial_json(json!({"decision": "APPROVE", "channel": "dashboard"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dispute_id": "api-7",
            "status": "WAITING_VENDOR_RESPONSE",
            "updated_at": "2026-02-02T00:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = rest_service(&server)
        .decide(&DisputeId::new("api-7"), Decision::Approve, None)
        .await
        .unwrap();
    match outcome {
        Outcome::Applied(d) => {
            assert_eq!(d.status, CanonicalStatus::WaitingVendorResponse);
            assert_eq!(d.origin, RecordOrigin::Api);
        }
        other => panic!("expected Applied, got: {other:?}"),
    }
}

#[tokio::test]
async fn api_decision_conflict_is_write_failed_with_status() {
    let server = MockServer::start().await;
    mount_awaiting(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/disputes/api-7/approve"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "dispute is already decided",
            "status": 409
        })))
        .mount(&server)
        .await;

    let err = rest_service(&server)
        .decide(&DisputeId::new("api-7"), Decision::Approve, None)
        .await
        .unwrap_err();
    match err {
        ClaimsError::WriteFailed {
            layer,
            status,
            message,
        } => {
            assert_eq!(layer, WriteLayer::RestApi);
            assert_eq!(status, Some(409));
            assert_eq!(message, "dispute is already decided");
        }
        other => panic!("expected WriteFailed, got: {other:?}"),
    }
}

#[tokio::test]
async fn api_vendor_reply_posts_webhook() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/disputes/api-8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dispute_id": "api-8",
            "status": "WAITING_VENDOR_RESPONSE"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/webhooks/inbound-email"))
        .and(body_partial_json(json!({
            "dispute_id": "api-8",
            "thread_id": "thread-api-8",
            "result": "rejected",
            "subject": "Re: Claim api-8",
            "source": "simulation"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = rest_service(&server)
        .simulate_vendor_reply(&DisputeId::new("api-8"), VendorReply::Rejected)
        .await
        .unwrap();
    assert_eq!(outcome.dispute().status, CanonicalStatus::ResolvedRejected);
}

// ── Scan and summary ─────────────────────────────────────────────────

#[tokio::test]
async fn scan_requires_rest_api() {
    let err = row_store_service(&seeded(), false).scan().await.unwrap_err();
    assert!(matches!(err, ClaimsError::SourceUnavailable { .. }));
}

#[tokio::test]
async fn scan_reports_found_count() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/scan"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "ok", "disputes_found": 1})),
        )
        .mount(&server)
        .await;

    let resp = rest_service(&server).scan().await.unwrap();
    assert_eq!(resp.disputes_found, Some(1));
}

#[tokio::test]
async fn summary_over_row_store() {
    let summary = row_store_service(&seeded(), false).summary().await.unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.active_count, 3);
    assert_eq!(summary.success_rate_pct, 0);
}

//! Contract tests for PostgrestTables against a wiremock row store.
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | GET    | `/rest/v1/disputes` | `list_disputes_*` |
//! | GET    | `/rest/v1/cases?id=eq.{id}` | `find_case_*` |
//! | GET    | `/rest/v1/case_events?case_id=eq.{id}` | `case_events_*` |
//! | PATCH  | `/rest/v1/disputes?dispute_id=eq.{id}` | `update_dispute_status_*` |
//! | POST   | `/rest/v1/case_events` | `insert_case_event_*` |

use claims_client::{DisputeTables, NewApproval, NewCaseEvent, PostgrestTables};
use claims_core::{CanonicalStatus, Decision, DisputeId, Timestamp};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_tables(mock_server: &MockServer) -> PostgrestTables {
    PostgrestTables::new(
        reqwest::Client::new(),
        mock_server.uri().parse().unwrap(),
        zeroize::Zeroizing::new("anon-key".into()),
    )
}

// ── GET /rest/v1/disputes ────────────────────────────────────────────

#[tokio::test]
async fn list_disputes_sends_key_headers_and_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/disputes"))
        .and(query_param("select", "*"))
        .and(query_param("order", "updated_at.desc"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "dispute_id": "disp-001",
                "category": "flight_delay",
                "status": "AWAITING_USER_APPROVAL",
                "vendor_name": "Ryanair",
                "policy_region": "EU",
                "draft_payload_json": {"flight": "FR4821"},
                "created_at": "2026-02-18T14:30:00+00:00",
                "updated_at": "2026-02-18T15:00:00+00:00"
            }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let rows = test_tables(&mock_server).list_disputes().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].dispute_id, "disp-001");
    assert_eq!(rows[0].vendor_name.as_deref(), Some("Ryanair"));
}

#[tokio::test]
async fn list_disputes_skips_rows_without_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/disputes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"dispute_id": "disp-001"},
            {"status": "resolved"},
            {"dispute_id": "disp-002", "vendor_name": 12}
        ])))
        .mount(&mock_server)
        .await;

    let rows = test_tables(&mock_server).list_disputes().await.unwrap();
    let ids: Vec<&str> = rows.iter().map(|r| r.dispute_id.as_str()).collect();
    assert_eq!(ids, vec!["disp-001", "disp-002"]);
}

#[tokio::test]
async fn list_disputes_surfaces_server_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/disputes"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "message": "Invalid API key"
        })))
        .mount(&mock_server)
        .await;

    let err = test_tables(&mock_server).list_disputes().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.message(), "Invalid API key");
}

#[tokio::test]
async fn list_disputes_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/disputes"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = test_tables(&mock_server).list_disputes().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.message(), "Request failed (503)");
}

// ── GET /rest/v1/cases?id=eq.{id} ────────────────────────────────────

#[tokio::test]
async fn find_case_uses_exact_match_filter() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/cases"))
        .and(query_param("id", "eq.case-7"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": "case-7", "vendor": "DHL", "estimated_value": 85}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let row = test_tables(&mock_server)
        .find_case(&DisputeId::new("case-7"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.vendor.as_deref(), Some("DHL"));
    assert_eq!(row.estimated_value, Some(85.0));
}

#[tokio::test]
async fn find_case_empty_result_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/cases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    let row = test_tables(&mock_server)
        .find_case(&DisputeId::new("missing"))
        .await
        .unwrap();
    assert!(row.is_none());
}

// ── GET /rest/v1/case_events ─────────────────────────────────────────

#[tokio::test]
async fn case_events_filter_by_case_and_order_ascending() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/case_events"))
        .and(query_param("case_id", "eq.case-7"))
        .and(query_param("order", "created_at.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": "ev-1", "case_id": "case-7", "actor": "scanner", "event_type": "email_scanned"},
            {"id": "ev-2", "case_id": "case-7", "actor": "drafter", "event_type": "draft_generated"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let events = test_tables(&mock_server)
        .case_events_for(&DisputeId::new("case-7"))
        .await
        .unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].event_type.as_deref(), Some("draft_generated"));
}

// ── PATCH /rest/v1/disputes ──────────────────────────────────────────

#[tokio::test]
async fn update_dispute_status_patches_canonical_status() {
    let mock_server = MockServer::start().await;
    let at = Timestamp::parse_lenient("2026-02-20T09:00:00Z").unwrap();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/disputes"))
        .and(query_param("dispute_id", "eq.disp-001"))
        .and(header("prefer", "return=representation"))
        .and(body_json(serde_json::json!({
            "status": "WAITING_VENDOR_RESPONSE",
            "updated_at": "2026-02-20T09:00:00Z"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"dispute_id": "disp-001", "status": "WAITING_VENDOR_RESPONSE"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    test_tables(&mock_server)
        .update_dispute_status(
            &DisputeId::new("disp-001"),
            CanonicalStatus::WaitingVendorResponse,
            at,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn update_dispute_status_with_no_matching_row_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/disputes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    let err = test_tables(&mock_server)
        .update_dispute_status(
            &DisputeId::new("ghost"),
            CanonicalStatus::Failed,
            Timestamp::now(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
}

// ── POST inserts ─────────────────────────────────────────────────────

#[tokio::test]
async fn insert_case_event_posts_row() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/case_events"))
        .and(body_json(serde_json::json!({
            "case_id": "case-7",
            "actor": "user",
            "event_type": "user_rejected",
            "details": {"decision": "REJECT", "note": "bad draft"}
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    test_tables(&mock_server)
        .insert_case_event(NewCaseEvent {
            case_id: "case-7".into(),
            actor: "user".into(),
            event_type: "user_rejected".into(),
            details: serde_json::json!({"decision": "REJECT", "note": "bad draft"}),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn insert_approval_rejected_by_store_is_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/approvals"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "message": "new row violates row-level security policy"
        })))
        .mount(&mock_server)
        .await;

    let err = test_tables(&mock_server)
        .insert_approval(NewApproval {
            dispute_id: "disp-001".into(),
            decision: Decision::Approve,
            channel: Some("dashboard".into()),
            note: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert!(err.message().contains("row-level security"));
}

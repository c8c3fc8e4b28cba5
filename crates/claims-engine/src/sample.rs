//! Bundled sample dataset.
//!
//! Six disputes covering every status except `SCANNED_MATCH`, used as the
//! last read provider when enabled and to seed the REST API stub. Records are
//! tagged [`RecordOrigin::Sample`] and are read-only to the decision engine.

use serde_json::{json, Value};

use claims_core::{AgentRun, CanonicalStatus, Dispute, Message, RecordOrigin, Timestamp};

fn ts(raw: &str) -> Timestamp {
    Timestamp::parse_lenient(raw).unwrap_or_else(|_| Timestamp::epoch())
}

struct Seed {
    id: &'static str,
    created: &'static str,
    updated: &'static str,
    vendor: &'static str,
    category: &'static str,
    estimated_value: f64,
    status: CanonicalStatus,
    flight_number: Option<&'static str>,
    booking_ref: &'static str,
    email_subject: &'static str,
    email_body: &'static str,
}

impl Seed {
    fn build(self, origin: RecordOrigin) -> Dispute {
        let mut d = Dispute::new(self.id, origin, self.status, ts(self.created));
        d.updated_at = ts(self.updated);
        d.vendor_name = self.vendor.into();
        d.category = self.category.into();
        d.estimated_value = Some(self.estimated_value);
        d.context.flight_number = self.flight_number.map(Into::into);
        d.context.booking_ref = Some(self.booking_ref.into());
        d.context.email_subject = Some(self.email_subject.into());
        d.context.email_body = Some(self.email_body.into());
        d
    }
}

fn message(id: &str, direction: &str, subject: &str, body: &str, at: &str) -> Message {
    Message {
        id: id.into(),
        direction: direction.into(),
        source: "email".into(),
        subject: Some(subject.into()),
        body_text: Some(body.into()),
        thread_id: None,
        created_at: ts(at),
    }
}

fn run(run_id: &str, started: &str, steps: &[(&str, Value)]) -> Vec<AgentRun> {
    steps
        .iter()
        .map(|(step, output)| AgentRun {
            name: run_id.into(),
            step: (*step).into(),
            status: "completed".into(),
            output: output.clone(),
            error: None,
            created_at: Some(ts(started)),
        })
        .collect()
}

fn billing(cost: f64, value: f64, margin: f64) -> Value {
    json!({"compute_cost_usd": cost, "value_generated_usd": value, "margin_pct": margin})
}

/// The sample disputes, tagged [`RecordOrigin::Sample`].
pub fn disputes() -> Vec<Dispute> {
    disputes_with_origin(RecordOrigin::Sample)
}

/// The sample disputes tagged with `origin`. The REST API stub seeds its
/// store with these as [`RecordOrigin::Api`].
pub fn disputes_with_origin(origin: RecordOrigin) -> Vec<Dispute> {
    let mut ryanair = Seed {
        id: "disp-001",
        created: "2026-02-18T00:00:00Z",
        updated: "2026-02-18T14:30:00Z",
        vendor: "Ryanair",
        category: "flight_delay",
        estimated_value: 250.0,
        status: CanonicalStatus::AwaitingUserApproval,
        flight_number: Some("FR4821"),
        booking_ref: "RYN-8834X",
        email_subject: "Your Ryanair flight FR4821 was delayed 4h 23m",
        email_body: "Dear passenger, we regret to inform you that flight FR4821 from Dublin to Barcelona on 15 Feb 2026 experienced a delay of 4 hours and 23 minutes due to operational reasons.",
    }
    .build(origin);
    ryanair.draft_claim = Some(
        "Dear Ryanair Customer Relations,\n\nI am writing to claim compensation under EU Regulation 261/2004 for flight FR4821 (Dublin → Barcelona) on 15 February 2026, which was delayed by 4 hours and 23 minutes.\n\nUnder the regulation, I am entitled to €250 compensation for this delay on a flight of this distance.\n\nBooking reference: RYN-8834X\n\nPlease process this claim within 14 days.\n\nRegards"
            .into(),
    );
    ryanair.draft_payload = Some(json!({
        "regulation": "EU261/2004",
        "flight": "FR4821",
        "route": "DUB-BCN",
        "delay_hours": 4.38,
        "compensation_eur": 250,
        "booking_ref": "RYN-8834X",
    }));
    ryanair.messages = vec![message(
        "msg-001",
        "inbound",
        "Flight FR4821 delay notification",
        "Your flight was delayed by 4h 23m.",
        "2026-02-15T10:00:00Z",
    )];
    ryanair.agent_runs = run(
        "run-001",
        "2026-02-18T14:00:00Z",
        &[
            ("email_scan", json!({"emails_found": 1})),
            ("entity_extraction", json!({"vendor": "Ryanair", "flight": "FR4821"})),
            ("draft_generation", json!({"draft_length": 312})),
            ("billing_stub", billing(0.15, 250.0, 99.9)),
        ],
    );

    let mut dhl = Seed {
        id: "disp-002",
        created: "2026-02-16T00:00:00Z",
        updated: "2026-02-17T09:00:00Z",
        vendor: "DHL",
        category: "damaged_parcel",
        estimated_value: 85.0,
        status: CanonicalStatus::WaitingVendorResponse,
        flight_number: None,
        booking_ref: "DHL-99281",
        email_subject: "DHL Delivery Confirmation - Package damaged on arrival",
        email_body: "Your package (tracking: DHL-99281) was delivered on 14 Feb 2026. The recipient has reported damage to the contents.",
    }
    .build(origin);
    dhl.draft_claim = Some(
        "Dear DHL Claims Department,\n\nI am filing a damage claim for parcel DHL-99281, delivered on 14 February 2026. The contents were visibly damaged upon receipt.\n\nEstimated value of damaged goods: $85.00\n\nPhotographic evidence is attached.\n\nPlease advise on next steps."
            .into(),
    );
    dhl.draft_payload = Some(json!({"tracking": "DHL-99281", "damage_value_usd": 85}));
    dhl.messages = vec![
        message(
            "msg-002",
            "inbound",
            "Delivery confirmation",
            "Package delivered, damage reported.",
            "2026-02-14T16:00:00Z",
        ),
        message(
            "msg-003",
            "outbound",
            "Damage claim DHL-99281",
            "Filing claim for damaged parcel.",
            "2026-02-16T10:00:00Z",
        ),
    ];
    dhl.agent_runs = run(
        "run-002",
        "2026-02-16T09:30:00Z",
        &[
            ("email_scan", Value::Null),
            ("entity_extraction", Value::Null),
            ("draft_generation", Value::Null),
            ("billing_stub", billing(0.12, 85.0, 99.9)),
            ("submission", Value::Null),
        ],
    );

    let mut amazon = Seed {
        id: "disp-003",
        created: "2026-02-14T00:00:00Z",
        updated: "2026-02-15T12:00:00Z",
        vendor: "Amazon",
        category: "late_delivery",
        estimated_value: 30.0,
        status: CanonicalStatus::ResolvedSuccess,
        flight_number: None,
        booking_ref: "AMZ-114-2938",
        email_subject: "Your Amazon Prime delivery was late",
        email_body: "Your guaranteed delivery for order AMZ-114-2938 was missed. The package arrived 3 days late.",
    }
    .build(origin);
    amazon.agent_runs = run(
        "run-003",
        "2026-02-14T08:00:00Z",
        &[
            ("email_scan", Value::Null),
            ("billing_stub", billing(0.08, 30.0, 99.7)),
        ],
    );

    let mut easyjet = Seed {
        id: "disp-004",
        created: "2026-02-12T00:00:00Z",
        updated: "2026-02-13T16:00:00Z",
        vendor: "EasyJet",
        category: "cancellation",
        estimated_value: 180.0,
        status: CanonicalStatus::ResolvedRejected,
        flight_number: Some("U2-4417"),
        booking_ref: "EZJ-77120",
        email_subject: "EasyJet flight U2-4417 cancellation notice",
        email_body: "We regret to inform you that flight U2-4417 from London Gatwick to Nice on 10 Feb 2026 has been cancelled.",
    }
    .build(origin);
    easyjet.agent_runs = run(
        "run-004",
        "2026-02-12T10:00:00Z",
        &[
            ("email_scan", Value::Null),
            ("billing_stub", billing(0.18, 0.0, 0.0)),
        ],
    );

    let fedex = Seed {
        id: "disp-005",
        created: "2026-02-10T00:00:00Z",
        updated: "2026-02-10T08:00:00Z",
        vendor: "FedEx",
        category: "damaged_parcel",
        estimated_value: 120.0,
        status: CanonicalStatus::DiscardedByUser,
        flight_number: None,
        booking_ref: "FDX-55102",
        email_subject: "FedEx shipment FDX-55102 damage report",
        email_body: "A damage report has been filed for shipment FDX-55102.",
    }
    .build(origin);

    let mut lufthansa = Seed {
        id: "disp-006",
        created: "2026-02-08T00:00:00Z",
        updated: "2026-02-09T11:00:00Z",
        vendor: "Lufthansa",
        category: "flight_delay",
        estimated_value: 400.0,
        status: CanonicalStatus::Failed,
        flight_number: Some("LH-1823"),
        booking_ref: "LH-MUC-9912",
        email_subject: "Lufthansa flight LH-1823 delay compensation denied",
        email_body: "Your compensation claim for flight LH-1823 has been reviewed. Unfortunately, the delay was caused by extraordinary circumstances beyond our control.",
    }
    .build(origin);
    lufthansa.agent_runs = run(
        "run-006",
        "2026-02-08T07:00:00Z",
        &[
            ("email_scan", Value::Null),
            ("billing_stub", billing(0.22, 0.0, 0.0)),
        ],
    );

    vec![ryanair, dhl, amazon, easyjet, fedex, lufthansa]
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims_core::{Economics, PortfolioSummary};

    #[test]
    fn six_disputes_newest_first() {
        let all = disputes();
        assert_eq!(all.len(), 6);
        assert!(all.windows(2).all(|w| w[0].updated_at >= w[1].updated_at));
        assert!(all.iter().all(|d| d.origin == RecordOrigin::Sample));
    }

    #[test]
    fn covers_every_status_but_scanned() {
        let all = disputes();
        for status in CanonicalStatus::all() {
            let present = all.iter().any(|d| d.status == *status);
            assert_eq!(present, *status != CanonicalStatus::ScannedMatch, "{status}");
        }
    }

    #[test]
    fn timestamps_parsed() {
        assert!(disputes().iter().all(|d| d.updated_at > Timestamp::epoch()));
    }

    #[test]
    fn only_the_ryanair_claim_awaits_a_decision() {
        let waiting: Vec<_> = disputes()
            .into_iter()
            .filter(|d| d.awaits_decision())
            .map(|d| d.id)
            .collect();
        assert_eq!(waiting.len(), 1);
        assert_eq!(waiting[0].as_str(), "disp-001");
    }

    #[test]
    fn economics_from_billing_runs() {
        let all = disputes();
        let amazon = Economics::for_dispute(&all[2]).unwrap();
        assert_eq!(amazon.compute_cost_usd, 0.08);
        assert_eq!(amazon.value_generated_usd, 30.0);
        assert!(Economics::for_dispute(&all[4]).is_none());
    }

    #[test]
    fn summary_over_sample() {
        let summary = PortfolioSummary::from_disputes(&disputes());
        assert_eq!(summary.total, 6);
        assert_eq!(summary.active_count, 2);
        assert_eq!(summary.capital_recovered, 30.0);
        assert_eq!(summary.success_rate_pct, 17);
    }
}

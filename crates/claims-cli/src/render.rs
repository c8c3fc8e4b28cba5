//! # Text Rendering
//!
//! Plain-text views of disputes for the terminal. Every function returns a
//! `String`; printing is left to the caller.

use std::fmt::Write;

use claims_core::{timeline, Dispute, Economics, PortfolioSummary, StepState};
use claims_engine::Outcome;

/// One line per dispute: id, status label, vendor, category, value, updated.
pub fn dispute_table(disputes: &[Dispute]) -> String {
    if disputes.is_empty() {
        return "No disputes.\n".to_string();
    }
    let id_width = disputes
        .iter()
        .map(|d| d.id.as_str().len())
        .max()
        .unwrap_or(0)
        .max(2);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<id_width$}  {:<15}  {:<16}  {:<16}  {:>9}  UPDATED",
        "ID", "STATUS", "VENDOR", "CATEGORY", "VALUE"
    );
    for d in disputes {
        let _ = writeln!(
            out,
            "{:<id_width$}  {:<15}  {:<16}  {:<16}  {:>9}  {}",
            d.id.as_str(),
            d.status.label(),
            truncate(&d.vendor_name, 16),
            truncate(&d.category, 16),
            money(d.estimated_value),
            d.updated_at.date(),
        );
    }
    out
}

/// Full view of one dispute: fields, timeline, economics, correspondence and
/// agent activity.
pub fn dispute_detail(d: &Dispute) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", d.id, d.origin);
    let _ = writeln!(out, "  status:    {} [{}]", d.status.label(), d.status);
    let _ = writeln!(out, "  vendor:    {}", d.vendor_name);
    let _ = writeln!(out, "  category:  {}", d.category);
    let _ = writeln!(out, "  value:     {}", money(d.estimated_value));
    if let Some(region) = &d.policy_region {
        let _ = writeln!(out, "  region:    {region}");
    }
    if let Some(flight) = &d.context.flight_number {
        let _ = writeln!(out, "  flight:    {flight}");
    }
    if let Some(booking) = &d.context.booking_ref {
        let _ = writeln!(out, "  booking:   {booking}");
    }
    if let Some(reason) = &d.latest_reason {
        let _ = writeln!(out, "  reason:    {reason}");
    }
    let _ = writeln!(out, "  created:   {}", d.created_at);
    let _ = writeln!(out, "  updated:   {}", d.updated_at);

    out.push_str("\nTimeline\n");
    for step in timeline(d.status) {
        let _ = writeln!(out, "  {} {}", marker(step.state), step.label);
    }

    if let Some(reasons) = d.ai_reasons.as_ref().filter(|r| !r.is_empty()) {
        out.push_str("\nEligibility\n");
        for reason in reasons {
            let _ = writeln!(out, "  - {reason}");
        }
    }

    if let Some(draft) = &d.draft_claim {
        out.push_str("\nDraft\n");
        for line in draft.lines() {
            let _ = writeln!(out, "  {line}");
        }
    }

    if let Some(econ) = Economics::for_dispute(d) {
        out.push_str("\nEconomics\n");
        let _ = writeln!(out, "  compute cost:    ${:.2}", econ.compute_cost_usd);
        let _ = writeln!(out, "  value generated: ${:.2}", econ.value_generated_usd);
        let _ = writeln!(out, "  margin:          {:.1}%", econ.margin_pct);
        let _ = writeln!(out, "  fee:             ${:.2}", econ.fee_usd);
    }

    if !d.messages.is_empty() {
        out.push_str("\nMessages\n");
        for m in &d.messages {
            let _ = writeln!(
                out,
                "  {}  {:<8}  {}",
                m.created_at.date(),
                m.direction,
                m.subject.as_deref().unwrap_or("(no subject)")
            );
        }
    }

    if !d.agent_runs.is_empty() {
        out.push_str("\nAgent runs\n");
        for run in &d.agent_runs {
            let at = run.created_at.map(|t| t.date()).unwrap_or_else(|| "-".into());
            let _ = writeln!(out, "  {at}  {:<20}  {}", run.step, run.status);
        }
    }

    if d.awaits_decision() {
        out.push_str("\nAwaiting your decision: `claims approve` or `claims reject`.\n");
    }
    out
}

pub fn summary(s: &PortfolioSummary) -> String {
    format!(
        "Capital recovered: ${:.2}\nActive disputes:   {}\nSuccess rate:      {}%\nTotal disputes:    {}\n",
        s.capital_recovered, s.active_count, s.success_rate_pct, s.total
    )
}

/// Result line of a decision or vendor reply.
pub fn outcome(o: &Outcome) -> String {
    match o {
        Outcome::Applied(d) => format!("{} is now {} ({})\n", d.id, d.status.label(), d.status),
        Outcome::Unchanged { dispute, reason } => {
            format!("{} unchanged ({}): {reason}\n", dispute.id, dispute.status)
        }
    }
}

fn marker(state: StepState) -> &'static str {
    match state {
        StepState::Completed => "[x]",
        StepState::Active => "[>]",
        StepState::Failed => "[!]",
        StepState::Pending => "[ ]",
    }
}

fn money(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".into())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max.saturating_sub(1)).collect();
        t.push('~');
        t
    }
}

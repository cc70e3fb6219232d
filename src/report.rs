//! Output for people and for the chart renderer.

use chrono::NaiveDate;
use serde::Serialize;

use crate::engine::pipeline::RunOutput;
use crate::engine::summary::Summary;
use crate::engine::{PolicyState, Segment};
use crate::settings::{Milestone, Settings};

const STRIP_WIDTH: usize = 60;

#[derive(Debug, Serialize)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct LegendEntry {
    pub state: PolicyState,
    pub color: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct EmployerTimeline<'a> {
    pub employer: &'a str,
    pub segments: &'a [Segment],
}

#[derive(Debug, Serialize)]
pub struct RejectedEmployer<'a> {
    pub employer: &'a str,
    pub reason: String,
}

/// Everything a renderer needs to draw the chart.
#[derive(Debug, Serialize)]
pub struct ChartDocument<'a> {
    pub window: Window,
    pub legend: Vec<LegendEntry>,
    pub milestones: &'a [Milestone],
    pub summary: Summary,
    pub timelines: Vec<EmployerTimeline<'a>>,
    pub rejected: Vec<RejectedEmployer<'a>>,
}

pub fn color(state: PolicyState) -> &'static str {
    match state {
        PolicyState::Wfh => "#2ecc71",
        PolicyState::Hybrid => "#f1c40f",
        PolicyState::Rto => "#e74c3c",
        PolicyState::RemoteFirst => "#3498db",
    }
}

pub fn label(state: PolicyState) -> &'static str {
    match state {
        PolicyState::Wfh => "Work From Home (Full Remote)",
        PolicyState::Hybrid => "Hybrid (2-4 days/week in office)",
        PolicyState::Rto => "5-Day Return to Office",
        PolicyState::RemoteFirst => "Remote-First (Permanent Policy)",
    }
}

fn glyph(state: PolicyState) -> char {
    match state {
        PolicyState::Wfh => 'W',
        PolicyState::Hybrid => 'H',
        PolicyState::Rto => 'R',
        PolicyState::RemoteFirst => 'F',
    }
}

pub fn chart_document<'a>(
    output: &'a RunOutput,
    summary: Summary,
    settings: &'a Settings,
) -> ChartDocument<'a> {
    ChartDocument {
        window: Window {
            start: settings.window_start,
            end: settings.horizon_end,
        },
        legend: PolicyState::ALL
            .iter()
            .map(|&state| LegendEntry {
                state,
                color: color(state),
                label: label(state),
            })
            .collect(),
        milestones: &settings.milestones,
        summary,
        timelines: output
            .entries
            .iter()
            .map(|e| EmployerTimeline {
                employer: e.record.name(),
                segments: &e.timeline,
            })
            .collect(),
        rejected: output
            .rejected
            .iter()
            .map(|r| RejectedEmployer {
                employer: r.record.name(),
                reason: r.error.to_string(),
            })
            .collect(),
    }
}

/// Fixed-width strip over `window`, one glyph per bucket; `.` where nothing applies.
pub fn strip(segments: &[Segment], window: &Window, width: usize) -> String {
    let total = (window.end - window.start).num_days().max(1);
    (0..width)
        .map(|i| {
            let offset = total * i as i64 / width as i64;
            let day = window.start + chrono::Duration::days(offset);
            segments
                .iter()
                .find(|s| s.start <= day && day < s.end)
                .map(|s| glyph(s.state))
                .unwrap_or('.')
        })
        .collect()
}

pub fn render_table(doc: &ChartDocument, limit: Option<usize>) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>3} | {:<24} | {:<w$} | Segments\n",
        "#",
        "Employer",
        format!("{} .. {}", doc.window.start.format("%Y-%m"), doc.window.end.format("%Y-%m")),
        w = STRIP_WIDTH
    ));
    out.push_str(&"-".repeat(STRIP_WIDTH + 45));
    out.push('\n');

    let shown = limit.unwrap_or(doc.timelines.len());
    for (i, t) in doc.timelines.iter().take(shown).enumerate() {
        let segments = t
            .segments
            .iter()
            .map(|s| format!("{} {}", s.state, s.start.format("%Y-%m-%d")))
            .collect::<Vec<_>>()
            .join(" → ");
        out.push_str(&format!(
            "{:>3} | {:<24} | {} | {}\n",
            i + 1,
            truncate(t.employer, 24),
            strip(t.segments, &doc.window, STRIP_WIDTH),
            segments
        ));
    }

    out.push_str("\nLegend: ");
    out.push_str(
        &doc.legend
            .iter()
            .map(|l| format!("{}={}", glyph(l.state), l.label))
            .collect::<Vec<_>>()
            .join(", "),
    );
    out.push('\n');
    for m in doc.milestones {
        out.push_str(&format!("Milestone {}: {}\n", m.date, m.label));
    }
    for r in &doc.rejected {
        out.push_str(&format!("Rejected {}: {}\n", r.employer, r.reason));
    }
    out.push_str(&format!("\n{}\n", doc.summary.headline()));
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max - 3).collect();
        format!("{}...", truncated)
    }
}

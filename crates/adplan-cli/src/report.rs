//! Plain-text, markdown, and JSON renderings of a plan outcome.

use std::path::Path;

use adplan_core::{AverageMetrics, PlanOutcome, ScoredLocation};
use anyhow::Context;
use chrono::{DateTime, Utc};

const NAME_WIDTH: usize = 28;

/// Format an optional amount, returning an em dash placeholder when `None`.
fn fmt_amount(amount: Option<f64>) -> String {
    amount.map_or_else(|| "\u{2014}".to_string(), |a| format!("{a:.2}"))
}

fn display_name(name: &str) -> String {
    if name.chars().count() > NAME_WIDTH - 2 {
        format!(
            "{}...",
            name.chars().take(NAME_WIDTH - 5).collect::<String>()
        )
    } else {
        name.to_string()
    }
}

fn ranking_header() -> String {
    format!(
        "{:<6}{:<NAME_WIDTH$}{:>12}{:>12}{:>12}",
        "RANK", "LOCATION", "SCORE", "REACH", "AD COST"
    )
}

fn ranking_row(rank: usize, location: &ScoredLocation) -> String {
    format!(
        "{:<6}{:<NAME_WIDTH$}{:>12.4}{:>12}{:>12.2}",
        rank,
        display_name(location.name()),
        location.score(),
        location.audience_reach(),
        location.ad_cost()
    )
}

/// Fixed-width ranking table.
pub(crate) fn render_ranking(outcome: &PlanOutcome) -> String {
    let mut lines = vec![
        format!(
            "{} of {} locations eligible; showing top {}",
            outcome.eligible.len(),
            outcome.candidates,
            outcome.ranking.len()
        ),
        String::new(),
        ranking_header(),
    ];
    for (idx, location) in outcome.ranking.iter().enumerate() {
        lines.push(ranking_row(idx + 1, location));
    }
    lines.push(String::new());
    lines.join("\n")
}

/// Ranking table extended with allocation columns and budget totals.
///
/// Locations without an allocation are shown as `0.00`.
pub(crate) fn render_allocation(outcome: &PlanOutcome) -> String {
    let mut lines = vec![format!(
        "{}{:>14}{:>14}",
        ranking_header(),
        "ALLOCATED",
        "OPTIMAL"
    )];
    for (idx, location) in outcome.ranking.iter().enumerate() {
        lines.push(format!(
            "{}{:>14.2}{:>14}",
            ranking_row(idx + 1, location),
            location.allocated_budget().unwrap_or(0.0),
            fmt_amount(location.optimal_spending())
        ));
    }

    if let Some(budget) = &outcome.budget {
        lines.push(String::new());
        lines.push(format!("Total budget:     {:>14.2}", budget.total_budget));
        lines.push(format!("Allocated:        {:>14.2}", budget.allocated_total()));
        lines.push(format!("Remaining budget: {:>14.2}", budget.remaining_budget));
    }
    if let Some(warning) = &outcome.allocation_warning {
        lines.push(String::new());
        lines.push(format!("warning: {warning}"));
    }
    lines.push(String::new());
    lines.join("\n")
}

/// Markdown report with metrics, ranking, and allocation sections.
pub(crate) fn render_markdown(outcome: &PlanOutcome, generated_at: DateTime<Utc>) -> String {
    let now = generated_at.format("%Y-%m-%d %H:%M UTC");
    let mut lines = vec![
        "# Advertising Location Plan".to_string(),
        String::new(),
        format!("**Generated**: {now}"),
        format!(
            "**Eligible locations**: {} of {}",
            outcome.eligible.len(),
            outcome.candidates
        ),
        String::new(),
        "## Audience".to_string(),
        String::new(),
        format!("- Average age: {:.1}", outcome.metrics.avg_age),
        format!("- Average income: {:.2}", outcome.metrics.avg_income),
        format!(
            "- Average employed percentage: {:.1}%",
            outcome.metrics.avg_employed_percentage
        ),
        String::new(),
        "## Ranking".to_string(),
        String::new(),
        "| Rank | Location | Score | Reach | Ad Cost | Allocated | Optimal |".to_string(),
        "|------|----------|-------|-------|---------|-----------|---------|".to_string(),
    ];

    for (idx, location) in outcome.ranking.iter().enumerate() {
        lines.push(format!(
            "| {} | {} | {:.4} | {} | {:.2} | {:.2} | {} |",
            idx + 1,
            location.name().replace('|', "\\|"),
            location.score(),
            location.audience_reach(),
            location.ad_cost(),
            location.allocated_budget().unwrap_or(0.0),
            fmt_amount(location.optimal_spending())
        ));
    }

    if let Some(budget) = &outcome.budget {
        lines.push(String::new());
        lines.push("## Budget".to_string());
        lines.push(String::new());
        lines.push(format!("**Total**: {:.2}", budget.total_budget));
        lines.push(format!("**Allocated**: {:.2}", budget.allocated_total()));
        lines.push(format!("**Remaining**: {:.2}", budget.remaining_budget));
    }
    if let Some(warning) = &outcome.allocation_warning {
        lines.push(String::new());
        lines.push(format!("> **Warning**: {warning}"));
    }
    lines.push(String::new());
    lines.join("\n")
}

pub(crate) fn render_json(outcome: &PlanOutcome) -> serde_json::Result<String> {
    serde_json::to_string_pretty(outcome).map(|mut s| {
        s.push('\n');
        s
    })
}

pub(crate) fn render_metrics(candidates: usize, eligible: usize, metrics: &AverageMetrics) -> String {
    [
        format!("Eligible locations:          {eligible} of {candidates}"),
        format!("Average age:                 {:.1}", metrics.avg_age),
        format!("Average income:              {:.2}", metrics.avg_income),
        format!(
            "Average employed percentage: {:.1}%",
            metrics.avg_employed_percentage
        ),
        String::new(),
    ]
    .join("\n")
}

/// Write `content` to `path`, creating parent directories as needed.
pub(crate) fn write_report(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

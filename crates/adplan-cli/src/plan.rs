//! Command handlers for `rank`, `allocate`, and `metrics`.
//!
//! Each handler resolves its inputs (flags, campaign file, environment
//! defaults), loads the location data, runs the core pipeline, and hands the
//! outcome to the renderers in [`crate::report`].

use std::path::{Path, PathBuf};

use adplan_core::{
    AppConfig, AudienceCriteria, BudgetAdjustment, IntRange, LocationTable, PlanRequest,
};
use anyhow::Context;
use clap::{Args, ValueEnum};

use crate::report;

/// Data source and audience criteria shared by every command.
#[derive(Debug, Clone, Args)]
pub struct FilterArgs {
    /// Location data file, .csv or .json (defaults to ADPLAN_DATA_PATH)
    #[arg(long)]
    pub data: Option<PathBuf>,
    /// Inclusive age range, e.g. 25-40 or -5-10
    #[arg(long, value_name = "MIN-MAX", allow_hyphen_values = true)]
    pub age_range: Option<IntRange>,
    /// Inclusive income range, e.g. 40000-90000
    #[arg(long, value_name = "MIN-MAX", allow_hyphen_values = true)]
    pub income_range: Option<IntRange>,
    /// Minimum employed share of the population, 0-100
    #[arg(long, value_name = "PCT")]
    pub min_employed: Option<f64>,
}

impl FilterArgs {
    fn criteria(&self) -> AudienceCriteria {
        AudienceCriteria {
            age_range: self.age_range,
            income_range: self.income_range,
            min_employed_percentage: self.min_employed,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct RankArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Number of locations to keep (defaults to ADPLAN_TOP_N or 24)
    #[arg(long)]
    pub top_n: Option<usize>,
    /// YAML campaign file with criteria, budget, and adjustments
    /// (defaults to ADPLAN_CAMPAIGN_PATH)
    #[arg(long)]
    pub campaign: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct MetricsArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
    /// YAML campaign file supplying default criteria (defaults to ADPLAN_CAMPAIGN_PATH)
    #[arg(long)]
    pub campaign: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct AllocateArgs {
    #[command(flatten)]
    pub rank: RankArgs,
    /// Total budget to distribute (defaults to ADPLAN_TOTAL_BUDGET)
    #[arg(long)]
    pub budget: Option<f64>,
    /// Manual override applied after allocation, as NAME=AMOUNT (repeatable)
    #[arg(long = "adjust", value_name = "NAME=AMOUNT")]
    pub adjustments: Vec<BudgetAdjustment>,
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: ReportFormat,
    /// Write the report to this file; relative paths resolve under ADPLAN_REPORT_DIR
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Markdown,
    Json,
}

/// Rank eligible locations and print the ranking table.
///
/// # Errors
///
/// Returns an error if inputs cannot be resolved or loaded, or the pipeline
/// rejects the data.
pub(crate) fn run_rank(config: &AppConfig, args: &RankArgs) -> anyhow::Result<()> {
    let table = load_table(config, &args.filter)?;
    let mut request = build_request(config, args, None, &[])?;
    // Ranking never allocates, even if the campaign file names a budget.
    request.total_budget = None;
    request.adjustments.clear();

    let outcome = adplan_core::run_plan(&table, &request)?;
    if outcome.ranking.is_empty() {
        println!(
            "no locations matched the audience criteria ({} candidates)",
            outcome.candidates
        );
        return Ok(());
    }
    print!("{}", report::render_ranking(&outcome));
    Ok(())
}

/// Rank, allocate, and emit the allocation report.
///
/// # Errors
///
/// Returns an error if no budget is configured, inputs cannot be loaded, the
/// pipeline rejects the data, or the report cannot be written.
pub(crate) fn run_allocate(config: &AppConfig, args: &AllocateArgs) -> anyhow::Result<()> {
    let table = load_table(config, &args.rank.filter)?;
    let request = build_request(config, &args.rank, args.budget, &args.adjustments)?;
    if request.total_budget.is_none() {
        anyhow::bail!(
            "no budget given; pass --budget, set total_budget in the campaign file, or set ADPLAN_TOTAL_BUDGET"
        );
    }

    let outcome = adplan_core::run_plan(&table, &request)?;
    if let Some(warning) = &outcome.allocation_warning {
        eprintln!("warning: {warning}");
    }

    let rendered = match args.format {
        ReportFormat::Text => report::render_allocation(&outcome),
        ReportFormat::Markdown => report::render_markdown(&outcome, chrono::Utc::now()),
        ReportFormat::Json => report::render_json(&outcome)?,
    };

    match &args.output {
        Some(output) => {
            let path = resolve_output_path(&config.report_dir, output);
            report::write_report(&path, &rendered)?;
            tracing::info!(path = %path.display(), "report written");
            println!("report written to {}", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

/// Print average demographics of the locations passing the filter.
///
/// # Errors
///
/// Returns an error if the data or campaign file cannot be loaded, or the
/// criteria are invalid.
pub(crate) fn run_metrics(config: &AppConfig, args: &MetricsArgs) -> anyhow::Result<()> {
    let table = load_table(config, &args.filter)?;
    let request = base_request(config, &args.filter, args.campaign.as_ref())?;
    let eligible = adplan_core::filter_locations(table.iter(), &request.criteria)?;
    let metrics = adplan_core::average_metrics(&table, &eligible)?;
    print!(
        "{}",
        report::render_metrics(table.len(), eligible.len(), &metrics)
    );
    Ok(())
}

fn load_table(config: &AppConfig, filter: &FilterArgs) -> anyhow::Result<LocationTable> {
    let path = filter
        .data
        .as_ref()
        .or(config.data_path.as_ref())
        .ok_or_else(|| {
            anyhow::anyhow!("no location data given; pass --data or set ADPLAN_DATA_PATH")
        })?;
    adplan_core::load_locations(path)
        .with_context(|| format!("failed to load locations from {}", path.display()))
}

/// Environment defaults overlaid with the campaign file and the filter flags,
/// in increasing order of precedence.
fn base_request(
    config: &AppConfig,
    filter: &FilterArgs,
    campaign: Option<&PathBuf>,
) -> anyhow::Result<PlanRequest> {
    let mut request = PlanRequest {
        top_n: config.top_n,
        total_budget: config.total_budget,
        ..PlanRequest::default()
    };

    if let Some(path) = campaign.or(config.campaign_path.as_ref()) {
        let file = adplan_core::load_campaign(path)
            .with_context(|| format!("failed to load campaign {}", path.display()))?;
        file.apply_to(&mut request);
    }

    let flags = filter.criteria();
    if flags.age_range.is_some() {
        request.criteria.age_range = flags.age_range;
    }
    if flags.income_range.is_some() {
        request.criteria.income_range = flags.income_range;
    }
    if flags.min_employed_percentage.is_some() {
        request.criteria.min_employed_percentage = flags.min_employed_percentage;
    }
    Ok(request)
}

/// Merge environment defaults, the campaign file, and command-line flags, in
/// increasing order of precedence.
pub(crate) fn build_request(
    config: &AppConfig,
    args: &RankArgs,
    budget: Option<f64>,
    adjustments: &[BudgetAdjustment],
) -> anyhow::Result<PlanRequest> {
    let mut request = base_request(config, &args.filter, args.campaign.as_ref())?;
    if let Some(top_n) = args.top_n {
        request.top_n = top_n;
    }
    if budget.is_some() {
        request.total_budget = budget;
    }
    request.adjustments.extend_from_slice(adjustments);

    Ok(request)
}

fn resolve_output_path(report_dir: &Path, output: &Path) -> PathBuf {
    if output.is_absolute() {
        output.to_path_buf()
    } else {
        report_dir.join(output)
    }
}

//! Planning pipeline orchestration.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::budget::{BudgetAllocator, BudgetSummary};
use crate::filter::{filter_locations, AudienceCriteria};
use crate::record::LocationTable;
use crate::scorer::{average_metrics, AverageMetrics, LocationScorer, ScoredLocation, DEFAULT_TOP_N};
use crate::PlanError;

/// A manual budget override applied after proportional allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAdjustment {
    pub location: String,
    pub budget: f64,
}

impl FromStr for BudgetAdjustment {
    type Err = String;

    /// Parses `NAME=AMOUNT`. The split is on the last `=`, so names may contain `=`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (location, amount) = s
            .rsplit_once('=')
            .ok_or_else(|| format!("expected NAME=AMOUNT, got '{s}'"))?;
        let location = location.trim();
        if location.is_empty() {
            return Err(format!("missing location name in '{s}'"));
        }
        let budget = amount
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid amount '{amount}': {e}"))?;
        Ok(BudgetAdjustment {
            location: location.to_string(),
            budget,
        })
    }
}

/// Inputs for one planning run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub criteria: AudienceCriteria,
    pub top_n: usize,
    /// No allocation stage runs when absent.
    pub total_budget: Option<f64>,
    pub adjustments: Vec<BudgetAdjustment>,
}

impl Default for PlanRequest {
    fn default() -> Self {
        Self {
            criteria: AudienceCriteria::default(),
            top_n: DEFAULT_TOP_N,
            total_budget: None,
            adjustments: Vec::new(),
        }
    }
}

/// Everything a report needs from one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanOutcome {
    pub candidates: usize,
    pub eligible: Vec<String>,
    pub metrics: AverageMetrics,
    pub ranking: Vec<ScoredLocation>,
    pub budget: Option<BudgetSummary>,
    /// Set when allocation was skipped because no location had a usable score.
    pub allocation_warning: Option<String>,
}

/// Run filter, scoring, ranking and (when a budget is given) allocation.
///
/// 1. Filter the table by the audience criteria.
/// 2. Average the demographics of the eligible locations.
/// 3. Score every eligible location and keep the top `top_n`.
/// 4. Allocate the budget, apply manual adjustments in order, then finalize.
///
/// An allocation failure is recorded on the outcome and logged; the ranking is
/// still returned.
///
/// # Errors
///
/// Returns [`PlanError::Validation`] or [`PlanError::Division`] from any stage;
/// [`PlanError::Allocation`] is never returned.
pub fn run_plan(records: &LocationTable, request: &PlanRequest) -> Result<PlanOutcome, PlanError> {
    if request.top_n == 0 {
        return Err(PlanError::validation(
            "request",
            "top_n",
            "must be at least 1",
        ));
    }

    let eligible = filter_locations(records.iter(), &request.criteria)?;
    let metrics = average_metrics(records, &eligible)?;

    let mut scorer = LocationScorer::new();
    for name in &eligible {
        let record = records.get(name).ok_or_else(|| {
            PlanError::validation(name.as_str(), "location", "unknown location name")
        })?;
        scorer.add_record(name, record)?;
    }
    let mut ranking = scorer.rank(request.top_n);

    let mut allocation_warning = None;
    let budget = match request.total_budget {
        Some(total_budget) => {
            let mut allocator = BudgetAllocator::new(total_budget, &mut ranking)?;
            match allocator.allocate() {
                Ok(()) => {}
                Err(e) if e.is_recoverable() => {
                    tracing::warn!(error = %e, "allocation skipped; ranking is still reported");
                    allocation_warning = Some(e.to_string());
                }
                Err(e) => return Err(e),
            }
            for adjustment in &request.adjustments {
                allocator.adjust_allocation(&adjustment.location, adjustment.budget)?;
            }
            allocator.finalize_optimal_spending();
            Some(allocator.summary())
        }
        None => {
            if !request.adjustments.is_empty() {
                tracing::warn!(
                    adjustments = request.adjustments.len(),
                    "budget adjustments ignored because no total budget was given"
                );
            }
            None
        }
    };

    tracing::info!(
        candidates = records.len(),
        eligible = eligible.len(),
        ranked = ranking.len(),
        allocated = budget.is_some() && allocation_warning.is_none(),
        "plan complete"
    );

    Ok(PlanOutcome {
        candidates: records.len(),
        eligible,
        metrics,
        ranking,
        budget,
        allocation_warning,
    })
}

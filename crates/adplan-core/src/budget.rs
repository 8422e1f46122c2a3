//! Proportional budget allocation over a ranked set of locations.
//!
//! Each location receives `score / Σ score` of the total budget. Manual
//! adjustments overwrite a single location without renormalizing the rest, so
//! the remaining budget is always derived from the current allocations rather
//! than assumed to be zero.

use serde::Serialize;

use crate::scorer::ScoredLocation;
use crate::PlanError;

/// Per-location line of a [`BudgetSummary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationAllocation {
    pub location: String,
    /// `0.0` when the location was never allocated.
    pub allocated_budget: f64,
    pub optimal_spending: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSummary {
    pub total_budget: f64,
    pub per_location: Vec<LocationAllocation>,
    pub remaining_budget: f64,
}

impl BudgetSummary {
    #[must_use]
    pub fn allocated_total(&self) -> f64 {
        self.per_location.iter().map(|l| l.allocated_budget).sum()
    }
}

/// Distributes a fixed budget across a borrowed ranking.
#[derive(Debug)]
pub struct BudgetAllocator<'a> {
    total_budget: f64,
    locations: &'a mut [ScoredLocation],
}

impl<'a> BudgetAllocator<'a> {
    /// # Errors
    ///
    /// Returns [`PlanError::Validation`] if `total_budget` is negative or not finite.
    pub fn new(total_budget: f64, locations: &'a mut [ScoredLocation]) -> Result<Self, PlanError> {
        validate_amount("total_budget", "budget", total_budget)?;
        Ok(Self {
            total_budget,
            locations,
        })
    }

    #[must_use]
    pub fn total_budget(&self) -> f64 {
        self.total_budget
    }

    #[must_use]
    pub fn locations(&self) -> &[ScoredLocation] {
        &*self.locations
    }

    /// Assign every location its proportional share of the total budget.
    ///
    /// Re-running overwrites previous shares.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Allocation`] when the scores sum to zero; no
    /// location is modified in that case.
    #[allow(clippy::float_cmp)]
    pub fn allocate(&mut self) -> Result<(), PlanError> {
        // Shares are taken over scores scaled by the maximum so the sum stays
        // finite even when individual scores are near `f64::MAX`.
        let max_score = self
            .locations
            .iter()
            .map(ScoredLocation::score)
            .fold(0.0_f64, f64::max);
        let total_score: f64 = if max_score > 0.0 {
            self.locations.iter().map(|l| l.score() / max_score).sum()
        } else {
            0.0
        };
        if total_score == 0.0 || !total_score.is_finite() {
            return Err(PlanError::Allocation {
                reason: format!(
                    "no valid efficiency signal across {} location(s); total score is zero",
                    self.locations.len()
                ),
            });
        }

        for location in self.locations.iter_mut() {
            let share = (location.score() / max_score) / total_score;
            location.allocate(share * self.total_budget);
        }

        tracing::debug!(
            locations = self.locations.len(),
            total_budget = self.total_budget,
            max_score,
            "budget allocated"
        );
        Ok(())
    }

    /// Overwrite the budget of the first location named `location_name`.
    ///
    /// Other locations keep their amounts; use [`BudgetAllocator::remaining_budget`]
    /// to see the effect on the overall balance.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Validation`] if no ranked location has that name or
    /// `new_budget` is negative or not finite.
    pub fn adjust_allocation(&mut self, location_name: &str, new_budget: f64) -> Result<(), PlanError> {
        validate_amount(location_name, "budget", new_budget)?;
        let location = self
            .locations
            .iter_mut()
            .find(|l| l.name() == location_name)
            .ok_or_else(|| {
                PlanError::validation(location_name, "location", "not in the ranked set")
            })?;

        let previous = location.allocated_budget();
        location.override_budget(new_budget);
        tracing::info!(
            location = location_name,
            previous = ?previous,
            new_budget,
            "manual budget adjustment"
        );
        Ok(())
    }

    /// Snapshot each location's current allocation as its optimal spending.
    pub fn finalize_optimal_spending(&mut self) {
        for location in self.locations.iter_mut() {
            location.finalize();
        }
    }

    /// Total budget minus everything currently allocated (absent counts as zero).
    #[must_use]
    pub fn remaining_budget(&self) -> f64 {
        let allocated: f64 = self
            .locations
            .iter()
            .map(|l| l.allocated_budget().unwrap_or(0.0))
            .sum();
        self.total_budget - allocated
    }

    #[must_use]
    pub fn summary(&self) -> BudgetSummary {
        BudgetSummary {
            total_budget: self.total_budget,
            per_location: self
                .locations
                .iter()
                .map(|l| LocationAllocation {
                    location: l.name().to_string(),
                    allocated_budget: l.allocated_budget().unwrap_or(0.0),
                    optimal_spending: l.optimal_spending(),
                })
                .collect(),
            remaining_budget: self.remaining_budget(),
        }
    }
}

fn validate_amount(subject: &str, field: &'static str, amount: f64) -> Result<(), PlanError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(PlanError::validation(
            subject,
            field,
            format!("must be a finite amount >= 0, got {amount}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "budget_test.rs"]
mod tests;

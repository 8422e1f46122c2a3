//! Cost-efficiency scoring and ranking of eligible locations.

use serde::Serialize;

use crate::record::{validate_non_negative, LocationTable};
use crate::{LocationRecord, PlanError};

/// Number of locations returned by [`LocationScorer::rank`] when the caller
/// does not ask for a specific count.
pub const DEFAULT_TOP_N: usize = 24;

/// Numeric value of [`EfficiencyScore::NoCost`].
pub const NO_COST_SCORE: f64 = 0.0;

/// Audience reach per unit of ad spend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EfficiencyScore {
    PerDollar(f64),
    /// The location has zero ad cost; it scores [`NO_COST_SCORE`] rather than
    /// an unbounded ratio.
    NoCost,
}

impl EfficiencyScore {
    #[must_use]
    pub fn value(self) -> f64 {
        match self {
            EfficiencyScore::PerDollar(v) => v,
            EfficiencyScore::NoCost => NO_COST_SCORE,
        }
    }
}

/// Budget lifecycle of a scored location.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum AllocationState {
    #[default]
    Scored,
    Allocated {
        budget: f64,
    },
    /// `optimal_spending` is the allocation captured at finalize time; later
    /// manual adjustments only move `budget`.
    Finalized {
        budget: f64,
        optimal_spending: f64,
    },
}

/// A location with its reach and score fixed at insertion time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredLocation {
    location_name: String,
    ad_cost: f64,
    audience_reach: i64,
    efficiency: EfficiencyScore,
    state: AllocationState,
}

impl ScoredLocation {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.location_name
    }

    #[must_use]
    pub fn ad_cost(&self) -> f64 {
        self.ad_cost
    }

    #[must_use]
    pub fn audience_reach(&self) -> i64 {
        self.audience_reach
    }

    #[must_use]
    pub fn efficiency(&self) -> EfficiencyScore {
        self.efficiency
    }

    /// The ranking key, with the zero-cost sentinel resolved to its value.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.efficiency.value()
    }

    #[must_use]
    pub fn state(&self) -> AllocationState {
        self.state
    }

    #[must_use]
    pub fn allocated_budget(&self) -> Option<f64> {
        match self.state {
            AllocationState::Scored => None,
            AllocationState::Allocated { budget } | AllocationState::Finalized { budget, .. } => {
                Some(budget)
            }
        }
    }

    #[must_use]
    pub fn optimal_spending(&self) -> Option<f64> {
        match self.state {
            AllocationState::Finalized {
                optimal_spending, ..
            } => Some(optimal_spending),
            _ => None,
        }
    }

    /// Set a fresh proportional share; any finalize snapshot is discarded.
    pub(crate) fn allocate(&mut self, budget: f64) {
        self.state = AllocationState::Allocated { budget };
    }

    /// Overwrite the allocated amount, keeping a finalize snapshot if present.
    pub(crate) fn override_budget(&mut self, budget: f64) {
        self.state = match self.state {
            AllocationState::Finalized {
                optimal_spending, ..
            } => AllocationState::Finalized {
                budget,
                optimal_spending,
            },
            _ => AllocationState::Allocated { budget },
        };
    }

    pub(crate) fn finalize(&mut self) {
        if let Some(budget) = self.allocated_budget() {
            self.state = AllocationState::Finalized {
                budget,
                optimal_spending: budget,
            };
        }
    }
}

/// Estimated audience: foot traffic scaled by the employed share of the
/// population, rounded half-to-even.
///
/// # Errors
///
/// Returns [`PlanError::Division`] if `population` is zero.
pub fn audience_reach(
    location: &str,
    foot_traffic: i64,
    employed_population: i64,
    population: i64,
) -> Result<i64, PlanError> {
    if population == 0 {
        return Err(PlanError::division(location, "audience reach"));
    }
    #[allow(clippy::cast_precision_loss)]
    let reach = foot_traffic as f64 * (employed_population as f64 / population as f64);
    #[allow(clippy::cast_possible_truncation)]
    let rounded = reach.round_ties_even() as i64;
    Ok(rounded)
}

/// Reach per dollar, or [`EfficiencyScore::NoCost`] for a free location.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn efficiency_score(audience_reach: i64, ad_cost: f64) -> EfficiencyScore {
    if ad_cost == 0.0 {
        EfficiencyScore::NoCost
    } else {
        #[allow(clippy::cast_precision_loss)]
        let reach = audience_reach as f64;
        EfficiencyScore::PerDollar(reach / ad_cost)
    }
}

/// Append-only collection of scored locations, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct LocationScorer {
    locations: Vec<ScoredLocation>,
}

impl LocationScorer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Score one location and append it.
    ///
    /// Names are not de-duplicated; adding the same name twice yields two entries.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Division`] if `population` is zero, and
    /// [`PlanError::Validation`] if `population` is negative, any of
    /// `ad_cost`, `foot_traffic`, `employed_population` is negative, or the
    /// cost is so small that reach per dollar overflows.
    pub fn add_location(
        &mut self,
        name: &str,
        ad_cost: f64,
        foot_traffic: i64,
        employed_population: i64,
        population: i64,
    ) -> Result<(), PlanError> {
        if population < 0 {
            return Err(PlanError::validation(
                name,
                "population",
                format!("must be > 0, got {population}"),
            ));
        }
        if employed_population < 0 {
            return Err(PlanError::validation(
                name,
                "employed_population",
                format!("must be >= 0, got {employed_population}"),
            ));
        }
        validate_non_negative(name, ad_cost, foot_traffic)?;

        let reach = audience_reach(name, foot_traffic, employed_population, population)?;
        let efficiency = efficiency_score(reach, ad_cost);
        if !efficiency.value().is_finite() {
            return Err(PlanError::validation(
                name,
                "ad_cost",
                format!("{ad_cost} is too small to score reach {reach}"),
            ));
        }

        tracing::debug!(
            location = name,
            audience_reach = reach,
            score = efficiency.value(),
            "scored location"
        );

        self.locations.push(ScoredLocation {
            location_name: name.to_string(),
            ad_cost,
            audience_reach: reach,
            efficiency,
            state: AllocationState::Scored,
        });
        Ok(())
    }

    /// # Errors
    ///
    /// See [`LocationScorer::add_location`].
    pub fn add_record(&mut self, name: &str, record: &LocationRecord) -> Result<(), PlanError> {
        self.add_location(
            name,
            record.ad_cost,
            record.foot_traffic,
            record.employed_population,
            record.population,
        )
    }

    /// The `top_n` best-scoring locations, highest score first.
    ///
    /// The sort is stable, so equal scores keep their insertion order.
    #[must_use]
    pub fn rank(&self, top_n: usize) -> Vec<ScoredLocation> {
        let mut ranked = self.locations.clone();
        ranked.sort_by(|a, b| b.score().total_cmp(&a.score()));
        ranked.truncate(top_n);
        ranked
    }

    #[must_use]
    pub fn locations(&self) -> &[ScoredLocation] {
        &self.locations
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// Mean demographics over a subset of locations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AverageMetrics {
    pub avg_age: f64,
    pub avg_income: f64,
    pub avg_employed_percentage: f64,
}

/// Average age, income, and employed percentage of the named locations.
///
/// An empty subset yields all zeros.
///
/// # Errors
///
/// Returns [`PlanError::Validation`] if a name is not in `records`, or
/// [`PlanError::Division`] if a record has zero population.
pub fn average_metrics(
    records: &LocationTable,
    location_names: &[String],
) -> Result<AverageMetrics, PlanError> {
    if location_names.is_empty() {
        return Ok(AverageMetrics::default());
    }

    let mut age_sum = 0.0_f64;
    let mut income_sum = 0.0_f64;
    let mut employed_sum = 0.0_f64;
    for name in location_names {
        let record = records
            .get(name)
            .ok_or_else(|| PlanError::validation(name.as_str(), "location", "unknown location name"))?;
        #[allow(clippy::cast_precision_loss)]
        let (age, income) = (record.age as f64, record.income as f64);
        age_sum += age;
        income_sum += income;
        employed_sum += record.employed_percentage(name)?;
    }

    #[allow(clippy::cast_precision_loss)]
    let count = location_names.len() as f64;
    Ok(AverageMetrics {
        avg_age: age_sum / count,
        avg_income: income_sum / count,
        avg_employed_percentage: employed_sum / count,
    })
}

#[cfg(test)]
#[path = "scorer_test.rs"]
mod tests;

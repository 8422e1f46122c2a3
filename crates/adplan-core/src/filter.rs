//! Audience filter: selects the locations whose demographics match the
//! requested age, income, and employment criteria.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::record::LocationRecord;
use crate::PlanError;

/// Inclusive integer interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRange {
    pub min: i64,
    pub max: i64,
}

impl IntRange {
    #[must_use]
    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    fn validate(&self, field: &'static str) -> Result<(), PlanError> {
        if self.min > self.max {
            return Err(PlanError::validation(
                "criteria",
                field,
                format!("range minimum {} exceeds maximum {}", self.min, self.max),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for IntRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

impl FromStr for IntRange {
    type Err = String;

    /// Parses `MIN-MAX`, e.g. `25-40`. Either bound may carry a sign, as in `-5-10`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.trim();
        let sign_len = usize::from(body.starts_with(['-', '+']));
        let split_at = body[sign_len..]
            .find('-')
            .map(|idx| idx + sign_len)
            .ok_or_else(|| format!("expected MIN-MAX, got '{s}'"))?;
        let (min, max) = (&body[..split_at], &body[split_at + 1..]);
        let min = min
            .trim()
            .parse::<i64>()
            .map_err(|e| format!("invalid range minimum '{min}': {e}"))?;
        let max = max
            .trim()
            .parse::<i64>()
            .map_err(|e| format!("invalid range maximum '{max}': {e}"))?;
        Ok(IntRange { min, max })
    }
}

/// Optional audience criteria. A location must satisfy every criterion that is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudienceCriteria {
    #[serde(default)]
    pub age_range: Option<IntRange>,
    #[serde(default)]
    pub income_range: Option<IntRange>,
    #[serde(default)]
    pub min_employed_percentage: Option<f64>,
}

impl AudienceCriteria {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.age_range.is_none()
            && self.income_range.is_none()
            && self.min_employed_percentage.is_none()
    }

    /// # Errors
    ///
    /// Returns [`PlanError::Validation`] for an inverted range or a percentage
    /// that is not a finite value in `[0, 100]`.
    pub fn validate(&self) -> Result<(), PlanError> {
        if let Some(range) = &self.age_range {
            range.validate("age_range")?;
        }
        if let Some(range) = &self.income_range {
            range.validate("income_range")?;
        }
        if let Some(pct) = self.min_employed_percentage {
            if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
                return Err(PlanError::validation(
                    "criteria",
                    "min_employed_percentage",
                    format!("must be between 0 and 100, got {pct}"),
                ));
            }
        }
        Ok(())
    }

    fn matches(&self, name: &str, record: &LocationRecord) -> Result<bool, PlanError> {
        if let Some(range) = &self.age_range {
            if !range.contains(record.age) {
                return Ok(false);
            }
        }
        if let Some(range) = &self.income_range {
            if !range.contains(record.income) {
                return Ok(false);
            }
        }
        if let Some(min_pct) = self.min_employed_percentage {
            if record.employed_percentage(name)? < min_pct {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Return the names of the locations satisfying `criteria`, in input order.
///
/// With no criteria set every name passes through unchanged.
///
/// # Errors
///
/// Returns [`PlanError::Validation`] if the criteria are malformed, or
/// [`PlanError::Division`] if a record with zero population is evaluated
/// against the employment threshold.
pub fn filter_locations<'a, I>(records: I, criteria: &AudienceCriteria) -> Result<Vec<String>, PlanError>
where
    I: IntoIterator<Item = (&'a str, &'a LocationRecord)>,
{
    criteria.validate()?;

    let mut candidates = 0_usize;
    let mut eligible = Vec::new();
    for (name, record) in records {
        candidates += 1;
        if criteria.is_empty() || criteria.matches(name, record)? {
            eligible.push(name.to_string());
        }
    }

    tracing::debug!(
        candidates,
        eligible = eligible.len(),
        "audience filter applied"
    );
    Ok(eligible)
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;

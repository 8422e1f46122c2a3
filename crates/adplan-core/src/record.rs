//! Location input records and the insertion-ordered table that holds them.

use serde::{Deserialize, Serialize};

use crate::PlanError;

/// Demographic and cost data for one candidate location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub age: i64,
    pub income: i64,
    pub employed_population: i64,
    pub population: i64,
    pub ad_cost: f64,
    pub foot_traffic: i64,
}

impl LocationRecord {
    /// Check the record's domain constraints.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Validation`] naming `location` and the offending
    /// field if population is not positive, or if ad cost, foot traffic, or
    /// employed population is negative.
    pub fn validate(&self, location: &str) -> Result<(), PlanError> {
        if self.population <= 0 {
            return Err(PlanError::validation(
                location,
                "population",
                format!("must be > 0, got {}", self.population),
            ));
        }
        validate_non_negative(location, self.ad_cost, self.foot_traffic)?;
        if self.employed_population < 0 {
            return Err(PlanError::validation(
                location,
                "employed_population",
                format!("must be >= 0, got {}", self.employed_population),
            ));
        }
        Ok(())
    }

    /// Employed share of the population as a percentage.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Division`] if population is zero.
    pub fn employed_percentage(&self, location: &str) -> Result<f64, PlanError> {
        if self.population == 0 {
            return Err(PlanError::division(location, "employed percentage"));
        }
        #[allow(clippy::cast_precision_loss)]
        let pct = self.employed_population as f64 / self.population as f64 * 100.0;
        Ok(pct)
    }
}

/// Shared guard for the cost/traffic inputs used by both the table and the scorer.
pub(crate) fn validate_non_negative(
    location: &str,
    ad_cost: f64,
    foot_traffic: i64,
) -> Result<(), PlanError> {
    if !ad_cost.is_finite() || ad_cost < 0.0 {
        return Err(PlanError::validation(
            location,
            "ad_cost",
            format!("must be a finite value >= 0, got {ad_cost}"),
        ));
    }
    if foot_traffic < 0 {
        return Err(PlanError::validation(
            location,
            "foot_traffic",
            format!("must be >= 0, got {foot_traffic}"),
        ));
    }
    Ok(())
}

/// Location records keyed by unique name, iterated in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocationTable {
    entries: Vec<(String, LocationRecord)>,
}

impl LocationTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a record.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Validation`] if the name is blank or already
    /// present, or if the record fails [`LocationRecord::validate`].
    pub fn insert(&mut self, name: impl Into<String>, record: LocationRecord) -> Result<(), PlanError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(PlanError::validation(
                name,
                "location",
                "name must be non-empty",
            ));
        }
        if self.get(&name).is_some() {
            return Err(PlanError::validation(
                name,
                "location",
                "duplicate location name",
            ));
        }
        record.validate(&name)?;
        self.entries.push((name, record));
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LocationRecord> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LocationRecord)> {
        self.entries.iter().map(|(n, r)| (n.as_str(), r))
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(n, _)| n.clone()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(
        age: i64,
        income: i64,
        employed_population: i64,
        population: i64,
        ad_cost: f64,
        foot_traffic: i64,
    ) -> LocationRecord {
        LocationRecord {
            age,
            income,
            employed_population,
            population,
            ad_cost,
            foot_traffic,
        }
    }

    #[test]
    fn insert_preserves_order() {
        let mut table = LocationTable::new();
        table.insert("zeta", record(30, 50_000, 500, 1000, 10.0, 100)).unwrap();
        table.insert("alpha", record(40, 60_000, 600, 1000, 20.0, 200)).unwrap();
        table.insert("mid", record(35, 55_000, 550, 1000, 15.0, 150)).unwrap();

        assert_eq!(table.names(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn insert_rejects_duplicate_name() {
        let mut table = LocationTable::new();
        table.insert("north", record(30, 50_000, 500, 1000, 10.0, 100)).unwrap();
        let err = table
            .insert("north", record(31, 51_000, 500, 1000, 10.0, 100))
            .unwrap_err();
        assert!(
            matches!(err, PlanError::Validation { ref subject, field: "location", .. } if subject == "north"),
            "expected duplicate validation error, got: {err:?}"
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn insert_rejects_blank_name() {
        let mut table = LocationTable::new();
        let err = table
            .insert("  ", record(30, 50_000, 500, 1000, 10.0, 100))
            .unwrap_err();
        assert!(matches!(err, PlanError::Validation { field: "location", .. }));
    }

    #[test]
    fn validate_rejects_non_positive_population() {
        for population in [0, -10] {
            let err = record(30, 50_000, 0, population, 10.0, 100)
                .validate("north")
                .unwrap_err();
            assert!(
                matches!(err, PlanError::Validation { field: "population", .. }),
                "expected population error, got: {err:?}"
            );
        }
    }

    #[test]
    fn validate_rejects_negative_cost_and_traffic() {
        let err = record(30, 50_000, 500, 1000, -1.0, 100)
            .validate("north")
            .unwrap_err();
        assert!(matches!(err, PlanError::Validation { field: "ad_cost", .. }));

        let err = record(30, 50_000, 500, 1000, f64::NAN, 100)
            .validate("north")
            .unwrap_err();
        assert!(matches!(err, PlanError::Validation { field: "ad_cost", .. }));

        let err = record(30, 50_000, 500, 1000, 1.0, -3)
            .validate("north")
            .unwrap_err();
        assert!(matches!(err, PlanError::Validation { field: "foot_traffic", .. }));
    }

    #[test]
    fn validate_accepts_zero_cost() {
        assert!(record(30, 50_000, 500, 1000, 0.0, 0).validate("free").is_ok());
    }

    #[test]
    fn employed_percentage_divides_by_population() {
        let pct = record(30, 50_000, 250, 1000, 1.0, 1)
            .employed_percentage("north")
            .unwrap();
        assert!((pct - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn employed_percentage_zero_population_is_division_error() {
        let err = record(30, 50_000, 250, 0, 1.0, 1)
            .employed_percentage("ghost")
            .unwrap_err();
        assert!(matches!(err, PlanError::Division { ref location, .. } if location == "ghost"));
    }
}

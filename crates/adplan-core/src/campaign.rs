//! YAML campaign files: audience criteria, ranking depth, budget, and manual
//! budget adjustments for one planning run.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::filter::AudienceCriteria;
use crate::pipeline::{BudgetAdjustment, PlanRequest};
use crate::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CampaignFile {
    #[serde(flatten)]
    pub criteria: AudienceCriteria,
    #[serde(default)]
    pub top_n: Option<usize>,
    #[serde(default)]
    pub total_budget: Option<f64>,
    #[serde(default)]
    pub adjustments: Vec<BudgetAdjustment>,
}

impl CampaignFile {
    /// Overlay the settings present in this file onto `request`.
    ///
    /// Criteria set in the file replace the request's criteria one by one;
    /// adjustments are appended.
    pub fn apply_to(self, request: &mut PlanRequest) {
        if self.criteria.age_range.is_some() {
            request.criteria.age_range = self.criteria.age_range;
        }
        if self.criteria.income_range.is_some() {
            request.criteria.income_range = self.criteria.income_range;
        }
        if self.criteria.min_employed_percentage.is_some() {
            request.criteria.min_employed_percentage = self.criteria.min_employed_percentage;
        }
        if let Some(top_n) = self.top_n {
            request.top_n = top_n;
        }
        if self.total_budget.is_some() {
            request.total_budget = self.total_budget;
        }
        request.adjustments.extend(self.adjustments);
    }
}

/// Load and validate a campaign file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_campaign(path: &Path) -> Result<CampaignFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CampaignFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let campaign = parse_campaign(&content)?;
    tracing::debug!(
        path = %path.display(),
        adjustments = campaign.adjustments.len(),
        "campaign file loaded"
    );
    Ok(campaign)
}

/// Parse and validate campaign YAML already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_campaign(content: &str) -> Result<CampaignFile, ConfigError> {
    let campaign: CampaignFile = serde_yaml::from_str(content)?;
    validate_campaign(&campaign)?;
    Ok(campaign)
}

fn validate_campaign(campaign: &CampaignFile) -> Result<(), ConfigError> {
    campaign
        .criteria
        .validate()
        .map_err(|e| ConfigError::Validation(e.to_string()))?;

    if campaign.top_n == Some(0) {
        return Err(ConfigError::Validation(
            "top_n must be at least 1".to_string(),
        ));
    }

    if let Some(budget) = campaign.total_budget {
        if !budget.is_finite() || budget < 0.0 {
            return Err(ConfigError::Validation(format!(
                "total_budget must be a finite amount >= 0, got {budget}"
            )));
        }
    }

    let mut seen = HashSet::new();
    for adjustment in &campaign.adjustments {
        if adjustment.location.trim().is_empty() {
            return Err(ConfigError::Validation(
                "adjustment location must be non-empty".to_string(),
            ));
        }
        if !adjustment.budget.is_finite() || adjustment.budget < 0.0 {
            return Err(ConfigError::Validation(format!(
                "adjustment for '{}' has invalid budget {}",
                adjustment.location, adjustment.budget
            )));
        }
        if !seen.insert(adjustment.location.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate adjustment for location '{}'",
                adjustment.location
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::IntRange;

    const FULL: &str = r"
age_range:
  min: 25
  max: 40
income_range:
  min: 40000
  max: 90000
min_employed_percentage: 60
top_n: 10
total_budget: 25000
adjustments:
  - location: Downtown
    budget: 5000
  - location: Harbor
    budget: 0
";

    #[test]
    fn parses_full_campaign() {
        let campaign = parse_campaign(FULL).unwrap();
        assert_eq!(campaign.criteria.age_range, Some(IntRange { min: 25, max: 40 }));
        assert_eq!(
            campaign.criteria.income_range,
            Some(IntRange {
                min: 40_000,
                max: 90_000
            })
        );
        assert_eq!(campaign.criteria.min_employed_percentage, Some(60.0));
        assert_eq!(campaign.top_n, Some(10));
        assert_eq!(campaign.total_budget, Some(25_000.0));
        assert_eq!(campaign.adjustments.len(), 2);
        assert_eq!(campaign.adjustments[0].location, "Downtown");
    }

    #[test]
    fn empty_document_is_default() {
        let campaign = parse_campaign("{}").unwrap();
        assert_eq!(campaign, CampaignFile::default());
    }

    #[test]
    fn rejects_inverted_range() {
        let err = parse_campaign("age_range: {min: 50, max: 20}").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("age_range")));
    }

    #[test]
    fn rejects_zero_top_n() {
        let err = parse_campaign("top_n: 0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_negative_budget() {
        let err = parse_campaign("total_budget: -10").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("total_budget")));
    }

    #[test]
    fn rejects_duplicate_adjustment() {
        let yaml = r"
adjustments:
  - location: Downtown
    budget: 10
  - location: Downtown
    budget: 20
";
        let err = parse_campaign(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("duplicate")));
    }

    #[test]
    fn rejects_malformed_yaml() {
        let err = parse_campaign("age_range: [not, a, range").unwrap_err();
        assert!(matches!(err, ConfigError::CampaignFileParse(_)));
    }

    #[test]
    fn load_campaign_missing_file_is_io_error() {
        let err = load_campaign(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::CampaignFileIo { .. }));
    }

    #[test]
    fn apply_to_overlays_only_present_fields() {
        let mut request = PlanRequest {
            criteria: AudienceCriteria {
                age_range: Some(IntRange { min: 18, max: 65 }),
                ..Default::default()
            },
            top_n: 24,
            total_budget: Some(100.0),
            adjustments: Vec::new(),
        };
        let campaign = parse_campaign("min_employed_percentage: 50\ntop_n: 5").unwrap();
        campaign.apply_to(&mut request);

        assert_eq!(request.criteria.age_range, Some(IntRange { min: 18, max: 65 }));
        assert_eq!(request.criteria.min_employed_percentage, Some(50.0));
        assert_eq!(request.top_n, 5);
        assert_eq!(request.total_budget, Some(100.0));
    }
}

//! Advertising location planning: audience filtering, cost-efficiency ranking,
//! and proportional budget allocation.

pub mod app_config;
pub mod budget;
pub mod campaign;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod pipeline;
pub mod record;
pub mod scorer;

pub use app_config::AppConfig;
pub use budget::{BudgetAllocator, BudgetSummary, LocationAllocation};
pub use campaign::{load_campaign, parse_campaign, CampaignFile};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, ErrorKind, LoadError, PlanError};
pub use filter::{filter_locations, AudienceCriteria, IntRange};
pub use loader::load_locations;
pub use pipeline::{run_plan, BudgetAdjustment, PlanOutcome, PlanRequest};
pub use record::{LocationRecord, LocationTable};
pub use scorer::{
    average_metrics, AllocationState, AverageMetrics, EfficiencyScore, LocationScorer,
    ScoredLocation, DEFAULT_TOP_N, NO_COST_SCORE,
};

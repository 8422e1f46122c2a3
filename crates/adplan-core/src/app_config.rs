use std::path::PathBuf;

/// Process-level defaults read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub log_level: String,
    pub data_path: Option<PathBuf>,
    pub campaign_path: Option<PathBuf>,
    pub report_dir: PathBuf,
    pub top_n: usize,
    pub total_budget: Option<f64>,
}

use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::scorer::DEFAULT_TOP_N;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can use a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let log_level = or_default("ADPLAN_LOG_LEVEL", "info");
    let data_path = lookup("ADPLAN_DATA_PATH").ok().map(PathBuf::from);
    let campaign_path = lookup("ADPLAN_CAMPAIGN_PATH").ok().map(PathBuf::from);
    let report_dir = PathBuf::from(or_default("ADPLAN_REPORT_DIR", "./reports"));

    let top_n = or_default("ADPLAN_TOP_N", &DEFAULT_TOP_N.to_string())
        .parse::<usize>()
        .map_err(|e| invalid("ADPLAN_TOP_N", e.to_string()))?;
    if top_n == 0 {
        return Err(invalid("ADPLAN_TOP_N", "must be at least 1".to_string()));
    }

    let total_budget = match lookup("ADPLAN_TOTAL_BUDGET") {
        Ok(raw) => {
            let budget = raw
                .parse::<f64>()
                .map_err(|e| invalid("ADPLAN_TOTAL_BUDGET", e.to_string()))?;
            if !budget.is_finite() || budget < 0.0 {
                return Err(invalid(
                    "ADPLAN_TOTAL_BUDGET",
                    format!("must be a finite amount >= 0, got {budget}"),
                ));
            }
            Some(budget)
        }
        Err(_) => None,
    };

    Ok(AppConfig {
        log_level,
        data_path,
        campaign_path,
        report_dir,
        top_n,
        total_budget,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

//! Application configuration. Catalog location and credit policy.

use serde::Deserialize;

/// Credits assumed for a course the catalog does not know.
pub const DEFAULT_COURSE_CREDITS: f64 = 3.0;

/// Fixed credit load added by the extended-credit program.
pub const DEFAULT_ECP_CREDITS: f64 = 30.0;

/// Credits per term assumed when projecting graduation.
pub const DEFAULT_CREDITS_PER_TERM: f64 = 15.0;

/// Degree total used when neither pools nor the degree record give one.
pub const DEFAULT_TOTAL_CREDITS: f64 = 120.0;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// JSON catalog snapshot. Read from DEGREE_PLANNER_CATALOG_PATH.
    #[serde(default)]
    pub catalog_path: Option<String>,

    /// Read from DEGREE_PLANNER_DEFAULT_COURSE_CREDITS.
    #[serde(default)]
    pub default_course_credits: Option<f64>,

    /// Read from DEGREE_PLANNER_CREDITS_PER_TERM.
    #[serde(default)]
    pub credits_per_term: Option<f64>,

    /// Read from DEGREE_PLANNER_DEFAULT_TOTAL_CREDITS.
    #[serde(default)]
    pub default_total_credits: Option<f64>,

    /// Read from DEGREE_PLANNER_ECP_CREDITS.
    #[serde(default)]
    pub ecp_credits: Option<f64>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("DEGREE_PLANNER"));
        if let Ok(path) = std::env::var("DEGREE_PLANNER_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    /// Returns the catalog path. Defaults to ./data/catalog.json.
    pub fn catalog_path_or_default(&self) -> String {
        self.catalog_path
            .clone()
            .unwrap_or_else(|| "./data/catalog.json".to_string())
    }

    pub fn default_course_credits_or_default(&self) -> f64 {
        self.default_course_credits.unwrap_or(DEFAULT_COURSE_CREDITS)
    }

    pub fn credits_per_term_or_default(&self) -> f64 {
        self.credits_per_term
            .filter(|c| *c > 0.0)
            .unwrap_or(DEFAULT_CREDITS_PER_TERM)
    }

    pub fn default_total_credits_or_default(&self) -> f64 {
        self.default_total_credits.unwrap_or(DEFAULT_TOTAL_CREDITS)
    }

    pub fn ecp_credits_or_default(&self) -> f64 {
        self.ecp_credits.unwrap_or(DEFAULT_ECP_CREDITS)
    }

    pub fn credit_policy(&self) -> CreditPolicy {
        CreditPolicy {
            default_course_credits: self.default_course_credits_or_default(),
            ecp_credits: self.ecp_credits_or_default(),
            credits_per_term: self.credits_per_term_or_default(),
            default_total_credits: self.default_total_credits_or_default(),
        }
    }
}

/// Credit constants handed to the engine services.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreditPolicy {
    pub default_course_credits: f64,
    pub ecp_credits: f64,
    pub credits_per_term: f64,
    pub default_total_credits: f64,
}

impl Default for CreditPolicy {
    fn default() -> Self {
        Self {
            default_course_credits: DEFAULT_COURSE_CREDITS,
            ecp_credits: DEFAULT_ECP_CREDITS,
            credits_per_term: DEFAULT_CREDITS_PER_TERM,
            default_total_credits: DEFAULT_TOTAL_CREDITS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.credit_policy(), CreditPolicy::default());
        assert_eq!(cfg.catalog_path_or_default(), "./data/catalog.json");
    }

    #[test]
    fn test_policy_overrides() {
        let cfg = AppConfig {
            credits_per_term: Some(0.0),
            ecp_credits: Some(24.0),
            ..Default::default()
        };
        let policy = cfg.credit_policy();
        assert_eq!(policy.credits_per_term, DEFAULT_CREDITS_PER_TERM);
        assert_eq!(policy.ecp_credits, 24.0);
    }
}

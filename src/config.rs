use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::core::{batch::DEFAULT_MAX_CONCURRENCY, BatchMatcher, Matcher, WeightPolicy};
use crate::models::RecommendationMatchingCriteria;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub batch: BatchSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
    #[serde(default = "default_min_match_score")]
    pub min_match_score: f64,
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
    #[serde(default)]
    pub weight_policy: WeightPolicy,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            weights: WeightsConfig::default(),
            min_match_score: default_min_match_score(),
            max_suggestions: default_max_suggestions(),
            weight_policy: WeightPolicy::default(),
        }
    }
}

fn default_min_match_score() -> f64 { 50.0 }
fn default_max_suggestions() -> usize { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_category_weight")]
    pub category: f64,
    #[serde(default = "default_audience_weight")]
    pub audience_compatibility: f64,
    #[serde(default = "default_performance_weight")]
    pub performance_history: f64,
    #[serde(default = "default_geographic_weight")]
    pub geographic: f64,
    #[serde(default = "default_seasonal_weight")]
    pub seasonal: f64,
    #[serde(default = "default_competition_weight")]
    pub competition: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            category: default_category_weight(),
            audience_compatibility: default_audience_weight(),
            performance_history: default_performance_weight(),
            geographic: default_geographic_weight(),
            seasonal: default_seasonal_weight(),
            competition: default_competition_weight(),
        }
    }
}

fn default_category_weight() -> f64 { 0.25 }
fn default_audience_weight() -> f64 { 0.20 }
fn default_performance_weight() -> f64 { 0.20 }
fn default_geographic_weight() -> f64 { 0.15 }
fn default_seasonal_weight() -> f64 { 0.10 }
fn default_competition_weight() -> f64 { 0.10 }

#[derive(Debug, Clone, Deserialize)]
pub struct BatchSettings {
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    pub source_timeout_ms: Option<u64>,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            source_timeout_ms: None,
        }
    }
}

fn default_max_concurrency() -> usize { DEFAULT_MAX_CONCURRENCY }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with CROSSPROMO_)
    /// 5. LOG_LEVEL / LOG_FORMAT
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., CROSSPROMO__MATCHING__MIN_MATCH_SCORE -> matching.min_match_score
            .add_source(
                Environment::with_prefix("CROSSPROMO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_log_env_overrides(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path, then the same environment layers as `load`
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("CROSSPROMO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_log_env_overrides(settings)?.try_deserialize()
    }

    /// Default criteria described by the `matching` section
    pub fn criteria(&self) -> RecommendationMatchingCriteria {
        let weights = &self.matching.weights;
        RecommendationMatchingCriteria {
            category_weight: weights.category,
            audience_compatibility_weight: weights.audience_compatibility,
            performance_history_weight: weights.performance_history,
            geographic_weight: weights.geographic,
            seasonal_weight: weights.seasonal,
            competition_weight: weights.competition,
            min_match_score: self.matching.min_match_score,
            max_suggestions: self.matching.max_suggestions,
        }
    }

    pub fn matcher(&self) -> Matcher {
        Matcher::new(self.criteria(), self.matching.weight_policy)
    }

    pub fn batch_matcher(&self) -> BatchMatcher {
        BatchMatcher::new(self.matcher())
            .with_max_concurrency(self.batch.max_concurrency)
            .with_source_timeout(self.batch.source_timeout_ms.map(Duration::from_millis))
    }
}

/// LOG_LEVEL and LOG_FORMAT take precedence over the logging section
fn apply_log_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(level) = env::var("LOG_LEVEL") {
        builder = builder.set_override("logging.level", level)?;
    }
    if let Ok(format) = env::var("LOG_FORMAT") {
        builder = builder.set_override("logging.format", format)?;
    }

    builder.build()
}

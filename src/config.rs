use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::{ClassifierMode, LinkOptions, ResolutionPolicy};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub linkage: LinkageSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkageSettings {
    #[serde(default = "default_classifier_mode")]
    pub classifier_mode: ClassifierMode,
    #[serde(default = "default_title_threshold")]
    pub title_threshold: f64,
    #[serde(default = "default_city_threshold")]
    pub city_threshold: f64,
    #[serde(default)]
    pub score_city: bool,
    #[serde(default = "default_resolution_policy")]
    pub resolution_policy: ResolutionPolicy,
}

impl Default for LinkageSettings {
    fn default() -> Self {
        Self {
            classifier_mode: default_classifier_mode(),
            title_threshold: default_title_threshold(),
            city_threshold: default_city_threshold(),
            score_city: false,
            resolution_policy: default_resolution_policy(),
        }
    }
}

impl LinkageSettings {
    /// Concrete per-run options for the pipeline.
    pub fn to_options(&self) -> LinkOptions {
        LinkOptions {
            classifier_mode: self.classifier_mode,
            title_threshold: self.title_threshold,
            city_threshold: self.city_threshold,
            score_city: self.score_city,
            resolution_policy: self.resolution_policy,
            block_key: None,
        }
    }
}

fn default_classifier_mode() -> ClassifierMode {
    ClassifierMode::Threshold
}
fn default_title_threshold() -> f64 {
    0.85
}
fn default_city_threshold() -> f64 {
    0.90
}
fn default_resolution_policy() -> ResolutionPolicy {
    ResolutionPolicy::Greedy
}

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

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with LODGELINK_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g. LODGELINK_LINKAGE__TITLE_THRESHOLD -> linkage.title_threshold
            .add_source(
                Environment::with_prefix("LODGELINK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("LODGELINK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

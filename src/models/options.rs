use validator::Validate;

use crate::models::domain::{ClassifierMode, ResolutionPolicy};

/// Block key extractor applied to a normalized title. `None` routes the
/// record to the distinct unkeyed bucket instead of dropping it.
pub type BlockKeyFn = fn(&str) -> Option<char>;

/// Per-run pipeline configuration.
///
/// Thresholds must lie strictly inside (0, 1); the pipeline rejects anything
/// else before doing any comparison work.
#[derive(Debug, Clone, Validate)]
pub struct LinkOptions {
    pub classifier_mode: ClassifierMode,
    /// Cutoff for the threshold strategy and for the probabilistic
    /// strategy's title binarization and fallback.
    #[validate(range(exclusive_min = 0.0, exclusive_max = 1.0))]
    pub title_threshold: f64,
    /// Binarization cutoff for city similarity; only consulted when city
    /// scoring is enabled.
    #[validate(range(exclusive_min = 0.0, exclusive_max = 1.0))]
    pub city_threshold: f64,
    /// Score city similarity as a second component.
    pub score_city: bool,
    pub resolution_policy: ResolutionPolicy,
    /// Custom block key extractor; `None` selects the default
    /// first-character key.
    pub block_key: Option<BlockKeyFn>,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            classifier_mode: ClassifierMode::Threshold,
            title_threshold: 0.85,
            city_threshold: 0.90,
            score_city: false,
            resolution_policy: ResolutionPolicy::Greedy,
            block_key: None,
        }
    }
}

impl LinkOptions {
    pub fn with_title_threshold(mut self, threshold: f64) -> Self {
        self.title_threshold = threshold;
        self
    }

    pub fn with_classifier_mode(mut self, mode: ClassifierMode) -> Self {
        self.classifier_mode = mode;
        self
    }

    pub fn with_resolution_policy(mut self, policy: ResolutionPolicy) -> Self {
        self.resolution_policy = policy;
        self
    }

    /// Enable city scoring with the given binarization cutoff.
    pub fn with_city_threshold(mut self, threshold: f64) -> Self {
        self.score_city = true;
        self.city_threshold = threshold;
        self
    }
}

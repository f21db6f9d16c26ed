use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One accommodation listing from one source.
///
/// Produced by the normalizer and treated as immutable for the duration of a
/// pipeline run. `title_normalized` and `city_normalized` drive blocking and
/// similarity scoring; everything else is passthrough data carried into the
/// final output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub source_id: String,
    pub title: String,
    pub title_normalized: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub city_normalized: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub price: Option<u32>,
    #[serde(default)]
    pub distance_center_km: Option<f64>,
    #[serde(default)]
    pub review_score: Option<f64>,
    #[serde(default)]
    pub review_word: Option<String>,
    #[serde(default)]
    pub review_count: Option<u32>,
    #[serde(default)]
    pub nights: Option<u32>,
    #[serde(default)]
    pub persons: Option<u32>,
    #[serde(default)]
    pub stay_start: Option<NaiveDate>,
    #[serde(default)]
    pub stay_end: Option<NaiveDate>,
}

/// A pair of positional indices into the left and right collections,
/// generated only when both records share a block key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CandidatePair {
    pub left: usize,
    pub right: usize,
}

/// A candidate pair with its named similarity components, each in [0, 1].
///
/// Components are kept separate here; how they are aggregated is the
/// classifier's decision, not the scorer's.
#[derive(Debug, Clone)]
pub struct ScoredPair {
    pub pair: CandidatePair,
    /// Title similarity, always computed.
    pub title: f64,
    /// City similarity, present only when city scoring is enabled for the run.
    pub city: Option<f64>,
}

impl ScoredPair {
    /// Mean of the raw similarity components.
    pub fn component_mean(&self) -> f64 {
        match self.city {
            Some(city) => (self.title + city) / 2.0,
            None => self.title,
        }
    }
}

/// A scored pair the classifier accepted, carrying the aggregate score
/// reported in the output table.
#[derive(Debug, Clone)]
pub struct MatchCandidate {
    pub scored: ScoredPair,
    pub score: f64,
}

impl MatchCandidate {
    pub fn pair(&self) -> CandidatePair {
        self.scored.pair
    }

    /// The component conflict resolution orders by. City similarity informs
    /// classification only and never participates in resolution.
    pub fn title_similarity(&self) -> f64 {
        self.scored.title
    }
}

/// The resolved match set.
///
/// Under the greedy policy `bijective` is always true; under exclusive-ties
/// it reflects whether the output actually satisfies the 1:1 invariant.
#[derive(Debug, Clone, Default)]
pub struct Assignment {
    pub matches: Vec<MatchCandidate>,
    pub bijective: bool,
}

impl Assignment {
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Which classification strategy a run is configured to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierMode {
    Threshold,
    Probabilistic,
}

impl std::str::FromStr for ClassifierMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "threshold" => Ok(Self::Threshold),
            "probabilistic" => Ok(Self::Probabilistic),
            other => Err(format!("unknown classifier mode `{other}`")),
        }
    }
}

/// How duplicate claims on a left or right index are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionPolicy {
    /// Score-ordered single scan; always yields a strict bijection.
    #[serde(rename = "greedy")]
    Greedy,
    /// Keep every match tied at a contested index's maximum score; may yield
    /// a non-bijective assignment, which is flagged rather than rejected.
    #[serde(rename = "exclusive-ties")]
    ExclusiveTies,
}

impl std::str::FromStr for ResolutionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greedy" => Ok(Self::Greedy),
            "exclusive-ties" => Ok(Self::ExclusiveTies),
            other => Err(format!("unknown resolution policy `{other}`")),
        }
    }
}

/// The classification strategy that actually produced a run's matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMode {
    #[serde(rename = "threshold")]
    Threshold,
    #[serde(rename = "probabilistic")]
    Probabilistic,
    #[serde(rename = "threshold-fallback")]
    ThresholdFallback,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Threshold => "threshold",
            Self::Probabilistic => "probabilistic",
            Self::ThresholdFallback => "threshold-fallback",
        }
    }
}

/// An assignment entry joined back to both sides' attributes; one output row.
///
/// Attribute names that exist on both sides carry `_left`/`_right` suffixes.
/// The stay fields describe the query that produced both datasets, so they
/// are carried once, from the right-hand source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedRecord {
    pub pair: String,
    pub score: f64,
    pub title_similarity: f64,
    pub city_similarity: Option<f64>,
    pub mode: MatchMode,
    pub left_index: usize,
    pub right_index: usize,
    pub title_left: String,
    pub title_right: String,
    pub zone_left: Option<String>,
    pub zone_right: Option<String>,
    pub city_left: Option<String>,
    pub city_right: Option<String>,
    pub price_left: Option<u32>,
    pub price_right: Option<u32>,
    pub distance_center_left: Option<f64>,
    pub distance_center_right: Option<f64>,
    pub review_score_left: Option<f64>,
    pub review_score_right: Option<f64>,
    pub review_word_left: Option<String>,
    pub review_word_right: Option<String>,
    pub review_count_left: Option<u32>,
    pub review_count_right: Option<u32>,
    pub nights: Option<u32>,
    pub persons: Option<u32>,
    pub stay_start: Option<NaiveDate>,
    pub stay_end: Option<NaiveDate>,
}

/// Result of a full pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkReport {
    pub records: Vec<LinkedRecord>,
    pub mode: MatchMode,
    pub candidate_pairs: usize,
    pub total_left: usize,
    pub total_right: usize,
    pub bijective: bool,
}

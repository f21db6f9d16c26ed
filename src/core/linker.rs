use std::collections::HashSet;

use thiserror::Error;
use tracing::info;
use validator::Validate;

use crate::core::{
    blocking::{title_initial, BlockingIndex},
    classifier::{classify_threshold, classify_with_fallback},
    resolver::resolve,
    similarity::score_pair,
};
use crate::models::{
    Assignment, ClassifierMode, LinkOptions, LinkReport, LinkedRecord, Listing, MatchMode,
    ScoredPair,
};

/// Fatal pipeline errors, raised before any comparison work. Classifier fit
/// failures are not errors; they select the threshold fallback instead.
#[derive(Debug, Error, PartialEq)]
pub enum LinkError {
    #[error("{side} dataset carries no `{column}` data required by the configuration")]
    Schema {
        side: &'static str,
        column: &'static str,
    },
    #[error("{name} must lie strictly between 0 and 1 (got {value})")]
    InvalidThreshold { name: &'static str, value: f64 },
}

/// Pipeline orchestrator.
///
/// # Stages
/// 1. Blocking: partition both collections by block key
/// 2. Scoring: similarity components per candidate pair
/// 3. Classification: threshold or probabilistic with fallback
/// 4. Resolution: reduce duplicate claims to an assignment
/// 5. Assembly: join resolved pairs back to full attributes
#[derive(Debug, Clone)]
pub struct Linker {
    options: LinkOptions,
}

impl Linker {
    pub fn new(options: LinkOptions) -> Self {
        Self { options }
    }

    pub fn with_defaults() -> Self {
        Self {
            options: LinkOptions::default(),
        }
    }

    pub fn options(&self) -> &LinkOptions {
        &self.options
    }

    /// Run the full pipeline over two immutable listing collections.
    ///
    /// The inputs are read-only for the duration of the call; every
    /// intermediate structure is private to this invocation, so repeated
    /// runs on the same inputs return identical reports.
    pub fn link(&self, left: &[Listing], right: &[Listing]) -> Result<LinkReport, LinkError> {
        self.validate_thresholds()?;
        self.ensure_schema(left, right)?;

        let key_fn = self.options.block_key.unwrap_or(title_initial);
        let index = BlockingIndex::build(left, right, key_fn);
        let pairs = index.candidate_pairs();
        info!(
            blocks = index.blocks().len(),
            candidate_pairs = pairs.len(),
            "generated candidate pairs"
        );

        let scored: Vec<ScoredPair> = pairs
            .iter()
            .map(|&pair| {
                score_pair(
                    pair,
                    &left[pair.left],
                    &right[pair.right],
                    self.options.score_city,
                )
            })
            .collect();

        let (candidates, mode) = match self.options.classifier_mode {
            ClassifierMode::Threshold => (
                classify_threshold(&scored, self.options.title_threshold),
                MatchMode::Threshold,
            ),
            ClassifierMode::Probabilistic => classify_with_fallback(
                &scored,
                self.options.title_threshold,
                self.options.city_threshold,
            )
            .into_parts(),
        };
        info!(
            matches = candidates.len(),
            mode = mode.as_str(),
            "classified candidate pairs"
        );

        let assignment = resolve(candidates, self.options.resolution_policy);
        let records = assemble(&assignment, left, right, mode);
        info!(
            resolved = records.len(),
            bijective = assignment.bijective,
            "resolved assignment"
        );

        Ok(LinkReport {
            records,
            mode,
            candidate_pairs: pairs.len(),
            total_left: left.len(),
            total_right: right.len(),
            bijective: assignment.bijective,
        })
    }

    fn validate_thresholds(&self) -> Result<(), LinkError> {
        if let Err(errors) = self.options.validate() {
            let fields = errors.field_errors();
            if fields.contains_key("title_threshold") {
                return Err(LinkError::InvalidThreshold {
                    name: "title_threshold",
                    value: self.options.title_threshold,
                });
            }
            return Err(LinkError::InvalidThreshold {
                name: "city_threshold",
                value: self.options.city_threshold,
            });
        }
        Ok(())
    }

    /// City scoring needs city data; a side with none at all is a schema
    /// violation, while an individual missing value scores 0.0 downstream.
    fn ensure_schema(&self, left: &[Listing], right: &[Listing]) -> Result<(), LinkError> {
        if !self.options.score_city {
            return Ok(());
        }
        if !left.is_empty() && left.iter().all(|l| l.city_normalized.is_none()) {
            return Err(LinkError::Schema {
                side: "left",
                column: "city",
            });
        }
        if !right.is_empty() && right.iter().all(|l| l.city_normalized.is_none()) {
            return Err(LinkError::Schema {
                side: "right",
                column: "city",
            });
        }
        Ok(())
    }
}

impl Default for Linker {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Join each assignment entry back to full attributes from both sources,
/// deduplicating by index pair before returning.
fn assemble(
    assignment: &Assignment,
    left: &[Listing],
    right: &[Listing],
    mode: MatchMode,
) -> Vec<LinkedRecord> {
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(assignment.len());

    for candidate in &assignment.matches {
        let pair = candidate.pair();
        if !seen.insert((pair.left, pair.right)) {
            continue;
        }
        let l = &left[pair.left];
        let r = &right[pair.right];

        records.push(LinkedRecord {
            pair: format!("{}#{}", l.source_id, r.source_id),
            score: candidate.score,
            title_similarity: candidate.scored.title,
            city_similarity: candidate.scored.city,
            mode,
            left_index: pair.left,
            right_index: pair.right,
            title_left: l.title.clone(),
            title_right: r.title.clone(),
            zone_left: l.zone.clone(),
            zone_right: r.zone.clone(),
            city_left: l.city.clone(),
            city_right: r.city.clone(),
            price_left: l.price,
            price_right: r.price,
            distance_center_left: l.distance_center_km,
            distance_center_right: r.distance_center_km,
            review_score_left: l.review_score,
            review_score_right: r.review_score,
            review_word_left: l.review_word.clone(),
            review_word_right: r.review_word.clone(),
            review_count_left: l.review_count,
            review_count_right: r.review_count,
            nights: r.nights,
            persons: r.persons,
            stay_start: r.stay_start,
            stay_end: r.stay_end,
        });
    }

    records
}

use std::collections::HashSet;

use thiserror::Error;
use tracing::warn;

use crate::models::{MatchCandidate, MatchMode, ScoredPair};

/// Fewest candidate pairs the mixture model will attempt to fit.
const MIN_CANDIDATE_PAIRS: usize = 2;

/// Iteration cap before the fit is declared non-convergent.
const EM_MAX_ITERS: usize = 200;

/// Convergence criterion: largest absolute parameter change per iteration.
const EM_TOLERANCE: f64 = 1e-5;

/// Estimated probabilities are clamped into [PROB_FLOOR, 1 - PROB_FLOOR] to
/// keep posteriors finite on separable data.
const PROB_FLOOR: f64 = 1e-6;

/// Posterior cutoff for assigning a pair to the match class.
const POSTERIOR_CUTOFF: f64 = 0.5;

/// Why a probabilistic fit was abandoned.
///
/// Never surfaced to the caller as a failure; it selects the threshold
/// fallback and the run is tagged accordingly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FitError {
    #[error("too few candidate pairs to fit")]
    TooFewPairs,
    #[error("fewer than 2 distinct agreement patterns")]
    SinglePattern,
    #[error("estimation did not converge within the iteration cap")]
    NotConverged,
}

/// Which strategy actually produced the matches, as an explicit value rather
/// than exception-driven control flow.
#[derive(Debug)]
pub enum Classified {
    Probabilistic(Vec<MatchCandidate>),
    ThresholdFallback(Vec<MatchCandidate>),
}

impl Classified {
    pub fn into_parts(self) -> (Vec<MatchCandidate>, MatchMode) {
        match self {
            Self::Probabilistic(matches) => (matches, MatchMode::Probabilistic),
            Self::ThresholdFallback(matches) => (matches, MatchMode::ThresholdFallback),
        }
    }
}

/// Fixed-threshold strategy: accept a pair iff its title similarity exceeds
/// the cutoff. The candidate score is the title similarity itself.
pub fn classify_threshold(scored: &[ScoredPair], title_threshold: f64) -> Vec<MatchCandidate> {
    scored
        .iter()
        .filter(|pair| pair.title > title_threshold)
        .map(|pair| MatchCandidate {
            scored: pair.clone(),
            score: pair.title,
        })
        .collect()
}

/// Probabilistic strategy with deterministic threshold fallback.
///
/// A single fit attempt decides the outcome; a failed fit logs the reason
/// and falls back to `classify_threshold` with the title cutoff.
pub fn classify_with_fallback(
    scored: &[ScoredPair],
    title_threshold: f64,
    city_threshold: f64,
) -> Classified {
    match classify_probabilistic(scored, title_threshold, city_threshold) {
        Ok(matches) => Classified::Probabilistic(matches),
        Err(reason) => {
            warn!(%reason, "probabilistic fit failed, falling back to threshold strategy");
            Classified::ThresholdFallback(classify_threshold(scored, title_threshold))
        }
    }
}

/// Fit the mixture model on binarized components and classify by posterior.
///
/// The aggregate score of an accepted pair is the mean of its raw
/// (non-binarized) similarity components.
pub fn classify_probabilistic(
    scored: &[ScoredPair],
    title_threshold: f64,
    city_threshold: f64,
) -> Result<Vec<MatchCandidate>, FitError> {
    let patterns = binarize(scored, title_threshold, city_threshold);
    let model = EmModel::fit(&patterns)?;

    Ok(scored
        .iter()
        .zip(&patterns)
        .filter(|(_, pattern)| model.posterior(pattern) > POSTERIOR_CUTOFF)
        .map(|(pair, _)| MatchCandidate {
            scored: pair.clone(),
            score: pair.component_mean(),
        })
        .collect())
}

/// Turn each similarity component into a boolean agreement indicator against
/// its per-attribute cutoff.
fn binarize(scored: &[ScoredPair], title_threshold: f64, city_threshold: f64) -> Vec<Vec<bool>> {
    scored
        .iter()
        .map(|pair| {
            let mut pattern = vec![pair.title > title_threshold];
            if let Some(city) = pair.city {
                pattern.push(city > city_threshold);
            }
            pattern
        })
        .collect()
}

/// Two-class Bernoulli mixture over binary agreement patterns, estimated by
/// expectation-maximization.
///
/// Numeric contract: `weight` is the match-class prior; `m[k]` / `u[k]` are
/// the per-attribute agreement probabilities for the match and non-match
/// classes, clamped into [PROB_FLOOR, 1 - PROB_FLOOR]. Initialization is
/// fixed (weight 0.1, m 0.9, u 0.1), so a fit on identical input is
/// identical — there is no randomness to seed.
#[derive(Debug, Clone, PartialEq)]
pub struct EmModel {
    weight: f64,
    m: Vec<f64>,
    u: Vec<f64>,
}

impl EmModel {
    pub fn fit(patterns: &[Vec<bool>]) -> Result<Self, FitError> {
        if patterns.len() < MIN_CANDIDATE_PAIRS {
            return Err(FitError::TooFewPairs);
        }
        let distinct: HashSet<&Vec<bool>> = patterns.iter().collect();
        if distinct.len() < 2 {
            return Err(FitError::SinglePattern);
        }

        let n = patterns.len() as f64;
        let features = patterns[0].len();

        let mut model = Self {
            weight: 0.1,
            m: vec![0.9; features],
            u: vec![0.1; features],
        };

        for _ in 0..EM_MAX_ITERS {
            // E step: posterior match responsibility per pair.
            let responsibilities: Vec<f64> =
                patterns.iter().map(|p| model.posterior(p)).collect();

            // M step: re-estimate prior and per-attribute probabilities.
            let total: f64 = responsibilities.iter().sum();
            let weight = clamp(total / n);

            let mut m = vec![0.0; features];
            let mut u = vec![0.0; features];
            for (pattern, &resp) in patterns.iter().zip(&responsibilities) {
                for (k, &agree) in pattern.iter().enumerate() {
                    if agree {
                        m[k] += resp;
                        u[k] += 1.0 - resp;
                    }
                }
            }
            for k in 0..features {
                m[k] = clamp(m[k] / total);
                u[k] = clamp(u[k] / (n - total));
            }

            let next = Self { weight, m, u };
            let delta = model.max_delta(&next);
            model = next;

            if delta < EM_TOLERANCE {
                // Guard against label switching: the match class is the one
                // with the higher mean agreement probability.
                if mean(&model.m) < mean(&model.u) {
                    std::mem::swap(&mut model.m, &mut model.u);
                    model.weight = 1.0 - model.weight;
                }
                return Ok(model);
            }
        }

        Err(FitError::NotConverged)
    }

    /// Posterior probability that `pattern` belongs to the match class.
    pub fn posterior(&self, pattern: &[bool]) -> f64 {
        let mut matched = self.weight;
        let mut unmatched = 1.0 - self.weight;
        for (k, &agree) in pattern.iter().enumerate() {
            matched *= if agree { self.m[k] } else { 1.0 - self.m[k] };
            unmatched *= if agree { self.u[k] } else { 1.0 - self.u[k] };
        }
        matched / (matched + unmatched)
    }

    fn max_delta(&self, other: &Self) -> f64 {
        let mut delta: f64 = (self.weight - other.weight).abs();
        for (a, b) in self.m.iter().zip(&other.m) {
            delta = delta.max((a - b).abs());
        }
        for (a, b) in self.u.iter().zip(&other.u) {
            delta = delta.max((a - b).abs());
        }
        delta
    }
}

fn clamp(p: f64) -> f64 {
    p.clamp(PROB_FLOOR, 1.0 - PROB_FLOOR)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

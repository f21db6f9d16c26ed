use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::models::{Assignment, MatchCandidate, ResolutionPolicy};

/// Reduce the classifier's match set to an assignment under the selected
/// policy.
///
/// Ordering uses the title similarity component only; resolution is
/// inherently sequential with respect to that order and is not parallelized.
pub fn resolve(candidates: Vec<MatchCandidate>, policy: ResolutionPolicy) -> Assignment {
    match policy {
        ResolutionPolicy::Greedy => resolve_greedy(candidates),
        ResolutionPolicy::ExclusiveTies => resolve_exclusive_ties(candidates),
    }
}

/// Highest-score-first single scan; a match is accepted only if neither of
/// its indices has been claimed by an earlier accepted match. Equal scores
/// are broken by index order, so the scan is fully deterministic and the
/// result is always a strict bijection.
fn resolve_greedy(mut candidates: Vec<MatchCandidate>) -> Assignment {
    candidates.sort_by(|a, b| {
        b.title_similarity()
            .partial_cmp(&a.title_similarity())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.pair().left.cmp(&b.pair().left))
            .then_with(|| a.pair().right.cmp(&b.pair().right))
    });

    let mut left_claimed = HashSet::new();
    let mut right_claimed = HashSet::new();
    let mut matches = Vec::new();

    for candidate in candidates {
        let pair = candidate.pair();
        if left_claimed.contains(&pair.left) || right_claimed.contains(&pair.right) {
            continue;
        }
        left_claimed.insert(pair.left);
        right_claimed.insert(pair.right);
        matches.push(candidate);
    }

    Assignment {
        matches,
        bijective: true,
    }
}

/// Keep a match iff it is uncontested on both sides, or attains the maximum
/// score for at least one contested index it touches. All matches tied at a
/// contested index's maximum are retained, so the result is not guaranteed
/// to be a bijection; a violation is warned about and flagged, never an
/// error.
fn resolve_exclusive_ties(candidates: Vec<MatchCandidate>) -> Assignment {
    let mut left_count: HashMap<usize, usize> = HashMap::new();
    let mut right_count: HashMap<usize, usize> = HashMap::new();
    let mut left_max: HashMap<usize, f64> = HashMap::new();
    let mut right_max: HashMap<usize, f64> = HashMap::new();

    for candidate in &candidates {
        let pair = candidate.pair();
        let score = candidate.title_similarity();
        *left_count.entry(pair.left).or_default() += 1;
        *right_count.entry(pair.right).or_default() += 1;
        left_max
            .entry(pair.left)
            .and_modify(|max| *max = max.max(score))
            .or_insert(score);
        right_max
            .entry(pair.right)
            .and_modify(|max| *max = max.max(score))
            .or_insert(score);
    }

    let matches: Vec<MatchCandidate> = candidates
        .into_iter()
        .filter(|candidate| {
            let pair = candidate.pair();
            let score = candidate.title_similarity();
            let left_contested = left_count[&pair.left] > 1;
            let right_contested = right_count[&pair.right] > 1;

            if !left_contested && !right_contested {
                return true;
            }
            (left_contested && score == left_max[&pair.left])
                || (right_contested && score == right_max[&pair.right])
        })
        .collect();

    let bijective = is_bijective(&matches);
    if !bijective {
        warn!(
            matches = matches.len(),
            "exclusive-ties resolution produced a non-bijective assignment"
        );
    }

    Assignment { matches, bijective }
}

fn is_bijective(matches: &[MatchCandidate]) -> bool {
    let mut left_seen = HashSet::new();
    let mut right_seen = HashSet::new();
    matches.iter().all(|candidate| {
        let pair = candidate.pair();
        left_seen.insert(pair.left) && right_seen.insert(pair.right)
    })
}

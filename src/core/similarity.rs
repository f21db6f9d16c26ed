use crate::models::{CandidatePair, Listing, ScoredPair};

/// Winkler prefix scaling factor
const WINKLER_SCALING: f64 = 0.1;

/// Maximum shared prefix length rewarded by the Winkler adjustment
const MAX_PREFIX_LEN: usize = 4;

/// Calculate the Jaro similarity between two strings
///
/// # Arguments
/// * `s1` - First string
/// * `s2` - Second string
///
/// # Returns
/// Similarity in [0, 1]; 1.0 for identical non-empty strings, 0.0 when
/// either string is empty. The empty case is pinned to 0.0 so that a record
/// with a missing field can never be mistaken for a perfect match.
pub fn jaro(s1: &str, s2: &str) -> f64 {
    if s1.is_empty() || s2.is_empty() {
        return 0.0;
    }

    let chars1: Vec<char> = s1.chars().collect();
    let chars2: Vec<char> = s2.chars().collect();
    let len1 = chars1.len();
    let len2 = chars2.len();

    // Characters count as matching within a window of
    // floor(max(len1, len2) / 2) - 1 positions.
    let window = (len1.max(len2) / 2).saturating_sub(1);

    let mut matched1 = vec![false; len1];
    let mut matched2 = vec![false; len2];
    let mut matches = 0usize;

    for i in 0..len1 {
        let start = i.saturating_sub(window);
        let end = (i + window + 1).min(len2);
        for j in start..end {
            if matched2[j] || chars1[i] != chars2[j] {
                continue;
            }
            matched1[i] = true;
            matched2[j] = true;
            matches += 1;
            break;
        }
    }

    if matches == 0 {
        return 0.0;
    }

    // Matched characters appearing in a different order count as
    // transpositions, two per swap.
    let mut transpositions = 0usize;
    let mut k = 0usize;
    for i in 0..len1 {
        if !matched1[i] {
            continue;
        }
        while !matched2[k] {
            k += 1;
        }
        if chars1[i] != chars2[k] {
            transpositions += 1;
        }
        k += 1;
    }

    let m = matches as f64;
    let t = (transpositions / 2) as f64;

    (m / len1 as f64 + m / len2 as f64 + (m - t) / m) / 3.0
}

/// Calculate the Jaro-Winkler similarity between two strings
///
/// Boosts the Jaro score by up to 4 characters of shared prefix, which suits
/// accommodation titles where variants usually diverge at the tail
/// ("hotel roma" vs "hotel roma centro").
///
/// # Returns
/// Similarity in [0, 1], never below the plain Jaro score.
pub fn jaro_winkler(s1: &str, s2: &str) -> f64 {
    let base = jaro(s1, s2);

    let prefix = s1
        .chars()
        .zip(s2.chars())
        .take(MAX_PREFIX_LEN)
        .take_while(|(c1, c2)| c1 == c2)
        .count();

    base + prefix as f64 * WINKLER_SCALING * (1.0 - base)
}

/// Score one candidate pair on its configured attributes
///
/// Title is always scored; city is scored only when `score_city` is set. A
/// missing city is scored as the empty string and therefore contributes 0.0.
pub fn score_pair(
    pair: CandidatePair,
    left: &Listing,
    right: &Listing,
    score_city: bool,
) -> ScoredPair {
    let title = jaro_winkler(&left.title_normalized, &right.title_normalized);

    let city = if score_city {
        Some(jaro_winkler(
            left.city_normalized.as_deref().unwrap_or(""),
            right.city_normalized.as_deref().unwrap_or(""),
        ))
    } else {
        None
    };

    ScoredPair { pair, title, city }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings_score_one() {
        assert_eq!(jaro("hotel roma", "hotel roma"), 1.0);
        assert_eq!(jaro_winkler("hotel roma", "hotel roma"), 1.0);
    }

    #[test]
    fn test_empty_strings_score_zero() {
        assert_eq!(jaro("", "hotel roma"), 0.0);
        assert_eq!(jaro("hotel roma", ""), 0.0);
        assert_eq!(jaro("", ""), 0.0);
        assert_eq!(jaro_winkler("", ""), 0.0);
    }

    #[test]
    fn test_classic_jaro_values() {
        // Winkler's record-linkage examples
        assert!((jaro("martha", "marhta") - 0.9444).abs() < 0.001);
        assert!((jaro_winkler("martha", "marhta") - 0.9611).abs() < 0.001);
        assert!((jaro("dwayne", "duane") - 0.8222).abs() < 0.001);
    }

    #[test]
    fn test_prefix_bonus_never_lowers_score() {
        let pairs = [
            ("hotel roma", "hotel rome"),
            ("grand hotel", "grand hostel"),
            ("milano", "milan"),
            ("pensione stella", "stella pensione"),
        ];
        for (a, b) in pairs {
            assert!(jaro_winkler(a, b) >= jaro(a, b));
        }
    }

    #[test]
    fn test_scores_stay_in_unit_interval() {
        let samples = [
            ("hotel roma", "hotel roma centro"),
            ("a", "zzzz"),
            ("albergo del sole", "albergo el sole"),
            ("x", "x"),
            ("roma", "rome"),
        ];
        for (a, b) in samples {
            let score = jaro_winkler(a, b);
            assert!((0.0..=1.0).contains(&score), "{a} vs {b} gave {score}");
        }
    }

    #[test]
    fn test_no_common_characters() {
        assert_eq!(jaro("abc", "xyz"), 0.0);
        assert_eq!(jaro_winkler("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_deterministic() {
        let first = jaro_winkler("hotel venezia laguna", "hotel laguna venezia");
        let second = jaro_winkler("hotel venezia laguna", "hotel laguna venezia");
        assert_eq!(first, second);
    }

    #[test]
    fn test_score_pair_missing_city_scores_zero() {
        let left = listing("left-0", "hotel roma", Some("roma"));
        let right = listing("right-0", "hotel roma", None);

        let scored = score_pair(CandidatePair { left: 0, right: 0 }, &left, &right, true);
        assert_eq!(scored.title, 1.0);
        assert_eq!(scored.city, Some(0.0));
    }

    #[test]
    fn test_score_pair_without_city_component() {
        let left = listing("left-0", "hotel roma", Some("roma"));
        let right = listing("right-0", "hotel roma", Some("roma"));

        let scored = score_pair(CandidatePair { left: 0, right: 0 }, &left, &right, false);
        assert_eq!(scored.city, None);
        assert_eq!(scored.component_mean(), scored.title);
    }

    fn listing(source_id: &str, title: &str, city: Option<&str>) -> Listing {
        Listing {
            source_id: source_id.to_string(),
            title: title.to_string(),
            title_normalized: title.to_string(),
            city: city.map(str::to_string),
            city_normalized: city.map(str::to_string),
            zone: None,
            price: None,
            distance_center_km: None,
            review_score: None,
            review_word: None,
            review_count: None,
            nights: None,
            persons: None,
            stay_start: None,
            stay_end: None,
        }
    }
}

//! Score normalization and weighted aggregation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Suffix marking raw-measurement entries stored alongside their score.
///
/// Raw entries carry the unnormalized value (seconds, megabytes, counts) for
/// display. They never collide with configured weight keys, so aggregation
/// ignores them automatically.
pub const RAW_SUFFIX: &str = "_raw";

/// Convert a raw metric where *lower is better* into a 0-10 score.
///
/// Anything at or better than `best` scores 10, anything at or worse than
/// `worst` scores 0, with linear interpolation in between. `worst` must be
/// strictly greater than `best`; bands are fixed per metric family so this
/// is a configuration invariant, not a per-call check.
pub fn normalize(value: f64, best: f64, worst: f64) -> f64 {
    if value <= best {
        return 10.0;
    }
    if value >= worst {
        return 0.0;
    }
    10.0 - 10.0 * (value - best) / (worst - best)
}

/// Score a fewer-is-better count against a floor-and-ceiling band.
///
/// Algebraically the same clamped-linear law as [`normalize`] with
/// `best = floor, worst = ceiling`, kept in the count-oriented form the
/// dependency band is documented in.
pub fn count_score(count: u32, floor: u32, ceiling: u32) -> f64 {
    let raw = 10.0 - (count as f64 - floor as f64) * 10.0 / (ceiling as f64 - floor as f64);
    raw.clamp(0.0, 10.0)
}

/// Partial mapping of metric name to 0-10 score for one project evaluation.
///
/// Created fresh per evaluation and never merged across runs. Collectors
/// write disjoint key sets by convention; [`ScoreMap::merge`] is a
/// last-writer-wins union and the disjointness convention is asserted in
/// tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreMap {
    entries: BTreeMap<String, f64>,
}

impl ScoreMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a normalized score for a metric.
    pub fn insert_score(&mut self, metric: &str, score: f64) {
        self.entries.insert(metric.to_string(), score);
    }

    /// Record the unnormalized measurement for a metric, for display.
    pub fn insert_raw(&mut self, metric: &str, value: f64) {
        self.entries.insert(format!("{metric}{RAW_SUFFIX}"), value);
    }

    pub fn score(&self, metric: &str) -> Option<f64> {
        self.entries.get(metric).copied()
    }

    pub fn raw(&self, metric: &str) -> Option<f64> {
        self.entries.get(&format!("{metric}{RAW_SUFFIX}")).copied()
    }

    pub fn contains(&self, metric: &str) -> bool {
        self.entries.contains_key(metric)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Union another partial result into this map, last writer wins.
    ///
    /// Returns the number of keys that were overwritten so callers (and
    /// tests) can detect a collector breaking the disjoint-keys convention.
    pub fn merge(&mut self, other: ScoreMap) -> usize {
        let mut overwritten = 0;
        for (key, value) in other.entries {
            if self.entries.insert(key, value).is_some() {
                overwritten += 1;
            }
        }
        overwritten
    }
}

/// Weighted mean over only the metrics actually present in `scores`.
///
/// Missing metrics are excluded from both numerator and denominator rather
/// than imputed as zero, so two projects missing different metric subsets
/// stay comparable on the metrics they share. An empty intersection yields
/// 0.0.
pub fn weighted_total(scores: &ScoreMap, weights: &BTreeMap<String, f64>) -> f64 {
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (metric, weight) in weights {
        if let Some(score) = scores.score(metric) {
            numerator += score * weight;
            denominator += weight;
        }
    }
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_endpoints() {
        assert_eq!(normalize(5.0, 5.0, 60.0), 10.0);
        assert_eq!(normalize(60.0, 5.0, 60.0), 0.0);
        assert_eq!(normalize(32.5, 5.0, 60.0), 5.0);
    }

    #[test]
    fn test_normalize_clamps_outside_band() {
        assert_eq!(normalize(0.1, 1.0, 50.0), 10.0);
        assert_eq!(normalize(500.0, 1.0, 50.0), 0.0);
    }

    #[test]
    fn test_normalize_monotonic_and_bounded() {
        let mut prev = f64::INFINITY;
        for i in 0..200 {
            let value = i as f64 * 0.5;
            let score = normalize(value, 5.0, 60.0);
            assert!((0.0..=10.0).contains(&score));
            assert!(score <= prev, "score must not increase as value worsens");
            prev = score;
        }
    }

    #[test]
    fn test_count_score_dependency_band() {
        assert_eq!(count_score(20, 20, 100), 10.0);
        assert_eq!(count_score(60, 20, 100), 5.0);
        assert_eq!(count_score(100, 20, 100), 0.0);
        assert_eq!(count_score(120, 20, 100), 0.0);
        assert_eq!(count_score(5, 20, 100), 10.0);
    }

    #[test]
    fn test_count_score_matches_normalize() {
        for count in [0u32, 20, 37, 60, 99, 100, 150] {
            let a = count_score(count, 20, 100);
            let b = normalize(count as f64, 20.0, 100.0);
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_weighted_total_excludes_absent_metrics() {
        let mut weights = BTreeMap::new();
        weights.insert("a".to_string(), 0.5);
        weights.insert("b".to_string(), 0.5);

        let mut scores = ScoreMap::new();
        scores.insert_score("a", 10.0);

        // Absent "b" drops out of numerator and denominator both.
        assert_eq!(weighted_total(&scores, &weights), 10.0);
    }

    #[test]
    fn test_weighted_total_empty_scores() {
        let mut weights = BTreeMap::new();
        weights.insert("a".to_string(), 0.7);
        weights.insert("b".to_string(), 0.3);

        assert_eq!(weighted_total(&ScoreMap::new(), &weights), 0.0);
    }

    #[test]
    fn test_weighted_total_ignores_unconfigured_metrics() {
        let mut weights = BTreeMap::new();
        weights.insert("a".to_string(), 1.0);

        let mut scores = ScoreMap::new();
        scores.insert_score("a", 4.0);
        scores.insert_score("rogue", 10.0);
        scores.insert_raw("a", 123.0);

        assert_eq!(weighted_total(&scores, &weights), 4.0);
    }

    #[test]
    fn test_weighted_total_weighting() {
        let mut weights = BTreeMap::new();
        weights.insert("a".to_string(), 0.75);
        weights.insert("b".to_string(), 0.25);

        let mut scores = ScoreMap::new();
        scores.insert_score("a", 8.0);
        scores.insert_score("b", 4.0);

        assert!((weighted_total(&scores, &weights) - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_merge_disjoint_keys() {
        let mut left = ScoreMap::new();
        left.insert_score("build_time", 9.0);
        left.insert_raw("build_time", 7.2);

        let mut right = ScoreMap::new();
        right.insert_score("code_quality", 10.0);

        let overwritten = left.merge(right);
        assert_eq!(overwritten, 0, "collectors must write disjoint key sets");
        assert_eq!(left.score("build_time"), Some(9.0));
        assert_eq!(left.score("code_quality"), Some(10.0));
    }

    #[test]
    fn test_merge_reports_overwrites() {
        let mut left = ScoreMap::new();
        left.insert_score("a", 1.0);

        let mut right = ScoreMap::new();
        right.insert_score("a", 2.0);

        assert_eq!(left.merge(right), 1);
        assert_eq!(left.score("a"), Some(2.0));
    }

    #[test]
    fn test_raw_entries_are_parallel() {
        let mut scores = ScoreMap::new();
        scores.insert_score("bundle_size", 6.5);
        scores.insert_raw("bundle_size", 18.4);

        assert_eq!(scores.score("bundle_size"), Some(6.5));
        assert_eq!(scores.raw("bundle_size"), Some(18.4));
        assert!(scores.contains("bundle_size_raw"));
    }
}

//! Frequency-based relevance scoring.
//!
//! The scorer answers "what is this entity talking about right now" with a
//! closed-form heuristic: term frequency over rolling global frequency
//! (an online TF/IDF without document counts), followed by two shaping
//! passes tuned for perceptual stability:
//!
//! 1. **Constituent boost** — unigrams that appear inside several top-ranked
//!    multi-word phrases get multiplied up, so the core word of a phrase
//!    cluster dominates the output.
//! 2. **Variance shaping** — every score is raised to an exponent > 1,
//!    stretching the gap between strong and weak signals. Scores are
//!    relative, not probabilities; nothing is re-normalized.

use crate::config::EngineConfig;
use crate::stats::{TokenCountMap, TokenStatsStore};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// One scored token or phrase. Produced fresh on every scoring call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredTopic {
    pub token: String,
    pub score: f64,
    /// Raw local weight at scoring time.
    pub count: f64,
}

/// Relevance scorer over a local token map and the global table.
#[derive(Clone, Debug)]
pub struct RelevanceScorer {
    constituent_boost: f64,
    boost_window: usize,
    variance_exponent: f64,
    min_token_len: usize,
    stop_words: HashSet<String>,
}

impl RelevanceScorer {
    /// Build a scorer from the engine configuration. The stop-word set is
    /// copied once here; scoring itself allocates only the result list.
    pub fn from_config(cfg: &EngineConfig) -> Self {
        Self {
            constituent_boost: cfg.constituent_boost,
            boost_window: cfg.boost_window,
            variance_exponent: cfg.variance_exponent,
            min_token_len: cfg.min_token_len,
            stop_words: cfg.stop_words.clone(),
        }
    }

    /// Score a local map against the global table.
    ///
    /// Returns at most `limit` topics, ordered by the documented comparator:
    /// score descending, token ascending on ties.
    pub fn score(
        &self,
        local: &TokenCountMap,
        local_total: f64,
        store: &TokenStatsStore,
        limit: usize,
    ) -> Vec<ScoredTopic> {
        if local.is_empty() {
            return Vec::new();
        }

        // zero totals are floored to 1, fractional (decayed) totals pass through
        let local_total = if local_total > 0.0 { local_total } else { 1.0 };
        let global_total = if store.total() > 0.0 {
            store.total()
        } else {
            1.0
        };

        let mut scores: Vec<ScoredTopic> = local
            .iter()
            .map(|(token, &count)| {
                let tf = count / local_total;
                let global_freq = store.denominator_weight(token) / global_total;
                ScoredTopic {
                    token: token.clone(),
                    score: tf / global_freq,
                    count,
                }
            })
            .collect();

        scores.sort_by(Self::compare);
        self.boost_constituents(&mut scores);
        self.shape_variance(&mut scores);
        scores.sort_by(Self::compare);
        scores.truncate(limit);
        scores
    }

    /// Population-wide top tokens, scored by raw global weight.
    ///
    /// TF/IDF cancels out against the global set itself, so this skips the
    /// division and applies the same boost and variance passes to a
    /// `3 * limit` candidate window.
    pub fn global_top(&self, store: &TokenStatsStore, limit: usize) -> Vec<ScoredTopic> {
        if store.is_empty() {
            return Vec::new();
        }

        let mut scores: Vec<ScoredTopic> = store
            .iter()
            .map(|(token, weight)| ScoredTopic {
                token: token.to_string(),
                score: weight,
                count: weight,
            })
            .collect();

        scores.sort_by(Self::compare);
        scores.truncate(limit.saturating_mul(3));
        self.boost_constituents(&mut scores);
        self.shape_variance(&mut scores);
        scores.sort_by(Self::compare);
        scores.truncate(limit);
        scores
    }

    /// Documented comparator: score descending, token ascending on ties.
    /// NaN scores compare equal and fall back to the token tie-break.
    fn compare(a: &ScoredTopic, b: &ScoredTopic) -> Ordering {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.token.cmp(&b.token))
    }

    /// Single non-recursive constituent pass over the top of a sorted list.
    ///
    /// Counts how many distinct top phrases contain each qualifying unigram,
    /// then multiplies matching unigram entries by
    /// `1 + occurrences * constituent_boost`. Boosted unigrams do not feed
    /// back into other phrases' counts.
    fn boost_constituents(&self, scores: &mut [ScoredTopic]) {
        let window = self.boost_window.min(scores.len());
        let mut constituent_freq: HashMap<String, u32> = HashMap::new();

        for cand in &scores[..window] {
            let parts: Vec<&str> = cand
                .token
                .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
                .filter(|p| !p.is_empty())
                .collect();
            if parts.len() < 2 {
                continue;
            }
            for part in parts {
                let clean = part.to_lowercase();
                if clean.len() >= self.min_token_len && !self.stop_words.contains(&clean) {
                    *constituent_freq.entry(clean).or_insert(0) += 1;
                }
            }
        }

        if constituent_freq.is_empty() {
            return;
        }

        for entry in scores.iter_mut() {
            if let Some(&freq) = constituent_freq.get(&entry.token.to_lowercase()) {
                entry.score *= 1.0 + freq as f64 * self.constituent_boost;
            }
        }
    }

    fn shape_variance(&self, scores: &mut [ScoredTopic]) {
        for entry in scores.iter_mut() {
            entry.score = entry.score.powf(self.variance_exponent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn scorer() -> RelevanceScorer {
        RelevanceScorer::from_config(&EngineConfig::default())
    }

    fn local(entries: &[(&str, f64)]) -> TokenCountMap {
        entries.iter().map(|(t, c)| (t.to_string(), *c)).collect()
    }

    fn empty_store() -> TokenStatsStore {
        TokenStatsStore::new(0.992, 0.1, 0.998)
    }

    #[test]
    fn test_empty_local_map_yields_empty() {
        let result = scorer().score(&TokenCountMap::new(), 0.0, &empty_store(), 10);
        assert!(result.is_empty());
    }

    #[test]
    fn test_raw_score_monotonic_in_count() {
        // Fixed global stats, two locals differing only in one count.
        let s = scorer();
        let store = empty_store();

        let low = s.score(&local(&[("kernel", 2.0), ("probe", 2.0)]), 4.0, &store, 10);
        let high = s.score(&local(&[("kernel", 3.0), ("probe", 2.0)]), 5.0, &store, 10);

        let find = |r: &[ScoredTopic], t: &str| {
            r.iter().find(|x| x.token == t).map(|x| x.score).unwrap()
        };
        // kernel's relative standing strictly improves
        assert!(find(&high, "kernel") / find(&high, "probe")
            > find(&low, "kernel") / find(&low, "probe"));
    }

    #[test]
    fn test_result_bounded_by_limit() {
        let s = scorer();
        let store = empty_store();
        let map: TokenCountMap = (0..100)
            .map(|i| (format!("token{i:03}"), 1.0 + i as f64))
            .collect();

        let result = s.score(&map, 5000.0, &store, 7);
        assert_eq!(result.len(), 7);
    }

    #[test]
    fn test_locally_frequent_globally_rare_wins() {
        let s = scorer();
        let mut store = empty_store();
        let mut other = TokenCountMap::new();
        // "common" is heavy everywhere, "niche" only here
        store.merge(
            &mut other,
            &[("common".to_string(), 500.0)].into_iter().collect(),
            3,
            &std::collections::HashSet::new(),
        );

        let result = s.score(&local(&[("common", 5.0), ("niche", 5.0)]), 10.0, &store, 10);
        assert_eq!(result[0].token, "niche");
    }

    #[test]
    fn test_constituent_boost_scenario() {
        // merge {"ai":5,"model":5,"ai model":8} with an empty global table;
        // "ai model" should rank above or comparable to its constituents,
        // and "model" (a constituent of the top phrase) gets boosted.
        let cfg = EngineConfig {
            min_token_len: 2, // let "ai" through for this scenario
            stop_words: std::collections::HashSet::new(),
            ..EngineConfig::default()
        };
        let s = RelevanceScorer::from_config(&cfg);
        let store = empty_store();

        let map = local(&[("ai", 5.0), ("model", 5.0), ("ai model", 8.0)]);
        let result = s.score(&map, 18.0, &store, 10);
        assert_eq!(result.len(), 3);

        let score_of = |t: &str| result.iter().find(|x| x.token == t).unwrap().score;
        // Unboosted, "ai" and "model" (5/18 each) sit below "ai model"
        // (8/18). Each appears once in the top phrase, so the 2.5x boost
        // lifts them to the top; the phrase stays comparable, not buried.
        assert!(score_of("ai") > score_of("ai model"));
        assert!(score_of("model") > score_of("ai model"));
        assert!(score_of("ai model") > score_of("ai") * 0.3);
    }

    #[test]
    fn test_tie_break_is_lexicographic() {
        let s = scorer();
        let store = empty_store();
        let result = s.score(&local(&[("zeta", 4.0), ("alpha", 4.0)]), 8.0, &store, 10);
        assert_eq!(result[0].token, "alpha");
        assert_eq!(result[1].token, "zeta");
    }

    #[test]
    fn test_global_top_bounded_and_sorted() {
        let s = scorer();
        let mut store = empty_store();
        let mut sink = TokenCountMap::new();
        let batch: std::collections::HashMap<String, f64> = (0..30)
            .map(|i| (format!("token{i:03}"), 1.0 + i as f64))
            .collect();
        store.merge(&mut sink, &batch, 3, &std::collections::HashSet::new());

        let result = s.global_top(&store, 5);
        assert_eq!(result.len(), 5);
        for pair in result.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert_eq!(result[0].token, "token029");
    }

    #[test]
    fn test_global_top_empty_store() {
        assert!(scorer().global_top(&empty_store(), 5).is_empty());
    }
}

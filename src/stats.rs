//! Rolling token-frequency statistics.
//!
//! [`TokenStatsStore`] owns the process-wide token table used as the
//! denominator of relevance scoring: "how common is this token across the
//! whole observed population *right now*". The table is rolling, not
//! all-time — [`TokenStatsStore::decay`] must run on a fixed cadence so the
//! distribution keeps tracking recent content.
//!
//! No other component mutates the global table; merge, decay, and every
//! scorer read go through this interface so the two views of the state can
//! never diverge.

use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Entity-local token weights, keyed by case-normalized token or phrase.
///
/// Owned by the entity collaborator; the engine only merges into and reads
/// from it.
pub type TokenCountMap = HashMap<String, f64>;

/// Global rolling token-frequency table with a running total.
#[derive(Clone, Debug)]
pub struct TokenStatsStore {
    tokens: HashMap<String, f64>,
    total: f64,
    decay_rate: f64,
    epsilon: f64,
    local_decay_rate: f64,
}

impl TokenStatsStore {
    /// Create an empty store.
    ///
    /// - `decay_rate`: per-tick multiplier for [`decay`](Self::decay)
    /// - `epsilon`: weight below which decayed entries are dropped
    /// - `local_decay_rate`: per-tick multiplier for
    ///   [`decay_local`](Self::decay_local)
    pub fn new(decay_rate: f64, epsilon: f64, local_decay_rate: f64) -> Self {
        Self {
            tokens: HashMap::new(),
            total: 0.0,
            decay_rate,
            epsilon,
            local_decay_rate,
        }
    }

    /// Merge a batch of raw counts into an entity-local map and the global
    /// table. Returns the total mass added so the caller can maintain its
    /// running local total.
    ///
    /// Entries with a non-positive count, tokens shorter than
    /// `min_token_len`, and stop words are skipped. No-op on an empty batch.
    pub fn merge(
        &mut self,
        local: &mut TokenCountMap,
        batch: &HashMap<String, f64>,
        min_token_len: usize,
        stop_words: &HashSet<String>,
    ) -> f64 {
        let mut added = 0.0;
        for (token, &count) in batch {
            if count <= 0.0 || token.len() < min_token_len {
                continue;
            }
            if stop_words.contains(token.to_lowercase().as_str()) {
                continue;
            }

            *local.entry(token.clone()).or_insert(0.0) += count;
            *self.tokens.entry(token.clone()).or_insert(0.0) += count;
            self.total += count;
            added += count;
        }
        added
    }

    /// Apply one decay tick to the global table.
    ///
    /// Every entry is multiplied by the decay rate; entries falling below
    /// epsilon are removed and the total is recomputed from the survivors.
    pub fn decay(&mut self) {
        if self.tokens.is_empty() {
            return;
        }
        let rate = self.decay_rate;
        let epsilon = self.epsilon;
        let mut new_total = 0.0;
        self.tokens.retain(|_, weight| {
            *weight *= rate;
            if *weight < epsilon {
                false
            } else {
                new_total += *weight;
                true
            }
        });
        self.total = new_total;
    }

    /// Apply one decay tick to an entity-local map, returning its new total.
    ///
    /// Same contract as the global decay (drop below epsilon) but with the
    /// slower local rate, so entity windows outlive the population window.
    pub fn decay_local(&self, local: &mut TokenCountMap) -> f64 {
        let rate = self.local_decay_rate;
        let epsilon = self.epsilon;
        let mut new_total = 0.0;
        local.retain(|_, weight| {
            *weight *= rate;
            if *weight < epsilon {
                false
            } else {
                new_total += *weight;
                true
            }
        });
        new_total
    }

    /// Emergency sweep: if the table has grown past `cap` distinct tokens,
    /// drop everything below `floor`. Bounds memory when the stream is
    /// mostly junk that merges faster than it decays.
    pub fn emergency_trim(&mut self, cap: usize, floor: f64) {
        if self.tokens.len() <= cap {
            return;
        }
        let before = self.tokens.len();
        let mut new_total = 0.0;
        self.tokens.retain(|_, weight| {
            if *weight < floor {
                false
            } else {
                new_total += *weight;
                true
            }
        });
        self.total = new_total;
        debug!(before, after = self.tokens.len(), "emergency global token trim");
    }

    /// Global weight for a token when used as a scoring denominator.
    ///
    /// Unseen tokens read as 1.0: novel tokens must not produce infinite
    /// scores, and division by zero is impossible by construction.
    pub fn denominator_weight(&self, token: &str) -> f64 {
        match self.tokens.get(token) {
            Some(&w) => w,
            None => 1.0,
        }
    }

    /// Iterate the raw global entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.tokens.iter().map(|(t, &w)| (t.as_str(), w))
    }

    /// Running total weight across all global entries.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Number of distinct tokens currently tracked.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

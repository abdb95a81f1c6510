//! # Netprism: Telemetry Relevance & Fingerprint Engine
//!
//! Netprism watches a continuous stream of token counts and traffic
//! counters per network entity (a domain or sub-domain) and answers two
//! questions in real time:
//!
//! - **"What is this entity talking about right now?"** — an online
//!   TF-over-global-frequency relevance score with hysteresis, so the
//!   visible topic set per entity is stable instead of flickering.
//! - **"How unusual is this entity relative to its peers?"** — an
//!   8-dimension fingerprint normalized against the current population,
//!   with a Euclidean "weirdness" score and a named most-deviant dimension.
//!
//! Everything is a closed-form, explainable heuristic cheap enough to run
//! many times per second. Memory is bounded by three independent pruning
//! mechanisms (global decay-to-epsilon, per-topic idle/value pruning, and
//! population-membership pruning) because the input stream is unbounded.
//!
//! ## Quick Start
//!
//! ```rust
//! use netprism::{Engine, TokenCountMap};
//! use std::collections::HashMap;
//!
//! let mut engine = Engine::new();
//! let mut local = TokenCountMap::new();
//!
//! // Collaborator pushes a token batch attributed to an entity.
//! let batch: HashMap<String, f64> =
//!     [("quantum".to_string(), 4.0), ("entanglement".to_string(), 2.0)]
//!         .into_iter()
//!         .collect();
//! let local_total = engine.merge_tokens(&mut local, &batch);
//!
//! // Per tick: decay global stats, then pull visible topics.
//! engine.decay_global_tokens();
//! let targets = engine.visual_targets("example.com", &local, local_total, 16.0);
//! for t in &targets {
//!     println!("{} strength={:.2} rank={}", t.token, t.strength, t.rank);
//! }
//! ```
//!
//! ## Concurrency model
//!
//! Single-threaded, cooperative, tick-driven. Every entry point is a
//! synchronous call over state owned exclusively by the engine; cadence
//! (per-frame scoring, ~1 Hz global decay and fingerprinting) is driven by
//! the caller. There are no timers, no blocking calls, and no cancellation.

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod scorer;
pub mod stats;
pub mod stopwords;
pub mod visibility;

// Re-exports for convenience
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use fingerprint::{
    EntityFingerprinter, Fingerprint, FingerprintReport, Metric, RawEntityStat, METRIC_COUNT,
};
pub use scorer::{RelevanceScorer, ScoredTopic};
pub use stats::{TokenCountMap, TokenStatsStore};
pub use visibility::{TopicVisibilityTracker, VisualTarget};

use std::collections::HashMap;

/// The main engine - primary interface for all operations.
///
/// Owns the global token statistics, the relevance scorer, the per-entity
/// visibility tracker, and the fingerprinter. Collaborators own entity
/// lifecycle and entity-local token maps; the engine only merges into and
/// reads from them.
pub struct Engine {
    config: EngineConfig,
    stats: TokenStatsStore,
    scorer: RelevanceScorer,
    tracker: TopicVisibilityTracker,
    fingerprinter: EntityFingerprinter,
}

impl Engine {
    /// Create an engine with the default (production-tuned) configuration.
    pub fn new() -> Self {
        // the default configuration always validates
        Self::with_config(EngineConfig::default()).expect("default EngineConfig must be valid")
    }

    /// Create an engine with an explicit configuration.
    ///
    /// Fails if the configuration breaks an engine invariant, e.g. an enter
    /// threshold below the exit threshold.
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let stats = TokenStatsStore::new(
            config.global_decay_rate,
            config.decay_epsilon,
            config.local_decay_rate,
        );
        let scorer = RelevanceScorer::from_config(&config);
        let tracker = TopicVisibilityTracker::from_config(&config);
        Ok(Self {
            config,
            stats,
            scorer,
            tracker,
            fingerprinter: EntityFingerprinter,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // =========================================================================
    // Token statistics
    // =========================================================================

    /// Merge a batch of raw counts into an entity-local map and the global
    /// table. Returns the mass added so the caller can keep a running local
    /// total.
    pub fn merge_tokens(&mut self, local: &mut TokenCountMap, batch: &HashMap<String, f64>) -> f64 {
        self.stats.merge(
            local,
            batch,
            self.config.min_token_len,
            &self.config.stop_words,
        )
    }

    /// Apply one decay tick to the global table. Call on a fixed cadence so
    /// "globally common" keeps meaning "recently common".
    pub fn decay_global_tokens(&mut self) {
        self.stats.decay();
    }

    /// Apply one decay tick to an entity-local map, returning its new total.
    /// Shares the decay contract (epsilon floor) with the global table.
    pub fn decay_local_tokens(&self, local: &mut TokenCountMap) -> f64 {
        self.stats.decay_local(local)
    }

    /// Direct read access to the global statistics.
    pub fn stats(&self) -> &TokenStatsStore {
        &self.stats
    }

    // =========================================================================
    // Relevance scoring
    // =========================================================================

    /// Top relevance-scored topics for one entity's local map.
    pub fn top_tokens(
        &self,
        local: &TokenCountMap,
        local_total: f64,
        limit: usize,
    ) -> Vec<ScoredTopic> {
        self.scorer.score(local, local_total, &self.stats, limit)
    }

    /// Population-wide top tokens by raw global weight.
    pub fn global_top_tokens(&self, limit: usize) -> Vec<ScoredTopic> {
        self.scorer.global_top(&self.stats, limit)
    }

    // =========================================================================
    // Topic visibility
    // =========================================================================

    /// Score an entity's local map and run the result through the
    /// visibility state machine, returning the topics a consumer should
    /// show right now.
    ///
    /// `now` should be playback time, not wall-clock time, so pausing and
    /// replay behave as expected. An empty or zero-total local map winds
    /// down existing state without introducing candidates.
    pub fn visual_targets(
        &mut self,
        entity: &str,
        local: &TokenCountMap,
        local_total: f64,
        now: f64,
    ) -> Vec<VisualTarget> {
        if local.is_empty() || local_total <= 0.0 {
            return self.tracker.decay_only(entity, now);
        }
        let scores =
            self.scorer
                .score(local, local_total, &self.stats, self.config.candidate_limit);
        self.tracker.observe(entity, &scores, now)
    }

    /// Wind down an entity's topic state for a pass that produced nothing.
    pub fn decay_entity_topics(&mut self, entity: &str, now: f64) -> Vec<VisualTarget> {
        self.tracker.decay_only(entity, now)
    }

    /// Currently visible topics for an entity, without advancing state.
    pub fn entity_visual_targets(&self, entity: &str) -> Vec<VisualTarget> {
        self.tracker.visible_targets(entity)
    }

    /// Drop topic state for entities no longer alive, and sweep the global
    /// table if it has grown pathologically large.
    pub fn prune<I, S>(&mut self, active_keys: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tracker.prune(active_keys);
        self.stats.emergency_trim(
            self.config.global_table_cap,
            self.config.emergency_trim_floor,
        );
    }

    // =========================================================================
    // Fingerprinting
    // =========================================================================

    /// Compute normalized fingerprints, the population average profile, and
    /// per-entity anomaly scores for a population snapshot.
    pub fn compute_fingerprints(
        &self,
        population: &[(String, RawEntityStat)],
    ) -> FingerprintReport {
        self.fingerprinter.compute(population)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

//! Engine configuration.
//!
//! Every empirically tuned constant in the engine lives here as a named,
//! overridable field. The defaults are the production values; they were
//! tuned for perceptual stability, not derived from a model, so behavioral
//! parity matters more than re-deriving "better" numbers.

use crate::error::{EngineError, Result};
use crate::stopwords::default_stop_words;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Tunable parameters for the whole engine.
///
/// # Example
///
/// ```rust
/// use netprism::EngineConfig;
///
/// let cfg = EngineConfig {
///     max_visible_topics: 10,
///     ..EngineConfig::default()
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum visible topics emitted per entity.
    pub max_visible_topics: usize,
    /// Candidate list size fed into the visibility tracker each pass.
    pub candidate_limit: usize,
    /// Normalized value a topic must reach to become visible.
    pub enter_threshold: f64,
    /// Normalized value below which a visible topic starts exiting.
    pub exit_threshold: f64,
    /// Milliseconds a value must hold above enter (or below exit) before
    /// the visibility flag flips. Zero means immediate transitions.
    pub min_enter_duration_ms: f64,
    /// Milliseconds of silence before a topic state is discarded.
    pub max_idle_ms: f64,

    /// Per-tick multiplier on every global table entry (~1.5 s half-life
    /// at 60 ticks/s with the default).
    pub global_decay_rate: f64,
    /// Global entries decaying below this weight are removed.
    pub decay_epsilon: f64,
    /// Per-tick multiplier for entity-local token decay (~5 s half-life).
    pub local_decay_rate: f64,
    /// Distinct-token count that triggers an emergency global sweep.
    pub global_table_cap: usize,
    /// Weight floor applied during an emergency sweep.
    pub emergency_trim_floor: f64,

    /// Tokens shorter than this never enter the tables.
    pub min_token_len: usize,
    /// Score multiplier per appearance of a unigram inside top phrases.
    pub constituent_boost: f64,
    /// Number of top candidates scanned for constituent unigrams.
    pub boost_window: usize,
    /// Exponent (> 1) stretching the gap between strong and weak scores.
    pub variance_exponent: f64,

    /// Fraction of the previous value retained when smoothing a topic that
    /// scored this pass (the remainder comes from the new observation).
    pub smoothing_retain: f64,
    /// Per-pass multiplier for topics absent from the current scoring pass.
    pub absent_decay: f64,
    /// Topic values below this floor are pruned outright.
    pub value_floor: f64,

    /// Tokens filtered out of every merge. Defaults to the built-in list.
    #[serde(skip)]
    pub stop_words: HashSet<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_visible_topics: 30,
            candidate_limit: 60,
            enter_threshold: 0.01,
            exit_threshold: 0.005,
            min_enter_duration_ms: 0.0,
            max_idle_ms: 60_000.0,
            global_decay_rate: 0.992,
            decay_epsilon: 0.1,
            local_decay_rate: 0.998,
            global_table_cap: 20_000,
            emergency_trim_floor: 1.0,
            min_token_len: 3,
            constituent_boost: 1.5,
            boost_window: 40,
            variance_exponent: 1.3,
            smoothing_retain: 0.7,
            absent_decay: 0.9,
            value_floor: 0.02,
            stop_words: default_stop_words(),
        }
    }
}

impl EngineConfig {
    /// Check the configuration for combinations that break the engine's
    /// invariants.
    ///
    /// `enter_threshold < exit_threshold` is the classic misuse: a topic
    /// entering at the lower bar could never fall back out.
    pub fn validate(&self) -> Result<()> {
        if self.enter_threshold < self.exit_threshold {
            return Err(EngineError::ThresholdOrder {
                enter: self.enter_threshold,
                exit: self.exit_threshold,
            });
        }

        for (name, value) in [
            ("global_decay_rate", self.global_decay_rate),
            ("local_decay_rate", self.local_decay_rate),
            ("smoothing_retain", self.smoothing_retain),
            ("absent_decay", self.absent_decay),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(EngineError::InvalidFactor { name, value });
            }
        }

        for (name, value) in [
            ("variance_exponent", self.variance_exponent),
            ("decay_epsilon", self.decay_epsilon),
            ("max_visible_topics", self.max_visible_topics as f64),
            ("candidate_limit", self.candidate_limit as f64),
        ] {
            if value <= 0.0 {
                return Err(EngineError::NonPositive { name, value });
            }
        }

        Ok(())
    }
}

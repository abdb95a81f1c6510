//! Topic visibility hysteresis.
//!
//! Raw relevance scores flicker: a topic can hover around a threshold and
//! toggle on and off every tick, which is exactly what the consuming layer
//! must never see. The tracker smooths each topic's normalized score into a
//! slow-moving `value` and runs a per-(entity, token) state machine:
//!
//! ```text
//! Entering --value >= enter for min_enter_duration--> Visible
//! Visible  --value < exit--------------------------> Exiting
//! Exiting  --value >= exit-------------------------> Visible
//! Exiting  --below exit for min_enter_duration-----> Entering (hidden)
//! ```
//!
//! `Visible` and `Exiting` states are both emitted: a topic stays on screen
//! until it has genuinely spent the confirmation window below the exit
//! threshold. States are pruned when idle or when their value decays to a
//! negligible floor, so silent entities cannot grow memory without bound.

use crate::config::EngineConfig;
use crate::scorer::ScoredTopic;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Lifecycle phase of one tracked topic.
#[derive(Clone, Copy, Debug, PartialEq)]
enum TopicPhase {
    /// Candidate, not emitted. `since` is set while the value holds above
    /// the enter threshold.
    Entering { since: Option<f64> },
    /// Emitted.
    Visible,
    /// Still emitted; the value dropped below the exit threshold at
    /// `below_since` and the exit is pending confirmation.
    Exiting { below_since: f64 },
}

/// Smoothed per-topic state.
#[derive(Clone, Debug)]
struct TopicState {
    value: f64,
    phase: TopicPhase,
    last_seen_at: f64,
}

/// One emitted topic: what the rendering layer actually consumes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisualTarget {
    pub token: String,
    /// Smoothed, normalized weight in [0, 1].
    pub strength: f64,
    /// Position in the emitted list, 0 = strongest.
    pub rank: usize,
}

/// Hysteresis tracker for every (entity, token) pair.
#[derive(Clone, Debug)]
pub struct TopicVisibilityTracker {
    enter_threshold: f64,
    exit_threshold: f64,
    min_enter_duration_ms: f64,
    max_idle_ms: f64,
    smoothing_retain: f64,
    absent_decay: f64,
    value_floor: f64,
    max_visible: usize,

    /// entity key -> token -> state
    states: HashMap<String, HashMap<String, TopicState>>,
}

impl TopicVisibilityTracker {
    pub fn from_config(cfg: &EngineConfig) -> Self {
        Self {
            enter_threshold: cfg.enter_threshold,
            exit_threshold: cfg.exit_threshold,
            min_enter_duration_ms: cfg.min_enter_duration_ms,
            max_idle_ms: cfg.max_idle_ms,
            smoothing_retain: cfg.smoothing_retain,
            absent_decay: cfg.absent_decay,
            value_floor: cfg.value_floor,
            max_visible: cfg.max_visible_topics,
            states: HashMap::new(),
        }
    }

    /// Feed one scoring pass for an entity and collect its visible topics.
    ///
    /// Scores are normalized against the best score of this pass, placing
    /// every entity on a common scale regardless of absolute magnitude.
    /// An empty score list falls through to [`decay_only`](Self::decay_only).
    pub fn observe(
        &mut self,
        entity: &str,
        scores: &[ScoredTopic],
        now: f64,
    ) -> Vec<VisualTarget> {
        if scores.is_empty() {
            return self.decay_only(entity, now);
        }

        let state = self.states.entry(entity.to_string()).or_default();
        let best = scores[0].score;
        let mut active: HashSet<&str> = HashSet::with_capacity(scores.len());

        for topic in scores {
            active.insert(topic.token.as_str());
            let normalized = if best > 0.0 {
                (topic.score / best).min(1.0)
            } else {
                0.0
            };
            match state.get_mut(&topic.token) {
                Some(existing) => {
                    existing.value = existing.value * self.smoothing_retain
                        + normalized * (1.0 - self.smoothing_retain);
                    existing.last_seen_at = now;
                }
                None => {
                    state.insert(
                        topic.token.clone(),
                        TopicState {
                            value: normalized,
                            phase: TopicPhase::Entering { since: None },
                            last_seen_at: now,
                        },
                    );
                }
            }
        }

        // Topics tracked but absent from this pass wind down.
        for (token, topic) in state.iter_mut() {
            if !active.contains(token.as_str()) {
                topic.value *= self.absent_decay;
            }
        }

        Self::step(
            state,
            now,
            self.enter_threshold,
            self.exit_threshold,
            self.min_enter_duration_ms,
            self.max_idle_ms,
            self.value_floor,
        );
        Self::collect(state, self.max_visible)
    }

    /// Tick an entity that produced zero tokens this pass: existing state
    /// keeps winding down, no new candidates appear.
    pub fn decay_only(&mut self, entity: &str, now: f64) -> Vec<VisualTarget> {
        let Some(state) = self.states.get_mut(entity) else {
            return Vec::new();
        };
        for topic in state.values_mut() {
            topic.value *= self.absent_decay;
        }
        Self::step(
            state,
            now,
            self.enter_threshold,
            self.exit_threshold,
            self.min_enter_duration_ms,
            self.max_idle_ms,
            self.value_floor,
        );
        Self::collect(state, self.max_visible)
    }

    /// Currently visible topics for an entity without advancing any state.
    pub fn visible_targets(&self, entity: &str) -> Vec<VisualTarget> {
        match self.states.get(entity) {
            Some(state) => Self::collect(state, self.max_visible),
            None => Vec::new(),
        }
    }

    /// Drop all state for entities no longer in the active set.
    pub fn prune<I, S>(&mut self, active_keys: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let active: HashSet<String> = active_keys
            .into_iter()
            .map(|k| k.as_ref().to_string())
            .collect();
        let before = self.states.len();
        self.states.retain(|key, _| active.contains(key));
        if self.states.len() < before {
            debug!(
                removed = before - self.states.len(),
                remaining = self.states.len(),
                "pruned dead entity topic state"
            );
        }
    }

    /// Number of entities with tracked state.
    pub fn entity_count(&self) -> usize {
        self.states.len()
    }

    /// Total tracked (entity, token) states.
    pub fn state_count(&self) -> usize {
        self.states.values().map(|s| s.len()).sum()
    }

    /// Prune stale topics and advance every phase one tick.
    fn step(
        state: &mut HashMap<String, TopicState>,
        now: f64,
        enter: f64,
        exit: f64,
        min_duration: f64,
        max_idle: f64,
        floor: f64,
    ) {
        state.retain(|_, topic| {
            let idle = now - topic.last_seen_at;
            if idle > max_idle || topic.value < floor {
                return false;
            }

            topic.phase = match topic.phase {
                TopicPhase::Entering { since } => {
                    if topic.value >= enter {
                        match since {
                            None => TopicPhase::Entering { since: Some(now) },
                            Some(t0) if now - t0 >= min_duration => TopicPhase::Visible,
                            keep => TopicPhase::Entering { since: keep },
                        }
                    } else {
                        TopicPhase::Entering { since: None }
                    }
                }
                TopicPhase::Visible => {
                    if topic.value < exit {
                        TopicPhase::Exiting { below_since: now }
                    } else {
                        TopicPhase::Visible
                    }
                }
                TopicPhase::Exiting { below_since } => {
                    if topic.value >= exit {
                        TopicPhase::Visible
                    } else if now - below_since > min_duration {
                        TopicPhase::Entering { since: None }
                    } else {
                        TopicPhase::Exiting { below_since }
                    }
                }
            };
            true
        });
    }

    fn collect(state: &HashMap<String, TopicState>, max_visible: usize) -> Vec<VisualTarget> {
        let mut visible: Vec<(&String, f64)> = state
            .iter()
            .filter(|(_, t)| {
                matches!(t.phase, TopicPhase::Visible | TopicPhase::Exiting { .. })
                    && t.value > 0.0
            })
            .map(|(token, t)| (token, t.value))
            .collect();

        visible.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        visible.truncate(max_visible);

        visible
            .into_iter()
            .enumerate()
            .map(|(rank, (token, value))| VisualTarget {
                token: token.clone(),
                strength: value.clamp(0.0, 1.0),
                rank,
            })
            .collect()
    }
}

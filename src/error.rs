//! Error types for netprism.

use thiserror::Error;

/// Engine error types.
///
/// The engine has no fatal runtime errors: numeric edge cases (empty maps,
/// zero totals, zero-variance populations) resolve to documented defaults.
/// Errors only arise from configuration misuse at construction time.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Enter threshold below exit threshold would make a topic immortal
    /// once visible.
    #[error("enter threshold ({enter}) must be >= exit threshold ({exit})")]
    ThresholdOrder { enter: f64, exit: f64 },

    /// A decay or smoothing factor outside (0, 1] breaks convergence.
    #[error("invalid {name}: {value} (must be in (0, 1])")]
    InvalidFactor { name: &'static str, value: f64 },

    /// A limit or exponent that must be strictly positive.
    #[error("invalid {name}: {value} (must be > 0)")]
    NonPositive { name: &'static str, value: f64 },
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

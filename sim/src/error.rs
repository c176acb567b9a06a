//! Error types for simulation setup.

use thiserror::Error;

/// Errors raised while building a simulation from configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A size, speed, interval or count that must be strictly positive.
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    /// A probability outside `[0, 1]`.
    #[error("{field} must be within [0, 1], got {value}")]
    ProbabilityOutOfRange { field: &'static str, value: f64 },

    /// The formation grid has no cells.
    #[error("formation grid is empty: {rows}x{cols}")]
    EmptyFormation { rows: u32, cols: u32 },

    /// The bonus flyer has no point values to draw from.
    #[error("bonus flyer point table is empty")]
    EmptyPointTable,

    /// JSON configuration could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

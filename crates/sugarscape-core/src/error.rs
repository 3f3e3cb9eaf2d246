//! Error types for simulation setup and oracle calls.
//!
//! Only configuration problems and resource placement exhaustion abort a
//! run. Oracle failures are absorbed by the tick pipeline and turned into
//! the default `Stay` decision.

use thiserror::Error;

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors that can abort a simulation run.
#[derive(Debug, Clone, Error)]
pub enum SimError {
    /// Configuration rejected before any tick ran.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Resource placement could not find a free cell within its attempt budget.
    #[error("Capacity exhausted: placed {placed} of {requested} resource cells after {attempts} attempts")]
    CapacityExhausted {
        placed: usize,
        requested: usize,
        attempts: usize,
    },

    /// I/O errors (wrapped).
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization errors.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for SimError {
    fn from(e: std::io::Error) -> Self {
        SimError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for SimError {
    fn from(e: serde_json::Error) -> Self {
        SimError::Serialization(e.to_string())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Invalid value.
    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
    /// Out of range.
    #[error("{field} out of range: {value} (must be {min}-{max})")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },
}

// Convenience constructors
impl SimError {
    pub fn invalid_config(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        SimError::Config(ConfigError::InvalidValue {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        })
    }

    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, value: f64) -> Self {
        SimError::Config(ConfigError::OutOfRange {
            field: field.into(),
            min,
            max,
            value,
        })
    }

    /// Whether this error came from configuration validation.
    pub fn is_config(&self) -> bool {
        matches!(self, SimError::Config(_))
    }
}

/// Failures of a single oracle call.
///
/// These never leave the tick: the pipeline logs them and substitutes
/// the fallback decision.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OracleError {
    #[error("oracle call timed out after {0} ms")]
    Timeout(u64),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("oracle unavailable: {0}")]
    Unavailable(String),
}

/// Result type for oracle calls.
pub type OracleResult<T> = std::result::Result<T, OracleError>;

//! Error types for motes.
//!
//! Only configuration loading can fail. Simulation paths recover from
//! degenerate input on their own and report it through `log` instead.

use std::fmt;

/// Errors that can occur while loading or validating a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration text is not valid JSON for [`ParticleSystemConfig`](crate::ParticleSystemConfig).
    Json(serde_json::Error),
    /// A field holds a value the simulation cannot use.
    Invalid {
        /// Dotted path of the offending field, e.g. `emitter.shape.radius`.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Json(e) => write!(f, "Failed to parse particle system config: {}", e),
            ConfigError::Invalid { field, reason } => {
                write!(f, "Invalid value for `{}`: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Json(e) => Some(e),
            ConfigError::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

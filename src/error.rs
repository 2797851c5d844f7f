//! Error types for the fishing agent

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the fishing agent.
///
/// Only startup and persistence can fail. Everything that goes wrong while
/// fishing is handled by resetting or recasting on a later tick.
#[derive(Debug, Error)]
pub enum FisherError {
    /// A host-side toggle the agent depends on is switched off
    #[error("{reason}")]
    StartupPrecondition { reason: String },

    /// The settings file exists but could not be parsed
    #[error("invalid settings file {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl FisherError {
    /// Error returned when the host is not loading entities or mobs
    pub fn entities_not_loaded() -> Self {
        FisherError::StartupPrecondition {
            reason: "'Load entities' & 'Load mobs' must be enabled.".to_string(),
        }
    }
}

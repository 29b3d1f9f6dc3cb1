//! Error types for the physics core.

use thiserror::Error;

use crate::physics::body::BodyHandle;

/// Result alias used throughout the crate.
pub type Result<T, E = PhysicsError> = std::result::Result<T, E>;

/// Errors raised by the physics core.
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// A setter or constructor received a value outside its valid range.
    #[error("invalid {name}: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// An environment preset name did not match any known preset.
    #[error("unknown environment preset '{name}', available: {}", .available.join(", "))]
    UnknownPreset {
        name: String,
        available: Vec<&'static str>,
    },

    /// A string could not be parsed into one of the crate's named enums.
    #[error("unknown {kind} '{value}', expected one of: {expected}")]
    UnknownName {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },

    /// No template is registered under this name.
    #[error("unknown template '{0}'")]
    UnknownTemplate(String),

    /// The handle does not refer to a live body.
    #[error("body {0:?} is not in the body set")]
    UnknownBody(BodyHandle),

    /// A body behavior hook failed. The fixed step it ran in was aborted.
    #[error("{hook} hook failed on body {body:?}")]
    Hook {
        body: BodyHandle,
        hook: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl PhysicsError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

//! Error types.

use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced by action dispatch.
///
/// Geometry is never an error: rows and columns are clamped.
pub enum EditError {
    #[error("unknown action '{0}'")]
    /// No action is registered under this key.
    UnknownAction(String),

    #[error("action '{action}' expects {expected}")]
    /// The action was given an input it cannot use.
    InvalidInput {
        /// Key of the invoked action.
        action: String,
        /// Description of the accepted input.
        expected: &'static str,
    },

    #[error("action '{action}' cannot replay a '{descriptor}' descriptor")]
    /// A replay action received a descriptor registered under another key.
    DescriptorMismatch {
        /// Key of the invoked action.
        action: String,
        /// Key of the descriptor that was passed.
        descriptor: &'static str,
    },

    #[error("invalid regex: {0}")]
    /// A search pattern failed to compile.
    InvalidRegex(#[from] regex::Error),
}

//! Error types for the navigator.
//!
//! None of these reach the navigator's callers: the grouping tracker logs
//! them and carries on with its previous state.

use treeline_core::SignalError;

/// Result type alias for navigator operations.
pub type Result<T> = std::result::Result<T, NavigatorError>;

/// Errors that can occur in the navigator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigatorError {
    /// Attaching to or detaching from a notification source failed.
    #[error(transparent)]
    Subscription(#[from] SubscriptionError),

    /// Reading a flag from a notification source failed.
    #[error(transparent)]
    FlagRead(#[from] FlagReadError),
}

/// Failure to attach to or detach from a notification source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubscriptionError {
    /// No state model is registered for the extension.
    #[error("No state model registered for extension '{extension_id}'")]
    StateModelNotFound { extension_id: String },

    /// The source has been closed and no longer accepts listeners.
    #[error("Notification source is closed")]
    SourceClosed,

    /// The subscription handle is not (or no longer) known to the source.
    #[error("Unknown subscription")]
    UnknownSubscription,
}

impl From<SignalError> for SubscriptionError {
    fn from(err: SignalError) -> Self {
        match err {
            SignalError::InvalidConnection => Self::UnknownSubscription,
        }
    }
}

/// Failure to read a boolean flag from a notification source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlagReadError {
    /// The source has been closed.
    #[error("Notification source is closed")]
    SourceClosed,

    /// The property exists but does not hold a boolean.
    #[error("Property '{property}' is not a boolean")]
    NotBoolean { property: String },
}

impl FlagReadError {
    /// Create a type-mismatch error.
    pub fn not_boolean(property: impl Into<String>) -> Self {
        Self::NotBoolean {
            property: property.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SubscriptionError::StateModelNotFound {
            extension_id: "ext.id".to_string(),
        };
        assert_eq!(err.to_string(), "No state model registered for extension 'ext.id'");

        let err = NavigatorError::from(FlagReadError::not_boolean("flag"));
        assert_eq!(err.to_string(), "Property 'flag' is not a boolean");
    }

    #[test]
    fn test_signal_error_conversion() {
        let err = SubscriptionError::from(SignalError::InvalidConnection);
        assert_eq!(err, SubscriptionError::UnknownSubscription);
    }
}

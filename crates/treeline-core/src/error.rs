//! Error types for Treeline core.

use std::fmt;

/// Errors raised while handing work to the interaction thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The interaction thread has been stopped and accepts no more work.
    NotRunning,
    /// The interaction thread's queue is at capacity.
    QueueFull,
    /// The task panicked while running on the interaction thread.
    TaskPanicked(String),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRunning => write!(f, "The interaction thread is not running"),
            Self::QueueFull => write!(f, "The interaction thread queue is full"),
            Self::TaskPanicked(msg) => {
                write!(f, "Task panicked on the interaction thread: {msg}")
            }
        }
    }
}

impl std::error::Error for DispatchError {}

/// Signal-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    /// The connection ID is invalid or has already been disconnected.
    InvalidConnection,
}

impl fmt::Display for SignalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConnection => write!(f, "Invalid or disconnected connection ID"),
        }
    }
}

impl std::error::Error for SignalError {}

//! Logging facilities for Treeline.
//!
//! Treeline uses the `tracing` crate for instrumentation. The library never
//! installs a subscriber; to see logs, install one in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!     // Your application code...
//! }
//! ```
//!
//! Failures that the navigator recovers from locally (a state model that
//! cannot be subscribed to, a flag that cannot be read) are reported through
//! [`log_error`] and then discarded.

use std::error::Error;

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "treeline_core";
    /// Interaction-thread runtime target.
    pub const INTERACTION: &str = "treeline_core::interaction";
    /// Dispatcher target.
    pub const DISPATCH: &str = "treeline_core::dispatch";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "treeline_core::signal";
    /// Grouping-mode tracker target.
    pub const GROUPING: &str = "treeline_navigator::grouping";
    /// Extension state model target.
    pub const STATE_MODEL: &str = "treeline_navigator::state_model";
}

/// Report a recovered error.
///
/// Emits a single `error` event with the error's display text and its source
/// chain. This never fails and never panics.
pub fn log_error<E>(target: &'static str, error: &E)
where
    E: Error + ?Sized,
{
    let mut causes = Vec::new();
    let mut source = error.source();
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }

    // `tracing` requires a literal target, so dispatch on the known ones.
    match target {
        targets::GROUPING => {
            tracing::error!(target: "treeline_navigator::grouping", error = %error, ?causes)
        }
        targets::STATE_MODEL => {
            tracing::error!(target: "treeline_navigator::state_model", error = %error, ?causes)
        }
        targets::DISPATCH => {
            tracing::error!(target: "treeline_core::dispatch", error = %error, ?causes)
        }
        targets::INTERACTION => {
            tracing::error!(target: "treeline_core::interaction", error = %error, ?causes)
        }
        targets::SIGNAL => {
            tracing::error!(target: "treeline_core::signal", error = %error, ?causes)
        }
        _ => tracing::error!(target: targets::CORE, origin = target, error = %error, ?causes),
    }
}

/// Extract a readable message from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "inner failure")
        }
    }

    impl Error for Inner {}

    #[derive(Debug)]
    struct Outer(Inner);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "outer failure")
        }
    }

    impl Error for Outer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_log_error_never_panics() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        log_error(targets::GROUPING, &Outer(Inner));
        log_error(targets::STATE_MODEL, &Inner);
        log_error(targets::SIGNAL, &Outer(Inner));
        log_error("some::other::target", &Outer(Inner));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");

        let payload: Box<dyn std::any::Any + Send> = Box::new(7_u32);
        assert_eq!(panic_message(payload.as_ref()), "<non-string panic payload>");
    }
}

//! Core systems for Treeline.
//!
//! This crate provides the foundational pieces the project navigator is built
//! on:
//!
//! - **Interaction thread**: a single designated thread that owns view state
//! - **Dispatcher**: run work on that thread synchronously or asynchronously,
//!   without deadlocking when the caller is already on it
//! - **Signal/Slot System**: change notification between components
//! - **Property System**: values with change detection
//! - **Logging**: `tracing` targets and the recovered-error reporter
//!
//! # Dispatch Example
//!
//! ```
//! use std::sync::Arc;
//! use treeline_core::{Dispatcher, InteractionThread};
//!
//! let ui = Arc::new(InteractionThread::new());
//! let dispatcher = Dispatcher::new(ui.clone());
//!
//! // Blocks until the closure has run on the interaction thread.
//! let thread_name = dispatcher
//!     .run_sync(|| std::thread::current().name().map(str::to_string))
//!     .unwrap();
//! assert_eq!(thread_name.as_deref(), Some("treeline-ui"));
//!
//! ui.stop_and_join();
//! ```
//!
//! # Signal Example
//!
//! ```
//! use treeline_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```

pub mod dispatch;
mod error;
pub mod interaction;
pub mod logging;
pub mod property;
pub mod signal;
pub mod thread_check;

pub use dispatch::Dispatcher;
pub use error::{DispatchError, SignalError};
pub use interaction::{
    InteractionRuntime, InteractionThread, InteractionThreadBuilder, InteractionThreadConfig, Task,
};
pub use property::Property;
pub use signal::{ConnectionId, ConnectionType, Signal};

//! Running work on the interaction thread.
//!
//! [`Dispatcher`] is the only sanctioned way for code elsewhere to touch view
//! state. It offers two entry points:
//!
//! - [`Dispatcher::run_sync`]: run now if already on the interaction thread,
//!   otherwise block until the task has run there.
//! - [`Dispatcher::run_async`] / [`Dispatcher::run_async_with`]: queue the
//!   task on the interaction thread and return immediately, optionally
//!   running it in place when the caller is already on that thread.
//!
//! The "already on the thread" branches exist so nested calls from
//! interaction-thread code never wait on themselves.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use treeline_core::dispatch::Dispatcher;
//! use treeline_core::interaction::InteractionThread;
//!
//! let ui = Arc::new(InteractionThread::new());
//! let dispatcher = Dispatcher::new(ui.clone());
//!
//! let answer = dispatcher.run_sync(|| 6 * 7).unwrap();
//! assert_eq!(answer, 42);
//!
//! dispatcher.run_async(|| println!("later, on the interaction thread")).unwrap();
//! ui.stop_and_join();
//! ```

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::error::DispatchError;
use crate::interaction::InteractionRuntime;

/// Process-wide dispatcher, installed once at startup.
static GLOBAL_DISPATCHER: OnceLock<Dispatcher> = OnceLock::new();

/// Marshals units of work onto the interaction thread.
///
/// Cloning is cheap; clones share the same runtime.
#[derive(Clone)]
pub struct Dispatcher {
    runtime: Arc<dyn InteractionRuntime>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("on_interaction_thread", &self.runtime.is_interaction_thread())
            .finish()
    }
}

impl Dispatcher {
    /// Create a dispatcher over the given runtime.
    pub fn new(runtime: Arc<dyn InteractionRuntime>) -> Self {
        Self { runtime }
    }

    /// Install the process-wide dispatcher.
    ///
    /// Returns `false` if one was already installed; the existing dispatcher
    /// is kept.
    pub fn install_global(dispatcher: Dispatcher) -> bool {
        GLOBAL_DISPATCHER.set(dispatcher).is_ok()
    }

    /// The process-wide dispatcher, if one has been installed.
    pub fn global() -> Option<&'static Dispatcher> {
        GLOBAL_DISPATCHER.get()
    }

    /// Whether the caller is running on the interaction thread.
    pub fn is_interaction_thread(&self) -> bool {
        self.runtime.is_interaction_thread()
    }

    /// Run `task` on the interaction thread and return its result.
    ///
    /// On the interaction thread the task runs immediately in the caller's
    /// frame, and a panic unwinds through the caller. From any other thread
    /// the caller blocks until the task has run; a panic there is caught and
    /// returned as [`DispatchError::TaskPanicked`].
    ///
    /// There is no timeout. A task that never finishes blocks the caller
    /// forever.
    pub fn run_sync<F, R>(&self, task: F) -> Result<R, DispatchError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.runtime.is_interaction_thread() {
            return Ok(task());
        }

        tracing::trace!(target: "treeline_core::dispatch", "blocking on interaction thread");
        let (result_sender, result_receiver) = crossbeam_channel::bounded(1);
        self.runtime.run_blocking(Box::new(move || {
            let _ = result_sender.send(task());
        }))?;
        result_receiver.recv().map_err(|_| DispatchError::NotRunning)
    }

    /// Queue `task` on the interaction thread without waiting for it.
    ///
    /// Equivalent to `run_async_with(task, false)`: even on the interaction
    /// thread the task is deferred behind work already queued.
    pub fn run_async<F>(&self, task: F) -> Result<(), DispatchError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.run_async_with(task, false)
    }

    /// Queue `task` on the interaction thread, or run it in place.
    ///
    /// When the caller is on the interaction thread and
    /// `immediate_if_on_thread` is `true`, the task runs before this returns.
    /// In every other case it is queued and this returns immediately; the
    /// caller does not observe its completion. A queued task that panics is
    /// logged on the interaction thread.
    pub fn run_async_with<F>(&self, task: F, immediate_if_on_thread: bool) -> Result<(), DispatchError>
    where
        F: FnOnce() + Send + 'static,
    {
        if immediate_if_on_thread && self.runtime.is_interaction_thread() {
            task();
            return Ok(());
        }

        tracing::trace!(target: "treeline_core::dispatch", "scheduling on interaction thread");
        self.runtime.schedule(Box::new(task))
    }
}

static_assertions::assert_impl_all!(Dispatcher: Send, Sync, Clone);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::Task;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// A runtime whose "interaction thread" is whoever calls `pump`.
    struct ManualRuntime {
        on_thread: bool,
        queue: Mutex<VecDeque<Task>>,
    }

    impl ManualRuntime {
        fn new(on_thread: bool) -> Arc<Self> {
            Arc::new(Self {
                on_thread,
                queue: Mutex::new(VecDeque::new()),
            })
        }

        fn next_task(&self) -> Option<Task> {
            self.queue.lock().pop_front()
        }

        fn pump(&self) -> usize {
            let mut count = 0;
            while let Some(task) = self.next_task() {
                task();
                count += 1;
            }
            count
        }
    }

    impl InteractionRuntime for ManualRuntime {
        fn is_interaction_thread(&self) -> bool {
            self.on_thread
        }

        fn run_blocking(&self, task: Task) -> Result<(), DispatchError> {
            task();
            Ok(())
        }

        fn schedule(&self, task: Task) -> Result<(), DispatchError> {
            self.queue.lock().push_back(task);
            Ok(())
        }
    }

    #[test]
    fn test_run_async_defers_even_on_thread() {
        let runtime = ManualRuntime::new(true);
        let dispatcher = Dispatcher::new(runtime.clone());
        let log = Arc::new(Mutex::new(Vec::new()));

        let log_clone = log.clone();
        dispatcher.run_async(move || log_clone.lock().push("t1")).unwrap();
        let log_clone = log.clone();
        dispatcher.run_async(move || log_clone.lock().push("t2")).unwrap();
        log.lock().push("frame");

        assert_eq!(runtime.pump(), 2);
        assert_eq!(*log.lock(), vec!["frame", "t1", "t2"]);
    }

    #[test]
    fn test_run_async_immediate_on_thread() {
        let runtime = ManualRuntime::new(true);
        let dispatcher = Dispatcher::new(runtime.clone());
        let log = Arc::new(Mutex::new(Vec::new()));

        let log_clone = log.clone();
        dispatcher
            .run_async_with(move || log_clone.lock().push("task"), true)
            .unwrap();
        log.lock().push("after");

        assert_eq!(runtime.pump(), 0);
        assert_eq!(*log.lock(), vec!["task", "after"]);
    }

    #[test]
    fn test_run_async_immediate_off_thread_is_queued() {
        let runtime = ManualRuntime::new(false);
        let dispatcher = Dispatcher::new(runtime.clone());
        let log = Arc::new(Mutex::new(Vec::new()));

        let log_clone = log.clone();
        dispatcher
            .run_async_with(move || log_clone.lock().push("task"), true)
            .unwrap();
        log.lock().push("after");

        assert_eq!(runtime.pump(), 1);
        assert_eq!(*log.lock(), vec!["after", "task"]);
    }

    #[test]
    fn test_run_sync_on_thread_runs_in_place() {
        let runtime = ManualRuntime::new(true);
        let dispatcher = Dispatcher::new(runtime.clone());

        assert_eq!(dispatcher.run_sync(|| "done").unwrap(), "done");
        assert_eq!(runtime.pump(), 0);
    }

    #[test]
    fn test_run_sync_on_thread_propagates_panic() {
        let runtime = ManualRuntime::new(true);
        let dispatcher = Dispatcher::new(runtime);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            dispatcher.run_sync(|| -> i32 { panic!("in place") })
        }));
        assert!(result.is_err());
    }
}

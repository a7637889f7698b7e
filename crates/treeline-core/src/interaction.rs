//! The interaction thread: a single dedicated thread that owns view state.
//!
//! All mutations to the visible tree happen on one designated thread. This
//! module defines the capability the dispatcher needs from such a thread
//! ([`InteractionRuntime`]) and a ready-made implementation,
//! [`InteractionThread`], which runs queued tasks in FIFO order on a named
//! thread of its own.
//!
//! Any runtime with a single-owner execution context (an event loop, an
//! actor, a test harness) can implement [`InteractionRuntime`] instead.
//!
//! # Example
//!
//! ```
//! use treeline_core::interaction::{InteractionRuntime, InteractionThread};
//!
//! let ui = InteractionThread::new();
//! assert!(!ui.is_interaction_thread());
//!
//! ui.schedule(Box::new(|| println!("running on the interaction thread")))
//!     .unwrap();
//! ui.stop_and_join();
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};
use parking_lot::{Condvar, Mutex};

use crate::error::DispatchError;
use crate::logging::panic_message;
use crate::thread_check::ThreadAffinity;

/// Default capacity for the interaction thread's task queue.
const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// How often an idle interaction thread re-checks for shutdown.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A unit of work handed to the interaction thread.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// The capability the dispatcher requires from an interaction thread.
pub trait InteractionRuntime: Send + Sync {
    /// Whether the calling thread is the interaction thread.
    fn is_interaction_thread(&self) -> bool;

    /// Run `task` on the interaction thread and block until it has finished.
    ///
    /// A panic inside the task is caught on the interaction thread and
    /// reported as [`DispatchError::TaskPanicked`].
    fn run_blocking(&self, task: Task) -> Result<(), DispatchError>;

    /// Queue `task` to run later on the interaction thread and return
    /// immediately. Tasks run in the order they were scheduled.
    fn schedule(&self, task: Task) -> Result<(), DispatchError>;
}

/// Configuration for creating an [`InteractionThread`].
#[derive(Debug, Clone)]
pub struct InteractionThreadConfig {
    /// Name for the interaction thread.
    pub name: String,
    /// Stack size for the thread in bytes. `None` uses the default.
    pub stack_size: Option<usize>,
    /// Capacity of the task queue.
    pub queue_capacity: usize,
}

impl Default for InteractionThreadConfig {
    fn default() -> Self {
        Self {
            name: "treeline-ui".to_string(),
            stack_size: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl InteractionThreadConfig {
    /// Create a new configuration with the given thread name.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Builder for creating an [`InteractionThread`] with custom configuration.
#[derive(Debug, Default)]
pub struct InteractionThreadBuilder {
    config: InteractionThreadConfig,
}

impl InteractionThreadBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the thread name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set the stack size for the thread.
    pub fn stack_size(mut self, size: usize) -> Self {
        self.config.stack_size = Some(size);
        self
    }

    /// Set the task queue capacity.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Build and start the interaction thread.
    pub fn build(self) -> InteractionThread {
        InteractionThread::with_config(self.config)
    }
}

/// State shared between the handle and the thread.
struct ThreadState {
    running: AtomicBool,
    finished: AtomicBool,
    pending_tasks: AtomicUsize,
    shutdown_condvar: Condvar,
    shutdown_mutex: Mutex<()>,
}

impl ThreadState {
    fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
            finished: AtomicBool::new(false),
            pending_tasks: AtomicUsize::new(0),
            shutdown_condvar: Condvar::new(),
            shutdown_mutex: Mutex::new(()),
        }
    }

    fn signal_shutdown(&self) {
        self.finished.store(true, Ordering::Release);
        let _guard = self.shutdown_mutex.lock();
        self.shutdown_condvar.notify_all();
    }
}

enum Job {
    Run(Task),
    RunBlocking {
        task: Task,
        done: Sender<Result<(), DispatchError>>,
    },
    Shutdown,
}

/// A dedicated thread that executes tasks one at a time, in submission order.
///
/// Dropping the handle requests shutdown without blocking; tasks already
/// queued still run.
pub struct InteractionThread {
    sender: Sender<Job>,
    handle: Mutex<Option<JoinHandle<()>>>,
    state: Arc<ThreadState>,
    affinity: ThreadAffinity,
}

impl InteractionThread {
    /// Start an interaction thread with default configuration.
    pub fn new() -> Self {
        Self::with_config(InteractionThreadConfig::default())
    }

    /// Start an interaction thread with custom configuration.
    ///
    /// # Panics
    ///
    /// Panics if the operating system refuses to spawn the thread.
    pub fn with_config(config: InteractionThreadConfig) -> Self {
        let (sender, receiver) = bounded(config.queue_capacity);
        let state = Arc::new(ThreadState::new());
        let thread_state = state.clone();

        let mut builder = thread::Builder::new().name(config.name.clone());
        if let Some(stack_size) = config.stack_size {
            builder = builder.stack_size(stack_size);
        }

        let handle = builder
            .spawn(move || {
                run_loop(&receiver, &thread_state);
                thread_state.running.store(false, Ordering::Release);
                thread_state.signal_shutdown();
            })
            .expect("Failed to spawn interaction thread");

        let affinity = ThreadAffinity::from(handle.thread().id());
        tracing::debug!(
            target: "treeline_core::interaction",
            name = %config.name,
            capacity = config.queue_capacity,
            "interaction thread started"
        );

        Self {
            sender,
            handle: Mutex::new(Some(handle)),
            state,
            affinity,
        }
    }

    /// The affinity of the interaction thread.
    pub fn affinity(&self) -> ThreadAffinity {
        self.affinity
    }

    /// Check if the thread is still accepting work.
    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::Acquire)
    }

    /// Get the number of queued tasks that have not finished yet.
    pub fn pending_tasks(&self) -> usize {
        self.state.pending_tasks.load(Ordering::Acquire)
    }

    /// Request the thread to stop after running the tasks already queued.
    ///
    /// Non-blocking. New work is rejected with [`DispatchError::NotRunning`]
    /// from this point on.
    pub fn stop(&self) {
        self.state.running.store(false, Ordering::Release);
        let _ = self.sender.try_send(Job::Shutdown);
    }

    /// Wait for the thread to finish.
    ///
    /// Returns `true` if the thread was joined successfully, `false` if it
    /// was already joined or panicked. Must not be called from the
    /// interaction thread itself.
    pub fn join(&self) -> bool {
        if self.affinity.is_same_thread() {
            tracing::warn!(target: "treeline_core::interaction", "join() called from the interaction thread");
            return false;
        }
        let handle = self.handle.lock().take();
        match handle {
            Some(h) => h.join().is_ok(),
            None => false,
        }
    }

    /// Stop the thread and wait for it to finish.
    pub fn stop_and_join(&self) -> bool {
        self.stop();
        self.join()
    }

    /// Wait for the thread to finish with a timeout.
    ///
    /// Returns `true` if the thread finished within the timeout.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut guard = self.state.shutdown_mutex.lock();
        if self.state.finished.load(Ordering::Acquire) {
            return true;
        }
        let result = self.state.shutdown_condvar.wait_for(&mut guard, timeout);
        !result.timed_out()
    }

    fn submit(&self, job: Job, blocking: bool) -> Result<(), DispatchError> {
        if !self.is_running() {
            return Err(DispatchError::NotRunning);
        }

        self.state.pending_tasks.fetch_add(1, Ordering::AcqRel);
        let sent = if blocking {
            self.sender.send(job).map_err(|_| DispatchError::NotRunning)
        } else {
            self.sender.try_send(job).map_err(|err| match err {
                TrySendError::Full(_) => DispatchError::QueueFull,
                TrySendError::Disconnected(_) => DispatchError::NotRunning,
            })
        };

        if sent.is_err() {
            self.state.pending_tasks.fetch_sub(1, Ordering::AcqRel);
        }
        sent
    }
}

impl Default for InteractionThread {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InteractionThread {
    fn drop(&mut self) {
        self.stop();
    }
}

impl InteractionRuntime for InteractionThread {
    fn is_interaction_thread(&self) -> bool {
        self.affinity.is_same_thread()
    }

    fn run_blocking(&self, task: Task) -> Result<(), DispatchError> {
        // Queuing behind ourselves would never complete.
        if self.is_interaction_thread() {
            return execute(task);
        }

        let (done, finished) = bounded(1);
        self.submit(Job::RunBlocking { task, done }, true)?;
        finished.recv().unwrap_or(Err(DispatchError::NotRunning))
    }

    fn schedule(&self, task: Task) -> Result<(), DispatchError> {
        self.submit(Job::Run(task), false)
    }
}

/// Run a task, converting a panic into an error so the thread survives.
fn execute(task: Task) -> Result<(), DispatchError> {
    panic::catch_unwind(AssertUnwindSafe(task)).map_err(|payload| {
        let err = DispatchError::TaskPanicked(panic_message(payload.as_ref()));
        crate::logging::log_error(crate::logging::targets::INTERACTION, &err);
        err
    })
}

fn run_job(job: Job, state: &ThreadState) {
    match job {
        Job::Run(task) => {
            let _ = execute(task);
        }
        Job::RunBlocking { task, done } => {
            let _ = done.send(execute(task));
        }
        Job::Shutdown => return,
    }
    state.pending_tasks.fetch_sub(1, Ordering::AcqRel);
}

fn run_loop(receiver: &Receiver<Job>, state: &ThreadState) {
    loop {
        match receiver.recv_timeout(IDLE_POLL_INTERVAL) {
            Ok(Job::Shutdown) => break,
            Ok(job) => run_job(job, state),
            Err(RecvTimeoutError::Timeout) => {
                if !state.running.load(Ordering::Acquire) {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }

    // Drain what was queued before shutdown was requested.
    while let Ok(job) = receiver.try_recv() {
        run_job(job, state);
    }
    tracing::debug!(target: "treeline_core::interaction", "interaction thread stopped");
}

static_assertions::assert_impl_all!(InteractionThread: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicI32;

    #[test]
    fn test_interaction_thread_creation() {
        let ui = InteractionThread::new();
        assert!(ui.is_running());
        assert_eq!(ui.pending_tasks(), 0);
        assert!(!ui.is_interaction_thread());
        assert!(ui.stop_and_join());
        assert!(!ui.is_running());
    }

    #[test]
    fn test_builder_names_thread() {
        let ui = InteractionThreadBuilder::new()
            .name("test-ui")
            .queue_capacity(8)
            .build();

        let name = Arc::new(Mutex::new(None));
        let name_clone = name.clone();
        ui.run_blocking(Box::new(move || {
            *name_clone.lock() = thread::current().name().map(str::to_string);
        }))
        .unwrap();

        assert_eq!(name.lock().as_deref(), Some("test-ui"));
        ui.stop_and_join();
    }

    #[test]
    fn test_run_blocking_runs_on_interaction_thread() {
        let ui = Arc::new(InteractionThread::new());
        let on_thread = Arc::new(AtomicBool::new(false));

        let ui_clone = ui.clone();
        let on_thread_clone = on_thread.clone();
        ui.run_blocking(Box::new(move || {
            on_thread_clone.store(ui_clone.is_interaction_thread(), Ordering::SeqCst);
        }))
        .unwrap();

        assert!(on_thread.load(Ordering::SeqCst));
        ui.stop_and_join();
    }

    #[test]
    fn test_run_blocking_reports_panic_and_thread_survives() {
        let ui = InteractionThread::new();

        let result = ui.run_blocking(Box::new(|| panic!("boom")));
        assert_eq!(result, Err(DispatchError::TaskPanicked("boom".to_string())));

        let counter = Arc::new(AtomicI32::new(0));
        let counter_clone = counter.clone();
        ui.run_blocking(Box::new(move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        ui.stop_and_join();
    }

    #[test]
    fn test_graceful_shutdown_drains_queue() {
        let ui = InteractionThread::new();
        let counter = Arc::new(AtomicI32::new(0));

        for _ in 0..5 {
            let counter_clone = counter.clone();
            ui.schedule(Box::new(move || {
                thread::sleep(Duration::from_millis(5));
                counter_clone.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();
        }

        ui.stop();
        ui.join();
        assert_eq!(counter.load(Ordering::SeqCst), 5);
        assert_eq!(ui.pending_tasks(), 0);
    }

    #[test]
    fn test_rejects_work_after_stop() {
        let ui = InteractionThread::new();
        ui.stop_and_join();

        assert_eq!(ui.schedule(Box::new(|| {})), Err(DispatchError::NotRunning));
        assert_eq!(ui.run_blocking(Box::new(|| {})), Err(DispatchError::NotRunning));
    }

    #[test]
    fn test_schedule_reports_full_queue() {
        let ui = InteractionThreadBuilder::new().queue_capacity(1).build();
        let (release, gate) = bounded::<()>(0);

        // Occupy the thread so the queue cannot drain.
        ui.schedule(Box::new(move || {
            let _ = gate.recv();
        }))
        .unwrap();
        thread::sleep(Duration::from_millis(20));

        ui.schedule(Box::new(|| {})).unwrap();
        assert_eq!(ui.schedule(Box::new(|| {})), Err(DispatchError::QueueFull));

        release.send(()).unwrap();
        ui.stop_and_join();
    }

    #[test]
    fn test_wait_timeout_after_stop() {
        let ui = InteractionThread::new();
        ui.stop();
        assert!(ui.wait_timeout(Duration::from_secs(2)));
        ui.join();
    }
}

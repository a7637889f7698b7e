//! Integration tests for dispatching onto a real interaction thread.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use treeline_core::{DispatchError, Dispatcher, InteractionThread, InteractionThreadBuilder};

fn setup() -> (Arc<InteractionThread>, Dispatcher) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let ui = Arc::new(InteractionThreadBuilder::new().name("test-ui").build());
    let dispatcher = Dispatcher::new(ui.clone());
    (ui, dispatcher)
}

/// Wait until everything queued before this call has run.
fn flush(dispatcher: &Dispatcher) {
    dispatcher.run_sync(|| ()).unwrap();
}

#[test]
fn test_run_sync_from_caller_thread_runs_on_interaction_thread() {
    let (ui, dispatcher) = setup();

    let name = dispatcher
        .run_sync(|| thread::current().name().map(str::to_string))
        .unwrap();
    assert_eq!(name.as_deref(), Some("test-ui"));
    assert!(!dispatcher.is_interaction_thread());

    ui.stop_and_join();
}

#[test]
fn test_nested_run_sync_does_not_deadlock() {
    let (ui, dispatcher) = setup();

    let inner_dispatcher = dispatcher.clone();
    let (outer, inner) = dispatcher
        .run_sync(move || {
            let outer = thread::current().id();
            // Already on the interaction thread: must run in place.
            let inner = inner_dispatcher
                .run_sync(|| thread::current().id())
                .unwrap();
            (outer, inner)
        })
        .unwrap();

    assert_eq!(outer, inner);
    assert_eq!(ui.affinity().thread_id(), outer);
    ui.stop_and_join();
}

#[test]
fn test_run_sync_surfaces_panic_from_interaction_thread() {
    let (ui, dispatcher) = setup();

    let result = dispatcher.run_sync(|| -> u32 { panic!("task failed") });
    assert_eq!(
        result,
        Err(DispatchError::TaskPanicked("task failed".to_string()))
    );

    // The interaction thread survives the panic.
    assert_eq!(dispatcher.run_sync(|| 1 + 1).unwrap(), 2);
    ui.stop_and_join();
}

#[test]
fn test_run_sync_returns_task_result_unchanged() {
    let (ui, dispatcher) = setup();

    let ok: Result<u8, String> = dispatcher.run_sync(|| Ok(3)).unwrap();
    let err: Result<u8, String> = dispatcher.run_sync(|| Err("bad".to_string())).unwrap();
    assert_eq!(ok, Ok(3));
    assert_eq!(err, Err("bad".to_string()));

    ui.stop_and_join();
}

#[test]
fn test_run_async_from_interaction_thread_preserves_order() {
    let (ui, dispatcher) = setup();
    let log = Arc::new(Mutex::new(Vec::new()));

    let inner_dispatcher = dispatcher.clone();
    let inner_log = log.clone();
    dispatcher
        .run_sync(move || {
            let t1_log = inner_log.clone();
            inner_dispatcher
                .run_async(move || t1_log.lock().push("t1"))
                .unwrap();
            let t2_log = inner_log.clone();
            inner_dispatcher
                .run_async_with(move || t2_log.lock().push("t2"), false)
                .unwrap();
            inner_log.lock().push("frame");
        })
        .unwrap();

    flush(&dispatcher);
    assert_eq!(*log.lock(), vec!["frame", "t1", "t2"]);
    ui.stop_and_join();
}

#[test]
fn test_run_async_immediate_on_interaction_thread() {
    let (ui, dispatcher) = setup();
    let log = Arc::new(Mutex::new(Vec::new()));

    let inner_dispatcher = dispatcher.clone();
    let inner_log = log.clone();
    dispatcher
        .run_sync(move || {
            let task_log = inner_log.clone();
            inner_dispatcher
                .run_async_with(move || task_log.lock().push("task"), true)
                .unwrap();
            inner_log.lock().push("after");
        })
        .unwrap();

    assert_eq!(*log.lock(), vec!["task", "after"]);
    ui.stop_and_join();
}

#[test]
fn test_run_async_immediate_from_other_thread_is_scheduled() {
    let (ui, dispatcher) = setup();
    let ran_on = Arc::new(Mutex::new(None));

    let ran_on_clone = ran_on.clone();
    dispatcher
        .run_async_with(
            move || {
                thread::sleep(Duration::from_millis(20));
                *ran_on_clone.lock() = Some(thread::current().id());
            },
            true,
        )
        .unwrap();

    // Returned without waiting for the task.
    assert!(ran_on.lock().is_none());

    flush(&dispatcher);
    assert_eq!(*ran_on.lock(), Some(ui.affinity().thread_id()));
    assert_ne!(*ran_on.lock(), Some(thread::current().id()));
    ui.stop_and_join();
}

#[test]
fn test_panicking_async_task_does_not_stop_thread() {
    let (ui, dispatcher) = setup();

    dispatcher.run_async(|| panic!("fire and forget")).unwrap();
    assert_eq!(dispatcher.run_sync(|| "still alive").unwrap(), "still alive");
    assert!(ui.is_running());

    ui.stop_and_join();
}

#[test]
fn test_dispatch_after_stop_fails() {
    let (ui, dispatcher) = setup();
    ui.stop_and_join();

    assert_eq!(dispatcher.run_sync(|| ()), Err(DispatchError::NotRunning));
    assert_eq!(dispatcher.run_async(|| ()), Err(DispatchError::NotRunning));
}

#[test]
fn test_concurrent_callers() {
    let (ui, dispatcher) = setup();
    let counter = Arc::new(Mutex::new(0_u32));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let dispatcher = dispatcher.clone();
            let counter = counter.clone();
            thread::spawn(move || {
                for _ in 0..25 {
                    let counter = counter.clone();
                    dispatcher.run_sync(move || *counter.lock() += 1).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(*counter.lock(), 200);
    ui.stop_and_join();
}

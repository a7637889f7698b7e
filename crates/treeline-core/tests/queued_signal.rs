//! Queued signal delivery through the process-wide dispatcher.
//!
//! Kept in its own test binary because the global dispatcher can only be
//! installed once per process.

use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use treeline_core::{ConnectionType, Dispatcher, InteractionThread, Signal};

#[test]
fn test_queued_slot_runs_on_interaction_thread() {
    let ui = Arc::new(InteractionThread::new());
    assert!(Dispatcher::install_global(Dispatcher::new(ui.clone())));
    assert!(!Dispatcher::install_global(Dispatcher::new(ui.clone())));

    let signal = Signal::<String>::new();
    let received = Arc::new(Mutex::new(Vec::new()));

    let received_clone = received.clone();
    signal.connect_with_type(
        move |text| {
            let name = thread::current().name().map(str::to_string);
            received_clone.lock().push((text.clone(), name));
        },
        ConnectionType::Queued,
    );

    signal.emit("hello".to_string());

    let dispatcher = Dispatcher::global().unwrap();
    dispatcher.run_sync(|| ()).unwrap();

    assert_eq!(
        *received.lock(),
        vec![("hello".to_string(), Some("treeline-ui".to_string()))]
    );
}

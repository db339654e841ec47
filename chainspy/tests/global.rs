//! The process-wide tracing context.

use chainspy::{Chain, Delivery, Detail, Rules, testing::RecordingObserver};
use std::sync::{Arc, Mutex};

mod common;

// The global context is shared by every test in this binary, so the whole
// scenario lives in a single test.
#[test]
fn test_global_context_round() {
    common::init_logging();
    chainspy::reset();

    let recorder = RecordingObserver::new();
    chainspy::global().subscribe_observer(recorder.clone());
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = errors.clone();
    let errors_sub = chainspy::subscribe_error(move |record: &chainspy::ErrorRecord| {
        sink.lock().unwrap().push(record.chain.clone());
    });

    chainspy::intercept(Rules::new().on("noise", |_: &Delivery<'_>, _: &Chain, _: &Detail| false));

    chainspy::send(["app", "start"]);
    chainspy::send(["noise", "tick"]);
    chainspy::send_with(["app", "save"], Detail::new().with("ok", true));
    chainspy::error(["app", "save"], "disk full");

    assert_eq!(
        recorder.chains(),
        [Chain::from(["app", "start"]), Chain::from(["app", "save"])]
    );
    assert_eq!(*errors.lock().unwrap(), [Chain::from(["app", "save"])]);

    errors_sub.unsubscribe();
    chainspy::error(["app"], "ignored");
    assert_eq!(errors.lock().unwrap().len(), 1);

    chainspy::reset();
    chainspy::send(["noise", "tick"]);
    assert_eq!(recorder.count(), 2);
    assert!(chainspy::global().find_interceptor(&Chain::from(["noise"])).is_none());
}

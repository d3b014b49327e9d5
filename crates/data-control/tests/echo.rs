use std::sync::{Arc, Mutex};

use bytes::Bytes;
use clipbridge_data_control::{EchoGuard, RemoteSink};

#[derive(Debug, Default)]
struct RecordingSink {
    delivered: Mutex<Vec<Bytes>>,
}

impl RemoteSink for RecordingSink {
    fn deliver(&self, data: Bytes) { self.delivered.lock().unwrap().push(data); }
}

/// The finalization decision: received content reaches the sink unless the
/// guard recognizes it as an echo of the last push.
fn forward(guard: &EchoGuard, sink: &dyn RemoteSink, received: Bytes) {
    if !guard.is_echo(&received) {
        sink.deliver(received);
    }
}

#[test]
fn echo_of_the_last_push_is_suppressed() {
    let mut guard = EchoGuard::new();
    let sink = Arc::new(RecordingSink::default());

    assert!(guard.record(Bytes::from_static(b"remote update")));

    forward(&guard, sink.as_ref(), Bytes::from_static(b"remote update"));
    assert!(sink.delivered.lock().unwrap().is_empty());

    forward(&guard, sink.as_ref(), Bytes::from_static(b"local change"));
    assert_eq!(*sink.delivered.lock().unwrap(), vec![Bytes::from_static(b"local change")]);
}

#[test]
fn a_newer_push_updates_the_comparison() {
    let mut guard = EchoGuard::new();
    let sink = RecordingSink::default();

    assert!(guard.record(Bytes::from_static(b"first")));
    assert!(guard.record(Bytes::from_static(b"second")));

    // The superseded buffer no longer suppresses anything.
    forward(&guard, &sink, Bytes::from_static(b"first"));
    forward(&guard, &sink, Bytes::from_static(b"second"));

    assert_eq!(*sink.delivered.lock().unwrap(), vec![Bytes::from_static(b"first")]);
}

#[test]
fn suppression_compares_full_binary_content() {
    let mut guard = EchoGuard::new();
    let sink = RecordingSink::default();

    assert!(guard.record(Bytes::from_static(b"head\0tail")));

    // Same prefix up to the NUL, different afterwards: must be delivered.
    forward(&guard, &sink, Bytes::from_static(b"head\0gone"));
    // Exact match including the NUL: must be suppressed.
    forward(&guard, &sink, Bytes::from_static(b"head\0tail"));

    assert_eq!(*sink.delivered.lock().unwrap(), vec![Bytes::from_static(b"head\0gone")]);
}

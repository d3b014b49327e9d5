use bytes::Bytes;

/// Delivery capability toward the remote consumer.
///
/// Invoked at most once per completed, non-suppressed inbound transfer,
/// always on the reactor thread.
pub trait RemoteSink: Send + Sync {
    fn deliver(&self, data: Bytes);
}

impl<F> RemoteSink for F
where
    F: Fn(Bytes) + Send + Sync,
{
    fn deliver(&self, data: Bytes) { self(data) }
}

pub trait EventObserver: Send + Sync {
    fn on_connected(&self, _connection_info: &str) {}
}

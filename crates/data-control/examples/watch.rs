use std::{io::Write, sync::Arc};

use bytes::Bytes;
use clipbridge_data_control::{Bridge, Error, EventObserver};

#[derive(Debug)]
struct PrintConnection;

impl EventObserver for PrintConnection {
    fn on_connected(&self, connection_info: &str) {
        eprintln!("connected, display: {connection_info}");
    }
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let sink = Arc::new(|data: Bytes| {
        eprintln!("clipboard changed, {} bytes:", data.len());
        let mut stdout = std::io::stdout().lock();
        drop(stdout.write_all(&data));
        drop(stdout.write_all(b"\n"));
    });

    let observers: Vec<Arc<dyn EventObserver>> = vec![Arc::new(PrintConnection)];
    let _bridge = Bridge::new(sink, observers)?;

    loop {
        std::thread::park();
    }
}

use std::{io::Read, sync::Arc};

use bytes::Bytes;
use clipbridge_data_control::{Bridge, Error};

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut data = Vec::new();
    if let Err(err) = std::io::stdin().read_to_end(&mut data) {
        eprintln!("error: could not read stdin: {err}");
        std::process::exit(1);
    }

    let bridge = Bridge::new(Arc::new(|_data: Bytes| {}), Vec::new())?;
    bridge.push(Bytes::from(data));

    eprintln!("serving clipboard content, press Ctrl-C to stop");
    loop {
        std::thread::park();
    }
}

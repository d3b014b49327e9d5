mod bridge;
mod error;
mod guard;
mod traits;

pub use clipbridge_base::{ClipboardKind, TEXT_MIME_TYPE};

pub use self::{
    bridge::{Bridge, Error as BridgeError},
    error::Error,
    guard::EchoGuard,
    traits::{EventObserver, RemoteSink},
};

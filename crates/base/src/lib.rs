mod kind;

pub use self::kind::{Kind as ClipboardKind, ParseKindError as ParseClipboardKindError};

/// The only mime type the bridge ever requests, accepts or advertises.
///
/// This is the exact protocol string; offer acceptance compares advertised
/// types against it byte for byte.
pub const TEXT_MIME_TYPE: &str = "text/plain;charset=utf-8";

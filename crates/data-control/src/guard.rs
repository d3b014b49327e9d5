use bytes::Bytes;

/// Owner of the last buffer pushed toward the compositor, and the echo check
/// that keeps remotely originated content from bouncing back to the remote
/// consumer.
///
/// Setting the compositor selection from a remote update makes the compositor
/// report a "selection changed" event for that very content; without the
/// check here the bridge would forward it again, looping forever.
#[derive(Debug, Default)]
pub struct EchoGuard {
    pushed: Option<Bytes>,
}

impl EchoGuard {
    #[inline]
    #[must_use]
    pub const fn new() -> Self { Self { pushed: None } }

    /// Replaces the pushed buffer wholesale. Zero-length input is rejected
    /// and the previous buffer is kept; returns whether the buffer was
    /// replaced.
    pub fn record(&mut self, data: Bytes) -> bool {
        if data.is_empty() {
            return false;
        }
        self.pushed = Some(data);
        true
    }

    /// Whether `received` is byte-for-byte identical to the pushed buffer.
    ///
    /// `received` carries its verified read length; the comparison is length
    /// first, then content, so embedded NUL bytes compare correctly.
    #[must_use]
    pub fn is_echo(&self, received: &[u8]) -> bool {
        self.pushed
            .as_ref()
            .is_some_and(|pushed| pushed.len() == received.len() && pushed.as_ref() == received)
    }

    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<&Bytes> { self.pushed.as_ref() }

    pub fn clear(&mut self) { self.pushed = None; }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::EchoGuard;

    #[test]
    fn identical_content_is_suppressed() {
        let mut guard = EchoGuard::new();
        assert!(guard.record(Bytes::from_static(b"hello")));
        assert!(guard.is_echo(b"hello"));
        assert!(!guard.is_echo(b"hello!"));
        assert!(!guard.is_echo(b"hell"));
    }

    #[test]
    fn nothing_pushed_suppresses_nothing() {
        let guard = EchoGuard::new();
        assert!(!guard.is_echo(b""));
        assert!(!guard.is_echo(b"hello"));
    }

    #[test]
    fn comparison_is_binary_safe() {
        let mut guard = EchoGuard::new();
        assert!(guard.record(Bytes::from_static(b"ab\0cd")));
        assert!(guard.is_echo(b"ab\0cd"));
        // A NUL-truncating comparison would accept these.
        assert!(!guard.is_echo(b"ab\0zz"));
        assert!(!guard.is_echo(b"ab"));
        assert!(!guard.is_echo(b"ab\0"));
    }

    #[test]
    fn zero_length_push_is_rejected() {
        let mut guard = EchoGuard::new();
        assert!(guard.record(Bytes::from_static(b"kept")));
        assert!(!guard.record(Bytes::new()));
        assert_eq!(guard.current().map(Bytes::as_ref), Some(&b"kept"[..]));
    }

    #[test]
    fn clear_drops_the_buffer() {
        let mut guard = EchoGuard::new();
        assert!(guard.record(Bytes::from_static(b"data")));
        guard.clear();
        assert!(guard.current().is_none());
        assert!(!guard.is_echo(b"data"));
    }
}

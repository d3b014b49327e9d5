use std::{fs::File, io::Write, os::fd::OwnedFd};

/// Answers a compositor "send" request: one write attempt of the whole
/// buffer, then the fd is closed no matter what. Short writes are logged and
/// never resumed.
pub(crate) fn serve(fd: OwnedFd, data: &[u8]) {
    let mut pipe = File::from(fd);
    match pipe.write(data) {
        Ok(written) if written < data.len() => {
            tracing::warn!(
                "Incomplete clipboard write, wrote {written} of {len} bytes",
                len = data.len()
            );
        }
        Ok(_) => {}
        Err(err) => {
            tracing::warn!("Error occurs while writing clipboard content, error: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use bytes::Bytes;
    use nix::fcntl::OFlag;

    use crate::guard::EchoGuard;

    fn pipe() -> (std::fs::File, std::os::fd::OwnedFd) {
        let (read_fd, write_fd) = nix::unistd::pipe2(OFlag::O_CLOEXEC).unwrap();
        (std::fs::File::from(read_fd), write_fd)
    }

    #[test]
    fn send_round_trips_the_pushed_buffer() {
        let mut guard = EchoGuard::new();
        assert!(guard.record(Bytes::from_static(b"pushed to the compositor")));

        let (mut read_end, write_fd) = pipe();
        super::serve(write_fd, guard.current().unwrap());

        let mut served = Vec::new();
        read_end.read_to_end(&mut served).unwrap();
        assert_eq!(served, b"pushed to the compositor");
    }

    #[test]
    fn send_is_binary_safe() {
        let payload = b"with\x00embedded\x00zeros".to_vec();
        let mut guard = EchoGuard::new();
        assert!(guard.record(Bytes::from(payload.clone())));

        let (mut read_end, write_fd) = pipe();
        super::serve(write_fd, guard.current().unwrap());

        let mut served = Vec::new();
        read_end.read_to_end(&mut served).unwrap();
        assert_eq!(served, payload);
    }
}

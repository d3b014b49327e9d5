use std::{
    fs::File,
    io::{ErrorKind, Read},
    os::fd::{AsRawFd, OwnedFd, RawFd},
};

use bytes::{Bytes, BytesMut};
use nix::{
    fcntl::{fcntl, FcntlArg, OFlag},
    unistd::pipe2,
};
use snafu::ResultExt;

use crate::bridge::error::{self, Error};

/// Upper bound on a single read from the pipe.
pub(crate) const RECV_CHUNK_SIZE: usize = 4096;

#[derive(Debug, Eq, PartialEq)]
pub(crate) enum ReadProgress {
    /// The pipe has no more data for now; wait for the next readiness event.
    Pending,
    /// EOF or a read error; whatever was accumulated is the final content.
    Complete,
}

/// One inbound transfer: the read end of a pipe being drained into a
/// growable buffer, one chunk per readiness event.
///
/// The transfer owns the read end exclusively; dropping it closes the fd on
/// every exit path. The write end is handed to the compositor and the local
/// copy closed immediately, so EOF arrives as soon as the content source is
/// done writing.
#[derive(Debug)]
pub(crate) struct Transfer {
    pipe: File,
    data: BytesMut,
}

impl Transfer {
    /// Creates the pipe and returns the transfer together with the write end
    /// to pass to the compositor. The read end is non-blocking; the write
    /// end is left blocking for the compositor-side writer.
    pub fn new() -> Result<(Self, OwnedFd), Error> {
        let (read_fd, write_fd) = pipe2(OFlag::O_CLOEXEC).context(error::CreatePipeSnafu)?;
        let _unused = fcntl(&read_fd, FcntlArg::F_SETFL(OFlag::O_NONBLOCK))
            .context(error::SetNonBlockingSnafu)?;
        Ok((Self { pipe: File::from(read_fd), data: BytesMut::new() }, write_fd))
    }

    #[inline]
    pub fn raw_fd(&self) -> RawFd { self.pipe.as_raw_fd() }

    /// Drains whatever is currently readable, at most `RECV_CHUNK_SIZE`
    /// bytes per read.
    pub fn on_readable(&mut self) -> ReadProgress {
        let mut chunk = [0_u8; RECV_CHUNK_SIZE];
        loop {
            match self.pipe.read(&mut chunk) {
                Ok(0) => return ReadProgress::Complete,
                Ok(n) => self.data.extend_from_slice(&chunk[..n]),
                Err(err) if err.kind() == ErrorKind::WouldBlock => return ReadProgress::Pending,
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => {
                    tracing::warn!("Error occurs while reading clipboard pipe, error: {err}");
                    return ReadProgress::Complete;
                }
            }
        }
    }

    pub fn into_bytes(self) -> Bytes { self.data.freeze() }
}

#[cfg(test)]
mod tests {
    use std::{io::Write, os::fd::OwnedFd, time::Duration};

    use super::{ReadProgress, Transfer, RECV_CHUNK_SIZE};

    fn write_end(fd: OwnedFd) -> std::fs::File { std::fs::File::from(fd) }

    #[test]
    fn reassembles_content_larger_than_one_chunk() {
        let (mut transfer, write_fd) = Transfer::new().unwrap();
        let payload: Vec<u8> = (0..3 * RECV_CHUNK_SIZE + 123).map(|i| (i % 251) as u8).collect();

        let writer = std::thread::spawn({
            let payload = payload.clone();
            move || {
                let mut pipe = write_end(write_fd);
                // Trickle in pieces so the reader sees several readiness
                // rounds, not one buffered burst.
                for piece in payload.chunks(1000) {
                    pipe.write_all(piece).unwrap();
                    std::thread::sleep(Duration::from_millis(1));
                }
            }
        });

        loop {
            match transfer.on_readable() {
                ReadProgress::Pending => std::thread::sleep(Duration::from_millis(2)),
                ReadProgress::Complete => break,
            }
        }
        writer.join().unwrap();

        assert_eq!(transfer.into_bytes().as_ref(), payload.as_slice());
    }

    #[test]
    fn eof_with_no_data_yields_empty_buffer() {
        let (mut transfer, write_fd) = Transfer::new().unwrap();
        drop(write_fd);

        assert_eq!(transfer.on_readable(), ReadProgress::Complete);
        assert!(transfer.into_bytes().is_empty());
    }

    #[test]
    fn binary_content_survives_intact() {
        let (mut transfer, write_fd) = Transfer::new().unwrap();
        let payload = b"\x00binary\x00content\xff\x00".to_vec();

        let mut pipe = write_end(write_fd);
        pipe.write_all(&payload).unwrap();
        drop(pipe);

        while transfer.on_readable() != ReadProgress::Complete {}
        assert_eq!(transfer.into_bytes().as_ref(), payload.as_slice());
    }
}

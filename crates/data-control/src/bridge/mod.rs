mod context;
mod error;
mod slots;
mod source;
mod state;
mod transfer;

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
};

use bytes::Bytes;
use crossbeam_channel::{Receiver, Sender};
use mio::{unix::SourceFd, Events, Interest, Poll, Token, Waker};
use snafu::ResultExt;
use wayland_client::{backend::WaylandError, EventQueue};

pub use self::error::Error;
use self::{context::Context, state::State, transfer::ReadProgress};
use crate::traits::{EventObserver, RemoteSink};

const WAYLAND_TOKEN: Token = Token(0);
const WAKER_TOKEN: Token = Token(1);

#[derive(Debug)]
enum Command {
    Push(Bytes),
}

/// The clipboard bridge: mirrors remote clipboard updates into the
/// compositor's selections and forwards local clipboard changes to the
/// injected sink.
///
/// All protocol work happens on a dedicated reactor thread; this handle only
/// queues work for it. Dropping the handle tears the bridge down, releasing
/// any outgoing sources, the data device and the buffered content.
pub struct Bridge {
    is_running: Arc<AtomicBool>,
    commands: Sender<Command>,
    waker: Arc<Waker>,
    thread: Option<thread::JoinHandle<Result<(), Error>>>,
}

impl Bridge {
    pub fn new(
        sink: Arc<dyn RemoteSink>,
        event_observers: Vec<Arc<dyn EventObserver>>,
    ) -> Result<Self, crate::Error> {
        tracing::info!("Connect Wayland compositor");
        let (context, event_queue) = Context::new()?;

        tracing::info!(
            "Wayland compositor connected, display: {name}",
            name = context.display_name()
        );
        for observer in &event_observers {
            observer.on_connected(context.display_name());
        }

        let poll = Poll::new().context(error::InitializeMioPollSnafu)?;
        let waker =
            Arc::new(Waker::new(poll.registry(), WAKER_TOKEN).context(error::CreateWakerSnafu)?);

        let queue_handle = event_queue.handle();
        let state = State::new(context, queue_handle, sink);

        let (commands, command_receiver) = crossbeam_channel::unbounded();
        let is_running = Arc::new(AtomicBool::new(true));
        let thread = build_thread(is_running.clone(), poll, event_queue, state, command_receiver);

        Ok(Self { is_running, commands, waker, thread: Some(thread) })
    }

    /// Replaces the bridge's buffered content with `data` and installs it as
    /// the compositor's selection and primary selection. Zero-length pushes
    /// are rejected on the reactor thread as a logged no-op.
    pub fn push(&self, data: Bytes) {
        if self.commands.send(Command::Push(data)).is_err() {
            tracing::warn!("Clipboard worker is gone, dropping push");
            return;
        }
        if let Err(err) = self.waker.wake() {
            tracing::warn!("Could not wake clipboard worker, error: {err}");
        }
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        self.is_running.store(false, Ordering::Release);
        drop(self.waker.wake());

        tracing::info!("Reap thread which bridges the Wayland clipboard");
        drop(self.thread.take().map(thread::JoinHandle::join));
    }
}

fn build_thread(
    is_running: Arc<AtomicBool>,
    mut poll: Poll,
    mut event_queue: EventQueue<State>,
    mut state: State,
    commands: Receiver<Command>,
) -> thread::JoinHandle<Result<(), Error>> {
    thread::spawn(move || {
        let result = serve(&is_running, &mut poll, &mut event_queue, &mut state, &commands);
        if let Err(err) = &result {
            tracing::error!("Clipboard worker stopped, error: {err}");
        }

        state.teardown();
        drop(state.flush());
        result
    })
}

#[allow(clippy::cognitive_complexity)]
fn serve(
    is_running: &AtomicBool,
    poll: &mut Poll,
    event_queue: &mut EventQueue<State>,
    state: &mut State,
    commands: &Receiver<Command>,
) -> Result<(), Error> {
    let mut events = Events::with_capacity(64);

    let connection_fd = state.connection_fd();
    poll.registry()
        .register(&mut SourceFd(&connection_fd), WAYLAND_TOKEN, Interest::READABLE)
        .context(error::RegisterIoResourceSnafu)?;

    while is_running.load(Ordering::Relaxed) {
        // Requests queued by the previous round (receive, set_selection,
        // destroy) must reach the compositor before blocking.
        if let Err(err) = state.flush() {
            tracing::warn!("Could not flush Wayland connection, error: {err}");
        }

        drop(event_queue.dispatch_pending(state).context(error::DispatchEventsSnafu)?);

        for (token, fd) in state.take_unregistered() {
            if let Err(err) =
                poll.registry().register(&mut SourceFd(&fd), token, Interest::READABLE)
            {
                tracing::error!("Could not register clipboard pipe, error: {err}");
                state.abort_transfer(token);
            }
        }

        let mut read_guard = event_queue.prepare_read();

        tracing::trace!("Wait for readiness events");
        if let Err(err) = poll.poll(&mut events, None) {
            if err.kind() == std::io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err).context(error::PollReadinessSnafu);
        }

        let mut wayland_ready = false;
        let mut ready_transfers = Vec::new();
        for event in &events {
            match event.token() {
                WAYLAND_TOKEN => wayland_ready = true,
                WAKER_TOKEN => {}
                token => ready_transfers.push(token),
            }
        }

        if wayland_ready {
            // The reactor is edge-triggered; drain the socket before
            // blocking again.
            let mut guard = read_guard.take();
            loop {
                let Some(read_events) = guard else { break };
                match read_events.read() {
                    Ok(_) => {}
                    Err(WaylandError::Io(err))
                        if err.kind() == std::io::ErrorKind::WouldBlock =>
                    {
                        break;
                    }
                    Err(err) => return Err(err).context(error::ReadEventsSnafu),
                }
                drop(event_queue.dispatch_pending(state).context(error::DispatchEventsSnafu)?);
                guard = event_queue.prepare_read();
            }
        }
        drop(read_guard);

        while let Ok(command) = commands.try_recv() {
            match command {
                Command::Push(data) => state.push(data),
            }
        }

        for token in ready_transfers {
            if state.transfer_ready(token) == Some(ReadProgress::Complete) {
                if let Some(fd) = state.transfer_fd(token) {
                    if let Err(err) = poll.registry().deregister(&mut SourceFd(&fd)) {
                        tracing::warn!("Could not deregister clipboard pipe, error: {err}");
                    }
                }
                state.finalize_transfer(token);
            }
        }
    }

    Ok(())
}

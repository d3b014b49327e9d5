use std::{
    collections::HashMap,
    os::fd::{AsFd, AsRawFd, OwnedFd, RawFd},
    sync::Arc,
};

use bytes::Bytes;
use clipbridge_base::{ClipboardKind, TEXT_MIME_TYPE};
use mio::Token;
use wayland_client::{
    event_created_child,
    globals::GlobalListContents,
    protocol::{wl_registry, wl_seat},
    Connection, Dispatch, QueueHandle,
};
use wayland_protocols_wlr::data_control::v1::client::{
    zwlr_data_control_device_v1::{self, ZwlrDataControlDeviceV1},
    zwlr_data_control_manager_v1::{self, ZwlrDataControlManagerV1},
    zwlr_data_control_offer_v1::{self, ZwlrDataControlOfferV1},
    zwlr_data_control_source_v1::{self, ZwlrDataControlSourceV1},
};

use crate::{
    bridge::{
        context::Context,
        slots::SourceSlots,
        source,
        transfer::{ReadProgress, Transfer},
    },
    guard::EchoGuard,
    traits::RemoteSink,
};

/// Tokens 0 and 1 belong to the reactor itself (Wayland socket, waker);
/// transfer tokens start above them.
const FIRST_TRANSFER_TOKEN: usize = 2;

#[derive(Debug)]
struct InFlight {
    transfer: Transfer,
    offer: ZwlrDataControlOfferV1,
}

/// Everything the reactor thread owns: the compositor context, the offer
/// negotiation state, the outgoing source slots, the echo guard with the
/// last-pushed buffer, and the in-flight transfers keyed by reactor token.
pub(crate) struct State {
    context: Context,
    queue_handle: QueueHandle<Self>,
    device_alive: bool,
    primary_enabled: bool,
    slots: SourceSlots<ZwlrDataControlSourceV1>,
    guard: EchoGuard,
    pending_offer: Option<ZwlrDataControlOfferV1>,
    transfers: HashMap<Token, InFlight>,
    unregistered: Vec<Token>,
    next_token: usize,
    sink: Arc<dyn RemoteSink>,
}

impl State {
    pub fn new(context: Context, queue_handle: QueueHandle<Self>, sink: Arc<dyn RemoteSink>) -> Self {
        let primary_enabled = context.supports_primary_selection();
        if !primary_enabled {
            tracing::warn!(
                "Compositor only offers data-control v1, the primary selection will not be \
                 mirrored"
            );
        }

        Self {
            context,
            queue_handle,
            device_alive: true,
            primary_enabled,
            slots: SourceSlots::default(),
            guard: EchoGuard::new(),
            pending_offer: None,
            transfers: HashMap::new(),
            unregistered: Vec::new(),
            next_token: FIRST_TRANSFER_TOKEN,
            sink,
        }
    }

    pub fn flush(&self) -> Result<(), wayland_client::backend::WaylandError> {
        self.context.connection().flush()
    }

    /// Raw fd of the compositor socket, for reactor registration.
    pub fn connection_fd(&self) -> RawFd {
        self.context.connection().backend().poll_fd().as_raw_fd()
    }

    /// Replaces the buffered content and installs fresh outgoing sources for
    /// both slots. Previously installed sources are superseded; the
    /// compositor cancels them on its own.
    pub fn push(&mut self, data: Bytes) {
        if !self.guard.record(data) {
            tracing::warn!("Ignoring zero-length clipboard push");
            return;
        }
        if !self.device_alive {
            tracing::warn!("Data-control device is gone, content stays buffered only");
            return;
        }

        self.install_source(ClipboardKind::Clipboard);
        if self.primary_enabled {
            self.install_source(ClipboardKind::Primary);
        }
    }

    fn install_source(&mut self, kind: ClipboardKind) {
        let source = self.context.manager().create_data_source(&self.queue_handle, ());
        source.offer(TEXT_MIME_TYPE.to_string());
        match kind {
            ClipboardKind::Clipboard => self.context.device().set_selection(Some(&source)),
            ClipboardKind::Primary => self.context.device().set_primary_selection(Some(&source)),
        }
        tracing::debug!("Installed {kind} source offering `{TEXT_MIME_TYPE}`");
        drop(self.slots.install(kind, source));
    }

    fn on_offer_mime(&mut self, offer: &ZwlrDataControlOfferV1, mime_type: &str) {
        if self.pending_offer.is_some() {
            return;
        }
        if mime_type != TEXT_MIME_TYPE {
            return;
        }
        self.pending_offer = Some(offer.clone());
    }

    fn on_selection(&mut self, offer: Option<ZwlrDataControlOfferV1>, kind: ClipboardKind) {
        let Some(offer) = offer else {
            tracing::trace!("{kind} selection cleared");
            return;
        };
        if self.pending_offer.as_ref() != Some(&offer) {
            tracing::trace!("Ignoring {kind} selection for an offer that was not negotiated");
            return;
        }
        self.pending_offer = None;
        self.start_transfer(offer, kind);
    }

    fn start_transfer(&mut self, offer: ZwlrDataControlOfferV1, kind: ClipboardKind) {
        let (transfer, write_fd) = match Transfer::new() {
            Ok(pair) => pair,
            Err(err) => {
                tracing::error!("Could not start clipboard transfer, error: {err}");
                offer.destroy();
                return;
            }
        };

        offer.receive(TEXT_MIME_TYPE.to_string(), write_fd.as_fd());
        // The compositor owns writing; the bridge only reads.
        drop(write_fd);
        tracing::debug!("Receiving {kind} clipboard content");

        let token = Token(self.next_token);
        self.next_token += 1;
        let _unused = self.transfers.insert(token, InFlight { transfer, offer });
        self.unregistered.push(token);
    }

    /// Transfers started during dispatch, waiting to be registered with the
    /// reactor.
    pub fn take_unregistered(&mut self) -> Vec<(Token, RawFd)> {
        std::mem::take(&mut self.unregistered)
            .into_iter()
            .filter_map(|token| self.transfer_fd(token).map(|fd| (token, fd)))
            .collect()
    }

    pub fn transfer_ready(&mut self, token: Token) -> Option<ReadProgress> {
        self.transfers.get_mut(&token).map(|inflight| inflight.transfer.on_readable())
    }

    pub fn transfer_fd(&self, token: Token) -> Option<RawFd> {
        self.transfers.get(&token).map(|inflight| inflight.transfer.raw_fd())
    }

    /// Completes a transfer: the offer handle is released, the accumulated
    /// bytes run through the echo guard, and non-suppressed content goes to
    /// the sink exactly once.
    pub fn finalize_transfer(&mut self, token: Token) {
        let Some(InFlight { transfer, offer }) = self.transfers.remove(&token) else {
            return;
        };
        offer.destroy();

        let data = transfer.into_bytes();
        if self.guard.is_echo(&data) {
            tracing::debug!("Suppressing clipboard echo of {len} bytes", len = data.len());
            return;
        }
        tracing::debug!("Delivering {len} bytes of clipboard content", len = data.len());
        self.sink.deliver(data);
    }

    /// Drops a transfer that could not be driven, releasing its pipe and
    /// offer handle.
    pub fn abort_transfer(&mut self, token: Token) {
        if let Some(InFlight { transfer, offer }) = self.transfers.remove(&token) {
            offer.destroy();
            drop(transfer);
        }
    }

    fn on_send(&mut self, mime_type: &str, fd: OwnedFd) {
        if mime_type != TEXT_MIME_TYPE {
            tracing::warn!("Send requested for unsupported mime type `{mime_type}`");
            return;
        }
        match self.guard.current() {
            Some(data) => source::serve(fd, data),
            None => tracing::warn!("Send requested with no buffered clipboard content"),
        }
    }

    fn on_finished(&mut self) {
        tracing::warn!("Data-control device finished, destroying it");
        self.context.device().destroy();
        self.device_alive = false;
    }

    /// Releases every live protocol object and the buffered content. Safe
    /// with zero, one or two active sources.
    pub fn teardown(&mut self) {
        for source in self.slots.take_all() {
            source.destroy();
        }
        if let Some(offer) = self.pending_offer.take() {
            offer.destroy();
        }
        for (_token, InFlight { transfer, offer }) in self.transfers.drain() {
            offer.destroy();
            drop(transfer);
        }
        if self.device_alive {
            self.context.device().destroy();
            self.device_alive = false;
        }
        self.guard.clear();
    }
}

impl Dispatch<wl_registry::WlRegistry, GlobalListContents> for State {
    fn event(
        _state: &mut Self,
        _registry: &wl_registry::WlRegistry,
        _event: wl_registry::Event,
        _data: &GlobalListContents,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
    }
}

impl Dispatch<wl_seat::WlSeat, ()> for State {
    fn event(
        _state: &mut Self,
        _seat: &wl_seat::WlSeat,
        _event: wl_seat::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
    }
}

impl Dispatch<ZwlrDataControlManagerV1, ()> for State {
    fn event(
        _state: &mut Self,
        _manager: &ZwlrDataControlManagerV1,
        _event: zwlr_data_control_manager_v1::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
    }
}

impl Dispatch<ZwlrDataControlDeviceV1, ()> for State {
    fn event(
        state: &mut Self,
        _device: &ZwlrDataControlDeviceV1,
        event: zwlr_data_control_device_v1::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        match event {
            zwlr_data_control_device_v1::Event::DataOffer { .. } => {
                // Interest is decided once the offer advertises its mime
                // types.
                tracing::trace!("Clipboard offer announced");
            }
            zwlr_data_control_device_v1::Event::Selection { id } => {
                state.on_selection(id, ClipboardKind::Clipboard);
            }
            zwlr_data_control_device_v1::Event::PrimarySelection { id } => {
                state.on_selection(id, ClipboardKind::Primary);
            }
            zwlr_data_control_device_v1::Event::Finished => state.on_finished(),
            _ => {}
        }
    }

    event_created_child!(State, ZwlrDataControlDeviceV1, [
        zwlr_data_control_device_v1::EVT_DATA_OFFER_OPCODE => (ZwlrDataControlOfferV1, ()),
    ]);
}

impl Dispatch<ZwlrDataControlOfferV1, ()> for State {
    fn event(
        state: &mut Self,
        offer: &ZwlrDataControlOfferV1,
        event: zwlr_data_control_offer_v1::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        if let zwlr_data_control_offer_v1::Event::Offer { mime_type } = event {
            state.on_offer_mime(offer, &mime_type);
        }
    }
}

impl Dispatch<ZwlrDataControlSourceV1, ()> for State {
    fn event(
        state: &mut Self,
        source: &ZwlrDataControlSourceV1,
        event: zwlr_data_control_source_v1::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        match event {
            zwlr_data_control_source_v1::Event::Send { mime_type, fd } => {
                state.on_send(&mime_type, fd);
            }
            zwlr_data_control_source_v1::Event::Cancelled => {
                if let Some(kind) = state.slots.clear_matching(source) {
                    tracing::debug!("{kind} source cancelled by the compositor");
                }
                source.destroy();
            }
            _ => {}
        }
    }
}

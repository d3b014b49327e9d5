use snafu::ResultExt;
use wayland_client::{
    globals::registry_queue_init, protocol::wl_seat::WlSeat, Connection, EventQueue, Proxy,
};
use wayland_protocols_wlr::data_control::v1::client::{
    zwlr_data_control_device_v1::ZwlrDataControlDeviceV1,
    zwlr_data_control_manager_v1::ZwlrDataControlManagerV1,
};

use crate::bridge::{
    error::{self, Error},
    state::State,
};

/// Primary selection support arrived with version 2 of the data-control
/// protocol.
const PRIMARY_SELECTION_SINCE: u32 = 2;

/// The bridge's compositor connection: registry, seat, data-control manager
/// and the data device bound to the seat.
#[derive(Debug)]
pub(crate) struct Context {
    connection: Connection,
    display_name: String,
    manager: ZwlrDataControlManagerV1,
    device: ZwlrDataControlDeviceV1,
}

impl Context {
    pub fn new() -> Result<(Self, EventQueue<State>), Error> {
        let connection = Connection::connect_to_env().context(error::ConnectSnafu)?;
        let (globals, event_queue) =
            registry_queue_init::<State>(&connection).context(error::InitializeRegistrySnafu)?;
        let queue_handle = event_queue.handle();

        let seat: WlSeat = globals.bind(&queue_handle, 1..=4, ()).context(error::BindSeatSnafu)?;
        let manager: ZwlrDataControlManagerV1 = globals
            .bind(&queue_handle, 1..=PRIMARY_SELECTION_SINCE, ())
            .context(error::BindManagerSnafu)?;
        let device = manager.get_data_device(&seat, &queue_handle, ());

        let display_name =
            std::env::var("WAYLAND_DISPLAY").unwrap_or_else(|_| String::from("wayland-0"));

        Ok((Self { connection, display_name, manager, device }, event_queue))
    }

    #[inline]
    pub fn display_name(&self) -> &str { &self.display_name }

    #[inline]
    pub fn connection(&self) -> &Connection { &self.connection }

    #[inline]
    pub fn manager(&self) -> &ZwlrDataControlManagerV1 { &self.manager }

    #[inline]
    pub fn device(&self) -> &ZwlrDataControlDeviceV1 { &self.device }

    /// Whether the bound manager is recent enough to mirror the primary
    /// selection.
    #[inline]
    pub fn supports_primary_selection(&self) -> bool {
        self.manager.version() >= PRIMARY_SELECTION_SINCE
    }
}

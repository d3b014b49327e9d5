use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Could not connect to Wayland compositor, error: {source}"))]
    Connect { source: wayland_client::ConnectError, backtrace: snafu::Backtrace },

    #[snafu(display("Could not initialize Wayland registry, error: {source}"))]
    InitializeRegistry { source: wayland_client::globals::GlobalError, backtrace: snafu::Backtrace },

    #[snafu(display("Could not bind wl_seat, error: {source}"))]
    BindSeat { source: wayland_client::globals::BindError, backtrace: snafu::Backtrace },

    #[snafu(display(
        "Could not bind zwlr_data_control_manager_v1, the compositor does not support the \
         data-control protocol, error: {source}"
    ))]
    BindManager { source: wayland_client::globals::BindError, backtrace: snafu::Backtrace },

    #[snafu(display("Could not initialize mio poll, error: {source}"))]
    InitializeMioPoll { source: std::io::Error },

    #[snafu(display("Could not create waker, error: {source}"))]
    CreateWaker { source: std::io::Error },

    #[snafu(display("Could not register I/O resource, error: {source}"))]
    RegisterIoResource { source: std::io::Error },

    #[snafu(display("Error occurs while polling for readiness events, error: {source}"))]
    PollReadiness { source: std::io::Error },

    #[snafu(display("Could not create pipe, error: {source}"))]
    CreatePipe { source: nix::Error },

    #[snafu(display("Could not make pipe read end non-blocking, error: {source}"))]
    SetNonBlocking { source: nix::Error },

    #[snafu(display("Could not read Wayland events, error: {source}"))]
    ReadEvents { source: wayland_client::backend::WaylandError },

    #[snafu(display("Error occurs while dispatching Wayland events, error: {source}"))]
    DispatchEvents { source: wayland_client::DispatchError },
}

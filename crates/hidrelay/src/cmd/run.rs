use hidrelay_frame::{DeviceWriter, FrameConfig};
use hidrelay_link::{LinkConfig, LinkSupervisor, ShutdownSignal};
use hidrelay_transport::{Acceptor, LinkStream, UnixDomainSocket};
use std::time::Duration;
use tracing::info;

use crate::cmd::{parse_duration, RunArgs};
use crate::exit::{
    device_error, frame_error, link_error, transport_error, CliError, CliResult, INTERNAL, SUCCESS,
};
use crate::output::{print_summary, OutputFormat};

type BoxedAcceptor = Box<dyn Acceptor<Stream = LinkStream>>;

pub fn run(args: RunArgs, format: OutputFormat) -> CliResult<i32> {
    let frame = FrameConfig::new(args.frame_size).map_err(|err| frame_error("--frame-size", err))?;
    let poll_interval = parse_duration(&args.poll_interval)?;
    let config = LinkConfig {
        frame,
        poll_interval,
        release_on_disconnect: args.release_on_disconnect,
        drain_on_shutdown: !args.no_drain,
    };

    let shutdown = ShutdownSignal::new();
    install_shutdown_handler(shutdown.clone())?;

    // The device is opened once, before listening, and stays open across sessions.
    let device = DeviceWriter::open(&args.device, config.frame.frame_size)
        .map_err(|err| device_error("device open failed", err))?;
    info!(device = ?args.device, "hid device ready");

    let acceptor = bind_upstream(&args, poll_interval)?;

    let summary = LinkSupervisor::new(acceptor, device, config, shutdown)
        .map_err(|err| link_error("relay setup failed", err))?
        .run()
        .map_err(|err| link_error("relay failed", err))?;

    print_summary(&summary, format);
    Ok(SUCCESS)
}

fn bind_upstream(args: &RunArgs, poll_interval: Duration) -> CliResult<BoxedAcceptor> {
    if let Some(path) = &args.unix {
        let socket = UnixDomainSocket::bind(path)
            .map_err(|err| transport_error("bind failed", err))?
            .with_read_timeout(Some(poll_interval));
        return Ok(Box::new(socket));
    }
    bind_rfcomm(args, poll_interval)
}

#[cfg(target_os = "linux")]
fn bind_rfcomm(args: &RunArgs, poll_interval: Duration) -> CliResult<BoxedAcceptor> {
    use hidrelay_transport::{BdAddr, RfcommListener};

    let local: BdAddr = args
        .rfcomm_addr
        .parse()
        .map_err(|err| transport_error("--rfcomm-addr", err))?;
    let listener = RfcommListener::bind(local, args.rfcomm_channel, args.backlog)
        .map_err(|err| transport_error("bind failed", err))?
        .with_read_timeout(Some(poll_interval));
    Ok(Box::new(listener))
}

#[cfg(not(target_os = "linux"))]
fn bind_rfcomm(_args: &RunArgs, _poll_interval: Duration) -> CliResult<BoxedAcceptor> {
    Err(CliError::new(
        crate::exit::USAGE,
        "rfcomm is only supported on linux; use --unix",
    ))
}

fn install_shutdown_handler(shutdown: ShutdownSignal) -> CliResult<()> {
    ctrlc::set_handler(move || {
        shutdown.request();
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

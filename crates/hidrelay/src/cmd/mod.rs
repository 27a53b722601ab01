use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod doctor;
pub mod run;
pub mod send;
pub mod version;

const DEFAULT_DEVICE: &str = "/dev/hidg0";

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Relay reports from the upstream peer to the HID device until signalled.
    Run(RunArgs),
    /// Send hex-encoded frames to a relay listening on a Unix socket.
    Send(SendArgs),
    /// Check the device node and Bluetooth support.
    Doctor(DoctorArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args, format),
        Command::Send(args) => send::run(args),
        Command::Doctor(args) => doctor::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// HID gadget device node.
    #[arg(long, env = "HIDRELAY_DEVICE", default_value = DEFAULT_DEVICE)]
    pub device: PathBuf,
    /// Local Bluetooth adapter address to bind (00:00:00:00:00:00 = any).
    #[arg(
        long,
        env = "HIDRELAY_RFCOMM_ADDR",
        default_value = "00:00:00:00:00:00",
        conflicts_with = "unix"
    )]
    pub rfcomm_addr: String,
    /// RFCOMM channel to listen on.
    #[arg(
        long,
        env = "HIDRELAY_RFCOMM_CHANNEL",
        default_value_t = 1,
        value_parser = clap::value_parser!(u8).range(1..=30),
        conflicts_with = "unix"
    )]
    pub rfcomm_channel: u8,
    /// Listen on a Unix domain socket instead of RFCOMM.
    #[arg(long, value_name = "PATH")]
    pub unix: Option<PathBuf>,
    /// Pending connection backlog (RFCOMM only).
    #[arg(long, default_value_t = 1)]
    pub backlog: i32,
    /// Exact size of every report in bytes.
    #[arg(long, env = "HIDRELAY_FRAME_SIZE", default_value_t = hidrelay_frame::DEFAULT_FRAME_SIZE)]
    pub frame_size: usize,
    /// Longest a blocked accept or read waits before re-checking for shutdown (e.g. 200ms, 1s).
    #[arg(long, default_value = "200ms")]
    pub poll_interval: String,
    /// Write an all-zero report after a session ends with keys still held.
    #[arg(long)]
    pub release_on_disconnect: bool,
    /// Do not relay already-buffered frames when shutting down mid-session.
    #[arg(long)]
    pub no_drain: bool,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Unix socket path of a relay started with `run --unix`.
    pub path: PathBuf,
    /// Frame as hex bytes, e.g. "01 00 00 00 00 00 00". Repeatable.
    #[arg(long, required = true)]
    pub hex: Vec<String>,
    /// Expected frame size; frames of any other length are rejected.
    #[arg(long, default_value_t = hidrelay_frame::DEFAULT_FRAME_SIZE)]
    pub frame_size: usize,
    /// Pause between frames (e.g. 10ms).
    #[arg(long)]
    pub delay: Option<String>,
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// HID gadget device node to check.
    #[arg(long, env = "HIDRELAY_DEVICE", default_value = DEFAULT_DEVICE)]
    pub device: PathBuf,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }
}

mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "hidrelay",
    version,
    about = "Relay HID reports from a Bluetooth RFCOMM peer to a USB HID gadget"
)]
struct Cli {
    /// Output format for command results (stdout).
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        env = "HIDRELAY_LOG_LEVEL",
        default_value = "info",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_defaults() {
        let cli = Cli::try_parse_from(["hidrelay", "run"]).expect("run args should parse");
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.frame_size, 7);
                assert_eq!(args.rfcomm_channel, 1);
                assert!(args.unix.is_none());
                assert!(!args.release_on_disconnect);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_run_over_unix_socket() {
        let cli = Cli::try_parse_from([
            "hidrelay",
            "run",
            "--unix",
            "/tmp/hidrelay.sock",
            "--device",
            "/tmp/hidg0",
            "--poll-interval",
            "50ms",
            "--release-on-disconnect",
        ])
        .expect("unix run args should parse");
        assert!(matches!(cli.command, Command::Run(ref args) if args.unix.is_some()));
    }

    #[test]
    fn rejects_unix_with_explicit_rfcomm_channel() {
        let err = Cli::try_parse_from([
            "hidrelay",
            "run",
            "--unix",
            "/tmp/hidrelay.sock",
            "--rfcomm-channel",
            "3",
        ])
        .expect_err("conflicting upstreams should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn rejects_out_of_range_rfcomm_channel() {
        let err = Cli::try_parse_from(["hidrelay", "run", "--rfcomm-channel", "31"])
            .expect_err("channel 31 is out of range");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn parses_send_with_multiple_frames() {
        let cli = Cli::try_parse_from([
            "hidrelay",
            "send",
            "/tmp/hidrelay.sock",
            "--hex",
            "01 00 00 00 00 00 00",
            "--hex",
            "00000400000000",
        ])
        .expect("send args should parse");
        assert!(matches!(cli.command, Command::Send(ref args) if args.hex.len() == 2));
    }

    #[test]
    fn send_requires_a_frame() {
        let err = Cli::try_parse_from(["hidrelay", "send", "/tmp/hidrelay.sock"])
            .expect_err("send without --hex should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}

use clap::ValueEnum;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Crates that follow `--log-level`; everything else is held at `warn`.
const RELAY_TARGETS: [&str; 4] = [
    "hidrelay",
    "hidrelay_transport",
    "hidrelay_frame",
    "hidrelay_link",
];

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Filter directives derived from `--log-level`.
pub fn level_directives(level: LogLevel) -> String {
    let level = level.as_directive();
    RELAY_TARGETS
        .iter()
        .fold(String::from("warn"), |mut directives, target| {
            directives.push_str(&format!(",{target}={level}"));
            directives
        })
}

/// A valid `RUST_LOG` wins over `--log-level`. An invalid one is returned
/// alongside the fallback filter so it can be reported once logging is up.
fn build_filter(rust_log: Option<&str>, level: LogLevel) -> (EnvFilter, Option<String>) {
    let fallback = || EnvFilter::new(level_directives(level));
    match rust_log.map(str::trim).filter(|spec| !spec.is_empty()) {
        None => (fallback(), None),
        Some(spec) => match EnvFilter::try_new(spec) {
            Ok(filter) => (filter, None),
            Err(err) => (fallback(), Some(format!("{spec:?}: {err}"))),
        },
    }
}

/// Install the stderr subscriber. Stdout is reserved for command output.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let (filter, rejected) = build_filter(rust_log.as_deref(), level);

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }

    if let Some(rejected) = rejected {
        warn!(rust_log = %rejected, "ignoring invalid RUST_LOG");
    }
}

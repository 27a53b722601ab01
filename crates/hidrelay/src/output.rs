use std::io::IsTerminal;

use clap::ValueEnum;
use hidrelay_link::{RunSummary, SessionEnd};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct SummaryOutput<'a> {
    schema_id: &'a str,
    #[serde(flatten)]
    summary: &'a RunSummary,
}

pub fn print_summary(summary: &RunSummary, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = SummaryOutput {
                schema_id: "https://schemas.3leaps.dev/hidrelay/cli/v1/run-summary.schema.json",
                summary,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Pretty => {
            println!(
                "sessions={} frames={} releases={} disconnects={} incomplete={} transport_errors={}",
                summary.sessions,
                summary.frames_relayed,
                summary.releases,
                summary.disconnects,
                summary.incomplete_frames,
                summary.transport_errors
            );
            for report in &summary.recent {
                println!(
                    "  #{} {} frames={} end={}",
                    report.session,
                    report.peer,
                    report.frames,
                    session_end_label(&report.end)
                );
            }
        }
    }
}

pub fn session_end_label(end: &SessionEnd) -> String {
    match end {
        SessionEnd::PeerClosed => "peer-closed".to_string(),
        SessionEnd::Incomplete { received, expected } => {
            format!("incomplete({received}/{expected})")
        }
        SessionEnd::Transport { error } => format!("transport-error({error})"),
        SessionEnd::Shutdown => "shutdown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_end_labels() {
        assert_eq!(session_end_label(&SessionEnd::PeerClosed), "peer-closed");
        assert_eq!(
            session_end_label(&SessionEnd::Incomplete {
                received: 3,
                expected: 7
            }),
            "incomplete(3/7)"
        );
        assert_eq!(session_end_label(&SessionEnd::Shutdown), "shutdown");
    }

    #[test]
    fn summary_json_is_flat() {
        let summary = RunSummary {
            sessions: 2,
            frames_relayed: 5,
            ..RunSummary::default()
        };
        let out = SummaryOutput {
            schema_id: "x",
            summary: &summary,
        };
        let value = serde_json::to_value(&out).unwrap();
        assert_eq!(value["sessions"], 2);
        assert_eq!(value["frames_relayed"], 5);
        assert_eq!(value["schema_id"], "x");
    }
}

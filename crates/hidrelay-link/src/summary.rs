use std::collections::VecDeque;

use serde::Serialize;

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionEnd {
    /// Peer closed on a frame boundary.
    PeerClosed,
    /// Peer closed after sending part of a frame.
    Incomplete { received: usize, expected: usize },
    /// The upstream read failed.
    Transport { error: String },
    /// Shutdown was requested while the session was active.
    Shutdown,
}

/// Outcome of one session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub session: u64,
    pub peer: String,
    pub frames: u64,
    pub end: SessionEnd,
}

/// Totals for one supervisor run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub sessions: u64,
    pub frames_relayed: u64,
    pub releases: u64,
    pub disconnects: u64,
    pub incomplete_frames: u64,
    pub transport_errors: u64,
    /// Most recent sessions, oldest first.
    pub recent: VecDeque<SessionReport>,
}

impl RunSummary {
    pub const RECENT_CAPACITY: usize = 16;

    pub(crate) fn record(&mut self, report: SessionReport) {
        match report.end {
            SessionEnd::PeerClosed => self.disconnects += 1,
            SessionEnd::Incomplete { .. } => self.incomplete_frames += 1,
            SessionEnd::Transport { .. } => self.transport_errors += 1,
            SessionEnd::Shutdown => {}
        }
        if self.recent.len() == Self::RECENT_CAPACITY {
            self.recent.pop_front();
        }
        self.recent.push_back(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(session: u64, end: SessionEnd) -> SessionReport {
        SessionReport {
            session,
            peer: format!("peer-{session}"),
            frames: 0,
            end,
        }
    }

    #[test]
    fn record_counts_by_end_kind() {
        let mut summary = RunSummary::default();
        summary.record(report(1, SessionEnd::PeerClosed));
        summary.record(report(
            2,
            SessionEnd::Incomplete {
                received: 3,
                expected: 7,
            },
        ));
        summary.record(report(
            3,
            SessionEnd::Transport {
                error: "reset".into(),
            },
        ));
        summary.record(report(4, SessionEnd::Shutdown));

        assert_eq!(summary.disconnects, 1);
        assert_eq!(summary.incomplete_frames, 1);
        assert_eq!(summary.transport_errors, 1);
        assert_eq!(summary.recent.len(), 4);
    }

    #[test]
    fn recent_is_bounded() {
        let mut summary = RunSummary::default();
        for i in 0..(RunSummary::RECENT_CAPACITY as u64 + 5) {
            summary.record(report(i, SessionEnd::PeerClosed));
        }
        assert_eq!(summary.recent.len(), RunSummary::RECENT_CAPACITY);
        assert_eq!(summary.recent.front().map(|r| r.session), Some(5));
    }

    #[test]
    fn session_end_serializes_with_kind_tag() {
        let json = serde_json::to_value(SessionEnd::Incomplete {
            received: 3,
            expected: 7,
        })
        .unwrap();
        assert_eq!(json["kind"], "incomplete");
        assert_eq!(json["received"], 3);
    }
}

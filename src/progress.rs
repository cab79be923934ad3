//! Progress indicator presenter.
//!
//! Pure mapping from engine state to user-facing notices. Nothing here feeds
//! back into control flow; the engine reports, the sink displays.

use std::time::Duration;

use tracing::{debug, info};

use crate::traits::ProgressSink;

/// How the requested day relates to what is already rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    /// The final day: the loop is (about to be) closed.
    Complete,
    /// Forward move with prior progress; only days `from..=to` are added.
    Incremental { from: u32, to: u32 },
    /// Backward move; everything is rebuilt up to `to`.
    Backward { to: u32 },
    /// First render, or forward move from a clean slate.
    InProgress { to: u32 },
}

impl ProgressPhase {
    /// Derive the phase from `(target, last rendered, total)`. The complete
    /// phase wins over incremental when the target is the final day.
    pub fn for_state(target_day: u32, last_rendered_day: u32, total_days: u32) -> Self {
        if target_day == total_days {
            Self::Complete
        } else if target_day > last_rendered_day && last_rendered_day > 0 {
            Self::Incremental {
                from: last_rendered_day + 1,
                to: target_day,
            }
        } else if target_day < last_rendered_day {
            Self::Backward { to: target_day }
        } else {
            Self::InProgress { to: target_day }
        }
    }
}

/// An icon/text pair with an auto-dismiss duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressNotice {
    pub icon: &'static str,
    pub text: String,
    pub dismiss_after: Duration,
}

impl ProgressNotice {
    pub fn for_phase(phase: ProgressPhase, total_days: u32) -> Self {
        match phase {
            ProgressPhase::Complete => Self {
                icon: "🎯",
                text: "Complete loop route built!".to_string(),
                dismiss_after: Duration::from_millis(3000),
            },
            ProgressPhase::Incremental { from, to } => Self {
                icon: "➕",
                text: format!("Adding routes for days {from}-{to} ({to}/{total_days})"),
                dismiss_after: Duration::from_millis(2000),
            },
            ProgressPhase::Backward { to } => Self {
                icon: "⬅️",
                text: format!("Rewinding to day {to} ({to}/{total_days})"),
                dismiss_after: Duration::from_millis(2000),
            },
            ProgressPhase::InProgress { to } => Self {
                icon: "🛣️",
                text: format!("Building routes... ({to}/{total_days} days)"),
                dismiss_after: Duration::from_millis(1500),
            },
        }
    }
}

/// Live per-batch progress line.
pub fn percent_label(percent: u8, rendered: usize, total: usize) -> String {
    format!("Loading routes... {percent}% ({rendered}/{total})")
}

/// Sink that forwards everything to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn on_phase(&self, notice: &ProgressNotice) {
        info!(icon = notice.icon, "{}", notice.text);
    }

    fn on_batch(&self, percent: u8, rendered: usize, total: usize) {
        debug!("{}", percent_label(percent, rendered, total));
    }

    fn on_loop_closed(&self) {
        info!("itinerary loop closed");
    }
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_wins_over_incremental() {
        assert_eq!(ProgressPhase::for_state(10, 7, 10), ProgressPhase::Complete);
    }

    #[test]
    fn forward_with_progress_is_incremental() {
        assert_eq!(
            ProgressPhase::for_state(5, 3, 10),
            ProgressPhase::Incremental { from: 4, to: 5 }
        );
    }

    #[test]
    fn forward_from_clean_slate_is_in_progress() {
        assert_eq!(
            ProgressPhase::for_state(4, 0, 10),
            ProgressPhase::InProgress { to: 4 }
        );
    }

    #[test]
    fn backward_move() {
        assert_eq!(
            ProgressPhase::for_state(3, 7, 10),
            ProgressPhase::Backward { to: 3 }
        );
    }

    #[test]
    fn same_day_is_in_progress() {
        assert_eq!(
            ProgressPhase::for_state(3, 3, 10),
            ProgressPhase::InProgress { to: 3 }
        );
    }

    #[test]
    fn notice_durations() {
        let complete = ProgressNotice::for_phase(ProgressPhase::Complete, 10);
        assert_eq!(complete.dismiss_after, Duration::from_millis(3000));

        let incremental =
            ProgressNotice::for_phase(ProgressPhase::Incremental { from: 2, to: 4 }, 10);
        assert_eq!(incremental.dismiss_after, Duration::from_millis(2000));
        assert_eq!(incremental.text, "Adding routes for days 2-4 (4/10)");

        let building = ProgressNotice::for_phase(ProgressPhase::InProgress { to: 2 }, 10);
        assert_eq!(building.dismiss_after, Duration::from_millis(1500));
    }

    #[test]
    fn percent_label_format() {
        assert_eq!(percent_label(62, 5, 8), "Loading routes... 62% (5/8)");
    }
}

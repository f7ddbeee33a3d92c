use serde::{Deserialize, Serialize};

use super::TimelineMap;

/// Which transport drives the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackMode {
    /// The clock is a position in the performance recording.
    #[default]
    Performance,
    /// The clock is a position on the symbolic timeline.
    Symbolic,
}

impl PlaybackMode {
    /// Converts a transport clock value to the symbolic display instant.
    pub fn display_instant(self, clock: f64, timeline: &TimelineMap) -> f64 {
        match self {
            PlaybackMode::Performance => timeline.to_symbolic_time(clock),
            PlaybackMode::Symbolic => clock,
        }
    }

    /// Transport clock value that shows `instant`; used to keep the
    /// position when switching modes.
    pub fn clock_for(self, instant: f64, timeline: &TimelineMap) -> f64 {
        match self {
            PlaybackMode::Performance => timeline.to_performance_time(instant),
            PlaybackMode::Symbolic => instant,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PlaybackMode::Performance => "AUDIO",
            PlaybackMode::Symbolic => "MIDI",
        }
    }
}

/// `M:SS.cc`
pub fn format_time(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let mins = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    let centis = ((seconds % 1.0) * 100.0).floor() as u64;
    format!("{}:{:02}.{:02}", mins, secs, centis)
}

/// `M:SS`
pub fn format_time_short(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let mins = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{}:{:02}", mins, secs)
}

use serde::{Deserialize, Serialize};

use super::Color;

/// A single note on the symbolic timeline.
///
/// Times are seconds on the symbolic (quantized) timeline. Events are owned
/// by the [`Score`](super::Score) and only ever borrowed downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// MIDI pitch, 0-127
    pub pitch: u8,
    pub start_time: f64,
    pub duration: f64,
    /// 0.0 -> 1.0
    pub velocity: f32,
    pub track_id: usize,
}

impl NoteEvent {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Whether `instant` falls inside `[start_time, end_time)`.
    pub fn is_sounding_at(&self, instant: f64) -> bool {
        instant >= self.start_time && instant < self.end_time()
    }

    /// Strict overlap with the half-open range `[start, end)`. An empty range
    /// overlaps nothing.
    ///
    /// Zero-length events count as overlapping when their start lies inside
    /// the range, so they are never lost.
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        if !(end > start) {
            return false;
        }
        if self.duration <= 0.0 {
            return self.start_time >= start && self.start_time < end;
        }
        self.start_time < end && self.end_time() > start
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub id: usize,
    pub name: String,
    pub color: Color,
    pub instrument: String,
    pub note_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: u32,
    pub denominator: u32,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            numerator: 4,
            denominator: 4,
        }
    }
}

mod event;
mod loader;
pub mod palette;

pub use event::{NoteEvent, TimeSignature, TrackInfo};
pub use loader::{NoteDocument, RonScoreSource, ScoreDocument, ScoreSource, TrackDocument};
pub use palette::Color;

/// The symbolic timeline: an ordered event list plus its track roster.
///
/// Loaded once per session and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Score {
    pub name: String,
    /// Sorted by `start_time`
    pub events: Vec<NoteEvent>,
    pub tracks: Vec<TrackInfo>,
    /// Seconds, end of the last event
    pub duration: f64,
    pub bpm: f32,
    pub time_signature: TimeSignature,
}

impl Score {
    pub fn track(&self, id: usize) -> Option<&TrackInfo> {
        self.tracks.get(id)
    }

    pub fn events_on_track(&self, track_id: usize) -> impl Iterator<Item = &NoteEvent> {
        self.events.iter().filter(move |e| e.track_id == track_id)
    }
}

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{NoteEvent, Score, TimeSignature, TrackInfo, palette};
use crate::error::{Result, SyncError};

const DEFAULT_BPM: f32 = 120.0;

/// Turns the bytes of a symbolic file into a [`Score`].
pub trait ScoreSource {
    fn load(&self, name: &str, bytes: &[u8]) -> Result<Score>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteDocument {
    pub pitch: u8,
    pub time: f64,
    pub duration: f64,
    pub velocity: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub instrument: String,
    #[serde(default)]
    pub notes: Vec<NoteDocument>,
}

/// On-disk shape of a transcribed score.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub bpm: Option<f32>,
    #[serde(default)]
    pub time_signature: Option<TimeSignature>,
    #[serde(default)]
    pub tracks: Vec<TrackDocument>,
}

impl ScoreDocument {
    /// Builds the event list and roster.
    ///
    /// Empty tracks are dropped and the remaining ones are re-indexed, so a
    /// track id is always a valid index into `Score::tracks`.
    pub fn into_score(self, fallback_name: &str) -> Result<Score> {
        let name = if self.name.is_empty() {
            fallback_name.to_string()
        } else {
            self.name
        };

        let mut events = Vec::new();
        let mut tracks: Vec<TrackInfo> = Vec::new();

        for track in self.tracks {
            if track.notes.is_empty() {
                continue;
            }

            let id = tracks.len();
            tracks.push(TrackInfo {
                id,
                name: if track.name.is_empty() {
                    format!("Track {}", id + 1)
                } else {
                    track.name
                },
                color: palette::track_color(id),
                instrument: if track.instrument.is_empty() {
                    "Unknown".to_string()
                } else {
                    track.instrument
                },
                note_count: track.notes.len(),
            });

            for note in track.notes {
                if note.pitch > 127 {
                    return Err(SyncError::ScoreLoad {
                        name,
                        message: format!("pitch {} out of range on track {}", note.pitch, id),
                    });
                }
                events.push(NoteEvent {
                    pitch: note.pitch,
                    start_time: note.time,
                    duration: note.duration,
                    velocity: note.velocity,
                    track_id: id,
                });
            }
        }

        events.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

        let duration = events
            .iter()
            .map(NoteEvent::end_time)
            .fold(0.0_f64, f64::max);

        debug!(
            "Built score '{}' with {} events on {} tracks",
            name,
            events.len(),
            tracks.len()
        );

        Ok(Score {
            name,
            events,
            tracks,
            duration,
            bpm: self.bpm.unwrap_or(DEFAULT_BPM),
            time_signature: self.time_signature.unwrap_or_default(),
        })
    }
}

/// Reads [`ScoreDocument`]s written as RON.
#[derive(Debug, Clone, Copy, Default)]
pub struct RonScoreSource;

impl ScoreSource for RonScoreSource {
    fn load(&self, name: &str, bytes: &[u8]) -> Result<Score> {
        let text = std::str::from_utf8(bytes).map_err(|e| SyncError::ScoreLoad {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        let document: ScoreDocument = ron::from_str(text)?;
        let score = document.into_score(name)?;
        info!("Loaded score '{}' ({:.2}s)", score.name, score.duration);
        Ok(score)
    }
}

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};
use crate::score::NoteEvent;

/// Visual effect kinds. The resolver treats them as plain data; drawing
/// each one is up to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnotationKind {
    /// Melodic runs
    Wavy,
    /// Syncopation
    Spark,
    /// Strong accents
    Punch,
    /// Sustained notes
    Glow,
    /// Section markers
    Phrase,
    /// Single note emphasis
    Accent,
    /// Rapid repetition
    Tremolo,
    /// Smooth connection
    Legato,
}

impl AnnotationKind {
    pub const ALL: [AnnotationKind; 8] = [
        AnnotationKind::Wavy,
        AnnotationKind::Spark,
        AnnotationKind::Punch,
        AnnotationKind::Glow,
        AnnotationKind::Phrase,
        AnnotationKind::Accent,
        AnnotationKind::Tremolo,
        AnnotationKind::Legato,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AnnotationKind::Wavy => "Wavy",
            AnnotationKind::Spark => "Spark",
            AnnotationKind::Punch => "Punch",
            AnnotationKind::Glow => "Glow",
            AnnotationKind::Phrase => "Phrase",
            AnnotationKind::Accent => "Accent",
            AnnotationKind::Tremolo => "Tremolo",
            AnnotationKind::Legato => "Legato",
        }
    }

    /// Position in [`AnnotationKind::ALL`], for kind-indexed tables.
    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotationScope {
    /// Applies to one track only.
    Track { track_id: usize },
    /// Applies to a time range, optionally limited to some tracks.
    Range {
        #[serde(default)]
        tracks: Option<Vec<usize>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    pub kind: AnnotationKind,
    pub scope: AnnotationScope,
    /// Symbolic seconds
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default)]
    pub label: Option<String>,
}

impl Annotation {
    pub fn new(kind: AnnotationKind, scope: AnnotationScope, start_time: f64, end_time: f64) -> Self {
        Self {
            id: format!("ad-{}", uuid::Uuid::new_v4()),
            kind,
            scope,
            start_time,
            end_time,
            label: Some(kind.label().to_string()),
        }
    }

    /// Covers a whole track, from the origin to `score_duration`.
    pub fn for_track(kind: AnnotationKind, track_id: usize, score_duration: f64) -> Self {
        Self::new(
            kind,
            AnnotationScope::Track { track_id },
            0.0,
            score_duration,
        )
    }

    /// Covers the span of a selection of events, on every track.
    ///
    /// Returns `None` for an empty selection.
    pub fn for_selection<'a>(
        kind: AnnotationKind,
        selection: impl IntoIterator<Item = &'a NoteEvent>,
    ) -> Option<Self> {
        let (start, end) = selection.into_iter().fold(None, |span, e| match span {
            None => Some((e.start_time, e.end_time())),
            Some((start, end)) => Some((f64::min(start, e.start_time), f64::max(end, e.end_time()))),
        })?;
        Some(Self::new(
            kind,
            AnnotationScope::Range { tracks: None },
            start,
            end,
        ))
    }

    /// Limits a range annotation to the given tracks. Track annotations are
    /// returned unchanged.
    pub fn restricted_to(mut self, tracks: Vec<usize>) -> Self {
        if let AnnotationScope::Range { tracks: allowed } = &mut self.scope {
            *allowed = Some(tracks);
        }
        self
    }

    pub fn validate(&self, track_count: usize) -> Result<()> {
        if !(self.start_time.is_finite() && self.end_time.is_finite()) {
            return Err(SyncError::InvalidAnnotation(format!(
                "{} has a non-finite time range",
                self.id
            )));
        }
        if self.end_time < self.start_time {
            return Err(SyncError::InvalidAnnotation(format!(
                "{} ends before it starts",
                self.id
            )));
        }
        if let AnnotationScope::Track { track_id } = self.scope {
            if track_id >= track_count {
                return Err(SyncError::UnknownTrack(track_id));
            }
        }
        Ok(())
    }

    /// Whether this annotation decorates `event`.
    pub fn applies_to(&self, event: &NoteEvent) -> bool {
        if !event.overlaps(self.start_time, self.end_time) {
            return false;
        }
        match &self.scope {
            AnnotationScope::Track { track_id } => *track_id == event.track_id,
            AnnotationScope::Range { tracks: None } => true,
            AnnotationScope::Range {
                tracks: Some(allowed),
            } => allowed.contains(&event.track_id),
        }
    }
}

/// Kinds of every annotation that applies to `event`, in library order.
///
/// Repeated kinds are kept; each one is drawn.
pub fn resolve(event: &NoteEvent, annotations: &[Annotation]) -> Vec<AnnotationKind> {
    annotations
        .iter()
        .filter(|a| a.applies_to(event))
        .map(|a| a.kind)
        .collect()
}

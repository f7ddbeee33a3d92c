use tracing::trace;

use super::annotation::{self, Annotation, AnnotationKind};
use super::state::{ViewState, is_dimmed};
use super::viewport::{Placement, TimeAxis, Window, resolve_viewport};
use crate::score::{Color, NoteEvent, Score};
use crate::timing::{PlaybackMode, TimelineMap};

const DIMMED_OPACITY: f32 = 0.2;
const MAX_GRID_LINES: usize = 2048;
/// Beyond 2^53 grid indices are no longer exact in f64.
const MAX_GRID_INDEX: f64 = 9_007_199_254_740_992.0;

/// A note ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNote<'a> {
    pub index: usize,
    pub event: &'a NoteEvent,
    pub placement: Placement,
    pub color: Color,
    /// Sounding at the display instant
    pub active: bool,
    /// Muted, or another track holds solo
    pub dimmed: bool,
    pub opacity: f32,
    pub annotations: Vec<AnnotationKind>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncMarker {
    pub id: String,
    pub label: String,
    pub along: f32,
}

/// One fully resolved frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<'a> {
    pub mode: PlaybackMode,
    /// Transport position as received
    pub clock: f64,
    /// Symbolic time being shown
    pub instant: f64,
    pub window: Window,
    pub axis: TimeAxis,
    pub playhead: f32,
    pub notes: Vec<ResolvedNote<'a>>,
    pub markers: Vec<SyncMarker>,
    /// Time-axis coordinates of the beat grid
    pub grid: Vec<f32>,
    pub sync_point_count: usize,
}

impl<'a> Frame<'a> {
    pub fn active_notes(&self) -> impl Iterator<Item = &ResolvedNote<'a>> {
        self.notes.iter().filter(|n| n.active)
    }
}

/// Runs the whole per-frame pipeline for one transport clock value.
///
/// Clock -> display instant -> visible notes -> annotations and dimming.
pub fn resolve_frame<'a>(
    score: &'a Score,
    timeline: &TimelineMap,
    annotations: &[Annotation],
    view: &ViewState,
    clock: f64,
) -> Frame<'a> {
    let instant = view.mode.display_instant(clock, timeline);
    let viewport = resolve_viewport(&score.events, &view.tracks, &view.layout, instant);

    let notes: Vec<ResolvedNote<'a>> = viewport
        .notes
        .iter()
        .map(|placed| {
            let event = placed.event;
            let active = event.is_sounding_at(instant);
            let dimmed = is_dimmed(&view.tracks, event.track_id);
            ResolvedNote {
                index: placed.index,
                event,
                placement: placed.placement,
                color: view.track_color(event.track_id),
                active,
                dimmed,
                opacity: opacity(event, active, dimmed),
                annotations: annotation::resolve(event, annotations),
            }
        })
        .collect();

    let markers = timeline
        .points()
        .iter()
        .filter(|p| viewport.window.contains(p.symbolic_time))
        .map(|p| SyncMarker {
            id: p.id.clone(),
            label: p.label.clone(),
            along: viewport.project(p.symbolic_time, instant),
        })
        .collect();

    let grid = grid_lines(viewport.window, view.grid_interval)
        .into_iter()
        .map(|t| viewport.project(t, instant))
        .collect();

    trace!(
        "Frame at clock {:.3}s -> instant {:.3}s: {} notes",
        clock,
        instant,
        notes.len()
    );

    Frame {
        mode: view.mode,
        clock,
        instant,
        window: viewport.window,
        axis: viewport.axis,
        playhead: viewport.playhead,
        notes,
        markers,
        grid,
        sync_point_count: timeline.len(),
    }
}

fn opacity(event: &NoteEvent, active: bool, dimmed: bool) -> f32 {
    if dimmed {
        DIMMED_OPACITY
    } else if active {
        1.0
    } else {
        event.velocity.clamp(0.0, 1.0) * 0.7 + 0.3
    }
}

/// Multiples of `interval` inside `window`.
fn grid_lines(window: Window, interval: f64) -> Vec<f64> {
    if !(interval > 0.0) || !window.start.is_finite() || !window.end.is_finite() {
        return Vec::new();
    }
    let first = (window.start / interval).ceil();
    if !(first.abs() < MAX_GRID_INDEX) {
        return Vec::new();
    }
    let first = first as i64;
    (0..MAX_GRID_LINES)
        .map(|i| first.saturating_add(i as i64) as f64 * interval)
        .take_while(|t| *t < window.end)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{TrackInfo, palette};
    use crate::timing::{ExtrapolationPolicy, SyncPoint};
    use crate::view::{AnnotationKind, AnnotationScope, Layout, RollLayout, TrackState};

    fn score() -> Score {
        let events = vec![
            NoteEvent {
                pitch: 60,
                start_time: 4.0,
                duration: 2.0,
                velocity: 0.5,
                track_id: 0,
            },
            NoteEvent {
                pitch: 67,
                start_time: 5.5,
                duration: 1.0,
                velocity: 1.0,
                track_id: 1,
            },
        ];
        let tracks = (0..2)
            .map(|id| TrackInfo {
                id,
                name: format!("T{}", id),
                color: palette::track_color(id),
                instrument: "piano".into(),
                note_count: 1,
            })
            .collect();
        Score {
            name: "test".into(),
            events,
            tracks,
            duration: 6.5,
            bpm: 120.0,
            time_signature: Default::default(),
        }
    }

    fn view(score: &Score) -> ViewState {
        let tracks = score.tracks.iter().map(TrackState::from_info).collect();
        ViewState::new(
            tracks,
            Layout::Roll(RollLayout {
                width: 1000.0,
                height: 400.0,
                units_per_second: 100.0,
                playhead_offset: 100.0,
                pitch_margin: 20.0,
            }),
        )
    }

    #[test]
    fn test_performance_clock_is_mapped() {
        let score = score();
        let points = vec![SyncPoint::new(0.0, 0.0, "a"), SyncPoint::new(10.0, 20.0, "b")];
        let timeline = TimelineMap::new(&points, ExtrapolationPolicy::default());

        let frame = resolve_frame(&score, &timeline, &[], &view(&score), 10.0);
        assert_eq!(frame.instant, 5.0);
        assert_eq!(frame.notes.len(), 2);

        let active: Vec<usize> = frame.active_notes().map(|n| n.index).collect();
        assert_eq!(active, vec![0]);
        assert_eq!(frame.notes[0].opacity, 1.0);
        assert_eq!(frame.notes[1].opacity, 1.0 * 0.7 + 0.3);
        // only the second point lies inside [4, 14)
        assert_eq!(frame.markers.len(), 1);
        assert_eq!(frame.markers[0].label, "b");
        assert_eq!(frame.markers[0].along, 600.0);
        assert_eq!(frame.sync_point_count, 2);
    }

    #[test]
    fn test_dimmed_notes_are_kept() {
        let score = score();
        let mut view = view(&score);
        view.mode = PlaybackMode::Symbolic;
        view.toggle_solo(1).unwrap();

        let frame = resolve_frame(&score, &TimelineMap::identity(), &[], &view, 5.0);
        assert_eq!(frame.notes.len(), 2);
        assert!(frame.notes[0].dimmed);
        assert!(frame.notes[0].active);
        assert_eq!(frame.notes[0].opacity, DIMMED_OPACITY);
        assert!(!frame.notes[1].dimmed);
    }

    #[test]
    fn test_annotations_attach_per_note() {
        let score = score();
        let library = vec![
            Annotation::for_track(AnnotationKind::Glow, 1, score.duration),
            Annotation::new(
                AnnotationKind::Wavy,
                AnnotationScope::Range { tracks: None },
                0.0,
                5.0,
            ),
        ];
        let frame = resolve_frame(&score, &TimelineMap::identity(), &library, &view(&score), 5.0);
        assert_eq!(frame.notes[0].annotations, vec![AnnotationKind::Wavy]);
        assert_eq!(frame.notes[1].annotations, vec![AnnotationKind::Glow]);
    }

    #[test]
    fn test_grid_lines_inside_window() {
        let lines = grid_lines(Window { start: 0.2, end: 1.6 }, 0.5);
        assert_eq!(lines, vec![0.5, 1.0, 1.5]);
        assert!(grid_lines(Window { start: 0.0, end: 1.0 }, 0.0).is_empty());
        assert_eq!(grid_lines(Window { start: 0.0, end: 1e9 }, 1e-6).len(), MAX_GRID_LINES);
    }

    #[test]
    fn test_grid_far_from_origin_is_empty() {
        assert!(grid_lines(Window { start: 1e300, end: 2e300 }, 0.5).is_empty());
        assert!(grid_lines(Window { start: -1e300, end: 0.0 }, 0.5).is_empty());
        assert_eq!(grid_lines(Window { start: 0.0, end: 1.0 }, 1e-300).len(), MAX_GRID_LINES);
    }

    #[test]
    fn test_marker_at_window_start_is_kept() {
        let score = score();
        let mut view = view(&score);
        view.mode = PlaybackMode::Symbolic;
        // window is [4, 14) at instant 5
        let points = vec![SyncPoint::new(4.0, 4.0, "edge"), SyncPoint::new(14.0, 14.0, "past")];
        let timeline = TimelineMap::new(&points, ExtrapolationPolicy::default());

        let frame = resolve_frame(&score, &timeline, &[], &view, 5.0);
        assert_eq!(frame.window.start, 4.0);
        assert_eq!(frame.markers.len(), 1);
        assert_eq!(frame.markers[0].label, "edge");
        assert_eq!(frame.markers[0].along, 0.0);
    }
}

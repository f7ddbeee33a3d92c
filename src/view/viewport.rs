//! Selects the events inside the visible time window and places them.
//!
//! Every function here is a pure projection of its inputs: no event or
//! track state is modified and identical inputs give identical output.

use super::state::{CinemaLayout, Layout, RollLayout, TrackState, is_visible};
use crate::score::NoteEvent;

const PITCH_MARGIN: f32 = 2.0;
const MIN_PITCH_SPAN: f32 = 1.0;
const MIN_SCALE: f32 = 1e-3;
const ROLL_MIN_LENGTH: f32 = 2.0;
const ROLL_MIN_THICKNESS: f32 = 3.0;
const CINEMA_MIN_LENGTH: f32 = 4.0;
const CINEMA_MIN_THICKNESS: f32 = 8.0;
const DEFAULT_RANGE: PitchRange = PitchRange {
    min: 60.0,
    max: 72.0,
};

/// Half-open span `[start, end)` of the symbolic timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub start: f64,
    pub end: f64,
}

impl Window {
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t < self.end
    }
}

/// Direction notes extend in from their start coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeAxis {
    /// Later is further right.
    Rightward,
    /// Later is further up; `along` grows downward as in screen space.
    Upward,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Screen coordinate of the note start on the time axis
    pub along: f32,
    /// Extent on the time axis, in the direction given by [`TimeAxis`]
    pub length: f32,
    /// Center of the note across the time axis
    pub across: f32,
    pub thickness: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchRange {
    pub min: f32,
    pub max: f32,
}

impl PitchRange {
    /// Observed range widened by two semitones each side.
    fn observe<'a>(events: impl Iterator<Item = &'a NoteEvent>) -> Option<Self> {
        let mut range: Option<(u8, u8)> = None;
        for e in events {
            range = Some(match range {
                Some((lo, hi)) => (lo.min(e.pitch), hi.max(e.pitch)),
                None => (e.pitch, e.pitch),
            });
        }
        range.map(|(lo, hi)| Self {
            min: lo as f32 - PITCH_MARGIN,
            max: hi as f32 + PITCH_MARGIN,
        })
    }

    pub fn span(&self) -> f32 {
        (self.max - self.min).max(MIN_PITCH_SPAN)
    }

    /// 0.0 at `min`, 1.0 at `max`.
    pub fn normalize(&self, pitch: u8) -> f32 {
        (pitch as f32 - self.min) / self.span()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedNote<'a> {
    /// Position in the input slice
    pub index: usize,
    pub event: &'a NoteEvent,
    pub placement: Placement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport<'a> {
    pub window: Window,
    pub axis: TimeAxis,
    /// Screen coordinate of the playhead on the time axis
    pub playhead: f32,
    /// Units per second on the time axis
    pub scale: f32,
    pub notes: Vec<PlacedNote<'a>>,
}

impl Viewport<'_> {
    /// Screen coordinate of symbolic time `t` on the time axis.
    pub fn project(&self, t: f64, instant: f64) -> f32 {
        project(self.axis, self.playhead, self.scale, t, instant)
    }
}

fn project(axis: TimeAxis, playhead: f32, scale: f32, t: f64, instant: f64) -> f32 {
    let offset = ((t - instant) as f32) * scale;
    match axis {
        TimeAxis::Rightward => playhead + offset,
        TimeAxis::Upward => playhead - offset,
    }
}

/// Resolves which events are on screen at `instant` and where.
///
/// Events on hidden tracks are left out entirely; muted or soloed-out tracks
/// are still placed here and only dimmed later.
pub fn resolve_viewport<'a>(
    events: &'a [NoteEvent],
    tracks: &[TrackState],
    layout: &Layout,
    instant: f64,
) -> Viewport<'a> {
    match layout {
        Layout::Roll(roll) => resolve_roll(events, tracks, roll, instant),
        Layout::Cinema(cinema) => resolve_cinema(events, tracks, cinema, instant),
    }
}

fn window_around(instant: f64, playhead: f32, extent: f32, scale: f32) -> Window {
    Window {
        start: instant - (playhead / scale) as f64,
        end: instant + ((extent - playhead) / scale) as f64,
    }
}

fn visible_in_window<'a>(
    events: &'a [NoteEvent],
    tracks: &[TrackState],
    window: Window,
) -> impl Iterator<Item = (usize, &'a NoteEvent)> {
    events
        .iter()
        .enumerate()
        .filter(move |(_, e)| is_visible(tracks, e.track_id) && e.overlaps(window.start, window.end))
}

fn resolve_roll<'a>(
    events: &'a [NoteEvent],
    tracks: &[TrackState],
    roll: &RollLayout,
    instant: f64,
) -> Viewport<'a> {
    let scale = roll.units_per_second.max(MIN_SCALE);
    let width = roll.width.max(0.0);
    let playhead = roll.playhead_offset.clamp(0.0, width);
    let window = window_around(instant, playhead, width, scale);

    let range = PitchRange::observe(events.iter().filter(|e| is_visible(tracks, e.track_id)))
        .unwrap_or(DEFAULT_RANGE);
    let usable = (roll.height - 2.0 * roll.pitch_margin).max(0.0);
    let thickness = (usable / range.span()).max(ROLL_MIN_THICKNESS);

    let notes = visible_in_window(events, tracks, window)
        .map(|(index, event)| PlacedNote {
            index,
            event,
            placement: Placement {
                along: project(TimeAxis::Rightward, playhead, scale, event.start_time, instant),
                length: (event.duration as f32 * scale).max(ROLL_MIN_LENGTH),
                across: roll.height - range.normalize(event.pitch) * usable - roll.pitch_margin,
                thickness,
            },
        })
        .collect();

    Viewport {
        window,
        axis: TimeAxis::Rightward,
        playhead,
        scale,
        notes,
    }
}

fn resolve_cinema<'a>(
    events: &'a [NoteEvent],
    tracks: &[TrackState],
    cinema: &CinemaLayout,
    instant: f64,
) -> Viewport<'a> {
    let height = cinema.height.max(0.0);
    let scale = (height / cinema.seconds_visible.max(MIN_SCALE)).max(MIN_SCALE);
    let playhead = height / 2.0;
    let window = window_around(instant, playhead, height, scale);

    let lane_count = tracks.len().max(1);
    let lane_width = cinema.width.max(0.0) / lane_count as f32;
    let area = (lane_width - 2.0 * cinema.lane_padding).max(0.0);
    let thickness = (area / 20.0).max(CINEMA_MIN_THICKNESS);

    let ranges: Vec<PitchRange> = (0..lane_count)
        .map(|lane| {
            PitchRange::observe(events.iter().filter(|e| e.track_id == lane))
                .unwrap_or(DEFAULT_RANGE)
        })
        .collect();

    // a track missing from the roster has no lane to draw in
    let notes = visible_in_window(events, tracks, window)
        .filter(|(_, event)| event.track_id < tracks.len())
        .map(|(index, event)| {
            let lane = event.track_id;
            let lane_start = lane as f32 * lane_width + cinema.lane_padding;
            PlacedNote {
                index,
                event,
                placement: Placement {
                    along: project(TimeAxis::Upward, playhead, scale, event.start_time, instant),
                    length: (event.duration as f32 * scale).max(CINEMA_MIN_LENGTH),
                    across: lane_start + ranges[lane].normalize(event.pitch) * area,
                    thickness,
                },
            }
        })
        .collect();

    Viewport {
        window,
        axis: TimeAxis::Upward,
        playhead,
        scale,
        notes,
    }
}

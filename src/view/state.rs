use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SyncError};
use crate::score::{Color, TrackInfo, palette};
use crate::timing::PlaybackMode;

const MIN_UNITS_PER_SECOND: f32 = 10.0;
const MAX_UNITS_PER_SECOND: f32 = 400.0;
const MIN_SECONDS_VISIBLE: f32 = 2.0;
const MAX_SECONDS_VISIBLE: f32 = 60.0;

/// Per-track display state, toggled by the user between frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackState {
    pub id: usize,
    pub name: String,
    pub color: Color,
    pub visible: bool,
    pub muted: bool,
    pub solo: bool,
}

impl TrackState {
    pub fn from_info(info: &TrackInfo) -> Self {
        Self {
            id: info.id,
            name: info.name.clone(),
            color: info.color,
            visible: true,
            muted: false,
            solo: false,
        }
    }
}

/// The persisted part of a [`TrackState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSettings {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub muted: bool,
    #[serde(default)]
    pub solo: bool,
}

fn default_true() -> bool {
    true
}

impl From<&TrackState> for TrackSettings {
    fn from(track: &TrackState) -> Self {
        Self {
            name: track.name.clone(),
            visible: track.visible,
            muted: track.muted,
            solo: track.solo,
        }
    }
}

/// Builds the roster state, applying saved settings by track index.
pub fn merge_track_settings(infos: &[TrackInfo], saved: &[TrackSettings]) -> Vec<TrackState> {
    infos
        .iter()
        .enumerate()
        .map(|(i, info)| {
            let mut state = TrackState::from_info(info);
            if let Some(settings) = saved.get(i) {
                state.visible = settings.visible;
                state.muted = settings.muted;
                state.solo = settings.solo;
            }
            state
        })
        .collect()
}

pub fn any_solo(tracks: &[TrackState]) -> bool {
    tracks.iter().any(|t| t.solo)
}

/// A track is dimmed when it is muted, or when another track holds solo.
///
/// Events on tracks missing from the roster count as unmuted and unsoloed.
pub fn is_dimmed(tracks: &[TrackState], track_id: usize) -> bool {
    let track = tracks.get(track_id);
    let muted = track.is_some_and(|t| t.muted);
    let soloed = track.is_some_and(|t| t.solo);
    muted || (any_solo(tracks) && !soloed)
}

/// Events on tracks missing from the roster stay visible.
pub fn is_visible(tracks: &[TrackState], track_id: usize) -> bool {
    tracks.get(track_id).is_none_or(|t| t.visible)
}

pub fn should_track_play(tracks: &[TrackState], track_id: usize) -> bool {
    tracks.get(track_id).is_some() && !is_dimmed(tracks, track_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollLayout {
    pub width: f32,
    pub height: f32,
    pub units_per_second: f32,
    /// Distance of the playhead from the left edge
    pub playhead_offset: f32,
    /// Blank band kept above and below the pitch range
    pub pitch_margin: f32,
}

impl Default for RollLayout {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 400.0,
            units_per_second: 100.0,
            playhead_offset: 150.0,
            pitch_margin: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CinemaLayout {
    pub width: f32,
    pub height: f32,
    pub seconds_visible: f32,
    pub lane_padding: f32,
}

impl Default for CinemaLayout {
    fn default() -> Self {
        Self {
            width: 1080.0,
            height: 1920.0,
            seconds_visible: 8.0,
            lane_padding: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Layout {
    /// Time runs left to right past a playhead at a fixed offset.
    Roll(RollLayout),
    /// Time runs bottom to top past a centered playhead, one lane per track.
    Cinema(CinemaLayout),
}

impl Default for Layout {
    fn default() -> Self {
        Layout::Roll(RollLayout::default())
    }
}

/// Everything the frame pipeline reads about the presentation.
///
/// Owned by the caller and passed in on every frame; the pipeline keeps no
/// state between calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub tracks: Vec<TrackState>,
    pub layout: Layout,
    pub mode: PlaybackMode,
    /// Seconds between grid lines, zero disables the grid
    pub grid_interval: f64,
}

impl ViewState {
    pub fn new(tracks: Vec<TrackState>, layout: Layout) -> Self {
        Self {
            tracks,
            layout,
            mode: PlaybackMode::default(),
            grid_interval: 0.5,
        }
    }

    pub fn track_color(&self, track_id: usize) -> Color {
        self.tracks
            .get(track_id)
            .map_or(palette::NEUTRAL, |t| t.color)
    }

    pub fn toggle_visible(&mut self, track_id: usize) -> Result<bool> {
        let track = self.track_mut(track_id)?;
        track.visible = !track.visible;
        debug!("Track {} visible: {}", track_id, track.visible);
        Ok(track.visible)
    }

    pub fn toggle_mute(&mut self, track_id: usize) -> Result<bool> {
        let track = self.track_mut(track_id)?;
        track.muted = !track.muted;
        debug!("Track {} muted: {}", track_id, track.muted);
        Ok(track.muted)
    }

    pub fn toggle_solo(&mut self, track_id: usize) -> Result<bool> {
        let track = self.track_mut(track_id)?;
        track.solo = !track.solo;
        debug!("Track {} solo: {}", track_id, track.solo);
        Ok(track.solo)
    }

    /// Scales the time axis by `factor`, within the layout's limits.
    pub fn zoom(&mut self, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        match &mut self.layout {
            Layout::Roll(roll) => {
                roll.units_per_second = (roll.units_per_second * factor)
                    .clamp(MIN_UNITS_PER_SECOND, MAX_UNITS_PER_SECOND);
            }
            Layout::Cinema(cinema) => {
                cinema.seconds_visible = (cinema.seconds_visible / factor)
                    .clamp(MIN_SECONDS_VISIBLE, MAX_SECONDS_VISIBLE);
            }
        }
    }

    pub fn track_settings(&self) -> Vec<TrackSettings> {
        self.tracks.iter().map(TrackSettings::from).collect()
    }

    fn track_mut(&mut self, track_id: usize) -> Result<&mut TrackState> {
        self.tracks
            .get_mut(track_id)
            .ok_or(SyncError::UnknownTrack(track_id))
    }
}

mod annotation;
mod frame;
mod state;
mod viewport;

pub use annotation::{Annotation, AnnotationKind, AnnotationScope, resolve as resolve_annotations};
pub use frame::{Frame, ResolvedNote, SyncMarker, resolve_frame};
pub use state::{
    CinemaLayout, Layout, RollLayout, TrackSettings, TrackState, ViewState, any_solo, is_dimmed,
    is_visible, merge_track_settings, should_track_play,
};
pub use viewport::{
    PitchRange, PlacedNote, Placement, TimeAxis, Viewport, Window, resolve_viewport,
};

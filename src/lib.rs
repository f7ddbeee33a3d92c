pub mod error;
pub mod project;
pub mod render;
pub mod score;
pub mod session;
pub mod settings;
pub mod timing;
pub mod view;

pub use error::{Result, SyncError};
pub use project::{DirectoryStore, ProjectStore, SongProject};
pub use render::{FrameRenderer, TextRenderer};
pub use score::{NoteEvent, RonScoreSource, Score, ScoreSource, TrackInfo};
pub use session::{Session, SessionCommand, SessionHandle, SessionUpdate, Snapshot};
pub use settings::Settings;
pub use timing::{
    AnchorStore, ExtrapolationPolicy, PlaybackMode, Segment, SegmentHealth, SyncPoint, TimelineMap,
    to_performance_time, to_symbolic_time,
};
pub use view::{Annotation, AnnotationKind, AnnotationScope, Frame, Layout, ViewState, resolve_frame};

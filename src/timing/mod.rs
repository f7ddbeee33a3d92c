mod anchors;
mod clock;
mod mapper;
mod segments;
mod sync_point;

pub use anchors::AnchorStore;
pub use clock::{PlaybackMode, format_time, format_time_short};
pub use mapper::{
    ExtrapolationPolicy, PostRoll, PreRoll, TimelineMap, to_performance_time, to_symbolic_time,
};
pub use segments::{Segment, SegmentHealth};
pub use sync_point::SyncPoint;

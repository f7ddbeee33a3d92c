use serde::{Deserialize, Serialize};

/// A user-placed correspondence between the two timelines.
///
/// Several points may share a coordinate; see [`TimelineMap`](super::TimelineMap)
/// for how ties are broken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncPoint {
    pub id: String,
    /// Seconds on the symbolic timeline
    pub symbolic_time: f64,
    /// Seconds on the performance recording
    pub performance_time: f64,
    pub label: String,
}

impl SyncPoint {
    pub fn new(symbolic_time: f64, performance_time: f64, label: impl Into<String>) -> Self {
        Self {
            id: format!("sp-{}", uuid::Uuid::new_v4()),
            symbolic_time,
            performance_time,
            label: label.into(),
        }
    }
}

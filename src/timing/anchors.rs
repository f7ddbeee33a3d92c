use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing::{debug, trace};

use super::{ExtrapolationPolicy, SyncPoint, TimelineMap};
use crate::error::{Result, SyncError};

/// The editable set of sync points for a session.
///
/// Edits only mark the cached [`TimelineMap`] stale; it is rebuilt the next
/// time [`AnchorStore::timeline`] is asked for it, so a drag gesture that
/// updates a point on every input event costs one rebuild per frame.
pub struct AnchorStore {
    points: Vec<SyncPoint>,
    policy: ExtrapolationPolicy,
    timeline: ArcSwapOption<TimelineMap>,
}

impl AnchorStore {
    pub fn new(policy: ExtrapolationPolicy) -> Self {
        Self::from_points(Vec::new(), policy)
    }

    pub fn from_points(points: Vec<SyncPoint>, policy: ExtrapolationPolicy) -> Self {
        Self {
            points,
            policy,
            timeline: ArcSwapOption::empty(),
        }
    }

    /// Points in insertion order.
    pub fn points(&self) -> &[SyncPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SyncPoint> {
        self.points.iter().find(|p| p.id == id)
    }

    pub fn policy(&self) -> ExtrapolationPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: ExtrapolationPolicy) {
        self.policy = policy;
        self.invalidate();
    }

    /// Pairs a symbolic instant with a performance instant.
    ///
    /// The new point is labelled `Sync N`, where N counts the existing points.
    pub fn add(&mut self, symbolic_time: f64, performance_time: f64) -> &SyncPoint {
        let label = format!("Sync {}", self.points.len() + 1);
        let point = SyncPoint::new(symbolic_time.max(0.0), performance_time.max(0.0), label);
        debug!(
            "Adding sync point {} ({:.3}s -> {:.3}s)",
            point.id, point.symbolic_time, point.performance_time
        );
        self.insert(point);
        &self.points[self.points.len() - 1]
    }

    pub fn insert(&mut self, point: SyncPoint) {
        self.points.push(point);
        self.invalidate();
    }

    pub fn set_symbolic_time(&mut self, id: &str, symbolic_time: f64) -> Result<()> {
        let point = self.get_mut(id)?;
        point.symbolic_time = symbolic_time.max(0.0);
        trace!("Moved {} to symbolic {:.3}s", id, point.symbolic_time);
        self.invalidate();
        Ok(())
    }

    pub fn set_performance_time(&mut self, id: &str, performance_time: f64) -> Result<()> {
        let point = self.get_mut(id)?;
        point.performance_time = performance_time.max(0.0);
        trace!("Moved {} to performance {:.3}s", id, point.performance_time);
        self.invalidate();
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<SyncPoint> {
        let idx = self
            .points
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| SyncError::UnknownSyncPoint(id.to_string()))?;
        let point = self.points.remove(idx);
        debug!("Removed sync point {}", point.id);
        self.invalidate();
        Ok(point)
    }

    /// The mapping for the current points, rebuilt if an edit happened
    /// since the last call.
    pub fn timeline(&self) -> Arc<TimelineMap> {
        if let Some(map) = self.timeline.load_full() {
            return map;
        }
        let map = Arc::new(TimelineMap::new(&self.points, self.policy));
        trace!("Rebuilt timeline map from {} points", self.points.len());
        self.timeline.store(Some(map.clone()));
        map
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut SyncPoint> {
        self.points
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| SyncError::UnknownSyncPoint(id.to_string()))
    }

    fn invalidate(&mut self) {
        self.timeline.store(None);
    }
}

impl fmt::Debug for AnchorStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnchorStore")
            .field("points", &self.points)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Default for AnchorStore {
    fn default() -> Self {
        Self::new(ExtrapolationPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_labels_and_clamps() {
        let mut store = AnchorStore::default();
        let first = store.add(1.0, 2.0).clone();
        let second = store.add(-4.0, 3.0).clone();

        assert_eq!(first.label, "Sync 1");
        assert_eq!(second.label, "Sync 2");
        assert_eq!(second.symbolic_time, 0.0);
        assert!(first.id.starts_with("sp-"));
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_timeline_is_cached_until_edited() {
        let mut store = AnchorStore::default();
        let id = store.add(10.0, 12.0).id.clone();

        let a = store.timeline();
        let b = store.timeline();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.to_performance_time(10.0), 12.0);

        store.set_performance_time(&id, 15.0).unwrap();
        let c = store.timeline();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(c.to_performance_time(10.0), 15.0);
        // the old snapshot is untouched
        assert_eq!(a.to_performance_time(10.0), 12.0);
    }

    #[test]
    fn test_drag_clamps_at_zero() {
        let mut store = AnchorStore::default();
        let id = store.add(5.0, 5.0).id.clone();
        store.set_symbolic_time(&id, -2.0).unwrap();
        assert_eq!(store.get(&id).unwrap().symbolic_time, 0.0);
    }

    #[test]
    fn test_remove_unknown_is_error() {
        let mut store = AnchorStore::default();
        store.add(1.0, 1.0);
        assert!(matches!(
            store.remove("sp-missing"),
            Err(SyncError::UnknownSyncPoint(_))
        ));
        assert!(matches!(
            store.set_symbolic_time("sp-missing", 1.0),
            Err(SyncError::UnknownSyncPoint(_))
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_rebuilds_mapping() {
        let mut store = AnchorStore::default();
        let id = store.add(10.0, 20.0).id.clone();
        assert_eq!(store.timeline().to_performance_time(5.0), 10.0);

        store.remove(&id).unwrap();
        assert!(store.timeline().is_empty());
        assert_eq!(store.timeline().to_performance_time(5.0), 5.0);
    }
}

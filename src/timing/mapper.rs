use serde::{Deserialize, Serialize};

use super::SyncPoint;

/// How a query before the first sync point is extrapolated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PreRoll {
    /// Scale by the origin-to-first-point rate.
    #[default]
    OriginRatio,
    /// Keep the first point's offset at a 1:1 rate.
    Offset,
}

/// How a query after the last sync point is extrapolated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PostRoll {
    /// Keep the last point's offset at a 1:1 rate.
    #[default]
    Offset,
    /// Continue at the rate of the last non-degenerate segment.
    LastSegmentRate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtrapolationPolicy {
    pub pre_roll: PreRoll,
    pub post_roll: PostRoll,
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    ToPerformance,
    ToSymbolic,
}

impl Direction {
    fn source(self, point: &SyncPoint) -> f64 {
        match self {
            Direction::ToPerformance => point.symbolic_time,
            Direction::ToSymbolic => point.performance_time,
        }
    }

    fn target(self, point: &SyncPoint) -> f64 {
        match self {
            Direction::ToPerformance => point.performance_time,
            Direction::ToSymbolic => point.symbolic_time,
        }
    }
}

/// Piecewise-linear mapping between the symbolic and performance timelines.
///
/// Points are kept twice, stably sorted by each coordinate, so points that
/// share a source coordinate stay in insertion order. For a query equal to
/// a shared coordinate, the earliest point wins at the start of the set and
/// the latest point opens the interpolation segment elsewhere.
#[derive(Debug, Clone, Default)]
pub struct TimelineMap {
    by_symbolic: Vec<SyncPoint>,
    by_performance: Vec<SyncPoint>,
    policy: ExtrapolationPolicy,
}

impl TimelineMap {
    pub fn new(points: &[SyncPoint], policy: ExtrapolationPolicy) -> Self {
        let mut by_symbolic = points.to_vec();
        by_symbolic.sort_by(|a, b| a.symbolic_time.total_cmp(&b.symbolic_time));

        let mut by_performance = points.to_vec();
        by_performance.sort_by(|a, b| a.performance_time.total_cmp(&b.performance_time));

        Self {
            by_symbolic,
            by_performance,
            policy,
        }
    }

    pub fn identity() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_symbolic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_symbolic.is_empty()
    }

    pub fn policy(&self) -> ExtrapolationPolicy {
        self.policy
    }

    /// Points ordered by symbolic time.
    pub fn points(&self) -> &[SyncPoint] {
        &self.by_symbolic
    }

    pub fn to_performance_time(&self, symbolic_time: f64) -> f64 {
        map_time(
            &self.by_symbolic,
            symbolic_time,
            Direction::ToPerformance,
            self.policy,
        )
    }

    pub fn to_symbolic_time(&self, performance_time: f64) -> f64 {
        map_time(
            &self.by_performance,
            performance_time,
            Direction::ToSymbolic,
            self.policy,
        )
    }
}

/// Stateless form of [`TimelineMap::to_performance_time`] with the default policy.
pub fn to_performance_time(points: &[SyncPoint], symbolic_time: f64) -> f64 {
    TimelineMap::new(points, ExtrapolationPolicy::default()).to_performance_time(symbolic_time)
}

/// Stateless form of [`TimelineMap::to_symbolic_time`] with the default policy.
pub fn to_symbolic_time(points: &[SyncPoint], performance_time: f64) -> f64 {
    TimelineMap::new(points, ExtrapolationPolicy::default()).to_symbolic_time(performance_time)
}

fn map_time(
    sorted: &[SyncPoint],
    query: f64,
    direction: Direction,
    policy: ExtrapolationPolicy,
) -> f64 {
    let (Some(first), Some(last)) = (sorted.first(), sorted.last()) else {
        return query;
    };
    let source = |p: &SyncPoint| direction.source(p);
    let target = |p: &SyncPoint| direction.target(p);

    if query <= source(first) {
        if query == source(first) {
            return target(first);
        }
        return match policy.pre_roll {
            PreRoll::OriginRatio => {
                if source(first) == 0.0 {
                    return target(first);
                }
                let ratio = target(first) / source(first);
                query * if ratio.is_finite() { ratio } else { 1.0 }
            }
            PreRoll::Offset => target(first) + (query - source(first)),
        };
    }

    if query >= source(last) {
        let delta = query - source(last);
        return match policy.post_roll {
            PostRoll::Offset => target(last) + delta,
            PostRoll::LastSegmentRate => target(last) + delta * last_segment_rate(sorted, direction),
        };
    }

    // first.source < query < last.source, so both neighbours exist
    let idx = sorted.partition_point(|p| source(p) <= query);
    if idx == 0 || idx >= sorted.len() {
        return query;
    }
    let before = &sorted[idx - 1];
    let after = &sorted[idx];

    let fraction = (query - source(before)) / (source(after) - source(before));
    let result = target(before) + fraction * (target(after) - target(before));

    let lo = target(before).min(target(after));
    let hi = target(before).max(target(after));
    result.max(lo).min(hi)
}

fn last_segment_rate(sorted: &[SyncPoint], direction: Direction) -> f64 {
    let Some(last) = sorted.last() else {
        return 1.0;
    };
    let last_source = direction.source(last);
    let Some(prev) = sorted
        .iter()
        .rev()
        .find(|p| direction.source(p) < last_source)
    else {
        return 1.0;
    };

    let rate =
        (direction.target(last) - direction.target(prev)) / (last_source - direction.source(prev));
    if rate.is_finite() { rate } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(symbolic_time: f64, performance_time: f64) -> SyncPoint {
        SyncPoint::new(symbolic_time, performance_time, "test")
    }

    fn rubato() -> Vec<SyncPoint> {
        vec![point(10.0, 12.0), point(0.0, 0.0), point(20.0, 19.0)]
    }

    #[test]
    fn test_empty_set_is_identity() {
        let map = TimelineMap::identity();
        for t in [-3.5, 0.0, 1.25, 1e6] {
            assert_eq!(map.to_performance_time(t), t);
            assert_eq!(map.to_symbolic_time(t), t);
        }
        assert_eq!(to_performance_time(&[], 7.0), 7.0);
    }

    #[test]
    fn test_interpolates_between_points() {
        let points = rubato();
        assert_eq!(to_performance_time(&points, 5.0), 6.0);
        assert_eq!(to_performance_time(&points, 15.0), 15.5);
        assert_eq!(to_symbolic_time(&points, 6.0), 5.0);
        assert_eq!(to_symbolic_time(&points, 15.5), 15.0);
    }

    #[test]
    fn test_post_roll_adds_raw_delta() {
        let points = rubato();
        assert_eq!(to_performance_time(&points, 25.0), 24.0);
        assert_eq!(to_symbolic_time(&points, 24.0), 25.0);
    }

    #[test]
    fn test_pre_roll_uses_origin_ratio() {
        let points = vec![point(10.0, 20.0), point(30.0, 40.0)];
        assert_eq!(to_performance_time(&points, 5.0), 10.0);
        assert_eq!(to_symbolic_time(&points, 10.0), 5.0);
    }

    #[test]
    fn test_pre_roll_with_zero_source_returns_target() {
        let points = vec![point(0.0, 3.0)];
        assert_eq!(to_performance_time(&points, -1.0), 3.0);
    }

    #[test]
    fn test_pre_roll_with_infinite_ratio_falls_back_to_identity() {
        let points = vec![point(1e-320, 1e10)];
        assert_eq!(to_performance_time(&points, 1e-321), 1e-321);
    }

    #[test]
    fn test_single_point_maps_exactly() {
        for (s, p) in [(3.0, 7.0), (0.1, 0.7), (12.345, 6.789), (0.0, 4.0)] {
            let points = vec![point(s, p)];
            assert_eq!(to_performance_time(&points, s), p);
            assert_eq!(to_symbolic_time(&points, p), s);
        }
    }

    #[test]
    fn test_interpolation_never_overshoots() {
        let points = vec![
            point(0.0, 0.0),
            point(1.3, 2.9),
            point(2.7, 3.1),
            point(4.1, 3.3),
            point(9.9, 15.7),
        ];
        let map = TimelineMap::new(&points, ExtrapolationPolicy::default());
        let sorted = map.points();

        for pair in sorted.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let lo = a.performance_time.min(b.performance_time);
            let hi = a.performance_time.max(b.performance_time);
            for step in 1..100 {
                let t = a.symbolic_time + (b.symbolic_time - a.symbolic_time) * step as f64 / 100.0;
                let mapped = map.to_performance_time(t);
                assert!(mapped >= lo && mapped <= hi, "{} -> {}", t, mapped);
            }
        }
    }

    #[test]
    fn test_shared_source_coordinate_is_deterministic() {
        let points = vec![point(5.0, 5.0), point(5.0, 9.0), point(10.0, 20.0)];
        // the earliest inserted point answers at the shared coordinate
        assert_eq!(to_performance_time(&points, 5.0), 5.0);
        // the latest one opens the following segment
        assert!((to_performance_time(&points, 7.0) - 13.4).abs() < 1e-9);
    }

    #[test]
    fn test_nan_query_passes_through() {
        assert!(to_performance_time(&rubato(), f64::NAN).is_nan());
    }

    #[test]
    fn test_offset_pre_roll_policy() {
        let policy = ExtrapolationPolicy {
            pre_roll: PreRoll::Offset,
            post_roll: PostRoll::Offset,
        };
        let map = TimelineMap::new(&[point(10.0, 15.0)], policy);
        assert_eq!(map.to_performance_time(4.0), 9.0);
    }

    #[test]
    fn test_last_segment_rate_post_roll_policy() {
        let policy = ExtrapolationPolicy {
            pre_roll: PreRoll::OriginRatio,
            post_roll: PostRoll::LastSegmentRate,
        };
        let map = TimelineMap::new(&[point(0.0, 0.0), point(10.0, 20.0)], policy);
        assert_eq!(map.to_performance_time(12.0), 24.0);
        assert_eq!(map.to_symbolic_time(24.0), 12.0);

        let single = TimelineMap::new(&[point(10.0, 20.0)], policy);
        assert_eq!(single.to_performance_time(12.0), 22.0);
    }
}

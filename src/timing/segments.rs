use super::{SyncPoint, TimelineMap};

const RUBATO_DEVIATION: f64 = 0.05;
const CHECK_DEVIATION: f64 = 0.15;
const RUBATO_PERCENT: f64 = 10.0;
const CHECK_PERCENT: f64 = 20.0;

/// How plausible an interval's tempo ratio looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentHealth {
    Steady,
    /// Noticeably faster or slower than its neighbours or than the score
    Rubato,
    /// Far enough off that a sync point is probably misplaced
    Check,
}

impl SegmentHealth {
    /// Classifies `ratio` against the average ratio of all intervals and
    /// against score tempo (a ratio of 1).
    pub fn classify(ratio: f64, average: f64) -> Self {
        let deviation = (ratio - average).abs();
        let percent = (ratio - 1.0).abs() * 100.0;
        if deviation > CHECK_DEVIATION || percent > CHECK_PERCENT {
            SegmentHealth::Check
        } else if deviation > RUBATO_DEVIATION || percent > RUBATO_PERCENT {
            SegmentHealth::Rubato
        } else {
            SegmentHealth::Steady
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SegmentHealth::Steady => "OK",
            SegmentHealth::Rubato => "Rubato",
            SegmentHealth::Check => "Check",
        }
    }
}

/// The span between two symbolically adjacent sync points.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Symbolic seconds
    pub start: f64,
    pub end: f64,
    /// Performance seconds per symbolic second; 1 for a zero-length span
    pub ratio: f64,
    pub label: String,
    pub health: SegmentHealth,
}

impl TimelineMap {
    /// One segment per pair of adjacent points in symbolic order.
    pub fn segments(&self) -> Vec<Segment> {
        let points = self.points();
        let ratios: Vec<f64> = points.windows(2).map(|w| ratio(&w[0], &w[1])).collect();
        if ratios.is_empty() {
            return Vec::new();
        }
        let average = ratios.iter().sum::<f64>() / ratios.len() as f64;

        points
            .windows(2)
            .zip(ratios)
            .map(|(pair, ratio)| Segment {
                start: pair[0].symbolic_time,
                end: pair[1].symbolic_time,
                ratio,
                label: format!("{} -> {}", pair[0].label, pair[1].label),
                health: SegmentHealth::classify(ratio, average),
            })
            .collect()
    }
}

fn ratio(prev: &SyncPoint, next: &SyncPoint) -> f64 {
    let symbolic = next.symbolic_time - prev.symbolic_time;
    if symbolic > 0.0 {
        (next.performance_time - prev.performance_time) / symbolic
    } else {
        1.0
    }
}

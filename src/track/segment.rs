use serde::Serialize;

use crate::propagation::Sample;

/// Longitude jump between consecutive points that marks an antimeridian crossing.
pub const DISCONTINUITY_DEG: f64 = 180.0;

/// Polyline of (longitude, latitude) points drawable without wrapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TrackSegment(Vec<(f64, f64)>);

#[cfg(test)]
impl TrackSegment {
    pub fn points(&self) -> &[(f64, f64)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub fn segment(samples: &[Sample]) -> Vec<TrackSegment> {
    let points: Vec<(f64, f64)> = samples.iter().map(Sample::map_point).collect();
    segment_points(&points)
}

/// Split a ground track wherever longitude jumps by more than 180°.
///
/// Assumes the sampling step is short enough that real motion between two
/// points never exceeds half the map width. Single-point segments are kept.
pub fn segment_points(points: &[(f64, f64)]) -> Vec<TrackSegment> {
    let mut segments = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();

    for (i, &point) in points.iter().enumerate() {
        if i > 0 && (point.0 - points[i - 1].0).abs() > DISCONTINUITY_DEG {
            segments.push(TrackSegment(std::mem::take(&mut current)));
        }
        current.push(point);
    }

    if !current.is_empty() {
        segments.push(TrackSegment(current));
    }

    segments
}

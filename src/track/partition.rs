use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::propagation::Sample;
use crate::track::segment::{segment, TrackSegment};

/// One labelled pass of a multi-orbit plot.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitSlice<'a> {
    /// 1-based
    pub index: usize,
    pub samples: &'a [Sample],
}

impl OrbitSlice<'_> {
    pub fn segments(&self) -> Vec<TrackSegment> {
        segment(self.samples)
    }

    pub fn to_track(&self) -> OrbitTrack {
        OrbitTrack {
            index: self.index,
            start: self.samples.first().map(|s| s.epoch),
            end: self.samples.last().map(|s| s.epoch),
            segments: self.segments(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrbitTrack {
    pub index: usize,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub segments: Vec<TrackSegment>,
}

/// Samples per orbit for the given period, from the mean sampling step.
pub fn points_per_orbit(samples: &[Sample], period_minutes: f64, orbit_count: usize) -> usize {
    if samples.len() < 2 {
        return samples.len() / orbit_count.max(1);
    }

    let (first, last) = (&samples[0], &samples[samples.len() - 1]);
    let span_minutes = (last.epoch - first.epoch).num_milliseconds() as f64 / 60_000.0;
    let mean_step_minutes = span_minutes / (samples.len() - 1) as f64;

    let points = (period_minutes / mean_step_minutes).floor();
    if points.is_finite() && points >= 1.0 {
        points as usize
    } else {
        0
    }
}

/// Slice `samples` into consecutive passes of one estimated period each.
///
/// Slices are positional: they start at the first sample, not at a physical
/// event such as the ascending node. Only full slices are returned.
pub fn partition(samples: &[Sample], period_minutes: f64, orbit_count: usize) -> Vec<OrbitSlice<'_>> {
    let per_orbit = points_per_orbit(samples, period_minutes, orbit_count);
    if per_orbit == 0 {
        return Vec::new();
    }

    let mut slices = Vec::new();
    for k in 0..orbit_count {
        let start = k * per_orbit;
        let end = start + per_orbit;
        if end > samples.len() {
            break;
        }
        slices.push(OrbitSlice {
            index: k + 1,
            samples: &samples[start..end],
        });
    }

    slices
}

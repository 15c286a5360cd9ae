use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::propagation::{Propagation, SkippedEpoch};
use crate::track::partition::{partition, OrbitTrack};
use crate::track::segment::{segment, TrackSegment};

/// Everything a map renderer needs for the full-track and multi-orbit views.
#[derive(Debug, Clone, Serialize)]
pub struct GroundTrack {
    pub satellite: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub points: usize,
    pub period_minutes: f64,
    pub segments: Vec<TrackSegment>,
    pub orbits: Vec<OrbitTrack>,
    /// Grid epochs with no sample, so gaps in the track can be explained
    pub skipped: Vec<SkippedEpoch>,
}

impl GroundTrack {
    pub fn build(
        satellite: &str,
        propagation: &Propagation,
        period_minutes: f64,
        orbit_count: usize,
    ) -> Self {
        let samples = &propagation.samples;
        let orbits = partition(samples, period_minutes, orbit_count)
            .iter()
            .map(|slice| slice.to_track())
            .collect();

        Self {
            satellite: satellite.to_string(),
            start: samples.first().map(|s| s.epoch),
            end: samples.last().map(|s| s.epoch),
            points: samples.len(),
            period_minutes,
            segments: segment(samples),
            orbits,
            skipped: propagation.skipped.clone(),
        }
    }

    pub fn duration_hours(&self) -> f64 {
        match (self.start, self.end) {
            (Some(start), Some(end)) => (end - start).num_seconds() as f64 / 3600.0,
            _ => 0.0,
        }
    }
}

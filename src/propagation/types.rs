use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Position and velocity in the inertial frame, km and km/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVectors {
    pub position_km: [f64; 3],
    pub velocity_km_s: [f64; 3],
}

/// One point of the propagated track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub epoch: DateTime<Utc>,
    pub position_eci_km: [f64; 3],
    pub velocity_eci_km_s: [f64; 3],
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
    pub speed_km_s: f64,
}

impl Sample {
    /// (longitude, latitude) as drawn on an equirectangular map
    pub fn map_point(&self) -> (f64, f64) {
        (self.longitude_deg, self.latitude_deg)
    }
}

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum SkipReason {
    #[error("propagation failed: {0}")]
    PropagationFailed(String),
    #[error("non-finite geodetic coordinates")]
    NonFiniteGeodetic,
}

/// An epoch of the sampling grid that produced no sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedEpoch {
    pub epoch: DateTime<Utc>,
    pub reason: SkipReason,
}

/// Samples in grid order plus the diagnostics for every epoch left out.
#[derive(Debug, Clone, Default)]
pub struct Propagation {
    pub samples: Vec<Sample>,
    pub skipped: Vec<SkippedEpoch>,
}

impl Propagation {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn average_altitude_km(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let total: f64 = self.samples.iter().map(|s| s.altitude_km).sum();
        Some(total / self.samples.len() as f64)
    }
}

use chrono::{DateTime, Utc};
use sgp4::{Constants, Elements};

use crate::propagation::error::PropagationFailure;
use crate::propagation::tle_loader::Satellite;
use crate::propagation::types::StateVectors;

/// Source of inertial state vectors for arbitrary epochs.
pub trait StatePropagator {
    fn propagate_at(&self, epoch: DateTime<Utc>) -> Result<StateVectors, PropagationFailure>;
}

impl<P: StatePropagator + ?Sized> StatePropagator for &P {
    fn propagate_at(&self, epoch: DateTime<Utc>) -> Result<StateVectors, PropagationFailure> {
        (**self).propagate_at(epoch)
    }
}

/// SGP4/SDP4 propagation of a single element set.
pub struct Sgp4Propagator<'a> {
    elements: &'a Elements,
    constants: &'a Constants,
}

impl<'a> Sgp4Propagator<'a> {
    pub fn new(satellite: &'a Satellite) -> Self {
        Self {
            elements: &satellite.elements,
            constants: &satellite.constants,
        }
    }
}

impl StatePropagator for Sgp4Propagator<'_> {
    fn propagate_at(&self, epoch: DateTime<Utc>) -> Result<StateVectors, PropagationFailure> {
        let minutes = self
            .elements
            .datetime_to_minutes_since_epoch(&epoch.naive_utc())
            .map_err(|e| PropagationFailure(e.to_string()))?;

        let prediction = self.constants.propagate(minutes)?;

        Ok(StateVectors {
            position_km: prediction.position,
            velocity_km_s: prediction.velocity,
        })
    }
}

use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;

use crate::geodetic::{eci_to_geodetic, norm};
use crate::propagation::error::PropagationError;
use crate::propagation::propagator::StatePropagator;
use crate::propagation::types::{Propagation, Sample, SkipReason, SkippedEpoch};

/// Fixed time grid `start + i * step` for `i = 0..=duration / step`.
#[derive(Debug, Clone)]
pub struct SamplingPlan {
    pub start: DateTime<Utc>,
    pub duration: Duration,
    pub step: Duration,
    /// Threads used to call the propagator; 0 and 1 both mean sequential.
    /// Capped at the number of available cores.
    pub workers: usize,
}

impl SamplingPlan {
    pub fn new(start: DateTime<Utc>, duration: Duration, step: Duration) -> Self {
        Self {
            start,
            duration,
            step,
            workers: 1,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Worker threads actually used for `epoch_count` epochs
    pub fn effective_workers(&self, epoch_count: usize) -> usize {
        let limit = rayon::current_num_threads().min(epoch_count).max(1);
        self.workers.clamp(1, limit)
    }

    /// Target epochs in ascending order
    pub fn epochs(&self) -> Result<Vec<DateTime<Utc>>, PropagationError> {
        if self.step <= Duration::zero() {
            return Err(PropagationError::InvalidStep(self.step));
        }
        if self.duration < Duration::zero() {
            return Err(PropagationError::NegativeDuration(self.duration));
        }

        let step_us = self
            .step
            .num_microseconds()
            .ok_or(PropagationError::GridOverflow)?;
        if step_us == 0 {
            // Below the grid's microsecond resolution
            return Err(PropagationError::InvalidStep(self.step));
        }
        let duration_us = self
            .duration
            .num_microseconds()
            .ok_or(PropagationError::GridOverflow)?;

        let count = duration_us / step_us;
        (0..=count)
            .map(|i| {
                step_us
                    .checked_mul(i)
                    .map(Duration::microseconds)
                    .and_then(|offset| self.start.checked_add_signed(offset))
                    .ok_or(PropagationError::GridOverflow)
            })
            .collect()
    }
}

/// Propagate every epoch of `plan`, converting each state to a sample.
///
/// Epochs the propagator fails on, or whose coordinates come out non-finite,
/// are left out and reported in `Propagation::skipped`. Only an invalid plan
/// is an error.
pub fn propagate<P>(propagator: &P, plan: &SamplingPlan) -> Result<Propagation, PropagationError>
where
    P: StatePropagator + Sync + ?Sized,
{
    let epochs = plan.epochs()?;
    let workers = plan.effective_workers(epochs.len());

    if workers == 1 {
        let results = epochs
            .iter()
            .map(|&epoch| (epoch, sample_at(propagator, epoch)));
        return Ok(collect_results(results));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()?;
    let results: Vec<_> = pool.install(|| {
        epochs
            .par_iter()
            .map(|&epoch| (epoch, sample_at(propagator, epoch)))
            .collect()
    });

    Ok(collect_results(results))
}

/// The sample at `now`, or why the propagator could not produce one.
pub fn current_position<P>(propagator: &P, now: DateTime<Utc>) -> Result<Sample, SkipReason>
where
    P: StatePropagator + ?Sized,
{
    sample_at(propagator, now)
}

fn collect_results<I>(results: I) -> Propagation
where
    I: IntoIterator<Item = (DateTime<Utc>, Result<Sample, SkipReason>)>,
{
    let mut propagation = Propagation::default();
    for (epoch, result) in results {
        match result {
            Ok(sample) => propagation.samples.push(sample),
            Err(reason) => propagation.skipped.push(SkippedEpoch { epoch, reason }),
        }
    }
    propagation
}

pub fn sample_at<P>(propagator: &P, epoch: DateTime<Utc>) -> Result<Sample, SkipReason>
where
    P: StatePropagator + ?Sized,
{
    let state = propagator
        .propagate_at(epoch)
        .map_err(|e| SkipReason::PropagationFailed(e.to_string()))?;

    let geo = eci_to_geodetic(state.position_km, epoch);
    let speed_km_s = norm(state.velocity_km_s);
    if !geo.is_finite() || !speed_km_s.is_finite() {
        return Err(SkipReason::NonFiniteGeodetic);
    }

    Ok(Sample {
        epoch,
        position_eci_km: state.position_km,
        velocity_eci_km_s: state.velocity_km_s,
        latitude_deg: geo.latitude_deg,
        longitude_deg: geo.longitude_deg,
        altitude_km: geo.altitude_km,
        speed_km_s,
    })
}

mod error;
mod propagator;
mod sampler;
mod tle_loader;
mod types;

pub use error::{PropagationError, PropagationFailure, TleError};
pub use propagator::{Sgp4Propagator, StatePropagator};
pub use sampler::{current_position, propagate, SamplingPlan};
pub use tle_loader::load_satellite;
pub use types::{Propagation, Sample, SkipReason, SkippedEpoch, StateVectors};

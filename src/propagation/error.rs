use chrono::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PropagationError {
    #[error("step must be positive, got {0}")]
    InvalidStep(Duration),
    #[error("duration must not be negative, got {0}")]
    NegativeDuration(Duration),
    #[error("sampling grid does not fit in the supported time range")]
    GridOverflow,
    #[error("worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// A single epoch the propagator could not produce a state for.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct PropagationFailure(pub String);

impl From<sgp4::Error> for PropagationFailure {
    fn from(err: sgp4::Error) -> Self {
        PropagationFailure(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum TleError {
    #[error("TLE file read error: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Invalid TLE format in {file}: {message}")]
    InvalidFormat { file: String, message: String },
    #[error("invalid tle: {0}")]
    Parse(#[from] sgp4::TleError),
    #[error("elements error: {0}")]
    Elements(#[from] sgp4::ElementsError),
}

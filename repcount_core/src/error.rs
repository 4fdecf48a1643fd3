use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RepError {
    /// A single inference call failed; the loop keeps going.
    #[error("pose source error: {0}")]
    Source(String),
    /// The camera/model could not be brought up.
    #[error("failed to acquire pose source: {0}")]
    Acquire(String),
    #[error("timed out acquiring pose source after {0} ms")]
    AcquireTimeout(u64),
    #[error("configuration error: {0}")]
    Config(String),
    /// The inference thread is gone; no further frames can be produced.
    #[error("pose worker lost: {0}")]
    WorkerLost(String),
    #[error("invalid state: {0}")]
    State(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("pose source not opened")]
    NotOpened,
    #[error("trace frame {frame}: unknown keypoint '{name}'")]
    UnknownKeypoint { frame: u64, name: String },
}

pub type Result<T> = std::result::Result<T, SimError>;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("invalid frequency string {0:?}, expected \"<N><min|h|d>\"")]
    InvalidFrequency(String),

    #[error("frequency {0} is not a positive integer multiple of {1}")]
    NotAMultiple(String, String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("asset {0:?} is already registered with a different profile")]
    ProfileMismatch(String),

    #[error("unknown timezone {0:?}")]
    UnknownTimezone(String),
}

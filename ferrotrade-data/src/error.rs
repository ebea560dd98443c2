use ferrotrade_integration::UpstreamError;
use thiserror::Error;

use crate::bar::BarError;

#[derive(Debug, Error, Clone)]
pub enum DataError {
    #[error(transparent)]
    Bar(#[from] BarError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("requested frequency {requested} is not a multiple of the native frequency {native}")]
    FrequencyMismatch { requested: String, native: String },

    #[error("empty requested range: start {start} is after end {end}")]
    EmptyRange { start: String, end: String },

    #[error("no native bar available yet for [{start}, {end}]")]
    NoBarAvailable { start: String, end: String },
}

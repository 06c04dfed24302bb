use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkeletonError {
    /// The input rings cannot be turned into a wavefront.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// An internal consistency check failed. Valid input should never get here.
    #[error("Topology error: {0}")]
    TopologyError(String),

    #[error("Event loop did not finish after {iterations} levels")]
    IterationLimit { iterations: usize },

    #[error("GeoJSON error: {0}")]
    GeoJson(String),
}

pub type Result<T> = std::result::Result<T, SkeletonError>;

pub(crate) fn topology<T>(msg: impl Into<String>) -> Result<T> {
    Err(SkeletonError::TopologyError(msg.into()))
}

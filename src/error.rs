//! Error types for playback data access.
//!
//! Every variant is recoverable: the presentation layer reports it to the
//! user and the connector stays usable in a degraded or inert state.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    /// The backend could not list plans for a delivery mode.
    #[error("Plan list unavailable: {0}")]
    PlanListUnavailable(String),

    /// The initial dataset for a plan could not be loaded.
    #[error("Dataset load failed: {0}")]
    DatasetLoadFailed(String),

    /// A continuation fetch of a streaming run failed.
    #[error("Streaming fetch failed: {0}")]
    StreamingFetchFailed(String),

    /// Surface geometry was requested before initialization completed.
    #[error("Surface data not ready.")]
    SurfaceDataNotReady,

    /// Navigation or state access before initialization completed.
    #[error("Connector not initialized")]
    ConnectorNotReady,

    #[error("Unknown delivery mode: {0}")]
    UnknownMode(String),
}

pub type PlaybackResult<T> = Result<T, PlaybackError>;

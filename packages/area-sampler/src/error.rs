//! Typed errors for the sampler.
//!
//! Region-level failures (`DataSourceError`) are absorbed by the sampler and
//! only ever show up in logs and the search report. Store write failures are
//! the one thing that ends a run.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while running a search.
#[derive(Debug, Error)]
pub enum SamplerError {
    /// Persistence failed; durability can no longer be guaranteed
    #[error("result store error: {0}")]
    Store(#[from] StoreError),

    /// The root region is not queryable
    #[error("invalid region: {reason}")]
    InvalidRegion { reason: String },

    /// Sampler configuration is out of range
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },
}

impl SamplerError {
    pub(crate) fn invalid_region(reason: impl Into<String>) -> Self {
        Self::InvalidRegion {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by a data source while answering one query.
#[derive(Debug, Error)]
pub enum DataSourceError {
    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The source answered with a non-success status
    #[error("source returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The response could not be decoded into entity records
    #[error("failed to decode entities: {0}")]
    Decode(#[from] serde_json::Error),

    /// The session or page could not be loaded
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// Errors from the result store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Existing store contents could not be parsed
    #[error("result store {} is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    /// An existing store could not be read
    #[error("failed to read result store {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store could not be written back
    #[error("failed to write result store {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Records could not be serialized
    #[error("failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Geometry that has no well-defined answer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// Meridians converge at the poles, so a longitude offset is undefined
    #[error("longitude offset undefined at latitude {latitude}")]
    PoleSingularity { latitude: f64 },
}

/// Result type alias for sampler operations.
pub type Result<T> = std::result::Result<T, SamplerError>;

/// Result type alias for data source operations.
pub type DataSourceResult<T> = std::result::Result<T, DataSourceError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

//! crates/figure8_core/src/error.rs
//!
//! Error types raised by the Map Store and the Identity Gate.

use crate::ports::PortError;

/// Bad input, rejected before anything is written.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Map name must not be empty")]
    EmptyName,
    #[error("A map named '{0}' already exists")]
    DuplicateMapName(String),
    #[error("'{input}' is not a number ({field})")]
    NonNumericCoordinate { field: &'static str, input: String },
    #[error("Latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("Longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("Pin {0} already exists in this map")]
    DuplicatePinId(String),
    #[error("Unknown pin category: {0}")]
    UnknownCategory(String),
    #[error("Unknown value '{value}' for {field}")]
    UnknownOption { field: &'static str, value: String },
}

/// The error type for all Map Store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The operation needs a principal. A sign-in has been requested and the
    /// operation was aborted; nothing is retried automatically.
    #[error("Sign-in required")]
    PermissionDenied,

    #[error("No map is selected")]
    NoSelection,

    /// The principal's maps are still loading. Nothing was written.
    #[error("Maps are still loading")]
    NotLoaded,

    /// A remote write failed after any local change had been applied.
    #[error("Remote write to {collection}/{id} failed: {source}")]
    RemoteWrite {
        collection: &'static str,
        id: String,
        #[source]
        source: PortError,
    },

    #[error("Sign-out failed: {0}")]
    SignOut(#[source] PortError),

    /// A remote read failed; local state was left as it was.
    #[error("Remote read failed: {0}")]
    Remote(#[from] PortError),
}

/// A convenience type alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

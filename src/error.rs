//! Error taxonomy for the route-progression crate.
//!
//! Failures at segment granularity are swallowed and logged by the engine;
//! nothing in this crate is expected to take the host down. These types cover
//! the boundaries where an error is worth propagating: the drawing surface,
//! trip-document loading, and dataset preparation for integration tests.

use thiserror::Error;

/// Errors reported by a [`crate::traits::RouteSurface`] implementation.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("routing request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The routing provider answered but produced no usable route.
    #[error("no route available: {0}")]
    NoRoute(String),

    /// Catch-all for surface-specific drawing failures.
    #[error("drawing failed: {0}")]
    Draw(String),
}

/// Errors loading or validating a trip document.
#[derive(Debug, Error)]
pub enum TripError {
    #[error("invalid coordinate: lat {lat}, lng {lng}")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error("trip days must be contiguous from 1: expected day {expected}, found {found}")]
    NonContiguousDays { expected: u32, found: u32 },

    #[error("segment day {day} outside itinerary of {total_days} days")]
    SegmentDayOutOfRange { day: u32, total_days: u32 },

    #[error("trip document parse failed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("trip source unavailable: {0}")]
    Unavailable(String),
}

/// Errors preparing an OSRM dataset (download + docker preprocess).
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("extract download failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("preprocess step failed: {0}")]
    Process(String),
}

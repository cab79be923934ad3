//! Route segment model: coordinates, segment definitions, and derived
//! identity.
//!
//! A segment is one directed leg of the itinerary, tied to a specific day.
//! Segment definitions are loaded once per trip and are immutable as far as
//! the engine is concerned; everything the engine tracks about them lives in
//! its rendered-set keyed by [`RouteSegment::route_id`].

use serde::{Deserialize, Serialize};

use crate::error::TripError;

/// Identity of the distinguished loop-closing segment.
pub const RETURN_ROUTE_ID: &str = "return-route";

/// A geographic point. Latitude in [-90, 90], longitude in [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Result<Self, TripError> {
        let coord = Self { lat, lng };
        if coord.is_valid() {
            Ok(coord)
        } else {
            Err(TripError::InvalidCoordinate { lat, lng })
        }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// One directed leg of the itinerary route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    /// 1-based itinerary day this leg belongs to.
    pub day: u32,
    pub start: Coordinate,
    pub end: Coordinate,
    /// Display color token, opaque to the engine.
    pub color: String,
    /// Human-readable description, used for identity of logs only.
    pub label: String,
}

impl RouteSegment {
    /// Deterministic identity used by the rendered-set.
    ///
    /// Matches the observed source format `{day}-{start.lat}-{end.lat}`:
    /// longitude is deliberately not part of the key, so two same-day
    /// segments whose endpoints share latitudes collide. Flagged as a
    /// probable source bug, kept pending product-owner confirmation.
    pub fn route_id(&self) -> String {
        format!("{}-{}-{}", self.day, self.start.lat, self.end.lat)
    }

    pub fn draw_options(&self) -> DrawOptions {
        DrawOptions {
            color: self.color.clone(),
            label: self.label.clone(),
            day: self.day,
            route_id: self.route_id(),
        }
    }
}

/// Typed drawing options handed to the surface, replacing the source's
/// duck-typed options record.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawOptions {
    pub color: String,
    pub label: String,
    pub day: u32,
    pub route_id: String,
}

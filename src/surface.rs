//! OSRM-backed route surface.
//!
//! Implements [`RouteSurface`] against an OSRM HTTP instance with the same
//! degradation ladder the source map layer used: arterial-first routing
//! (motorways excluded), then plain routing, then a straight line between
//! the endpoints. Something is always rendered; total failure is reserved
//! for the straight-line path being unrepresentable, which cannot happen
//! with validated coordinates.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use serde::Deserialize;
use tracing::warn;

use crate::error::SurfaceError;
use crate::segment::{Coordinate, DrawOptions};
use crate::traits::RouteSurface;

#[derive(Debug, Clone)]
pub struct OsrmSurfaceConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmSurfaceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 20,
        }
    }
}

/// How a drawn route was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawnKind {
    /// Routed with motorways excluded.
    Arterial,
    /// Routed without restrictions.
    Plain,
    /// Straight line between the endpoints; routing was unavailable.
    StraightLine,
}

/// Bookkeeping record for one rendered route.
#[derive(Debug, Clone)]
pub struct DrawnRoute {
    pub route_id: String,
    pub day: u32,
    pub label: String,
    pub color: String,
    pub path: Vec<Coordinate>,
    pub kind: DrawnKind,
}

/// OSRM-backed [`RouteSurface`] implementation.
pub struct OsrmSurface {
    config: OsrmSurfaceConfig,
    client: reqwest::Client,
    drawn: Mutex<Vec<DrawnRoute>>,
    visible: AtomicBool,
    focused_day: AtomicU32,
}

impl OsrmSurface {
    pub fn new(config: OsrmSurfaceConfig) -> Result<Self, SurfaceError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            config,
            client,
            drawn: Mutex::new(Vec::new()),
            visible: AtomicBool::new(true),
            focused_day: AtomicU32::new(0),
        })
    }

    /// Snapshot of everything currently drawn.
    pub fn drawn(&self) -> Vec<DrawnRoute> {
        self.lock_drawn().clone()
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    pub fn focused_day(&self) -> u32 {
        self.focused_day.load(Ordering::SeqCst)
    }

    async fn fetch_route(
        &self,
        start: Coordinate,
        end: Coordinate,
        avoid_motorways: bool,
    ) -> Result<Vec<Coordinate>, SurfaceError> {
        let url = route_url(&self.config, start, end, avoid_motorways);
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<OsrmRouteResponse>()
            .await?;

        if body.code != "Ok" {
            return Err(SurfaceError::NoRoute(body.code));
        }
        let route = body
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| SurfaceError::NoRoute("empty response".to_string()))?;

        Ok(route
            .geometry
            .coordinates
            .into_iter()
            .map(|[lng, lat]| Coordinate { lat, lng })
            .collect())
    }

    fn record(&self, options: &DrawOptions, path: Vec<Coordinate>, kind: DrawnKind) {
        self.lock_drawn().push(DrawnRoute {
            route_id: options.route_id.clone(),
            day: options.day,
            label: options.label.clone(),
            color: options.color.clone(),
            path,
            kind,
        });
    }

    fn lock_drawn(&self) -> std::sync::MutexGuard<'_, Vec<DrawnRoute>> {
        self.drawn.lock().expect("drawn-routes lock poisoned")
    }
}

impl RouteSurface for OsrmSurface {
    async fn draw_segment(
        &self,
        start: Coordinate,
        end: Coordinate,
        options: &DrawOptions,
    ) -> Result<bool, SurfaceError> {
        match self.fetch_route(start, end, true).await {
            Ok(path) => {
                self.record(options, path, DrawnKind::Arterial);
                return Ok(true);
            }
            Err(err) => {
                warn!(label = %options.label, error = %err, "arterial routing unavailable, trying plain routing");
            }
        }

        match self.fetch_route(start, end, false).await {
            Ok(path) => {
                self.record(options, path, DrawnKind::Plain);
                return Ok(true);
            }
            Err(err) => {
                warn!(label = %options.label, error = %err, "routing failed, drawing straight line");
            }
        }

        self.record(options, vec![start, end], DrawnKind::StraightLine);
        Ok(true)
    }

    fn clear_all(&self) {
        self.lock_drawn().clear();
        self.visible.store(true, Ordering::SeqCst);
    }

    fn toggle_visibility(&self) {
        self.visible.fetch_xor(true, Ordering::SeqCst);
    }

    fn center_on_day(&self, day: u32) {
        self.focused_day.store(day, Ordering::SeqCst);
    }
}

fn route_url(
    config: &OsrmSurfaceConfig,
    start: Coordinate,
    end: Coordinate,
    avoid_motorways: bool,
) -> String {
    let mut url = format!(
        "{}/route/v1/{}/{:.6},{:.6};{:.6},{:.6}?overview=full&geometries=geojson",
        config.base_url, config.profile, start.lng, start.lat, end.lng, end.lat
    );
    if avoid_motorways {
        url.push_str("&exclude=motorway");
    }
    url
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = OsrmSurfaceConfig::default();
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.profile, "car");
        assert_eq!(config.timeout_secs, 20);
    }

    #[test]
    fn route_url_is_lng_lat_ordered() {
        let config = OsrmSurfaceConfig::default();
        let start = Coordinate { lat: 34.4347, lng: 135.2441 };
        let end = Coordinate { lat: 34.2307, lng: 135.1733 };
        let url = route_url(&config, start, end, false);
        assert!(url.starts_with(
            "http://localhost:5000/route/v1/car/135.244100,34.434700;135.173300,34.230700?"
        ));
        assert!(!url.contains("exclude"));
    }

    #[test]
    fn route_url_excludes_motorways_for_primary() {
        let config = OsrmSurfaceConfig::default();
        let start = Coordinate { lat: 33.0, lng: 135.0 };
        let end = Coordinate { lat: 34.0, lng: 136.0 };
        let url = route_url(&config, start, end, true);
        assert!(url.ends_with("&exclude=motorway"));
    }

    #[test]
    fn response_parses_geojson_geometry() {
        let json = r#"{
            "code": "Ok",
            "routes": [{"geometry": {"coordinates": [[135.24, 34.43], [135.17, 34.23]]}}]
        }"#;
        let body: OsrmRouteResponse = serde_json::from_str(json).expect("parse");
        assert_eq!(body.code, "Ok");
        assert_eq!(body.routes[0].geometry.coordinates.len(), 2);
    }
}

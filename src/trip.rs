//! Trip/day aggregate: the read-only data the engine renders from.
//!
//! A [`TripDocument`] carries the ordered days, the segment definitions, and
//! an optional distinguished return route. Documents normally come from the
//! backend as JSON; when loading fails the hardcoded Kansai itinerary is
//! used so the map is never empty.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::TripError;
use crate::segment::{Coordinate, DrawOptions, RouteSegment, RETURN_ROUTE_ID};
use crate::traits::TripSource;

/// A single activity within a day. Opaque to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    #[serde(default)]
    pub location: Option<Coordinate>,
}

/// One itinerary day. Days are 1-based and contiguous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: u32,
    pub title: String,
    #[serde(default)]
    pub activities: Vec<Activity>,
}

/// The synthetic final segment connecting the last stop back to the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnRoute {
    pub start: Coordinate,
    pub end: Coordinate,
    pub color: String,
    pub label: String,
}

impl ReturnRoute {
    /// Default return leg used when the trip document carries none:
    /// Kuromon Market back to Kansai Airport.
    pub fn fallback() -> Self {
        Self {
            start: Coordinate { lat: 34.6638, lng: 135.5048 },
            end: Coordinate { lat: 34.4347, lng: 135.2441 },
            color: "#95a5a6".to_string(),
            label: "D10: Kuromon Market → Kansai Airport (return)".to_string(),
        }
    }

    pub fn draw_options(&self, day: u32) -> DrawOptions {
        DrawOptions {
            color: self.color.clone(),
            label: self.label.clone(),
            day,
            route_id: RETURN_ROUTE_ID.to_string(),
        }
    }
}

/// The full trip document consumed by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripDocument {
    pub days: Vec<DayPlan>,
    pub routes: Vec<RouteSegment>,
    #[serde(default)]
    pub return_route: Option<ReturnRoute>,
}

impl TripDocument {
    pub fn total_days(&self) -> u32 {
        self.days.len() as u32
    }

    /// Parse and validate a JSON trip document.
    pub fn from_json(json: &str) -> Result<Self, TripError> {
        let doc: Self = serde_json::from_str(json)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Check day contiguity, segment day ranges, and coordinate bounds.
    pub fn validate(&self) -> Result<(), TripError> {
        for (index, plan) in self.days.iter().enumerate() {
            let expected = index as u32 + 1;
            if plan.day != expected {
                return Err(TripError::NonContiguousDays {
                    expected,
                    found: plan.day,
                });
            }
        }

        let total_days = self.total_days();
        for segment in &self.routes {
            if segment.day < 1 || segment.day > total_days {
                return Err(TripError::SegmentDayOutOfRange {
                    day: segment.day,
                    total_days,
                });
            }
            for coord in [segment.start, segment.end] {
                if !coord.is_valid() {
                    return Err(TripError::InvalidCoordinate {
                        lat: coord.lat,
                        lng: coord.lng,
                    });
                }
            }
        }

        if let Some(ret) = &self.return_route {
            for coord in [ret.start, ret.end] {
                if !coord.is_valid() {
                    return Err(TripError::InvalidCoordinate {
                        lat: coord.lat,
                        lng: coord.lng,
                    });
                }
            }
        }

        Ok(())
    }

    /// Load from a [`TripSource`], falling back to the hardcoded itinerary
    /// when the source is unavailable or the document is invalid.
    pub async fn load_or_fallback<T: TripSource>(source: &T) -> Self {
        match source.load_trip().await {
            Ok(doc) => match doc.validate() {
                Ok(()) => doc,
                Err(err) => {
                    warn!(error = %err, "trip document invalid, using fallback itinerary");
                    Self::fallback()
                }
            },
            Err(err) => {
                warn!(error = %err, "trip source unavailable, using fallback itinerary");
                Self::fallback()
            }
        }
    }

    /// Hardcoded 10-day Kansai itinerary (25 segments plus a return route).
    pub fn fallback() -> Self {
        fn seg(day: u32, start: (f64, f64), end: (f64, f64), color: &str, label: &str) -> RouteSegment {
            RouteSegment {
                day,
                start: Coordinate { lat: start.0, lng: start.1 },
                end: Coordinate { lat: end.0, lng: end.1 },
                color: color.to_string(),
                label: label.to_string(),
            }
        }

        fn day(day: u32, title: &str) -> DayPlan {
            DayPlan {
                day,
                title: title.to_string(),
                activities: Vec::new(),
            }
        }

        let days = vec![
            day(1, "Kansai Airport → Wakayama"),
            day(2, "Wakayama → Kishi → Shirahama"),
            day(3, "Kushimoto & Kumano Kodo"),
            day(4, "Kii-Katsuura → Kyoto"),
            day(5, "Ohara & Kibune"),
            day(6, "Arashiyama"),
            day(7, "Kyoto temples → Osaka"),
            day(8, "Universal Studios"),
            day(9, "Expo 2025"),
            day(10, "Osaka Castle & Kuromon"),
        ];

        let routes = vec![
            seg(1, (34.4347, 135.2441), (34.2307, 135.1733), "#e74c3c", "D1: Kansai Airport → Wakayama hotel"),
            seg(2, (34.2307, 135.1733), (34.2133, 135.3167), "#3498db", "D2: Wakayama → Kishi Station (Tama train)"),
            seg(2, (34.2307, 135.1733), (33.6917, 135.3361), "#3498db", "D2: Kishi Station → pick up car → Shirahama onsen"),
            seg(2, (33.6917, 135.3361), (33.4559, 135.7757), "#3498db", "D2: Shirahama → Fukuro lodging"),
            seg(3, (33.4559, 135.7757), (33.4708, 135.7881), "#f39c12", "D3: Fukuro → Kushimoto (southernmost Honshu)"),
            seg(3, (33.4708, 135.7881), (33.6685, 135.9034), "#f39c12", "D3: Kushimoto → Kumano Kodo (Daimonzaka)"),
            seg(3, (33.6685, 135.9034), (33.6276, 135.9524), "#f39c12", "D3: Kumano Kodo (Nachi Taisha + falls) → Urashima onsen (Kii-Katsuura)"),
            seg(4, (33.6276, 135.9524), (33.6352, 135.9503), "#9b59b6", "D4: Kii-Katsuura → lone torii + tuna market"),
            seg(4, (33.6352, 135.9503), (35.0124, 135.7493), "#9b59b6", "D4: Lone torii → Kyoto (long haul)"),
            seg(5, (35.0115, 135.7478), (35.12, 135.7667), "#27ae60", "D5: Kyoto → Ohara Sanzen-in"),
            seg(5, (35.12, 135.7667), (35.1331, 135.7644), "#27ae60", "D5: Sanzen-in → Kifune Shrine"),
            seg(5, (35.1331, 135.7644), (35.0115, 135.7478), "#27ae60", "D5: Kifune → back to Kyoto"),
            seg(6, (35.0115, 135.7478), (35.0169, 135.6762), "#16a085", "D6: Kyoto → Arashiyama"),
            seg(6, (35.0169, 135.6762), (35.0115, 135.7478), "#16a085", "D6: Arashiyama → back to Kyoto"),
            seg(7, (35.0115, 135.7478), (34.9949, 135.785), "#c0392b", "D7: Kyoto → Kiyomizu-dera"),
            seg(7, (34.9949, 135.785), (34.9671, 135.7727), "#c0392b", "D7: Kiyomizu-dera → Fushimi Inari"),
            seg(7, (34.9671, 135.7727), (34.6560, 135.5060), "#c0392b", "D7: Fushimi Inari → Osaka hotel check-in"),
            seg(7, (34.6560, 135.5060), (34.4347, 135.2441), "#c0392b", "D7: Osaka hotel → Kansai Airport (car return)"),
            seg(7, (34.4347, 135.2441), (34.6560, 135.5060), "#c0392b", "D7: Kansai Airport → Osaka Namba"),
            seg(8, (34.6560, 135.5060), (34.6653, 135.4322), "#8e44ad", "D8: Namba → Universal Studios"),
            seg(8, (34.6653, 135.4322), (34.6560, 135.5060), "#8e44ad", "D8: Universal Studios → back to Namba"),
            seg(9, (34.6560, 135.5060), (34.65, 135.4167), "#2980b9", "D9: Namba → Expo 2025"),
            seg(9, (34.65, 135.4167), (34.6560, 135.5060), "#2980b9", "D9: Expo → back to Namba"),
            seg(10, (34.6560, 135.5060), (34.6873, 135.5262), "#d35400", "D10: Namba → Osaka Castle"),
            seg(10, (34.6873, 135.5262), (34.6638, 135.5048), "#d35400", "D10: Osaka Castle → Kuromon Market"),
        ];

        Self {
            days,
            routes,
            return_route: Some(ReturnRoute::fallback()),
        }
    }
}

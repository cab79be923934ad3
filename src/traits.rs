//! Collaborator seams for the progression engine.
//!
//! These are intentionally minimal and provider-agnostic. The engine is
//! generic over them; concrete apps plug in their own map surface, trip
//! backend, and progress UI.

use crate::error::{SurfaceError, TripError};
use crate::progress::ProgressNotice;
use crate::segment::{Coordinate, DrawOptions};
use crate::trip::TripDocument;

/// The external map surface that actually renders route segments.
///
/// `draw_segment` is expected to degrade gracefully: attempt primary
/// routing, fall back to a secondary routing mode, fall back to a straight
/// line, and return `Ok(true)` only if *something* was rendered. The engine
/// treats `Ok(false)` and `Err` identically (the segment stays unrendered
/// and is retried on the next covering advance).
pub trait RouteSurface {
    async fn draw_segment(
        &self,
        start: Coordinate,
        end: Coordinate,
        options: &DrawOptions,
    ) -> Result<bool, SurfaceError>;

    /// Remove every previously drawn route and reset internal bookkeeping.
    fn clear_all(&self);

    /// Presentation-only; no effect on engine state.
    fn toggle_visibility(&self);

    /// Presentation-only; no effect on engine state.
    fn center_on_day(&self, day: u32);
}

/// Supplies the per-trip data: ordered days, segment definitions, and an
/// optional distinguished return route.
pub trait TripSource {
    async fn load_trip(&self) -> Result<TripDocument, TripError>;
}

/// Receives user-feedback events from the engine. Purely informational;
/// nothing here carries control-flow significance.
pub trait ProgressSink {
    /// A phase notice at the start of an advance (building / incremental /
    /// backward / complete).
    fn on_phase(&self, _notice: &ProgressNotice) {}

    /// Live percentage update after each rendered batch.
    fn on_batch(&self, _percent: u8, _rendered: usize, _total: usize) {}

    /// The return route was drawn and the itinerary is a closed loop.
    fn on_loop_closed(&self) {}
}

//! Route progression engine.
//!
//! Owns the rendered-set and the last-rendered-day cursor, and turns a
//! target day into the minimal ordered set of draw/clear instructions for
//! the map surface. Forward navigation adds only missing segments; backward
//! navigation clears everything and rebuilds from day one; the final day
//! closes the itinerary into a loop.
//!
//! Invariants:
//! - a route id enters the rendered-set only after the surface reports a
//!   successful draw; failures stay absent and are retried on the next
//!   covering advance (the pending scan always restarts at day 1);
//! - the cursor is written only by the advance holding the latest
//!   generation token, so overlapping calls cannot leapfrog each other;
//! - the rendered-set describes the surface as it stands now: draws that
//!   complete after a `clear_all` are discarded, not merged.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::progress::{ProgressNotice, ProgressPhase};
use crate::segment::{RouteSegment, RETURN_ROUTE_ID};
use crate::traits::{ProgressSink, RouteSurface};
use crate::trip::{ReturnRoute, TripDocument};

/// Segments drawn concurrently per batch.
pub const BATCH_SIZE: usize = 5;

/// Cooperative pause between batches so the surface UI can settle.
pub const INTER_BATCH_PAUSE: Duration = Duration::from_millis(50);

/// Result of an [`ProgressionEngine::advance_to_day`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Target day outside `1..=total_days`; nothing happened.
    OutOfRange,
    /// Every covered segment was already rendered; cursor moved, no draws.
    AlreadyRendered,
    /// A newer advance took over; successes merged before any intervening
    /// clear are kept, but this call wrote no cursor and closed no loop.
    Superseded { rendered: usize },
    /// The advance ran to completion.
    Advanced { rendered: usize, attempted: usize },
}

struct EngineState {
    rendered: HashSet<String>,
    last_rendered_day: u32,
}

/// The progression engine, generic over its drawing surface and progress
/// sink.
pub struct ProgressionEngine<S, P> {
    surface: S,
    sink: P,
    segments: Vec<RouteSegment>,
    return_route: ReturnRoute,
    total_days: u32,
    state: Mutex<EngineState>,
    generation: AtomicU64,
    clear_epoch: AtomicU64,
}

impl<S: RouteSurface, P: ProgressSink> ProgressionEngine<S, P> {
    pub fn new(surface: S, sink: P, trip: &TripDocument) -> Self {
        Self {
            surface,
            sink,
            segments: trip.routes.clone(),
            return_route: trip.return_route.clone().unwrap_or_else(ReturnRoute::fallback),
            total_days: trip.total_days(),
            state: Mutex::new(EngineState {
                rendered: HashSet::new(),
                last_rendered_day: 0,
            }),
            generation: AtomicU64::new(0),
            clear_epoch: AtomicU64::new(0),
        }
    }

    /// Bring the surface up to date with `target_day`.
    ///
    /// Draws every not-yet-rendered segment for days `1..=target_day` in
    /// batches of [`BATCH_SIZE`], clearing and rebuilding first when the
    /// target lies behind the cursor. A call arriving while another is in
    /// flight supersedes it: the stale call finishes its current batch (the
    /// successes merge into the rendered-set) but writes no cursor. If the
    /// surface was cleared in the meantime the batch results are discarded
    /// instead, since those draws no longer exist on screen.
    pub async fn advance_to_day(&self, target_day: u32) -> AdvanceOutcome {
        if target_day < 1 || target_day > self.total_days {
            warn!(target_day, total_days = self.total_days, "day out of range, ignoring");
            return AdvanceOutcome::OutOfRange;
        }

        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let last = self.state().last_rendered_day;
        let phase = ProgressPhase::for_state(target_day, last, self.total_days);
        self.sink.on_phase(&ProgressNotice::for_phase(phase, self.total_days));

        if target_day < last {
            debug!(from = last, to = target_day, "backward jump, rebuilding from day 1");
            self.clear_epoch.fetch_add(1, Ordering::SeqCst);
            self.surface.clear_all();
            let mut state = self.state();
            state.rendered.clear();
            state.last_rendered_day = 0;
        }

        // Draws that land after a clear describe a surface that no longer
        // exists; the epoch taken here tells the merge step to drop them.
        let epoch = self.clear_epoch.load(Ordering::SeqCst);

        // Always re-scan from day 1 so segments skipped by an earlier
        // partial failure get retried.
        let mut pending: Vec<RouteSegment> = {
            let state = self.state();
            self.segments
                .iter()
                .filter(|seg| seg.day <= target_day && !state.rendered.contains(&seg.route_id()))
                .cloned()
                .collect()
        };
        pending.sort_by_key(|seg| seg.day);

        let attempted = pending.len();
        if attempted == 0 {
            debug!(target_day, "all covered routes already rendered");
            if self.generation.load(Ordering::SeqCst) == token {
                self.state().last_rendered_day = target_day;
                self.maybe_close_loop(target_day).await;
            }
            return AdvanceOutcome::AlreadyRendered;
        }

        let batch_count = attempted.div_ceil(BATCH_SIZE);
        debug!(target_day, attempted, batch_count, "rendering pending routes");

        let mut rendered = 0usize;
        for (index, batch) in pending.chunks(BATCH_SIZE).enumerate() {
            let results = join_all(batch.iter().map(|seg| self.draw_one(seg))).await;

            if self.clear_epoch.load(Ordering::SeqCst) == epoch {
                let mut state = self.state();
                for (segment, ok) in batch.iter().zip(&results) {
                    if *ok {
                        state.rendered.insert(segment.route_id());
                        rendered += 1;
                    }
                }
            } else {
                debug!(target_day, "surface cleared mid-batch, discarding batch results");
            }

            let percent = ((rendered as f64 / attempted as f64) * 100.0).round() as u8;
            self.sink.on_batch(percent, rendered, attempted);

            if self.generation.load(Ordering::SeqCst) != token {
                debug!(target_day, rendered, "advance superseded by a newer request");
                return AdvanceOutcome::Superseded { rendered };
            }

            if index + 1 < batch_count {
                tokio::time::sleep(INTER_BATCH_PAUSE).await;
            }
        }

        self.state().last_rendered_day = target_day;
        info!(target_day, rendered, attempted, "advance complete");

        self.maybe_close_loop(target_day).await;
        AdvanceOutcome::Advanced { rendered, attempted }
    }

    /// Draw the distinguished return segment, closing the itinerary loop.
    ///
    /// Idempotent: a no-op when the return route is already rendered, and a
    /// failed draw leaves it unrendered for a later retry.
    pub async fn close_loop(&self) -> bool {
        if self.state().rendered.contains(RETURN_ROUTE_ID) {
            return true;
        }

        let epoch = self.clear_epoch.load(Ordering::SeqCst);
        let options = self.return_route.draw_options(self.total_days);
        let drawn = self
            .surface
            .draw_segment(self.return_route.start, self.return_route.end, &options)
            .await;

        match drawn {
            Ok(true) => {
                if self.clear_epoch.load(Ordering::SeqCst) != epoch {
                    debug!("surface cleared during return route draw, not recording it");
                    return false;
                }
                self.state().rendered.insert(RETURN_ROUTE_ID.to_string());
                info!(label = %self.return_route.label, "return route drawn, loop closed");
                self.sink.on_loop_closed();
                true
            }
            Ok(false) => {
                warn!(label = %self.return_route.label, "return route draw reported failure");
                false
            }
            Err(err) => {
                warn!(label = %self.return_route.label, error = %err, "return route draw failed");
                false
            }
        }
    }

    /// Clear the surface and forget all progress. Also invalidates any
    /// in-flight advance.
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.clear_epoch.fetch_add(1, Ordering::SeqCst);
        self.surface.clear_all();
        let mut state = self.state();
        state.rendered.clear();
        state.last_rendered_day = 0;
        debug!("engine reset, all routes cleared");
    }

    pub fn center_on_day(&self, day: u32) {
        self.surface.center_on_day(day);
    }

    pub fn toggle_visibility(&self) {
        self.surface.toggle_visibility();
    }

    pub fn last_rendered_day(&self) -> u32 {
        self.state().last_rendered_day
    }

    pub fn rendered_count(&self) -> usize {
        self.state().rendered.len()
    }

    pub fn is_rendered(&self, route_id: &str) -> bool {
        self.state().rendered.contains(route_id)
    }

    /// Sorted snapshot of the rendered route ids.
    pub fn rendered_routes(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.state().rendered.iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn total_days(&self) -> u32 {
        self.total_days
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    async fn draw_one(&self, segment: &RouteSegment) -> bool {
        let options = segment.draw_options();
        match self
            .surface
            .draw_segment(segment.start, segment.end, &options)
            .await
        {
            Ok(true) => true,
            Ok(false) => {
                warn!(label = %segment.label, "segment draw reported failure, will retry later");
                false
            }
            Err(err) => {
                warn!(label = %segment.label, error = %err, "segment draw failed, will retry later");
                false
            }
        }
    }

    /// Close the loop when the final day is reached, every ordinary segment
    /// is rendered, and the return route is not.
    async fn maybe_close_loop(&self, target_day: u32) {
        if target_day != self.total_days {
            return;
        }
        let ready = {
            let state = self.state();
            !state.rendered.contains(RETURN_ROUTE_ID)
                && self
                    .segments
                    .iter()
                    .all(|seg| state.rendered.contains(&seg.route_id()))
        };
        if ready {
            self.close_loop().await;
        }
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        // Never held across an await point.
        self.state.lock().expect("engine state lock poisoned")
    }
}

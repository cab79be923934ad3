//! Shared test fixtures: a recording mock surface, a recording progress
//! sink, and synthetic trip builders.

#![allow(dead_code)]

pub mod mock_surface;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use route_progression::progress::ProgressNotice;
use route_progression::segment::{Coordinate, RouteSegment};
use route_progression::traits::ProgressSink;
use route_progression::trip::{DayPlan, TripDocument};

pub use mock_surface::{DrawCall, MockSurface};

/// Build a synthetic segment for `day`. The `leg` index is folded into the
/// start latitude so every segment gets a distinct route id.
pub fn segment(day: u32, leg: u32) -> RouteSegment {
    let base = 30.0 + day as f64;
    RouteSegment {
        day,
        start: Coordinate { lat: base + leg as f64 * 0.01, lng: 135.0 },
        end: Coordinate { lat: base + 0.5 + leg as f64 * 0.01, lng: 135.5 },
        color: "#3498db".to_string(),
        label: format!("D{day}: leg {leg}"),
    }
}

/// A trip of `total_days` contiguous days with `legs_per_day` segments each
/// and no explicit return route.
pub fn trip(total_days: u32, legs_per_day: u32) -> TripDocument {
    let days = (1..=total_days)
        .map(|day| DayPlan {
            day,
            title: format!("Day {day}"),
            activities: Vec::new(),
        })
        .collect();

    let routes = (1..=total_days)
        .flat_map(|day| (0..legs_per_day).map(move |leg| segment(day, leg)))
        .collect();

    TripDocument {
        days,
        routes,
        return_route: None,
    }
}

/// Route ids of every segment in `trip` with `day <= up_to`, sorted.
pub fn route_ids_up_to(trip: &TripDocument, up_to: u32) -> Vec<String> {
    let mut ids: Vec<String> = trip
        .routes
        .iter()
        .filter(|seg| seg.day <= up_to)
        .map(RouteSegment::route_id)
        .collect();
    ids.sort();
    ids
}

/// Progress sink that records everything it is told.
#[derive(Default)]
pub struct RecordingSink {
    phases: Mutex<Vec<ProgressNotice>>,
    batches: Mutex<Vec<(u8, usize, usize)>>,
    loops_closed: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phases(&self) -> Vec<ProgressNotice> {
        self.phases.lock().expect("sink lock poisoned").clone()
    }

    pub fn batches(&self) -> Vec<(u8, usize, usize)> {
        self.batches.lock().expect("sink lock poisoned").clone()
    }

    pub fn loops_closed(&self) -> usize {
        self.loops_closed.load(Ordering::SeqCst)
    }
}

impl ProgressSink for &RecordingSink {
    fn on_phase(&self, notice: &ProgressNotice) {
        self.phases
            .lock()
            .expect("sink lock poisoned")
            .push(notice.clone());
    }

    fn on_batch(&self, percent: u8, rendered: usize, total: usize) {
        self.batches
            .lock()
            .expect("sink lock poisoned")
            .push((percent, rendered, total));
    }

    fn on_loop_closed(&self) {
        self.loops_closed.fetch_add(1, Ordering::SeqCst);
    }
}

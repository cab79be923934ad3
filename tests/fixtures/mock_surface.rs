//! Recording mock surface with failure injection and concurrency
//! observation.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use route_progression::error::SurfaceError;
use route_progression::segment::{Coordinate, DrawOptions};
use route_progression::traits::RouteSurface;

/// One recorded draw call, in start order.
#[derive(Debug, Clone)]
pub struct DrawCall {
    pub route_id: String,
    pub day: u32,
    pub label: String,
    /// How many draws had fully completed when this one started. Within a
    /// batch this stays constant; it only advances at batch boundaries.
    pub completed_before_start: usize,
}

#[derive(Default)]
pub struct MockSurface {
    calls: Mutex<Vec<DrawCall>>,
    completed: AtomicUsize,
    clear_count: AtomicUsize,
    centered: Mutex<Vec<u32>>,
    visible: AtomicBool,
    /// Route ids whose draw reports `Ok(false)`.
    failing: Mutex<HashSet<String>>,
    /// Route ids whose draw returns `Err`.
    erroring: Mutex<HashSet<String>>,
    delay: Option<Duration>,
}

impl MockSurface {
    pub fn new() -> Self {
        Self {
            visible: AtomicBool::new(true),
            ..Self::default()
        }
    }

    /// A surface whose draws take `delay` to complete, for observing batch
    /// boundaries under tokio's paused clock.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    pub fn fail_route(&self, route_id: &str) {
        self.lock(&self.failing).insert(route_id.to_string());
    }

    pub fn error_route(&self, route_id: &str) {
        self.lock(&self.erroring).insert(route_id.to_string());
    }

    pub fn heal_route(&self, route_id: &str) {
        self.lock(&self.failing).remove(route_id);
        self.lock(&self.erroring).remove(route_id);
    }

    pub fn calls(&self) -> Vec<DrawCall> {
        self.lock(&self.calls).clone()
    }

    pub fn draw_count(&self) -> usize {
        self.lock(&self.calls).len()
    }

    pub fn draws_for(&self, route_id: &str) -> usize {
        self.lock(&self.calls)
            .iter()
            .filter(|call| call.route_id == route_id)
            .count()
    }

    pub fn clear_count(&self) -> usize {
        self.clear_count.load(Ordering::SeqCst)
    }

    pub fn centered_days(&self) -> Vec<u32> {
        self.lock(&self.centered).clone()
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    fn lock<'a, T>(&self, mutex: &'a Mutex<T>) -> MutexGuard<'a, T> {
        mutex.lock().expect("mock surface lock poisoned")
    }
}

impl RouteSurface for MockSurface {
    async fn draw_segment(
        &self,
        _start: Coordinate,
        _end: Coordinate,
        options: &DrawOptions,
    ) -> Result<bool, SurfaceError> {
        self.lock(&self.calls).push(DrawCall {
            route_id: options.route_id.clone(),
            day: options.day,
            label: options.label.clone(),
            completed_before_start: self.completed.load(Ordering::SeqCst),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);

        if self.lock(&self.erroring).contains(&options.route_id) {
            return Err(SurfaceError::Draw(format!(
                "injected error for {}",
                options.route_id
            )));
        }
        Ok(!self.lock(&self.failing).contains(&options.route_id))
    }

    fn clear_all(&self) {
        self.clear_count.fetch_add(1, Ordering::SeqCst);
    }

    fn toggle_visibility(&self) {
        self.visible.fetch_xor(true, Ordering::SeqCst);
    }

    fn center_on_day(&self, day: u32) {
        self.lock(&self.centered).push(day);
    }
}

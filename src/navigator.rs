//! Day navigation controller.
//!
//! Translates day-selection events (forward/backward/jump) into engine
//! calls. This is the injected replacement for the source's window-scoped
//! helper functions; a UI shell registers its event handlers against one
//! instance and calls the same operation set programmatically.

use std::sync::atomic::{AtomicU32, Ordering};

use tracing::{info, warn};

use crate::engine::{AdvanceOutcome, ProgressionEngine};
use crate::traits::{ProgressSink, RouteSurface};

/// Result of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    Moved { day: u32, advance: AdvanceOutcome },
    AtFirstDay,
    AtLastDay,
    OutOfRange { day: u32 },
    /// No engine attached; routes unavailable.
    Unavailable,
}

/// Snapshot of the navigation and rendering state, for UI wiring and
/// interactive debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteStatus {
    pub current_day: u32,
    pub last_rendered_day: u32,
    pub total_days: u32,
    pub rendered_count: usize,
    pub rendered: Vec<String>,
}

pub struct DayNavigator<S, P> {
    engine: Option<ProgressionEngine<S, P>>,
    current_day: AtomicU32,
    total_days: u32,
}

impl<S: RouteSurface, P: ProgressSink> DayNavigator<S, P> {
    pub fn new(engine: ProgressionEngine<S, P>) -> Self {
        let total_days = engine.total_days();
        Self {
            engine: Some(engine),
            current_day: AtomicU32::new(1),
            total_days,
        }
    }

    /// A navigator without a drawing engine: navigation state still moves,
    /// but every route operation warns and no-ops.
    pub fn detached(total_days: u32) -> Self {
        Self {
            engine: None,
            current_day: AtomicU32::new(1),
            total_days,
        }
    }

    pub fn current_day(&self) -> u32 {
        self.current_day.load(Ordering::SeqCst)
    }

    pub fn total_days(&self) -> u32 {
        self.total_days
    }

    /// Jump to `day`: validate bounds, center the surface on the day, then
    /// advance the engine. The current day updates even when the engine is
    /// unavailable, matching the source behavior.
    pub async fn go_to_day(&self, day: u32) -> NavOutcome {
        if day < 1 || day > self.total_days {
            warn!(day, total_days = self.total_days, "invalid day requested");
            return NavOutcome::OutOfRange { day };
        }

        self.current_day.store(day, Ordering::SeqCst);

        let Some(engine) = &self.engine else {
            warn!("map surface not initialized, routes unavailable");
            return NavOutcome::Unavailable;
        };

        engine.center_on_day(day);
        let advance = engine.advance_to_day(day).await;
        NavOutcome::Moved { day, advance }
    }

    pub async fn next(&self) -> NavOutcome {
        let day = self.current_day() + 1;
        if day > self.total_days {
            info!("already at the last day");
            return NavOutcome::AtLastDay;
        }
        self.go_to_day(day).await
    }

    pub async fn previous(&self) -> NavOutcome {
        let current = self.current_day();
        if current <= 1 {
            info!("already at the first day");
            return NavOutcome::AtFirstDay;
        }
        self.go_to_day(current - 1).await
    }

    pub async fn jump_to_first(&self) -> NavOutcome {
        self.go_to_day(1).await
    }

    /// Jump to the final day, rendering the complete loop.
    pub async fn jump_to_last(&self) -> NavOutcome {
        self.go_to_day(self.total_days).await
    }

    /// Clear all drawn routes and forget progress. Returns whether an
    /// engine was attached. Leaves the current day untouched.
    pub fn clear_routes(&self) -> bool {
        match &self.engine {
            Some(engine) => {
                engine.reset();
                true
            }
            None => {
                warn!("map surface not initialized, nothing to clear");
                false
            }
        }
    }

    /// Toggle route visibility on the surface. Presentation-only.
    pub fn toggle_routes(&self) -> bool {
        match &self.engine {
            Some(engine) => {
                engine.toggle_visibility();
                true
            }
            None => false,
        }
    }

    pub fn status(&self) -> RouteStatus {
        match &self.engine {
            Some(engine) => RouteStatus {
                current_day: self.current_day(),
                last_rendered_day: engine.last_rendered_day(),
                total_days: self.total_days,
                rendered_count: engine.rendered_count(),
                rendered: engine.rendered_routes(),
            },
            None => RouteStatus {
                current_day: self.current_day(),
                last_rendered_day: 0,
                total_days: self.total_days,
                rendered_count: 0,
                rendered: Vec::new(),
            },
        }
    }

    pub fn engine(&self) -> Option<&ProgressionEngine<S, P>> {
        self.engine.as_ref()
    }
}

//! Progressive trip-route rendering engine.
//!
//! Incrementally draws a trip itinerary's route segments onto an external
//! map surface as the active day changes: forward navigation adds only the
//! missing segments, backward navigation rebuilds from day one, and the
//! final day closes the itinerary into a loop with a return route. Drawing
//! and routing are delegated to a [`traits::RouteSurface`] collaborator;
//! this crate owns only the progression state machine and its data
//! contracts.

#![allow(async_fn_in_trait)]

pub mod dataset;
pub mod engine;
pub mod error;
pub mod navigator;
pub mod progress;
pub mod segment;
pub mod surface;
pub mod traits;
pub mod trip;

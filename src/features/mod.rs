//! Features - Vertical Feature Slices
//!
//! Each feature owns a controller that turns user intent into store
//! updates and backend calls.

pub mod appointments;
pub mod booking;
pub mod doctors;

//! Domain - Pure Data Structures
//!
//! These types don't depend on the service or state layers and represent the
//! clinic's business domain.

pub mod appointment;
pub mod config;
pub mod doctor;
pub mod patient;
pub mod schedule;
pub mod slot;

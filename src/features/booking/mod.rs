//! Booking - patient-facing four-step wizard

mod controller;

pub use controller::*;

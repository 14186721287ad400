//! Appointments - admin board and status changes

mod controller;

pub use controller::*;

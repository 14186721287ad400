//! Doctors - admin directory management

mod controller;

pub use controller::*;

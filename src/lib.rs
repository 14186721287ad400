//! Clinic Booking Library
//!
//! Core of an outpatient clinic booking system: a four-step patient booking
//! wizard with phone verification, generated time slots, a doctor directory
//! and an appointments board for clinic staff.

pub mod app;
pub mod assets;
pub mod constants;
pub mod domain;
pub mod error;
pub mod features;
pub mod helpers;
pub mod i18n;
pub mod services;
pub mod states;

//! Application Layer
//!
//! Contains app initialization, global store handles, and the console front-end.

pub mod application;
pub mod console;
pub mod entities;
